use serde::{Deserialize, Serialize};

/// Simulation parameters derived from the configuration, used frequently
/// during simulation steps. All values are SI (m, s, kg, rad).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Chamber geometry
    pub chamber_radius: f64,
    pub chamber_height: f64,

    // Classifier wheel
    pub wheel_radius: f64,
    /// Axial height of the classification zone, used as the flow height in the
    /// radial continuity expression.
    pub wheel_height: f64,
    pub wheel_z_min: f64,
    pub wheel_z_max: f64,

    // Operating point
    /// Wheel angular speed (rad/s).
    pub omega: f64,
    /// Volumetric air flow (m^3/s).
    pub air_flow: f64,

    // Air properties
    pub air_density: f64,
    pub air_viscosity: f64,

    // Flow field shape
    /// Cross-section of the upward bore flow, pi * wheel_radius^2.
    pub bore_area: f64,
    /// Cross-section of the downward annulus flow, outside the axial
    /// transition ring.
    pub annulus_area: f64,
    /// Radial width of the up/down axial transition, 0.1 * wheel_radius.
    pub transition_width: f64,
    /// Fraction of the radial inflow that persists outside the wheel's axial
    /// band (leakage past the classification zone).
    pub leak_fraction: f64,
    /// Lower clamp on radius when evaluating the field near the axis.
    pub r_epsilon: f64,

    // Collection zones
    pub fine_outlet_z: f64,
    pub fine_outlet_radius: f64,
    pub coarse_outlet_z: f64,
    pub wall_restitution: f64,
    pub top_restitution: f64,
    pub reinject_collected: bool,

    // Feed zone (annular)
    pub feed_r_min: f64,
    pub feed_r_max: f64,
    pub feed_z_min: f64,
    pub feed_z_max: f64,

    // Time integration
    pub dt: f64,
    /// Hard cap on particle speed, guards the explicit drag update against
    /// blow-up when dt approaches the particle relaxation time.
    pub max_speed: f64,

    pub gravity: f64,
    pub seed: u64,
}
