//! Analytic air flow field inside the classifier chamber.
//!
//! The field is built from mass continuity and a Rankine vortex rather than a
//! CFD solution: radial inflow toward the wheel, solid-body swirl inside the
//! wheel radius with a free-vortex tail outside, and an axial split between
//! the upward bore flow and the downward annulus flow.

use classifier_common::sim_params::SimParams;
use classifier_common::vecmath::Vec3;

/// Air velocity at `pos`, in Cartesian components. Pure function of position
/// and parameters; safe to evaluate concurrently.
pub fn air_velocity_at(pos: Vec3, p: &SimParams) -> Vec3 {
    let r = pos.radial_distance().max(p.r_epsilon);
    let inv_r = 1.0 / r;
    // Unit vectors of the cylindrical frame at this position. On the axis the
    // clamped radius makes these well defined in direction but the radial and
    // tangential magnitudes stay bounded.
    let (e_r, e_t) = if pos.radial_distance() > p.r_epsilon {
        (
            Vec3::new(pos.x * inv_r, pos.y * inv_r, 0.0),
            Vec3::new(-pos.y * inv_r, pos.x * inv_r, 0.0),
        )
    } else {
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
    };

    let v_r = radial_component(r, pos.z, p);
    let v_t = tangential_component(r, p);
    let v_z = axial_component(r, p);

    e_r.scale(v_r)
        .add(e_t.scale(v_t))
        .add(Vec3::new(0.0, 0.0, v_z))
}

/// Radial inflow from continuity: the full air flow crosses every concentric
/// shell of the classification band, so v_r = -Q / (2 pi r h). Outside the
/// wheel's axial band only a small leakage fraction of the inflow remains.
pub fn radial_component(r: f64, z: f64, p: &SimParams) -> f64 {
    let full = -p.air_flow / (std::f64::consts::TAU * r * p.wheel_height);
    if z >= p.wheel_z_min && z <= p.wheel_z_max {
        full
    } else {
        full * p.leak_fraction
    }
}

/// Rankine vortex swirl: solid-body rotation with the wheel inside its radius,
/// circulation-preserving free vortex outside. Continuous at r = R.
pub fn tangential_component(r: f64, p: &SimParams) -> f64 {
    if r < p.wheel_radius {
        p.omega * r
    } else {
        p.omega * p.wheel_radius * p.wheel_radius / r
    }
}

/// Axial split: the bore carries the full air flow upward, the outer annulus
/// returns it downward, with a linear blend across the transition ring so the
/// profile has no jump.
pub fn axial_component(r: f64, p: &SimParams) -> f64 {
    let up = p.air_flow / p.bore_area;
    let down = -p.air_flow / p.annulus_area;
    let outer = p.wheel_radius + p.transition_width;
    if r <= p.wheel_radius {
        up
    } else if r >= outer {
        down
    } else {
        let t = (r - p.wheel_radius) / p.transition_width;
        up + t * (down - up)
    }
}
