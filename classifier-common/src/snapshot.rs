use serde::{Serialize, Deserialize};
use crate::particle::{Lifecycle, Material};
use crate::vecmath::Vec3;

/// A snapshot of the full simulation state at a specific time.
///
/// Per-particle data is stored column-wise, index-aligned across the vectors,
/// so a snapshot can reconstruct the exact particle population it was taken
/// from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    /// Simulation time (seconds) at which the snapshot was taken.
    pub time: f64,
    /// Physics step index at which the snapshot was taken.
    pub step: u64,
    /// Cumulative number of fine-outlet collection events.
    pub fine_collected_total: u64,
    /// Cumulative number of coarse-outlet collection events.
    pub coarse_collected_total: u64,

    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Particle diameters in meters.
    pub diameters: Vec<f64>,
    /// Particle material densities in kg/m^3.
    pub densities: Vec<f64>,
    pub materials: Vec<Material>,
    pub lifecycles: Vec<Lifecycle>,
}

impl ParticleSnapshot {
    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }
}
