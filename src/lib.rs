//! CPU-parallel simulation of a centrifugal air classifier.
//!
//! A particle population is advanced through an analytic chamber flow field
//! (radial inflow, Rankine vortex swirl, axial bore/annulus split) under
//! drag, gravity and the wheel's centrifugal action, until particles reach
//! the fine or coarse outlet. Separation quality is scored afterwards with a
//! grade efficiency (Tromp) curve.

pub mod analysis;
pub mod boundary;
pub mod flow_field;
pub mod forces;
pub mod integrator;
pub mod particle_set;
pub mod simulation;

#[cfg(test)]
pub(crate) mod test_support;

pub use particle_set::{ParticleSet, StreamCounts};
pub use simulation::ClassifierSimulation;
