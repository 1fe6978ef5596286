//! Semi-implicit Euler time integration.
//!
//! The velocity is advanced first and the new velocity moves the position,
//! which keeps the explicit drag update stable as long as dt stays well below
//! the particle relaxation time rho_p d^2 / (18 mu). A hard speed cap guards
//! against the occasional particle that is pushed past that limit.

use classifier_common::sim_params::SimParams;
use classifier_common::vecmath::Vec3;

/// Advances one particle by a single timestep, returning the new position and
/// velocity.
#[inline]
pub fn advance(pos: Vec3, vel: Vec3, force: Vec3, mass: f64, p: &SimParams) -> (Vec3, Vec3) {
    debug_assert!(mass > 0.0, "particle mass must be positive");

    let mut new_vel = vel.add(force.scale(p.dt / mass));
    let speed = new_vel.length();
    if speed > p.max_speed {
        new_vel = new_vel.scale(p.max_speed / speed);
    }
    let new_pos = pos.add(new_vel.scale(p.dt));

    debug_assert!(new_pos.is_finite() && new_vel.is_finite(), "non-finite state after step");
    (new_pos, new_vel)
}
