//! Post-integration boundary handling: outlet collection zones, the chamber
//! wall and the chamber lid.
//!
//! Outlet checks run before wall handling, so a particle that reaches an
//! outlet zone is collected even when the same move also crossed a wall.

use classifier_common::sim_params::SimParams;
use classifier_common::vecmath::Vec3;

/// What happened to a particle at the boundaries this step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryEvent {
    /// Still active inside the chamber (possibly after a wall bounce).
    None,
    /// Entered the fine outlet zone at the top center.
    CollectedFine,
    /// Entered the coarse outlet zone at the chamber bottom.
    CollectedCoarse,
}

/// Applies outlet and wall rules to one particle, mutating its position and
/// velocity in place for wall contacts.
pub fn apply(pos: &mut Vec3, vel: &mut Vec3, p: &SimParams) -> BoundaryEvent {
    let r = pos.radial_distance();

    // Fine product leaves through the top center with the bore flow.
    if pos.z >= p.fine_outlet_z && r < p.fine_outlet_radius {
        return BoundaryEvent::CollectedFine;
    }
    // Coarse product drops out at the bottom.
    if pos.z <= p.coarse_outlet_z {
        return BoundaryEvent::CollectedCoarse;
    }

    // Cylindrical wall: reflect the outward radial velocity component with
    // restitution, keep the tangential and axial components, and clamp the
    // particle back onto the wall.
    if r > p.chamber_radius {
        let inv_r = 1.0 / r;
        let normal = Vec3::new(pos.x * inv_r, pos.y * inv_r, 0.0);
        let v_radial = vel.dot(normal);
        if v_radial > 0.0 {
            *vel = vel.sub(normal.scale((1.0 + p.wall_restitution) * v_radial));
        }
        let scale = p.chamber_radius * inv_r;
        pos.x *= scale;
        pos.y *= scale;
    }

    // Chamber lid: strongly damped vertical bounce.
    if pos.z > p.chamber_height {
        pos.z = p.chamber_height;
        if vel.z > 0.0 {
            vel.z = -p.top_restitution * vel.z;
        }
    }

    BoundaryEvent::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use classifier_common::sim_params::SimParams;

    fn params() -> SimParams {
        crate::test_support::base_config().get_sim_params()
    }

    #[test]
    fn collects_fine_at_the_top_center() {
        let p = params();
        let mut pos = Vec3::new(0.05, 0.0, p.fine_outlet_z + 0.01);
        let mut vel = Vec3::new(0.0, 0.0, 3.0);
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::CollectedFine);
    }

    #[test]
    fn top_center_needs_both_height_and_radius() {
        let p = params();
        // High enough but outside the outlet radius: not collected.
        let mut pos = Vec3::new(p.fine_outlet_radius + 0.02, 0.0, p.fine_outlet_z + 0.01);
        let mut vel = Vec3::zero();
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::None);
    }

    #[test]
    fn collects_coarse_at_the_bottom() {
        let p = params();
        let mut pos = Vec3::new(0.25, 0.1, p.coarse_outlet_z - 0.01);
        let mut vel = Vec3::new(0.0, 0.0, -2.0);
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::CollectedCoarse);
    }

    #[test]
    fn wall_bounce_damps_the_radial_component_only() {
        let p = params();
        let mut pos = Vec3::new(p.chamber_radius + 0.01, 0.0, 0.6);
        let mut vel = Vec3::new(2.0, 1.5, -0.8);
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::None);

        // Outward (x) component reflected and damped, others untouched.
        assert_relative_eq!(vel.x, -p.wall_restitution * 2.0, max_relative = 1e-12);
        assert_relative_eq!(vel.y, 1.5, max_relative = 1e-12);
        assert_relative_eq!(vel.z, -0.8, max_relative = 1e-12);
        // Clamped back onto the wall.
        assert_relative_eq!(pos.radial_distance(), p.chamber_radius, max_relative = 1e-12);
    }

    #[test]
    fn lid_bounce_is_strongly_damped() {
        let p = params();
        let mut pos = Vec3::new(0.25, 0.0, p.chamber_height + 0.01);
        let mut vel = Vec3::new(0.1, 0.0, 4.0);
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::None);
        assert_relative_eq!(pos.z, p.chamber_height, max_relative = 1e-12);
        assert_relative_eq!(vel.z, -p.top_restitution * 4.0, max_relative = 1e-12);
    }

    #[test]
    fn interior_particle_is_untouched() {
        let p = params();
        let mut pos = Vec3::new(0.1, 0.1, 0.6);
        let mut vel = Vec3::new(1.0, -1.0, 0.5);
        let before_pos = pos;
        let before_vel = vel;
        assert_eq!(apply(&mut pos, &mut vel, &p), BoundaryEvent::None);
        assert_eq!(pos, before_pos);
        assert_eq!(vel, before_vel);
    }
}
