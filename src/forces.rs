//! Per-particle force model: regime-dependent aerodynamic drag, gravity and
//! the rotating-frame centrifugal force near the classifier wheel.
//!
//! The swirl component of the air field is treated as the rotating frame the
//! particle is carried in: drag is evaluated against the meridional part of
//! the air velocity only, and the rotation acts on the particle exactly once,
//! through the explicit centrifugal term.

use classifier_common::sim_params::SimParams;
use classifier_common::vecmath::Vec3;

use crate::flow_field;

/// Mass of a spherical particle.
#[inline(always)]
pub fn particle_mass(diameter: f64, density: f64) -> f64 {
    std::f64::consts::FRAC_PI_6 * diameter * diameter * diameter * density
}

/// Drag coefficient over the three Reynolds-number regimes: Stokes below
/// Re = 0.1, the Schiller-Naumann correlation up to Re = 1000, Newton above.
pub fn drag_coefficient(reynolds: f64) -> f64 {
    if reynolds < 0.1 {
        24.0 / reynolds
    } else if reynolds < 1000.0 {
        24.0 / reynolds * (1.0 + 0.15 * reynolds.powf(0.687))
    } else {
        0.44
    }
}

/// Aerodynamic drag on a sphere moving at `v_rel` relative to the air.
/// Returns zero for a negligible relative speed.
pub fn drag_force(v_rel: Vec3, diameter: f64, p: &SimParams) -> Vec3 {
    let speed = v_rel.length();
    if speed < 1e-9 {
        return Vec3::zero();
    }
    let reynolds = p.air_density * speed * diameter / p.air_viscosity;
    let cd = drag_coefficient(reynolds);
    let area = std::f64::consts::FRAC_PI_4 * diameter * diameter;
    let magnitude = 0.5 * cd * p.air_density * speed * speed * area;
    // Anti-parallel to the relative velocity.
    v_rel.scale(-magnitude / speed)
}

/// Effective spin rate felt by a particle at `pos`. Full wheel speed inside
/// the wheel radius; outside, the free-vortex tail gives v_t / r = omega *
/// (R / r)^2. Away from the wheel's axial band the swirl dies off with an
/// exponential falloff over half the wheel height.
pub fn local_spin_rate(pos: Vec3, p: &SimParams) -> f64 {
    let r = pos.radial_distance();
    let radial = if r <= p.wheel_radius {
        p.omega
    } else {
        p.omega * (p.wheel_radius / r) * (p.wheel_radius / r)
    };
    let axial_dist = if pos.z < p.wheel_z_min {
        p.wheel_z_min - pos.z
    } else if pos.z > p.wheel_z_max {
        pos.z - p.wheel_z_max
    } else {
        0.0
    };
    let falloff = (-axial_dist / (0.5 * p.wheel_height)).exp();
    radial * falloff
}

/// Centrifugal force on a particle of mass `m`, directed radially outward.
pub fn centrifugal_force(pos: Vec3, mass: f64, p: &SimParams) -> Vec3 {
    let r = pos.radial_distance();
    let outward = Vec3::new(pos.x, pos.y, 0.0).normalize_or_zero();
    let spin = local_spin_rate(pos, p);
    outward.scale(mass * spin * spin * r)
}

/// Net force on one particle: drag against the meridional air motion, gravity
/// and the centrifugal force of the local swirl.
pub fn net_force(
    pos: Vec3,
    vel: Vec3,
    diameter: f64,
    density: f64,
    v_air: Vec3,
    p: &SimParams,
) -> Vec3 {
    let mass = particle_mass(diameter, density);

    // Strip the swirl from the air velocity before forming the slip: the
    // tangential carrier shows up as the centrifugal term instead.
    let r = pos.radial_distance();
    let v_air_meridional = if r > p.r_epsilon {
        let inv_r = 1.0 / r;
        let e_t = Vec3::new(-pos.y * inv_r, pos.x * inv_r, 0.0);
        v_air.sub(e_t.scale(v_air.dot(e_t)))
    } else {
        Vec3::new(0.0, 0.0, v_air.z)
    };
    let v_rel = vel.sub(v_air_meridional);

    let drag = drag_force(v_rel, diameter, p);
    let gravity = Vec3::new(0.0, 0.0, -mass * p.gravity);
    let centrifugal = centrifugal_force(pos, mass, p);

    let total = drag.add(gravity).add(centrifugal);
    debug_assert!(total.is_finite(), "non-finite force at {:?}", pos);
    total
}

/// Closed-form cut size of the classifier: the diameter whose Stokes drag in
/// the radial inflow balances the centrifugal force at the wheel rim,
/// d50 = sqrt(9 mu Q / (pi rho omega^2 R^2 h)).
pub fn theoretical_cut_size(p: &SimParams, particle_density: f64) -> f64 {
    let numerator = 9.0 * p.air_viscosity * p.air_flow;
    let denominator = std::f64::consts::PI
        * particle_density
        * p.omega
        * p.omega
        * p.wheel_radius
        * p.wheel_radius
        * p.wheel_height;
    (numerator / denominator).sqrt()
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
    fn mass_of_unit_density_sphere() {
        // 1 m sphere at unit density: pi/6 kg.
        assert_relative_eq!(
            particle_mass(1.0, 1.0),
            std::f64::consts::FRAC_PI_6,
            max_relative = 1e-12
        );
    }

    #[test]
    fn drag_opposes_relative_motion() {
        let p = params();
        let v_rel = Vec3::new(1.3, -0.4, 2.0);
        let force = drag_force(v_rel, 5e-6, &p);
        assert!(force.dot(v_rel) < 0.0);
        // Collinear: the cross terms vanish.
        let cross_x = force.y * v_rel.z - force.z * v_rel.y;
        assert!(cross_x.abs() < 1e-15);
    }

    #[test]
    fn drag_vanishes_at_zero_slip() {
        let p = params();
        assert_eq!(drag_force(Vec3::zero(), 5e-6, &p), Vec3::zero());
        assert_eq!(drag_force(Vec3::new(1e-12, 0.0, 0.0), 5e-6, &p), Vec3::zero());
    }

    #[test]
    fn stokes_regime_matches_analytic_drag() {
        let p = params();
        // Slow enough that Re << 0.1 for a 3 um particle.
        let diameter = 3e-6;
        let u = 0.01;
        let force = drag_force(Vec3::new(u, 0.0, 0.0), diameter, &p);
        let stokes = 3.0 * std::f64::consts::PI * p.air_viscosity * diameter * u;
        assert_relative_eq!(force.x, -stokes, max_relative = 1e-9);
    }

    #[test]
    fn drag_coefficient_regimes() {
        assert_relative_eq!(drag_coefficient(0.01), 2400.0, max_relative = 1e-12);
        // Schiller-Naumann exceeds pure Stokes at moderate Re.
        assert!(drag_coefficient(10.0) > 2.4);
        assert_relative_eq!(drag_coefficient(5000.0), 0.44, max_relative = 1e-12);
    }

    #[test]
    fn spin_rate_is_full_at_the_rim_and_decays_outward() {
        let p = params();
        let at_rim = local_spin_rate(Vec3::new(p.wheel_radius, 0.0, 0.6), &p);
        assert_relative_eq!(at_rim, p.omega, max_relative = 1e-12);
        let outside = local_spin_rate(Vec3::new(0.28, 0.0, 0.6), &p);
        assert!(outside < at_rim);
        // Matches the free-vortex angular rate v_t / r.
        let expected = p.omega * (p.wheel_radius / 0.28) * (p.wheel_radius / 0.28);
        assert_relative_eq!(outside, expected, max_relative = 1e-12);
    }

    #[test]
    fn spin_rate_decays_away_from_the_wheel_band() {
        let p = params();
        let in_band = local_spin_rate(Vec3::new(0.1, 0.0, 0.6), &p);
        let above = local_spin_rate(Vec3::new(0.1, 0.0, 1.1), &p);
        let below = local_spin_rate(Vec3::new(0.1, 0.0, 0.1), &p);
        assert!(above < in_band);
        assert!(below < in_band);
    }

    #[test]
    fn centrifugal_points_outward() {
        let p = params();
        let pos = Vec3::new(0.1, 0.15, 0.6);
        let force = centrifugal_force(pos, 1e-12, &p);
        assert!(force.dot(Vec3::new(pos.x, pos.y, 0.0)) > 0.0);
        assert_eq!(force.z, 0.0);
        // Vanishes on the axis.
        let on_axis = centrifugal_force(Vec3::new(0.0, 0.0, 0.6), 1e-12, &p);
        assert_eq!(on_axis, Vec3::zero());
    }

    #[test]
    fn cut_size_matches_hand_calculation() {
        // R = 0.2 m, 3000 rpm, 3000 m3/hr, h = 0.5 m, rho = 1400 kg/m3
        // gives d50 close to 3.95 um.
        let p = params();
        let d50 = theoretical_cut_size(&p, 1400.0);
        assert_relative_eq!(d50, 3.954e-6, max_relative = 1e-3);
    }

    #[test]
    fn cut_size_shrinks_with_wheel_speed() {
        let mut config = crate::test_support::base_config();
        let slow = theoretical_cut_size(&config.get_sim_params(), 1400.0);
        config.operating.wheel_rpm *= 2.0;
        let fast = theoretical_cut_size(&config.get_sim_params(), 1400.0);
        assert_relative_eq!(fast, slow / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn net_force_on_heavy_rim_particle_is_outward() {
        let p = params();
        // A 10 um particle sitting at the rim: centrifugal wins over the
        // radial inflow drag.
        let pos = Vec3::new(p.wheel_radius, 0.0, 0.6);
        let v_air = crate::flow_field::air_velocity_at(pos, &p);
        let force = net_force(pos, Vec3::zero(), 10e-6, 1400.0, v_air, &p);
        assert!(force.x > 0.0);
    }

    #[test]
    fn net_force_on_small_rim_particle_is_inward() {
        let p = params();
        // Well below the cut size the inflow drag dominates.
        let pos = Vec3::new(p.wheel_radius, 0.0, 0.6);
        let v_air = crate::flow_field::air_velocity_at(pos, &p);
        let force = net_force(pos, Vec3::zero(), 2e-6, 1400.0, v_air, &p);
        assert!(force.x < 0.0);
    }
}
