//! Particle population storage and feed generation.
//!
//! State is kept as parallel vectors (one per attribute) so the per-step
//! passes can iterate attribute-wise and in parallel. Particles are created
//! once at feed generation and never destroyed; collection only changes the
//! lifecycle tag.

use anyhow::Result;
use classifier_common::config::SimulationConfig;
use classifier_common::particle::{Lifecycle, Material};
use classifier_common::sim_params::SimParams;
use classifier_common::snapshot::ParticleSnapshot;
use classifier_common::vecmath::Vec3;
use rand::prelude::*;
use rand::seq::SliceRandom;
use rand_distr::LogNormal;

const MAX_SAMPLE_ATTEMPTS: usize = 100;

/// The full per-particle state of the simulation, index-aligned across all
/// vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Diameters in meters, strictly positive.
    pub diameters: Vec<f64>,
    /// Material densities in kg/m^3, strictly positive.
    pub densities: Vec<f64>,
    pub materials: Vec<Material>,
    pub lifecycles: Vec<Lifecycle>,
}

/// Population counts by lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCounts {
    pub active: usize,
    pub collected_fine: usize,
    pub collected_coarse: usize,
}

impl ParticleSet {
    /// Generates the feed population from the configured size distributions.
    ///
    /// Deterministic for a given seed: the same configuration always produces
    /// the same particles in the same order.
    pub fn generate(config: &SimulationConfig, params: &SimParams) -> Result<Self> {
        let feed = &config.feed;
        let total = feed.num_particles as usize;
        let num_fine = (total as f64 * feed.fine_fraction).round() as usize;

        let mut rng = StdRng::seed_from_u64(params.seed);

        let fine_dist = LogNormal::new((feed.fine_median_diameter_um * 1e-6).ln(), feed.fine_sigma)?;
        let coarse_dist =
            LogNormal::new((feed.coarse_median_diameter_um * 1e-6).ln(), feed.coarse_sigma)?;
        let d_min = feed.min_diameter_um * 1e-6;
        let d_max = feed.max_diameter_um * 1e-6;

        // Draw (material, diameter, density) per particle, then shuffle so
        // the two classes are interleaved in the feed order.
        let mut grains: Vec<(Material, f64, f64)> = Vec::with_capacity(total);
        for i in 0..total {
            let (material, dist, density) = if i < num_fine {
                (Material::Fine, &fine_dist, feed.fine_density)
            } else {
                (Material::Coarse, &coarse_dist, feed.coarse_density)
            };
            let diameter = sample_bounded(&mut rng, dist, d_min, d_max);
            grains.push((material, diameter, density));
        }
        grains.shuffle(&mut rng);

        let mut set = ParticleSet {
            positions: Vec::with_capacity(total),
            velocities: vec![Vec3::zero(); total],
            diameters: Vec::with_capacity(total),
            densities: Vec::with_capacity(total),
            materials: Vec::with_capacity(total),
            lifecycles: vec![Lifecycle::Active; total],
        };
        for (material, diameter, density) in grains {
            set.positions.push(feed_position(params, &mut rng));
            set.diameters.push(diameter);
            set.densities.push(density);
            set.materials.push(material);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Counts particles per lifecycle state.
    pub fn counts(&self) -> StreamCounts {
        let mut counts = StreamCounts { active: 0, collected_fine: 0, collected_coarse: 0 };
        for life in &self.lifecycles {
            match life {
                Lifecycle::Active => counts.active += 1,
                Lifecycle::CollectedFine => counts.collected_fine += 1,
                Lifecycle::CollectedCoarse => counts.collected_coarse += 1,
            }
        }
        counts
    }

    /// Captures the full population into a serializable snapshot.
    pub fn snapshot(
        &self,
        time: f64,
        step: u64,
        fine_collected_total: u64,
        coarse_collected_total: u64,
    ) -> ParticleSnapshot {
        ParticleSnapshot {
            time,
            step,
            fine_collected_total,
            coarse_collected_total,
            positions: self.positions.clone(),
            velocities: self.velocities.clone(),
            diameters: self.diameters.clone(),
            densities: self.densities.clone(),
            materials: self.materials.clone(),
            lifecycles: self.lifecycles.clone(),
        }
    }

    /// Rebuilds a population from a snapshot, restoring every particle in its
    /// recorded order.
    pub fn from_snapshot(snapshot: &ParticleSnapshot) -> Self {
        ParticleSet {
            positions: snapshot.positions.clone(),
            velocities: snapshot.velocities.clone(),
            diameters: snapshot.diameters.clone(),
            densities: snapshot.densities.clone(),
            materials: snapshot.materials.clone(),
            lifecycles: snapshot.lifecycles.clone(),
        }
    }
}

/// Draws a position uniformly (by volume) from the annular feed zone.
pub fn feed_position(p: &SimParams, rng: &mut StdRng) -> Vec3 {
    // Uniform over the annulus area needs r ~ sqrt(U) between the squared radii.
    let r_sq = rng.random_range(p.feed_r_min * p.feed_r_min..=p.feed_r_max * p.feed_r_max);
    let r = r_sq.sqrt();
    let theta = rng.random_range(0.0..std::f64::consts::TAU);
    let z = rng.random_range(p.feed_z_min..=p.feed_z_max);
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Samples a diameter, resampling values outside [d_min, d_max] and clamping
/// as a last resort so the invariant d > 0 always holds.
fn sample_bounded(rng: &mut StdRng, dist: &LogNormal<f64>, d_min: f64, d_max: f64) -> f64 {
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let d = rng.sample(dist);
        if d >= d_min && d <= d_max {
            return d;
        }
    }
    rng.sample(dist).clamp(d_min, d_max)
}
