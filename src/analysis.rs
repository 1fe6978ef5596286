//! Separation performance analysis: Tromp (grade efficiency) curve, cut sizes
//! and stream purity/recovery accounting.

use classifier_common::particle::{Lifecycle, Material};
use serde::{Serialize, Deserialize};

use crate::particle_set::ParticleSet;

/// Binning options for the grade efficiency curve.
#[derive(Debug, Clone)]
pub struct GradeEfficiencyOptions {
    /// Lower edge of the diameter range (meters).
    pub min_diameter: f64,
    /// Upper edge of the diameter range (meters).
    pub max_diameter: f64,
    /// Number of logarithmically spaced bins.
    pub bin_count: usize,
}

impl Default for GradeEfficiencyOptions {
    fn default() -> Self {
        GradeEfficiencyOptions {
            min_diameter: 1e-6,
            max_diameter: 50e-6,
            bin_count: 24,
        }
    }
}

/// One point of the Tromp curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrompPoint {
    /// Geometric center of the diameter bin (meters).
    pub diameter: f64,
    /// Fraction of the bin's collected feed that reported to the coarse
    /// stream.
    pub efficiency: f64,
    /// Collected particles of this size class (both streams).
    pub feed_count: u32,
    pub coarse_count: u32,
}

/// Grade efficiency curve with the characteristic cut sizes read off it.
///
/// The quartile diameters are `None` when the curve never crosses the
/// corresponding level, for example when every collected particle reported to
/// one stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEfficiency {
    pub points: Vec<TrompPoint>,
    pub d25: Option<f64>,
    pub d50: Option<f64>,
    pub d75: Option<f64>,
    /// Sharpness index kappa = d75 / d25; 1.0 is a perfect step separation.
    pub sharpness: Option<f64>,
}

/// Bins the collected (terminal) particles by diameter and computes the
/// per-bin coarse fraction. Particles still active are not part of either
/// product stream and are excluded.
pub fn grade_efficiency(set: &ParticleSet, options: &GradeEfficiencyOptions) -> GradeEfficiency {
    let bins = options.bin_count.max(1);
    let ln_min = options.min_diameter.ln();
    let ln_max = options.max_diameter.ln();
    let ln_width = (ln_max - ln_min) / bins as f64;

    let mut feed_counts = vec![0u32; bins];
    let mut coarse_counts = vec![0u32; bins];
    for i in 0..set.len() {
        let stream = match set.lifecycles[i] {
            Lifecycle::Active => continue,
            Lifecycle::CollectedFine => false,
            Lifecycle::CollectedCoarse => true,
        };
        let ln_d = set.diameters[i].ln();
        if ln_d < ln_min || ln_d >= ln_max {
            continue;
        }
        let bin = (((ln_d - ln_min) / ln_width) as usize).min(bins - 1);
        feed_counts[bin] += 1;
        if stream {
            coarse_counts[bin] += 1;
        }
    }

    let points: Vec<TrompPoint> = (0..bins)
        .map(|bin| {
            let center = (ln_min + (bin as f64 + 0.5) * ln_width).exp();
            let efficiency = if feed_counts[bin] > 0 {
                coarse_counts[bin] as f64 / feed_counts[bin] as f64
            } else {
                0.0
            };
            TrompPoint {
                diameter: center,
                efficiency,
                feed_count: feed_counts[bin],
                coarse_count: coarse_counts[bin],
            }
        })
        .collect();

    let d25 = crossing_diameter(&points, 0.25);
    let d50 = crossing_diameter(&points, 0.50);
    let d75 = crossing_diameter(&points, 0.75);
    let sharpness = match (d25, d75) {
        (Some(lo), Some(hi)) if lo > 0.0 => Some(hi / lo),
        _ => None,
    };

    GradeEfficiency { points, d25, d50, d75, sharpness }
}

/// Finds the diameter at which the curve crosses `level`, interpolating
/// log-linearly between the bracketing populated bins. Empty bins are skipped
/// so a sparse feed does not punch holes in the curve.
fn crossing_diameter(points: &[TrompPoint], level: f64) -> Option<f64> {
    let populated: Vec<&TrompPoint> = points.iter().filter(|pt| pt.feed_count > 0).collect();
    for pair in populated.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (a.efficiency - level).abs() < f64::EPSILON {
            return Some(a.diameter);
        }
        if a.efficiency < level && b.efficiency >= level {
            let t = (level - a.efficiency) / (b.efficiency - a.efficiency);
            let ln_d = a.diameter.ln() + t * (b.diameter.ln() - a.diameter.ln());
            return Some(ln_d.exp());
        }
    }
    populated
        .last()
        .filter(|pt| (pt.efficiency - level).abs() < f64::EPSILON)
        .map(|pt| pt.diameter)
}

/// Purity and recovery of both product streams, by particle count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationSummary {
    pub fine_stream_count: u32,
    pub coarse_stream_count: u32,
    /// Particles still in flight when the run ended. Reported, never an
    /// error: slow particles are expected at short run times.
    pub uncollected_count: u32,
    /// Fraction of the fine stream that is fine material. Zero when the
    /// stream is empty.
    pub fine_purity: f64,
    pub coarse_purity: f64,
    /// Fraction of all fine-material particles that reported to the fine
    /// stream.
    pub fine_recovery: f64,
    pub coarse_recovery: f64,
}

pub fn separation_summary(set: &ParticleSet) -> SeparationSummary {
    let mut fine_stream = 0u32;
    let mut fine_stream_correct = 0u32;
    let mut coarse_stream = 0u32;
    let mut coarse_stream_correct = 0u32;
    let mut uncollected = 0u32;
    let mut fine_material = 0u32;
    let mut coarse_material = 0u32;

    for i in 0..set.len() {
        let is_fine_material = set.materials[i] == Material::Fine;
        if is_fine_material {
            fine_material += 1;
        } else {
            coarse_material += 1;
        }
        match set.lifecycles[i] {
            Lifecycle::Active => uncollected += 1,
            Lifecycle::CollectedFine => {
                fine_stream += 1;
                if is_fine_material {
                    fine_stream_correct += 1;
                }
            }
            Lifecycle::CollectedCoarse => {
                coarse_stream += 1;
                if !is_fine_material {
                    coarse_stream_correct += 1;
                }
            }
        }
    }

    let ratio = |num: u32, den: u32| if den > 0 { num as f64 / den as f64 } else { 0.0 };

    SeparationSummary {
        fine_stream_count: fine_stream,
        coarse_stream_count: coarse_stream,
        uncollected_count: uncollected,
        fine_purity: ratio(fine_stream_correct, fine_stream),
        coarse_purity: ratio(coarse_stream_correct, coarse_stream),
        fine_recovery: ratio(fine_stream_correct, fine_material),
        coarse_recovery: ratio(coarse_stream_correct, coarse_material),
    }
}
