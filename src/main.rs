use anyhow::Result;
use classifier_common::config::SimulationConfig;
use classifier_common::particle::{Lifecycle, Material};
use classifier_engine::analysis::{self, GradeEfficiencyOptions};
use classifier_engine::forces;
use classifier_engine::simulation::ClassifierSimulation;
use log::{error, info, warn};
use std::fs::File;
use std::io::Write;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    info!("Starting air classifier simulation (CPU parallel)...");

    // --- Load Configuration ---
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = SimulationConfig::load(&config_path)?;

    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Initialize Simulation ---
    let mut sim = ClassifierSimulation::new(config)?;
    info!("Feed generated with {} particles.", sim.particles().len());
    info!(
        "Theoretical cut size: {:.2} um (fine, {} kg/m3) / {:.2} um (coarse, {} kg/m3)",
        forces::theoretical_cut_size(sim.params(), sim.config().feed.fine_density) * 1e6,
        sim.config().feed.fine_density,
        forces::theoretical_cut_size(sim.params(), sim.config().feed.coarse_density) * 1e6,
        sim.config().feed.coarse_density,
    );

    // --- Simulation Loop ---
    let params = sim.params().clone();
    let total_steps = (sim.config().timing.total_time / params.dt).ceil() as u64;
    let record_interval = sim.config().timing.record_interval;
    let mut record_interval_steps = if record_interval > 0.0 {
        (record_interval / params.dt).max(1.0).round() as u64
    } else {
        total_steps // record only the initial and final state
    };

    if record_interval > 0.0 && record_interval < params.dt {
        warn!(
            "Record interval ({:.2e} s) is smaller than the physics timestep ({:.2e} s). Recording every step.",
            record_interval, params.dt
        );
        record_interval_steps = 1;
    }
    info!(
        "Running {} steps of {:.2e} s, recording every {} steps.",
        total_steps, params.dt, record_interval_steps
    );

    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // Initial snapshot (t = 0).
    sim.record_snapshot();

    for step in 0..total_steps {
        if let Err(e) = sim.step() {
            error!("Error during simulation step {}: {}", step + 1, e);
            anyhow::bail!("Simulation step failed.");
        }

        let is_record_step = (step + 1) % record_interval_steps == 0;
        let is_last_step = step == total_steps - 1;
        let now = Instant::now();
        let should_print = now.duration_since(previous_print_time).as_secs_f64() >= 5.0;

        if should_print || is_record_step || is_last_step {
            let counts = sim.particles().counts();
            info!(
                "Step [{}/{}] (t = {:.4} s) | active: {} | fine: {} | coarse: {} | elapsed: {:.2} s",
                step + 1,
                total_steps,
                sim.sim_time(),
                counts.active,
                sim.fine_collected_total(),
                sim.coarse_collected_total(),
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = now;

            if is_record_step || is_last_step {
                sim.record_snapshot();
            }
        }
    }

    info!(
        "Simulation finished in {:.3} seconds.",
        start_time.elapsed().as_secs_f64()
    );

    // --- Separation Report ---
    let summary = analysis::separation_summary(sim.particles());
    info!(
        "Streams: fine = {}, coarse = {}, uncollected = {}",
        summary.fine_stream_count, summary.coarse_stream_count, summary.uncollected_count
    );
    info!(
        "Fine stream purity {:.1}% / recovery {:.1}% | coarse stream purity {:.1}% / recovery {:.1}%",
        summary.fine_purity * 100.0,
        summary.fine_recovery * 100.0,
        summary.coarse_purity * 100.0,
        summary.coarse_recovery * 100.0
    );

    let grade = analysis::grade_efficiency(sim.particles(), &GradeEfficiencyOptions::default());
    match (grade.d50, grade.sharpness) {
        (Some(d50), Some(kappa)) => {
            info!("Cut size d50 = {:.2} um, sharpness d75/d25 = {:.2}", d50 * 1e6, kappa);
        }
        (Some(d50), None) => info!("Cut size d50 = {:.2} um (sharpness undefined)", d50 * 1e6),
        _ => warn!("Grade efficiency curve has no cut size (one-sided separation?)"),
    }

    // --- Save Recorded Data ---
    if sim.config().output.save_snapshots {
        let output_format = sim.config().output.format.as_deref().unwrap_or("json");
        let snapshots = sim.recorded_snapshots();

        match output_format {
            "bincode" => {
                let filename = format!("{}_snapshots.bin", sim.config().output.base_filename);
                match File::create(&filename) {
                    Ok(file) => match bincode::serialize_into(file, snapshots) {
                        Ok(_) => info!("All snapshots saved to {} (binary format)", filename),
                        Err(e) => error!("Error serializing snapshots to bincode: {}", e),
                    },
                    Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
                }
            }
            "messagepack" => {
                let filename = format!("{}_snapshots.msgpack", sim.config().output.base_filename);
                match &mut File::create(&filename) {
                    Ok(file) => match rmp_serde::encode::write(file, snapshots) {
                        Ok(_) => info!("All snapshots saved to {} (MessagePack format)", filename),
                        Err(e) => error!("Error serializing snapshots to MessagePack: {}", e),
                    },
                    Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
                }
            }
            other => {
                if other != "json" {
                    error!("Unknown output format: {}. Using JSON instead.", other);
                }
                let filename = format!("{}_snapshots.json", sim.config().output.base_filename);
                match File::create(&filename) {
                    Ok(mut file) => match serde_json::to_string(snapshots) {
                        Ok(json_string) => {
                            if let Err(e) = file.write_all(json_string.as_bytes()) {
                                error!("Error writing snapshot JSON to '{}': {}", filename, e);
                            } else {
                                info!(
                                    "All snapshots saved to {} ({} MB)",
                                    filename,
                                    json_string.len() / 1_048_576
                                );
                            }
                        }
                        Err(e) => error!("Error serializing snapshots to JSON: {}", e),
                    },
                    Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
                }
            }
        }
    } else {
        info!("Skipping snapshot output as per config (save_snapshots is false).");
    }

    // Final per-particle state as CSV, separate from the full snapshots.
    if sim.config().output.save_final_state {
        let filename = format!("{}_final_state.csv", sim.config().output.base_filename);
        match csv::Writer::from_path(&filename) {
            Ok(mut writer) => {
                writer.write_record([
                    "x_m", "y_m", "z_m", "diameter_um", "density_kg_m3", "material", "lifecycle",
                ])?;
                let set = sim.particles();
                for i in 0..set.len() {
                    let material = match set.materials[i] {
                        Material::Fine => "fine",
                        Material::Coarse => "coarse",
                    };
                    let lifecycle = match set.lifecycles[i] {
                        Lifecycle::Active => "active",
                        Lifecycle::CollectedFine => "collected_fine",
                        Lifecycle::CollectedCoarse => "collected_coarse",
                    };
                    writer.write_record([
                        format!("{:.6}", set.positions[i].x),
                        format!("{:.6}", set.positions[i].y),
                        format!("{:.6}", set.positions[i].z),
                        format!("{:.4}", set.diameters[i] * 1e6),
                        format!("{:.1}", set.densities[i]),
                        material.to_string(),
                        lifecycle.to_string(),
                    ])?;
                }
                writer.flush()?;
                info!("Final particle states saved to {}", filename);
            }
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping final state output as per config.");
    }

    info!("Simulation complete.");
    Ok(())
}
