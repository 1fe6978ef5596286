//! Shared configuration builders for unit tests.

use classifier_common::config::{
    AirConfig, CollectionConfig, FeedConfig, GeometryConfig, OperatingConfig, OutputConfig,
    SimulationConfig, TimingConfig,
};

/// A mid-size pilot classifier: 0.2 m wheel at 3000 rpm, 3000 m3/hr of air,
/// a 0.5 m classification zone and a mixed 2-12 um feed at 1400 kg/m3.
pub fn base_config() -> SimulationConfig {
    SimulationConfig {
        geometry: GeometryConfig {
            chamber_radius: 0.3,
            chamber_height: 1.2,
            wheel_radius: 0.2,
            wheel_height: 0.5,
            wheel_z_center: 0.6,
        },
        operating: OperatingConfig {
            wheel_rpm: 3000.0,
            air_flow_m3_hr: 3000.0,
        },
        air: AirConfig::default(),
        feed: FeedConfig {
            num_particles: 400,
            fine_fraction: 0.5,
            fine_median_diameter_um: 2.8,
            fine_sigma: 0.3,
            fine_density: 1400.0,
            coarse_median_diameter_um: 6.5,
            coarse_sigma: 0.3,
            coarse_density: 1400.0,
            min_diameter_um: 2.0,
            max_diameter_um: 12.0,
            zone_r_min: 0.205,
            zone_r_max: 0.235,
            zone_z_min: 0.70,
            zone_z_max: 0.75,
            seed: 42,
        },
        collection: CollectionConfig {
            fine_outlet_z: 1.0,
            fine_outlet_radius: 0.19,
            coarse_outlet_z: 0.12,
            wall_restitution: 0.3,
            top_restitution: 0.1,
            reinject_collected: false,
        },
        timing: TimingConfig {
            dt: 7e-6,
            total_time: 0.3,
            record_interval: 0.05,
            max_speed: 50.0,
        },
        output: OutputConfig {
            base_filename: "test_run".into(),
            save_snapshots: false,
            save_final_state: false,
            format: None,
        },
    }
}
