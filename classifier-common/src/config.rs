use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::Path;

// Chamber and classifier wheel geometry, all lengths in meters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeometryConfig {
    pub chamber_radius: f64,
    pub chamber_height: f64,
    pub wheel_radius: f64,
    pub wheel_height: f64,
    pub wheel_z_center: f64,
}

// Operating point of the machine.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OperatingConfig {
    pub wheel_rpm: f64,
    pub air_flow_m3_hr: f64,
}

// Carrier air properties. Defaults are standard air at 20 C.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AirConfig {
    #[serde(default = "default_air_density")]
    pub density: f64,
    #[serde(default = "default_air_viscosity")]
    pub viscosity: f64,
    #[serde(default = "default_leak_fraction")]
    pub leak_fraction: f64,
}

impl Default for AirConfig {
    fn default() -> Self {
        AirConfig {
            density: default_air_density(),
            viscosity: default_air_viscosity(),
            leak_fraction: default_leak_fraction(),
        }
    }
}

// Feed particle population: two material classes with log-normal size
// distributions, injected into an annular feed zone.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FeedConfig {
    pub num_particles: u32,
    /// Fraction of the feed belonging to the fine material class.
    pub fine_fraction: f64,
    /// Median diameter of the fine class (micrometers).
    pub fine_median_diameter_um: f64,
    /// Log-space standard deviation of the fine class distribution.
    pub fine_sigma: f64,
    pub fine_density: f64,
    pub coarse_median_diameter_um: f64,
    pub coarse_sigma: f64,
    pub coarse_density: f64,
    /// Sampled diameters are resampled into [min, max] (micrometers).
    pub min_diameter_um: f64,
    pub max_diameter_um: f64,
    // Annular feed zone bounds (meters).
    pub zone_r_min: f64,
    pub zone_r_max: f64,
    pub zone_z_min: f64,
    pub zone_z_max: f64,
    pub seed: u64,
}

// Outlet zones and wall response.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CollectionConfig {
    pub fine_outlet_z: f64,
    pub fine_outlet_radius: f64,
    pub coarse_outlet_z: f64,
    #[serde(default = "default_wall_restitution")]
    pub wall_restitution: f64,
    #[serde(default = "default_top_restitution")]
    pub top_restitution: f64,
    /// When true, collected particles are fed back into the feed zone instead
    /// of leaving the active population. Collection counters still advance.
    #[serde(default)]
    pub reinject_collected: bool,
}

// Timing, all in seconds.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub dt: f64,
    pub total_time: f64,
    pub record_interval: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
}

// Output settings.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_snapshots: bool,
    pub save_final_state: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

fn default_air_density() -> f64 {
    1.204 // kg/m^3
}

fn default_air_viscosity() -> f64 {
    1.81e-5 // Pa s
}

fn default_leak_fraction() -> f64 {
    0.05
}

fn default_wall_restitution() -> f64 {
    0.3
}

fn default_top_restitution() -> f64 {
    0.1
}

fn default_max_speed() -> f64 {
    50.0 // m/s
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub geometry: GeometryConfig,
    pub operating: OperatingConfig,
    #[serde(default)]
    pub air: AirConfig,
    pub feed: FeedConfig,
    pub collection: CollectionConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: SimulationConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the simulation cannot run with.
    /// Invalid configuration is fatal before the run starts.
    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        if g.chamber_radius <= 0.0 || g.chamber_height <= 0.0 {
            anyhow::bail!("chamber dimensions must be positive.");
        }
        if g.wheel_radius <= 0.0 || g.wheel_height <= 0.0 {
            anyhow::bail!("wheel dimensions must be positive.");
        }
        // The axial transition ring extends 0.1 * wheel_radius past the wheel.
        if g.wheel_radius * 1.1 >= g.chamber_radius {
            anyhow::bail!(
                "wheel_radius ({}) too large for chamber_radius ({}); the annulus would vanish.",
                g.wheel_radius, g.chamber_radius
            );
        }
        let wheel_z_min = g.wheel_z_center - 0.5 * g.wheel_height;
        let wheel_z_max = g.wheel_z_center + 0.5 * g.wheel_height;
        if wheel_z_min < 0.0 || wheel_z_max > g.chamber_height {
            anyhow::bail!("wheel axial band must lie inside the chamber.");
        }

        if self.operating.wheel_rpm <= 0.0 {
            anyhow::bail!("wheel_rpm must be positive.");
        }
        if self.operating.air_flow_m3_hr <= 0.0 {
            anyhow::bail!("air_flow_m3_hr must be positive.");
        }

        if self.air.density <= 0.0 || self.air.viscosity <= 0.0 {
            anyhow::bail!("air density and viscosity must be positive.");
        }
        if !(0.0..=1.0).contains(&self.air.leak_fraction) {
            anyhow::bail!("leak_fraction must be in [0, 1].");
        }

        let f = &self.feed;
        if f.num_particles == 0 {
            anyhow::bail!("num_particles must be greater than 0.");
        }
        if !(0.0..=1.0).contains(&f.fine_fraction) {
            anyhow::bail!("fine_fraction must be in [0, 1].");
        }
        if f.fine_median_diameter_um <= 0.0 || f.coarse_median_diameter_um <= 0.0 {
            anyhow::bail!("median diameters must be positive.");
        }
        if f.fine_sigma <= 0.0 || f.coarse_sigma <= 0.0 {
            anyhow::bail!("diameter distribution sigmas must be positive.");
        }
        if f.fine_density <= 0.0 || f.coarse_density <= 0.0 {
            anyhow::bail!("material densities must be positive.");
        }
        if f.min_diameter_um <= 0.0 || f.min_diameter_um >= f.max_diameter_um {
            anyhow::bail!("diameter bounds must satisfy 0 < min < max.");
        }
        if f.zone_r_min < 0.0 || f.zone_r_min >= f.zone_r_max || f.zone_r_max > g.chamber_radius {
            anyhow::bail!("feed zone radii must satisfy 0 <= r_min < r_max <= chamber_radius.");
        }
        if f.zone_z_min < 0.0 || f.zone_z_min >= f.zone_z_max || f.zone_z_max > g.chamber_height {
            anyhow::bail!("feed zone heights must lie inside the chamber.");
        }

        let c = &self.collection;
        if c.fine_outlet_z <= 0.0 || c.fine_outlet_z > g.chamber_height {
            anyhow::bail!("fine_outlet_z must lie inside the chamber.");
        }
        if c.fine_outlet_radius <= 0.0 {
            anyhow::bail!("fine_outlet_radius must be positive.");
        }
        if c.coarse_outlet_z <= 0.0 || c.coarse_outlet_z >= c.fine_outlet_z {
            anyhow::bail!("coarse_outlet_z must be positive and below fine_outlet_z.");
        }
        if !(0.0..=1.0).contains(&c.wall_restitution) || !(0.0..=1.0).contains(&c.top_restitution) {
            anyhow::bail!("restitution coefficients must be in [0, 1].");
        }

        if self.timing.dt <= 0.0 {
            anyhow::bail!("dt must be positive.");
        }
        if self.timing.total_time <= 0.0 {
            anyhow::bail!("total_time must be positive.");
        }
        if self.timing.record_interval < 0.0 {
            anyhow::bail!("record_interval must not be negative.");
        }
        if self.timing.max_speed <= 0.0 {
            anyhow::bail!("max_speed must be positive.");
        }

        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let g = &self.geometry;
        let wheel_radius = g.wheel_radius;
        let transition_width = 0.1 * wheel_radius;

        let omega = self.operating.wheel_rpm * std::f64::consts::TAU / 60.0;
        let air_flow = self.operating.air_flow_m3_hr / 3600.0;

        let bore_area = std::f64::consts::PI * wheel_radius * wheel_radius;
        let outer = wheel_radius + transition_width;
        let annulus_area =
            std::f64::consts::PI * (g.chamber_radius * g.chamber_radius - outer * outer);

        SimParams {
            chamber_radius: g.chamber_radius,
            chamber_height: g.chamber_height,
            wheel_radius,
            wheel_height: g.wheel_height,
            wheel_z_min: g.wheel_z_center - 0.5 * g.wheel_height,
            wheel_z_max: g.wheel_z_center + 0.5 * g.wheel_height,
            omega,
            air_flow,
            air_density: self.air.density,
            air_viscosity: self.air.viscosity,
            bore_area,
            annulus_area,
            transition_width,
            leak_fraction: self.air.leak_fraction,
            r_epsilon: 1e-4,
            fine_outlet_z: self.collection.fine_outlet_z,
            fine_outlet_radius: self.collection.fine_outlet_radius,
            coarse_outlet_z: self.collection.coarse_outlet_z,
            wall_restitution: self.collection.wall_restitution,
            top_restitution: self.collection.top_restitution,
            reinject_collected: self.collection.reinject_collected,
            feed_r_min: self.feed.zone_r_min,
            feed_r_max: self.feed.zone_r_max,
            feed_z_min: self.feed.zone_z_min,
            feed_z_max: self.feed.zone_z_max,
            dt: self.timing.dt,
            max_speed: self.timing.max_speed,
            gravity: 9.81,
            seed: self.feed.seed,
        }
    }
}
