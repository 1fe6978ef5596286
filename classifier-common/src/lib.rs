pub mod config;
pub mod particle;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    AirConfig, CollectionConfig, FeedConfig, GeometryConfig, OperatingConfig, OutputConfig,
    SimulationConfig, TimingConfig,
};
pub use particle::{Lifecycle, Material};
pub use sim_params::SimParams;
pub use snapshot::ParticleSnapshot;
pub use vecmath::Vec3;
