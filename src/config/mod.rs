pub mod evolution;
pub mod manager;
pub mod training;
pub mod traits;

pub use evolution::EvolutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use training::{TopologyConfig, TrainingConfig};
pub use traits::ConfigSection;
