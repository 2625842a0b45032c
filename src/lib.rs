//! Neuroevolution of small feed-forward networks.
//!
//! A [`TrainingManager`] evolves a population of flattened networks on a
//! background thread, scoring each one with a caller-supplied fitness
//! function on a bounded [`WorkerPool`].

pub mod config;
pub mod engines;
pub mod error;
pub mod network;
pub mod tensor;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use engines::generation::{BestPool, EvolutionConfig, EvolutionEngine};
pub use engines::training::{TrainingManager, TrainingParams, TrainingSummary, WorkerPool};
pub use error::{EvonetError, Result};
pub use network::{Network, Topology};
pub use types::{FitnessRecord, Genome, Scalar};
