pub mod best_pool;
pub mod evolution_engine;
pub mod operators;

pub use crate::config::evolution::offspring_count;
pub use best_pool::{BestPool, SharedBestPool};
pub use evolution_engine::{EvolutionConfig, EvolutionEngine};
pub use operators::{CrossoverStrategy, MutationStrategy};
