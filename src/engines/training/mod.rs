pub mod manager;
pub mod progress;
pub mod worker_pool;

pub use manager::{TrainingManager, TrainingParams, TrainingState, TrainingSummary};
pub use progress::{ChannelObserver, LogObserver, ProgressMessage, TrainingObserver};
pub use worker_pool::{default_capacity, TaskScope, WorkerPool};
