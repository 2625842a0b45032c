use super::progress::{LogObserver, TrainingObserver};
use super::worker_pool::WorkerPool;
use crate::config::traits::ConfigSection;
use crate::config::{AppConfig, EvolutionConfig};
use crate::engines::generation::{BestPool, EvolutionEngine};
use crate::error::{EvonetError, Result};
use crate::network::{Network, Topology};
use crate::types::{FitnessRecord, Genome};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Everything a training run needs besides the fitness function
#[derive(Debug, Clone)]
pub struct TrainingParams {
    pub topology: Topology,
    pub max_epochs: usize,
    pub workers: Option<usize>, // None = available cores + 1
    pub evolution: EvolutionConfig,
}

impl TrainingParams {
    pub fn new(topology: Topology, max_epochs: usize) -> Self {
        Self {
            topology,
            max_epochs,
            workers: None,
            evolution: EvolutionConfig::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            topology: config.training.topology.resolve()?,
            max_epochs: config.training.max_epochs,
            workers: config.training.workers,
            evolution: config.evolution.clone(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(EvonetError::Configuration(
                "Max epochs must be at least 1".to_string(),
            ));
        }
        self.evolution.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Running,
    ShutdownRequested,
    Stopped,
}

/// Outcome of a finished training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub epochs_completed: usize,
    pub cancelled: bool,
    pub best: Option<FitnessRecord>,
}

#[derive(Debug, Default)]
struct SharedState {
    shutdown: AtomicBool,
    stopped: AtomicBool,
    current_epoch: AtomicUsize,
    completed_epochs: AtomicUsize,
}

/// Marks the run stopped however the driver exits, panics included.
struct StopGuard(Arc<SharedState>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }
}

/// Background epoch loop.
///
/// Each epoch scores every genome through the worker pool, then hands the
/// scores to the engine to breed the next generation. A shutdown request
/// lets in-flight evaluations finish (the fitness function sees the flag and
/// may return early) and discards the epoch.
pub struct TrainingManager {
    engine: Arc<EvolutionEngine>,
    shared: Arc<SharedState>,
    handle: Option<JoinHandle<Result<TrainingSummary>>>,
}

impl TrainingManager {
    pub fn start<F>(params: TrainingParams, fitness: F) -> Result<Self>
    where
        F: Fn(&Network, &AtomicBool) -> f64 + Send + Sync + 'static,
    {
        Self::start_with_observer(params, fitness, LogObserver)
    }

    pub fn start_with_observer<F, O>(params: TrainingParams, fitness: F, observer: O) -> Result<Self>
    where
        F: Fn(&Network, &AtomicBool) -> f64 + Send + Sync + 'static,
        O: TrainingObserver + 'static,
    {
        params.validate()?;

        let pool = match params.workers {
            Some(n) => WorkerPool::new(n)?,
            None => WorkerPool::with_default_capacity()?,
        };
        let engine = Arc::new(EvolutionEngine::new(params.evolution, params.topology)?);
        let shared = Arc::new(SharedState::default());
        let population = engine.create_initial_population();

        log::info!(
            "Starting training: topology {:?}, {} parameters, population {}, {} epochs, {} workers",
            engine.topology().widths(),
            engine.topology().parameter_count(),
            population.len(),
            params.max_epochs,
            pool.capacity()
        );

        let driver = Driver {
            engine: Arc::clone(&engine),
            shared: Arc::clone(&shared),
            pool,
            fitness,
            observer,
            max_epochs: params.max_epochs,
        };
        let handle = thread::Builder::new()
            .name("evonet-trainer".to_string())
            .spawn(move || driver.run(population))?;

        Ok(Self {
            engine,
            shared,
            handle: Some(handle),
        })
    }

    /// Epoch being evaluated (or last evaluated). Not synchronized with the
    /// driver, only fresh enough for display.
    pub fn current_epoch(&self) -> usize {
        self.shared.current_epoch.load(Ordering::Relaxed)
    }

    pub fn completed_epochs(&self) -> usize {
        self.shared.completed_epochs.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> TrainingState {
        if self.shared.stopped.load(Ordering::SeqCst) {
            TrainingState::Stopped
        } else if self.shared.shutdown.load(Ordering::SeqCst) {
            TrainingState::ShutdownRequested
        } else {
            TrainingState::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Run `f` on the current best genomes and records under the pool lock.
    pub fn lock_view_best_pool<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Genome], &[FitnessRecord]) -> R,
    {
        self.engine.lock_view_best_pool(f)
    }

    pub fn best_pool(&self) -> BestPool {
        self.engine.best_pool_snapshot()
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    /// Wait for the driver and return its outcome.
    pub fn join(mut self) -> Result<TrainingSummary> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| EvonetError::DriverPanicked)?,
            None => Err(EvonetError::DriverPanicked),
        }
    }
}

impl Drop for TrainingManager {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.request_shutdown();
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!("Training stopped with error: {}", e),
                Err(_) => log::error!("Training driver panicked"),
            }
        }
    }
}

struct Driver<F, O> {
    engine: Arc<EvolutionEngine>,
    shared: Arc<SharedState>,
    pool: WorkerPool,
    fitness: F,
    observer: O,
    max_epochs: usize,
}

impl<F, O> Driver<F, O>
where
    F: Fn(&Network, &AtomicBool) -> f64 + Send + Sync,
    O: TrainingObserver,
{
    fn run(mut self, mut population: Vec<Genome>) -> Result<TrainingSummary> {
        let _guard = StopGuard(Arc::clone(&self.shared));
        let mut cancelled = false;

        for epoch in 0..self.max_epochs {
            if self.shutdown_requested() {
                cancelled = true;
                break;
            }
            self.shared.current_epoch.store(epoch, Ordering::Relaxed);
            self.observer.on_epoch_start(epoch, population.len());

            let fitnesses = self.evaluate(&population)?;

            // Never rank a generation that was cut short
            if self.shutdown_requested() {
                self.observer.on_epoch_abandoned(epoch);
                cancelled = true;
                break;
            }

            let records: Vec<FitnessRecord> = fitnesses
                .iter()
                .enumerate()
                .map(|(index, &fitness)| FitnessRecord::new(fitness, epoch, index))
                .collect();
            population = self
                .engine
                .create_new_evolution(epoch, &population, &records)?;

            self.shared
                .completed_epochs
                .store(epoch + 1, Ordering::Relaxed);
            self.observer
                .on_epoch_complete(epoch, self.engine.best_record());
        }

        let summary = TrainingSummary {
            epochs_completed: self.shared.completed_epochs.load(Ordering::Relaxed),
            cancelled,
            best: self.engine.best_record(),
        };
        log::info!(
            "Training stopped after {} epochs{}",
            summary.epochs_completed,
            if cancelled { " (shutdown requested)" } else { "" }
        );
        Ok(summary)
    }

    fn shutdown_requested(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    /// Score every genome; slot `i` always belongs to genome `i`.
    fn evaluate(&self, population: &[Genome]) -> Result<Vec<f64>> {
        let mut fitnesses = vec![f64::NEG_INFINITY; population.len()];
        let engine = &*self.engine;
        let fitness = &self.fitness;
        let shutdown = &self.shared.shutdown;

        self.pool.run(|scope| {
            for (genome, slot) in population.iter().zip(fitnesses.iter_mut()) {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                scope.submit(move || {
                    let network = engine.create_network(genome)?;
                    *slot = fitness(&network, shutdown);
                    Ok(())
                });
            }
        })?;

        Ok(fitnesses)
    }
}
