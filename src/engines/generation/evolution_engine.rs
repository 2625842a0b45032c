pub use crate::config::evolution::EvolutionConfig;
use crate::config::traits::ConfigSection;
use crate::engines::generation::best_pool::{BestPool, SharedBestPool};
use crate::error::{EvonetError, Result};
use crate::network::{Network, Topology};
use crate::types::{FitnessRecord, Genome, Scalar};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Genetic-algorithm policy for one network topology.
///
/// Owns the breeding scheme and the best-pool snapshot. All methods take
/// `&self`, so one engine can be shared between the training driver and any
/// number of readers.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    topology: Topology,
    best_pool: SharedBestPool,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, topology: Topology) -> Result<Self> {
        config.validate()?;
        let best_pool = SharedBestPool::new(config.report_breadth);
        Ok(Self {
            config,
            topology,
            best_pool,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn create_network(&self, genome: &[Scalar]) -> Result<Network> {
        Network::from_genome(genome, &self.topology)
    }

    /// One flattened random network per individual, seeded by its index.
    pub fn create_initial_population(&self) -> Vec<Genome> {
        (0..self.config.initial_population)
            .map(|i| Network::from_seed(i as u64, &self.topology).flatten())
            .collect()
    }

    /// Rank a scored population, publish its best, and breed the next one.
    ///
    /// Breeding is deterministic in `epoch`. The size of the result depends
    /// only on the selection breadth.
    pub fn create_new_evolution(
        &self,
        epoch: usize,
        population: &[Genome],
        records: &[FitnessRecord],
    ) -> Result<Vec<Genome>> {
        if population.len() != records.len() {
            return Err(EvonetError::SizeMismatch {
                expected: population.len(),
                actual: records.len(),
            });
        }
        let breadth = self.config.selection_breadth;
        if population.len() < breadth {
            return Err(EvonetError::PopulationTooSmall {
                required: breadth,
                actual: population.len(),
            });
        }

        // Stable: equal fitness keeps population order
        let mut ranked: Vec<(&Genome, &FitnessRecord)> = population.iter().zip(records).collect();
        ranked.sort_by(|a, b| b.1.rank_key().total_cmp(&a.1.rank_key()));

        self.best_pool
            .replace(BestPool::from_ranked(ranked.iter().copied(), self.best_pool.max_size()));

        let mut rng = StdRng::seed_from_u64(epoch as u64);
        let crossover = self.config.crossover;
        let mutation = self.config.mutation;
        let rate = self.config.mutation_rate;

        let mut next = Vec::with_capacity(self.config.offspring_count());
        for i in 0..breadth {
            let parent_i = ranked[i].0;
            for j in (i + 1)..(breadth - 1) {
                for partner in [ranked[j].0, ranked[j + 1].0] {
                    next.push(crossover.apply(parent_i, partner, &mut rng)?);
                    let child = crossover.apply(parent_i, partner, &mut rng)?;
                    next.push(mutation.apply(&child, rate, &mut rng));
                }
            }
        }

        log::debug!(
            "Epoch {}: best {:.6} ({}), bred {} offspring",
            epoch,
            ranked[0].1.fitness,
            ranked[0].1,
            next.len()
        );
        Ok(next)
    }

    /// Run `f` on the current best genomes and records while holding the lock.
    ///
    /// `f` must not call back into the engine.
    pub fn lock_view_best_pool<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Genome], &[FitnessRecord]) -> R,
    {
        self.best_pool.lock_view(f)
    }

    pub fn best_pool_snapshot(&self) -> BestPool {
        self.best_pool.snapshot()
    }

    pub fn best_record(&self) -> Option<FitnessRecord> {
        self.lock_view_best_pool(|_, records| records.first().copied())
    }
}
