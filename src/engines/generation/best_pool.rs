use crate::types::{FitnessRecord, Genome};
use std::sync::{Mutex, MutexGuard};

/// Top genomes of one epoch, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestPool {
    genomes: Vec<Genome>,
    records: Vec<FitnessRecord>,
}

impl BestPool {
    /// Copy the first `max_size` entries of an already ranked population.
    pub fn from_ranked<'a, I>(ranked: I, max_size: usize) -> Self
    where
        I: IntoIterator<Item = (&'a Genome, &'a FitnessRecord)>,
    {
        let (genomes, records) = ranked
            .into_iter()
            .take(max_size)
            .map(|(genome, record)| (genome.clone(), *record))
            .unzip();
        Self { genomes, records }
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn records(&self) -> &[FitnessRecord] {
        &self.records
    }

    pub fn best(&self) -> Option<(&Genome, &FitnessRecord)> {
        self.genomes.first().zip(self.records.first())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// BestPool behind a single lock, replaced wholesale once per epoch.
///
/// Readers and the trainer share it across threads. A reader holding the lock
/// must not call back into the engine.
#[derive(Debug)]
pub struct SharedBestPool {
    inner: Mutex<BestPool>,
    max_size: usize,
}

impl SharedBestPool {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(BestPool::default()),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn lock(&self) -> MutexGuard<'_, BestPool> {
        // The pool is only ever swapped whole, so a poisoned guard still holds
        // a consistent snapshot.
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Best pool lock was poisoned, recovering snapshot");
            poisoned.into_inner()
        })
    }

    /// Swap in a new snapshot. The pool is built before taking the lock.
    pub fn replace(&self, pool: BestPool) {
        let _old = std::mem::replace(&mut *self.lock(), pool);
    }

    pub fn lock_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Genome], &[FitnessRecord]) -> R,
    {
        let guard = self.lock();
        f(guard.genomes(), guard.records())
    }

    pub fn snapshot(&self) -> BestPool {
        self.lock().clone()
    }
}
