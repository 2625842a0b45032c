use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of every buffer, layer and genome
pub type Scalar = f32;

/// Flat parameter vector of one network.
///
/// Layers are laid out in order, each as its weight matrix (row-major, one row
/// per input neuron) followed by its bias vector. A genome of the right length
/// for a topology maps to exactly one `Network` and back, so the genetic
/// operators never need to know about layers at all.
pub type Genome = Vec<Scalar>;

/// Score of one genome in one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub fitness: f64,
    pub epoch: usize,
    pub index: usize, // Position in that epoch's population
}

impl FitnessRecord {
    pub fn new(fitness: f64, epoch: usize, index: usize) -> Self {
        Self {
            fitness,
            epoch,
            index,
        }
    }

    /// Fitness used for ranking: NaN sorts below every number.
    pub fn rank_key(&self) -> f64 {
        if self.fitness.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.fitness
        }
    }
}

impl fmt::Display for FitnessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch:{},idx:{}", self.epoch, self.index)
    }
}
