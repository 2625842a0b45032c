use super::traits::ConfigSection;
use crate::engines::generation::operators::{CrossoverStrategy, MutationStrategy};
use crate::error::EvonetError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub initial_population: usize,
    pub selection_breadth: usize, // Top individuals bred with each other
    pub report_breadth: usize,    // Top individuals kept in the best pool
    pub mutation_rate: f32,
    pub mutation: MutationStrategy,
    pub crossover: CrossoverStrategy,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            initial_population: 100,
            selection_breadth: 10,
            report_breadth: 10,
            mutation_rate: 0.1,
            mutation: MutationStrategy::NormalDist,
            crossover: CrossoverStrategy::Uniform,
        }
    }
}

impl EvolutionConfig {
    /// Size of every bred generation: `2 * (S - 1) * (S - 2)`
    pub fn offspring_count(&self) -> usize {
        offspring_count(self.selection_breadth)
    }
}

/// Children produced by breeding the top `selection_breadth` genomes.
pub fn offspring_count(selection_breadth: usize) -> usize {
    if selection_breadth < 3 {
        return 0;
    }
    2 * (selection_breadth - 1) * (selection_breadth - 2)
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), EvonetError> {
        if self.selection_breadth < 3 {
            return Err(EvonetError::Configuration(
                "Selection breadth must be at least 3".to_string(),
            ));
        }
        if self.report_breadth == 0 {
            return Err(EvonetError::Configuration(
                "Report breadth must be at least 1".to_string(),
            ));
        }
        if self.initial_population < self.selection_breadth {
            return Err(EvonetError::Configuration(format!(
                "Initial population ({}) must be at least the selection breadth ({})",
                self.initial_population, self.selection_breadth
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvonetError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.offspring_count(), 144);
    }

    #[test]
    fn test_offspring_count() {
        assert_eq!(offspring_count(2), 0);
        assert_eq!(offspring_count(3), 4);
        assert_eq!(offspring_count(4), 12);
        assert_eq!(offspring_count(10), 144);
    }

    #[test]
    fn test_validation() {
        let mut config = EvolutionConfig::default();
        config.selection_breadth = 2;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.initial_population = 5;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.mutation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.report_breadth = 0;
        assert!(config.validate().is_err());
    }
}
