use super::traits::ConfigSection;
use crate::error::EvonetError;
use crate::network::Topology;
use serde::{Deserialize, Serialize};

/// Network shape, either spelled out or derived from input/output sizes.
///
/// A non-empty `widths` wins; otherwise the default funnel for `inputs` and
/// `outputs` is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub widths: Vec<usize>,
    pub inputs: usize,
    pub outputs: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            widths: Vec::new(),
            inputs: 4,
            outputs: 2,
        }
    }
}

impl TopologyConfig {
    pub fn explicit(widths: Vec<usize>) -> Self {
        Self {
            widths,
            ..Self::default()
        }
    }

    pub fn funnel(inputs: usize, outputs: usize) -> Self {
        Self {
            widths: Vec::new(),
            inputs,
            outputs,
        }
    }

    pub fn resolve(&self) -> Result<Topology, EvonetError> {
        if self.widths.is_empty() {
            Topology::funnel(self.inputs, self.outputs)
        } else {
            Topology::new(self.widths.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_epochs: usize,
    pub workers: Option<usize>, // None = available cores + 1
    pub topology: TopologyConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_epochs: 100,
            workers: None,
            topology: TopologyConfig::default(),
        }
    }
}

impl ConfigSection for TrainingConfig {
    fn section_name() -> &'static str {
        "training"
    }

    fn validate(&self) -> Result<(), EvonetError> {
        if self.max_epochs == 0 {
            return Err(EvonetError::Configuration(
                "Max epochs must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(EvonetError::Configuration(
                "Worker count must be at least 1".to_string(),
            ));
        }
        self.topology.resolve()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_resolution() {
        let explicit = TopologyConfig::explicit(vec![4, 8, 4, 2]);
        assert_eq!(explicit.resolve().unwrap().widths(), &[4, 8, 4, 2]);

        let funnel = TopologyConfig::funnel(8, 2);
        assert_eq!(funnel.resolve().unwrap().widths(), &[8, 10, 6, 2, 2]);
    }

    #[test]
    fn test_validation() {
        assert!(TrainingConfig::default().validate().is_ok());

        let mut config = TrainingConfig::default();
        config.max_epochs = 0;
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.topology = TopologyConfig::explicit(vec![3]);
        assert!(config.validate().is_err());
    }
}
