use crate::error::{EvonetError, Result};

/// Number of parameters (weights + biases) of a network with these widths.
pub fn calc_network_size(widths: &[usize]) -> usize {
    widths.windows(2).map(|w| w[0] * w[1] + w[1]).sum()
}

/// Ordered layer widths of a feed-forward network, input first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topology {
    widths: Vec<usize>,
}

impl Topology {
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.len() < 2 {
            return Err(EvonetError::Configuration(format!(
                "Topology needs at least 2 layer widths, got {}",
                widths.len()
            )));
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(EvonetError::Configuration(format!(
                "Layer width at position {} is zero",
                pos
            )));
        }
        Ok(Self { widths })
    }

    /// Default five-layer funnel for a given input/output size:
    /// `[in, max(in*1.25, out), max(in*0.75, out), max(in*0.25, out), out]`.
    pub fn funnel(inputs: usize, outputs: usize) -> Result<Self> {
        let scaled = |factor: f64| ((inputs as f64 * factor) as usize).max(outputs);
        Self::new(vec![
            inputs,
            scaled(1.25),
            scaled(0.75),
            scaled(0.25),
            outputs,
        ])
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn input_width(&self) -> usize {
        self.widths[0]
    }

    pub fn output_width(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// Number of dense layers (one less than the number of widths)
    pub fn layer_count(&self) -> usize {
        self.widths.len() - 1
    }

    pub fn max_width(&self) -> usize {
        self.widths.iter().copied().max().unwrap_or(0)
    }

    pub fn parameter_count(&self) -> usize {
        calc_network_size(&self.widths)
    }
}
