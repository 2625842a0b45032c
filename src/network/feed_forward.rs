use super::activation::gelu;
use super::topology::Topology;
use crate::error::{EvonetError, Result};
use crate::tensor::{vec_mul_mat, Buffer};
use crate::types::{Genome, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f32::consts::FRAC_1_SQRT_2;

/// Standard deviation of the Xavier-style initialisation
const XAVIER_STD: Scalar = FRAC_1_SQRT_2;

#[derive(Debug, Clone)]
struct Layer {
    weights: Buffer<'static>, // input_width x output_width
    biases: Buffer<'static>,  // 1 x output_width
}

impl Layer {
    fn new(input_width: usize, output_width: usize) -> Self {
        Self {
            weights: Buffer::zeros(input_width, output_width),
            biases: Buffer::zeros(1, output_width),
        }
    }

    fn input_width(&self) -> usize {
        self.weights.rows()
    }

    fn output_width(&self) -> usize {
        self.weights.cols()
    }

    /// `out = gelu(input · W + b)`
    fn feed(&self, input: &[Scalar], out: &mut Buffer<'_>) -> Result<()> {
        vec_mul_mat(out, input, &self.weights)?;
        out.add_assign(&self.biases)?;
        out.apply(gelu);
        Ok(())
    }
}

/// Scratch memory for [`Network::forward`].
///
/// Two regions, each as wide as the widest layer. Hidden activations bounce
/// between them so a forward pass never allocates.
#[derive(Debug, Clone)]
pub struct Scratch {
    ping: Vec<Scalar>,
    pong: Vec<Scalar>,
}

impl Scratch {
    pub fn new(width: usize) -> Self {
        Self {
            ping: vec![0.0; width],
            pong: vec![0.0; width],
        }
    }

    pub fn width(&self) -> usize {
        self.ping.len()
    }
}

/// Feed-forward stack of dense GELU layers.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    layers: Vec<Layer>,
}

impl Network {
    fn with_zero_layers(topology: &Topology) -> Self {
        let layers = topology
            .widths()
            .windows(2)
            .map(|w| Layer::new(w[0], w[1]))
            .collect();
        Self {
            topology: topology.clone(),
            layers,
        }
    }

    /// Random network, deterministic in `seed`.
    ///
    /// Every weight and bias is drawn from Normal(0, 1/sqrt(2)), layer by
    /// layer, weights before biases.
    pub fn from_seed(seed: u64, topology: &Topology) -> Self {
        let mut net = Self::with_zero_layers(topology);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draw = |_: Scalar| rng.sample::<Scalar, _>(StandardNormal) * XAVIER_STD;

        for layer in &mut net.layers {
            layer.weights.apply(&mut draw);
            layer.biases.apply(&mut draw);
        }
        net
    }

    /// Rebuild a network from its flattened parameters.
    pub fn from_genome(genome: &[Scalar], topology: &Topology) -> Result<Self> {
        let expected = topology.parameter_count();
        if genome.len() != expected {
            return Err(EvonetError::SizeMismatch {
                expected,
                actual: genome.len(),
            });
        }

        let mut net = Self::with_zero_layers(topology);
        let mut pos = 0;
        for layer in &mut net.layers {
            let n = layer.weights.len();
            layer.weights.load_from(&genome[pos..pos + n])?;
            pos += n;
            let n = layer.biases.len();
            layer.biases.load_from(&genome[pos..pos + n])?;
            pos += n;
        }
        Ok(net)
    }

    /// Serialize weights then biases of each layer, in layer order.
    pub fn flatten(&self) -> Genome {
        let mut genome = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            genome.extend_from_slice(layer.weights.as_slice());
            genome.extend_from_slice(layer.biases.as_slice());
        }
        genome
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn input_width(&self) -> usize {
        self.topology.input_width()
    }

    pub fn output_width(&self) -> usize {
        self.topology.output_width()
    }

    pub fn parameter_count(&self) -> usize {
        self.topology.parameter_count()
    }

    /// Scratch sized for this network. Allocate once, reuse for every sample.
    pub fn scratch(&self) -> Scratch {
        Scratch::new(self.topology.max_width())
    }

    /// Run one sample through the network without allocating.
    pub fn forward(
        &self,
        scratch: &mut Scratch,
        input: &[Scalar],
        output: &mut [Scalar],
    ) -> Result<()> {
        if input.len() != self.input_width() {
            return Err(EvonetError::length(self.input_width(), input.len()));
        }
        if output.len() != self.output_width() {
            return Err(EvonetError::length(self.output_width(), output.len()));
        }
        if scratch.width() < self.topology.max_width() {
            return Err(EvonetError::length(self.topology.max_width(), scratch.width()));
        }

        let last = self.layers.len() - 1;
        let mut ping: &mut [Scalar] = &mut scratch.ping;
        let mut pong: &mut [Scalar] = &mut scratch.pong;

        for (i, layer) in self.layers.iter().enumerate() {
            let src: &[Scalar] = if i == 0 {
                input
            } else {
                &ping[..layer.input_width()]
            };
            let width = layer.output_width();

            if i == last {
                let mut out = Buffer::view(1, width, &mut *output)?;
                layer.feed(src, &mut out)?;
            } else {
                {
                    let mut out = Buffer::view(1, width, &mut pong[..width])?;
                    layer.feed(src, &mut out)?;
                }
                std::mem::swap(&mut ping, &mut pong);
            }
        }
        Ok(())
    }

    /// Allocating convenience wrapper around [`Network::forward`].
    pub fn predict(&self, input: &[Scalar]) -> Result<Vec<Scalar>> {
        let mut scratch = self.scratch();
        let mut output = vec![0.0; self.output_width()];
        self.forward(&mut scratch, input, &mut output)?;
        Ok(output)
    }
}
