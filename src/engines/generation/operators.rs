use crate::error::{EvonetError, Result};
use crate::types::{Genome, Scalar};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// How two parents are combined into a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverStrategy {
    /// Independent coin flip per gene
    #[default]
    Uniform,
    /// Prefix from the first parent, suffix from the second
    SinglePoint,
}

impl CrossoverStrategy {
    pub fn apply<R: Rng>(self, a: &[Scalar], b: &[Scalar], rng: &mut R) -> Result<Genome> {
        match self {
            CrossoverStrategy::Uniform => uniform_crossover(a, b, rng),
            CrossoverStrategy::SinglePoint => single_point_crossover(a, b, rng),
        }
    }
}

/// How a child is perturbed after crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MutationStrategy {
    /// Add Normal(mean, stddev) of the genome's own genes
    #[default]
    NormalDist,
    /// Add Uniform[-s, s] with s = max(1, mean |gene|)
    Scaled,
}

impl MutationStrategy {
    pub fn apply<R: Rng>(self, genome: &[Scalar], rate: Scalar, rng: &mut R) -> Genome {
        match self {
            MutationStrategy::NormalDist => mutate_normal_dist(genome, rate, rng),
            MutationStrategy::Scaled => mutate_scaled(genome, rate, rng),
        }
    }
}

fn check_same_length(a: &[Scalar], b: &[Scalar]) -> Result<()> {
    if a.len() != b.len() {
        return Err(EvonetError::SizeMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Uniform crossover: each gene comes from `a` or `b` with equal probability
pub fn uniform_crossover<R: Rng>(a: &[Scalar], b: &[Scalar], rng: &mut R) -> Result<Genome> {
    check_same_length(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| if rng.gen::<f64>() < 0.5 { x } else { y })
        .collect())
}

/// Single-point crossover: genes before the cut from `a`, the rest from `b`
pub fn single_point_crossover<R: Rng>(
    a: &[Scalar],
    b: &[Scalar],
    rng: &mut R,
) -> Result<Genome> {
    check_same_length(a, b)?;
    let len = a.len();
    if len <= 1 {
        return Ok(a.to_vec());
    }

    let point = rng.gen_range(1..len);
    let mut child = a.to_vec();
    child[point..].copy_from_slice(&b[point..]);
    Ok(child)
}

/// Population mean and standard deviation of the genes
pub fn mean_and_stddev(genome: &[Scalar]) -> (Scalar, Scalar) {
    if genome.is_empty() {
        return (0.0, 0.0);
    }
    let n = genome.len() as f64;
    let (sum, sum_sq) = genome.iter().fold((0.0f64, 0.0f64), |(s, sq), &x| {
        let x = x as f64;
        (s + x, sq + x * x)
    });
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    (mean as Scalar, variance.sqrt() as Scalar)
}

/// Self-scaling mutation: the perturbation follows the genome's own
/// distribution of values.
///
/// A genome with zero spread draws from the degenerate Normal(mean, 0), so
/// every selected gene is shifted by exactly the mean.
pub fn mutate_normal_dist<R: Rng>(genome: &[Scalar], rate: Scalar, rng: &mut R) -> Genome {
    let mut child = genome.to_vec();
    let (mean, stddev) = mean_and_stddev(genome);
    let normal = Normal::new(mean, stddev).ok();

    for gene in child.iter_mut() {
        if rng.gen::<Scalar>() < rate {
            if let Some(dist) = &normal {
                *gene += dist.sample(rng);
            }
        }
    }
    child
}

/// Uniform perturbation scaled by the mean gene magnitude (never below 1)
pub fn mutate_scaled<R: Rng>(genome: &[Scalar], rate: Scalar, rng: &mut R) -> Genome {
    let mut child = genome.to_vec();
    if genome.is_empty() {
        return child;
    }
    let abs_sum: f64 = genome.iter().map(|&x| (x as f64).abs()).sum();
    let scale = ((abs_sum / genome.len() as f64) as Scalar).max(1.0);

    for gene in child.iter_mut() {
        if rng.gen::<Scalar>() < rate {
            *gene += (rng.gen::<Scalar>() * 2.0 - 1.0) * scale;
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_genome(len: usize, seed: u64) -> Genome {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(-2.0..2.0)).collect()
    }

    #[test]
    fn test_crossover_with_self_is_identity() {
        for seed in 0..20 {
            let a = random_genome(64, seed);
            let mut rng = StdRng::seed_from_u64(seed + 100);
            for strategy in [CrossoverStrategy::Uniform, CrossoverStrategy::SinglePoint] {
                assert_eq!(strategy.apply(&a, &a, &mut rng).unwrap(), a);
            }
        }
    }

    #[test]
    fn test_uniform_crossover_mixes_parents() {
        let a = vec![0.0; 200];
        let b = vec![1.0; 200];
        let mut rng = StdRng::seed_from_u64(5);
        let child = uniform_crossover(&a, &b, &mut rng).unwrap();
        let from_b = child.iter().filter(|&&x| x == 1.0).count();
        assert!(from_b > 60 && from_b < 140, "from_b = {}", from_b);
        assert!(child.iter().all(|&x| x == 0.0 || x == 1.0));
    }

    #[test]
    fn test_single_point_crossover_keeps_prefix() {
        let a: Genome = (0..10).map(|x| x as Scalar).collect();
        let b: Genome = (0..10).map(|x| -(x as Scalar) - 1.0).collect();
        let mut rng = StdRng::seed_from_u64(9);
        let child = single_point_crossover(&a, &b, &mut rng).unwrap();

        let cut = child.iter().position(|&x| x < 0.0).unwrap();
        assert!(cut >= 1);
        assert_eq!(&child[..cut], &a[..cut]);
        assert_eq!(&child[cut..], &b[cut..]);
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = uniform_crossover(&[1.0, 2.0], &[1.0], &mut rng).unwrap_err();
        assert!(matches!(err, EvonetError::SizeMismatch { .. }));
    }

    #[test]
    fn test_mean_and_stddev() {
        let (mean, stddev) = mean_and_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-6);
        assert!((stddev - 2.0).abs() < 1e-6);
        assert_eq!(mean_and_stddev(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_zero_rate_leaves_genome_unchanged() {
        let g = random_genome(128, 3);
        let mut rng = StdRng::seed_from_u64(4);
        for strategy in [MutationStrategy::NormalDist, MutationStrategy::Scaled] {
            assert_eq!(strategy.apply(&g, 0.0, &mut rng), g);
        }
    }

    #[test]
    fn test_full_rate_changes_nearly_every_gene() {
        let g = random_genome(500, 6);
        let mut rng = StdRng::seed_from_u64(7);
        for strategy in [MutationStrategy::NormalDist, MutationStrategy::Scaled] {
            let child = strategy.apply(&g, 1.0, &mut rng);
            let changed = child.iter().zip(&g).filter(|(c, p)| c != p).count();
            assert!(changed >= 495, "{:?} changed only {}", strategy, changed);
        }
    }

    #[test]
    fn test_scaled_mutation_bounds() {
        // mean |gene| is 0.5, so the scale clamps to 1
        let g = vec![0.5; 300];
        let mut rng = StdRng::seed_from_u64(8);
        let child = mutate_scaled(&g, 1.0, &mut rng);
        assert!(child.iter().all(|&x| (x - 0.5).abs() <= 1.0));

        // mean |gene| is 10, perturbation up to 10
        let g = vec![-10.0; 300];
        let child = mutate_scaled(&g, 1.0, &mut rng);
        assert!(child.iter().all(|&x| (x + 10.0).abs() <= 10.0));
        assert!(child.iter().any(|&x| (x + 10.0).abs() > 1.0));
    }

    #[test]
    fn test_normal_mutation_tracks_genome_scale() {
        let small: Genome = random_genome(1000, 10).iter().map(|x| x * 0.01).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let child = mutate_normal_dist(&small, 1.0, &mut rng);
        let max_delta = child
            .iter()
            .zip(&small)
            .map(|(c, p)| (c - p).abs())
            .fold(0.0, Scalar::max);
        assert!(max_delta < 0.1, "max_delta = {}", max_delta);
    }

    #[test]
    fn test_normal_mutation_of_flat_genome_shifts_by_mean() {
        let flat = vec![0.5; 20];
        let mut rng = StdRng::seed_from_u64(12);
        let child = mutate_normal_dist(&flat, 1.0, &mut rng);
        assert!(child.iter().all(|&x| x == 1.0), "{:?}", child);

        let zeros = vec![0.0; 20];
        assert_eq!(mutate_normal_dist(&zeros, 1.0, &mut rng), zeros);
    }
}
