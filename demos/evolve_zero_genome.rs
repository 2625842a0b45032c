//! Evolve networks towards the all-zero genome.
//!
//! Usage: `cargo run --example evolve_zero_genome [epochs] [config.toml]`

use anyhow::Context;
use evonet::engines::training::{TrainingManager, TrainingObserver, TrainingParams};
use evonet::network::{Network, Topology};
use evonet::types::FitnessRecord;
use evonet::ConfigManager;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Prints one line per finished epoch
struct CliObserver {
    start_time: Instant,
}

impl TrainingObserver for CliObserver {
    fn on_epoch_start(&mut self, _epoch: usize, _population: usize) {}

    fn on_epoch_complete(&mut self, epoch: usize, best: Option<FitnessRecord>) {
        let best = best.map_or(f64::NAN, |r| r.fitness);
        println!(
            "Epoch {:>3}: best = {:.4}, time = {:.2}s",
            epoch + 1,
            best,
            self.start_time.elapsed().as_secs_f64()
        );
    }

    fn on_epoch_abandoned(&mut self, epoch: usize) {
        println!("Epoch {:>3}: abandoned", epoch + 1);
    }
}

/// Higher is better: distance to the zero genome, negated. Also runs the
/// network once so evaluation has a realistic cost.
fn fitness(network: &Network, cancel: &AtomicBool) -> f64 {
    if cancel.load(Ordering::Relaxed) {
        return f64::NEG_INFINITY;
    }
    let mut scratch = network.scratch();
    let input = vec![1.0; network.input_width()];
    let mut output = vec![0.0; network.output_width()];
    let penalty = match network.forward(&mut scratch, &input, &mut output) {
        Ok(()) => output.iter().map(|&y| (y as f64).abs()).sum::<f64>(),
        Err(_) => return f64::NEG_INFINITY,
    };

    let norm = network
        .flatten()
        .iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt();
    -(norm + penalty)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let epochs: Option<usize> = args.get(1).and_then(|s| s.parse().ok());

    let config = ConfigManager::new();
    if let Some(path) = args.get(2) {
        config
            .load_from_file(path)
            .with_context(|| format!("loading {}", path))?;
    }

    let mut params = TrainingParams::from_config(&config.get())?;
    if args.get(2).is_none() {
        params.topology = Topology::new(vec![4, 8, 4, 2])?;
    }
    if let Some(epochs) = epochs {
        params.max_epochs = epochs;
    }

    println!(
        "Evolving {:?} ({} parameters) for {} epochs",
        params.topology.widths(),
        params.topology.parameter_count(),
        params.max_epochs
    );

    let observer = CliObserver {
        start_time: Instant::now(),
    };
    let manager = TrainingManager::start_with_observer(params, fitness, observer)?;
    let summary = manager.join().context("training failed")?;

    match summary.best {
        Some(best) => println!(
            "Finished {} epochs, best fitness {:.4} ({})",
            summary.epochs_completed, best.fitness, best
        ),
        None => println!("Finished without a completed epoch"),
    }
    Ok(())
}
