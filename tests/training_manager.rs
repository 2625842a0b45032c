use evonet::engines::training::{
    ChannelObserver, ProgressMessage, TrainingManager, TrainingParams, TrainingState,
};
use evonet::network::{Network, Topology};
use evonet::types::FitnessRecord;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn negative_norm(network: &Network, _cancel: &AtomicBool) -> f64 {
    -network
        .flatten()
        .iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt()
}

fn params(max_epochs: usize) -> TrainingParams {
    TrainingParams::new(Topology::new(vec![4, 8, 4, 2]).unwrap(), max_epochs)
}

#[test]
fn test_evolves_towards_zero_genome() {
    let (tx, rx) = channel();
    let manager =
        TrainingManager::start_with_observer(params(3), negative_norm, ChannelObserver::new(tx))
            .unwrap();
    let summary = manager.join().unwrap();

    assert_eq!(summary.epochs_completed, 3);
    assert!(!summary.cancelled);

    let bests: Vec<FitnessRecord> = rx
        .iter()
        .filter_map(|message| match message {
            ProgressMessage::EpochComplete { best, .. } => best,
            _ => None,
        })
        .collect();
    assert_eq!(bests.len(), 3);
    assert_eq!(bests[0].epoch, 0);
    assert_eq!(bests[2].epoch, 2);
    assert!(
        bests[2].fitness >= bests[0].fitness,
        "epoch 2 best {} worse than epoch 0 best {}",
        bests[2].fitness,
        bests[0].fitness
    );
    assert_eq!(summary.best, Some(bests[2]));
}

#[test]
fn test_shutdown_mid_epoch_keeps_last_completed_generation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    // Epoch 0 (100 individuals) scores normally; from epoch 1 on every
    // evaluation waits for the cancel flag.
    let fitness = move |network: &Network, cancel: &AtomicBool| -> f64 {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        if call >= 100 {
            while !cancel.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            return 1e9;
        }
        negative_norm(network, cancel)
    };

    let manager = TrainingManager::start(params(10), fitness).unwrap();
    while manager.completed_epochs() < 1 {
        thread::sleep(Duration::from_millis(1));
    }
    while calls.load(Ordering::SeqCst) <= 100 {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(manager.current_epoch(), 1);
    assert_eq!(manager.state(), TrainingState::Running);

    let before = manager.best_pool();
    manager.request_shutdown();
    assert_ne!(manager.state(), TrainingState::Running);

    let after = manager.best_pool();
    let summary = manager.join().unwrap();

    assert_eq!(summary.epochs_completed, 1);
    assert!(summary.cancelled);
    assert_eq!(after, before);
    assert_eq!(summary.best, before.records().first().copied());
    assert!(before.records().iter().all(|r| r.epoch == 0));
    // The abandoned epoch's inflated scores never reached the pool
    assert!(before.records().iter().all(|r| r.fitness < 0.0));
}

#[test]
fn test_lock_view_while_training() {
    let manager = TrainingManager::start(params(5), negative_norm).unwrap();
    while !manager.is_finished() {
        manager.lock_view_best_pool(|genomes, records| {
            assert_eq!(genomes.len(), records.len());
            if let Some(first) = records.first() {
                assert!(records.iter().all(|r| r.epoch == first.epoch));
            }
        });
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(manager.state(), TrainingState::Stopped);
    assert_eq!(manager.join().unwrap().epochs_completed, 5);
}
