use evonet::engines::training::{default_capacity, WorkerPool};
use evonet::EvonetError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Tracks how many tasks are running at once and the peak seen.
#[derive(Default)]
struct Concurrency {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Concurrency {
    fn enter(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn test_in_flight_never_exceeds_capacity() {
    for capacity in [1, 3, default_capacity()] {
        let pool = WorkerPool::new(capacity).unwrap();
        let tracker = Concurrency::default();
        let mut max_in_flight = 0;

        pool.run(|scope| {
            for i in 0..200u64 {
                let tracker = &tracker;
                scope.submit(move || {
                    tracker.enter();
                    thread::sleep(Duration::from_micros(50 + (i % 7) * 20));
                    tracker.exit();
                    Ok(())
                });
                max_in_flight = max_in_flight.max(scope.in_flight());
            }
            assert_eq!(scope.submitted(), 200);
        })
        .unwrap();

        let peak = tracker.peak.load(Ordering::SeqCst);
        assert!(peak >= 1);
        assert!(peak <= capacity, "peak {} over capacity {}", peak, capacity);
        assert!(max_in_flight <= capacity);
        assert_eq!(tracker.running.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn test_run_waits_for_every_task() {
    let pool = WorkerPool::new(4).unwrap();
    let mut results = vec![0usize; 64];

    pool.run(|scope| {
        for (i, slot) in results.iter_mut().enumerate() {
            scope.submit(move || {
                thread::sleep(Duration::from_micros(((64 - i) * 10) as u64));
                *slot = i + 1;
                Ok(())
            });
        }
    })
    .unwrap();

    // Attributed by index, whatever the completion order
    for (i, value) in results.iter().enumerate() {
        assert_eq!(*value, i + 1);
    }
}

#[test]
fn test_first_failure_by_submission_order() {
    let pool = WorkerPool::new(3).unwrap();
    let completed = AtomicUsize::new(0);

    let result = pool.run(|scope| {
        for i in 0..30usize {
            let completed = &completed;
            scope.submit(move || {
                // Later failures finish first
                thread::sleep(Duration::from_micros(((30 - i) * 30) as u64));
                if i % 10 == 9 {
                    return Err(EvonetError::Configuration(format!("task {} rejected", i)));
                }
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
    });

    assert_eq!(completed.load(Ordering::SeqCst), 27);
    match result {
        Err(EvonetError::TaskFailure { index, message }) => {
            assert_eq!(index, 9);
            assert!(message.contains("task 9 rejected"));
        }
        other => panic!("expected a task failure, got {:?}", other),
    }
}
