use crate::error::{EvonetError, Result};
use std::any::Any;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Cores available to the process plus one
pub fn default_capacity() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 1
}

#[derive(Debug, Default)]
struct AdmissionState {
    in_flight: usize,
    failure: Option<(usize, String)>, // Lowest failing submission index
}

/// Counts admitted-but-unfinished tasks and blocks submitters at capacity.
#[derive(Debug)]
struct Admission {
    state: Mutex<AdmissionState>,
    freed: Condvar,
    capacity: usize,
}

impl Admission {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(AdmissionState::default()),
            freed: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) {
        let mut state = self.lock();
        while state.in_flight >= self.capacity {
            state = self
                .freed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.in_flight += 1;
    }

    fn release(&self, index: usize, failure: Option<String>) {
        let mut state = self.lock();
        state.in_flight -= 1;
        if let Some(message) = failure {
            log::error!("Task {} failed: {}", index, message);
            let earlier = matches!(&state.failure, Some((first, _)) if *first < index);
            if !earlier {
                state.failure = Some((index, message));
            }
        }
        drop(state);
        self.freed.notify_one();
    }

    fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    fn take_failure(&self) -> Option<(usize, String)> {
        self.lock().failure.take()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Bounded task launcher.
///
/// A fixed set of `capacity` worker threads. Submitting blocks while
/// `capacity` tasks are admitted and unfinished, so a producer can never run
/// ahead of the workers by more than one pool's worth of tasks.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EvonetError::Configuration(
                "Worker pool capacity must be at least 1".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(capacity)
            .thread_name(|i| format!("evonet-worker-{}", i))
            .build()
            .map_err(|e| {
                EvonetError::Configuration(format!("Failed to build worker pool: {}", e))
            })?;

        Ok(Self { pool, capacity })
    }

    pub fn with_default_capacity() -> Result<Self> {
        Self::new(default_capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Open a task scope on the calling thread.
    ///
    /// Tasks submitted through the scope may borrow anything that outlives
    /// this call. Returns only once every submitted task has finished; if any
    /// task failed, the failure with the lowest submission index is returned.
    pub fn run<'scope, F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&TaskScope<'_, 'scope>) -> R,
    {
        let admission = Arc::new(Admission::new(self.capacity));
        let out = self.pool.in_place_scope(|scope| {
            let tasks = TaskScope {
                scope,
                admission: Arc::clone(&admission),
                submitted: Cell::new(0),
            };
            f(&tasks)
        });

        match admission.take_failure() {
            Some((index, message)) => Err(EvonetError::TaskFailure { index, message }),
            None => Ok(out),
        }
    }
}

/// Handle for submitting tasks inside [`WorkerPool::run`]
pub struct TaskScope<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
    admission: Arc<Admission>,
    submitted: Cell<usize>,
}

impl<'a, 'scope> TaskScope<'a, 'scope> {
    /// Admit a task, blocking while the pool is saturated.
    ///
    /// A task that returns an error or panics does not stop the others; the
    /// failure is reported when the scope closes.
    pub fn submit<T>(&self, task: T)
    where
        T: FnOnce() -> Result<()> + Send + 'scope,
    {
        let index = self.submitted.get();
        self.submitted.set(index + 1);

        self.admission.acquire();
        let admission = Arc::clone(&self.admission);
        self.scope.spawn(move |_| {
            let failure = match catch_unwind(AssertUnwindSafe(task)) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(panic_message(&*payload)),
            };
            admission.release(index, failure);
        });
    }

    pub fn submitted(&self) -> usize {
        self.submitted.get()
    }

    /// Tasks admitted and not yet finished
    pub fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }
}
