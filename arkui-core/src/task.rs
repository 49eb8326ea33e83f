//! Delayed task scheduling for the UI thread.
//!
//! Components never block. Work that has to happen later (auto-scroll ticks,
//! for example) is posted to a [`TaskExecutor`] owned by the host shell. A
//! [`CancelableTask`] wraps such postings so that:
//!
//! - scheduling again cancels whatever was scheduled before,
//! - cancelling is idempotent,
//! - a cancelled task that the executor still runs does nothing.
//!
//! [`ManualTaskExecutor`] is a deterministic executor driven by
//! [`ManualTaskExecutor::advance`]; it backs headless hosts and tests.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tracing::trace;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay on the UI thread.
pub trait TaskExecutor: Send + Sync {
    /// Schedules `task` to run once after `delay`. `name` is used for tracing.
    fn post_delayed(&self, task: Task, delay: Duration, name: &'static str);
}

#[derive(Default)]
struct TaskToken {
    generation: AtomicU64,
    pending: AtomicBool,
}

/// A handle to at most one pending scheduled closure.
#[derive(Clone, Default)]
pub struct CancelableTask {
    token: Arc<TaskToken>,
}

impl fmt::Debug for CancelableTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelableTask")
            .field("generation", &self.token.generation.load(Ordering::Acquire))
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl CancelableTask {
    /// Creates a handle with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `f` on `executor`, cancelling any previously scheduled run.
    pub fn schedule<F>(
        &self,
        executor: &dyn TaskExecutor,
        delay: Duration,
        name: &'static str,
        f: F,
    ) where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.token.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.token.pending.store(true, Ordering::Release);
        let token = Arc::clone(&self.token);
        executor.post_delayed(
            Box::new(move || {
                if token.generation.load(Ordering::Acquire) != generation {
                    trace!(name, "skipping cancelled task");
                    return;
                }
                token.pending.store(false, Ordering::Release);
                f();
            }),
            delay,
            name,
        );
    }

    /// Cancels the pending run, if any.
    pub fn cancel(&self) {
        if self.token.pending.swap(false, Ordering::AcqRel) {
            self.token.generation.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Returns `true` while a scheduled run has neither fired nor been
    /// cancelled.
    pub fn is_pending(&self) -> bool {
        self.token.pending.load(Ordering::Acquire)
    }
}

struct Scheduled {
    due: Duration,
    seq: u64,
    name: &'static str,
    task: Task,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    next_seq: u64,
    tasks: Vec<Scheduled>,
}

/// A [`TaskExecutor`] whose time only moves through [`advance`](Self::advance).
///
/// ```
/// use std::{sync::{Arc, atomic::{AtomicUsize, Ordering}}, time::Duration};
/// use arkui_core::{ManualTaskExecutor, TaskExecutor};
///
/// let executor = ManualTaskExecutor::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// executor.post_delayed(
///     Box::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
///     Duration::from_millis(15),
///     "doc",
/// );
/// executor.advance(Duration::from_millis(10));
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
/// executor.advance(Duration::from_millis(5));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualTaskExecutor {
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualTaskExecutor {
    /// Creates an empty executor at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`, running every task that becomes due in
    /// order of due time. Tasks posted while advancing run too if they fall
    /// inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.queue.lock().now + by;
        loop {
            let next = {
                let mut queue = self.queue.lock();
                let position = queue
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.due <= target)
                    .min_by_key(|(_, task)| (task.due, task.seq))
                    .map(|(index, _)| index);
                match position {
                    Some(index) => {
                        let scheduled = queue.tasks.swap_remove(index);
                        queue.now = queue.now.max(scheduled.due);
                        Some(scheduled)
                    }
                    None => {
                        queue.now = target;
                        None
                    }
                }
            };
            let Some(scheduled) = next else {
                break;
            };
            trace!(name = scheduled.name, "running manual task");
            (scheduled.task)();
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().tasks.len()
    }

    /// Time elapsed since the executor was created.
    pub fn elapsed(&self) -> Duration {
        self.queue.lock().now
    }
}

impl TaskExecutor for ManualTaskExecutor {
    fn post_delayed(&self, task: Task, delay: Duration, name: &'static str) {
        let mut queue = self.queue.lock();
        let due = queue.now + delay;
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.tasks.push(Scheduled {
            due,
            seq,
            name,
            task,
        });
    }
}
