//! Bounded FIFO task queue owned by one execution context.
//!
//! Any thread may schedule tasks through a [`TaskSender`]; only the owning
//! context drains the queue through its [`TaskReceiver`]. Scheduling never
//! blocks: a full queue rejects the task with [`EditorError::QueueFull`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use parking_lot::RwLock;

use crate::error::{EditorError, Result};

type TaskFn<C> = Box<dyn FnOnce(&mut C) -> Result<()> + Send>;

/// A unit of work that runs on an execution context of type `C`.
pub struct Task<C> {
    label: &'static str,
    run: TaskFn<C>,
}

impl<C> Task<C> {
    pub fn new<F>(label: &'static str, run: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        Self {
            label,
            run: Box::new(run),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish()
    }
}

pub(crate) enum Envelope<C> {
    Run(Task<C>),
    Shutdown,
}

/// Statistics about queue usage
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    /// Tasks accepted by `schedule`
    pub scheduled: u64,
    /// Tasks that returned `Ok`
    pub completed: u64,
    /// Tasks that returned `Err`
    pub failed: u64,
    /// Tasks that panicked
    pub panicked: u64,
    /// Tasks rejected because the queue was full or closed
    pub rejected: u64,
    /// Peak number of queued tasks
    pub peak_depth: usize,
}

/// Sending half of a task queue. Cheap to clone.
pub struct TaskSender<C> {
    name: &'static str,
    sender: Sender<Envelope<C>>,
    stats: Arc<RwLock<QueueStats>>,
    stop: Arc<AtomicBool>,
}

impl<C> Clone for TaskSender<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
            stop: Arc::clone(&self.stop),
        }
    }
}

/// Receiving half of a task queue, held by the owning context.
pub struct TaskReceiver<C> {
    name: &'static str,
    receiver: Receiver<Envelope<C>>,
    stats: Arc<RwLock<QueueStats>>,
    stop: Arc<AtomicBool>,
}

impl<C> Clone for TaskReceiver<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
            stop: Arc::clone(&self.stop),
        }
    }
}

/// Create a bounded task queue for one execution context.
pub fn task_queue<C>(name: &'static str, capacity: usize) -> (TaskSender<C>, TaskReceiver<C>) {
    let (sender, receiver) = bounded(capacity.max(1));
    let stats = Arc::new(RwLock::new(QueueStats::default()));
    let stop = Arc::new(AtomicBool::new(false));

    (
        TaskSender {
            name,
            sender,
            stats: Arc::clone(&stats),
            stop: Arc::clone(&stop),
        },
        TaskReceiver {
            name,
            receiver,
            stats,
            stop,
        },
    )
}

impl<C> TaskSender<C> {
    /// Queue name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueue a task without blocking.
    pub fn schedule(&self, task: Task<C>) -> Result<()> {
        let label = task.label;
        match self.sender.try_send(Envelope::Run(task)) {
            Ok(()) => {
                let depth = self.sender.len();
                let mut stats = self.stats.write();
                stats.scheduled += 1;
                if depth > stats.peak_depth {
                    stats.peak_depth = depth;
                }
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.stats.write().rejected += 1;
                log::warn!("[{}] queue full, dropping task '{}'", self.name, label);
                Err(EditorError::QueueFull(self.name))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.write().rejected += 1;
                log::warn!("[{}] context closed, dropping task '{}'", self.name, label);
                Err(EditorError::ContextClosed(self.name))
            }
        }
    }

    /// Ask a runner draining this queue to stop once earlier tasks are done.
    ///
    /// Never blocks. The wake-up message is best effort: on a full queue the
    /// runner sees the flag after its next task.
    pub(crate) fn request_shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        match self.sender.try_send(Envelope::Shutdown) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::debug!("[{}] queue full, runner stops after its current task", self.name);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("[{}] runner already gone", self.name);
            }
        }
    }

    /// Snapshot of queue statistics
    pub fn stats(&self) -> QueueStats {
        self.stats.read().clone()
    }

    /// Number of tasks currently queued
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

/// Outcome of waiting on the queue from a runner loop.
pub(crate) enum Wait {
    /// A task ran (or a stray message was skipped)
    Ran,
    /// Nothing arrived before the timeout
    Idle,
    /// Shutdown requested or every sender dropped
    Stop,
}

impl<C> TaskReceiver<C> {
    /// Queue name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run every task queued at the moment of the call, in FIFO order.
    ///
    /// Tasks scheduled while pumping run on the next pump. Returns the number
    /// of tasks executed.
    pub fn pump(&self, ctx: &mut C) -> usize {
        let queued = self.receiver.len();
        let mut executed = 0;

        for _ in 0..queued {
            match self.receiver.try_recv() {
                Ok(Envelope::Run(task)) => {
                    self.execute(task, ctx);
                    executed += 1;
                }
                Ok(Envelope::Shutdown) => {
                    log::debug!("[{}] ignoring shutdown request while pumping", self.name);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        executed
    }

    /// Block until the next message or the timeout, running it if it is a task.
    pub(crate) fn wait(&self, ctx: &mut C, timeout: Duration) -> Wait {
        match self.receiver.recv_timeout(timeout) {
            Ok(Envelope::Run(task)) => {
                self.execute(task, ctx);
                Wait::Ran
            }
            Ok(Envelope::Shutdown) => Wait::Stop,
            Err(RecvTimeoutError::Timeout) => Wait::Idle,
            Err(RecvTimeoutError::Disconnected) => Wait::Stop,
        }
    }

    /// Whether a runner draining this queue was asked to stop
    pub fn shutdown_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Snapshot of queue statistics
    pub fn stats(&self) -> QueueStats {
        self.stats.read().clone()
    }

    /// Number of tasks currently queued
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn execute(&self, task: Task<C>, ctx: &mut C) {
        let Task { label, run } = task;

        match panic::catch_unwind(AssertUnwindSafe(|| run(ctx))) {
            Ok(Ok(())) => {
                self.stats.write().completed += 1;
            }
            Ok(Err(e)) => {
                self.stats.write().failed += 1;
                log::error!("[{}] task '{}' failed: {}", self.name, label, e);
            }
            Err(payload) => {
                self.stats.write().panicked += 1;
                let error = EditorError::TaskPanicked {
                    label,
                    message: panic_message(payload.as_ref()),
                };
                log::error!("[{}] {}", self.name, error);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let (tx, rx) = task_queue::<Vec<u32>>("test", 16);
        for i in 0..5 {
            tx.schedule(Task::new("push", move |log: &mut Vec<u32>| {
                log.push(i);
                Ok(())
            }))
            .unwrap();
        }

        let mut log = Vec::new();
        assert_eq!(rx.pump(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_failure_and_panic_are_isolated() {
        let (tx, rx) = task_queue::<Vec<u32>>("test", 16);
        tx.schedule(Task::new("first", |log: &mut Vec<u32>| {
            log.push(1);
            Ok(())
        }))
        .unwrap();
        tx.schedule(Task::new("fails", |_: &mut Vec<u32>| Err(EditorError::Config("boom".into()))))
            .unwrap();
        tx.schedule(Task::new("panics", |_: &mut Vec<u32>| panic!("task blew up")))
            .unwrap();
        tx.schedule(Task::new("last", |log: &mut Vec<u32>| {
            log.push(2);
            Ok(())
        }))
        .unwrap();

        let mut log = Vec::new();
        assert_eq!(rx.pump(&mut log), 4);
        assert_eq!(log, vec![1, 2]);

        let stats = rx.stats();
        assert_eq!(stats.scheduled, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.panicked, 1);
    }

    #[test]
    fn test_full_queue_rejects_without_blocking() {
        let (tx, _rx) = task_queue::<()>("tiny", 1);
        tx.schedule(Task::new("a", |_| Ok(()))).unwrap();
        let err = tx.schedule(Task::new("b", |_| Ok(()))).unwrap_err();
        assert!(matches!(err, EditorError::QueueFull("tiny")));
        assert_eq!(tx.stats().rejected, 1);
    }

    #[test]
    fn test_shutdown_request_on_full_queue_returns() {
        let (tx, rx) = task_queue::<Vec<u32>>("full", 1);
        tx.schedule(Task::new("push", |log: &mut Vec<u32>| {
            log.push(7);
            Ok(())
        }))
        .unwrap();

        tx.request_shutdown();
        assert!(rx.shutdown_requested());

        // The queued task is still there to drain
        let mut log = Vec::new();
        assert_eq!(rx.pump(&mut log), 1);
        assert_eq!(log, vec![7]);
    }

    #[test]
    fn test_closed_queue_rejects() {
        let (tx, rx) = task_queue::<()>("gone", 4);
        drop(rx);
        let err = tx.schedule(Task::new("a", |_| Ok(()))).unwrap_err();
        assert!(matches!(err, EditorError::ContextClosed("gone")));
    }

    #[test]
    fn test_tasks_scheduled_during_pump_run_next_pump() {
        let (tx, rx) = task_queue::<Vec<u32>>("test", 16);
        let again = tx.clone();
        tx.schedule(Task::new("outer", move |log: &mut Vec<u32>| {
            log.push(1);
            again.schedule(Task::new("inner", |log: &mut Vec<u32>| {
                log.push(2);
                Ok(())
            }))
        }))
        .unwrap();

        let mut log = Vec::new();
        assert_eq!(rx.pump(&mut log), 1);
        assert_eq!(log, vec![1]);
        assert_eq!(rx.pump(&mut log), 1);
        assert_eq!(log, vec![1, 2]);
    }
}
