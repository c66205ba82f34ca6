//! Dedicated threads that own an execution context and drain its queue.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::queue::{TaskReceiver, TaskSender, Wait};
use crate::error::{EditorError, Result};

/// A single-threaded execution context that owns a task queue.
pub trait ExecutionContext: Send + 'static {
    /// The queue this context drains
    fn task_receiver(&self) -> TaskReceiver<Self>
    where
        Self: Sized;

    /// Called at the runner's tick rate with the elapsed seconds.
    fn tick(&mut self, _dt: f32) {}
}

/// Handle to a context running on its own thread.
pub struct ContextRunner<C> {
    name: &'static str,
    shutdown: TaskSender<C>,
    handle: Option<JoinHandle<C>>,
}

impl<C: ExecutionContext> ContextRunner<C> {
    /// Move `ctx` onto a named thread. Queued tasks run in FIFO order; when
    /// the queue stays empty for `tick`, [`ExecutionContext::tick`] is
    /// called so per-frame work keeps flowing.
    pub fn spawn(name: &'static str, mut ctx: C, sender: TaskSender<C>, tick: Duration) -> Result<Self> {
        let receiver = ctx.task_receiver();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                log::debug!("[{}] runner started", name);
                let mut last_tick = Instant::now();

                loop {
                    match receiver.wait(&mut ctx, tick) {
                        Wait::Stop => break,
                        Wait::Ran | Wait::Idle => {}
                    }
                    if receiver.shutdown_requested() {
                        break;
                    }

                    let elapsed = last_tick.elapsed();
                    if elapsed >= tick {
                        ctx.tick(elapsed.as_secs_f32());
                        last_tick = Instant::now();
                    }
                }

                // Drain what was queued ahead of the shutdown request
                receiver.pump(&mut ctx);
                log::debug!("[{}] runner stopped", name);
                ctx
            })?;

        Ok(Self {
            name,
            shutdown: sender,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the thread after already queued tasks and hand the context back.
    pub fn shutdown(mut self) -> Result<C> {
        self.shutdown.request_shutdown();
        let handle = self
            .handle
            .take()
            .ok_or(EditorError::ContextClosed(self.name))?;

        handle.join().map_err(|_| EditorError::TaskPanicked {
            label: self.name,
            message: "runner thread panicked".to_string(),
        })
    }
}

impl<C> Drop for ContextRunner<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Detached runner: ask it to stop, don't wait
            self.shutdown.request_shutdown();
            drop(handle);
        }
    }
}
