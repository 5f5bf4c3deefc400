//! Event Loop
//!
//! Single-threaded task queue standing in for a browser main thread.
//! Transport completions are spawned here so that callbacks never run
//! before the call that issued the request has returned.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use smol::channel::{self, Receiver, Sender};
use smol::LocalExecutor;

/// Cloneable handle to a thread-local executor
#[derive(Clone)]
pub struct EventLoop {
    executor: Rc<LocalExecutor<'static>>,
    pending: Rc<Cell<usize>>,
    done_tx: Sender<()>,
    done_rx: Receiver<()>,
}

impl EventLoop {
    pub fn new() -> Self {
        let (done_tx, done_rx) = channel::unbounded();
        Self {
            executor: Rc::new(LocalExecutor::new()),
            pending: Rc::new(Cell::new(0)),
            done_tx,
            done_rx,
        }
    }

    /// Queue a task. It will not start before the loop is driven.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let pending = self.pending.clone();
        let done_tx = self.done_tx.clone();
        pending.set(pending.get() + 1);
        self.executor
            .spawn(async move {
                future.await;
                pending.set(pending.get() - 1);
                let _ = done_tx.try_send(());
            })
            .detach();
    }

    /// Number of spawned tasks that have not finished
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Run one ready task without blocking
    pub fn try_tick(&self) -> bool {
        self.executor.try_tick()
    }

    /// Drive the loop until every task, including ones spawned while
    /// running, has finished
    pub fn run_until_idle(&self) {
        if self.pending.get() == 0 {
            return;
        }
        tracing::trace!("event loop: running {} pending task(s)", self.pending.get());

        let pending = self.pending.clone();
        let done_rx = self.done_rx.clone();
        smol::block_on(self.executor.run(async move {
            while pending.get() > 0 {
                if done_rx.recv().await.is_err() {
                    break;
                }
            }
        }));
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("pending", &self.pending.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_spawned_task_waits_for_run() {
        let event_loop = EventLoop::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        event_loop.spawn(async move { r.set(true) });

        assert!(!ran.get());
        assert_eq!(event_loop.pending(), 1);
        event_loop.run_until_idle();
        assert!(ran.get());
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_tasks_spawned_by_tasks_run() {
        let event_loop = EventLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_loop = event_loop.clone();
        let o = order.clone();
        event_loop.spawn(async move {
            o.borrow_mut().push("outer");
            let o2 = o.clone();
            inner_loop.spawn(async move { o2.borrow_mut().push("inner") });
        });

        event_loop.run_until_idle();
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_blocking_work_completes() {
        let event_loop = EventLoop::new();
        let result = Rc::new(Cell::new(0));
        let r = result.clone();
        event_loop.spawn(async move {
            let value = smol::unblock(|| 21 * 2).await;
            r.set(value);
        });
        event_loop.run_until_idle();
        assert_eq!(result.get(), 42);
    }

    #[test]
    fn test_idle_loop_returns_immediately() {
        EventLoop::new().run_until_idle();
    }
}
