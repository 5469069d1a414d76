//! Execution-context dispatch for fetch callbacks.
//!
//! A [`Dispatcher`] designates the thread a completion callback must run on.
//! The fetch layer holds an `Option<Arc<dyn Dispatcher>>`; `None` means
//! "unspecified": run the callback inline on whatever task produced the
//! completion.

use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;
use tracing::debug;

/// Unit of work scheduled onto a dispatcher.
pub type Work = Box<dyn FnOnce() + Send>;

/// Runs callbacks on a designated execution context.
pub trait Dispatcher: Send + Sync {
    /// Schedules `work` to run on this dispatcher's context.
    fn dispatch(&self, work: Work);
}

/// Dispatcher backed by a dedicated named thread.
///
/// The response-queue analog for UI callbacks: all dispatched work runs, in
/// submission order, on one long-lived thread. Dropping the dispatcher stops
/// the thread after draining already-submitted work.
pub struct ResponseThread {
    tx: Option<mpsc::UnboundedSender<Work>>,
    thread_id: ThreadId,
    worker: Option<JoinHandle<()>>,
}

impl ResponseThread {
    /// Spawns the response thread.
    ///
    /// # Arguments
    ///
    /// * `name` - Thread name, for logs and debuggers
    pub fn new(name: &str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Work>();

        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(work) = rx.blocking_recv() {
                    work();
                }
            })
            .unwrap_or_else(|e| panic!("failed to spawn response thread {name:?}: {e}"));

        let thread_id = worker.thread().id();
        debug!(name = name, "response thread started");

        Self {
            tx: Some(tx),
            thread_id,
            worker: Some(worker),
        }
    }

    /// Returns the identity of the thread callbacks run on.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

impl Dispatcher for ResponseThread {
    fn dispatch(&self, work: Work) {
        if let Some(tx) = &self.tx {
            // Send only fails after drop has detached the receiver.
            let _ = tx.send(work);
        }
    }
}

impl Drop for ResponseThread {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;

    #[test]
    fn test_response_thread_runs_work_on_its_thread() {
        let dispatcher = ResponseThread::new("test-response");
        let (tx, rx) = std_mpsc::channel();

        dispatcher.dispatch(Box::new(move || {
            tx.send(thread::current().id()).unwrap();
        }));

        let observed = rx
            .recv_timeout(std::time::Duration::from_secs(2))
            .expect("work never ran");
        assert_eq!(observed, dispatcher.thread_id());
        assert_ne!(observed, thread::current().id());
    }

    #[test]
    fn test_response_thread_preserves_submission_order() {
        let dispatcher = ResponseThread::new("test-order");
        let (tx, rx) = std_mpsc::channel();

        for i in 0..5 {
            let tx = tx.clone();
            dispatcher.dispatch(Box::new(move || {
                tx.send(i).unwrap();
            }));
        }

        for expected in 0..5 {
            let got = rx
                .recv_timeout(std::time::Duration::from_secs(2))
                .expect("work never ran");
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_response_thread_drop_drains_pending_work() {
        let (tx, rx) = std_mpsc::channel();
        {
            let dispatcher = ResponseThread::new("test-drain");
            for _ in 0..3 {
                let tx = tx.clone();
                dispatcher.dispatch(Box::new(move || {
                    tx.send(()).unwrap();
                }));
            }
        }
        // Drop joined the worker, so everything submitted has run.
        assert_eq!(rx.try_iter().count(), 3);
    }
}
