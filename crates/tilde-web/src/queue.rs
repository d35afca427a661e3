//! The cross-thread request hand-off queue.
//!
//! Worker threads push console-touching requests here; the host thread
//! drains the queue once per tick and executes the handlers against the
//! console it owns. Execution order is arrival order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tilde_console::ConsoleCore;

use crate::http::{Request, Response};
use crate::routes::HostHandler;

/// Delivers the handler's response back to whoever is waiting on it.
pub type Responder = Box<dyn FnOnce(Response) + Send>;

/// One console-touching request parked for the host thread.
pub struct QueuedRequest {
    pub request: Request,
    pub handler: HostHandler,
    pub responder: Responder,
}

/// A mutex-guarded FIFO shared between the listener and the host thread.
///
/// Cloning shares the underlying queue.
#[derive(Clone, Default)]
pub struct RequestQueue {
    inner: Arc<Mutex<VecDeque<QueuedRequest>>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a request for the next drain.
    pub fn push(&self, queued: QueuedRequest) {
        self.lock().push_back(queued);
    }

    /// Number of requests waiting.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Execute every waiting request against the console, in arrival order.
    ///
    /// Handler errors become 500 responses carrying the error text; they do
    /// not stop the drain. Requests pushed while the drain is executing wait
    /// for the next call. Returns the number of requests served.
    pub fn drain(&self, console: &mut ConsoleCore) -> usize {
        // Snapshot under the lock, execute outside it. Handlers must not
        // block the workers that are still accepting connections.
        let batch: Vec<QueuedRequest> = self.lock().drain(..).collect();
        let served = batch.len();
        for queued in batch {
            let response = match (queued.handler)(console, &queued.request) {
                Ok(response) => response,
                Err(err) => {
                    log::warn!(
                        "remote request {} failed: {err}",
                        queued.request.path
                    );
                    Response::internal_error(&err.to_string())
                },
            };
            (queued.responder)(response);
        }
        served
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedRequest>> {
        // A poisoned queue only means a worker panicked mid-push; the
        // structure itself is still sound.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
