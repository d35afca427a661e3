//! Remote bridge for the Tilde console.
//!
//! A background listener accepts HTTP requests on worker threads and matches
//! them against a small route table. Routes that touch console state are not
//! executed where they arrive: they are queued into a mutex-guarded FIFO and
//! drained by the host thread once per tick, so all console mutation stays
//! confined to the one thread that owns it. Static routes are answered
//! directly on the accepting worker.

pub mod http;
pub mod queue;
pub mod routes;
pub mod server;

/// HTTP request/response primitives.
pub use http::{Request, Response};
/// The cross-thread request hand-off queue.
pub use queue::{QueuedRequest, RequestQueue};
/// The console server: listener lifecycle plus per-tick drain.
pub use server::{ConsoleServer, ServerConfig};
