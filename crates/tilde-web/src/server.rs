//! Listener lifecycle and the per-tick drain.
//!
//! `ConsoleServer::start` binds a local TCP listener and spawns an accept
//! thread; each accepted connection gets a short-lived worker that parses
//! the request and either answers it in place (static routes, errors) or
//! parks it on the request queue with the connection attached. The host
//! thread calls `drain` once per tick to serve the parked requests.

use std::io::BufReader;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tilde_console::ConsoleCore;
use tilde_types::error::Result;

use crate::http::{Request, Response};
use crate::queue::{QueuedRequest, RequestQueue};
use crate::routes::{match_route, Handler};

/// How long a connection may stall a read or a write before it is given up.
///
/// The write side matters most: host-route responses are written on the
/// host thread during the drain, so a client that never reads must cost at
/// most this long.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on. Port 0 asks the OS for a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 55055 }
    }
}

/// A running console listener.
///
/// Stops on drop. Host-route requests only make progress while the owner
/// keeps calling [`ConsoleServer::drain`].
pub struct ConsoleServer {
    queue: RequestQueue,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
    local_port: u16,
}

impl ConsoleServer {
    /// Bind the listener and start accepting connections.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, config.port))?;
        let local_port = listener.local_addr()?.port();
        let queue = RequestQueue::new();
        let running = Arc::new(AtomicBool::new(true));

        let accept_queue = queue.clone();
        let accept_running = Arc::clone(&running);
        let accept_thread = thread::Builder::new()
            .name("tilde-web-accept".to_string())
            .spawn(move || accept_loop(listener, accept_queue, accept_running))?;

        log::info!("console listener on 127.0.0.1:{local_port}");
        Ok(Self {
            queue,
            running,
            accept_thread: Some(accept_thread),
            local_port,
        })
    }

    /// The port the listener actually bound.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Number of host-route requests waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Serve every parked request against the console. Call once per tick
    /// from the thread that owns the console.
    pub fn drain(&self, console: &mut ConsoleCore) -> usize {
        self.queue.drain(console)
    }

    /// Stop accepting and join the accept thread.
    ///
    /// Requests still parked on the queue are dropped; their connections
    /// close without a response.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        // The accept loop is blocked in accept(); poke it awake.
        let wake = SocketAddr::from((Ipv4Addr::LOCALHOST, self.local_port));
        let _ = TcpStream::connect_timeout(&wake, Duration::from_millis(200));
        if let Some(handle) = self.accept_thread.take() {
            if handle.join().is_err() {
                log::warn!("accept thread panicked during shutdown");
            }
        }
    }
}

impl Drop for ConsoleServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(listener: TcpListener, queue: RequestQueue, running: Arc<AtomicBool>) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match stream {
            Ok(stream) => {
                let queue = queue.clone();
                let spawned = thread::Builder::new()
                    .name("tilde-web-conn".to_string())
                    .spawn(move || handle_connection(stream, &queue));
                if let Err(err) = spawned {
                    log::warn!("failed to spawn connection worker: {err}");
                }
            },
            Err(err) => log::warn!("accept failed: {err}"),
        }
    }
}

/// Parse one request and dispatch it.
///
/// Parse failures and route misses are answered right here; host routes
/// hand the connection to the queue and the worker exits.
fn handle_connection(stream: TcpStream, queue: &RequestQueue) {
    let timeouts = stream
        .set_read_timeout(Some(IO_TIMEOUT))
        .and_then(|()| stream.set_write_timeout(Some(IO_TIMEOUT)));
    if let Err(err) = timeouts {
        log::warn!("failed to set stream timeouts: {err}");
        return;
    }

    let request = match Request::parse(&mut BufReader::new(&stream)) {
        Ok(request) => request,
        Err(err) => {
            respond(stream, &Response::bad_request(&err.to_string()), false);
            return;
        },
    };
    let head_only = request.method == "HEAD";

    match match_route(&request) {
        None => respond(stream, &Response::not_found(&request.path), head_only),
        Some(Handler::Static(handler)) => {
            let response = handler(&request);
            respond(stream, &response, head_only);
        },
        Some(Handler::Host(handler)) => {
            queue.push(QueuedRequest {
                request,
                handler,
                responder: Box::new(move |response| {
                    respond(stream, &response, head_only);
                }),
            });
        },
    }
}

fn respond(mut stream: TcpStream, response: &Response, head_only: bool) {
    if let Err(err) = response.write_to(&mut stream, head_only) {
        log::debug!("failed to write response: {err}");
    }
}
