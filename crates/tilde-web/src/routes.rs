//! The route table.
//!
//! Routes are matched by exact path and are readable via GET/HEAD only.
//! `Static` handlers serve immutable content and may run on the accepting
//! worker thread; `Host` handlers touch console state and must be queued for
//! the host thread.

use tilde_console::ConsoleCore;
use tilde_types::error::{Result, TildeError};

use crate::http::{html_escape, Request, Response};

/// A handler safe to execute on the accepting worker thread.
pub type StaticHandler = fn(&Request) -> Response;

/// A handler that touches console state; host thread only.
pub type HostHandler = fn(&mut ConsoleCore, &Request) -> Result<Response>;

/// Where and how a matched route executes.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Immutable content, answered where the request arrived.
    Static(StaticHandler),
    /// Console-touching, marshalled onto the host thread.
    Host(HostHandler),
}

/// One entry in the route table.
pub struct Route {
    /// Exact request path.
    pub path: &'static str,
    pub handler: Handler,
}

/// The console route table.
pub static ROUTES: &[Route] = &[
    Route {
        path: "/",
        handler: Handler::Static(index_page),
    },
    Route {
        path: "/index.html",
        handler: Handler::Static(index_page),
    },
    Route {
        path: "/console/out",
        handler: Handler::Host(console_out),
    },
    Route {
        path: "/console/run",
        handler: Handler::Host(console_run),
    },
    Route {
        path: "/console/history",
        handler: Handler::Host(console_history),
    },
    Route {
        path: "/console/complete",
        handler: Handler::Host(console_complete),
    },
];

/// Match a request against the table.
///
/// A path or method mismatch is a miss; misses produce a not-found response
/// with no execution.
pub fn match_route(request: &Request) -> Option<Handler> {
    if request.method != "GET" && request.method != "HEAD" {
        return None;
    }
    ROUTES
        .iter()
        .find(|route| route.path == request.path)
        .map(|route| route.handler)
}

/// The embedded web console page.
fn index_page(_request: &Request) -> Response {
    Response::ok_bytes(
        "text/html; charset=utf-8",
        include_bytes!("../assets/index.html").to_vec(),
    )
}

/// `/console/out` -- the remote-tagged, HTML-escaped transcript.
fn console_out(console: &mut ConsoleCore, _request: &Request) -> Result<Response> {
    Ok(Response::ok_text(&html_escape(console.remote_content())))
}

/// `/console/run?command=<text>` -- run a command to completion.
fn console_run(console: &mut ConsoleCore, request: &Request) -> Result<Response> {
    let command = request
        .query_param("command")
        .ok_or_else(|| TildeError::Remote("missing 'command' query parameter".to_string()))?;
    console.run_command(command);
    Ok(Response::ok_text(""))
}

/// `/console/history?index=<n>` -- the entry at a 1-based offset from the
/// end, or an empty body when out of range.
fn console_history(console: &mut ConsoleCore, request: &Request) -> Result<Response> {
    let entry = request
        .query_param("index")
        .and_then(|raw| raw.parse::<usize>().ok())
        .and_then(|offset| console.history().get_at(offset))
        .unwrap_or("");
    Ok(Response::ok_text(entry))
}

/// `/console/complete?command=<text>` -- one cyclic completion step.
fn console_complete(console: &mut ConsoleCore, request: &Request) -> Result<Response> {
    let partial = request.query_param("command").unwrap_or("");
    let completion = console.autocomplete(partial);
    Ok(Response::ok_text(&completion))
}
