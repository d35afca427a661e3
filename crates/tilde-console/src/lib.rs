//! Core of the Tilde console.
//!
//! The console is a registry-based dispatch system. Commands implement the
//! [`Command`] trait and are registered by name; [`ConsoleCore`] parses input
//! lines, resolves the command name, dispatches the handler, and records
//! output in an append-only [`Scrollback`] transcript. Cyclic tab completion
//! and recall history are independent of dispatch and driven by the input
//! surface.

pub mod autocomplete;
pub mod console;
pub mod history;
pub mod registry;
pub mod scrollback;

/// Stateful cyclic prefix completion.
pub use autocomplete::{Autocompleter, CandidateSource};
/// The console core: registry + scrollback + history + completion.
pub use console::{ConsoleCore, ConsoleOptions};
/// Recall history with offset-based lookup and cursor navigation.
pub use history::History;
/// A single executable command and the closure shape adapters.
pub use registry::{Command, CommandRegistry, FnCommand};
/// Append-only transcript with decorated and remote renderings.
pub use scrollback::Scrollback;
