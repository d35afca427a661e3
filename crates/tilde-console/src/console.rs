//! The console core: registry, dispatch boundary, transcript, and
//! completion wiring.
//!
//! A `ConsoleCore` is an ordinary value explicitly owned and passed by the
//! host; all mutation happens through `&mut` on the one thread that owns it.

use std::fs;
use std::path::Path;

use tilde_types::error::Result;
use tilde_types::Severity;

use crate::autocomplete::Autocompleter;
use crate::history::History;
use crate::registry::{Command, CommandRegistry};
use crate::scrollback::{Scrollback, DEFAULT_MAX_CHARS};

/// Push-style transcript observer, invoked with the entire decorated
/// transcript after every mutation.
type Observer = Box<dyn FnMut(&str)>;

/// Construction options for a [`ConsoleCore`].
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Whether command name matching ignores ASCII case.
    pub case_insensitive: bool,
    /// Character budget for the scrollback renderings.
    pub max_scrollback_chars: usize,
    /// Optional banner appended as the first transcript line.
    pub banner: Option<String>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            max_scrollback_chars: DEFAULT_MAX_CHARS,
            banner: None,
        }
    }
}

/// The console: command registry, scrollback, history, and completion state.
pub struct ConsoleCore {
    registry: CommandRegistry,
    scrollback: Scrollback,
    history: History,
    completer: Autocompleter,
    observers: Vec<Observer>,
}

impl ConsoleCore {
    /// Create a console with default options.
    pub fn new() -> Self {
        Self::with_options(ConsoleOptions::default())
    }

    /// Create a console with explicit options.
    pub fn with_options(options: ConsoleOptions) -> Self {
        let mut console = Self {
            registry: CommandRegistry::with_case_insensitive(options.case_insensitive),
            scrollback: Scrollback::with_max_chars(options.max_scrollback_chars),
            history: History::new(),
            completer: Autocompleter::new(),
            observers: Vec::new(),
        };
        if let Some(banner) = options.banner {
            console.append_output(Severity::Normal, &banner);
        }
        console
    }

    /// Register a command.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.registry.register(cmd);
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The recall history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable history access for cursor navigation by the input surface.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Subscribe to transcript changes.
    ///
    /// Each notification carries the entire current transcript, not a diff.
    pub fn on_changed<F>(&mut self, observer: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Run a command line: echo it, record it in history, dispatch it, and
    /// append the result (or the error message) to the transcript.
    ///
    /// Empty input echoes the prompt line only.
    pub fn run_command(&mut self, raw: &str) {
        self.append_output(Severity::Normal, &format!("> {raw}"));
        if raw.trim().is_empty() {
            return;
        }
        self.history.add(raw);
        match self.silently_run(raw) {
            Ok(result) => self.append_output(Severity::Normal, &result),
            Err(e) => self.append_output(Severity::Error, &e.to_string()),
        }
    }

    /// Dispatch a command line without touching the transcript or history.
    ///
    /// Splits on ASCII whitespace: the first token is the command name, the
    /// rest are positional arguments passed verbatim (no quoting). Handler
    /// errors surface here as the dispatch boundary; nothing propagates
    /// further.
    pub fn silently_run(&self, raw: &str) -> Result<String> {
        let mut tokens = raw.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(String::new());
        };
        let args: Vec<&str> = tokens.collect();
        self.registry.invoke(name, &args)
    }

    /// One cyclic completion step for a partial input line.
    ///
    /// A single unfinished token completes against command names; later
    /// tokens complete through the command's per-argument completers, if
    /// any. Returns the full line with the completed token substituted.
    pub fn autocomplete(&mut self, partial_line: &str) -> String {
        let line = partial_line.trim_end_matches('\t');
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() <= 1 && !line.ends_with(' ') {
            let text = tokens.first().copied().unwrap_or("");
            return self.completer.complete(text, &self.registry);
        }

        let Some(&name) = tokens.first() else {
            return line.to_string();
        };
        let mut last_index = tokens.len() - 1;
        if line.ends_with(' ') {
            last_index += 1;
        }
        let last_param = tokens.get(last_index).copied().unwrap_or("");
        // Token 0 is the command name, so argument positions are shifted by one.
        if let Some(completion) = self.registry.complete_arg(name, last_index - 1, last_param) {
            if last_param.is_empty() {
                return format!("{line}{completion}");
            }
            return format!("{}{completion}", &line[..line.len() - last_param.len()]);
        }
        line.to_string()
    }

    /// Abandon any completion cycle in progress.
    ///
    /// Called by the input surface whenever the edited text diverges from
    /// the completion being cycled.
    pub fn reset_completion(&mut self) {
        self.completer.reset();
    }

    /// Print a string to the console as if it were command output.
    pub fn output(&mut self, message: &str) {
        self.append_output(Severity::Normal, message);
    }

    /// Forward a host log line into the transcript with the given severity.
    pub fn report(&mut self, severity: Severity, message: &str) {
        self.append_output(severity, message);
    }

    /// The decorated transcript for local display.
    pub fn content(&mut self) -> &str {
        self.scrollback.decorated()
    }

    /// The tagged transcript for remote transport.
    pub fn remote_content(&mut self) -> &str {
        self.scrollback.remote()
    }

    /// The transcript with all markup stripped, one line per entry.
    pub fn plain_content(&self) -> String {
        self.scrollback.plain_text()
    }

    /// Dump the transcript to a plain-text file with all markup stripped.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.scrollback.plain_text())?;
        Ok(())
    }

    fn append_output(&mut self, severity: Severity, message: &str) {
        self.scrollback.append(message, severity);
        if self.observers.is_empty() {
            return;
        }
        let content = self.scrollback.decorated().to_string();
        for observer in &mut self.observers {
            observer(&content);
        }
    }
}

impl Default for ConsoleCore {
    fn default() -> Self {
        Self::new()
    }
}
