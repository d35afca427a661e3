//! Command trait, closure shape adapters, and the command registry.

use std::collections::HashMap;

use tilde_types::error::{Result, TildeError};

use crate::autocomplete::{Autocompleter, CandidateSource};

/// A single invocable console command.
///
/// Handlers take positional string arguments and return text, failing with a
/// command error. Registration is explicit: the host assembles the registry
/// at startup instead of scanning for marked functions.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Documentation shown by `help`.
    fn docs(&self) -> &str {
        ""
    }

    /// Execute the command with the given arguments.
    fn invoke(&self, args: &[&str]) -> Result<String>;

    /// Static completion options per argument position.
    ///
    /// Sparse and index-aligned: positions without an entry have no
    /// completer.
    fn arg_completions(&self) -> Vec<(usize, Vec<String>)> {
        Vec::new()
    }
}

/// The canonical handler signature every shape is normalized to.
type Handler = Box<dyn Fn(&[&str]) -> Result<String>>;

/// A command built from a closure.
///
/// The constructors accept the four natural handler shapes and adapt them to
/// the canonical signature: a handler that returns nothing produces an empty
/// string, and a handler that takes no arguments ignores passed arguments.
pub struct FnCommand {
    name: String,
    docs: String,
    handler: Handler,
    completions: Vec<(usize, Vec<String>)>,
}

impl FnCommand {
    /// Shape: arguments in, string result out.
    pub fn new<F>(name: &str, docs: &str, handler: F) -> Self
    where
        F: Fn(&[&str]) -> Result<String> + 'static,
    {
        Self {
            name: name.to_string(),
            docs: docs.to_string(),
            handler: Box::new(handler),
            completions: Vec::new(),
        }
    }

    /// Shape: no arguments, string result.
    pub fn simple<F>(name: &str, docs: &str, handler: F) -> Self
    where
        F: Fn() -> Result<String> + 'static,
    {
        Self::new(name, docs, move |_args| handler())
    }

    /// Shape: arguments in, no result.
    pub fn silent<F>(name: &str, docs: &str, handler: F) -> Self
    where
        F: Fn(&[&str]) -> Result<()> + 'static,
    {
        Self::new(name, docs, move |args| {
            handler(args)?;
            Ok(String::new())
        })
    }

    /// Shape: no arguments, no result.
    pub fn simple_silent<F>(name: &str, docs: &str, handler: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self::new(name, docs, move |_args| {
            handler()?;
            Ok(String::new())
        })
    }

    /// Attach fixed completion options for one argument position.
    pub fn with_completion(mut self, arg_index: usize, options: &[&str]) -> Self {
        self.completions
            .push((arg_index, options.iter().map(|s| s.to_string()).collect()));
        self
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn docs(&self) -> &str {
        &self.docs
    }

    fn invoke(&self, args: &[&str]) -> Result<String> {
        (self.handler)(args)
    }

    fn arg_completions(&self) -> Vec<(usize, Vec<String>)> {
        self.completions.clone()
    }
}

/// Cyclic completion over a fixed option list for one argument position.
struct ArgCompleter {
    options: Vec<String>,
    state: Autocompleter,
}

impl ArgCompleter {
    fn new(options: Vec<String>) -> Self {
        Self {
            options,
            state: Autocompleter::new(),
        }
    }

    fn complete(&mut self, partial: &str) -> String {
        self.state.complete(partial, &self.options)
    }
}

/// A stored command plus its per-argument completion state.
struct RegisteredCommand {
    command: Box<dyn Command>,
    /// Sparse, index-aligned argument completers.
    completers: Vec<Option<ArgCompleter>>,
}

/// Docs for the intercepted `help` builtin.
const HELP_DOCS: &str = "View available commands as well as their documentation.";

/// Registry of available commands.
///
/// Registering an existing name overwrites the previous entry. Name matching
/// is case-insensitive unless configured otherwise; listings are alphabetical
/// regardless of insertion order. `help` is resolved by the registry itself
/// unless a command of that name has been registered over it.
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
    case_insensitive: bool,
}

impl CommandRegistry {
    /// Create an empty, case-insensitive registry.
    pub fn new() -> Self {
        Self::with_case_insensitive(true)
    }

    /// Create an empty registry with explicit case sensitivity.
    pub fn with_case_insensitive(case_insensitive: bool) -> Self {
        Self {
            commands: HashMap::new(),
            case_insensitive,
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    ///
    /// A name that is empty or contains whitespace cannot be dispatched;
    /// such registrations are logged and skipped, never fatal.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name().to_string();
        if let Err(e) = validate_name(&name) {
            log::warn!("skipping command registration: {e}");
            return;
        }

        // Last write wins even across case-insensitive collisions.
        if self.case_insensitive {
            self.commands.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        }

        let completers = build_completers(cmd.arg_completions());
        self.commands.insert(
            name,
            RegisteredCommand {
                command: cmd,
                completers,
            },
        );
    }

    /// Whether a command with this name exists (including the help builtin).
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some() || self.is_help(name)
    }

    /// Dispatch a named command.
    ///
    /// Lookup itself never fails with anything but `UnknownCommand`; errors
    /// raised by the handler pass through to the caller's boundary.
    pub fn invoke(&self, name: &str, args: &[&str]) -> Result<String> {
        if let Some(entry) = self.find(name) {
            return entry.command.invoke(args);
        }
        if self.is_help(name) {
            return self.help(args.first().copied());
        }
        Err(TildeError::UnknownCommand(name.to_string()))
    }

    /// Sorted command names, including the help builtin.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        if !names.iter().any(|n| self.matches(n, "help")) {
            names.push("help".to_string());
        }
        names.sort();
        names
    }

    /// Sorted (name, docs) pairs for listings.
    pub fn listing(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|(name, entry)| (name.clone(), entry.command.docs().to_string()))
            .collect();
        if !entries.iter().any(|(n, _)| self.matches(n, "help")) {
            entries.push(("help".to_string(), HELP_DOCS.to_string()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// One cyclic completion step for an argument of a registered command.
    ///
    /// Returns `None` when the command is unknown or the argument position
    /// has no completer.
    pub fn complete_arg(
        &mut self,
        command: &str,
        arg_index: usize,
        partial: &str,
    ) -> Option<String> {
        let case_insensitive = self.case_insensitive;
        let entry = self
            .commands
            .iter_mut()
            .find(|(k, _)| names_match(k, command, case_insensitive))
            .map(|(_, v)| v)?;
        let completer = entry.completers.get_mut(arg_index)?.as_mut()?;
        Some(completer.complete(partial))
    }

    /// Help text: the full listing, or the docs of one command.
    fn help(&self, topic: Option<&str>) -> Result<String> {
        match topic {
            Some(name) => {
                if self.is_help(name) {
                    return Ok(HELP_DOCS.to_string());
                }
                match self.find(name) {
                    Some(entry) => Ok(entry.command.docs().to_string()),
                    None => Err(TildeError::UnknownCommand(name.to_string())),
                }
            },
            None => {
                let entries = self.listing();
                let width = entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
                let mut out = String::from("Available commands:");
                for (name, docs) in &entries {
                    out.push_str("\n  ");
                    out.push_str(name);
                    for _ in name.len()..width + 3 {
                        out.push(' ');
                    }
                    out.push_str(docs);
                }
                Ok(out)
            },
        }
    }

    fn find(&self, name: &str) -> Option<&RegisteredCommand> {
        if self.case_insensitive {
            self.commands
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        } else {
            self.commands.get(name)
        }
    }

    fn matches(&self, a: &str, b: &str) -> bool {
        names_match(a, b, self.case_insensitive)
    }

    fn is_help(&self, name: &str) -> bool {
        self.matches(name, "help")
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSource for CommandRegistry {
    fn candidates(&self) -> Vec<String> {
        self.names()
    }
}

fn names_match(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TildeError::Registration("empty command name".to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(TildeError::Registration(format!(
            "command name contains whitespace: {name:?}"
        )));
    }
    Ok(())
}

fn build_completers(entries: Vec<(usize, Vec<String>)>) -> Vec<Option<ArgCompleter>> {
    let Some(max_index) = entries.iter().map(|(i, _)| *i).max() else {
        return Vec::new();
    };
    let mut completers: Vec<Option<ArgCompleter>> = Vec::new();
    completers.resize_with(max_index + 1, || None);
    for (index, options) in entries {
        completers[index] = Some(ArgCompleter::new(options));
    }
    completers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Box<FnCommand> {
        Box::new(FnCommand::new("echo", "Print arguments", |args| {
            Ok(args.join(" "))
        }))
    }

    #[test]
    fn register_and_invoke() {
        let mut reg = CommandRegistry::new();
        reg.register(echo());
        assert_eq!(reg.invoke("echo", &["hello", "world"]).unwrap(), "hello world");
    }

    #[test]
    fn unknown_command_error() {
        let reg = CommandRegistry::new();
        match reg.invoke("nope", &[]) {
            Err(TildeError::UnknownCommand(name)) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownCommand, got {other:?}"),
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("test", "version A", || {
            Ok("A".to_string())
        })));
        reg.register(Box::new(FnCommand::simple("test", "version B", || {
            Ok("B".to_string())
        })));
        assert_eq!(reg.invoke("test", &[]).unwrap(), "B");
        let listing = reg.listing();
        assert_eq!(
            listing.iter().filter(|(n, _)| n == "test").count(),
            1,
            "listing shows the name exactly once"
        );
        assert_eq!(
            listing.iter().find(|(n, _)| n == "test").unwrap().1,
            "version B"
        );
    }

    #[test]
    fn last_registration_wins_across_case() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("Test", "A", || Ok("A".into()))));
        reg.register(Box::new(FnCommand::simple("test", "B", || Ok("B".into()))));
        assert_eq!(reg.invoke("TEST", &[]).unwrap(), "B");
        assert_eq!(reg.listing().iter().filter(|(n, _)| n.eq_ignore_ascii_case("test")).count(), 1);
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut reg = CommandRegistry::new();
        reg.register(echo());
        assert_eq!(reg.invoke("ECHO", &["hi"]).unwrap(), "hi");
    }

    #[test]
    fn case_sensitive_lookup() {
        let mut reg = CommandRegistry::with_case_insensitive(false);
        reg.register(echo());
        assert!(reg.invoke("ECHO", &[]).is_err());
        assert!(reg.invoke("echo", &["x"]).is_ok());
    }

    #[test]
    fn names_are_sorted_and_include_help() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("zebra", "", || Ok(String::new()))));
        reg.register(Box::new(FnCommand::simple("alpha", "", || Ok(String::new()))));
        assert_eq!(reg.names(), vec!["alpha", "help", "zebra"]);
    }

    #[test]
    fn help_lists_all_commands() {
        let mut reg = CommandRegistry::new();
        reg.register(echo());
        let text = reg.invoke("help", &[]).unwrap();
        assert!(text.starts_with("Available commands:"));
        assert!(text.contains("echo"));
        assert!(text.contains("help"));
    }

    #[test]
    fn help_for_one_command_shows_docs() {
        let mut reg = CommandRegistry::new();
        reg.register(echo());
        assert_eq!(reg.invoke("help", &["echo"]).unwrap(), "Print arguments");
    }

    #[test]
    fn help_for_unknown_topic_fails() {
        let reg = CommandRegistry::new();
        assert!(reg.invoke("help", &["missing"]).is_err());
    }

    #[test]
    fn user_help_command_overrides_builtin() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("help", "mine", || {
            Ok("custom".to_string())
        })));
        assert_eq!(reg.invoke("help", &[]).unwrap(), "custom");
        assert_eq!(reg.names(), vec!["help"]);
    }

    #[test]
    fn invalid_names_are_skipped_not_fatal() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("", "", || Ok(String::new()))));
        reg.register(Box::new(FnCommand::simple("two words", "", || {
            Ok(String::new())
        })));
        assert_eq!(reg.names(), vec!["help"]);
    }

    #[test]
    fn handler_error_passes_through() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::new("fail", "", |_| {
            Err(TildeError::Command("it broke".to_string()))
        })));
        match reg.invoke("fail", &[]) {
            Err(TildeError::Command(msg)) => assert_eq!(msg, "it broke"),
            other => panic!("expected Command error, got {other:?}"),
        }
    }

    #[test]
    fn shape_adapters_normalize() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(FnCommand::simple("version", "", || {
            Ok("1.0".to_string())
        })));
        reg.register(Box::new(FnCommand::silent("noisy", "", |_args| Ok(()))));
        reg.register(Box::new(FnCommand::simple_silent("quiet", "", || Ok(()))));

        // No-arg handlers ignore passed arguments.
        assert_eq!(reg.invoke("version", &["ignored"]).unwrap(), "1.0");
        // Result-less handlers produce an empty string.
        assert_eq!(reg.invoke("noisy", &["a"]).unwrap(), "");
        assert_eq!(reg.invoke("quiet", &[]).unwrap(), "");
    }

    #[test]
    fn arg_completion_cycles_options() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(
            FnCommand::new("scene", "", |_| Ok(String::new()))
                .with_completion(0, &["arena", "menu"]),
        ));
        assert_eq!(reg.complete_arg("scene", 0, "").unwrap(), "arena");
        assert_eq!(reg.complete_arg("scene", 0, "arena").unwrap(), "menu");
        // Positions without a completer are unset.
        assert_eq!(reg.complete_arg("scene", 1, ""), None);
        assert_eq!(reg.complete_arg("missing", 0, ""), None);
    }

    #[test]
    fn sparse_completers_leave_gaps() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(
            FnCommand::new("cfg", "", |_| Ok(String::new()))
                .with_completion(2, &["on", "off"]),
        ));
        assert_eq!(reg.complete_arg("cfg", 0, ""), None);
        assert_eq!(reg.complete_arg("cfg", 1, ""), None);
        assert_eq!(reg.complete_arg("cfg", 2, "o").unwrap(), "off");
    }
}
