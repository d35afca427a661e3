//! Demo command set for the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tilde_console::{ConsoleCore, FnCommand};
use tilde_types::TildeError;

/// Register the demo commands. `quit` is raised by the `quit` command and
/// watched by the main loop.
pub fn register_builtins(console: &mut ConsoleCore, quit: Arc<AtomicBool>) {
    let started = Instant::now();

    console.register(Box::new(FnCommand::new(
        "echo",
        "Print the arguments back",
        |args| Ok(args.join(" ")),
    )));

    console.register(Box::new(FnCommand::simple_silent(
        "quit",
        "Shut the host down",
        move || {
            quit.store(true, Ordering::SeqCst);
            Ok(())
        },
    )));

    console.register(Box::new(FnCommand::simple(
        "uptime",
        "Seconds since the host started",
        move || Ok(format!("up {:.1}s", started.elapsed().as_secs_f64())),
    )));

    console.register(Box::new(
        FnCommand::new("scene", "Switch to a named scene", |args| {
            let name = args
                .first()
                .ok_or_else(|| TildeError::Command("scene requires a name".to_string()))?;
            Ok(format!("loading scene: {name}"))
        })
        .with_completion(0, &["arena", "loading", "menu"]),
    ));
}
