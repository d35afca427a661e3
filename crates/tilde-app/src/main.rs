//! Demo host entry point.
//!
//! Owns a `ConsoleCore` on the main thread, feeds it stdin lines, and
//! drains the remote bridge once per tick so browser clients share the
//! same console. Type 'help' for commands, 'quit' to exit, or open
//! http://127.0.0.1:55055/ in a browser.

mod commands;
mod config;

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tilde_console::{ConsoleCore, ConsoleOptions};
use tilde_types::Result;
use tilde_web::{ConsoleServer, ServerConfig};

use config::AppConfig;

/// Main loop tick period while idle.
const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "tilde.toml".to_string());
    let config = AppConfig::load(Path::new(&config_path))?;
    log::info!("starting tilde host (port {})", config.port);

    let mut console = ConsoleCore::with_options(ConsoleOptions {
        case_insensitive: config.case_insensitive,
        max_scrollback_chars: config.max_scrollback_chars,
        banner: config
            .show_banner
            .then(|| "tilde v0.1.0 -- type 'help' for commands".to_string()),
    });
    let quit = Arc::new(AtomicBool::new(false));
    commands::register_builtins(&mut console, Arc::clone(&quit));

    let server = ConsoleServer::start(ServerConfig { port: config.port })?;

    // Stdin is read on its own thread; lines arrive over a channel so the
    // main loop never blocks on the terminal.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    let stdin_thread = thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    // Mirror the transcript to stdout as it grows.
    let mut printed = 0usize;
    print_prompt();
    while !quit.load(Ordering::SeqCst) {
        while let Ok(line) = line_rx.try_recv() {
            console.run_command(&line);
        }
        server.drain(&mut console);

        let plain = console.plain_content();
        if plain.len() != printed {
            // Trimming can shrink the transcript; reprint from the top then.
            let tail = plain.get(printed..).unwrap_or(plain.as_str());
            println!("{tail}");
            print_prompt();
            printed = plain.len();
        }

        thread::sleep(TICK);
    }
    drop(line_rx);

    let mut server = server;
    server.stop();
    if let Some(path) = &config.transcript_path {
        console.save_to_file(path)?;
        log::info!("transcript saved to {}", path.display());
    }
    // The stdin thread exits when its channel send fails or stdin closes;
    // it may be parked in read_line, so only join if it already finished.
    if stdin_thread.is_finished() {
        let _ = stdin_thread.join();
    }
    log::info!("tilde host shut down cleanly");
    Ok(())
}

fn print_prompt() {
    print!("~ ");
    let _ = std::io::stdout().flush();
}
