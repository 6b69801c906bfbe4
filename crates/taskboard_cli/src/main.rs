//! `taskboard` command-line entry point.
//!
//! # Responsibility
//! - Act as the view layer: read board state, dispatch intents, print.
//! - Keep no authoritative state of its own.

mod cli;
mod render;
mod shell;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
