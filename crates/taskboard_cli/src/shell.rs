//! Line-oriented interactive mode.
//!
//! # Invariants
//! - One board instance lives for the whole shell, so session-scoped
//!   logins persist until the shell exits.
//! - A failing command prints its error and the loop continues.

use crate::cli::{execute, Command};
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufRead, Write};
use taskboard_core::Board;

#[derive(Parser)]
#[command(name = "taskboard", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

pub fn run(board: &mut Board) -> Result<()> {
    info!("event=shell_start module=cli status=ok");
    println!("taskboard shell; type `help` for commands, `exit` to quit");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("taskboard> ");
        stdout.flush().context("failed to flush prompt")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read input")?;

        let words = match tokenize(&line) {
            Ok(words) => words,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            _ => {}
        }

        match ShellLine::try_parse_from(&words) {
            Ok(ShellLine {
                command: Command::Shell,
            }) => eprintln!("error: already in a shell"),
            Ok(parsed) => {
                if let Err(err) = execute(board, parsed.command) {
                    eprintln!("error: {err:#}");
                }
            }
            Err(err) => {
                let _ = err.print();
            }
        }
    }

    info!("event=shell_exit module=cli status=ok");
    Ok(())
}

/// Splits a line on whitespace, honoring single and double quotes.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
