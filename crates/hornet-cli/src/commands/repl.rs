//! REPL command implementation
//!
//! Each input line is a query against the loaded program. After an answer,
//! `;` asks for the next one and `.` (or an empty line) stops.

use super::format_diagnostic;
use crate::config::{HistoryConfig, RunSettings};
use anyhow::{Context, Result};
use hornet_runtime::parser::parse_program;
use hornet_runtime::{Session, SessionError, SolveRequest};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;

/// Loaded program text and where it came from
struct Loaded {
    origin: String,
    source: String,
}

/// Run the interactive REPL, optionally preloading `file`
pub fn run(
    file: Option<&str>,
    no_history: bool,
    settings: &RunSettings,
    history: &HistoryConfig,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut session = Session::new(settings.registry(), settings.session_options());
    session.init()?;

    let mut loaded = Loaded {
        origin: "<empty>".to_string(),
        source: String::new(),
    };
    if let Some(path) = file {
        loaded = load(path)?;
    }

    let history_path = history.history_path();
    if !no_history {
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path); // Ignore errors if file doesn't exist
        }
    }

    println!("Hornet v{} REPL", hornet_runtime::VERSION);
    println!("Type a query, or :help for commands");
    println!();

    loop {
        let line = match rl.readline("?- ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                println!("Use :quit or :q to exit");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        if trimmed == ":quit" || trimmed == ":q" {
            println!("Goodbye!");
            break;
        }
        if trimmed == ":help" || trimmed == ":h" {
            print_help();
            continue;
        }
        if let Some(path) = trimmed.strip_prefix(":load").map(str::trim) {
            if path.is_empty() {
                println!("Usage: :load <file>");
                continue;
            }
            match load(path) {
                Ok(program) => {
                    println!("Loaded {}", program.origin);
                    loaded = program;
                }
                Err(e) => eprintln!("error: {:#}", e),
            }
            continue;
        }

        let query = if trimmed.ends_with('.') {
            trimmed.to_string()
        } else {
            format!("{}.", trimmed)
        };
        let request = SolveRequest::new(loaded.source.as_str(), query.as_str()).with_gc(settings.gc);
        if let Err(e) = session.solve(&request) {
            report(&e, &query);
            continue;
        }
        answer(&mut session, &mut rl, &query);
    }

    if !no_history {
        if let Some(path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.save_history(&path); // Ignore errors
        }
    }

    Ok(())
}

/// Print answers until the user stops or they run out
fn answer(session: &mut Session, rl: &mut DefaultEditor, query: &str) {
    loop {
        match session.next() {
            Ok(Some(solution)) => {
                println!("{}", solution);
                match rl.readline("") {
                    Ok(reply) if reply.trim() == ";" => continue,
                    _ => {
                        println!(".");
                        return;
                    }
                }
            }
            Ok(None) => {
                println!("false.");
                return;
            }
            Err(e) => {
                report(&e, query);
                return;
            }
        }
    }
}

/// Read a program file and check it loads
fn load(path: &str) -> Result<Loaded> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path))?;
    if let Err(diag) = parse_program(&source) {
        eprintln!("{}", diag.to_human_string(&source));
        return Err(anyhow::anyhow!(format_diagnostic(&diag, path)));
    }
    Ok(Loaded {
        origin: path.to_string(),
        source,
    })
}

fn report(error: &SessionError, query: &str) {
    match error {
        SessionError::Load(diag) => eprintln!("{}", diag.to_human_string(query)),
        other => eprintln!("error: {}", other),
    }
}

/// Print help information
fn print_help() {
    println!("Hornet REPL Commands:");
    println!("  :quit, :q         Exit the REPL");
    println!("  :load <file>      Replace the loaded program");
    println!("  :help, :h         Show this help message");
    println!();
    println!("Type a query to solve it against the loaded program.");
    println!("After an answer, type ';' for the next one or '.' to stop.");
}
