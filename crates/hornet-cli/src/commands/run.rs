//! Run command - answer a query against a program file

use super::format_diagnostic;
use crate::config::{config_dir_for, Overrides, RunSettings};
use anyhow::{Context, Result};
use hornet_runtime::parser::parse_program;
use hornet_runtime::{connect, CommandChannel, Diagnostic, SessionError, Solution, SolveRequest};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Arguments of `hornet run`
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub file: String,
    pub query: String,
    /// Stop after this many answers
    pub limit: Option<usize>,
    pub json: bool,
    pub overrides: Overrides,
}

/// Load the program, pose the query and print its answers
pub fn run(args: RunArgs) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read source file: {}", args.file))?;
    let settings = RunSettings::load(&config_dir_for(Path::new(&args.file))?, &args.overrides)?;
    debug!(mode = %settings.mode, gc = settings.gc, "running {}", args.file);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let outcome = runtime.block_on(async {
        let channel = connect(settings.mode, settings.registry(), settings.session_options())?;
        channel.init().await?;
        channel
            .solve(SolveRequest::new(source.as_str(), args.query.as_str()).with_gc(settings.gc))
            .await?;
        collect(channel.as_ref(), args.limit).await
    });

    match outcome {
        Ok(solutions) => {
            print_solutions(&solutions, args.json)?;
            Ok(())
        }
        Err(SessionError::Load(diag)) => {
            report_load_error(&diag, &args, &source)?;
            Err(anyhow::anyhow!("Failed to load program"))
        }
        Err(e) => {
            if args.json {
                let report = serde_json::json!({ "ok": false, "error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(anyhow::Error::new(e).context(format!("Query failed in {}", args.file)))
        }
    }
}

/// Pull answers one by one, or drain them with `all` when unlimited
async fn collect(
    channel: &dyn CommandChannel,
    limit: Option<usize>,
) -> Result<Vec<Solution>, SessionError> {
    let Some(limit) = limit else {
        return channel.all().await;
    };
    let mut solutions = Vec::with_capacity(limit);
    while solutions.len() < limit {
        match channel.next().await? {
            Some(solution) => solutions.push(solution),
            None => break,
        }
    }
    Ok(solutions)
}

fn print_solutions(solutions: &[Solution], json: bool) -> Result<()> {
    if json {
        let report = serde_json::json!({ "ok": true, "solutions": solutions });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if solutions.is_empty() {
        println!("false.");
    }
    for solution in solutions {
        println!("{}.", solution);
    }
    Ok(())
}

/// Load errors point either into the program file or into the query
fn report_load_error(diag: &Diagnostic, args: &RunArgs, source: &str) -> Result<()> {
    let (origin, text) = if parse_program(source).is_err() {
        (args.file.as_str(), source)
    } else {
        ("<query>", args.query.as_str())
    };

    if args.json {
        let report = serde_json::json!({ "ok": false, "origin": origin, "error": diag });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("{}", format_diagnostic(diag, origin));
        eprintln!("{}", diag.to_human_string(text));
    }
    Ok(())
}
