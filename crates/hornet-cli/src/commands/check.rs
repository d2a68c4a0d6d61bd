//! Check command - load a program without running a query

use super::format_diagnostic;
use anyhow::{Context, Result};
use hornet_runtime::parser::parse_program;
use std::fs;

/// Parse a program file and report the first load error
pub fn run(file_path: &str, json: bool) -> Result<()> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path))?;

    match parse_program(&source) {
        Ok(program) => {
            if json {
                let report = serde_json::json!({
                    "file": file_path,
                    "ok": true,
                    "clauses": program.clauses.len(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: No errors found ({} clauses)",
                    file_path,
                    program.clauses.len()
                );
            }
            Ok(())
        }
        Err(diag) => {
            if json {
                let report = serde_json::json!({
                    "file": file_path,
                    "ok": false,
                    "error": diag,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                eprintln!("{}", format_diagnostic(&diag, file_path));
                eprintln!("{}", diag.to_human_string(&source));
            }
            Err(anyhow::anyhow!("Check failed"))
        }
    }
}
