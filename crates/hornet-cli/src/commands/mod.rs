pub mod check;
pub mod repl;
pub mod run;

use hornet_runtime::Diagnostic;

/// Format a load error as `file:line:col: error: message`
pub fn format_diagnostic(diag: &Diagnostic, file_path: &str) -> String {
    match diag.location {
        Some(location) => format!("{}:{}: error: {}", file_path, location, diag.message),
        None => format!("{}: error: {}", file_path, diag.message),
    }
}
