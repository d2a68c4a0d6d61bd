//! Hornet Runtime - embeddable Horn-clause solver
//!
//! This library provides:
//! - Parsing of programs and queries into clauses
//! - A depth-first resolution engine with cut and optional garbage collection
//! - The Term Bridge between solver terms and host values
//! - The Foreign Call Gateway for host procedures called from solver programs
//! - The Remote Command Channel driving a session in-process or on a worker

/// Hornet runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod bridge;
pub mod channel;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod foreign;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod span;
pub mod token;

pub use bridge::{HostValue, TermBridge, VarRef};
pub use channel::{connect, CommandChannel, ExecutionMode, LocalChannel, SolveRequest, WorkerChannel};
pub use diagnostic::{Diagnostic, LoadError, Location};
pub use engine::{Solution, Solver, SolverOptions, TermHandle, DEFAULT_GC_THRESHOLD};
pub use error::{LifecycleError, ProtocolError, SessionError, SolveError};
pub use foreign::{CapabilityError, ForeignCall, ForeignError, ForeignRegistry};
pub use session::{Session, SessionOptions, SessionState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }
}
