//! Remote Command Channel
//!
//! Relays the lifecycle commands `init`, `solve`, `next` and `all` to a
//! [`Session`]. The session either lives in-process ([`LocalChannel`]) or on
//! a dedicated worker thread reached only by messages ([`WorkerChannel`]).
//! Callers see the same results and the same errors either way.
//!
//! # Examples
//!
//! ```
//! use hornet_runtime::channel::{connect, ExecutionMode, SolveRequest};
//! use hornet_runtime::foreign::ForeignRegistry;
//! use hornet_runtime::session::SessionOptions;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let channel = connect(ExecutionMode::Worker, ForeignRegistry::new(), SessionOptions::default())
//!     .unwrap();
//! channel.init().await.unwrap();
//! channel
//!     .solve(SolveRequest::new("fact(1). fact(2).", "fact(X)."))
//!     .await
//!     .unwrap();
//! assert_eq!(channel.all().await.unwrap().len(), 2);
//! assert_eq!(channel.next().await.unwrap(), None);
//! # });
//! ```
//!
//! [`Session`]: crate::session::Session

mod local;
pub mod protocol;
mod worker;

pub use local::LocalChannel;
pub use protocol::{Operation, Request, Response, SolveRequest};
pub use worker::WorkerChannel;

use crate::engine::Solution;
use crate::error::SessionError;
use crate::foreign::ForeignRegistry;
use crate::session::SessionOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle commands of one solver session
///
/// Methods take `&self`, so several commands may be in flight at once. They
/// are executed in the order they were issued.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn init(&self) -> Result<(), SessionError>;

    /// Load a program and query, replacing the active query
    async fn solve(&self, request: SolveRequest) -> Result<(), SessionError>;

    /// Next answer, `None` once the query is exhausted
    async fn next(&self) -> Result<Option<Solution>, SessionError>;

    /// Remaining answers
    async fn all(&self) -> Result<Vec<Solution>, SessionError>;
}

/// Where the solver session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    #[default]
    InProcess,
    Worker,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::InProcess => write!(f, "in-process"),
            ExecutionMode::Worker => write!(f, "worker"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-process" => Ok(ExecutionMode::InProcess),
            "worker" => Ok(ExecutionMode::Worker),
            other => Err(format!(
                "Invalid execution mode '{}'. Must be 'in-process' or 'worker'",
                other
            )),
        }
    }
}

/// Open a channel to a fresh session
///
/// `Worker` mode must be called from within a Tokio runtime.
pub fn connect(
    mode: ExecutionMode,
    registry: ForeignRegistry,
    options: SessionOptions,
) -> Result<Box<dyn CommandChannel>, SessionError> {
    match mode {
        ExecutionMode::InProcess => Ok(Box::new(LocalChannel::new(registry, options))),
        ExecutionMode::Worker => Ok(Box::new(WorkerChannel::spawn(registry, options)?)),
    }
}
