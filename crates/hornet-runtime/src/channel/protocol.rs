//! Wire records exchanged with a worker
//!
//! Every request carries an id chosen by the host; the worker echoes it in
//! the matching response. Payloads are plain JSON so a transport can carry
//! them as text.

use crate::engine::Solution;
use crate::error::{ProtocolError, SessionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Solve,
    Next,
    All,
}

/// Program and query of a `solve` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub program: String,
    pub query: String,
    #[serde(default)]
    pub gc: bool,
}

impl SolveRequest {
    pub fn new(program: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            query: query.into(),
            gc: false,
        }
    }

    pub fn with_gc(mut self, gc: bool) -> Self {
        self.gc = gc;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<SolveRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Response {
    pub fn success(id: u64, data: Value) -> Self {
        Self { id, ok: true, data }
    }

    pub fn failure(id: u64, error: &SessionError) -> Self {
        let data = serde_json::to_value(error)
            .unwrap_or_else(|e| Value::String(format!("unserializable error: {}", e)));
        Self {
            id,
            ok: false,
            data,
        }
    }

    /// The error carried by a failed response
    pub fn into_error(self) -> SessionError {
        serde_json::from_value(self.data)
            .unwrap_or_else(|e| ProtocolError::MalformedResponse(e.to_string()).into())
    }

    /// Decode the data of a successful response, or the error of a failed one
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<T, SessionError> {
        if !self.ok {
            return Err(self.into_error());
        }
        serde_json::from_value(self.data)
            .map_err(|e| ProtocolError::MalformedResponse(e.to_string()).into())
    }
}

/// Data of a `next` response
pub(crate) fn next_data(solution: Option<Solution>) -> Value {
    serde_json::to_value(solution).unwrap_or(Value::Null)
}

/// Data of an `all` response
pub(crate) fn all_data(solutions: Vec<Solution>) -> Value {
    serde_json::to_value(solutions).unwrap_or_else(|_| Value::Array(Vec::new()))
}
