//! Solver lifecycle state machine
//!
//! A [`Session`] owns at most one active query and enforces the order of
//! lifecycle commands. Both the in-process and the worker channel drive the
//! same `Session`, which is what keeps their observable behavior identical.
//!
//! ```text
//! Uninitialized --init--> Initializing --> Ready --solve/next/all--> Solving --> Ready
//! ```

use crate::channel::protocol::{self, Operation, Request, Response, SolveRequest};
use crate::engine::{Solution, Solver, SolverOptions, DEFAULT_GC_THRESHOLD};
use crate::error::{LifecycleError, ProtocolError, SessionError};
use crate::foreign::ForeignRegistry;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Solving,
}

/// Settings applied to every query of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Collection threshold for queries solved with garbage collection
    pub gc_threshold: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}

pub struct Session {
    registry: ForeignRegistry,
    options: SessionOptions,
    state: SessionState,
    query: Option<Solver>,
}

impl Session {
    pub fn new(registry: ForeignRegistry, options: SessionOptions) -> Self {
        Self {
            registry,
            options,
            state: SessionState::Uninitialized,
            query: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a query is loaded
    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    pub fn init(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Uninitialized {
            return Err(LifecycleError::AlreadyInitialized.into());
        }
        self.state = SessionState::Initializing;
        debug!(procedures = self.registry.len(), "session initializing");
        self.state = SessionState::Ready;
        debug!("session ready");
        Ok(())
    }

    /// Load a program and query, replacing any active query
    ///
    /// On a load error the previous query is gone as well.
    pub fn solve(&mut self, request: &SolveRequest) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.query = None;
        let options = SolverOptions {
            gc: request.gc,
            gc_threshold: self.options.gc_threshold,
        };
        let solver =
            Solver::with_options(&request.program, &request.query, options, &self.registry)?;
        self.query = Some(solver);
        debug!(gc = request.gc, "query loaded");
        Ok(())
    }

    /// Next answer of the active query
    pub fn next(&mut self) -> Result<Option<Solution>, SessionError> {
        self.ensure_ready()?;
        let solver = self.query.as_mut().ok_or(LifecycleError::NoActiveQuery)?;
        self.state = SessionState::Solving;
        let result = solver.next();
        self.state = SessionState::Ready;
        Ok(result?)
    }

    /// Every answer the active query has left
    pub fn all(&mut self) -> Result<Vec<Solution>, SessionError> {
        self.ensure_ready()?;
        let solver = self.query.as_mut().ok_or(LifecycleError::NoActiveQuery)?;
        self.state = SessionState::Solving;
        let result = solver.all();
        self.state = SessionState::Ready;
        Ok(result?)
    }

    /// Execute a wire request and build its response
    pub fn handle(&mut self, request: Request) -> Response {
        let id = request.id;
        debug!(id, operation = ?request.operation, "handling request");
        let result = match request.operation {
            Operation::Init => self.init().map(|()| Value::Null),
            Operation::Solve => match request.payload {
                Some(payload) => self.solve(&payload).map(|()| Value::Null),
                None => Err(ProtocolError::MalformedRequest(
                    "solve requires a payload".to_string(),
                )
                .into()),
            },
            Operation::Next => self.next().map(protocol::next_data),
            Operation::All => self.all().map(protocol::all_data),
        };
        match result {
            Ok(data) => Response::success(id, data),
            Err(error) => Response::failure(id, &error),
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            _ => Err(LifecycleError::NotInitialized.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolveError;
    use pretty_assertions::assert_eq;

    fn ready() -> Session {
        let mut session = Session::new(ForeignRegistry::new(), SessionOptions::default());
        session.init().unwrap();
        session
    }

    #[test]
    fn test_commands_before_init() {
        let mut session = Session::new(ForeignRegistry::new(), SessionOptions::default());
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(
            session.solve(&SolveRequest::new("", "true.")),
            Err(LifecycleError::NotInitialized.into())
        );
        assert_eq!(session.next(), Err(LifecycleError::NotInitialized.into()));
    }

    #[test]
    fn test_init_twice() {
        let mut session = ready();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.init(), Err(LifecycleError::AlreadyInitialized.into()));
    }

    #[test]
    fn test_next_without_query() {
        let mut session = ready();
        assert_eq!(session.next(), Err(LifecycleError::NoActiveQuery.into()));
        assert_eq!(session.all(), Err(LifecycleError::NoActiveQuery.into()));
    }

    #[test]
    fn test_all_continues_after_next() {
        let mut session = ready();
        session
            .solve(&SolveRequest::new("n(1). n(2). n(3).", "n(X)."))
            .unwrap();
        assert_eq!(session.next().unwrap().map(|s| s.to_string()), Some("X = 1".into()));
        let rest: Vec<String> = session.all().unwrap().iter().map(Solution::to_string).collect();
        assert_eq!(rest, vec!["X = 2", "X = 3"]);
        assert_eq!(session.next(), Ok(None));
        assert_eq!(session.all(), Ok(vec![]));
    }

    #[test]
    fn test_load_error_discards_previous_query() {
        let mut session = ready();
        session.solve(&SolveRequest::new("p(a).", "p(X).")).unwrap();
        let err = session.solve(&SolveRequest::new("p(a", "p(X).")).unwrap_err();
        assert!(matches!(err, SessionError::Load(_)));
        assert!(!session.has_query());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.next(), Err(LifecycleError::NoActiveQuery.into()));
    }

    #[test]
    fn test_solve_error_exhausts_query() {
        let mut session = ready();
        session.solve(&SolveRequest::new("", "X is foo + 1.")).unwrap();
        assert_eq!(
            session.next(),
            Err(SolveError::NotANumber { term: "foo".into() }.into())
        );
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.next(), Ok(None));
    }

    #[test]
    fn test_handle_solve_without_payload() {
        let mut session = ready();
        let response = session.handle(Request {
            id: 5,
            operation: Operation::Solve,
            payload: None,
        });
        assert_eq!(response.id, 5);
        assert!(matches!(
            response.decode::<()>(),
            Err(SessionError::Protocol(ProtocolError::MalformedRequest(_)))
        ));
    }
}
