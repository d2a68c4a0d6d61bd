use super::{CommandChannel, SolveRequest};
use crate::engine::Solution;
use crate::error::SessionError;
use crate::foreign::ForeignRegistry;
use crate::session::{Session, SessionOptions};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Direct calls into a session owned by the caller's thread
///
/// No ids and no serialization: each command locks the session and runs to
/// completion before returning.
pub struct LocalChannel {
    session: Mutex<Session>,
}

impl LocalChannel {
    pub fn new(registry: ForeignRegistry, options: SessionOptions) -> Self {
        Self {
            session: Mutex::new(Session::new(registry, options)),
        }
    }
}

#[async_trait]
impl CommandChannel for LocalChannel {
    async fn init(&self) -> Result<(), SessionError> {
        self.session.lock().init()
    }

    async fn solve(&self, request: SolveRequest) -> Result<(), SessionError> {
        self.session.lock().solve(&request)
    }

    async fn next(&self) -> Result<Option<Solution>, SessionError> {
        self.session.lock().next()
    }

    async fn all(&self) -> Result<Vec<Solution>, SessionError> {
        self.session.lock().all()
    }
}
