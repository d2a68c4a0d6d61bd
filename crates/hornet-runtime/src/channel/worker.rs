//! Session on a worker thread
//!
//! The host keeps a registry of pending commands keyed by id. Requests are
//! numbered from 1 and sent in id order; a dispatcher task routes each
//! response to the caller waiting on its id. A response whose id is not
//! pending means the two sides no longer agree on what was asked, so the
//! channel rejects everything from then on.

use super::protocol::{Operation, Request, Response, SolveRequest};
use super::CommandChannel;
use crate::engine::Solution;
use crate::error::{ProtocolError, SessionError};
use crate::foreign::ForeignRegistry;
use crate::session::{Session, SessionOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Reply = oneshot::Sender<Result<Response, ProtocolError>>;

/// Correlation state shared by callers and the dispatcher
#[derive(Default)]
struct Pending {
    next_id: u64,
    waiting: HashMap<u64, Reply>,
    /// Why the channel stopped working, once it has
    fault: Option<ProtocolError>,
}

impl Pending {
    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Error handed to callers of a broken channel
    fn rejection(&self) -> Option<ProtocolError> {
        self.fault.as_ref().map(|fault| match fault {
            ProtocolError::UnknownResponseId(_) => ProtocolError::Desynchronized,
            other => other.clone(),
        })
    }

    /// Mark the channel broken and reject every waiting caller
    fn fail_all(&mut self, cause: ProtocolError) {
        if self.fault.is_none() {
            self.fault = Some(cause);
        }
        let Some(rejection) = self.rejection() else {
            return;
        };
        for (id, reply) in self.waiting.drain() {
            debug!(id, "rejecting pending command");
            let _ = reply.send(Err(rejection.clone()));
        }
    }
}

/// Message-passing channel to a session on another thread
pub struct WorkerChannel {
    pending: Arc<Mutex<Pending>>,
    requests: mpsc::UnboundedSender<Request>,
}

impl WorkerChannel {
    /// Start a `hornet-worker` thread owning a fresh session
    ///
    /// Must be called from within a Tokio runtime, which runs the dispatcher.
    pub fn spawn(registry: ForeignRegistry, options: SessionOptions) -> Result<Self, ProtocolError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| ProtocolError::WorkerSpawn(e.to_string()))?;

        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<Request>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<Response>();

        std::thread::Builder::new()
            .name("hornet-worker".to_string())
            .spawn(move || {
                let mut session = Session::new(registry, options);
                while let Some(request) = request_rx.blocking_recv() {
                    let response = session.handle(request);
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                debug!("worker stopped");
            })
            .map_err(|e| ProtocolError::WorkerSpawn(e.to_string()))?;

        Ok(Self::from_transport(request_tx, response_rx))
    }

    /// Channel over caller-supplied endpoints
    ///
    /// Whoever holds the other ends plays the worker: it receives requests and
    /// may answer them in any order.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn from_transport(
        requests: mpsc::UnboundedSender<Request>,
        responses: mpsc::UnboundedReceiver<Response>,
    ) -> Self {
        let pending = Arc::new(Mutex::new(Pending::default()));
        tokio::spawn(dispatch(Arc::clone(&pending), responses));
        Self { pending, requests }
    }

    /// The condition that broke the channel, if any
    pub fn fault(&self) -> Option<ProtocolError> {
        self.pending.lock().fault.clone()
    }

    /// Number of commands awaiting a response
    pub fn in_flight(&self) -> usize {
        self.pending.lock().waiting.len()
    }

    async fn call(
        &self,
        operation: Operation,
        payload: Option<SolveRequest>,
    ) -> Result<Response, SessionError> {
        let reply = {
            let mut pending = self.pending.lock();
            if let Some(rejection) = pending.rejection() {
                return Err(rejection.into());
            }
            let id = pending.issue();
            let (reply_tx, reply_rx) = oneshot::channel();
            pending.waiting.insert(id, reply_tx);
            debug!(id, ?operation, "sending request");
            // Sent under the lock so ids reach the worker in order
            if self.requests.send(Request { id, operation, payload }).is_err() {
                pending.fail_all(ProtocolError::Disconnected);
            }
            reply_rx
        };

        match reply.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) => Err(error.into()),
            Err(_) => Err(ProtocolError::Disconnected.into()),
        }
    }
}

async fn dispatch(pending: Arc<Mutex<Pending>>, mut responses: mpsc::UnboundedReceiver<Response>) {
    while let Some(response) = responses.recv().await {
        let mut state = pending.lock();
        match state.waiting.remove(&response.id) {
            Some(reply) => {
                debug!(id = response.id, ok = response.ok, "response received");
                let _ = reply.send(Ok(response));
            }
            None => {
                warn!(id = response.id, "response for unknown command id, channel desynchronized");
                state.fail_all(ProtocolError::UnknownResponseId(response.id));
                return;
            }
        }
    }
    pending.lock().fail_all(ProtocolError::Disconnected);
}

#[async_trait]
impl CommandChannel for WorkerChannel {
    async fn init(&self) -> Result<(), SessionError> {
        self.call(Operation::Init, None).await?.decode()
    }

    async fn solve(&self, request: SolveRequest) -> Result<(), SessionError> {
        self.call(Operation::Solve, Some(request)).await?.decode()
    }

    async fn next(&self) -> Result<Option<Solution>, SessionError> {
        self.call(Operation::Next, None).await?.decode()
    }

    async fn all(&self) -> Result<Vec<Solution>, SessionError> {
        self.call(Operation::All, None).await?.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one() {
        let mut pending = Pending::default();
        assert_eq!(pending.issue(), 1);
        assert_eq!(pending.issue(), 2);
    }

    #[test]
    fn test_unknown_id_rejects_as_desynchronized() {
        let mut pending = Pending::default();
        let (tx, mut rx) = oneshot::channel();
        pending.waiting.insert(1, tx);
        pending.fail_all(ProtocolError::UnknownResponseId(9));
        assert_eq!(pending.fault, Some(ProtocolError::UnknownResponseId(9)));
        assert_eq!(rx.try_recv().unwrap(), Err(ProtocolError::Desynchronized));
        // the first cause wins
        pending.fail_all(ProtocolError::Disconnected);
        assert_eq!(pending.rejection(), Some(ProtocolError::Desynchronized));
    }

    #[tokio::test]
    async fn test_commands_after_worker_exit_are_rejected() {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<Response>();
        drop(request_rx);
        drop(response_tx);
        let channel = WorkerChannel::from_transport(request_tx, response_rx);
        assert_eq!(
            channel.init().await,
            Err(SessionError::Protocol(ProtocolError::Disconnected))
        );
    }
}
