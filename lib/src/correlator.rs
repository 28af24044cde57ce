// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Request / reply correlation over a fire-and-forget bridge
//!
//! Each request is tagged with a fresh [CorrelationId] and registered before it is
//! transmitted. A single dispatcher task consumes the transport reply stream and
//! resolves the matching pending entry. Replies from legacy bridges carry no id,
//! these resolve the oldest pending request for the same action.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use log::{debug, trace, warn};
use tokio::{
    sync::{broadcast::error::RecvError, oneshot},
    task::JoinHandle,
    time::Instant,
};

use cws_proto::{Action, ActionReq, CorrelationId, Reply, Request, Transport};

use crate::Error;

/// Correlates bridge requests with their replies
pub struct Correlator<T: Transport> {
    transport: Arc<T>,
    inner: Arc<Registry>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    timeout: Option<Duration>,
}

/// Pending request registry, shared with the dispatcher task
#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    pending: Mutex<HashMap<CorrelationId, PendingRequest>>,
}

struct PendingRequest {
    action: Action,
    issued_at: Instant,
    tx: oneshot::Sender<Result<Reply, Error>>,
}

/// Removes a pending entry when the awaiting future completes or is dropped
struct PendingGuard<'a> {
    registry: &'a Registry,
    id: CorrelationId,
}

impl<'a> Drop for PendingGuard<'a> {
    fn drop(&mut self) {
        if self.registry.pending().remove(&self.id).is_some() {
            trace!("deregistered request {}", self.id);
        }
    }
}

impl<T: Transport + 'static> Correlator<T> {
    /// Create a correlator over the provided transport, with an optional
    /// timeout applied to every request
    pub fn new(transport: Arc<T>, timeout: Option<Duration>) -> Self {
        Self {
            transport,
            inner: Arc::new(Registry::default()),
            dispatcher: Mutex::new(None),
            timeout,
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a request, awaiting the decoded response payload.
    ///
    /// Applies the configured timeout where set, otherwise waits indefinitely.
    pub async fn send<R: ActionReq>(&self, req: &R) -> Result<R::Resp, Error> {
        match self.timeout {
            Some(d) => self.send_timeout(req, d).await,
            None => self.exchange(req).await,
        }
    }

    /// Issue a request, failing with [Error::RequestTimeout] if no reply
    /// arrives within `timeout`
    pub async fn send_timeout<R: ActionReq>(
        &self,
        req: &R,
        timeout: Duration,
    ) -> Result<R::Resp, Error> {
        tokio::time::timeout(timeout, self.exchange(req)).await?
    }

    /// Reject every pending request with [Error::Cancelled], returning the
    /// number of requests cancelled
    pub fn cancel_all(&self) -> usize {
        let pending: Vec<_> = self.inner.pending().drain().collect();

        for (id, p) in &pending {
            debug!("cancelling {} request {id}", p.action);
        }

        let n = pending.len();
        for (_, p) in pending {
            let _ = p.tx.send(Err(Error::Cancelled));
        }

        n
    }

    /// Number of requests awaiting replies
    pub fn pending_count(&self) -> usize {
        self.inner.pending().len()
    }

    async fn exchange<R: ActionReq>(&self, req: &R) -> Result<R::Resp, Error> {
        // Subscribe prior to sending so replies are not missed
        self.ensure_dispatcher();

        let id = CorrelationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let envelope = Request::new(id, req)?;

        let (tx, rx) = oneshot::channel();
        self.inner.pending().insert(
            id,
            PendingRequest {
                action: R::ACTION,
                issued_at: Instant::now(),
                tx,
            },
        );
        let _guard = PendingGuard {
            registry: &self.inner,
            id,
        };

        debug!("issuing {} request {id}", R::ACTION);

        self.transport
            .send(envelope)
            .await
            .map_err(|e| Error::Transport(anyhow::Error::new(e)))?;

        let reply = match rx.await {
            Ok(r) => r?,
            Err(_) => return Err(Error::Cancelled),
        };

        if !reply.success {
            let error = reply.failure_reason();
            debug!("{} request {id} failed: {error}", R::ACTION);
            return Err(Error::RequestFailed {
                action: R::ACTION,
                error,
            });
        }

        Ok(reply.decode::<R>()?)
    }

    /// Start the reply dispatcher if not already running
    fn ensure_dispatcher(&self) {
        let mut d = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(h) = d.as_ref() {
            if !h.is_finished() {
                return;
            }
        }

        let mut rx = self.transport.subscribe();
        let registry = self.inner.clone();

        debug!("starting reply dispatcher");

        *d = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(r) => registry.dispatch(r),
                    Err(RecvError::Lagged(n)) => {
                        warn!("reply dispatcher lagged, {n} messages dropped")
                    }
                    Err(RecvError::Closed) => {
                        debug!("reply stream closed");
                        break;
                    }
                }
            }
        }));
    }
}

impl<T: Transport> Drop for Correlator<T> {
    fn drop(&mut self) {
        if let Some(h) = self
            .dispatcher
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            h.abort();
        }
    }
}

impl Registry {
    fn pending(&self) -> MutexGuard<'_, HashMap<CorrelationId, PendingRequest>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve the pending request matching an inbound reply
    fn dispatch(&self, reply: Reply) {
        let action = match reply.reply_to() {
            Some(a) => a,
            None => {
                trace!("ignoring unrelated message: {}", reply.action);
                return;
            }
        };

        let mut pending = self.pending();

        let id = match reply.id {
            Some(id) => match pending.get(&id) {
                Some(p) if p.action == action => Some(id),
                Some(p) => {
                    warn!(
                        "reply {} for request {id} does not match action {}",
                        reply.action, p.action
                    );
                    None
                }
                None => {
                    debug!("no pending request for reply {id}");
                    None
                }
            },
            // Legacy replies resolve the oldest request for the action
            None => pending
                .iter()
                .filter(|(_, p)| p.action == action)
                .map(|(id, _)| *id)
                .min(),
        };

        match id.and_then(|id| pending.remove(&id).map(|p| (id, p))) {
            Some((id, p)) => {
                trace!(
                    "resolving {action} request {id} after {:?}",
                    p.issued_at.elapsed()
                );
                let _ = p.tx.send(Ok(reply));
            }
            None => debug!("dropping unmatched {} reply", reply.action),
        }
    }
}
