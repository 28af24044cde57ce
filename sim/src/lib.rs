// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated CoolWallet S bridge, for exercising keyring flows without hardware.
//!
//! [SimTransport] implements [Transport] over an in-memory [SimDevice], with
//! scripted [Behaviour]s for approval, rejection, held (unanswered) requests
//! and misbehaving bridges.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use strum::{Display, EnumString, EnumVariantNames};
use tokio::sync::broadcast;

use cws_proto::{Action, Reply, Request, Transport};

mod device;
pub use device::{SimDevice, ROOT_PATH};

/// Simulated device / bridge behaviour
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, EnumString, EnumVariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum Behaviour {
    /// Approve all requests
    #[default]
    Approve,
    /// Reject all requests (user declined on device)
    Reject,
    /// Hold requests until [SimTransport::release] or [SimTransport::reject_held]
    Hold,
    /// Sign with the key for the following account index
    WrongKey,
    /// Approve, omitting correlation ids on replies (legacy bridges)
    NoCorrelationId,
    /// Refuse bridge connections
    RefuseConnect,
}

/// Simulator errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key derivation failed: {0}")]
    Bip32(#[from] bip32::Error),

    #[error("invalid mnemonic: {0}")]
    Mnemonic(anyhow::Error),

    #[error("signing failed: {0}")]
    Signing(#[from] k256::ecdsa::Error),

    #[error("protocol error: {0}")]
    Proto(#[from] cws_proto::Error),

    #[error("{0}")]
    Core(#[from] cws_keyring_core::Error),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported action: {0}")]
    UnsupportedAction(Action),

    #[error("bridge not connected")]
    NotConnected,

    #[error("bridge connection refused")]
    ConnectionRefused,
}

#[derive(Debug, Default)]
struct SimState {
    behaviour: Behaviour,
    connected: bool,
    connects: usize,
    requests: Vec<Request>,
    held: Vec<Request>,
}

/// Simulated bridge transport
#[derive(Clone)]
pub struct SimTransport {
    device: SimDevice,
    typed_data: bool,
    state: Arc<Mutex<SimState>>,
    replies: broadcast::Sender<Reply>,
}

impl SimTransport {
    /// Create a simulated bridge for the provided device
    pub fn new(device: SimDevice) -> Self {
        let (replies, _) = broadcast::channel(64);

        Self {
            device,
            typed_data: false,
            state: Arc::new(Mutex::new(SimState::default())),
            replies,
        }
    }

    /// Create a simulated bridge from a BIP-39 mnemonic
    pub fn from_mnemonic(phrase: &str) -> Result<Self, Error> {
        SimDevice::from_mnemonic(phrase).map(Self::new)
    }

    /// Enable `coolwallet-sign-typed-data` support
    pub fn with_typed_data(mut self, enabled: bool) -> Self {
        self.typed_data = enabled;
        self
    }

    /// Simulated device
    pub fn device(&self) -> &SimDevice {
        &self.device
    }

    /// Set behaviour for subsequent requests
    pub fn set_behaviour(&self, behaviour: Behaviour) {
        debug!("sim behaviour: {behaviour}");
        self.state().behaviour = behaviour;
    }

    /// Current behaviour
    pub fn behaviour(&self) -> Behaviour {
        self.state().behaviour
    }

    /// Whether the bridge link is open
    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    /// Number of successful connection attempts
    pub fn connects(&self) -> usize {
        self.state().connects
    }

    /// Requests received by the bridge, in order
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// Number of requests received for an action
    pub fn count(&self, action: Action) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.action == action)
            .count()
    }

    /// Number of held requests
    pub fn held(&self) -> usize {
        self.state().held.len()
    }

    /// Approve held requests, returning the number released
    pub fn release(&self) -> usize {
        let held = std::mem::take(&mut self.state().held);
        let n = held.len();

        for r in held {
            let reply = self.approve(&r, Some(r.id), 0);
            self.emit(reply);
        }

        n
    }

    /// Reject held requests, returning the number rejected
    pub fn reject_held(&self, reason: &str) -> usize {
        let held = std::mem::take(&mut self.state().held);
        let n = held.len();

        for r in held {
            self.emit(Reply::failure(Some(r.id), r.action, reason));
        }

        n
    }

    /// Emit an arbitrary reply on the inbound stream
    pub fn inject(&self, reply: Reply) {
        self.emit(reply);
    }

    /// Close the bridge link
    pub fn disconnect(&self) {
        self.state().connected = false;
    }

    fn approve(&self, req: &Request, id: Option<cws_proto::CorrelationId>, key_offset: u32) -> Reply {
        let r = self
            .device
            .handle(req, key_offset)
            .and_then(|p| Reply::success(id, req.action, &p).map_err(Error::from));

        match r {
            Ok(r) => r,
            Err(e) => {
                warn!("device failed to handle {}: {e}", req.action);
                Reply::failure(id, req.action, e.to_string())
            }
        }
    }

    fn emit(&self, reply: Reply) {
        debug!("sim reply: {} ({:?})", reply.action, reply.id);

        // No subscribers is not an error for a fire-and-forget bridge
        let _ = self.replies.send(reply);
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for SimTransport {
    type Error = Error;

    async fn connect(&self) -> Result<(), Error> {
        let mut s = self.state();

        if s.behaviour == Behaviour::RefuseConnect {
            return Err(Error::ConnectionRefused);
        }

        if !s.connected {
            debug!("sim bridge connected");
            s.connected = true;
            s.connects += 1;
        }

        Ok(())
    }

    async fn send(&self, req: Request) -> Result<(), Error> {
        let behaviour = {
            let mut s = self.state();
            if !s.connected {
                return Err(Error::NotConnected);
            }

            s.requests.push(req.clone());
            s.behaviour
        };

        debug!("sim request: {} ({}, {behaviour})", req.action, req.id);

        let reply = match behaviour {
            Behaviour::Approve | Behaviour::RefuseConnect => self.approve(&req, Some(req.id), 0),
            Behaviour::NoCorrelationId => self.approve(&req, None, 0),
            Behaviour::WrongKey => self.approve(&req, Some(req.id), 1),
            Behaviour::Reject => Reply::failure(Some(req.id), req.action, "User rejected"),
            Behaviour::Hold => {
                self.state().held.push(req);
                return Ok(());
            }
        };

        self.emit(reply);

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Reply> {
        self.replies.subscribe()
    }

    fn supports_typed_data(&self) -> bool {
        self.typed_data
    }
}
