// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Bridge transport abstraction
//!
//! Bridges are fire-and-forget: `send` only posts the envelope, replies arrive
//! on the shared inbound stream returned by `subscribe`.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{Reply, Request};

/// Bridge transport, implemented by iframe / wireless bridges and the simulator
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open the bridge link, a no-op when already connected
    async fn connect(&self) -> Result<(), Self::Error>;

    /// Post a request envelope to the bridge
    async fn send(&self, req: Request) -> Result<(), Self::Error>;

    /// Subscribe to inbound replies.
    ///
    /// Replies emitted before the subscription is created are not observed.
    fn subscribe(&self) -> broadcast::Receiver<Reply>;

    /// Whether the bridge serves `coolwallet-sign-typed-data`
    fn supports_typed_data(&self) -> bool {
        false
    }
}
