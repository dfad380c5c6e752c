//! Destination platform client.
//!
//! The destination accepts a resolved asset and republishes it.

mod http;
mod simulated;

pub use http::{HttpPublisher, HttpPublisherConfig};
pub use simulated::{SimulatedPublisher, SimulatedPublisherConfig};

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::item::{AssetRef, DestinationCredentials, PublishResult};

/// Client for the platform items are republished to.
///
/// Every call makes exactly one remote publish attempt. `Rejected` is
/// permanent; `Upstream` may be retried by the caller.
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Backend name for logs and status output.
    fn name(&self) -> &'static str;

    async fn publish(
        &self,
        asset: &AssetRef,
        credentials: &DestinationCredentials,
    ) -> Result<PublishResult, PlatformError>;
}
