//! Content items and the per-session configuration used to transfer them.

mod session;
mod types;

pub use session::{DestinationCredentials, SessionConfig, SourceCredentials};
pub use types::{AssetRef, Item, ItemStatus, PublishResult, TransferFailure};
