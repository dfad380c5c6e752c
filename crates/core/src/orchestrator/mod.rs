//! Transfer orchestrator.
//!
//! The orchestrator owns the item queue and drives items through the
//! transfer state machine:
//! - **Discovery**: appends unseen trending items as `pending`
//! - **Transfer**: resolve on the source, then publish on the destination,
//!   strictly one item at a time
//! - **Auto-cycle**: background task that transfers pending items in
//!   discovery order until stopped

mod config;
mod queue;
mod retry;
mod runner;
mod types;

pub use config::{OrchestratorConfig, RetryConfig};
pub use retry::RetryPolicy;
pub use runner::{OrchestratorUpdateCallback, TransferOrchestrator};
pub use types::{OrchestratorError, OrchestratorStatus, OrchestratorUpdate, TransferOutcome};
