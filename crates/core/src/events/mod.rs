//! Transfer event log.
//!
//! Every item phase transition produces one immutable [`TransferEvent`].
//! Events are kept in a bounded in-memory [`EventLog`], newest first.

mod log;
mod types;

pub use log::{EventLog, DEFAULT_EVENT_LOG_CAPACITY};
pub use types::TransferEvent;
