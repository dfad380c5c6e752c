pub mod config;
pub mod destination;
pub mod error;
pub mod events;
pub mod item;
pub mod metrics;
pub mod orchestrator;
pub mod source;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DestinationBackend,
    SanitizedConfig, SourceBackend,
};
pub use destination::{
    DestinationClient, HttpPublisher, HttpPublisherConfig, SimulatedPublisher,
    SimulatedPublisherConfig,
};
pub use error::{ErrorKind, PlatformError};
pub use events::{EventLog, TransferEvent};
pub use item::{
    AssetRef, DestinationCredentials, Item, ItemStatus, PublishResult, SessionConfig,
    SourceCredentials, TransferFailure,
};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, OrchestratorStatus, OrchestratorUpdate,
    OrchestratorUpdateCallback, RetryConfig, TransferOrchestrator, TransferOutcome,
};
pub use source::{SourceClient, YouTubeClient, YouTubeConfig};
