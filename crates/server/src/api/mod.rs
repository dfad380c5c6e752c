pub mod boundary;
pub mod error;
pub mod events;
pub mod handlers;
pub mod items;
pub mod middleware;
pub mod orchestrator;
pub mod routes;
pub mod trending;
pub mod ws;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
