//! Tower middleware for the network client.
//!
//! Layers wrap the engine's [`BoxedService`](crate::BoxedService). The
//! built-in [`LoggingLayer`] sits closest to the wire so it sees what custom
//! layers added; layers registered with
//! [`NetworkClientBuilder::layer`](crate::NetworkClientBuilder::layer) wrap it
//! in registration order, first added outermost.

mod logging;

pub use logging::{BODY_PREVIEW_LIMIT, LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
