//! Embedded HTTP server on `may_minihttp` and the `may` coroutine runtime.
//!
//! The transport is an external collaborator; this module adapts its
//! request/response surface to the routing pipeline:
//!
//! ```text
//! HTTP connection → RouterService → Router → links → handler → body assembly
//! ```
//!
//! Routing failures and handler errors reach the configured
//! [`ErrorExchangeHandler`] with the original request, a fresh response and
//! the error; a second failure during error handling is logged and the
//! connection reset.

pub mod config;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use config::{Http2Config, ServerConfig, SslConfig};
pub use http_server::{serve, ServerHandle};
pub use service::{ErrorExchangeHandler, RouterService, WhiteLabelErrorHandler};
