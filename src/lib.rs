//! Embeddable HTTP router with declarative, composable routes.
//!
//! Routes are matched along five independent dimensions (path as a literal
//! or template, method, consumed content type, produced content type and
//! language) through a fixed pipeline of routing links, and dispatched to
//! the registered handler. Response bodies assemble from raw payloads,
//! resources or server-sent event streams.

pub mod body;
pub mod error;
pub mod exchange;
pub mod headers;
pub mod router;
pub mod server;
pub mod stream;
pub mod uri;

pub use error::HttpError;
pub use exchange::{CorrelationId, Exchange, Request, Response};
pub use router::{ExchangeHandler, Route, RouteManager, Router};
