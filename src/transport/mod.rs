//! Network capabilities the dispatcher and consumer are built on
//!
//! - [`Transport`]: request/response for commands
//! - [`EventSource`]: long-lived server push for inbound events
//! - [`HttpTransport`]: both, over HTTP and Server-Sent Events

mod backend;
mod http;
mod sse;

pub use backend::{EventSource, EventStream, Transport, TransportResponse};
pub use http::HttpTransport;
pub use sse::{SseDecoder, MAX_LINE_BYTES};
