//! # Transport
//!
//! Fire-and-forget pub/sub over TCP.
//!
//! Responsibilities:
//! - Process-scoped `TransportContext`, passed to every endpoint constructor
//! - `Publisher`: binds a wildcard address, broadcasts to all connected subscribers
//! - `Subscriber`: connects to a publisher and receives every message, no topic filtering
//! - Slow subscribers miss samples instead of stalling the publisher
//!
//! One message is one `\n`-terminated line holding the comma-joined sample.

pub mod context;
pub mod metrics;
pub mod publisher;
pub mod sinks;
pub mod subscriber;

pub use context::TransportContext;
pub use contracts::{SampleSink, SampleSource};
pub use metrics::{EndpointMetrics, MetricsSnapshot};
pub use publisher::Publisher;
pub use sinks::LogSink;
pub use subscriber::Subscriber;
