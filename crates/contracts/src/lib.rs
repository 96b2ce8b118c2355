//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the telemetry fabric.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Wire Model
//! - A `Sample` is an ordered tuple of textual fields, arity fixed per `StreamKind`
//! - On the wire a sample is its fields joined by `,`, one message per sample

mod blueprint;
mod endpoint;
mod error;
mod filter;
mod rate;
mod sample;
mod sink;
mod source;
mod stream_kind;

pub use blueprint::*;
pub use endpoint::EndpointAddr;
pub use error::*;
pub use filter::RelayFilter;
pub use rate::RateSpec;
pub use sample::{Field, Sample};
pub use sink::*;
pub use source::*;
pub use stream_kind::StreamKind;
