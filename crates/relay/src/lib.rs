//! # Relay
//!
//! Subscribe-one/publish-one forwarding.
//!
//! Responsibilities:
//! - Per-sample `RelayFilter` implementations: identity, dead-band, threshold
//! - `Bridge`: receive, filter, republish, in inbound order
//! - Any filter or transport error stops the bridge

pub mod bridge;
pub mod filter;

pub use bridge::{Bridge, BridgeStats};
pub use contracts::RelayFilter;
pub use filter::{DeadBandFilter, IdentityFilter, ThresholdFilter, build_filter};
