//! SampleSource trait - inbound leg of the bridge

use crate::{ContractError, Sample};

/// Sample input trait
///
/// `recv` blocks until the next sample arrives; there is no timeout.
#[trait_variant::make(SampleSource: Send)]
pub trait LocalSampleSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receive the next sample in delivery order
    ///
    /// # Errors
    /// Receive failures and undecodable payloads; both are fatal.
    async fn recv(&mut self) -> Result<Sample, ContractError>;
}
