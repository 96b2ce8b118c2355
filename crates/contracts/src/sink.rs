//! SampleSink trait - outbound leg of every loop

use crate::{ContractError, Sample};

/// Sample output trait
///
/// Implemented by the transport publisher, the log sink, and test fakes.
#[trait_variant::make(SampleSink: Send)]
pub trait LocalSampleSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Publish one sample
    ///
    /// # Errors
    /// Any error is fatal for the calling loop.
    async fn publish(&mut self, sample: &Sample) -> Result<(), ContractError>;
}
