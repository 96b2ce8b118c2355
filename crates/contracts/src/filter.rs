//! RelayFilter trait - per-sample transform applied by the bridge

use crate::{ContractError, Sample};

/// Per-sample transform
///
/// `apply` must not block. Returning `Ok(None)` drops the sample; returning an
/// error stops the bridge. Stateful implementations keep their state for the
/// lifetime of the bridge and clear it in `reset`.
pub trait RelayFilter: Send {
    /// Filter name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Transform one sample, or drop it
    fn apply(&mut self, sample: Sample) -> Result<Option<Sample>, ContractError>;

    /// Clear any state accumulated across calls
    fn reset(&mut self) {}
}

impl<F: RelayFilter + ?Sized> RelayFilter for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&mut self, sample: Sample) -> Result<Option<Sample>, ContractError> {
        (**self).apply(sample)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
