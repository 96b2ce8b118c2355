//! LogSink - logs each sample via tracing

use contracts::{ContractError, Sample, SampleSink};
use tracing::{info, instrument};

/// Sink that logs samples instead of publishing them
///
/// Used for dry runs of `stream` and `generate`.
pub struct LogSink {
    name: String,
    written: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            written: 0,
        }
    }

    /// Samples logged so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl SampleSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_publish", skip_all, fields(sink = %self.name))]
    async fn publish(&mut self, sample: &Sample) -> Result<(), ContractError> {
        self.written += 1;
        info!(
            seq = self.written,
            timestamp = sample.timestamp(),
            payload = %sample,
            "Sample"
        );
        Ok(())
    }
}
