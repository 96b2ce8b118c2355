//! Bridge - subscribe-one/publish-one pump

use contracts::{ContractError, RelayConfig, RelayFilter, SampleSink, SampleSource};
use observability::record_sample_filtered;
use tracing::{debug, info, instrument};
use transport::{Publisher, Subscriber, TransportContext};

/// Bridge counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Samples taken from the inbound source
    pub received: u64,
    /// Samples republished
    pub forwarded: u64,
    /// Samples the filter dropped
    pub dropped: u64,
}

/// Forwards one inbound stream to one outbound stream through a filter
///
/// Output order is the order the source delivered. The bridge owns both
/// endpoints for its whole lifetime; filter state lives as long as the bridge.
pub struct Bridge<Src, Snk, F> {
    source: Src,
    sink: Snk,
    filter: F,
    stats: BridgeStats,
}

impl<F: RelayFilter> Bridge<Subscriber, Publisher, F> {
    /// Connect upstream, bind downstream, then settle
    ///
    /// # Errors
    /// `Transport` if either endpoint cannot be opened.
    #[instrument(
        name = "bridge_open",
        skip_all,
        fields(inbound = %config.inbound(), outbound = %config.outbound(), filter = filter.name())
    )]
    pub async fn open(
        ctx: &TransportContext,
        config: &RelayConfig,
        filter: F,
    ) -> Result<Self, ContractError> {
        let source = ctx.subscriber(&config.inbound(), config.kind).await?;
        let sink = ctx.publisher(&config.outbound()).await?;
        ctx.settle().await;
        Ok(Self::new(source, sink, filter))
    }
}

impl<Src, Snk, F> Bridge<Src, Snk, F>
where
    Src: SampleSource,
    Snk: SampleSink,
    F: RelayFilter,
{
    /// Assemble a bridge from already opened endpoints
    pub fn new(source: Src, sink: Snk, filter: F) -> Self {
        Self {
            source,
            sink,
            filter,
            stats: BridgeStats::default(),
        }
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn sink(&self) -> &Snk {
        &self.sink
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    /// Receive one sample, filter it, republish it if kept
    ///
    /// Returns whether the sample was forwarded.
    ///
    /// # Errors
    /// Any receive, filter or publish error. None of them are retried.
    pub async fn pump_once(&mut self) -> Result<bool, ContractError> {
        let sample = self.source.recv().await?;
        self.stats.received += 1;
        debug!(source = self.source.name(), payload = %sample, "Received");

        match self.filter.apply(sample)? {
            Some(sample) => {
                self.sink.publish(&sample).await?;
                self.stats.forwarded += 1;
                debug!(sink = self.sink.name(), payload = %sample, "Forwarded");
                Ok(true)
            }
            None => {
                self.stats.dropped += 1;
                record_sample_filtered(self.filter.name());
                Ok(false)
            }
        }
    }

    /// Pump exactly `count` inbound samples
    pub async fn run_for(&mut self, count: u64) -> Result<BridgeStats, ContractError> {
        for _ in 0..count {
            self.pump_once().await?;
        }
        Ok(self.stats)
    }

    /// Pump until an error occurs
    ///
    /// Only returns on failure; a silent upstream blocks forever.
    #[instrument(
        name = "bridge_run",
        skip_all,
        fields(source = self.source.name(), sink = self.sink.name(), filter = self.filter.name())
    )]
    pub async fn run(&mut self) -> Result<(), ContractError> {
        info!("Bridge started");
        loop {
            if let Err(e) = self.pump_once().await {
                info!(
                    received = self.stats.received,
                    forwarded = self.stats.forwarded,
                    dropped = self.stats.dropped,
                    "Bridge stopped"
                );
                return Err(e);
            }

            if self.stats.received.is_multiple_of(1000) {
                debug!(
                    received = self.stats.received,
                    forwarded = self.stats.forwarded,
                    "Bridge progress"
                );
            }
        }
    }
}
