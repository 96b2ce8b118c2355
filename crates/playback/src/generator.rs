//! Synthetic Generator - fabricated samples when no trace exists
//!
//! Haptic: `timestamp,x,y,z` with axes uniform in [-1, 1].
//! Video: `timestamp,kbps` with bitrate uniform in [2000, 8000].
//! Timestamps are seconds since the first emission on the monotonic clock.

use contracts::{ContractError, Field, RateSpec, Sample, SampleSink, StreamKind};
use observability::record_sample_published;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tracing::{info, instrument, trace};

use crate::RateScheduler;

const AXIS_RANGE: std::ops::RangeInclusive<f64> = -1.0..=1.0;
const BITRATE_KBPS: std::ops::RangeInclusive<u32> = 2000..=8000;

/// Fixed-rate sample fabricator
pub struct SyntheticGenerator<R = StdRng> {
    kind: StreamKind,
    scheduler: RateScheduler,
    rng: R,
    started_at: Option<Instant>,
    emitted: u64,
}

impl SyntheticGenerator<StdRng> {
    /// Create with an OS-seeded generator
    pub fn new(kind: StreamKind, rate: RateSpec) -> Self {
        Self::with_rng(kind, RateScheduler::new(rate), StdRng::from_os_rng())
    }
}

impl<R: Rng + Send> SyntheticGenerator<R> {
    /// Create with an explicit scheduler and random source
    pub fn with_rng(kind: StreamKind, scheduler: RateScheduler, rng: R) -> Self {
        Self {
            kind,
            scheduler,
            rng,
            started_at: None,
            emitted: 0,
        }
    }

    /// Samples emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Fabricate one sample stamped `elapsed_secs`
    pub fn synthesize(&mut self, elapsed_secs: f64) -> Sample {
        let mut fields = Vec::with_capacity(self.kind.arity());
        fields.push(Field::new(format!("{elapsed_secs:.5}")));

        match self.kind {
            StreamKind::Haptic => {
                for _ in 0..3 {
                    let axis: f64 = self.rng.random_range(AXIS_RANGE);
                    fields.push(Field::new(format!("{axis:.3}")));
                }
            }
            StreamKind::Video => {
                let kbps: u32 = self.rng.random_range(BITRATE_KBPS);
                fields.push(Field::new(kbps.to_string()));
            }
            StreamKind::Generic(arity) => {
                for _ in 1..arity {
                    let value: f64 = self.rng.random();
                    fields.push(Field::new(format!("{value:.3}")));
                }
            }
        }

        Sample::new(fields)
    }

    /// Emit onto `sink`; `None` runs until the process is terminated
    #[instrument(
        name = "synthetic_generator_play",
        skip(self, sink),
        fields(sink = %sink.name(), kind = %self.kind)
    )]
    pub async fn play<S: SampleSink>(
        &mut self,
        sink: &mut S,
        max_samples: Option<u64>,
    ) -> Result<u64, ContractError> {
        info!(
            interval_ms = self.scheduler.interval().as_secs_f64() * 1000.0,
            ?max_samples,
            "Synthetic generator started"
        );

        loop {
            self.scheduler.wait_next().await;

            let now = Instant::now();
            let started_at = *self.started_at.get_or_insert(now);
            let sample = self.synthesize(now.duration_since(started_at).as_secs_f64());

            sink.publish(&sample).await?;
            self.emitted += 1;
            record_sample_published(sink.name());
            trace!(sample = %sample, "generated");

            if max_samples == Some(self.emitted) {
                return Ok(self.emitted);
            }
        }
    }
}
