//! Stream Player - loops a trace onto a sink at a fixed rate
//!
//! Looping is silent: nothing is emitted at the boundary, the next pass simply
//! starts with the first data row again.

use std::path::Path;

use contracts::{ContractError, RateSpec, SampleSink, StreamKind};
use observability::{record_sample_published, record_trace_loop};
use tracing::{debug, info, instrument, trace};

use crate::{RateScheduler, Trace, TraceReader};

/// When a bounded playback stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackLimit {
    /// Play until the process is terminated
    #[default]
    Unbounded,
    /// Stop after `n` complete passes over the trace
    Cycles(u64),
    /// Stop after `n` emitted samples
    Samples(u64),
}

impl PlaybackLimit {
    /// `0` means unbounded, matching the CLI convention
    pub fn from_max_samples(max: u64) -> Self {
        if max == 0 {
            Self::Unbounded
        } else {
            Self::Samples(max)
        }
    }
}

/// Player lifecycle; there is no terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

/// Counters returned by a bounded playback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    pub samples: u64,
    pub cycles: u64,
}

/// Trace playback engine
pub struct StreamPlayer {
    trace: Trace,
    scheduler: RateScheduler,
    state: PlayerState,
    report: PlaybackReport,
}

impl StreamPlayer {
    /// Compose an opened trace with a scheduler
    pub fn new(trace: Trace, scheduler: RateScheduler) -> Self {
        Self {
            trace,
            scheduler,
            state: PlayerState::Idle,
            report: PlaybackReport::default(),
        }
    }

    /// Open the trace and fail fast if it is absent or malformed
    pub fn open(
        path: impl AsRef<Path>,
        kind: StreamKind,
        rate: RateSpec,
    ) -> Result<Self, ContractError> {
        let trace = TraceReader::open(path, kind)?;
        Ok(Self::new(trace, RateScheduler::new(rate)))
    }

    /// Current lifecycle state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Counters so far
    pub fn report(&self) -> PlaybackReport {
        self.report
    }

    /// Underlying trace
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Emit samples onto `sink` until `limit` is reached
    ///
    /// With `PlaybackLimit::Unbounded` this only returns on error.
    ///
    /// # Errors
    /// Mid-loop read failures and sink failures; neither is retried.
    #[instrument(
        name = "stream_player_play",
        skip(self, sink),
        fields(sink = %sink.name(), trace = %self.trace.path().display())
    )]
    pub async fn play<S: SampleSink>(
        &mut self,
        sink: &mut S,
        limit: PlaybackLimit,
    ) -> Result<PlaybackReport, ContractError> {
        info!(
            kind = %self.trace.kind(),
            rows = self.trace.len_hint(),
            interval_ms = self.scheduler.interval().as_secs_f64() * 1000.0,
            ?limit,
            "Playback started"
        );

        loop {
            let mut pass_len = 0u64;

            for row in self.trace.restart()? {
                let sample = row?;

                self.scheduler.wait_next().await;
                sink.publish(&sample).await?;

                self.state = PlayerState::Playing;
                self.report.samples += 1;
                pass_len += 1;
                record_sample_published(sink.name());
                trace!(sample = %sample, "emitted");

                if limit == PlaybackLimit::Samples(self.report.samples) {
                    return Ok(self.report);
                }
            }

            if pass_len == 0 {
                return Err(ContractError::format(
                    self.trace.path().display().to_string(),
                    "trace has no data rows",
                ));
            }

            self.report.cycles += 1;
            record_trace_loop(sink.name());
            debug!(cycle = self.report.cycles, samples = pass_len, "Trace looped");

            if limit == PlaybackLimit::Cycles(self.report.cycles) {
                return Ok(self.report);
            }
        }
    }
}
