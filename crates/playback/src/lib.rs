//! # Playback
//!
//! Timed sample emission.
//!
//! Responsibilities:
//! - Load recorded traces and re-read them at every loop boundary
//! - Pace emissions against the monotonic clock (fixed-delay, no catch-up)
//! - Loop a trace forever onto a `SampleSink`
//! - Fabricate samples when no trace exists
//!
//! ## Usage Example
//!
//! ```ignore
//! use playback::{PlaybackLimit, StreamPlayer};
//!
//! let mut player = StreamPlayer::open(&path, StreamKind::Haptic, RateSpec::from_hz(100.0)?)?;
//! player.play(&mut publisher, PlaybackLimit::Unbounded).await?;
//! ```

mod generator;
mod player;
mod scheduler;
mod trace;

pub use generator::SyntheticGenerator;
pub use player::{PlaybackLimit, PlaybackReport, PlayerState, StreamPlayer};
pub use scheduler::RateScheduler;
pub use trace::{trace_path, Trace, TraceReader, TraceRows};
