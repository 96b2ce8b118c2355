//! `stream` command implementation.

use anyhow::{Context, Result};
use playback::{PlaybackLimit, StreamPlayer};
use tracing::info;
use transport::{LogSink, TransportContext};

use super::until_shutdown;
use crate::cli::StreamArgs;
use crate::settings;

/// Execute the `stream` command
pub async fn run_stream(args: &StreamArgs) -> Result<()> {
    let (transport, stream) = settings::resolve_stream(args)?;
    let path = stream
        .trace_path()
        .context("No trace file configured")?;
    let rate = stream.rate()?;
    let limit = PlaybackLimit::from_max_samples(args.max_samples);

    // Fail before binding anything if the trace is absent or malformed
    let mut player = StreamPlayer::open(&path, stream.kind, rate)
        .with_context(|| format!("Cannot stream trace {}", path.display()))?;

    info!(
        trace = %path.display(),
        kind = %stream.kind,
        rate_hz = rate.hz(),
        rows = player.trace().len_hint(),
        "Trace opened"
    );

    let finished = if args.dry_run {
        let mut sink = LogSink::new(format!("dry-run:{}", stream.kind));
        until_shutdown(player.play(&mut sink, limit)).await
    } else {
        let ctx = TransportContext::new(transport);
        let mut publisher = ctx
            .publisher(&stream.bind_addr())
            .await
            .context("Failed to open publish endpoint")?;
        ctx.settle().await;
        until_shutdown(player.play(&mut publisher, limit)).await
    };
    let finished = finished.context("Playback failed")?;

    let report = player.report();
    info!(
        samples = report.samples,
        cycles = report.cycles,
        completed = finished.is_some(),
        "Playback finished"
    );
    Ok(())
}
