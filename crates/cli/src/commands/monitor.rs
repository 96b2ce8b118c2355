//! `monitor` command implementation.

use anyhow::{Context, Result};
use contracts::{ContractError, Sample};
use observability::ArrivalStats;
use tokio::time::Instant;
use tracing::{info, warn};
use transport::{Subscriber, TransportContext};

use super::until_shutdown;
use crate::cli::MonitorArgs;
use crate::settings;

/// Execute the `monitor` command
pub async fn run_monitor(args: &MonitorArgs) -> Result<()> {
    let (transport, config) = settings::resolve_monitor(args)?;

    let ctx = TransportContext::new(transport);
    let mut subscriber = ctx
        .subscriber(&config.addr(), config.kind)
        .await
        .context("Failed to connect to publisher")?;

    let mut stats = ArrivalStats::new();
    let started = Instant::now();
    let max_messages = (args.max_messages > 0).then_some(args.max_messages);

    let result = until_shutdown(watch(&mut subscriber, &mut stats, max_messages)).await;

    let elapsed = started.elapsed();
    println!("\n=== Monitor Summary: {} ===\n", config.addr());
    println!("{stats}");
    println!("Rate (Hz): {:.2}", stats.rate_hz(elapsed));
    println!("Duration (s): {:.2}", elapsed.as_secs_f64());

    result.context("Monitor stopped")?;
    Ok(())
}

/// Log every payload and fold it into `stats`
///
/// Undecodable payloads are counted, not fatal.
async fn watch(
    subscriber: &mut Subscriber,
    stats: &mut ArrivalStats,
    max_messages: Option<u64>,
) -> Result<(), ContractError> {
    let kind = subscriber.kind();
    let mut last_arrival: Option<Instant> = None;

    loop {
        let line = subscriber.recv_line().await?;
        let now = Instant::now();
        let since_last = last_arrival.map(|last| now.duration_since(last));
        last_arrival = Some(now);

        match Sample::parse_line(&line, kind) {
            Ok(sample) => {
                info!(payload = %sample, "Received");
                stats.record(since_last, sample.timestamp());
            }
            Err(e) => {
                warn!(payload = %line, error = %e, "Malformed payload");
                stats.record_malformed();
            }
        }

        if max_messages == Some(stats.messages) {
            return Ok(());
        }
    }
}
