//! `relay` command implementation.

use anyhow::{Context, Result};
use ::relay::{Bridge, build_filter};
use tracing::info;
use transport::TransportContext;

use super::until_shutdown;
use crate::cli::RelayArgs;
use crate::settings;

/// Execute the `relay` command
pub async fn run_relay(args: &RelayArgs) -> Result<()> {
    let (transport, config) = settings::resolve_relay(args)?;
    let filter = build_filter(&config.filter)?;

    info!(
        inbound = %config.inbound(),
        outbound = %config.outbound(),
        kind = %config.kind,
        filter = ?config.filter,
        "Starting relay"
    );

    let ctx = TransportContext::new(transport);
    let mut bridge = Bridge::open(&ctx, &config, filter)
        .await
        .context("Failed to open relay endpoints")?;

    if args.max_samples > 0 {
        until_shutdown(bridge.run_for(args.max_samples))
            .await
            .context("Relay failed")?;
    } else {
        until_shutdown(bridge.run()).await.context("Relay failed")?;
    }

    let stats = bridge.stats();
    info!(
        received = stats.received,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        "Relay finished"
    );
    Ok(())
}
