//! `generate` command implementation.

use anyhow::{Context, Result};
use playback::SyntheticGenerator;
use tracing::info;
use transport::{LogSink, TransportContext};

use super::until_shutdown;
use crate::cli::GenerateArgs;
use crate::settings;

/// Execute the `generate` command
pub async fn run_generate(args: &GenerateArgs) -> Result<()> {
    let (transport, config) = settings::resolve_generator(args)?;
    let rate = config.rate()?;
    let max_samples = (args.max_samples > 0).then_some(args.max_samples);

    let mut generator = SyntheticGenerator::new(config.kind, rate);

    if args.dry_run {
        let mut sink = LogSink::new(format!("dry-run:{}", config.kind));
        until_shutdown(generator.play(&mut sink, max_samples))
            .await
            .context("Generator failed")?;
    } else {
        let ctx = TransportContext::new(transport);
        let mut publisher = ctx
            .publisher(&config.bind_addr())
            .await
            .context("Failed to open publish endpoint")?;
        ctx.settle().await;
        until_shutdown(generator.play(&mut publisher, max_samples))
            .await
            .context("Generator failed")?;
    }

    info!(samples = generator.emitted(), "Generator finished");
    Ok(())
}
