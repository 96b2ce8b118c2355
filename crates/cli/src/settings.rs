//! Resolve effective settings: configuration file first, then flag overrides.

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{
    FabricBlueprint, FilterConfig, GeneratorConfig, MonitorConfig, RelayConfig, StreamConfig,
    StreamKind, TransportConfig,
};
use tracing::info;

use crate::cli::{
    FilterKind, GenerateArgs, MonitorArgs, RelayArgs, StreamArgs, TransportArgs,
};

/// Upstream port of the conventional haptic chain
const DEFAULT_RELAY_IN_PORT: u16 = 5555;
/// Republish port of the conventional haptic chain
const DEFAULT_RELAY_OUT_PORT: u16 = 5556;
/// Dead-band threshold when only `--filter dead-band` is given
const DEFAULT_DEAD_BAND: f64 = 0.1;
/// Monitor target host when none is configured
const DEFAULT_MONITOR_HOST: &str = "127.0.0.1";

/// Load the optional configuration file
pub fn load_blueprint(path: Option<&Path>) -> Result<FabricBlueprint> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(FabricBlueprint::default()),
    }
}

fn apply_transport(transport: &mut TransportConfig, args: &TransportArgs) {
    if let Some(settle_ms) = args.settle_ms {
        transport.settle_ms = settle_ms;
    }
    if let Some(capacity) = args.queue_capacity {
        transport.queue_capacity = capacity;
    }
}

fn validated(blueprint: &FabricBlueprint) -> Result<()> {
    ConfigLoader::validate(blueprint).context("Invalid effective configuration")
}

/// Effective trace playback settings
pub fn resolve_stream(args: &StreamArgs) -> Result<(TransportConfig, StreamConfig)> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_transport(&mut blueprint.transport, &args.transport);

    let mut stream = blueprint
        .stream
        .take()
        .unwrap_or_else(|| StreamConfig::for_kind(args.kind.unwrap_or(StreamKind::Haptic)));

    if let Some(kind) = args.kind {
        stream.kind = kind;
    }
    if let Some(hz) = args.hz {
        stream.rate_hz = hz;
    }
    if let Some(port) = args.port {
        stream.port = Some(port);
    }
    if let Some(data_root) = &args.data_root {
        stream.data_root = data_root.clone();
    }
    if let Some(run) = &args.run {
        stream.run = Some(run.clone());
        stream.path = None;
    }
    if let Some(trace) = &args.trace {
        stream.path = Some(trace.clone());
    }

    blueprint.stream = Some(stream.clone());
    validated(&blueprint)?;
    Ok((blueprint.transport, stream))
}

/// Effective synthetic generator settings
pub fn resolve_generator(args: &GenerateArgs) -> Result<(TransportConfig, GeneratorConfig)> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_transport(&mut blueprint.transport, &args.transport);

    let mut generator = blueprint.generator.take().unwrap_or_else(|| {
        let kind = args.kind.unwrap_or(StreamKind::Haptic);
        GeneratorConfig {
            kind,
            rate_hz: kind.default_rate_hz(),
            port: None,
        }
    });

    if let Some(kind) = args.kind {
        generator.kind = kind;
    }
    if let Some(hz) = args.hz {
        generator.rate_hz = hz;
    }
    if let Some(port) = args.port {
        generator.port = Some(port);
    }

    blueprint.generator = Some(generator.clone());
    validated(&blueprint)?;
    Ok((blueprint.transport, generator))
}

/// Effective relay settings
pub fn resolve_relay(args: &RelayArgs) -> Result<(TransportConfig, RelayConfig)> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_transport(&mut blueprint.transport, &args.transport);

    let mut relay = blueprint.relay.take().unwrap_or_else(|| RelayConfig {
        kind: args.kind.unwrap_or(StreamKind::Haptic),
        in_host: "localhost".to_string(),
        in_port: DEFAULT_RELAY_IN_PORT,
        out_port: DEFAULT_RELAY_OUT_PORT,
        filter: FilterConfig::Identity,
    });

    if let Some(kind) = args.kind {
        relay.kind = kind;
    }
    if let Some(host) = &args.in_host {
        relay.in_host = host.clone();
    }
    if let Some(port) = args.in_port {
        relay.in_port = port;
    }
    if let Some(port) = args.out_port {
        relay.out_port = port;
    }
    if let Some(filter) = filter_override(args, &relay.filter)? {
        relay.filter = filter;
    }

    blueprint.relay = Some(relay.clone());
    validated(&blueprint)?;
    Ok((blueprint.transport, relay))
}

/// Filter requested by flags, if any
///
/// Parameter flags without `--filter` adjust the configured filter of the
/// same kind.
fn filter_override(args: &RelayArgs, current: &FilterConfig) -> Result<Option<FilterConfig>> {
    let kind = match (args.filter, current) {
        (Some(kind), _) => kind,
        (None, FilterConfig::DeadBand { .. }) if args.threshold.is_some() => FilterKind::DeadBand,
        (None, FilterConfig::Threshold { .. }) if args.field.is_some() || args.max.is_some() => {
            FilterKind::Threshold
        }
        (None, _) => return Ok(None),
    };

    let filter = match kind {
        FilterKind::Identity => FilterConfig::Identity,
        FilterKind::DeadBand => {
            let configured = match current {
                FilterConfig::DeadBand { threshold } => Some(*threshold),
                _ => None,
            };
            FilterConfig::DeadBand {
                threshold: args
                    .threshold
                    .or(configured)
                    .unwrap_or(DEFAULT_DEAD_BAND),
            }
        }
        FilterKind::Threshold => {
            let (field, max) = match current {
                FilterConfig::Threshold { field, max } => (Some(*field), Some(*max)),
                _ => (None, None),
            };
            FilterConfig::Threshold {
                field: args.field.or(field).unwrap_or(1),
                max: args
                    .max
                    .or(max)
                    .context("--max is required for the threshold filter")?,
            }
        }
    };
    Ok(Some(filter))
}

/// Effective monitor settings
pub fn resolve_monitor(args: &MonitorArgs) -> Result<(TransportConfig, MonitorConfig)> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    let mut monitor = match blueprint.monitor.take() {
        Some(monitor) => monitor,
        None => {
            let kind = args.kind.unwrap_or(StreamKind::Haptic);
            MonitorConfig {
                host: DEFAULT_MONITOR_HOST.to_string(),
                port: args.port.unwrap_or_else(|| kind.default_port()),
                kind,
            }
        }
    };

    if let Some(host) = &args.host {
        monitor.host = host.clone();
    }
    if let Some(port) = args.port {
        monitor.port = port;
    }
    if let Some(kind) = args.kind {
        monitor.kind = kind;
    }

    blueprint.monitor = Some(monitor.clone());
    validated(&blueprint)?;
    Ok((blueprint.transport, monitor))
}
