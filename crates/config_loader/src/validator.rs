//! Configuration validation
//!
//! Rules:
//! - rate_hz > 0 (stream, generator)
//! - ports non-zero, hosts non-empty
//! - queue_capacity >= 1
//! - stream names a trace via `path` or `run`
//! - dead-band threshold >= 0
//! - relay does not republish on the port it subscribes to on the same host

use ::validator::Validate;
use contracts::{ContractError, FabricBlueprint, FilterConfig, StreamKind};

/// Validate a FabricBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &FabricBlueprint) -> Result<(), ContractError> {
    check_section("transport", &blueprint.transport)?;
    validate_stream(blueprint)?;
    validate_generator(blueprint)?;
    validate_relay(blueprint)?;
    validate_monitor(blueprint)?;
    Ok(())
}

/// Run derive-based rules for one section
fn check_section<T: Validate>(section: &str, value: &T) -> Result<(), ContractError> {
    value
        .validate()
        .map_err(|errors| ContractError::configuration(section, errors.to_string()))
}

/// Validate trace playback section
fn validate_stream(blueprint: &FabricBlueprint) -> Result<(), ContractError> {
    let Some(stream) = &blueprint.stream else {
        return Ok(());
    };

    check_section("stream", stream)?;
    stream.rate()?;

    if stream.trace_path().is_none() {
        return Err(ContractError::configuration(
            "stream.path / stream.run",
            "either a trace path or a run identifier is required",
        ));
    }

    if let Some(run) = &stream.run {
        if run.trim().is_empty() || run.contains(std::path::MAIN_SEPARATOR) {
            return Err(ContractError::configuration(
                "stream.run",
                format!("run identifier must be a single folder name, got {run:?}"),
            ));
        }
    }

    Ok(())
}

/// Validate synthetic generator section
fn validate_generator(blueprint: &FabricBlueprint) -> Result<(), ContractError> {
    let Some(generator) = &blueprint.generator else {
        return Ok(());
    };

    check_section("generator", generator)?;
    generator.rate()?;
    Ok(())
}

/// Validate relay section
fn validate_relay(blueprint: &FabricBlueprint) -> Result<(), ContractError> {
    let Some(relay) = &blueprint.relay else {
        return Ok(());
    };

    check_section("relay", relay)?;

    if is_loopback(&relay.in_host) && relay.in_port == relay.out_port {
        return Err(ContractError::configuration(
            "relay.out_port",
            format!(
                "out_port {} would republish onto the subscribed endpoint",
                relay.out_port
            ),
        ));
    }

    validate_filter(&relay.filter, relay.kind)
}

/// Validate filter parameters against the relayed stream
fn validate_filter(filter: &FilterConfig, kind: StreamKind) -> Result<(), ContractError> {
    match filter {
        FilterConfig::Identity => Ok(()),
        FilterConfig::DeadBand { threshold } => {
            if !threshold.is_finite() || *threshold < 0.0 {
                return Err(ContractError::configuration(
                    "relay.filter.threshold",
                    format!("threshold must be >= 0, got {threshold}"),
                ));
            }
            if kind != StreamKind::Haptic {
                return Err(ContractError::configuration(
                    "relay.filter",
                    format!("dead_band filter needs a haptic stream, got {kind}"),
                ));
            }
            Ok(())
        }
        FilterConfig::Threshold { field, max } => {
            if *field >= kind.arity() {
                return Err(ContractError::configuration(
                    "relay.filter.field",
                    format!("field {field} out of range for {kind} stream"),
                ));
            }
            if max.is_nan() {
                return Err(ContractError::configuration(
                    "relay.filter.max",
                    "max must be a number",
                ));
            }
            Ok(())
        }
    }
}

/// Validate monitor section
fn validate_monitor(blueprint: &FabricBlueprint) -> Result<(), ContractError> {
    match &blueprint.monitor {
        Some(monitor) => check_section("monitor", monitor),
        None => Ok(()),
    }
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MonitorConfig, RelayConfig, StreamConfig, TransportConfig};
    use std::path::PathBuf;

    fn stream(rate_hz: f64, run: Option<&str>) -> StreamConfig {
        StreamConfig {
            kind: StreamKind::Haptic,
            rate_hz,
            port: None,
            path: None,
            run: run.map(String::from),
            data_root: PathBuf::from("/SimData"),
        }
    }

    fn relay(filter: FilterConfig) -> RelayConfig {
        RelayConfig {
            kind: StreamKind::Haptic,
            in_host: "vm1".to_string(),
            in_port: 5555,
            out_port: 5556,
            filter,
        }
    }

    #[test]
    fn test_valid_stream() {
        let bp = FabricBlueprint {
            stream: Some(stream(100.0, Some("run01"))),
            ..Default::default()
        };
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_stream_needs_trace() {
        let bp = FabricBlueprint {
            stream: Some(stream(100.0, None)),
            ..Default::default()
        };
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("run identifier"));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let bp = FabricBlueprint {
            stream: Some(stream(-1.0, Some("run01"))),
            ..Default::default()
        };
        assert!(matches!(
            validate(&bp),
            Err(ContractError::Configuration { .. })
        ));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let bp = FabricBlueprint {
            transport: TransportConfig {
                settle_ms: 0,
                queue_capacity: 0,
            },
            ..Default::default()
        };
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = relay(FilterConfig::Identity);
        config.out_port = 0;
        let bp = FabricBlueprint {
            relay: Some(config),
            ..Default::default()
        };
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_relay_loop_rejected() {
        let mut config = relay(FilterConfig::Identity);
        config.in_host = "localhost".to_string();
        config.out_port = 5555;
        let bp = FabricBlueprint {
            relay: Some(config),
            ..Default::default()
        };
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("republish"));
    }

    #[test]
    fn test_negative_dead_band_rejected() {
        let bp = FabricBlueprint {
            relay: Some(relay(FilterConfig::DeadBand { threshold: -0.1 })),
            ..Default::default()
        };
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_threshold_field_out_of_range() {
        let bp = FabricBlueprint {
            relay: Some(relay(FilterConfig::Threshold { field: 4, max: 1.0 })),
            ..Default::default()
        };
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_empty_monitor_host_rejected() {
        let bp = FabricBlueprint {
            monitor: Some(MonitorConfig {
                host: String::new(),
                port: 5556,
                kind: StreamKind::Haptic,
            }),
            ..Default::default()
        };
        assert!(validate(&bp).is_err());
    }
}
