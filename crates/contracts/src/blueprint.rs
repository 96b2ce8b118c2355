//! FabricBlueprint - Config Loader output
//!
//! Describes one node of the fabric: transport settings plus whichever of the
//! stream / generator / relay / monitor roles the node plays.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ContractError, EndpointAddr, RateSpec, StreamKind};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FabricBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Process-wide transport settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Trace playback role
    #[serde(default)]
    pub stream: Option<StreamConfig>,

    /// Synthetic generator role
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,

    /// Relay role
    #[serde(default)]
    pub relay: Option<RelayConfig>,

    /// Monitor role
    #[serde(default)]
    pub monitor: Option<MonitorConfig>,
}

/// Transport settings shared by every endpoint of a process
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Pause after bind/connect before the first publish (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Per-subscriber queue depth before a slow subscriber starts missing samples
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,
}

impl TransportConfig {
    /// Settling delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_settle_ms() -> u64 {
    200
}

fn default_queue_capacity() -> usize {
    1024
}

/// Trace playback configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StreamConfig {
    /// Stream layout
    pub kind: StreamKind,

    /// Emission rate (Hz / fps)
    #[validate(range(exclusive_min = 0.0))]
    pub rate_hz: f64,

    /// Publish port (defaults per stream kind)
    #[serde(default)]
    #[validate(range(min = 1))]
    pub port: Option<u16>,

    /// Explicit trace file path
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Run identifier under `data_root`
    #[serde(default)]
    pub run: Option<String>,

    /// Root directory holding run folders
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
}

impl StreamConfig {
    /// Conventional settings for `kind`, reading `DEFAULT_RUN`
    pub fn for_kind(kind: StreamKind) -> Self {
        Self {
            kind,
            rate_hz: kind.default_rate_hz(),
            port: None,
            path: None,
            run: Some(DEFAULT_RUN.to_string()),
            data_root: default_data_root(),
        }
    }

    /// Validated rate
    pub fn rate(&self) -> Result<RateSpec, ContractError> {
        RateSpec::from_hz(self.rate_hz)
    }

    /// Publish port
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind.default_port())
    }

    /// Bind address for the publisher
    pub fn bind_addr(&self) -> EndpointAddr {
        EndpointAddr::wildcard(self.port())
    }

    /// Resolve the trace file: explicit path wins over run identifier
    pub fn trace_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        self.run
            .as_ref()
            .map(|run| self.data_root.join(run).join(self.kind.trace_file_name()))
    }
}

/// Root directory holding run folders when none is configured
pub const DEFAULT_DATA_ROOT: &str = "/SimData";

/// Run identifier used when neither a path nor a run is given
pub const DEFAULT_RUN: &str = "run01";

fn default_data_root() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_ROOT)
}

/// Synthetic generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeneratorConfig {
    /// Stream layout
    pub kind: StreamKind,

    /// Emission rate (Hz / fps)
    #[validate(range(exclusive_min = 0.0))]
    pub rate_hz: f64,

    /// Publish port (defaults per stream kind)
    #[serde(default)]
    #[validate(range(min = 1))]
    pub port: Option<u16>,
}

impl GeneratorConfig {
    /// Validated rate
    pub fn rate(&self) -> Result<RateSpec, ContractError> {
        RateSpec::from_hz(self.rate_hz)
    }

    /// Bind address for the publisher
    pub fn bind_addr(&self) -> EndpointAddr {
        EndpointAddr::wildcard(self.port.unwrap_or_else(|| self.kind.default_port()))
    }
}

/// Relay (bridge) configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Stream layout of the relayed stream
    pub kind: StreamKind,

    /// Upstream publisher host
    #[serde(default = "default_in_host")]
    #[validate(length(min = 1))]
    pub in_host: String,

    /// Upstream publisher port
    #[validate(range(min = 1))]
    pub in_port: u16,

    /// Local republish port
    #[validate(range(min = 1))]
    pub out_port: u16,

    /// Per-sample filter
    #[serde(default)]
    pub filter: FilterConfig,
}

impl RelayConfig {
    /// Upstream address
    pub fn inbound(&self) -> EndpointAddr {
        EndpointAddr::new(&self.in_host, self.in_port)
    }

    /// Republish bind address
    pub fn outbound(&self) -> EndpointAddr {
        EndpointAddr::wildcard(self.out_port)
    }
}

fn default_in_host() -> String {
    "localhost".to_string()
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitorConfig {
    /// Publisher host to watch
    #[serde(default = "default_in_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Publisher port to watch
    #[validate(range(min = 1))]
    pub port: u16,

    /// Expected stream layout
    pub kind: StreamKind,
}

impl MonitorConfig {
    /// Watched address
    pub fn addr(&self) -> EndpointAddr {
        EndpointAddr::new(&self.host, self.port)
    }
}

/// Relay filter selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Forward unchanged
    #[default]
    Identity,
    /// Forward only when an axis moved more than `threshold` since the last forwarded sample
    DeadBand { threshold: f64 },
    /// Drop samples whose `field` exceeds `max`
    Threshold { field: usize, max: f64 },
}
