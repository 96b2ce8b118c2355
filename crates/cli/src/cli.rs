//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::StreamKind;
use std::path::PathBuf;

/// Tactile relay - replay, synthesize, relay and watch telemetry streams
#[derive(Parser, Debug)]
#[command(
    name = "tactile-relay",
    author,
    version,
    about = "Replay and relay haptic/video telemetry over pub/sub",
    long_about = "Loops recorded telemetry traces onto a publish endpoint at a fixed rate,\n\
                  synthesizes streams when no trace exists, and relays one subscribed\n\
                  stream to a republished one through a per-sample filter."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TACTILE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TACTILE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "TACTILE_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Loop a recorded trace onto a publish endpoint
    Stream(StreamArgs),

    /// Publish synthetic samples at a fixed rate
    Generate(GenerateArgs),

    /// Subscribe to one stream, filter it and republish it
    Relay(RelayArgs),

    /// Subscribe to one stream and report arrival statistics
    Monitor(MonitorArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Transport overrides shared by every networked command
#[derive(Args, Debug, Clone, Default)]
pub struct TransportArgs {
    /// Pause after opening endpoints before the first publish (ms)
    #[arg(long, env = "TACTILE_SETTLE_MS")]
    pub settle_ms: Option<u64>,

    /// Messages a subscriber may fall behind before it skips ahead
    #[arg(long, env = "TACTILE_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,
}

/// Arguments for the `stream` command
#[derive(Args, Debug, Clone, Default)]
pub struct StreamArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "TACTILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stream layout: haptic, video or generic:<n>
    #[arg(long, env = "TACTILE_KIND")]
    pub kind: Option<StreamKind>,

    /// Emission rate in Hz (fps for video)
    #[arg(long, visible_alias = "fps", env = "TACTILE_HZ")]
    pub hz: Option<f64>,

    /// Publish port (default depends on the stream kind)
    #[arg(long, env = "TACTILE_PORT")]
    pub port: Option<u16>,

    /// Trace file to loop; takes precedence over --run
    #[arg(long, env = "TACTILE_TRACE")]
    pub trace: Option<PathBuf>,

    /// Run folder under the data root
    #[arg(long, env = "TACTILE_RUN")]
    pub run: Option<String>,

    /// Directory holding run folders
    #[arg(long, env = "TACTILE_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Stop after this many samples (0 = unlimited)
    #[arg(long, default_value = "0", env = "TACTILE_MAX_SAMPLES")]
    pub max_samples: u64,

    /// Log samples instead of publishing them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Arguments for the `generate` command
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "TACTILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stream layout: haptic, video or generic:<n>
    #[arg(long, env = "TACTILE_KIND")]
    pub kind: Option<StreamKind>,

    /// Emission rate in Hz (fps for video)
    #[arg(long, visible_alias = "fps", env = "TACTILE_HZ")]
    pub hz: Option<f64>,

    /// Publish port (default depends on the stream kind)
    #[arg(long, env = "TACTILE_PORT")]
    pub port: Option<u16>,

    /// Stop after this many samples (0 = unlimited)
    #[arg(long, default_value = "0", env = "TACTILE_MAX_SAMPLES")]
    pub max_samples: u64,

    /// Log samples instead of publishing them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Arguments for the `relay` command
#[derive(Args, Debug, Clone, Default)]
pub struct RelayArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "TACTILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stream layout: haptic, video or generic:<n>
    #[arg(long, env = "TACTILE_KIND")]
    pub kind: Option<StreamKind>,

    /// Upstream publisher host
    #[arg(long, env = "TACTILE_IN_HOST")]
    pub in_host: Option<String>,

    /// Upstream publisher port
    #[arg(long, env = "TACTILE_IN_PORT")]
    pub in_port: Option<u16>,

    /// Local republish port
    #[arg(long, env = "TACTILE_OUT_PORT")]
    pub out_port: Option<u16>,

    /// Per-sample filter
    #[arg(long, value_enum, env = "TACTILE_FILTER")]
    pub filter: Option<FilterKind>,

    /// Dead-band threshold
    #[arg(long, env = "TACTILE_THRESHOLD")]
    pub threshold: Option<f64>,

    /// Field index checked by the threshold filter
    #[arg(long, env = "TACTILE_FIELD")]
    pub field: Option<usize>,

    /// Largest value the threshold filter lets through
    #[arg(long, env = "TACTILE_MAX")]
    pub max: Option<f64>,

    /// Stop after this many inbound samples (0 = unlimited)
    #[arg(long, default_value = "0", env = "TACTILE_MAX_SAMPLES")]
    pub max_samples: u64,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Arguments for the `monitor` command
#[derive(Args, Debug, Clone, Default)]
pub struct MonitorArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "TACTILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Publisher host to watch
    #[arg(long, env = "TACTILE_HOST")]
    pub host: Option<String>,

    /// Publisher port to watch
    #[arg(long, env = "TACTILE_PORT")]
    pub port: Option<u16>,

    /// Expected stream layout
    #[arg(long, env = "TACTILE_KIND")]
    pub kind: Option<StreamKind>,

    /// Stop after this many messages (0 = until Ctrl+C)
    #[arg(long, default_value = "0", env = "TACTILE_MAX_MESSAGES")]
    pub max_messages: u64,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "tactile.toml", env = "TACTILE_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Relay filter selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Forward every sample
    Identity,
    /// Forward only haptic samples that moved past the threshold
    DeadBand,
    /// Drop samples whose field exceeds --max
    Threshold,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
