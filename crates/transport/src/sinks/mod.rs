//! Sample sinks that do not go over the wire

mod log;

pub use self::log::LogSink;
