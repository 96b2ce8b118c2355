//! StreamKind - per-stream field layout
//!
//! The layout fixes the arity of every sample on a stream and which columns must be numeric.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stream layout
///
/// Serialized as `"haptic"`, `"video"` or `"generic:<arity>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StreamKind {
    /// `timestamp,x,y,z`
    Haptic,
    /// `timestamp,bitrate`
    Video,
    /// Fixed arity, no column typing
    Generic(usize),
}

impl StreamKind {
    /// Number of fields per sample
    pub fn arity(&self) -> usize {
        match self {
            Self::Haptic => 4,
            Self::Video => 2,
            Self::Generic(arity) => *arity,
        }
    }

    /// Column names, used in diagnostics
    pub fn field_names(&self) -> Vec<String> {
        match self {
            Self::Haptic => ["timestamp", "x", "y", "z"].map(String::from).to_vec(),
            Self::Video => ["timestamp", "bitrate"].map(String::from).to_vec(),
            Self::Generic(arity) => (0..*arity).map(|i| format!("field{i}")).collect(),
        }
    }

    /// Whether column `index` must parse as a number
    pub fn is_numeric(&self, index: usize) -> bool {
        match self {
            Self::Haptic | Self::Video => index < self.arity(),
            Self::Generic(_) => false,
        }
    }

    /// Trace file name used under a run directory
    pub fn trace_file_name(&self) -> &'static str {
        match self {
            Self::Haptic => "tactile.csv",
            Self::Video => "video.csv",
            Self::Generic(_) => "trace.csv",
        }
    }

    /// Conventional publish port for this stream
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Haptic => 5555,
            Self::Video => 5566,
            Self::Generic(_) => 5600,
        }
    }

    /// Conventional emission rate (Hz)
    pub fn default_rate_hz(&self) -> f64 {
        match self {
            Self::Haptic => 100.0,
            Self::Video => 30.0,
            Self::Generic(_) => 10.0,
        }
    }

    /// Check a row of raw fields against this layout
    ///
    /// Returns a human-readable reason on mismatch; callers attach origin and line.
    pub fn check<S: AsRef<str>>(&self, fields: &[S]) -> Result<(), String> {
        if fields.len() != self.arity() {
            return Err(format!(
                "expected {} fields for {} stream, got {}",
                self.arity(),
                self,
                fields.len()
            ));
        }

        let names = self.field_names();
        for (idx, field) in fields.iter().enumerate() {
            let raw = field.as_ref().trim();
            if self.is_numeric(idx) && raw.parse::<f64>().is_err() {
                return Err(format!(
                    "field '{}' is not numeric: {:?}",
                    names[idx],
                    field.as_ref()
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Haptic => write!(f, "haptic"),
            Self::Video => write!(f, "video"),
            Self::Generic(arity) => write!(f, "generic:{arity}"),
        }
    }
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haptic" | "tactile" => Ok(Self::Haptic),
            "video" => Ok(Self::Video),
            other => {
                let arity = other
                    .strip_prefix("generic:")
                    .ok_or_else(|| format!("unknown stream kind '{s}'"))?;
                match arity.parse::<usize>() {
                    Ok(0) | Err(_) => Err(format!("invalid generic arity '{arity}'")),
                    Ok(n) => Ok(Self::Generic(n)),
                }
            }
        }
    }
}

impl TryFrom<String> for StreamKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StreamKind> for String {
    fn from(kind: StreamKind) -> Self {
        kind.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(StreamKind::Haptic.arity(), 4);
        assert_eq!(StreamKind::Video.arity(), 2);
        assert_eq!(StreamKind::Generic(7).arity(), 7);
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("haptic".parse::<StreamKind>(), Ok(StreamKind::Haptic));
        assert_eq!("VIDEO".parse::<StreamKind>(), Ok(StreamKind::Video));
        assert_eq!("generic:3".parse::<StreamKind>(), Ok(StreamKind::Generic(3)));
        assert!("generic:0".parse::<StreamKind>().is_err());
        assert!("lidar".parse::<StreamKind>().is_err());
    }

    #[test]
    fn test_check_rejects_wrong_arity() {
        let err = StreamKind::Haptic.check(&["0.0", "0.1"]).unwrap_err();
        assert!(err.contains("expected 4 fields"));
    }

    #[test]
    fn test_check_rejects_non_numeric_axis() {
        let err = StreamKind::Haptic
            .check(&["0.0", "0.1", "abc", "0.3"])
            .unwrap_err();
        assert!(err.contains("'y'"));
    }

    #[test]
    fn test_generic_accepts_text() {
        assert!(StreamKind::Generic(2).check(&["hello", "world"]).is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&StreamKind::Generic(5)).unwrap();
        assert_eq!(json, "\"generic:5\"");
        let kind: StreamKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, StreamKind::Video);
    }
}
