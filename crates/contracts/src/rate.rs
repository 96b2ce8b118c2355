//! RateSpec - emission frequency

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Target emission rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RateSpec {
    hz: f64,
}

impl RateSpec {
    /// Create from a frequency
    ///
    /// # Errors
    /// `Configuration` if `hz` is not a finite positive number, or if its
    /// interval is not representable as a non-zero `Duration`.
    pub fn from_hz(hz: f64) -> Result<Self, ContractError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ContractError::configuration(
                "rate_hz",
                format!("rate must be > 0, got {hz}"),
            ));
        }
        match Duration::try_from_secs_f64(1.0 / hz) {
            Ok(interval) if !interval.is_zero() => Ok(Self { hz }),
            _ => Err(ContractError::configuration(
                "rate_hz",
                format!("rate {hz} Hz has no representable interval"),
            )),
        }
    }

    /// Create from an inter-emission interval in seconds
    ///
    /// # Errors
    /// `Configuration` if `secs` is not a finite positive number.
    pub fn from_interval_secs(secs: f64) -> Result<Self, ContractError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ContractError::configuration(
                "interval_secs",
                format!("interval must be > 0, got {secs}"),
            ));
        }
        Self::from_hz(1.0 / secs)
    }

    /// Frequency in Hz
    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Inter-emission interval
    pub fn interval(&self) -> Duration {
        // Representable for every value accepted by `from_hz`
        Duration::try_from_secs_f64(1.0 / self.hz).unwrap_or(Duration::MAX)
    }
}

impl TryFrom<f64> for RateSpec {
    type Error = ContractError;

    fn try_from(hz: f64) -> Result<Self, Self::Error> {
        Self::from_hz(hz)
    }
}

impl From<RateSpec> for f64 {
    fn from(rate: RateSpec) -> Self {
        rate.hz
    }
}
