//! Relay filters

use contracts::{ContractError, FilterConfig, RelayFilter, Sample, StreamKind};
use tracing::debug;

/// Forward every sample unchanged
#[derive(Debug, Default, Clone)]
pub struct IdentityFilter;

impl RelayFilter for IdentityFilter {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&mut self, sample: Sample) -> Result<Option<Sample>, ContractError> {
        Ok(Some(sample))
    }
}

/// Haptic dead-band
///
/// Forwards a sample only when at least one axis moved strictly more than
/// `threshold` away from the last forwarded sample. The reference position
/// starts at the origin.
#[derive(Debug, Clone)]
pub struct DeadBandFilter {
    threshold: f64,
    last_sent: [f64; 3],
}

impl DeadBandFilter {
    /// Create a dead-band filter
    ///
    /// # Errors
    /// `Configuration` if `threshold` is negative or NaN.
    pub fn new(threshold: f64) -> Result<Self, ContractError> {
        if threshold.is_nan() || threshold < 0.0 {
            return Err(ContractError::configuration(
                "relay.filter.threshold",
                format!("dead-band threshold must be >= 0, got {threshold}"),
            ));
        }
        Ok(Self {
            threshold,
            last_sent: [0.0; 3],
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Axes of the last forwarded sample
    pub fn last_sent(&self) -> [f64; 3] {
        self.last_sent
    }

    fn axes(&self, sample: &Sample) -> Result<[f64; 3], ContractError> {
        if sample.arity() != StreamKind::Haptic.arity() {
            return Err(ContractError::filter(
                self.name(),
                format!(
                    "expected a haptic sample of {} fields, got {}",
                    StreamKind::Haptic.arity(),
                    sample.arity()
                ),
            ));
        }

        let mut axes = [0.0; 3];
        for (i, axis) in axes.iter_mut().enumerate() {
            *axis = sample
                .field(i + 1)
                .and_then(|f| f.as_f64())
                .ok_or_else(|| {
                    ContractError::filter(self.name(), format!("axis {} is not numeric", i + 1))
                })?;
        }
        Ok(axes)
    }
}

impl RelayFilter for DeadBandFilter {
    fn name(&self) -> &str {
        "dead_band"
    }

    fn apply(&mut self, sample: Sample) -> Result<Option<Sample>, ContractError> {
        let axes = self.axes(&sample)?;
        let moved = axes
            .iter()
            .zip(self.last_sent.iter())
            .any(|(now, last)| (now - last).abs() > self.threshold);

        if !moved {
            debug!(filter = self.name(), payload = %sample, "Inside dead-band");
            return Ok(None);
        }

        self.last_sent = axes;
        Ok(Some(sample))
    }

    fn reset(&mut self) {
        self.last_sent = [0.0; 3];
    }
}

/// Drop samples whose `field` exceeds `max`
#[derive(Debug, Clone)]
pub struct ThresholdFilter {
    field: usize,
    max: f64,
}

impl ThresholdFilter {
    pub fn new(field: usize, max: f64) -> Self {
        Self { field, max }
    }
}

impl RelayFilter for ThresholdFilter {
    fn name(&self) -> &str {
        "threshold"
    }

    fn apply(&mut self, sample: Sample) -> Result<Option<Sample>, ContractError> {
        let value = sample
            .field(self.field)
            .ok_or_else(|| {
                ContractError::filter(self.name(), format!("sample has no field {}", self.field))
            })?
            .as_f64()
            .ok_or_else(|| {
                ContractError::filter(self.name(), format!("field {} is not numeric", self.field))
            })?;

        if value > self.max {
            return Ok(None);
        }
        Ok(Some(sample))
    }
}

/// Build the filter described by `config`
///
/// # Errors
/// `Configuration` for parameters the filter cannot accept.
pub fn build_filter(config: &FilterConfig) -> Result<Box<dyn RelayFilter>, ContractError> {
    let filter: Box<dyn RelayFilter> = match config {
        FilterConfig::Identity => Box::new(IdentityFilter),
        FilterConfig::DeadBand { threshold } => Box::new(DeadBandFilter::new(*threshold)?),
        FilterConfig::Threshold { field, max } => Box::new(ThresholdFilter::new(*field, *max)),
    };
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haptic(line: &str) -> Sample {
        Sample::parse_line(line, StreamKind::Haptic).unwrap()
    }

    #[test]
    fn test_identity_forwards_unchanged() {
        let mut filter = IdentityFilter;
        let sample = haptic("0.0,0.1,0.2,0.3");
        assert_eq!(filter.apply(sample.clone()).unwrap(), Some(sample));
    }

    #[test]
    fn test_dead_band_drops_small_moves() {
        let mut filter = DeadBandFilter::new(0.1).unwrap();

        // Exactly on the threshold stays inside the band
        assert!(filter.apply(haptic("0.0,0.1,0.0,0.0")).unwrap().is_none());
        assert!(filter.apply(haptic("0.01,0.05,0.05,0.05")).unwrap().is_none());

        let moved = haptic("0.02,0.3,0.0,0.0");
        assert_eq!(filter.apply(moved.clone()).unwrap(), Some(moved));
        assert_eq!(filter.last_sent(), [0.3, 0.0, 0.0]);

        // Measured against the last forwarded sample, not the last seen one
        assert!(filter.apply(haptic("0.03,0.35,0.0,0.0")).unwrap().is_none());
        assert!(filter.apply(haptic("0.04,0.39,0.0,0.0")).unwrap().is_none());
        assert!(filter.apply(haptic("0.05,0.41,0.0,0.0")).unwrap().is_some());
    }

    #[test]
    fn test_dead_band_reset_restores_origin() {
        let mut filter = DeadBandFilter::new(0.1).unwrap();
        assert!(filter.apply(haptic("0.0,0.5,0.5,0.5")).unwrap().is_some());
        assert!(filter.apply(haptic("0.1,0.5,0.5,0.5")).unwrap().is_none());

        filter.reset();
        assert_eq!(filter.last_sent(), [0.0; 3]);
        assert!(filter.apply(haptic("0.2,0.5,0.5,0.5")).unwrap().is_some());
    }

    #[test]
    fn test_dead_band_rejects_non_haptic() {
        let mut filter = DeadBandFilter::new(0.1).unwrap();
        let video = Sample::parse_line("0.0,4000", StreamKind::Video).unwrap();
        assert!(matches!(
            filter.apply(video),
            Err(ContractError::Filter { .. })
        ));
    }

    #[test]
    fn test_dead_band_rejects_text_axis() {
        let mut filter = DeadBandFilter::new(0.1).unwrap();
        let sample = Sample::new(vec!["0.0".into(), "left".into(), "0.0".into(), "0.0".into()]);
        assert!(matches!(
            filter.apply(sample),
            Err(ContractError::Filter { .. })
        ));
    }

    #[test]
    fn test_dead_band_negative_threshold() {
        assert!(DeadBandFilter::new(-0.1).is_err());
        assert!(DeadBandFilter::new(f64::NAN).is_err());
        assert!(DeadBandFilter::new(0.0).is_ok());
    }

    #[test]
    fn test_threshold_drops_above_max() {
        let mut filter = ThresholdFilter::new(1, 5000.0);
        let low = Sample::parse_line("0.0,4000", StreamKind::Video).unwrap();
        let edge = Sample::parse_line("0.1,5000", StreamKind::Video).unwrap();
        let high = Sample::parse_line("0.2,7000", StreamKind::Video).unwrap();

        assert!(filter.apply(low).unwrap().is_some());
        assert!(filter.apply(edge).unwrap().is_some());
        assert!(filter.apply(high).unwrap().is_none());
    }

    #[test]
    fn test_threshold_missing_field() {
        let mut filter = ThresholdFilter::new(5, 1.0);
        assert!(matches!(
            filter.apply(haptic("0.0,0.1,0.2,0.3")),
            Err(ContractError::Filter { .. })
        ));
    }

    #[test]
    fn test_build_filter() {
        assert_eq!(build_filter(&FilterConfig::Identity).unwrap().name(), "identity");
        assert_eq!(
            build_filter(&FilterConfig::DeadBand { threshold: 0.1 })
                .unwrap()
                .name(),
            "dead_band"
        );
        assert_eq!(
            build_filter(&FilterConfig::Threshold { field: 1, max: 1.0 })
                .unwrap()
                .name(),
            "threshold"
        );
        assert!(build_filter(&FilterConfig::DeadBand { threshold: -1.0 }).is_err());
    }
}
