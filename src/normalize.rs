use crate::models::ResultRecord;
use crate::status::{Status, classify};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric shown by the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Latency,
    Tokens,
    Success,
}

impl Metric {
    /// Raw value of this metric for a record
    pub fn value(self, record: &ResultRecord) -> f64 {
        match self {
            Metric::Latency => record.latency(),
            Metric::Tokens => record.tokens() as f64,
            Metric::Success => match classify(record) {
                Status::Success => 100.0,
                _ => 0.0,
            },
        }
    }

    /// Whether larger values are better (lower latency is better)
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Metric::Latency)
    }

    /// Unit suffix used when printing values
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Latency => "ms",
            Metric::Tokens => "t",
            Metric::Success => "%",
        }
    }

    /// Map a normalized value to an intensity, green meaning better
    pub fn intensity(self, normalized: f64) -> u8 {
        let score = if self.higher_is_better() {
            normalized
        } else {
            1.0 - normalized
        };
        (score.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Metric::Latency => "latency",
            Metric::Tokens => "tokens",
            Metric::Success => "success",
        };
        f.write_str(label)
    }
}

/// Min/max of a metric over a result set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Range of the given values, `None` when there are none
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self { min, max })
    }

    /// Position of `value` within the range, in [0, 1].
    /// A range without spread maps everything to the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Normalize `value` against all values of the current set
pub fn normalize(value: f64, all_values: &[f64]) -> f64 {
    match Range::of(all_values) {
        Some(range) => range.normalize(value),
        None => 0.5,
    }
}

/// Colour intensity in [0, 255] for `value`, 255 being the best
pub fn intensity_for(value: f64, all_values: &[f64], metric: Metric) -> u8 {
    metric.intensity(normalize(value, all_values))
}

/// Red-to-green colour for `value`; the green channel equals its intensity
pub fn color_for(value: f64, all_values: &[f64], metric: Metric) -> Rgb {
    Rgb::from_intensity(intensity_for(value, all_values, metric))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Interpolate from red (0) to green (255)
    pub fn from_intensity(intensity: u8) -> Self {
        Self {
            r: 255 - intensity,
            g: intensity,
            b: 0,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEUTRAL_INTENSITY: u8 = 128;

    #[test]
    fn test_latency_lower_is_better() {
        let values = [100.0, 200.0, 300.0];
        assert_eq!(intensity_for(100.0, &values, Metric::Latency), 255);
        assert_eq!(intensity_for(300.0, &values, Metric::Latency), 0);
        assert_eq!(intensity_for(200.0, &values, Metric::Latency), 128);
        assert_eq!(color_for(100.0, &values, Metric::Latency).to_string(), "rgb(0, 255, 0)");
        assert_eq!(color_for(300.0, &values, Metric::Latency).to_string(), "rgb(255, 0, 0)");
    }

    #[test]
    fn test_tokens_and_success_higher_is_better() {
        let tokens = [10.0, 60.0, 110.0];
        assert_eq!(intensity_for(110.0, &tokens, Metric::Tokens), 255);
        assert_eq!(intensity_for(10.0, &tokens, Metric::Tokens), 0);

        let success = [0.0, 100.0];
        assert_eq!(intensity_for(100.0, &success, Metric::Success), 255);
        assert_eq!(intensity_for(0.0, &success, Metric::Success), 0);
    }

    #[test]
    fn test_degenerate_range_is_neutral() {
        let values = [50.0, 50.0, 50.0];
        for metric in [Metric::Latency, Metric::Tokens, Metric::Success] {
            let intensity = intensity_for(50.0, &values, metric);
            assert_eq!(intensity, NEUTRAL_INTENSITY);
            assert_eq!(color_for(50.0, &values, metric), Rgb { r: 127, g: 128, b: 0 });
        }
        assert_eq!(normalize(50.0, &values), 0.5);
    }

    #[test]
    fn test_empty_values_are_neutral() {
        assert_eq!(normalize(10.0, &[]), 0.5);
        assert_eq!(intensity_for(10.0, &[], Metric::Tokens), NEUTRAL_INTENSITY);
    }

    #[test]
    fn test_value_outside_range_is_clamped() {
        let range = Range::of(&[10.0, 20.0]).unwrap();
        assert_eq!(range.normalize(40.0), 1.0);
        assert_eq!(range.normalize(0.0), 0.0);
    }

    #[test]
    fn test_success_value_is_derived() {
        let ok = ResultRecord {
            output_content: Some("fine".to_string()),
            ..Default::default()
        };
        let failed = ResultRecord {
            output_content: Some("Error: boom".to_string()),
            ..Default::default()
        };
        let empty = ResultRecord::default();

        assert_eq!(Metric::Success.value(&ok), 100.0);
        assert_eq!(Metric::Success.value(&failed), 0.0);
        assert_eq!(Metric::Success.value(&empty), 0.0);
    }

    #[test]
    fn test_missing_numbers_count_as_zero() {
        let record = ResultRecord::default();
        assert_eq!(Metric::Latency.value(&record), 0.0);
        assert_eq!(Metric::Tokens.value(&record), 0.0);
    }
}
