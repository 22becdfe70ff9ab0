//! Error flags and batch-relative alert rules

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{FlatRow, Value};

/// Alert thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// A reading is extreme when it lies more than this many population
    /// standard deviations from the batch mean
    #[serde(default = "default_stdev_multiplier")]
    pub stdev_multiplier: f64,
}

fn default_stdev_multiplier() -> f64 {
    1.0
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            stdev_multiplier: default_stdev_multiplier(),
        }
    }
}

/// Population mean and standard deviation of one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub mean: f64,
    pub stdev: f64,
}

impl BatchStats {
    /// Compute over the present values; `None` when there are none
    pub fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        Some(Self {
            mean,
            stdev: variance.sqrt(),
        })
    }

    /// Strictly further than `multiplier` deviations from the mean
    pub fn is_extreme(&self, value: f64, multiplier: f64) -> bool {
        (value - self.mean).abs() > multiplier * self.stdev
    }
}

/// Replace the raw error text with a strict boolean
///
/// Any present value means the sensor reported an error.
pub fn format_errors(rows: &mut [FlatRow]) {
    let mut errors = 0;
    for row in rows.iter_mut() {
        let has_error = match &row.reading_error {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        };
        if has_error {
            errors += 1;
        }
        row.reading_error = Value::Bool(has_error);
    }
    info!("Formatted errors: {} of {} rows report an error", errors, rows.len());
}

/// Flag readings whose temperature or soil moisture is extreme for the batch
///
/// Must run after [`format_errors`]: a row reporting an error is never
/// alerted, however extreme its values.
pub fn add_alerts(rows: &mut [FlatRow], config: &AlertConfig) {
    let temperature = BatchStats::from_values(
        rows.iter()
            .filter_map(|row| row.reading_temperature.as_f64()),
    );
    let moisture = BatchStats::from_values(
        rows.iter()
            .filter_map(|row| row.reading_soil_moisture.as_f64()),
    );

    let extreme = |stats: &Option<BatchStats>, value: &Value| match (stats, value.as_f64()) {
        (Some(stats), Some(v)) => stats.is_extreme(v, config.stdev_multiplier),
        _ => false,
    };

    let mut alerts = 0;
    for row in rows.iter_mut() {
        let has_error = row.reading_error.as_bool().unwrap_or(false);
        let alert = !has_error
            && (extreme(&temperature, &row.reading_temperature)
                || extreme(&moisture, &row.reading_soil_moisture));
        if alert {
            alerts += 1;
        }
        row.reading_alert = Value::Bool(alert);
    }
    info!("Raised {} alerts across {} rows", alerts, rows.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: Value, moisture: Value, error: Value) -> FlatRow {
        FlatRow {
            reading_temperature: temperature,
            reading_soil_moisture: moisture,
            reading_error: error,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_errors() {
        let mut rows = vec![
            reading(Value::Int(22), Value::Null, Value::Null),
            reading(Value::Int(64), Value::Null, Value::from("something happened here")),
            reading(Value::Int(18), Value::Null, Value::from("70")),
        ];

        format_errors(&mut rows);

        assert_eq!(rows[0].reading_error, Value::Bool(false));
        assert_eq!(rows[1].reading_error, Value::Bool(true));
        assert_eq!(rows[2].reading_error, Value::Bool(true));
    }

    #[test]
    fn test_add_alerts_expected_results() {
        let mut rows = vec![
            reading(Value::Int(100), Value::Float(0.98), Value::from("boom")),
            reading(Value::Int(50), Value::Float(0.5), Value::Null),
            reading(Value::Int(11), Value::Float(0.45), Value::Null),
            reading(Value::Int(49), Value::Float(0.14), Value::Null),
        ];

        format_errors(&mut rows);
        add_alerts(&mut rows, &AlertConfig::default());

        assert_eq!(rows[0].reading_alert, Value::Bool(false));
        assert_eq!(rows[1].reading_alert, Value::Bool(false));
        assert_eq!(rows[2].reading_alert, Value::Bool(true));
        assert_eq!(rows[3].reading_alert, Value::Bool(true));
    }

    #[test]
    fn test_error_suppresses_alert() {
        let mut rows = vec![
            reading(Value::Int(20), Value::Float(0.5), Value::Null),
            reading(Value::Int(21), Value::Float(0.5), Value::Null),
            reading(Value::Int(90), Value::Float(0.5), Value::from("sensor fault")),
        ];

        format_errors(&mut rows);
        add_alerts(&mut rows, &AlertConfig::default());

        let stats = BatchStats::from_values([20.0, 21.0, 90.0].into_iter()).unwrap();
        assert!(stats.is_extreme(90.0, 1.0));
        assert_eq!(rows[2].reading_alert, Value::Bool(false));
    }

    #[test]
    fn test_multiplier_is_configurable() {
        let mut rows = vec![
            reading(Value::Int(10), Value::Null, Value::Null),
            reading(Value::Int(20), Value::Null, Value::Null),
            reading(Value::Int(30), Value::Null, Value::Null),
        ];
        format_errors(&mut rows);

        add_alerts(&mut rows, &AlertConfig::default());
        assert_eq!(rows[0].reading_alert, Value::Bool(true));

        add_alerts(
            &mut rows,
            &AlertConfig {
                stdev_multiplier: 2.0,
            },
        );
        assert_eq!(rows[0].reading_alert, Value::Bool(false));
    }

    #[test]
    fn test_missing_measurements_never_alert() {
        let mut rows = vec![reading(Value::Null, Value::Null, Value::Null)];
        format_errors(&mut rows);
        add_alerts(&mut rows, &AlertConfig::default());
        assert_eq!(rows[0].reading_alert, Value::Bool(false));
    }

    #[test]
    fn test_population_stdev() {
        let stats = BatchStats::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter())
            .unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.stdev, 2.0);
        assert!(BatchStats::from_values(std::iter::empty()).is_none());
    }
}
