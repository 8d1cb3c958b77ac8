//! Summary statistics over the live samples of a measurement phase

use crate::models::SpeedSample;
use serde::{Deserialize, Serialize};

/// Distribution of instantaneous rates seen during one phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub p90: f64,
}

impl SampleStatistics {
    /// Statistics of `samples`; all zeros when there are none
    pub fn from_samples(samples: &[SpeedSample]) -> Self {
        let values: Vec<f64> = samples
            .iter()
            .map(|s| s.instantaneous_mbps)
            .filter(|v| v.is_finite())
            .collect();
        Self::from_values(values)
    }

    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean,
            std_dev: variance.sqrt(),
            p90: percentile(&values, 90.0),
        }
    }

    /// Standard deviation relative to the mean; lower is steadier
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev / self.mean
        } else {
            0.0
        }
    }
}

/// Linearly interpolated percentile of an ascending slice
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = (percentile.clamp(0.0, 100.0) / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_calculation() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert_eq!(percentile(&values, 50.0), 5.5);
        assert!((percentile(&values, 90.0) - 9.1).abs() < 1e-9);
        assert_eq!(percentile(&values, 100.0), 10.0);
        assert_eq!(percentile(&[], 90.0), 0.0);
    }

    #[test]
    fn test_sample_statistics() {
        let samples: Vec<SpeedSample> = [40.0, 10.0, 30.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, v)| SpeedSample::new(i as i64, *v))
            .collect();

        let stats = SampleStatistics::from_samples(&samples);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
        assert_eq!(stats.mean, 25.0);
        assert!((stats.std_dev - 125.0f64.sqrt()).abs() < 1e-9);
        assert!((stats.p90 - 37.0).abs() < 1e-9);
        assert!((stats.coefficient_of_variation() - 125.0f64.sqrt() / 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_non_finite_samples() {
        assert_eq!(SampleStatistics::from_samples(&[]), SampleStatistics::default());

        let samples = vec![SpeedSample::new(0, f64::NAN), SpeedSample::new(1, 12.0)];
        let stats = SampleStatistics::from_samples(&samples);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.p90, 12.0);
        assert_eq!(stats.std_dev, 0.0);
    }
}
