//! Health scoring and fault classification
//!
//! The score is a weighted average over the five channels against fixed
//! normal ranges; classification is an ordered first-match over breach
//! thresholds. The 90/70 constants here are the single source for both the
//! fault severity tier and the displayed reactor status, so the two can
//! never disagree.

use reactorsync_types::{FaultSeverity, FaultType, Metric, ReactorStatus, TelemetryReading};

/// Scores at or above this are healthy and raise no fault.
pub const HEALTHY_THRESHOLD: f64 = 90.0;

/// Scores at or above this (but below healthy) are warnings / yellow.
pub const WARNING_THRESHOLD: f64 = 70.0;

/// Normal operating range and score weight per channel. Weights sum to 1.0.
const NORMAL_RANGES: [(Metric, f64, f64, f64); 5] = [
    (Metric::NeutronFlux, 1.0e13, 1.5e13, 0.25),
    (Metric::CoreTemperature, 260.0, 320.0, 0.30),
    (Metric::Pressure, 10.0, 15.0, 0.20),
    (Metric::Vibration, 0.0, 5.0, 0.15),
    (Metric::TritiumLevel, 0.0, 1000.0, 0.10),
];

/// Weighted health score for a full reading, in [0, 100].
pub fn health_score(reading: &TelemetryReading) -> f64 {
    health_score_partial(reading.metrics())
}

/// Weighted health score over an arbitrary subset of channels.
///
/// Channels missing from the input are excluded and the remaining weights
/// renormalized; an empty input scores 100.
pub fn health_score_partial(metrics: impl IntoIterator<Item = (Metric, f64)>) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for (metric, value) in metrics {
        let Some((_, min, max, weight)) = NORMAL_RANGES.iter().find(|(m, ..)| *m == metric) else {
            continue;
        };

        let metric_score = if (*min..=*max).contains(&value) {
            100.0
        } else {
            // Deviation is relative to the breached bound.
            let deviation = if value < *min {
                (min - value) / min
            } else {
                (value - max) / max
            };
            (100.0 - deviation * 100.0).max(0.0)
        };

        total_score += metric_score * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        total_score / total_weight
    } else {
        100.0
    }
}

/// First-match fault classification.
///
/// The order is deliberate and load-bearing: a reading breaching several
/// thresholds reports only the first one, matching the stored fault history
/// consumers already expect.
pub fn classify_fault(reading: &TelemetryReading) -> Option<FaultType> {
    if reading.core_temperature > 320.0 {
        Some(FaultType::TemperatureSpike)
    } else if reading.pressure < 10.0 {
        Some(FaultType::PressureDrop)
    } else if reading.vibration > 5.0 {
        Some(FaultType::VibrationHigh)
    } else if reading.neutron_flux > 1.5e13 {
        Some(FaultType::FluxInstability)
    } else if reading.tritium_level > 1000.0 {
        Some(FaultType::TritiumHigh)
    } else {
        None
    }
}

/// Fault severity tier for a health score; `None` above the warning band.
pub fn severity_for(score: f64) -> Option<FaultSeverity> {
    if score < WARNING_THRESHOLD {
        Some(FaultSeverity::Red)
    } else if score < HEALTHY_THRESHOLD {
        Some(FaultSeverity::Yellow)
    } else {
        None
    }
}

/// Displayed reactor status for a health score.
pub fn status_for(score: f64) -> ReactorStatus {
    if score >= HEALTHY_THRESHOLD {
        ReactorStatus::Healthy
    } else if score >= WARNING_THRESHOLD {
        ReactorStatus::Warning
    } else {
        ReactorStatus::Unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reactorsync_types::ReactorId;

    fn reading(flux: f64, temp: f64, pressure: f64, vibration: f64, tritium: f64) -> TelemetryReading {
        TelemetryReading {
            reactor_id: ReactorId::new(1),
            timestamp: Utc::now(),
            neutron_flux: flux,
            core_temperature: temp,
            pressure,
            vibration,
            tritium_level: tritium,
        }
    }

    #[test]
    fn test_baseline_reading_scores_100() {
        let r = reading(1.2e13, 285.0, 12.5, 2.0, 450.0);
        assert_eq!(health_score(&r), 100.0);
    }

    #[test]
    fn test_score_bounded_even_for_extreme_readings() {
        let r = reading(0.0, 400.0, 18.0, 15.0, 2000.0);
        let score = health_score(&r);
        assert!((0.0..=100.0).contains(&score));

        let r = reading(1e20, 0.0, 0.0, 1e6, 1e6);
        let score = health_score(&r);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_out_of_range_metric_lowers_score() {
        let healthy = reading(1.2e13, 285.0, 12.5, 2.0, 450.0);
        let hot = reading(1.2e13, 340.0, 12.5, 2.0, 450.0);
        assert!(health_score(&hot) < health_score(&healthy));
    }

    #[test]
    fn test_missing_metrics_renormalize_weights() {
        // Only temperature supplied, in range: full marks.
        let score = health_score_partial([(Metric::CoreTemperature, 285.0)]);
        assert_eq!(score, 100.0);

        // Only temperature supplied, breached: the score reflects that
        // channel alone rather than being diluted by absent ones.
        let breached = health_score_partial([(Metric::CoreTemperature, 352.0)]);
        assert!((breached - 90.0).abs() < 1e-9);

        assert_eq!(health_score_partial([]), 100.0);
    }

    #[test]
    fn test_classify_temperature_spike_priority() {
        // Only temperature breaches.
        let r = reading(1.2e13, 325.0, 12.0, 2.0, 500.0);
        assert_eq!(classify_fault(&r), Some(FaultType::TemperatureSpike));

        // Temperature and vibration both breach; temperature wins.
        let r = reading(1.2e13, 330.0, 12.0, 8.0, 500.0);
        assert_eq!(classify_fault(&r), Some(FaultType::TemperatureSpike));
    }

    #[test]
    fn test_classify_order_walks_down_the_list() {
        let r = reading(1.2e13, 300.0, 9.0, 8.0, 1500.0);
        assert_eq!(classify_fault(&r), Some(FaultType::PressureDrop));

        let r = reading(1.6e13, 300.0, 12.0, 2.0, 1500.0);
        assert_eq!(classify_fault(&r), Some(FaultType::FluxInstability));

        let r = reading(1.2e13, 300.0, 12.0, 2.0, 1500.0);
        assert_eq!(classify_fault(&r), Some(FaultType::TritiumHigh));

        let r = reading(1.2e13, 300.0, 12.0, 2.0, 500.0);
        assert_eq!(classify_fault(&r), None);
    }

    #[test]
    fn test_severity_and_status_share_thresholds() {
        assert_eq!(severity_for(95.0), None);
        assert_eq!(status_for(95.0), ReactorStatus::Healthy);

        assert_eq!(severity_for(80.0), Some(FaultSeverity::Yellow));
        assert_eq!(status_for(80.0), ReactorStatus::Warning);

        assert_eq!(severity_for(60.0), Some(FaultSeverity::Red));
        assert_eq!(status_for(60.0), ReactorStatus::Unhealthy);

        // Boundary values land on the healthier side.
        assert_eq!(severity_for(90.0), None);
        assert_eq!(status_for(90.0), ReactorStatus::Healthy);
        assert_eq!(severity_for(70.0), Some(FaultSeverity::Yellow));
        assert_eq!(status_for(70.0), ReactorStatus::Warning);
    }
}
