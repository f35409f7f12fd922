use crate::fault::{FaultMap, Severity};
use crate::telemetry::TelemetryFrame;
use serde::{Deserialize, Serialize};

// Instantaneous scoring thresholds and weights.
const TEMP_THRESHOLD_C: f64 = 75.0;
const TEMP_WEIGHT: f64 = 2.0;
const POWER_THRESHOLD_W: f64 = 2000.0;
const POWER_WEIGHT: f64 = 0.02;
const ANOMALY_THRESHOLD: f64 = 0.3;
const ANOMALY_WEIGHT: f64 = 50.0;
const CRITICAL_FAULT_PENALTY: f64 = 15.0;
const WARNING_FAULT_PENALTY: f64 = 5.0;

/// Irreversible wear per tick, independent of instantaneous readings.
pub const LIFETIME_DECAY_PER_TICK: f64 = 0.02;

/// Derived health signal. `combined` is the externally reported
/// remaining-useful-life indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    pub instantaneous: f64,
    pub lifetime: f64,
    pub combined: f64,
}

impl HealthState {
    pub fn full() -> Self {
        Self {
            instantaneous: 100.0,
            lifetime: 100.0,
            combined: 100.0,
        }
    }
}

/// Score one frame against the current fault map, in [0, 100].
///
/// Starts at 100 and subtracts penalties proportional to the excess of
/// temperature, power draw, and anomaly score over their thresholds, plus a
/// flat penalty per fault channel at Warning or Critical.
pub fn instantaneous(frame: &TelemetryFrame, faults: &FaultMap) -> f64 {
    let mut score = 100.0;

    if frame.motor_temp > TEMP_THRESHOLD_C {
        score -= (frame.motor_temp - TEMP_THRESHOLD_C) * TEMP_WEIGHT;
    }
    if frame.power > POWER_THRESHOLD_W {
        score -= (frame.power - POWER_THRESHOLD_W) * POWER_WEIGHT;
    }
    if frame.anomaly_score > ANOMALY_THRESHOLD {
        score -= (frame.anomaly_score - ANOMALY_THRESHOLD) * ANOMALY_WEIGHT;
    }

    score -= faults.count_at(Severity::Critical) as f64 * CRITICAL_FAULT_PENALTY;
    score -= faults.count_at(Severity::Warning) as f64 * WARNING_FAULT_PENALTY;

    score.clamp(0.0, 100.0)
}

/// Apply one tick of irreversible wear, floored at 0.
pub fn decay_lifetime(previous: f64) -> f64 {
    (previous - LIFETIME_DECAY_PER_TICK).max(0.0)
}

/// Either a sudden sensor-driven fault or accumulated wear can force the
/// combined score down; recovery of instantaneous conditions cannot undo
/// wear.
pub fn combine(instantaneous: f64, lifetime: f64) -> f64 {
    instantaneous.min(lifetime)
}
