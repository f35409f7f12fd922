use crate::fault::{FaultId, FaultMap};
use crate::scheduler::TICK_PERIOD_MS;
use serde::{Deserialize, Serialize};

// Safe operating bands enforced while the bound fault channel is OK.
const TEMP_BAND: (f64, f64) = (50.0, 85.0);
const TEMP_CEILING_C: f64 = 95.0;
const POWER_BAND: (f64, f64) = (1000.0, 2200.0);
const CURRENT_BAND: (f64, f64) = (7.0, 11.0);
const RPM_BAND: (f64, f64) = (800.0, 1500.0);
const PAYLOAD_BAND: (f64, f64) = (3.0, 8.0);
const CYCLE_TIME_BAND: (f64, f64) = (2.0, 3.5);

/// One sensor frame from the simulated arm. All channels are floating-point;
/// joint angles are unconstrained, everything else lives in an operational
/// band unless a fault relaxes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub timestamp_ms: u64,
    pub j1_angle: f64,
    pub j2_angle: f64,
    pub j3_angle: f64,
    pub j4_angle: f64,
    pub j5_angle: f64,
    pub j6_angle: f64,
    pub motor_temp: f64,
    pub power: f64,
    pub current: f64,
    pub rpm: f64,
    pub payload: f64,
    pub cycle_time: f64,
    pub anomaly_score: f64,
}

/// Produces successive telemetry frames as a fault-aware random walk.
///
/// No side effects beyond the internal PRNG: each frame is a function of the
/// previous frame, the current fault map, and the random source.
#[derive(Debug)]
pub struct TelemetryGenerator {
    // Simple Linear Congruential Generator for deterministic testing
    rng_state: u64,
}

impl TelemetryGenerator {
    pub fn new() -> Self {
        Self {
            rng_state: 0x1234_5678_9ABC_DEF0, // Fixed seed for deterministic behavior
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng_state: seed }
    }

    /// Seed history with `count` plausible frames, anchored so the newest
    /// frame sits one tick period before `now_ms`. Each channel follows a
    /// phase-shifted sinusoid rather than a degenerate flat line.
    pub fn bootstrap(&mut self, count: usize, now_ms: u64) -> Vec<TelemetryFrame> {
        let base_time = now_ms.saturating_sub(count as u64 * TICK_PERIOD_MS);
        (0..count)
            .map(|i| self.baseline_frame(i, base_time + i as u64 * TICK_PERIOD_MS))
            .collect()
    }

    /// One synthetic baseline frame, used for seeding and as the fallback
    /// previous frame when the window is empty.
    pub fn baseline_frame(&mut self, index: usize, timestamp_ms: u64) -> TelemetryFrame {
        let i = index as f64;
        TelemetryFrame {
            timestamp_ms,
            j1_angle: 45.0 + (i * 0.3).sin() * 15.0,
            j2_angle: 60.0 + (i * 0.4).cos() * 20.0,
            j3_angle: 30.0 + (i * 0.5).sin() * 10.0,
            j4_angle: 90.0 + (i * 0.35).sin() * 12.0,
            j5_angle: 120.0 + (i * 0.45).cos() * 18.0,
            j6_angle: 180.0 + (i * 0.55).sin() * 14.0,
            motor_temp: 65.0 + (i * 0.2).sin() * 10.0,
            power: 1500.0 + (i * 0.4).sin() * 300.0,
            current: 8.5 + (i * 0.5).sin() * 2.0,
            rpm: 1200.0 + (i * 0.6).sin() * 200.0,
            payload: 5.2 + (i * 0.3).sin() * 1.5,
            cycle_time: 2.5 + self.jitter(0.3),
            anomaly_score: 0.15 + (i * 0.8).sin() * 0.1,
        }
    }

    /// Derive exactly one new frame from `previous`. Channels whose bound
    /// fault is OK stay clamped to their operating band; an active fault
    /// relaxes the clamp or biases the walk in that channel's failure
    /// direction. The anomaly score stays in [0, 1] regardless.
    pub fn step(
        &mut self,
        previous: &TelemetryFrame,
        faults: &FaultMap,
        now_ms: u64,
    ) -> TelemetryFrame {
        let motor_temp = if faults.is_active(FaultId::Overheating) {
            // Upward drift toward the hard ceiling, upper clamp removed.
            (previous.motor_temp + self.random_f64() * 2.0).min(TEMP_CEILING_C)
        } else {
            (previous.motor_temp + self.jitter(5.0)).clamp(TEMP_BAND.0, TEMP_BAND.1)
        };

        let power = if faults.is_active(FaultId::PowerFluctuation) {
            // Widened perturbation instead of clamping.
            previous.power + self.jitter(400.0)
        } else {
            (previous.power + self.jitter(200.0)).clamp(POWER_BAND.0, POWER_BAND.1)
        };

        let rpm = if faults.is_active(FaultId::EncoderLoss) {
            // Downward bias with no operational floor.
            (previous.rpm - self.random_f64() * 100.0).max(0.0)
        } else {
            (previous.rpm + self.jitter(150.0)).clamp(RPM_BAND.0, RPM_BAND.1)
        };

        let payload = if faults.is_active(FaultId::GripperMalfunction) {
            (previous.payload - self.random_f64() * 2.0).max(0.0)
        } else {
            (previous.payload + self.jitter(0.5)).clamp(PAYLOAD_BAND.0, PAYLOAD_BAND.1)
        };

        let cycle_time = if faults.is_active(FaultId::CommDelay) {
            previous.cycle_time + self.random_f64() * 0.5
        } else {
            (previous.cycle_time + self.jitter(0.3)).clamp(CYCLE_TIME_BAND.0, CYCLE_TIME_BAND.1)
        };

        TelemetryFrame {
            timestamp_ms: now_ms,
            j1_angle: previous.j1_angle + self.jitter(8.0),
            j2_angle: previous.j2_angle + self.jitter(8.0),
            j3_angle: previous.j3_angle + self.jitter(8.0),
            j4_angle: previous.j4_angle + self.jitter(8.0),
            j5_angle: previous.j5_angle + self.jitter(8.0),
            j6_angle: previous.j6_angle + self.jitter(8.0),
            motor_temp,
            power,
            current: (previous.current + self.jitter(0.8)).clamp(CURRENT_BAND.0, CURRENT_BAND.1),
            rpm,
            payload,
            cycle_time,
            anomaly_score: (previous.anomaly_score + self.jitter(0.1)).clamp(0.0, 1.0),
        }
    }

    // Simple PRNG methods for deterministic testing
    fn next_random(&mut self) -> u64 {
        // Linear Congruential Generator: X(n+1) = (aX(n) + c) mod m
        // Using parameters from Numerical Recipes
        self.rng_state = self.rng_state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.rng_state
    }

    fn random_f64(&mut self) -> f64 {
        (self.next_random() as f64) / (u64::MAX as f64)
    }

    /// Uniform perturbation in [-magnitude/2, magnitude/2].
    fn jitter(&mut self, magnitude: f64) -> f64 {
        (self.random_f64() - 0.5) * magnitude
    }
}

impl Default for TelemetryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal_frame() -> TelemetryFrame {
        TelemetryFrame {
            timestamp_ms: 0,
            j1_angle: 45.0,
            j2_angle: 60.0,
            j3_angle: 30.0,
            j4_angle: 90.0,
            j5_angle: 120.0,
            j6_angle: 180.0,
            motor_temp: 65.0,
            power: 1500.0,
            current: 8.5,
            rpm: 1200.0,
            payload: 5.2,
            cycle_time: 2.5,
            anomaly_score: 0.15,
        }
    }

    #[test]
    fn test_bootstrap_count_and_spacing() {
        let mut generator = TelemetryGenerator::with_seed(42);
        let frames = generator.bootstrap(20, 100_000);

        assert_eq!(frames.len(), 20);
        for pair in frames.windows(2) {
            assert_eq!(pair[1].timestamp_ms - pair[0].timestamp_ms, TICK_PERIOD_MS);
        }
        assert_eq!(frames[19].timestamp_ms, 100_000 - TICK_PERIOD_MS);
    }

    #[test]
    fn test_nominal_step_respects_operating_bands() {
        let mut generator = TelemetryGenerator::with_seed(7);
        let faults = FaultMap::new();
        let mut frame = nominal_frame();

        for tick in 0..500 {
            frame = generator.step(&frame.clone(), &faults, tick * TICK_PERIOD_MS);
            assert!((50.0..=85.0).contains(&frame.motor_temp));
            assert!((1000.0..=2200.0).contains(&frame.power));
            assert!((7.0..=11.0).contains(&frame.current));
            assert!((800.0..=1500.0).contains(&frame.rpm));
            assert!((3.0..=8.0).contains(&frame.payload));
            assert!((2.0..=3.5).contains(&frame.cycle_time));
            assert!((0.0..=1.0).contains(&frame.anomaly_score));
        }
    }

    #[test]
    fn test_overheating_fault_drives_temperature_past_band() {
        let mut generator = TelemetryGenerator::with_seed(7);
        let mut faults = FaultMap::new();
        faults.toggle(FaultId::Overheating);

        let mut frame = nominal_frame();
        frame.motor_temp = 84.0;
        let mut peak: f64 = 0.0;
        for tick in 0..200 {
            frame = generator.step(&frame.clone(), &faults, tick);
            peak = peak.max(frame.motor_temp);
            assert!(frame.motor_temp <= TEMP_CEILING_C);
        }
        // Upward bias must escape the nominal 85.0 upper clamp.
        assert!(peak > 85.0);
    }

    #[test]
    fn test_encoder_loss_drops_rpm_below_operational_floor() {
        let mut generator = TelemetryGenerator::with_seed(11);
        let mut faults = FaultMap::new();
        faults.toggle(FaultId::EncoderLoss);

        let mut frame = nominal_frame();
        for tick in 0..300 {
            frame = generator.step(&frame.clone(), &faults, tick);
            assert!(frame.rpm >= 0.0);
        }
        assert!(frame.rpm < 800.0);
    }

    #[test]
    fn test_comm_delay_only_grows_cycle_time() {
        let mut generator = TelemetryGenerator::with_seed(5);
        let mut faults = FaultMap::new();
        faults.toggle(FaultId::CommDelay);

        let mut frame = nominal_frame();
        for tick in 0..50 {
            let previous = frame.cycle_time;
            frame = generator.step(&frame.clone(), &faults, tick);
            assert!(frame.cycle_time >= previous);
        }
    }

    #[test]
    fn test_anomaly_score_clamped_even_under_faults() {
        let mut generator = TelemetryGenerator::with_seed(13);
        let mut faults = FaultMap::new();
        for id in crate::fault::ALL_FAULTS {
            faults.toggle(id);
            faults.toggle(id); // all Critical
        }

        let mut frame = nominal_frame();
        frame.anomaly_score = 0.99;
        for tick in 0..200 {
            frame = generator.step(&frame.clone(), &faults, tick);
            assert!((0.0..=1.0).contains(&frame.anomaly_score));
        }
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let mut a = TelemetryGenerator::with_seed(99);
        let mut b = TelemetryGenerator::with_seed(99);
        let faults = FaultMap::new();
        let frame = nominal_frame();

        assert_eq!(a.step(&frame, &faults, 3000), b.step(&frame, &faults, 3000));
    }
}
