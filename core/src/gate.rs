// Adaptive squelch: noise-floor tracking plus the timed audio gate.
//
// The floor estimate keeps the detector honest on dead channels, where the
// strongest candidate still "wins" its ratio contest against other noise
// bins. The gate unmutes downstream audio for a fixed time after a call
// addressed to this station.

/// Noise floor estimate before any frame has been observed
const INITIAL_NOISE_POWER: f64 = 10.0;

/// Frames louder than floor × this factor are taken as signal and excluded
/// from the average
const NOISE_EXCLUSION_FACTOR: f64 = 20.0;

/// EMA weights for the floor update
const NOISE_EMA_PREVIOUS: f64 = 0.95;
const NOISE_EMA_CURRENT: f64 = 0.05;

/// Acceptance threshold is floor × this factor
const NOISE_THRESHOLD_FACTOR: f64 = 8.0;

/// Absolute minimum top power for any symbol decision
const MIN_SYMBOL_POWER: f64 = 100.0;

/// Exponential noise-floor tracker gating per-frame symbol decisions
#[derive(Debug, Clone)]
pub struct NoiseFloor {
    average: f64,
}

impl NoiseFloor {
    pub fn new() -> Self {
        Self {
            average: INITIAL_NOISE_POWER,
        }
    }

    /// Feed one frame's top power and decide whether a symbol at that power
    /// is credible. Quiet frames refine the floor estimate; loud frames are
    /// assumed to be tones and leave it untouched.
    pub fn admit(&mut self, top_power: f64) -> bool {
        if top_power < self.average * NOISE_EXCLUSION_FACTOR {
            self.average = NOISE_EMA_PREVIOUS * self.average + NOISE_EMA_CURRENT * top_power;
        }
        top_power > self.average * NOISE_THRESHOLD_FACTOR && top_power > MIN_SYMBOL_POWER
    }

    pub fn average(&self) -> f64 {
        self.average
    }
}

impl Default for NoiseFloor {
    fn default() -> Self {
        Self::new()
    }
}

/// Timed audio-passthrough gate armed by a matching call
#[derive(Debug, Clone)]
pub struct AudioGate {
    duration_samples: usize,
    remaining: usize,
    open: bool,
}

impl AudioGate {
    pub fn new(duration_samples: usize) -> Self {
        Self {
            duration_samples,
            remaining: 0,
            open: false,
        }
    }

    /// Arm the gate for a full duration. Re-arming while open resets the
    /// countdown (it never stacks). Returns true when this call opened a
    /// closed gate.
    pub fn trigger(&mut self) -> bool {
        let newly_opened = !self.open;
        self.open = true;
        self.remaining = self.duration_samples;
        newly_opened
    }

    /// Account for one processed block of `n_samples`. Returns true when the
    /// block should pass through, false when it must be muted. A tick that
    /// starts with an exhausted countdown closes the gate.
    pub fn tick(&mut self, n_samples: usize) -> bool {
        if !self.open {
            return false;
        }
        if self.remaining > 0 {
            self.remaining = self.remaining.saturating_sub(n_samples);
            true
        } else {
            self.open = false;
            false
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn remaining_samples(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_floor_tracks_quiet_frames() {
        let mut floor = NoiseFloor::new();
        assert_eq!(floor.average(), 10.0);

        floor.admit(2.0);
        // 0.95 * 10 + 0.05 * 2
        assert!((floor.average() - 9.6).abs() < 1e-12);
    }

    #[test]
    fn test_noise_floor_ignores_loud_frames() {
        let mut floor = NoiseFloor::new();
        // 10 * 20 = 200; anything at or above stays out of the average
        floor.admit(5000.0);
        assert_eq!(floor.average(), 10.0);
    }

    #[test]
    fn test_noise_floor_admission_rules() {
        let mut floor = NoiseFloor::new();
        // Strong tone on a quiet channel passes both thresholds
        assert!(floor.admit(5000.0));
        // Zero power never passes
        assert!(!floor.admit(0.0));
        // Above the adaptive threshold but below the absolute floor
        let mut floor = NoiseFloor::new();
        for _ in 0..200 {
            floor.admit(0.1);
        }
        assert!(floor.average() < 1.0);
        assert!(!floor.admit(90.0), "90 < 100 absolute floor");
    }

    #[test]
    fn test_noise_floor_adaptive_threshold_rises() {
        let mut floor = NoiseFloor::new();
        // Hold the channel at a noisy 150 for a while; the floor learns it
        for _ in 0..300 {
            floor.admit(150.0);
        }
        assert!(floor.average() > 100.0);
        // 400 clears the absolute floor but not 8x the learned average
        assert!(!floor.admit(400.0));
    }

    #[test]
    fn test_gate_starts_closed() {
        let mut gate = AudioGate::new(1000);
        assert!(!gate.is_open());
        assert!(!gate.tick(100));
    }

    #[test]
    fn test_gate_passes_exactly_duration() {
        let mut gate = AudioGate::new(1000);
        assert!(gate.trigger());

        // 10 ticks of 100 samples pass, the 11th closes
        for i in 0..10 {
            assert!(gate.tick(100), "tick {} should pass", i);
        }
        assert!(!gate.tick(100));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_gate_retrigger_resets_countdown() {
        let mut gate = AudioGate::new(1000);
        assert!(gate.trigger());
        assert!(gate.tick(600));

        // Re-arm before expiry: not a new opening, countdown restarts
        assert!(!gate.trigger());
        assert_eq!(gate.remaining_samples(), 1000);

        for _ in 0..10 {
            assert!(gate.tick(100));
        }
        assert!(!gate.tick(100));
    }

    #[test]
    fn test_gate_oversized_tick_saturates() {
        let mut gate = AudioGate::new(1000);
        gate.trigger();
        // One oversized block passes, then the gate closes
        assert!(gate.tick(4096));
        assert_eq!(gate.remaining_samples(), 0);
        assert!(!gate.tick(1));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_gate_reopens_after_close() {
        let mut gate = AudioGate::new(100);
        gate.trigger();
        gate.tick(100);
        gate.tick(1);
        assert!(!gate.is_open());
        assert!(gate.trigger(), "second opening is a fresh transition");
        assert!(gate.tick(50));
    }
}
