use crate::error::{Result, SelcallError};
use crate::DEFAULT_SAMPLE_RATE;
use log::info;
use std::f64::consts::PI;

/// First siren frequency, used on even half-cycles
pub const RING_FREQ_A: f64 = 800.0;
/// Second siren frequency, used on odd half-cycles
pub const RING_FREQ_B: f64 = 1010.0;
/// Half-cycle length of the two-tone alternation
pub const RING_HALF_CYCLE_MS: f64 = 300.0;

/// Default ring length in seconds
pub const DEFAULT_RING_SECS: f64 = 5.0;
/// Default ring amplitude
pub const DEFAULT_RING_AMPLITUDE: f32 = 0.5;

/// Ring generator configuration
#[derive(Debug, Clone)]
pub struct RingerConfig {
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub amplitude: f32,
}

impl Default for RingerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: DEFAULT_RING_SECS,
            amplitude: DEFAULT_RING_AMPLITUDE,
        }
    }
}

/// Alarm-tone generator for decoded calls.
///
/// Triggering arms a sample countdown and restarts the siren; triggers while
/// already ringing re-arm the countdown rather than extending it. Pulled
/// blocks are filled with an 800/1010 Hz two-tone siren alternating every
/// 300 ms; the phase follows the offset within the current half-cycle, so a
/// tone spanning several pulls stays continuous. LED state changes surface
/// as edges via `poll_led_change`.
pub struct SelcallRinger {
    sample_rate: f64,
    amplitude: f32,
    duration_samples: usize,
    half_cycle: usize,
    remaining: usize,
    last_reported_led: bool,
}

impl SelcallRinger {
    pub fn new(config: RingerConfig) -> Result<Self> {
        if config.sample_rate == 0 {
            return Err(SelcallError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        let rate = config.sample_rate as f64;
        Ok(Self {
            sample_rate: rate,
            amplitude: config.amplitude,
            duration_samples: (rate * config.duration_secs) as usize,
            half_cycle: ((rate * RING_HALF_CYCLE_MS / 1000.0) as usize).max(1),
            remaining: 0,
            last_reported_led: false,
        })
    }

    /// Arm (or re-arm) the ring countdown. Returns true when this trigger
    /// started a ring rather than re-arming a running one.
    pub fn trigger(&mut self) -> bool {
        let newly_started = self.remaining == 0;
        self.remaining = self.duration_samples;
        if newly_started {
            info!("ring started");
        }
        newly_started
    }

    /// Fill `out` completely: siren while the countdown runs, silence after
    /// it expires and while idle. Returns the number of siren samples.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        let active = out.len().min(self.remaining);

        let mut written = 0;
        while written < active {
            let elapsed = self.duration_samples - self.remaining;
            let cycle_index = elapsed / self.half_cycle;
            let frequency = if cycle_index % 2 == 0 {
                RING_FREQ_A
            } else {
                RING_FREQ_B
            };

            // Generate at most up to the next frequency change
            let offset = elapsed % self.half_cycle;
            let run = (self.half_cycle - offset).min(active - written);
            for i in 0..run {
                let t = (offset + i) as f64 / self.sample_rate;
                out[written + i] =
                    ((2.0 * PI * frequency * t).sin() * self.amplitude as f64) as f32;
            }
            written += run;
            self.remaining -= run;
        }

        for sample in &mut out[active..] {
            *sample = 0.0;
        }
        active
    }

    /// LED edge since the previous poll: `Some(true)` when ringing started,
    /// `Some(false)` when it finished, `None` otherwise.
    pub fn poll_led_change(&mut self) -> Option<bool> {
        let current = self.remaining > 0;
        if current != self.last_reported_led {
            self.last_reported_led = current;
            Some(current)
        } else {
            None
        }
    }

    pub fn is_ringing(&self) -> bool {
        self.remaining > 0
    }
}
