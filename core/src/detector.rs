use std::f64::consts::PI;

// Detection scheme:
// - Hamming window over the analysis frame
// - Goertzel power at 5 probe frequencies spanning ±8 Hz around each
//   candidate, the best probe scoring the candidate
// - the strongest candidate wins only when it beats the runner-up by the
//   configured power ratio; anything else is reported as silence

/// Minimum top/second power ratio for a confident symbol decision
pub const DEFAULT_RATIO_THRESHOLD: f64 = 3.0;

/// Half-width of the probe band around each candidate frequency (Hz)
pub const DEFAULT_SEARCH_BAND_HZ: f64 = 8.0;

/// Probe frequencies evaluated across the band
pub const DEFAULT_SEARCH_STEPS: usize = 5;

/// Guards the ratio against a zero runner-up power
const RATIO_EPSILON: f64 = 1e-12;

/// Per-frame detection outcome; `symbol` is `None` for silence
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub symbol: Option<char>,
    pub top_power: f64,
    pub second_power: f64,
    /// Index of the winning candidate, for diagnostics
    pub top_index: Option<usize>,
}

impl DetectionResult {
    fn silence() -> Self {
        Self {
            symbol: None,
            top_power: 0.0,
            second_power: 0.0,
            top_index: None,
        }
    }

    pub fn is_silence(&self) -> bool {
        self.symbol.is_none()
    }
}

/// Windowed Goertzel power estimator over a candidate tone table
pub struct ToneDetector {
    sample_rate: f64,
    band_hz: f64,
    steps: usize,
    ratio_threshold: f64,
}

impl ToneDetector {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            band_hz: DEFAULT_SEARCH_BAND_HZ,
            steps: DEFAULT_SEARCH_STEPS,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }

    pub fn with_ratio_threshold(mut self, ratio_threshold: f64) -> Self {
        self.ratio_threshold = ratio_threshold;
        self
    }

    pub fn with_search_band(mut self, band_hz: f64, steps: usize) -> Self {
        self.band_hz = band_hz;
        self.steps = steps;
        self
    }

    /// Classify one frame against the candidate (symbol, frequency) table.
    ///
    /// Returns the winning symbol when its band power beats the runner-up by
    /// the ratio threshold, silence otherwise. Empty or all-zero frames are
    /// silence with zero power.
    pub fn detect(&self, frame: &[f32], candidates: &[(char, f64)]) -> DetectionResult {
        if frame.is_empty() || candidates.is_empty() {
            return DetectionResult::silence();
        }

        let window = hamming_window(frame.len());
        let windowed: Vec<f64> = frame
            .iter()
            .zip(window.iter())
            .map(|(&s, &w)| s as f64 * w)
            .collect();

        let mut powers: Vec<f64> = candidates
            .iter()
            .map(|&(_, freq)| self.band_power(&windowed, freq))
            .collect();

        // Strongest candidate, ties broken by the earlier table entry
        let mut top_index = 0;
        for (i, &power) in powers.iter().enumerate() {
            if power > powers[top_index] {
                top_index = i;
            }
        }
        let top_power = powers[top_index];
        if top_power <= 0.0 {
            return DetectionResult::silence();
        }

        // Runner-up is the maximum after zeroing the winner
        powers[top_index] = 0.0;
        let second_power = powers.iter().cloned().fold(0.0, f64::max);

        let ratio = if second_power > 0.0 {
            top_power / (second_power + RATIO_EPSILON)
        } else {
            f64::INFINITY
        };

        let symbol = if ratio >= self.ratio_threshold {
            Some(candidates[top_index].0)
        } else {
            None
        };

        DetectionResult {
            symbol,
            top_power,
            second_power,
            top_index: Some(top_index),
        }
    }

    /// Best Goertzel power over `steps` probes spanning ±band around `center_hz`
    fn band_power(&self, windowed: &[f64], center_hz: f64) -> f64 {
        let start = center_hz - self.band_hz;
        let span = 2.0 * self.band_hz;
        let mut best = 0.0;
        for step in 0..self.steps.max(1) {
            let freq = if self.steps > 1 {
                start + span * step as f64 / (self.steps - 1) as f64
            } else {
                start
            };
            let power = goertzel_power(windowed, self.sample_rate, freq);
            if power > best {
                best = power;
            }
        }
        best
    }
}

/// Signal power at one frequency via the Goertzel recurrence
fn goertzel_power(samples: &[f64], sample_rate: f64, freq: f64) -> f64 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }

    let k = (0.5 + n as f64 * freq / sample_rate).floor();
    let omega = 2.0 * PI * k / n as f64;
    let coeff = 2.0 * omega.cos();

    let mut s_prev = 0.0;
    let mut s_prev2 = 0.0;
    for &sample in samples {
        let s = sample + coeff * s_prev - s_prev2;
        s_prev2 = s_prev;
        s_prev = s;
    }

    (s_prev2 * s_prev2 + s_prev * s_prev - coeff * s_prev * s_prev2).abs()
}

/// Hamming window of the given length (degenerate lengths are flat)
fn hamming_window(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let m = (len - 1) as f64;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / m).cos())
        .collect()
}
