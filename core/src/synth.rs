use crate::protocol::ProtocolDefinition;
use std::f64::consts::PI;

/// Silence padding before and after a call burst, in milliseconds
pub const CALL_PADDING_MS: f64 = 700.0;

/// Generates the audio for selective-call tone bursts.
pub struct ToneSynthesizer {
    sample_rate: f64,
    amplitude: f32,
}

impl ToneSynthesizer {
    pub fn new(sample_rate: u32, amplitude: f32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            amplitude,
        }
    }

    /// Generate a single tone of `duration_ms` milliseconds.
    /// A zero or negative frequency produces silence of the same duration.
    pub fn tone(&self, frequency: f64, duration_ms: f64) -> Vec<f32> {
        let count = (self.sample_rate * duration_ms / 1000.0) as usize;
        if frequency <= 0.0 {
            return vec![0.0; count];
        }
        let mut samples = Vec::with_capacity(count);
        for n in 0..count {
            let t = n as f64 / self.sample_rate;
            let value = (2.0 * PI * frequency * t).sin() * self.amplitude as f64;
            samples.push(value as f32);
        }
        samples
    }

    /// Generate `duration_ms` milliseconds of silence.
    pub fn silence(&self, duration_ms: f64) -> Vec<f32> {
        vec![0.0; (self.sample_rate * duration_ms / 1000.0) as usize]
    }

    /// Build a complete call burst: silence padding, the own address tones,
    /// a pause tone, the destination tones, silence padding.
    ///
    /// The `-` joining own and destination is a structural separator and is
    /// never transmitted; each part gets repeat-compression independently.
    /// Symbols absent from the protocol table are emitted as silence.
    pub fn call_burst(
        &self,
        own_id: &str,
        destination: &str,
        def: &ProtocolDefinition,
    ) -> Vec<f32> {
        let sequence = format!("{}-{}", own_id, destination);

        let mut samples = self.silence(CALL_PADDING_MS);
        for (index, part) in sequence.split('-').enumerate() {
            if index != 0 {
                samples.extend(self.tone(def.pause_frequency(), def.tone_ms));
            }
            for symbol in resolve_symbols(part, def.repeater) {
                let frequency = def.frequency(symbol).unwrap_or(0.0);
                samples.extend(self.tone(frequency, def.tone_ms));
            }
        }
        samples.extend(self.silence(CALL_PADDING_MS));
        samples
    }
}

/// Apply repeat-compression within one address part: a character equal to
/// its immediate predecessor is transmitted as the repeater symbol. The
/// predecessor always tracks the original character, so "111" becomes
/// `[1, E, E]`.
fn resolve_symbols(part: &str, repeater: char) -> Vec<char> {
    let mut resolved = Vec::with_capacity(part.len());
    let mut previous = None;
    for ch in part.chars() {
        if previous == Some(ch) {
            resolved.push(repeater);
        } else {
            resolved.push(ch);
        }
        previous = Some(ch);
    }
    resolved
}
