use crate::error::{Result, SelcallError};
use crate::protocol::{ProtocolDefinition, SelcallProtocol};
use crate::synth::ToneSynthesizer;
use crate::DEFAULT_SAMPLE_RATE;
use log::{debug, info};

/// Default own address transmitted as the source part of every call
pub const DEFAULT_OWN_ID: &str = "12345";

/// Default transmit amplitude
pub const DEFAULT_AMPLITUDE: f32 = 0.8;

/// Transmit engine configuration
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub sample_rate: u32,
    pub protocol: SelcallProtocol,
    /// Source address prepended to every call
    pub own_id: String,
    pub amplitude: f32,
    /// Tone duration override in ms; 0 keeps the protocol default
    pub tone_ms_override: f64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            protocol: SelcallProtocol::default(),
            own_id: DEFAULT_OWN_ID.to_string(),
            amplitude: DEFAULT_AMPLITUDE,
            tone_ms_override: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Idle,
    Transmitting,
}

/// Selective-call transmit engine.
///
/// A strict two-state machine: a call request builds the complete burst and
/// enters `Transmitting`; pulls drain it block by block until empty. A new
/// request while transmitting replaces the in-flight burst, latest request
/// wins. Transmit state changes surface as PTT edges via `poll_ptt_change`.
pub struct SelcallEncoder {
    definition: ProtocolDefinition,
    synth: ToneSynthesizer,
    own_id: String,
    state: TxState,
    buffer: Vec<f32>,
    cursor: usize,
    last_reported_ptt: bool,
}

impl SelcallEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        if config.sample_rate == 0 {
            return Err(SelcallError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }

        let mut definition = config.protocol.definition();
        if config.tone_ms_override > 0.0 {
            definition = definition.with_tone_ms(config.tone_ms_override);
        }

        Ok(Self {
            definition,
            synth: ToneSynthesizer::new(config.sample_rate, config.amplitude),
            own_id: config.own_id,
            state: TxState::Idle,
            buffer: Vec::new(),
            cursor: 0,
            last_reported_ptt: false,
        })
    }

    /// Request a call to `destination`. An empty destination is dropped
    /// without an error; a request during an active transmission abandons
    /// the remainder of the old burst.
    pub fn request(&mut self, destination: &str) {
        if destination.is_empty() {
            debug!("empty destination, request ignored");
            return;
        }

        info!("transmitting {} -> {}", self.own_id, destination);
        self.buffer = self
            .synth
            .call_burst(&self.own_id, destination, &self.definition);
        self.cursor = 0;
        self.state = TxState::Transmitting;
    }

    /// Drain up to `out.len()` samples of the active burst into `out`.
    /// Returns the number of samples written; the tail of `out` is left
    /// untouched. Returns 0 while idle.
    pub fn pull(&mut self, out: &mut [f32]) -> usize {
        if self.state == TxState::Idle {
            return 0;
        }

        let remaining = self.buffer.len() - self.cursor;
        let count = out.len().min(remaining);
        out[..count].copy_from_slice(&self.buffer[self.cursor..self.cursor + count]);
        self.cursor += count;

        if self.cursor >= self.buffer.len() {
            info!("burst complete");
            self.state = TxState::Idle;
            self.buffer.clear();
            self.cursor = 0;
        }
        count
    }

    /// PTT edge since the previous poll: `Some(true)` when transmission
    /// started, `Some(false)` when it finished, `None` otherwise.
    pub fn poll_ptt_change(&mut self) -> Option<bool> {
        let current = self.state == TxState::Transmitting;
        if current != self.last_reported_ptt {
            self.last_reported_ptt = current;
            Some(current)
        } else {
            None
        }
    }

    pub fn is_transmitting(&self) -> bool {
        self.state == TxState::Transmitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_RATE: u32 = 8000;

    fn test_encoder() -> SelcallEncoder {
        SelcallEncoder::new(EncoderConfig {
            sample_rate: TEST_RATE,
            ..EncoderConfig::default()
        })
        .unwrap()
    }

    fn drain(encoder: &mut SelcallEncoder, block: usize) -> Vec<f32> {
        let mut collected = Vec::new();
        let mut out = vec![0.0f32; block];
        loop {
            let written = encoder.pull(&mut out);
            if written == 0 {
                break;
            }
            collected.extend_from_slice(&out[..written]);
        }
        collected
    }

    #[test]
    fn test_config_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.own_id, "12345");
        assert_eq!(config.amplitude, 0.8);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let config = EncoderConfig {
            sample_rate: 0,
            ..EncoderConfig::default()
        };
        assert!(SelcallEncoder::new(config).is_err());
    }

    #[test]
    fn test_empty_request_is_ignored() {
        let mut encoder = test_encoder();
        encoder.request("");
        assert!(!encoder.is_transmitting());
        let mut out = vec![0.0f32; 256];
        assert_eq!(encoder.pull(&mut out), 0);
    }

    #[test]
    fn test_idle_pull_produces_nothing() {
        let mut encoder = test_encoder();
        let mut out = vec![0.0f32; 256];
        assert_eq!(encoder.pull(&mut out), 0);
    }

    #[test]
    fn test_burst_drains_to_idle() {
        let mut encoder = test_encoder();
        encoder.request("67890");
        assert!(encoder.is_transmitting());

        // 2 x 700 ms padding + 11 tones (5 + pause + 5) of 70 ms at 8 kHz
        let audio = drain(&mut encoder, 4096);
        assert_eq!(audio.len(), 2 * 5600 + 11 * 560);
        assert!(!encoder.is_transmitting());
    }

    #[test]
    fn test_final_pull_is_partial() {
        let mut encoder = test_encoder();
        encoder.request("67890");

        let total = 2 * 5600 + 11 * 560;
        let mut out = vec![0.0f32; 4096];
        let mut written = Vec::new();
        loop {
            let n = encoder.pull(&mut out);
            if n == 0 {
                break;
            }
            written.push(n);
        }
        assert_eq!(written.iter().sum::<usize>(), total);
        assert_eq!(*written.last().unwrap(), total % 4096);
    }

    #[test]
    fn test_latest_request_wins() {
        let mut encoder = test_encoder();
        encoder.request("67890");

        let mut out = vec![0.0f32; 1024];
        assert_eq!(encoder.pull(&mut out), 1024);

        // Replacing the burst discards the rest of the first one
        encoder.request("678");
        let replacement = drain(&mut encoder, 4096);
        assert_eq!(replacement.len(), 2 * 5600 + 9 * 560);
    }

    #[test]
    fn test_ptt_edges_fire_once_per_transition() {
        let mut encoder = test_encoder();
        assert_eq!(encoder.poll_ptt_change(), None);

        encoder.request("67890");
        assert_eq!(encoder.poll_ptt_change(), Some(true));
        assert_eq!(encoder.poll_ptt_change(), None);

        drain(&mut encoder, 4096);
        assert_eq!(encoder.poll_ptt_change(), Some(false));
        assert_eq!(encoder.poll_ptt_change(), None);
    }
}
