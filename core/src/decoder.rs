use crate::detector::ToneDetector;
use crate::error::{Result, SelcallError};
use crate::formatter::{format_selective, FormatMode};
use crate::framing::SequenceAssembler;
use crate::gate::{AudioGate, NoiseFloor};
use crate::protocol::{ProtocolDefinition, SelcallProtocol};
use crate::{DEFAULT_GROUP_SIZE, DEFAULT_SAMPLE_RATE};
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source tag stamped on every decoded message
pub const SOURCE_TAG: &str = "sel";

/// Default target address the decoder listens for
pub const DEFAULT_TARGET_CODE: &str = "50101";

/// Ratio threshold the streaming decoder hands to the detector; streaming
/// windows straddle tone boundaries, so this sits below the standalone
/// detector default
pub const DECODER_RATIO_THRESHOLD: f64 = 2.5;

/// How long the audio gate stays open after a matching call, in seconds
pub const GATE_DURATION_SECS: usize = 20;

/// Analysis rate the decimator aims for
const ANALYSIS_TARGET_RATE: u32 = 8000;

/// Streaming decoder configuration
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub sample_rate: u32,
    pub protocol: SelcallProtocol,
    /// Address that opens the gate; empty matches every call
    pub target_code: String,
    pub group_size: usize,
    /// Tone duration override in ms; 0 keeps the protocol default
    pub tone_ms_override: f64,
    pub ratio_threshold: f64,
    pub format_mode: FormatMode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            protocol: SelcallProtocol::default(),
            target_code: DEFAULT_TARGET_CODE.to_string(),
            group_size: DEFAULT_GROUP_SIZE,
            tone_ms_override: 0.0,
            ratio_threshold: DECODER_RATIO_THRESHOLD,
            format_mode: FormatMode::Minimal,
        }
    }
}

/// A validated, formatted selective call
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub source_tag: &'static str,
    /// Wall-clock seconds since the Unix epoch
    pub timestamp: f64,
    pub protocol: &'static str,
    /// True iff this call matched the configured target and armed the gate
    pub gate_active: bool,
    pub code: String,
}

/// State changes and decoded calls produced while processing one block
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    Message(DecodedMessage),
    GateOpened,
    GateClosed,
}

/// Result of processing one audio block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecoderOutput {
    pub events: Vec<DecoderEvent>,
    /// Whether the host should pass this block through or mute it
    pub pass_through: bool,
}

/// Streaming selective-call decoder.
///
/// Accepts arbitrarily sized sample blocks, carries partial windows across
/// calls, and analyzes half-overlapping windows of one tone duration each.
/// Windows are decimated towards 8 kHz before tone detection; the input is
/// assumed bandpass-filtered upstream.
pub struct SelcallDecoder {
    definition: ProtocolDefinition,
    target: String,
    format_mode: FormatMode,
    buffer: Vec<f32>,
    window_len: usize,
    hop: usize,
    decimation: usize,
    detector: ToneDetector,
    noise: NoiseFloor,
    gate: AudioGate,
    assembler: SequenceAssembler,
}

impl SelcallDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self> {
        if config.sample_rate == 0 {
            return Err(SelcallError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        if config.group_size == 0 {
            return Err(SelcallError::InvalidConfig(
                "group size must be positive".to_string(),
            ));
        }

        let mut definition = config.protocol.definition().with_group_size(config.group_size);
        if config.tone_ms_override > 0.0 {
            definition = definition.with_tone_ms(config.tone_ms_override);
        }

        let window_len = definition.samples_per_tone(config.sample_rate);
        if window_len == 0 {
            return Err(SelcallError::InvalidConfig(format!(
                "tone duration {} ms is shorter than one sample at {} Hz",
                definition.tone_ms, config.sample_rate
            )));
        }

        let decimation = (config.sample_rate / ANALYSIS_TARGET_RATE).max(1) as usize;
        let analysis_rate = config.sample_rate as f64 / decimation as f64;

        Ok(Self {
            definition,
            target: config.target_code.to_uppercase(),
            format_mode: config.format_mode,
            buffer: Vec::new(),
            window_len,
            hop: (window_len / 2).max(1),
            decimation,
            detector: ToneDetector::new(analysis_rate)
                .with_ratio_threshold(config.ratio_threshold),
            noise: NoiseFloor::new(),
            gate: AudioGate::new(GATE_DURATION_SECS * config.sample_rate as usize),
            assembler: SequenceAssembler::new(),
        })
    }

    /// Process one block of audio. The block may be smaller or larger than
    /// an analysis window; leftover samples carry over to the next call.
    pub fn process(&mut self, samples: &[f32]) -> DecoderOutput {
        let mut output = DecoderOutput::default();
        self.buffer.extend_from_slice(samples);

        let mut offset = 0;
        while self.buffer.len() - offset >= self.window_len {
            let window = &self.buffer[offset..offset + self.window_len];
            let decimated: Vec<f32> = window.iter().step_by(self.decimation).copied().collect();

            let result = self.detector.detect(&decimated, self.definition.tones);
            let symbol = if self.noise.admit(result.top_power) {
                result.symbol
            } else {
                if result.symbol.is_some() {
                    debug!(
                        "tone {:?} below noise floor (power {:.1}, floor {:.1})",
                        result.symbol,
                        result.top_power,
                        self.noise.average()
                    );
                }
                None
            };

            if let Some(sequence) = self.assembler.push(symbol) {
                self.emit(&sequence, &mut output.events);
            }
            offset += self.hop;
        }
        self.buffer.drain(..offset);

        // Tick after analysis so a match opens the gate for its own block
        let was_open = self.gate.is_open();
        output.pass_through = self.gate.tick(samples.len());
        if was_open && !output.pass_through {
            info!("gate closed");
            output.events.push(DecoderEvent::GateClosed);
        }
        output
    }

    fn emit(&mut self, sequence: &str, events: &mut Vec<DecoderEvent>) {
        let code = format_selective(sequence, &self.definition, self.format_mode);
        let matched = self.target.is_empty() || code.replace('-', "").contains(&self.target);

        if matched {
            info!("call for us: {}", code);
            if self.gate.trigger() {
                info!("gate opened for {} s", GATE_DURATION_SECS);
                events.push(DecoderEvent::GateOpened);
            }
        } else {
            info!("decoded call: {}", code);
        }

        events.push(DecoderEvent::Message(DecodedMessage {
            source_tag: SOURCE_TAG,
            timestamp: unix_time(),
            protocol: self.definition.protocol.name(),
            gate_active: matched,
            code,
        }));
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate.is_open()
    }
}

fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
