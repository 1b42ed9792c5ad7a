use crate::error::{Result, SelcallError};
use log::warn;
use std::fmt;

// Tone plan:
// - 15 symbols per standard: digits 1-9, 0, letters A-E
// - ZVEI variants use 70 ms tones, CCIR-1 and PCCIR use 100 ms,
//   CCIR-2 and CCIR-7 use 70 ms
// - Symbol E repeats the previous symbol, symbol C separates address groups

/// Repeater symbol shared by all supported standards
pub const REPEATER_SYMBOL: char = 'E';

/// Pause/group separator symbol shared by all supported standards.
/// For the ZVEI tables some references list E instead; the assignment is
/// kept as table data so callers can override it per definition.
pub const PAUSE_SYMBOL: char = 'C';

/// ZVEI tone length (ms)
const ZVEI_TONE_MS: f64 = 70.0;

/// CCIR-1 and PCCIR tone length (ms)
const CCIR_LONG_TONE_MS: f64 = 100.0;

/// CCIR-2 and CCIR-7 tone length (ms)
const CCIR_SHORT_TONE_MS: f64 = 70.0;

/// ZVEI-1 tone table (Hz)
const ZVEI1_TONES: [(char, f64); 15] = [
    ('1', 1060.0),
    ('2', 1160.0),
    ('3', 1270.0),
    ('4', 1400.0),
    ('5', 1530.0),
    ('6', 1670.0),
    ('7', 1830.0),
    ('8', 2000.0),
    ('9', 2200.0),
    ('0', 2400.0),
    ('A', 2800.0),
    ('B', 810.0),
    ('C', 970.0),
    ('D', 886.0),
    ('E', 2600.0),
];

/// ZVEI-2 tone table (Hz); digits match ZVEI-1, letters differ
const ZVEI2_TONES: [(char, f64); 15] = [
    ('1', 1060.0),
    ('2', 1160.0),
    ('3', 1270.0),
    ('4', 1400.0),
    ('5', 1530.0),
    ('6', 1670.0),
    ('7', 1830.0),
    ('8', 2000.0),
    ('9', 2200.0),
    ('0', 2400.0),
    ('A', 885.0),
    ('B', 810.0),
    ('C', 740.0),
    ('D', 680.0),
    ('E', 970.0),
];

/// CCIR tone table (Hz), shared by CCIR-1, CCIR-2 and CCIR-7
const CCIR_TONES: [(char, f64); 15] = [
    ('1', 1124.0),
    ('2', 1197.0),
    ('3', 1275.0),
    ('4', 1358.0),
    ('5', 1446.0),
    ('6', 1540.0),
    ('7', 1640.0),
    ('8', 1747.0),
    ('9', 1860.0),
    ('0', 1981.0),
    ('A', 2400.0),
    ('B', 930.0),
    ('C', 2246.0),
    ('D', 991.0),
    ('E', 2110.0),
];

/// PCCIR tone table (Hz); digits match CCIR, letters differ
const PCCIR_TONES: [(char, f64); 15] = [
    ('1', 1124.0),
    ('2', 1197.0),
    ('3', 1275.0),
    ('4', 1358.0),
    ('5', 1446.0),
    ('6', 1540.0),
    ('7', 1640.0),
    ('8', 1747.0),
    ('9', 1860.0),
    ('0', 1981.0),
    ('A', 1050.0),
    ('B', 930.0),
    ('C', 2400.0),
    ('D', 991.0),
    ('E', 2110.0),
];

/// The supported selective-calling standards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelcallProtocol {
    Zvei1,
    Zvei2,
    Ccir1,
    Ccir2,
    Ccir7,
    Pccir,
}

impl SelcallProtocol {
    /// Every supported standard, in table order
    pub fn all() -> [SelcallProtocol; 6] {
        [
            SelcallProtocol::Zvei1,
            SelcallProtocol::Zvei2,
            SelcallProtocol::Ccir1,
            SelcallProtocol::Ccir2,
            SelcallProtocol::Ccir7,
            SelcallProtocol::Pccir,
        ]
    }

    /// Strict lookup by configured name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "ZVEI-1" => Ok(SelcallProtocol::Zvei1),
            "ZVEI-2" => Ok(SelcallProtocol::Zvei2),
            "CCIR-1" => Ok(SelcallProtocol::Ccir1),
            "CCIR-2" => Ok(SelcallProtocol::Ccir2),
            "CCIR-7" => Ok(SelcallProtocol::Ccir7),
            "PCCIR" => Ok(SelcallProtocol::Pccir),
            _ => Err(SelcallError::UnknownProtocol(name.to_string())),
        }
    }

    /// Lookup with the standard fallback: unknown names select ZVEI-1
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|_| {
            warn!("unknown protocol {:?}, falling back to ZVEI-1", name);
            SelcallProtocol::Zvei1
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelcallProtocol::Zvei1 => "ZVEI-1",
            SelcallProtocol::Zvei2 => "ZVEI-2",
            SelcallProtocol::Ccir1 => "CCIR-1",
            SelcallProtocol::Ccir2 => "CCIR-2",
            SelcallProtocol::Ccir7 => "CCIR-7",
            SelcallProtocol::Pccir => "PCCIR",
        }
    }

    /// Tone table, timing and grammar symbols for this standard
    pub fn definition(&self) -> ProtocolDefinition {
        let (tones, tone_ms): (&'static [(char, f64)], f64) = match self {
            SelcallProtocol::Zvei1 => (&ZVEI1_TONES, ZVEI_TONE_MS),
            SelcallProtocol::Zvei2 => (&ZVEI2_TONES, ZVEI_TONE_MS),
            SelcallProtocol::Ccir1 => (&CCIR_TONES, CCIR_LONG_TONE_MS),
            SelcallProtocol::Ccir2 => (&CCIR_TONES, CCIR_SHORT_TONE_MS),
            SelcallProtocol::Ccir7 => (&CCIR_TONES, CCIR_SHORT_TONE_MS),
            SelcallProtocol::Pccir => (&PCCIR_TONES, CCIR_LONG_TONE_MS),
        };
        ProtocolDefinition {
            protocol: *self,
            tones,
            tone_ms,
            repeater: REPEATER_SYMBOL,
            pause: Some(PAUSE_SYMBOL),
            group_size: crate::DEFAULT_GROUP_SIZE,
        }
    }
}

impl Default for SelcallProtocol {
    fn default() -> Self {
        SelcallProtocol::Zvei1
    }
}

impl fmt::Display for SelcallProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable per-standard signaling parameters
#[derive(Debug, Clone)]
pub struct ProtocolDefinition {
    pub protocol: SelcallProtocol,
    /// Candidate (symbol, frequency) pairs in detection order
    pub tones: &'static [(char, f64)],
    pub tone_ms: f64,
    pub repeater: char,
    pub pause: Option<char>,
    pub group_size: usize,
}

impl ProtocolDefinition {
    /// Frequency assigned to `symbol`, if the table defines one
    pub fn frequency(&self, symbol: char) -> Option<f64> {
        self.tones
            .iter()
            .find(|&&(s, _)| s == symbol)
            .map(|&(_, f)| f)
    }

    /// Frequency of the pause tone; 0.0 (silence) when no pause symbol is set
    pub fn pause_frequency(&self) -> f64 {
        self.pause.and_then(|p| self.frequency(p)).unwrap_or(0.0)
    }

    /// Samples covered by one tone at the given rate
    pub fn samples_per_tone(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.tone_ms / 1000.0) as usize
    }

    /// Replace the tone duration (ms); callers apply configured overrides here
    pub fn with_tone_ms(mut self, tone_ms: f64) -> Self {
        self.tone_ms = tone_ms;
        self
    }

    /// Replace the pause symbol; `None` turns pauses into plain silence
    pub fn with_pause_symbol(mut self, pause: Option<char>) -> Self {
        self.pause = pause;
        self
    }

    /// Replace the address group width used when formatting decoded calls
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }
}
