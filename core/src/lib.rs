//! Selective calling (SELCALL) codec library
//!
//! Decodes and generates ZVEI/CCIR/PCCIR tone sequences used to address
//! individual receivers over narrowband audio channels

pub mod error;
pub mod protocol;
pub mod detector;
pub mod gate;
pub mod framing;
pub mod formatter;
pub mod synth;
pub mod decoder;
pub mod encoder;
pub mod ringer;

pub use decoder::{DecodedMessage, DecoderConfig, DecoderEvent, DecoderOutput, SelcallDecoder};
pub use encoder::{EncoderConfig, SelcallEncoder};
pub use error::{Result, SelcallError};
pub use protocol::{ProtocolDefinition, SelcallProtocol};
pub use ringer::{RingerConfig, SelcallRinger};

// Configuration defaults
pub const DEFAULT_SAMPLE_RATE: u32 = 48000; // Hz
pub const DEFAULT_GROUP_SIZE: usize = 5; // symbols per address group
