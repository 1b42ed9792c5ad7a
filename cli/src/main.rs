use clap::{Parser, Subcommand};
use hound::WavSpec;
use log::info;
use selcall_core::formatter::FormatMode;
use selcall_core::{
    DecoderConfig, DecoderEvent, EncoderConfig, RingerConfig, SelcallDecoder, SelcallEncoder,
    SelcallProtocol, SelcallRinger,
};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "selcall")]
#[command(about = "Selective calling (ZVEI/CCIR/PCCIR) tone encoder and decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a selective call into a WAV audio file
    Encode {
        /// Destination address, e.g. 67890
        #[arg(value_name = "DESTINATION")]
        destination: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Tone protocol: ZVEI-1, ZVEI-2, CCIR-1, CCIR-2, CCIR-7 or PCCIR
        #[arg(short, long, default_value = "ZVEI-1")]
        protocol: String,

        /// Own address transmitted ahead of the destination
        #[arg(long, default_value = "12345")]
        own_id: String,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,

        /// Peak tone amplitude, 0.0 to 1.0
        #[arg(long, default_value_t = 0.8)]
        amplitude: f32,

        /// Tone duration override in ms (0 keeps the protocol default)
        #[arg(long, default_value_t = 0.0)]
        tone_ms: f64,
    },

    /// Decode selective calls from a WAV audio file
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Tone protocol: ZVEI-1, ZVEI-2, CCIR-1, CCIR-2, CCIR-7 or PCCIR
        #[arg(short, long, default_value = "ZVEI-1")]
        protocol: String,

        /// Address that opens the audio gate; empty matches every call
        #[arg(short, long, default_value = "50101")]
        target: String,

        /// Symbols per address group in the formatted output
        #[arg(long, default_value_t = 5)]
        group_size: usize,

        /// Tone duration override in ms (0 keeps the protocol default)
        #[arg(long, default_value_t = 0.0)]
        tone_ms: f64,

        /// Dominance ratio a tone must reach over the runner-up frequency
        #[arg(long, default_value_t = 2.5)]
        ratio_threshold: f64,

        /// Samples fed to the decoder per block
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,

        /// Print decoded calls as JSON objects instead of plain lines
        #[arg(long)]
        json: bool,

        /// Write gate-passed audio here (muted blocks are zeroed)
        #[arg(long, value_name = "OUTPUT.WAV")]
        gated_output: Option<PathBuf>,
    },

    /// Write the alarm siren to a WAV audio file
    Ring {
        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Ring duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,

        /// Peak siren amplitude, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5)]
        amplitude: f32,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Destination address is empty")]
    EmptyDestination,
}

/// One decoded call rendered as a JSON line
#[derive(Serialize)]
struct CallRecord<'a> {
    source_tag: &'a str,
    timestamp: f64,
    protocol: &'a str,
    gate_active: bool,
    code: &'a str,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            destination,
            output,
            protocol,
            own_id,
            sample_rate,
            amplitude,
            tone_ms,
        } => {
            let config = EncoderConfig {
                sample_rate,
                protocol: SelcallProtocol::from_name_or_default(&protocol),
                own_id,
                amplitude,
                tone_ms_override: tone_ms,
            };
            encode_command(&destination, &output, config)?
        }
        Commands::Decode {
            input,
            protocol,
            target,
            group_size,
            tone_ms,
            ratio_threshold,
            chunk_size,
            json,
            gated_output,
        } => {
            let config = DecoderConfig {
                // Replaced by the WAV header rate before the decoder is built
                sample_rate: selcall_core::DEFAULT_SAMPLE_RATE,
                protocol: SelcallProtocol::from_name_or_default(&protocol),
                target_code: target,
                group_size,
                tone_ms_override: tone_ms,
                ratio_threshold,
                format_mode: FormatMode::Minimal,
            };
            decode_command(&input, config, chunk_size, json, gated_output.as_ref())?
        }
        Commands::Ring {
            output,
            duration,
            sample_rate,
            amplitude,
        } => {
            let config = RingerConfig {
                sample_rate,
                duration_secs: duration,
                amplitude,
            };
            ring_command(&output, config)?
        }
    }

    Ok(())
}

fn encode_command(
    destination: &str,
    output_path: &PathBuf,
    config: EncoderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if destination.trim().is_empty() {
        return Err(CliError::EmptyDestination.into());
    }

    let sample_rate = config.sample_rate;
    let protocol_name = config.protocol.name();
    let call_label = format!("{}-{}", config.own_id, destination);

    let mut encoder = SelcallEncoder::new(config)?;
    encoder.request(destination);
    if let Some(on) = encoder.poll_ptt_change() {
        info!("ptt {}", if on { "on" } else { "off" });
    }

    // Drain the burst block by block, the way a sound-card host would
    let mut samples = Vec::new();
    let mut block = [0.0f32; 4096];
    loop {
        let written = encoder.pull(&mut block);
        if let Some(on) = encoder.poll_ptt_change() {
            info!("ptt {}", if on { "on" } else { "off" });
        }
        if written == 0 {
            break;
        }
        samples.extend_from_slice(&block[..written]);
    }

    println!(
        "Encoded {} call {} to {} audio samples",
        protocol_name,
        call_label,
        samples.len()
    );

    write_wav(output_path, &samples, sample_rate)?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn decode_command(
    input_path: &PathBuf,
    mut config: DecoderConfig,
    chunk_size: usize,
    json: bool,
    gated_output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, sample_rate) = read_wav(input_path)?;
    println!("Extracted {} samples", samples.len());

    config.sample_rate = sample_rate;
    let mut decoder = SelcallDecoder::new(config)?;

    let chunk_size = chunk_size.max(1);
    let mut gated: Vec<f32> = Vec::new();
    let mut call_count = 0usize;

    for chunk in samples.chunks(chunk_size) {
        let output = decoder.process(chunk);

        for event in output.events {
            match event {
                DecoderEvent::Message(message) => {
                    call_count += 1;
                    if json {
                        let record = CallRecord {
                            source_tag: message.source_tag,
                            timestamp: message.timestamp,
                            protocol: message.protocol,
                            gate_active: message.gate_active,
                            code: &message.code,
                        };
                        println!("{}", serde_json::to_string(&record)?);
                    } else {
                        println!("{} call {}", message.protocol, message.code);
                    }
                }
                DecoderEvent::GateOpened => println!("Gate opened"),
                DecoderEvent::GateClosed => println!("Gate closed"),
            }
        }

        if gated_output.is_some() {
            if output.pass_through {
                gated.extend_from_slice(chunk);
            } else {
                gated.resize(gated.len() + chunk.len(), 0.0);
            }
        }
    }

    println!("Decoded {} call(s)", call_count);

    if let Some(path) = gated_output {
        write_wav(path, &gated, sample_rate)?;
        println!("Wrote gated audio to {}", path.display());
    }

    Ok(())
}

fn ring_command(
    output_path: &PathBuf,
    config: RingerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let sample_rate = config.sample_rate;
    let total = (sample_rate as f64 * config.duration_secs) as usize;

    let mut ringer = SelcallRinger::new(config)?;
    ringer.trigger();
    if let Some(on) = ringer.poll_led_change() {
        info!("led {}", if on { "on" } else { "off" });
    }

    let mut samples = vec![0.0f32; total];
    let written = ringer.fill(&mut samples);
    if let Some(on) = ringer.poll_led_change() {
        info!("led {}", if on { "on" } else { "off" });
    }
    println!("Generated {} siren samples", written);

    write_wav(output_path, &samples, sample_rate)?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn read_wav(path: &PathBuf) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = hound::WavReader::new(file)?;

    let spec = reader.spec();
    println!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    // Extract samples (handle both 16-bit and 32-bit float formats)
    let samples: Vec<f32> = match spec.bits_per_sample {
        16 => {
            let int_samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            int_samples?
                .into_iter()
                .map(|s| s as f32 / 32768.0)
                .collect()
        }
        32 => {
            let float_samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            float_samples?
        }
        _ => {
            return Err(CliError::UnsupportedBitDepth(spec.bits_per_sample).into());
        }
    };

    // Fold interleaved channels down to mono
    let samples = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok((samples, spec.sample_rate))
}

fn write_wav(
    path: &PathBuf,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;

    // Clamp to [-1.0, 1.0] range to avoid overflow, then scale to i16
    for &sample in samples {
        let clamped = sample.max(-1.0).min(1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}
