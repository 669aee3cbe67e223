// main.rs - Command-line WAV/AAC converter
use aac_wav_stream::*;
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  aac_wav encode <in.wav> <out.aac> [bitrate]
  aac_wav decode <in.aac> <out.wav>";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["encode", input, output] => encode(input, output, None),
        ["encode", input, output, bitrate] => match bitrate.parse::<u32>() {
            Ok(bitrate) => encode(input, output, Some(bitrate)),
            Err(_) => {
                eprintln!("invalid bitrate: {}\n{}", bitrate, USAGE);
                return ExitCode::from(2);
            }
        },
        ["decode", input, output] => decode(input, output),
        ["version"] => {
            println!("{}", version_info());
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(status = ?e.status_code(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

fn encode(input: &str, output: &str, bitrate: Option<u32>) -> Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);

    let mut config = EncoderConfig::default();
    if let Some(bitrate) = bitrate {
        config.bitrate = BitrateMode::Cbr(bitrate);
    }

    let start = Instant::now();
    let summary = encode_wav_stream::<FdkEncoder, _, _>(reader, writer, &mut config)?;
    info!(
        input,
        output,
        bytes = summary.total_bytes,
        frames = summary.total_frames,
        sample_rate = summary.sample_rate,
        channels = config.channels,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "encoded"
    );
    Ok(())
}

fn decode(input: &str, output: &str) -> Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);

    let start = Instant::now();
    let summary = decode_to_wav::<FdkDecoder, _, _>(reader, writer, &DecoderConfig::default())?;
    info!(
        input,
        output,
        bytes = summary.total_bytes,
        samples = summary.total_samples,
        sample_rate = summary.sample_rate,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "decoded"
    );
    Ok(())
}
