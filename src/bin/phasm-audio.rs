// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Command-line front end: hide, recover and size payloads in WAV files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use phasm_audio::stego::bits::bits_to_bytes;
use phasm_audio::{
    decode_file_bits, decode_file_bytes, decode_message, encode_message, encoded_path,
    file_capacity, StegoError, StegoParams,
};

#[derive(Parser, Debug)]
#[command(name = "phasm-audio", version, about = "Hide short text messages in WAV audio")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed a NUL-terminated text message.
    Encode {
        input: PathBuf,
        message: String,
        /// Output WAV (default: `<input stem>-encoded.wav`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recover a payload. Prints terminated text unless a length is given.
    Decode {
        input: PathBuf,
        #[command(flatten)]
        length: DecodeLength,
    },
    /// Report how much payload a file can carry.
    Capacity { input: PathBuf },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct DecodeLength {
    /// Recover exactly N bits, printed as 0/1.
    #[arg(long, value_name = "N")]
    bits: Option<usize>,
    /// Recover exactly N bytes, printed as hex.
    #[arg(long, value_name = "N")]
    bytes: Option<usize>,
}

fn run(cli: Cli) -> Result<(), StegoError> {
    match cli.command {
        Command::Encode { input, message, output } => {
            let output = output.unwrap_or_else(|| encoded_path(&input));
            let report = encode_message(&input, &output, &message)?;
            println!(
                "{}: {} bits embedded, {} silent blocks skipped",
                output.display(),
                report.bits_embedded,
                report.silent_blocks
            );
        }
        Command::Decode { input, length } => match (length.bits, length.bytes) {
            (Some(n), _) => {
                let bits = decode_file_bits(&input, n, &StegoParams::V1)?;
                let line: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
                println!("{line}");
                // Bit counts that form whole bytes are also shown as hex.
                if n % 8 == 0 && n > 0 {
                    println!("{}", hex(&bits_to_bytes(&bits)));
                }
            }
            (None, Some(n)) => println!("{}", hex(&decode_file_bytes(&input, n)?)),
            (None, None) => println!("{}", decode_message(&input)?),
        },
        Command::Capacity { input } => {
            let info = file_capacity(&input, &StegoParams::V1)?;
            println!(
                "{}: {} bits ({} text characters), {} of {} blocks active, {} tail frames",
                input.display(),
                info.bits(),
                info.text_bytes(),
                info.active_blocks,
                info.full_blocks,
                info.tail_frames
            );
        }
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
