//! tonescribe CLI - Command-line interface for audio-to-melody transcription
//!
//! This binary converts WAV recordings into single-track MIDI melodies and
//! inspects the MIDI files it writes.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

// Use modules from the library crate
use tonescribe_cli::commands;
use tonescribe_cli::commands::convert::ConvertOptions;

/// tonescribe - Audio to MIDI Melody Transcription
#[derive(Parser)]
#[command(name = "tonescribe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a WAV file into a MIDI melody
    Convert {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output MIDI path (default: input path with a .mid extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of quantization bins (default: 12)
        #[arg(long)]
        bins: Option<u32>,

        /// Analysis frame size in samples (default: 2048)
        #[arg(long)]
        frame_size: Option<u32>,

        /// Hop between frames in samples (default: 1024)
        #[arg(long)]
        hop: Option<u32>,

        /// Stretch notes so the melody lasts as long as the audio divided by this speed
        #[arg(long, conflicts_with = "fixed")]
        speed: Option<f32>,

        /// Use one tick per frame (the default unless a config says otherwise)
        #[arg(long)]
        fixed: bool,

        /// JSON file with conversion parameters; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a MIDI file and print its structure
    Inspect {
        /// Path to the MIDI file
        #[arg(short, long)]
        input: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Log filter for a `-v` count.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(cli.verbose)))
        .init();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            bins,
            frame_size,
            hop,
            speed,
            fixed,
            config,
            json,
        } => commands::convert::run(&ConvertOptions {
            input,
            output,
            bins,
            frame_size,
            hop,
            speed,
            fixed,
            config,
            json,
        }),
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
