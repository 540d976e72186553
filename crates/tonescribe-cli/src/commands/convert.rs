//! Convert command implementation
//!
//! Decodes a WAV file, runs the transcription pipeline and writes the
//! resulting Standard MIDI File next to the input (or to `--output`).

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tonescribe_core::{transcribe_with_progress, ConvertError, ConvertParams, TempoPolicy};

use super::json_output::{error_codes, ConvertOutput, ConvertReport, JsonError};
use super::EXIT_NO_TONAL_CONTENT;
use crate::audio::load_wav;
use crate::output::resolve_output_path;

/// Bin count used when neither `--bins` nor a config file sets one.
pub const DEFAULT_NUM_BINS: u32 = 12;

/// Message shown when the input has no detectable pitch.
pub const NO_TONAL_CONTENT: &str = "No tonal content detected.";

/// Options of the convert command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertOptions {
    /// Input WAV file
    pub input: PathBuf,
    /// Explicit output path
    pub output: Option<PathBuf>,
    /// Quantization bins
    pub bins: Option<u32>,
    /// Frame size in samples
    pub frame_size: Option<u32>,
    /// Hop in samples
    pub hop: Option<u32>,
    /// Playback speed for target-duration timing
    pub speed: Option<f32>,
    /// Use one tick per frame
    pub fixed: bool,
    /// JSON file holding `ConvertParams`
    pub config: Option<PathBuf>,
    /// Output machine-readable JSON
    pub json: bool,
}

/// Builds the pipeline parameters: config file first, then flags.
pub fn build_params(options: &ConvertOptions) -> Result<ConvertParams> {
    let mut params = match &options.config {
        Some(path) => load_config(path)?,
        None => ConvertParams::new(DEFAULT_NUM_BINS),
    };
    if let Some(bins) = options.bins {
        params.num_bins = bins;
    }
    if let Some(frame_size) = options.frame_size {
        params.frame_size = frame_size;
    }
    if let Some(hop) = options.hop {
        params.hop = hop;
    }
    if let Some(speed) = options.speed {
        params.tempo = TempoPolicy::TargetDuration { speed };
    } else if options.fixed {
        params.tempo = TempoPolicy::FixedPerFrame;
    }
    Ok(params)
}

fn load_config(path: &Path) -> Result<ConvertParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Why a conversion did not produce a file.
enum Failure {
    /// Anything outside the pipeline: I/O, decoding, config.
    Cli {
        code: &'static str,
        error: anyhow::Error,
    },
    /// A pipeline error.
    Convert(ConvertError),
}

/// Run the convert command
///
/// # Returns
/// Exit code: 0 on success, 1 on error, 2 when no tonal content was found
pub fn run(options: &ConvertOptions) -> Result<ExitCode> {
    if options.json {
        run_json(options)
    } else {
        run_human(options)
    }
}

/// Run convert with human-readable (colored) output
fn run_human(options: &ConvertOptions) -> Result<ExitCode> {
    println!("{} {}", "Converting:".cyan().bold(), options.input.display());

    let report = match execute(options, true) {
        Ok(report) => report,
        Err(Failure::Cli { error, .. }) => return Err(error),
        Err(Failure::Convert(err)) if err.is_no_tonal_content() => {
            println!("{}", NO_TONAL_CONTENT.yellow().bold());
            return Ok(ExitCode::from(EXIT_NO_TONAL_CONTENT));
        }
        Err(Failure::Convert(err)) => return Err(anyhow!(err)),
    };

    print_report(&report);
    Ok(ExitCode::SUCCESS)
}

/// Run convert with machine-readable JSON output
fn run_json(options: &ConvertOptions) -> Result<ExitCode> {
    let input = options.input.display().to_string();
    let (output, code) = match execute(options, false) {
        Ok(report) => (ConvertOutput::success(report), ExitCode::SUCCESS),
        Err(Failure::Cli { code, error }) => {
            let error = JsonError::new(code, format!("{:#}", error)).with_file(input);
            (ConvertOutput::failure(vec![error]), ExitCode::from(1))
        }
        Err(Failure::Convert(err)) => {
            let exit = if err.is_no_tonal_content() {
                ExitCode::from(EXIT_NO_TONAL_CONTENT)
            } else {
                ExitCode::from(1)
            };
            let error = JsonError::from(&err).with_file(input);
            (ConvertOutput::failure(vec![error]), exit)
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

fn execute(options: &ConvertOptions, show_progress: bool) -> Result<ConvertReport, Failure> {
    let params = build_params(options).map_err(|error| Failure::Cli {
        code: error_codes::CONFIG_PARSE,
        error,
    })?;
    log::info!("parameters: {:?}", params);

    if !options.input.exists() {
        return Err(Failure::Cli {
            code: error_codes::FILE_READ,
            error: anyhow!("Input file not found: {}", options.input.display()),
        });
    }
    let audio = load_wav(&options.input).map_err(|error| Failure::Cli {
        code: error_codes::AUDIO_DECODE,
        error,
    })?;
    if audio.channels > 1 {
        log::warn!(
            "{} has {} channels, analysing the first only",
            options.input.display(),
            audio.channels
        );
    }

    let mut last_percent = None;
    let result = transcribe_with_progress(&audio.samples, audio.sample_rate, &params, |p| {
        if show_progress && last_percent != Some(p.percent()) {
            last_percent = Some(p.percent());
            eprint!("\r  {} {:>3}%", "Analysing".dimmed(), p.percent());
        }
        ControlFlow::Continue(())
    });
    if show_progress && last_percent.is_some() {
        eprintln!();
    }
    let transcription = result.map_err(Failure::Convert)?;

    let output_path = resolve_output_path(&options.input, options.output.as_deref());
    fs::write(&output_path, &transcription.smf).map_err(|e| Failure::Cli {
        code: error_codes::FILE_WRITE,
        error: anyhow::Error::new(e)
            .context(format!("Failed to write MIDI file: {}", output_path.display())),
    })?;
    log::info!(
        "wrote {} bytes to {}",
        transcription.smf.len(),
        output_path.display()
    );

    Ok(ConvertReport::new(
        options.input.display().to_string(),
        output_path.display().to_string(),
        audio.sample_rate,
        audio.samples.len(),
        params.num_bins,
        &transcription,
    ))
}

fn print_report(report: &ConvertReport) {
    println!("{} {}", "Wrote:".green().bold(), report.output);
    println!(
        "  {} {} ({} with pitch)",
        "Frames:".dimmed(),
        report.frames,
        report.pitched_frames
    );
    println!(
        "  {} {:.2} - {:.2}",
        "Pitch range:".dimmed(),
        report.min_pitch,
        report.max_pitch
    );
    println!(
        "  {} {} over {} distinct levels ({} bins)",
        "Notes:".dimmed(),
        report.notes,
        report.unique_levels.len(),
        report.num_bins
    );
    println!("  {} {}", "Ticks per frame:".dimmed(), report.ticks_per_frame);
    println!("  {} {}", "Bytes:".dimmed(), report.bytes);
    println!("  {} {}", "Hash:".dimmed(), &report.hash[..16]);
}
