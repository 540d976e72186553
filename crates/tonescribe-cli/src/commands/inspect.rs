//! Inspect command implementation
//!
//! Validates a Standard MIDI File and prints its header, tracks and notes.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tonescribe_core::SmfValidator;

use super::json_output::{error_codes, InspectOutput, InspectReport, JsonError};

/// Notes listed per track in human output.
const MAX_LISTED_NOTES: usize = 32;

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(path: &Path, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(path)
    } else {
        run_human(path)
    }
}

fn read_report(path: &Path, data: &[u8]) -> Result<InspectReport> {
    let report = SmfValidator::validate(data)
        .with_context(|| format!("Invalid MIDI file: {}", path.display()))?;
    let hash = blake3::hash(data).to_hex().to_string();
    Ok(InspectReport::new(path.display().to_string(), hash, &report))
}

/// Run inspect with human-readable (colored) output
fn run_human(path: &Path) -> Result<ExitCode> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let report = read_report(path, &data)?;

    println!("{} {}", "Inspecting:".cyan().bold(), report.file);
    println!("  {} {} bytes", "Size:".dimmed(), report.file_size);
    println!("  {} {}", "Hash:".dimmed(), &report.hash[..16]);
    println!("  {} {}", "Format:".dimmed(), report.format);
    match report.ticks_per_quarter {
        Some(tpq) => println!("  {} {} ticks per quarter", "Division:".dimmed(), tpq),
        None => println!("  {} SMPTE", "Division:".dimmed()),
    }

    for (index, track) in report.tracks.iter().enumerate() {
        println!(
            "\n{} {} ({} bytes, {} events, {} ticks)",
            "Track".cyan().bold(),
            index,
            track.length,
            track.events,
            track.end_tick
        );
        for note in track.notes.iter().take(MAX_LISTED_NOTES) {
            println!(
                "  {:>8}  {:>6}  note {:>3}  vel {:>3}  ch {}",
                note.start, note.duration, note.note, note.velocity, note.channel
            );
        }
        if track.notes.len() > MAX_LISTED_NOTES {
            println!(
                "  {}",
                format!("... {} more notes", track.notes.len() - MAX_LISTED_NOTES).dimmed()
            );
        }
    }

    for warning in &report.warnings {
        println!("{}: {}", "warning".yellow(), warning);
    }
    Ok(ExitCode::SUCCESS)
}

/// Run inspect with machine-readable JSON output
fn run_json(path: &Path) -> Result<ExitCode> {
    let file = path.display().to_string();
    let (output, code) = match fs::read(path) {
        Err(e) => {
            let error = JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
                .with_file(file);
            (InspectOutput::failure(vec![error]), ExitCode::from(1))
        }
        Ok(data) => match read_report(path, &data) {
            Ok(report) => (InspectOutput::success(report), ExitCode::SUCCESS),
            Err(e) => {
                let error =
                    JsonError::new(error_codes::SMF_INVALID, format!("{:#}", e)).with_file(file);
                (InspectOutput::failure(vec![error]), ExitCode::from(1))
            }
        },
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}
