//! Application entry point — scream-watch.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the CLI (`monitor` is the default command).
//! 3. Load [`AppConfig`] from disk (the defaults are written on first run).
//! 4. Load the model artifact — a missing or corrupt artifact is fatal; the
//!    system never runs on the heuristic alone.
//! 5. Run the selected command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

use scream_watch::config::{AppConfig, AppPaths};
use scream_watch::detect::{DetectionEngine, ModelDetector};
use scream_watch::session::{
    analyze_file, meter_line, CaptureHistory, EventLog, MonitorSession,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "scream-watch", version, about = "Microphone scream detector")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the default microphone in fixed cycles (default).
    Monitor,
    /// Score a WAV file with the same engine the monitor uses.
    Analyze {
        /// Path to the WAV file.
        file: std::path::PathBuf,
    },
    /// Show past detection events and saved recordings.
    History,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let paths = AppPaths::new();
    let config = AppConfig::load_or_init(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load settings ({e}); using defaults");
        AppConfig::default()
    });

    match cli.command.unwrap_or(Command::Monitor) {
        Command::Monitor => {
            let engine = build_engine(&config, &paths)?;
            let events = EventLog::new(
                &paths.detections_audio_dir,
                &paths.detection_log_file,
                &paths.emergency_log_file,
            );
            let history =
                CaptureHistory::new(&paths.capture_history_file, config.history.max_entries);

            let mut session = MonitorSession::new(engine, events, history, config);
            session.run()
        }
        Command::Analyze { file } => {
            let mut engine = build_engine(&config, &paths)?;
            let report = analyze_file(&mut engine, &file)
                .with_context(|| format!("failed to analyze {}", file.display()))?;

            println!("File:           {}", report.file_name);
            println!(
                "Duration:       {:.2} s @ {} Hz",
                report.duration_secs, report.sample_rate
            );
            println!("Peak Amplitude: {:.4}", report.peak);
            println!(
                "ML Confidence:  {}",
                meter_line(
                    report.verdict.ml_confidence,
                    config.detector.confidence_threshold
                )
            );
            println!(
                "Energy Level:   {}",
                meter_line(report.verdict.energy_level, config.detector.energy_threshold)
            );
            println!(
                "Verdict:        {}",
                if report.verdict.detected {
                    "SCREAM"
                } else {
                    "no scream"
                }
            );
            Ok(())
        }
        Command::History => {
            let events = EventLog::new(
                &paths.detections_audio_dir,
                &paths.detection_log_file,
                &paths.emergency_log_file,
            );

            match events.read_log()? {
                Some(log) => println!("{log}"),
                None => println!("No detection events recorded yet."),
            }

            let recordings = events.list_recordings()?;
            if !recordings.is_empty() {
                println!("Saved recordings ({}):", recordings.len());
                for rec in recordings {
                    println!("  {}  ({:.1} KB)", rec.file_name, rec.size_kb);
                }
            }
            Ok(())
        }
    }
}

/// Load the model artifact and assemble the detection engine.
///
/// A missing or corrupt artifact aborts startup — running heuristic-only
/// would silently change what a "detection" means.
fn build_engine(config: &AppConfig, paths: &AppPaths) -> Result<DetectionEngine> {
    let model = ModelDetector::load(&paths.model_file, config.detector.confidence_threshold)
        .with_context(|| {
            format!(
                "cannot start without model artifact at {}",
                paths.model_file.display()
            )
        })?;
    log::info!("model artifact loaded: {}", paths.model_file.display());

    Ok(DetectionEngine::new(
        config.detector.energy_threshold,
        model,
        Duration::from_secs_f32(config.detector.cooldown_secs.max(0.0)),
    ))
}
