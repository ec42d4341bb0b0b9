//! The live monitoring loop.
//!
//! [`MonitorSession`] ties the whole pipeline together: record one cycle off
//! the microphone, score it with the [`DetectionEngine`], print meter lines,
//! record the cycle in the capture history, and on an actionable verdict
//! persist the detection event and append an emergency alert.
//!
//! Per-cycle persistence failures are absorbed with an error log so a full
//! disk or a permissions hiccup never stops the watch.  The loop itself runs
//! until the process is terminated.

use anyhow::Result;

use crate::audio::{AudioClip, Microphone};
use crate::config::AppConfig;
use crate::detect::{DetectionEngine, FusedVerdict};
use crate::session::events::{CaptureHistory, DetectionEvent, EventLog};
use crate::session::meter::meter_line;
use crate::session::recorder::CycleRecorder;

// ---------------------------------------------------------------------------
// CycleOutcome
// ---------------------------------------------------------------------------

/// Result of processing one monitoring cycle.
#[derive(Debug)]
pub struct CycleOutcome {
    /// The fused verdict for this cycle.
    pub verdict: FusedVerdict,
    /// The persisted detection event, when the verdict was actionable and
    /// persistence succeeded.
    pub event: Option<DetectionEvent>,
}

// ---------------------------------------------------------------------------
// MonitorSession
// ---------------------------------------------------------------------------

/// Owns everything a live monitoring run needs besides the capture stream.
pub struct MonitorSession {
    engine: DetectionEngine,
    events: EventLog,
    history: CaptureHistory,
    config: AppConfig,
}

impl MonitorSession {
    /// Assemble a session from a ready engine and its side-effect sinks.
    pub fn new(
        engine: DetectionEngine,
        events: EventLog,
        history: CaptureHistory,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            events,
            history,
            config,
        }
    }

    /// Score one clip and apply every side effect of the verdict.
    ///
    /// This is the whole cycle minus recording, factored out so it can be
    /// driven with synthetic clips.  Persistence errors are logged and
    /// absorbed; the returned outcome then carries no event.
    pub fn process_clip(&mut self, clip: &AudioClip) -> CycleOutcome {
        let verdict = self.engine.score(clip);

        if let Err(err) = self.history.record(clip, verdict.energy_level) {
            log::error!("failed to update capture history: {err}");
        }

        let mut event = None;
        if verdict.actionable {
            match self.events.save_detection(clip, &verdict) {
                Ok(saved) => event = Some(saved),
                Err(err) => log::error!("failed to persist detection event: {err}"),
            }
            if let Err(err) = self.events.append_alert(verdict.ml_confidence) {
                log::error!("failed to append emergency alert: {err}");
            }
        }

        CycleOutcome { verdict, event }
    }

    /// Run the monitoring loop until the process is terminated (Ctrl+C).
    ///
    /// # Errors
    ///
    /// Fails only on capture setup — once the stream is up, every per-cycle
    /// error is absorbed and logged.
    pub fn run(&mut self) -> Result<()> {
        let mic = Microphone::open()?;
        let (tx, rx) = std::sync::mpsc::channel();
        let _stream = mic.start_stream(tx)?;

        let recorder = CycleRecorder::new(rx, mic.sample_rate());
        self.engine.reset();

        println!(
            "Monitoring started ({} Hz, {} channel{}). Press Ctrl+C to stop.",
            mic.sample_rate(),
            mic.channels(),
            if mic.channels() == 1 { "" } else { "s" }
        );
        log::info!(
            "monitor loop: cycle = {:.1}s, pause = {:.1}s",
            self.config.audio.cycle_secs,
            self.config.audio.pause_secs
        );

        loop {
            println!("\nListening...");
            let clip = recorder.record_cycle(self.config.audio.cycle_secs);
            let outcome = self.process_clip(&clip);

            self.print_cycle(&outcome);

            std::thread::sleep(std::time::Duration::from_secs_f32(
                self.config.audio.pause_secs.max(0.0),
            ));
        }
    }

    /// Print the meter lines for one cycle, plus the alert banner when the
    /// verdict was actionable.
    fn print_cycle(&self, outcome: &CycleOutcome) {
        let verdict = &outcome.verdict;
        println!(
            "ML Confidence:  {}",
            meter_line(
                verdict.ml_confidence,
                self.config.detector.confidence_threshold
            )
        );
        println!(
            "Energy Level:   {}",
            meter_line(verdict.energy_level, self.config.detector.energy_threshold)
        );

        if verdict.actionable {
            println!("{}", "!".repeat(50));
            println!(
                "SCREAM DETECTED  (confidence {:.2}, energy {:.2})",
                verdict.ml_confidence, verdict.energy_level
            );
            if let Some(event) = &outcome.event {
                println!("Recording saved: {}", event.audio_path.display());
            }
            println!("{}", "!".repeat(50));
        } else if verdict.detected {
            // Positive but inside the cooldown window.
            println!("(detection suppressed by cooldown)");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
