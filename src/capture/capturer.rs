use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context as _;
use crossbeam_channel::{Receiver, Sender};

use crate::capture::overlay::OverlayRenderer;
use crate::capture::staging::FrameStage;
use crate::capture::step::StepSlot;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::surface::event::DrawingSurface;

/// Options for [`FrameCapturer`].
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    /// Wall-clock interval between capture ticks.
    pub tick: Duration,
    /// Composite the step banner onto frames.
    pub overlay: bool,
    /// Per-session staging directory.
    pub staging_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1) / 30,
            overlay: true,
            staging_dir: PathBuf::from("temp_frames"),
        }
    }
}

impl CaptureConfig {
    /// Tick interval for a capture rate of `fps` frames per second.
    pub fn tick_for_fps(fps: u32) -> ReelResult<Duration> {
        if fps == 0 {
            return Err(ReelError::validation("capture fps must be non-zero"));
        }
        Ok(Duration::from_secs(1) / fps)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.tick.is_zero() {
            return Err(ReelError::validation("capture tick must be non-zero"));
        }
        Ok(())
    }
}

/// Frames written and ticks skipped, per bracket or per session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureReport {
    pub frames_written: u64,
    pub ticks_skipped: u64,
}

impl CaptureReport {
    fn absorb(&mut self, other: CaptureReport) {
        self.frames_written += other.frames_written;
        self.ticks_skipped += other.ticks_skipped;
    }
}

struct CaptureWorker {
    surface: Arc<dyn DrawingSurface>,
    step: StepSlot,
    overlay: Option<OverlayRenderer>,
    stage: FrameStage,
}

impl CaptureWorker {
    fn capture(&self, idx: FrameIndex) -> ReelResult<PathBuf> {
        let mut frame = self
            .surface
            .snapshot()
            .map_err(|e| ReelError::capture_tick(idx.0, e))?;
        if let Some(overlay) = &self.overlay {
            let info = self.step.current();
            overlay
                .composite(&mut frame, &info)
                .map_err(|e| ReelError::capture_tick(idx.0, e))?;
        }
        self.stage
            .write(idx, &frame)
            .map_err(|e| ReelError::capture_tick(idx.0, e))
    }
}

struct RunningBracket {
    stop_tx: Sender<()>,
    handle: JoinHandle<(FrameIndex, CaptureReport)>,
}

/// Samples the surface on a fixed tick in a background thread while a bracket is open.
///
/// Frame indices are strictly increasing and contiguous across all brackets of a session; a tick
/// that fails does not consume an index.
pub struct FrameCapturer {
    worker: Arc<CaptureWorker>,
    tick: Duration,
    next_index: FrameIndex,
    session: CaptureReport,
    running: Option<RunningBracket>,
}

impl FrameCapturer {
    pub fn new(
        surface: Arc<dyn DrawingSurface>,
        step: StepSlot,
        cfg: CaptureConfig,
    ) -> ReelResult<Self> {
        cfg.validate()?;
        let overlay = cfg.overlay.then(OverlayRenderer::new);
        Ok(Self {
            worker: Arc::new(CaptureWorker {
                surface,
                step,
                overlay,
                stage: FrameStage::new(cfg.staging_dir),
            }),
            tick: cfg.tick,
            next_index: FrameIndex(0),
            session: CaptureReport::default(),
            running: None,
        })
    }

    pub fn stage(&self) -> &FrameStage {
        &self.worker.stage
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Number of frames staged so far in this session.
    pub fn frame_count(&self) -> u64 {
        self.next_index.0
    }

    pub fn session_report(&self) -> CaptureReport {
        self.session
    }

    /// Clear the staging area and restart indexing at 0.
    pub fn begin_session(&mut self) -> ReelResult<()> {
        if self.is_running() {
            return Err(ReelError::validation(
                "cannot begin a capture session while a bracket is open",
            ));
        }
        self.worker.stage.prepare()?;
        self.next_index = FrameIndex(0);
        self.session = CaptureReport::default();
        tracing::info!(dir = %self.worker.stage.dir().display(), "capture session started");
        Ok(())
    }

    /// Take one frame synchronously, outside of any bracket.
    pub fn capture_now(&mut self) -> ReelResult<FrameIndex> {
        if self.is_running() {
            return Err(ReelError::validation(
                "capture_now is not allowed while a bracket is open",
            ));
        }
        let idx = self.next_index;
        if let Err(e) = self.worker.capture(idx) {
            self.session.ticks_skipped += 1;
            return Err(e);
        }
        self.next_index = idx.next();
        self.session.frames_written += 1;
        Ok(idx)
    }

    /// Open a capture bracket: spawn the tick thread.
    pub fn start(&mut self) -> ReelResult<()> {
        if self.is_running() {
            return Err(ReelError::validation("capture bracket already open"));
        }
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let worker = Arc::clone(&self.worker);
        let tick = self.tick;
        let first = self.next_index;
        let handle = std::thread::Builder::new()
            .name("frame-capture".to_owned())
            .spawn(move || tick_loop(&worker, tick, first, &stop_rx))
            .context("spawn frame capture thread")?;
        self.running = Some(RunningBracket { stop_tx, handle });
        tracing::debug!(
            tick_ms = tick.as_millis() as u64,
            first = first.0,
            "capture bracket opened"
        );
        Ok(())
    }

    /// Close the bracket and wait for the tick thread, including any in-flight capture.
    ///
    /// Stopping a capturer that is not running is a no-op.
    pub fn stop(&mut self) -> ReelResult<CaptureReport> {
        let Some(RunningBracket { stop_tx, handle }) = self.running.take() else {
            return Ok(CaptureReport::default());
        };
        let _ = stop_tx.send(());
        drop(stop_tx);
        let (next, report) = handle
            .join()
            .map_err(|_| ReelError::Other(anyhow::anyhow!("frame capture thread panicked")))?;
        self.next_index = next;
        self.session.absorb(report);
        tracing::debug!(
            frames = report.frames_written,
            skipped = report.ticks_skipped,
            "capture bracket closed"
        );
        Ok(report)
    }
}

impl Drop for FrameCapturer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "failed to stop frame capture on drop");
        }
    }
}

fn tick_loop(
    worker: &CaptureWorker,
    tick: Duration,
    mut next: FrameIndex,
    stop_rx: &Receiver<()>,
) -> (FrameIndex, CaptureReport) {
    let ticker = crossbeam_channel::tick(tick);
    let mut report = CaptureReport::default();
    loop {
        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                // A stop that raced this tick wins.
                if !stop_rx.is_empty() {
                    break;
                }
                match worker.capture(next) {
                    Ok(_) => {
                        next = next.next();
                        report.frames_written += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping capture tick");
                        report.ticks_skipped += 1;
                    }
                }
            }
        }
    }
    (next, report)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/capturer.rs"]
mod tests;
