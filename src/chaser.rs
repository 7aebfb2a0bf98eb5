//! Decision loop: one frame in, one motion command out.
//!
//! Each cycle scans a single frame and dispatches exactly one command derived
//! from that frame's region. Nothing carries over between cycles except the
//! counters in `CycleStats`. Cycle failures are logged and counted, never
//! propagated: the next frame always gets its turn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::ChaserConfig;
use crate::detect::{ColorScanner, Region, TargetDetector};
use crate::frame::{Frame, FrameError, FrameSlot};
use crate::motion::{command_for, Ack, DispatchError, Dispatcher, MotionCommand};
use crate::transport::{connect_controller, MotionController};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);
const FRAME_WAIT: Duration = Duration::from_millis(100);

/// Outcome of one decision cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub region: Region,
    pub command: MotionCommand,
    pub outcome: Result<Ack, DispatchError>,
    /// Set when the frame was rejected and the cycle decided `NoTarget`.
    pub malformed: Option<FrameError>,
}

/// Running counters across cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub frames: u64,
    pub malformed: u64,
    pub dispatched: u64,
    pub failures: u64,
    pub timeouts: u64,
}

pub struct BallChaser<D, C> {
    detector: D,
    dispatcher: Dispatcher<C>,
    stats: CycleStats,
}

impl BallChaser<ColorScanner, Box<dyn MotionController>> {
    /// Color scanner plus the controller named by the configuration.
    pub fn from_config(cfg: &ChaserConfig) -> Result<Self> {
        let endpoint = cfg.controller_endpoint()?;
        let controller = connect_controller(&endpoint)?;
        log::info!(
            "motion controller {} (timeout {} ms), boundary layout {}",
            endpoint,
            cfg.dispatch_timeout.as_millis(),
            cfg.boundary_layout
        );
        Ok(Self::new(
            ColorScanner::with_layout(cfg.boundary_layout),
            Dispatcher::new(controller, cfg.dispatch_timeout),
        ))
    }
}

impl<D: TargetDetector, C: MotionController> BallChaser<D, C> {
    pub fn new(detector: D, dispatcher: Dispatcher<C>) -> Self {
        Self {
            detector,
            dispatcher,
            stats: CycleStats::default(),
        }
    }

    /// Scan one frame and dispatch its command.
    pub fn run_cycle(&mut self, frame: &Frame) -> CycleReport {
        self.stats.frames += 1;

        let (region, malformed) = match self.detector.try_scan(frame) {
            Ok(region) => (region, None),
            Err(e) => {
                log::warn!(
                    "frame #{} rejected by {}: {}",
                    self.stats.frames,
                    self.detector.name(),
                    e
                );
                self.stats.malformed += 1;
                (Region::NoTarget, Some(e))
            }
        };
        log::debug!("frame #{}: region={}", self.stats.frames, region);

        let outcome = self.dispatcher.dispatch(region);
        match &outcome {
            Ok(_) => self.stats.dispatched += 1,
            Err(e) => {
                self.stats.failures += 1;
                if e.is_timeout() {
                    self.stats.timeouts += 1;
                }
            }
        }

        CycleReport {
            region,
            command: command_for(region),
            outcome,
            malformed,
        }
    }

    /// Run cycles on frames taken from `slot` until the slot closes, `running`
    /// is cleared, or `max_frames` cycles have run.
    pub fn run(
        &mut self,
        slot: &FrameSlot,
        running: &AtomicBool,
        max_frames: Option<u64>,
    ) -> CycleStats {
        let mut last_health_log = Instant::now();
        let start_frames = self.stats.frames;

        while running.load(Ordering::SeqCst) {
            if max_frames.is_some_and(|max| self.stats.frames - start_frames >= max) {
                break;
            }
            match slot.take(FRAME_WAIT) {
                Some(frame) => {
                    self.run_cycle(&frame);
                }
                None if slot.is_closed() => break,
                None => {}
            }

            if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
                self.log_health(slot);
                last_health_log = Instant::now();
            }
        }
        self.log_health(slot);
        self.stats
    }

    /// Send the stop command outside the frame cycle (shutdown path).
    pub fn stop(&mut self) -> Result<Ack, DispatchError> {
        self.dispatcher.send(MotionCommand::STOP)
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    fn log_health(&self, slot: &FrameSlot) {
        let intake = slot.stats();
        log::info!(
            "cycles={} dispatched={} failures={} timeouts={} malformed={} published={} dropped={}",
            self.stats.frames,
            self.stats.dispatched,
            self.stats.failures,
            self.stats.timeouts,
            self.stats.malformed,
            intake.published,
            intake.dropped
        );
    }
}
