//! process_image - ball chaser decision daemon
//!
//! This daemon:
//! 1. Captures frames from the configured source on a capture thread
//! 2. Hands the newest frame to the decision loop (older frames are dropped)
//! 3. Scans each frame for the white target and classifies its region
//! 4. Sends one motion command per frame to the motion controller
//! 5. Sends a stop command on shutdown

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use ball_chaser::{BallChaser, ChaserConfig, FrameSlot, FrameSource, RetryBackoff};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "BALL_CHASER_CONFIG")]
    config: Option<PathBuf>,
    /// Override the frame source (stub://name, image file or directory).
    #[arg(long)]
    source: Option<String>,
    /// Override the motion controller URL (http(s)://, tcp://host:port, stub://).
    #[arg(long)]
    controller: Option<String>,
    /// Stop after this many decision cycles.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = ChaserConfig::load_from(args.config.as_deref())?;
    if let Some(source) = args.source {
        cfg.source.url = source;
    }
    if let Some(controller) = args.controller {
        cfg.controller_url = controller;
    }
    cfg.validate()?;

    let mut chaser = BallChaser::from_config(&cfg)?;

    let mut source = FrameSource::new(cfg.source.clone())?;
    source
        .connect()
        .with_context(|| format!("failed to connect frame source {}", cfg.source.url))?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            log::info!("shutdown requested");
            running.store(false, Ordering::SeqCst);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let slot = Arc::new(FrameSlot::new());
    let capture = {
        let slot = Arc::clone(&slot);
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("frame-capture".into())
            .spawn(move || capture_loop(source, &slot, &running))
            .context("failed to spawn capture thread")?
    };

    log::info!(
        "process_image running: source={} fps={}",
        cfg.source.url,
        cfg.source.target_fps
    );
    let stats = chaser.run(&slot, &running, args.max_frames);

    running.store(false, Ordering::SeqCst);
    slot.close();
    if capture.join().is_err() {
        log::error!("capture thread panicked");
    }

    if let Err(e) = chaser.stop() {
        log::error!("final stop command failed: {}", e);
    }
    log::info!(
        "process_image stopped after {} cycles ({} dispatched, {} failed)",
        stats.frames,
        stats.dispatched,
        stats.failures
    );
    Ok(())
}

fn capture_loop(mut source: FrameSource, slot: &FrameSlot, running: &AtomicBool) {
    let mut backoff = RetryBackoff::default();
    while running.load(Ordering::SeqCst) {
        match source.next_frame() {
            Ok(Some(frame)) => {
                if backoff.failures() > 0 {
                    log::info!("frame capture recovered after {} failures", backoff.failures());
                }
                backoff.on_success();
                slot.publish(frame);
            }
            Ok(None) => {
                log::info!("frame source exhausted");
                break;
            }
            Err(e) => {
                let delay = backoff.on_failure();
                log::warn!(
                    "frame capture failed ({} in a row), retrying in {} ms: {:#}",
                    backoff.failures(),
                    delay.as_millis(),
                    e
                );
                thread::sleep(delay);
            }
        }
    }
    let stats = source.stats();
    log::info!(
        "capture stopped: source={} frames={} healthy={}",
        stats.source,
        stats.frames_captured,
        source.is_healthy()
    );
    slot.close();
}
