//! Synthetic frame source for `stub://` URLs.
//!
//! Renders a white disc on a black background. The disc sweeps from the left
//! edge to the right edge over `SWEEP_FRAMES` frames, then stays out of view
//! for `HIDDEN_FRAMES` frames, and the cycle repeats.

use anyhow::{anyhow, Result};

use super::{Pacer, SourceConfig, SourceStats};
use crate::frame::Frame;

pub const SWEEP_FRAMES: u64 = 30;
pub const HIDDEN_FRAMES: u64 = 10;

const BALL: [u8; 3] = [255, 255, 255];

pub struct SyntheticSource {
    config: SourceConfig,
    frame_count: u64,
    pacer: Pacer,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(config: SourceConfig) -> Self {
        let pacer = Pacer::new(config.target_fps);
        Self {
            config,
            frame_count: 0,
            pacer,
            connected: false,
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        if self.config.width == 0 || self.config.height == 0 {
            return Err(anyhow!(
                "synthetic source needs non-zero dimensions, got {}x{}",
                self.config.width,
                self.config.height
            ));
        }
        log::info!(
            "SyntheticSource: connected to {} ({}x{} @ {} fps)",
            self.config.url,
            self.config.width,
            self.config.height,
            self.config.target_fps
        );
        self.connected = true;
        Ok(())
    }

    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if !self.connected {
            return Err(anyhow!(
                "synthetic source not connected; call connect() first"
            ));
        }
        self.pacer.wait();
        let frame = render(self.config.width, self.config.height, self.frame_count);
        self.frame_count += 1;
        Ok(Some(frame))
    }

    pub fn is_healthy(&self) -> bool {
        self.connected
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            source: self.config.url.clone(),
        }
    }
}

/// Render frame `index` of the sweep cycle.
pub fn render(width: u32, height: u32, index: u64) -> Frame {
    let mut frame = Frame::black(width, height);
    let phase = index % (SWEEP_FRAMES + HIDDEN_FRAMES);
    if phase >= SWEEP_FRAMES || width == 0 || height == 0 {
        return frame;
    }

    let (w, h) = (width as i64, height as i64);
    let radius = (w.min(h) / 10).max(1);
    let travel = (w - 2 * radius).max(0);
    let cx = radius + travel * phase as i64 / (SWEEP_FRAMES as i64 - 1);
    let cy = h / 2;

    for y in (cy - radius).max(0)..=(cy + radius).min(h - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(w - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius {
                frame.put_pixel(y as u32, x as u32, BALL);
            }
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundaryLayout, ColorScanner, Region, TargetDetector};

    #[test]
    fn ball_sweeps_left_to_right_then_hides() {
        let scanner = ColorScanner::with_layout(BoundaryLayout::Spatial);
        assert_eq!(scanner.scan(&render(640, 480, 0)), Region::Left);
        assert_eq!(scanner.scan(&render(640, 480, 15)), Region::Middle);
        assert_eq!(scanner.scan(&render(640, 480, 29)), Region::Right);
        assert_eq!(scanner.scan(&render(640, 480, 35)), Region::NoTarget);
        // next cycle starts on the left again
        assert_eq!(scanner.scan(&render(640, 480, 40)), Region::Left);
    }

    #[test]
    fn tiny_frames_still_render() {
        let frame = render(2, 2, 0);
        assert_eq!(frame.validate().unwrap(), 12);
        assert!(frame.pixels().contains(&255));
    }

    #[test]
    fn next_frame_requires_connect() {
        let mut source = SyntheticSource::new(SourceConfig::default());
        assert!(source.next_frame().is_err());
        assert!(!source.is_healthy());
    }

    #[test]
    fn zero_dimensions_fail_to_connect() {
        let mut source = SyntheticSource::new(SourceConfig {
            width: 0,
            ..SourceConfig::default()
        });
        assert!(source.connect().is_err());
    }

    #[test]
    fn counts_captured_frames() {
        let mut source = SyntheticSource::new(SourceConfig {
            target_fps: 0,
            width: 32,
            height: 24,
            ..SourceConfig::default()
        });
        source.connect().unwrap();
        for _ in 0..3 {
            source.next_frame().unwrap().expect("frame");
        }
        assert_eq!(source.stats().frames_captured, 3);
    }
}
