//! Camera frame container and newest-frame intake slot.
//!
//! - `Frame`: one RGB8 camera image as a flat byte buffer with a row stride.
//! - `FrameError`: integrity failures detected before any pixel is indexed.
//! - `FrameSlot`: single-slot mailbox between the capture thread and the
//!   decision loop. A newer frame replaces an unconsumed older one.

use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Bytes per pixel for the RGB8 channel layout (red, green, blue, no alpha).
pub const BYTES_PER_PIXEL: usize = 3;

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// One camera frame: `height` rows of `step` bytes each, RGB8.
///
/// The buffer is private and only lent out read-only. Construction does not
/// validate the buffer against the declared dimensions because frames arrive
/// from an external source as-is; `Frame::validate` performs that check and
/// the scanner calls it before indexing.
pub struct Frame {
    data: Vec<u8>,
    height: u32,
    step: u32,
}

impl Frame {
    /// Wrap a raw buffer with its declared row count and row stride in bytes.
    pub fn new(data: Vec<u8>, height: u32, step: u32) -> Self {
        Self { data, height, step }
    }

    /// Build a tightly packed RGB8 frame (`step = width * 3`).
    pub fn rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        let step = width.saturating_mul(BYTES_PER_PIXEL as u32);
        Self::new(data, height, step)
    }

    /// All-black frame of the given pixel dimensions.
    pub fn black(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        Self::rgb8(width, height, vec![0u8; len])
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Row width in pixels.
    pub fn width(&self) -> u32 {
        self.step / BYTES_PER_PIXEL as u32
    }

    /// Read-only view of the raw buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes the declared dimensions cover (`height * step`).
    pub fn declared_len(&self) -> Result<usize, FrameError> {
        (self.height as usize)
            .checked_mul(self.step as usize)
            .ok_or(FrameError::DimensionOverflow {
                height: self.height,
                step: self.step,
            })
    }

    /// Check the buffer against the declared dimensions.
    ///
    /// Returns the number of bytes that may be scanned.
    pub fn validate(&self) -> Result<usize, FrameError> {
        if self.step as usize % BYTES_PER_PIXEL != 0 {
            return Err(FrameError::UnalignedStep { step: self.step });
        }
        let declared = self.declared_len()?;
        if self.data.len() < declared {
            return Err(FrameError::ShortBuffer {
                declared,
                actual: self.data.len(),
            });
        }
        Ok(declared)
    }

    /// Overwrite the pixel at (`row`, `col`). Used by synthetic sources and tests.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn put_pixel(&mut self, row: u32, col: u32, rgb: [u8; 3]) {
        let offset = row as usize * self.step as usize + col as usize * BYTES_PER_PIXEL;
        if let Some(px) = self.data.get_mut(offset..offset + BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgb);
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("height", &self.height)
            .field("step", &self.step)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A frame whose buffer does not match its declared dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer is shorter than `height * step`.
    ShortBuffer { declared: usize, actual: usize },
    /// Row stride is not a whole number of RGB8 pixels.
    UnalignedStep { step: u32 },
    /// `height * step` does not fit in `usize`.
    DimensionOverflow { height: u32, step: u32 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::ShortBuffer { declared, actual } => write!(
                f,
                "malformed frame: buffer holds {actual} bytes, dimensions declare {declared}"
            ),
            FrameError::UnalignedStep { step } => write!(
                f,
                "malformed frame: step {step} is not a multiple of {BYTES_PER_PIXEL}"
            ),
            FrameError::DimensionOverflow { height, step } => {
                write!(f, "malformed frame: {height} rows of {step} bytes overflow")
            }
        }
    }
}

impl std::error::Error for FrameError {}

// ----------------------------------------------------------------------------
// FrameSlot: newest-frame-wins intake
// ----------------------------------------------------------------------------

/// Intake counters for a `FrameSlot`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub published: u64,
    /// Frames overwritten before the decision loop took them.
    pub dropped: u64,
}

struct SlotState {
    frame: Option<Frame>,
    closed: bool,
    stats: SlotStats,
}

/// Single-slot mailbox between a frame producer and the decision loop.
///
/// There is no queue: publishing while a frame is still waiting replaces it,
/// so the consumer always sees the newest available frame.
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                frame: None,
                closed: false,
                stats: SlotStats::default(),
            }),
            ready: Condvar::new(),
        }
    }

    /// Store a frame, replacing any frame not yet taken.
    pub fn publish(&self, frame: Frame) {
        let mut state = self.lock();
        if state.frame.replace(frame).is_some() {
            state.stats.dropped += 1;
        }
        state.stats.published += 1;
        drop(state);
        self.ready.notify_one();
    }

    /// Wait up to `timeout` for a frame.
    ///
    /// Returns `None` on timeout, or once the slot is closed and empty.
    pub fn take(&self, timeout: Duration) -> Option<Frame> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.frame.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            state = match self.ready.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Mark the producer as finished and wake any waiter.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn stats(&self) -> SlotStats {
        self.lock().stats
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        // A panicking producer leaves the slot usable; the state is plain data.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn rgb8_frame_reports_dimensions() {
        let frame = Frame::black(4, 2);
        assert_eq!(frame.step(), 12);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.validate().unwrap(), 24);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let frame = Frame::new(vec![0u8; 10], 2, 9);
        assert_eq!(
            frame.validate().unwrap_err(),
            FrameError::ShortBuffer {
                declared: 18,
                actual: 10
            }
        );
    }

    #[test]
    fn unaligned_step_is_rejected() {
        let frame = Frame::new(vec![0u8; 40], 4, 10);
        assert_eq!(
            frame.validate().unwrap_err(),
            FrameError::UnalignedStep { step: 10 }
        );
    }

    #[test]
    fn longer_buffer_is_accepted() {
        let frame = Frame::new(vec![0u8; 30], 3, 9);
        assert_eq!(frame.validate().unwrap(), 27);
    }

    #[test]
    fn put_pixel_ignores_out_of_range() {
        let mut frame = Frame::black(2, 2);
        frame.put_pixel(1, 1, [255, 255, 255]);
        frame.put_pixel(5, 5, [255, 255, 255]);
        assert_eq!(&frame.pixels()[9..12], &[255, 255, 255]);
        assert_eq!(frame.pixels().iter().filter(|&&b| b == 255).count(), 3);
    }

    #[test]
    fn slot_keeps_only_newest_frame() {
        let slot = FrameSlot::new();
        slot.publish(Frame::black(1, 1));
        slot.publish(Frame::black(2, 1));
        slot.publish(Frame::black(3, 1));

        let frame = slot.take(Duration::from_millis(10)).expect("frame");
        assert_eq!(frame.width(), 3);
        assert!(slot.take(Duration::from_millis(10)).is_none());

        let stats = slot.stats();
        assert_eq!(stats.published, 3);
        assert_eq!(stats.dropped, 2);
    }

    #[test]
    fn slot_take_times_out_when_empty() {
        let slot = FrameSlot::new();
        let start = Instant::now();
        assert!(slot.take(Duration::from_millis(20)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn slot_close_wakes_waiting_consumer() {
        let slot = Arc::new(FrameSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.close();
            })
        };
        assert!(slot.take(Duration::from_secs(5)).is_none());
        assert!(slot.is_closed());
        producer.join().unwrap();
    }

    #[test]
    fn slot_hands_over_frame_across_threads() {
        let slot = Arc::new(FrameSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.publish(Frame::black(5, 5)))
        };
        let frame = slot.take(Duration::from_secs(5)).expect("frame");
        assert_eq!(frame.height(), 5);
        producer.join().unwrap();
    }
}
