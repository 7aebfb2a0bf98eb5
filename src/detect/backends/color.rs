use crate::detect::backend::TargetDetector;
use crate::detect::region::{BoundaryLayout, BoundaryTable, Region};
use crate::frame::{Frame, FrameError, BYTES_PER_PIXEL};

/// Reference color a target pixel must match exactly on every channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetColor(pub [u8; 3]);

impl TargetColor {
    /// Maximum intensity on all channels.
    pub const WHITE: Self = Self([255, 255, 255]);

    pub fn matches(&self, pixel: &[u8]) -> bool {
        *pixel == self.0
    }
}

impl Default for TargetColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// First-match exact color scanner.
///
/// The buffer is walked as a flat run of pixels in row-major order; the scan
/// does not restart per row. The first matching pixel decides the region from
/// its byte offset within its row.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorScanner {
    target: TargetColor,
    boundaries: BoundaryTable,
}

impl ColorScanner {
    pub fn new(target: TargetColor, boundaries: BoundaryTable) -> Self {
        Self { target, boundaries }
    }

    pub fn with_layout(layout: BoundaryLayout) -> Self {
        Self::new(TargetColor::WHITE, BoundaryTable::for_layout(layout))
    }

    pub fn boundaries(&self) -> BoundaryTable {
        self.boundaries
    }

    /// Byte offset of the first matching pixel, if any.
    pub fn first_match(&self, frame: &Frame) -> Result<Option<usize>, FrameError> {
        let len = frame.validate()?;
        let offset = frame.pixels()[..len]
            .chunks_exact(BYTES_PER_PIXEL)
            .position(|px| self.target.matches(px))
            .map(|index| index * BYTES_PER_PIXEL);
        Ok(offset)
    }
}

impl TargetDetector for ColorScanner {
    fn name(&self) -> &'static str {
        "color"
    }

    fn try_scan(&self, frame: &Frame) -> Result<Region, FrameError> {
        let step = frame.step() as usize;
        match self.first_match(frame)? {
            Some(offset) => Ok(self.boundaries.classify(offset % step, step)),
            None => Ok(Region::NoTarget),
        }
    }
}
