use crate::detect::region::Region;
use crate::frame::{Frame, FrameError};

/// Target detector seam used by the decision loop.
///
/// Implementations receive the frame by shared reference for the duration of
/// one call and must not retain it. Detection is a pure function of the frame:
/// scanning the same frame twice yields the same region.
pub trait TargetDetector: Send {
    /// Detector identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Locate the target, rejecting frames whose buffer does not match the
    /// declared dimensions.
    fn try_scan(&self, frame: &Frame) -> Result<Region, FrameError>;

    /// Locate the target. Malformed frames decide `Region::NoTarget`.
    fn scan(&self, frame: &Frame) -> Region {
        match self.try_scan(frame) {
            Ok(region) => region,
            Err(e) => {
                log::warn!("{}: {}; treating as no target", self.name(), e);
                Region::NoTarget
            }
        }
    }
}
