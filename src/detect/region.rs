use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Horizontal zone of a detected target, one per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Left,
    Middle,
    Right,
    /// No target pixel in the frame (or the frame was rejected).
    NoTarget,
}

impl Region {
    pub fn is_visible(self) -> bool {
        !matches!(self, Region::NoTarget)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Left => write!(f, "left"),
            Region::Middle => write!(f, "middle"),
            Region::Right => write!(f, "right"),
            Region::NoTarget => write!(f, "none"),
        }
    }
}

/// Named slot-to-region layouts.
///
/// A row is split into three slots by byte offset: `[0, step/3)`,
/// `[step/3, 2*step/3)` and `[2*step/3, step)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLayout {
    /// Slots labelled left, right, middle.
    ///
    /// Known quirk: the second slot reports `Right` and the outermost slot
    /// reports `Middle`. Deployed steering gains were tuned against this
    /// labelling, so it stays the default.
    #[default]
    Legacy,
    /// Slots labelled left, middle, right in screen order.
    Spatial,
}

impl FromStr for BoundaryLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "spatial" => Ok(Self::Spatial),
            other => Err(anyhow!(
                "unknown boundary layout '{}': expected 'legacy' or 'spatial'",
                other
            )),
        }
    }
}

impl fmt::Display for BoundaryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Spatial => write!(f, "spatial"),
        }
    }
}

/// Mapping from the three horizontal slots of a row to regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryTable {
    slots: [Region; 3],
}

impl BoundaryTable {
    pub const LEGACY: Self = Self {
        slots: [Region::Left, Region::Right, Region::Middle],
    };

    pub const SPATIAL: Self = Self {
        slots: [Region::Left, Region::Middle, Region::Right],
    };

    pub const fn for_layout(layout: BoundaryLayout) -> Self {
        match layout {
            BoundaryLayout::Legacy => Self::LEGACY,
            BoundaryLayout::Spatial => Self::SPATIAL,
        }
    }

    /// Slot index (0, 1 or 2) of a byte offset `j` within a row of `step` bytes.
    pub fn slot(offset_in_row: usize, step: usize) -> usize {
        if offset_in_row < step / 3 {
            0
        } else if offset_in_row < 2 * step / 3 {
            1
        } else {
            2
        }
    }

    /// Region for a byte offset `j` within a row of `step` bytes.
    pub fn classify(&self, offset_in_row: usize, step: usize) -> Region {
        self.slots[Self::slot(offset_in_row, step)]
    }

    pub fn slots(&self) -> [Region; 3] {
        self.slots
    }
}

impl Default for BoundaryTable {
    fn default() -> Self {
        Self::for_layout(BoundaryLayout::default())
    }
}
