mod backend;
mod backends;
mod region;

pub use backend::TargetDetector;
pub use backends::{ColorScanner, TargetColor};
pub use region::{BoundaryLayout, BoundaryTable, Region};
