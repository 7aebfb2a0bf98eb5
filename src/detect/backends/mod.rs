pub mod color;

pub use color::{ColorScanner, TargetColor};
