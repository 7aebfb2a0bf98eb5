//! Ball chaser
//!
//! Drives a camera robot toward a white target. Each decision cycle takes one
//! camera frame, finds the first pure-white pixel, classifies its horizontal
//! region and sends exactly one motion command to the motion controller.
//!
//! # Architecture
//!
//! The decision cycle is stateless:
//!
//! 1. **Scan**: `ColorScanner` walks the RGB8 buffer and classifies the first
//!    matching pixel through a named `BoundaryTable`.
//! 2. **Decide**: `command_for` maps the region to a fixed velocity pair.
//! 3. **Dispatch**: `Dispatcher` issues one bounded-timeout call to its
//!    `MotionController`.
//!
//! Malformed frames and dispatch failures are logged and counted; the loop
//! always moves on to the next frame.
//!
//! # Module Structure
//!
//! - `frame`: `Frame` buffer, integrity checks, newest-frame `FrameSlot`
//! - `detect`: `Region`, `BoundaryTable`, `TargetDetector`, `ColorScanner`
//! - `motion`: `MotionCommand`, velocity table, `Dispatcher`
//! - `transport`: `MotionController` and its HTTP, TCP and stub clients
//! - `ingest`: synthetic and image-file frame sources
//! - `chaser`: the decision loop
//! - `config`: file and environment configuration

pub mod chaser;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod motion;
pub mod transport;

pub use chaser::{BallChaser, CycleReport, CycleStats};
pub use config::ChaserConfig;
pub use detect::{BoundaryLayout, BoundaryTable, ColorScanner, Region, TargetColor, TargetDetector};
pub use frame::{Frame, FrameError, FrameSlot, SlotStats, BYTES_PER_PIXEL};
pub use ingest::{FrameSource, RetryBackoff, SourceConfig, SourceStats};
pub use motion::{command_for, Ack, DispatchError, Dispatcher, MotionCommand};
pub use transport::{
    connect_controller, ControllerEndpoint, DriveRequest, DriveResponse, MotionController,
    RecordingController, TcpController,
};
