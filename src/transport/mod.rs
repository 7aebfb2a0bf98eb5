//! Motion controller transports.
//!
//! The dispatcher talks to the motion controller through `MotionController`,
//! a blocking request/response call with a caller-imposed deadline. This
//! module provides:
//! - HTTP JSON controller (feature: controller-http)
//! - Line-delimited JSON over TCP
//! - In-process recording controller (`stub://`), for dry runs and tests

mod endpoint;
#[cfg(feature = "controller-http")]
pub mod http;
pub mod stub;
pub mod tcp;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::motion::{DispatchError, MotionCommand};

pub use endpoint::{connect_controller, ControllerEndpoint};
#[cfg(feature = "controller-http")]
pub use http::HttpController;
pub use stub::{CallLog, RecordingController};
pub use tcp::TcpController;

/// Wire request carrying one motion command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriveRequest {
    /// Forward velocity.
    pub linear_x: f32,
    /// Turn rate about the vertical axis.
    pub angular_z: f32,
}

impl DriveRequest {
    pub fn new(linear_x: f32, angular_z: f32) -> Self {
        Self {
            linear_x,
            angular_z,
        }
    }
}

impl From<MotionCommand> for DriveRequest {
    fn from(command: MotionCommand) -> Self {
        Self::new(command.forward, command.turn)
    }
}

/// Wire response from the motion controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveResponse {
    #[serde(default = "accepted_by_default")]
    pub accepted: bool,
    #[serde(default)]
    pub msg_feedback: String,
}

fn accepted_by_default() -> bool {
    true
}

impl DriveResponse {
    pub fn accepted(msg_feedback: impl Into<String>) -> Self {
        Self {
            accepted: true,
            msg_feedback: msg_feedback.into(),
        }
    }

    /// Parse a response body. An empty body is an acceptance without feedback.
    pub fn parse(body: &str) -> Result<Self, DispatchError> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(Self::accepted(""));
        }
        serde_json::from_str(body)
            .map_err(|e| DispatchError::Transport(format!("invalid controller response: {e}")))
    }
}

/// Blocking request/response call to the motion controller.
///
/// Implementations must return within roughly `timeout`: transports apply it
/// to their connect, write and read operations. The dispatcher treats any
/// answer arriving after the deadline as a timeout.
pub trait MotionController: Send {
    /// Transport identifier, used in logs.
    fn name(&self) -> &'static str;

    fn call(
        &mut self,
        request: &DriveRequest,
        timeout: Duration,
    ) -> Result<DriveResponse, DispatchError>;
}

impl<T: MotionController + ?Sized> MotionController for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn call(
        &mut self,
        request: &DriveRequest,
        timeout: Duration,
    ) -> Result<DriveResponse, DispatchError> {
        (**self).call(request, timeout)
    }
}
