use std::fmt;
use std::time::{Duration, Instant};

use crate::detect::Region;
use crate::motion::command::{command_for, MotionCommand};
use crate::transport::{DriveRequest, MotionController};

/// Default deadline for one controller call.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_millis(250);

/// Controller acknowledgement for a dispatched command.
#[derive(Clone, Debug, PartialEq)]
pub struct Ack {
    pub command: MotionCommand,
    /// Free-form feedback returned by the controller.
    pub feedback: String,
    pub latency: Duration,
}

/// Failure to deliver a motion command. The decision loop logs it and moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// Controller unreachable or the exchange broke down.
    Transport(String),
    /// No answer within the caller's deadline.
    Timeout { after: Duration },
    /// Controller answered but refused the command.
    Rejected(String),
}

impl DispatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Timeout { .. })
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Transport(msg) => write!(f, "transport failure: {msg}"),
            DispatchError::Timeout { after } => {
                write!(f, "no response within {} ms", after.as_millis())
            }
            DispatchError::Rejected(msg) => write!(f, "command rejected: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Sends one motion command per decision through an owned controller handle.
pub struct Dispatcher<C> {
    controller: C,
    timeout: Duration,
}

impl<C: MotionController> Dispatcher<C> {
    pub fn new(controller: C, timeout: Duration) -> Self {
        Self {
            controller,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Look up the command for `region` and send it.
    pub fn dispatch(&mut self, region: Region) -> Result<Ack, DispatchError> {
        let command = command_for(region);
        log::info!(
            "moving robot toward the target: region={} {}",
            region,
            command
        );
        self.send(command)
    }

    /// Send a command with a bounded wait.
    ///
    /// A response that arrives after the deadline is reported as a timeout.
    pub fn send(&mut self, command: MotionCommand) -> Result<Ack, DispatchError> {
        let request = DriveRequest::from(command);
        let started = Instant::now();
        let result = self.controller.call(&request, self.timeout);
        let latency = started.elapsed();

        let outcome = match result {
            Ok(_) if latency > self.timeout => Err(DispatchError::Timeout {
                after: self.timeout,
            }),
            Err(DispatchError::Transport(_)) if latency >= self.timeout => {
                Err(DispatchError::Timeout {
                    after: self.timeout,
                })
            }
            Ok(response) if !response.accepted => {
                Err(DispatchError::Rejected(response.msg_feedback))
            }
            Ok(response) => Ok(Ack {
                command,
                feedback: response.msg_feedback,
                latency,
            }),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            log::error!(
                "failed to call motion controller {}: {}",
                self.controller.name(),
                e
            );
        }
        outcome
    }
}
