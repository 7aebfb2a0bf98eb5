//! Region-to-velocity decision and command dispatch.
//!
//! The velocity table is fixed at build time. Each decision selects exactly
//! one row and the dispatcher issues exactly one controller call for it.

mod command;
mod dispatcher;

pub use command::{command_for, MotionCommand};
pub use dispatcher::{Ack, DispatchError, Dispatcher, DEFAULT_DISPATCH_TIMEOUT};
