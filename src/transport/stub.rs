use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{DriveRequest, DriveResponse, MotionController};
use crate::motion::DispatchError;

/// Shared record of the requests a `RecordingController` received.
///
/// Unbounded by default; a capacity keeps only the newest requests while
/// `total()` still counts every call.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<CallRecord>>);

#[derive(Debug, Default)]
struct CallRecord {
    requests: VecDeque<DriveRequest>,
    capacity: Option<usize>,
    total: u64,
}

impl CallLog {
    fn bounded(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(CallRecord {
            requests: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            total: 0,
        })))
    }

    /// Retained requests, oldest first.
    pub fn snapshot(&self) -> Vec<DriveRequest> {
        self.lock().requests.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().requests.is_empty()
    }

    pub fn last(&self) -> Option<DriveRequest> {
        self.lock().requests.back().copied()
    }

    /// Calls received, including any no longer retained.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    fn push(&self, request: DriveRequest) {
        let mut record = self.lock();
        record.total += 1;
        if record.capacity == Some(0) {
            return;
        }
        if record.capacity == Some(record.requests.len()) {
            record.requests.pop_front();
        }
        record.requests.push_back(request);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CallRecord> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-process controller that accepts and records every command.
///
/// Scripted results are returned in order before falling back to acceptance.
/// An optional latency simulates a slow controller.
#[derive(Debug, Default)]
pub struct RecordingController {
    calls: CallLog,
    script: VecDeque<Result<DriveResponse, DispatchError>>,
    latency: Duration,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the newest `capacity` requests. Used for long-running dry
    /// runs, where nothing drains the log.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            calls: CallLog::bounded(capacity),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue the result for a future call.
    pub fn push_result(&mut self, result: Result<DriveResponse, DispatchError>) {
        self.script.push_back(result);
    }

    /// Handle to the call record that stays valid after the controller moves.
    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }
}

impl MotionController for RecordingController {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn call(
        &mut self,
        request: &DriveRequest,
        _timeout: Duration,
    ) -> Result<DriveResponse, DispatchError> {
        self.calls.push(*request);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.script.pop_front().unwrap_or_else(|| {
            Ok(DriveResponse::accepted(format!(
                "linear_x={} angular_z={}",
                request.linear_x, request.angular_z
            )))
        })
    }
}
