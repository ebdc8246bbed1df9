//! Fakes shared by the unit tests

use crate::error::{ApiError, ApiResult, TransportErrorKind};
use crate::request::{Request, Response};
use crate::sender::{RetryLogger, Sender, Sleeper};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Transport that replays scripted outcomes, then a fallback
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<ApiResult<Response>>>,
    fallback: ApiResult<Response>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub(crate) fn always(outcome: ApiResult<Response>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(status: u16, body: &str) -> Self {
        Self::always(Ok(Response::new(status, body)))
    }

    /// Fail with a connection error `times` times, then answer `body`
    pub(crate) fn flaky(times: usize, body: &str) -> Self {
        let transport = Self::ok(200, body);
        for _ in 0..times {
            transport.push(Err(connect_error()));
        }
        transport
    }

    pub(crate) fn push(&self, outcome: ApiResult<Response>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> Request {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("transport was never called")
    }
}

#[async_trait]
impl Sender for ScriptedTransport {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub(crate) fn connect_error() -> ApiError {
    ApiError::transport(TransportErrorKind::Connect, "connection refused")
}

/// Logger that keeps every record
#[derive(Default)]
pub(crate) struct RecordingLogger {
    records: Mutex<Vec<(u32, ApiError)>>,
}

impl RecordingLogger {
    pub(crate) fn records(&self) -> Vec<(u32, ApiError)> {
        self.records.lock().unwrap().clone()
    }
}

impl RetryLogger for RecordingLogger {
    fn record(&self, attempt: u32, error: &ApiError) {
        self.records.lock().unwrap().push((attempt, error.clone()));
    }
}

/// Sleeper that records requested delays without waiting
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn wait(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
