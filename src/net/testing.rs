//! In-memory sink used by unit tests.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};

use super::sink::{Completion, ResponseSink, SinkError, SinkState};
use crate::fetch::BoxError;

/// Records every call made against it.
#[derive(Debug)]
pub(crate) struct RecordingSink {
    pub state: SinkState,
    pub status: Option<(u16, Option<String>)>,
    /// One entry per header line that would go on the wire.
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Vec<u8>,
    pub writes: usize,
    pub end_calls: usize,
    pub writable: bool,
    pub aborted: Option<String>,
    completion: Completion,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            state: SinkState::Unstarted,
            status: None,
            headers: Vec::new(),
            body: Vec::new(),
            writes: 0,
            end_calls: 0,
            writable: true,
            aborted: None,
            completion: Completion::new(),
        }
    }

    pub fn header_lines(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(candidate, _)| candidate == name)
            .filter_map(|(_, value)| value.to_str().ok())
            .collect()
    }

    fn ensure_head_open(&self) -> Result<(), SinkError> {
        if self.state == SinkState::Unstarted {
            Ok(())
        } else {
            Err(SinkError::HeadersSent)
        }
    }
}

impl ResponseSink for RecordingSink {
    fn state(&self) -> SinkState {
        self.state
    }

    fn writable(&self) -> bool {
        self.writable && self.state != SinkState::Ended
    }

    fn set_status(&mut self, status: u16, text: Option<&str>) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.status = Some((status, text.map(str::to_owned)));
        Ok(())
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.headers.retain(|(candidate, _)| *candidate != name);
        self.headers.push((name, value));
        Ok(())
    }

    fn set_header_values(
        &mut self,
        name: HeaderName,
        values: Vec<HeaderValue>,
    ) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.headers.retain(|(candidate, _)| *candidate != name);
        self.headers
            .extend(values.into_iter().map(|value| (name.clone(), value)));
        Ok(())
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        if self.state == SinkState::Ended {
            return Err(SinkError::WriteAfterEnd);
        }
        if !self.writable {
            return Err(SinkError::Closed);
        }
        self.state = SinkState::Streaming;
        self.writes += 1;
        self.body.extend_from_slice(&chunk);
        Ok(())
    }

    fn end(&mut self) {
        self.end_calls += 1;
        self.state = SinkState::Ended;
        self.completion.complete(Ok(()));
    }

    fn abort(&mut self, reason: BoxError) {
        self.aborted = Some(reason.to_string());
        self.state = SinkState::Ended;
        self.completion.complete(Err(SinkError::Aborted(reason)));
    }

    fn completion(&self) -> Completion {
        self.completion.clone()
    }
}
