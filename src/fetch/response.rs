//! Standardized response returned by handlers.

use http::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use super::{Body, Headers, InvalidHeader};

/// Response value produced by a handler.
///
/// The adapter only reads from it while driving the outgoing sink.
#[derive(Debug)]
pub struct Response {
    status: u16,
    status_text: Option<String>,
    headers: Headers,
    body: Option<Body>,
}

impl Response {
    /// `200` with the given body.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            status: 200,
            status_text: None,
            headers: Headers::new(),
            body: Some(body.into()),
        }
    }

    /// A response with no body at all.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            status_text: None,
            headers: Headers::new(),
            body: None,
        }
    }

    /// `200` plain text response.
    pub fn text(body: impl Into<String>) -> Self {
        let mut response = Self::new(body.into());
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain;charset=UTF-8"));
        response
    }

    /// `200` JSON response.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut response = Self::new(body);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Replace any values of `name`.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, InvalidHeader> {
        self.headers.set(name, value)?;
        Ok(self)
    }

    /// Add a value to `name`, keeping earlier ones.
    pub fn append_header(mut self, name: &str, value: &str) -> Result<Self, InvalidHeader> {
        self.headers.append(name, value)?;
        Ok(self)
    }

    pub fn with_body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Body> {
        self.body
    }

    pub fn into_parts(self) -> (u16, Option<String>, Headers, Option<Body>) {
        (self.status, self.status_text, self.headers, self.body)
    }
}
