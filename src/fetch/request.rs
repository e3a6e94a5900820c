//! Standardized request.

use http::Method;
use thiserror::Error;
use url::Url;

use super::{Body, BoxError, Headers};

/// A body was attached to a method that must not carry one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0} requests cannot have a body")]
pub struct BodyNotAllowed(pub Method);

/// Immutable request handed to a [`Handler`](super::Handler).
///
/// The body is present if and only if the method is neither GET nor HEAD.
#[derive(Debug)]
pub struct Request {
    url: Url,
    method: Method,
    headers: Headers,
    body: Option<Body>,
}

impl Request {
    /// A request without a body.
    pub fn new(url: Url, method: Method, headers: Headers) -> Self {
        Self {
            url,
            method,
            headers,
            body: None,
        }
    }

    /// Attach a body. GET and HEAD refuse one.
    pub fn with_body(mut self, body: Body) -> Result<Self, BodyNotAllowed> {
        if forbids_body(&self.method) {
            return Err(BodyNotAllowed(self.method));
        }
        self.body = Some(body);
        Ok(self)
    }

    /// Build from parts whose body presence was already decided by the method.
    pub(crate) fn from_parts(url: Url, method: Method, headers: Headers, body: Option<Body>) -> Self {
        debug_assert!(!(forbids_body(&method) && body.is_some()));
        Self {
            url,
            method,
            headers,
            body,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Take the body stream, leaving the request without one.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    pub fn into_body(self) -> Option<Body> {
        self.body
    }

    /// Read the whole body. A request without a body reads as empty.
    pub async fn bytes(self) -> Result<bytes::Bytes, BoxError> {
        match self.body {
            Some(body) => body.bytes().await,
            None => Ok(bytes::Bytes::new()),
        }
    }

    pub async fn text(self) -> Result<String, BoxError> {
        match self.body {
            Some(body) => body.text().await,
            None => Ok(String::new()),
        }
    }
}

/// GET and HEAD never carry a request body.
pub fn forbids_body(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}
