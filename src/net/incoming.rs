//! Incoming connection record.
//!
//! # Responsibilities
//! - Capture method, request-target, headers and body of one request
//! - Group repeated header lines into a single list-valued entry
//! - Never mutate what the transport handed over

use http::header::HOST;
use http::Method;

/// Header value as the socket layer reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeHeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl NativeHeaderValue {
    /// First value, for headers that are meaningful only once (e.g. `host`).
    pub fn first(&self) -> Option<&str> {
        match self {
            NativeHeaderValue::Single(value) => Some(value),
            NativeHeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

/// One request as received from the transport.
///
/// Header names are lower-case. An entry whose value could not be decoded
/// is kept with an absent value.
pub struct IncomingRecord<B> {
    pub method: Method,
    pub target: Option<String>,
    pub headers: Vec<(String, Option<NativeHeaderValue>)>,
    pub body: B,
}

impl<B> IncomingRecord<B> {
    /// Split an `http::Request` into a record.
    ///
    /// HTTP/2 requests carry their authority in the URI; it is recorded as a
    /// `host` header when no explicit one arrived.
    pub fn from_request(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();

        let mut headers = Vec::with_capacity(parts.headers.keys_len() + 1);
        for name in parts.headers.keys() {
            let mut values: Vec<String> = parts
                .headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok().map(str::to_owned))
                .collect();
            let value = match values.len() {
                0 => None,
                1 => values.pop().map(NativeHeaderValue::Single),
                _ => Some(NativeHeaderValue::Multiple(values)),
            };
            headers.push((name.as_str().to_owned(), value));
        }

        if !parts.headers.contains_key(HOST) {
            if let Some(authority) = parts.uri.authority() {
                headers.push((
                    HOST.as_str().to_owned(),
                    Some(NativeHeaderValue::Single(authority.as_str().to_owned())),
                ));
            }
        }

        Self {
            method: parts.method,
            target: parts.uri.path_and_query().map(|pq| pq.as_str().to_owned()),
            headers,
            body,
        }
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&NativeHeaderValue> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn groups_repeated_headers() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/items?page=2")
            .header("Cookie", "a=1")
            .header("cookie", "b=2")
            .header("Accept", "text/html")
            .body(())
            .unwrap();

        let record = IncomingRecord::from_request(request);
        assert_eq!(record.method, Method::POST);
        assert_eq!(record.target.as_deref(), Some("/items?page=2"));
        assert_eq!(
            record.header("cookie"),
            Some(&NativeHeaderValue::Multiple(vec!["a=1".into(), "b=2".into()]))
        );
        assert_eq!(
            record.header("ACCEPT"),
            Some(&NativeHeaderValue::Single("text/html".into()))
        );
    }

    #[test]
    fn undecodable_value_is_absent() {
        let mut request = http::Request::new(());
        request
            .headers_mut()
            .insert("x-raw", HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());

        let record = IncomingRecord::from_request(request);
        assert_eq!(record.headers, vec![("x-raw".to_string(), None)]);
        assert_eq!(record.header("x-raw"), None);
    }

    #[test]
    fn authority_becomes_host() {
        let request = http::Request::builder()
            .uri("https://example.com:8443/path")
            .body(())
            .unwrap();

        let record = IncomingRecord::from_request(request);
        assert_eq!(record.target.as_deref(), Some("/path"));
        assert_eq!(
            record.header("host").and_then(NativeHeaderValue::first),
            Some("example.com:8443")
        );
    }

    #[test]
    fn explicit_host_wins_over_authority() {
        let request = http::Request::builder()
            .uri("http://internal:9000/")
            .header("host", "public.example")
            .body(())
            .unwrap();

        let record = IncomingRecord::from_request(request);
        let hosts: Vec<_> = record.headers.iter().filter(|(n, _)| n == "host").collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(record.header("host").and_then(NativeHeaderValue::first), Some("public.example"));
    }
}
