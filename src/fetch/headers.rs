//! Case-insensitive, multi-valued header map.

use http::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use thiserror::Error;

/// Rejected header name or value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHeader {
    #[error("invalid header name: {0:?}")]
    Name(String),

    #[error("invalid value for header {0:?}")]
    Value(String),
}

/// Fetch-style header map.
///
/// Keys compare case-insensitively. Each key may hold several values;
/// [`Headers::iter`] yields one pair per stored value, keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    inner: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, keeping any existing values for `name`.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), InvalidHeader> {
        let (name, value) = parse(name, value)?;
        self.inner.append(name, value);
        Ok(())
    }

    /// Replace every value of `name` with `value`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), InvalidHeader> {
        let (name, value) = parse(name, value)?;
        self.inner.insert(name, value);
        Ok(())
    }

    /// Combined value of `name`, repeated values joined with `", "`.
    pub fn get(&self, name: &str) -> Option<String> {
        let mut values = self.inner.get_all(name).iter().peekable();
        values.peek()?;
        let joined = values
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        Some(joined)
    }

    /// Every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&HeaderValue> {
        self.inner.get_all(name).iter().collect()
    }

    /// The `set-cookie` values as independent entries.
    pub fn get_set_cookie(&self) -> Vec<HeaderValue> {
        self.inner.get_all(SET_COOKIE).iter().cloned().collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn delete(&mut self, name: &str) {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            return;
        };
        if !self.inner.contains_key(&name) {
            return;
        }
        // HeaderMap::remove swap-removes; rebuild to keep insertion order.
        let mut kept = HeaderMap::with_capacity(self.inner.len());
        for (key, value) in self.inner.iter() {
            if *key != name {
                kept.append(key.clone(), value.clone());
            }
        }
        self.inner = kept;
    }

    /// Replace every value of an already-validated name.
    pub(crate) fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.insert(name, value);
    }

    /// Number of stored values, counting repeats.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.inner.iter()
    }

    /// Distinct names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &HeaderName> {
        self.inner.keys()
    }

    /// Every value of `name` joined with `", "` as one header value.
    pub fn combined(&self, name: &HeaderName) -> Option<HeaderValue> {
        let mut values = self.inner.get_all(name).iter();
        let first = values.next()?;
        let mut joined = first.as_bytes().to_vec();
        for value in values {
            joined.extend_from_slice(b", ");
            joined.extend_from_slice(value.as_bytes());
        }
        HeaderValue::from_bytes(&joined).ok()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.inner
    }
}

impl From<HeaderMap> for Headers {
    fn from(inner: HeaderMap) -> Self {
        Self { inner }
    }
}

impl From<Headers> for HeaderMap {
    fn from(headers: Headers) -> Self {
        headers.inner
    }
}

fn parse(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), InvalidHeader> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| InvalidHeader::Name(name.to_string()))?;
    let value = HeaderValue::from_str(value).map_err(|_| InvalidHeader::Value(name.to_string()))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain").unwrap();
        assert!(headers.has("content-type"));
        assert_eq!(headers.get("CONTENT-TYPE").as_deref(), Some("text/plain"));
    }

    #[test]
    fn append_keeps_repeats_and_set_replaces_them() {
        let mut headers = Headers::new();
        headers.append("accept", "text/html").unwrap();
        headers.append("accept", "application/json").unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("accept").as_deref(), Some("text/html, application/json"));

        headers.set("accept", "*/*").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept").as_deref(), Some("*/*"));
    }

    #[test]
    fn iter_yields_one_pair_per_value() {
        let mut headers = Headers::new();
        headers.append("set-cookie", "a=1").unwrap();
        headers.append("set-cookie", "b=2").unwrap();
        headers.append("vary", "accept").unwrap();

        let pairs: Vec<_> = headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_str().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("set-cookie", "a=1"), ("set-cookie", "b=2"), ("vary", "accept")]);
        assert_eq!(headers.get_set_cookie().len(), 2);
    }

    #[test]
    fn rejects_invalid_input() {
        let mut headers = Headers::new();
        assert_eq!(headers.append("bad name", "x"), Err(InvalidHeader::Name("bad name".into())));
        assert!(matches!(headers.set("x-ok", "line\nbreak"), Err(InvalidHeader::Value(_))));
        assert!(headers.is_empty());
    }

    #[test]
    fn delete_and_missing_lookup() {
        let mut headers = Headers::new();
        headers.set("x-id", "1").unwrap();
        headers.delete("X-ID");
        assert_eq!(headers.get("x-id"), None);
        assert!(headers.get_all("x-id").is_empty());
    }

    #[test]
    fn delete_keeps_insertion_order() {
        let mut headers = Headers::new();
        headers.set("a", "1").unwrap();
        headers.append("b", "2").unwrap();
        headers.append("b", "3").unwrap();
        headers.set("c", "4").unwrap();
        headers.delete("a");

        let pairs: Vec<_> = headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_str().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("b", "2"), ("b", "3"), ("c", "4")]);
    }

    #[test]
    fn combined_joins_repeats() {
        let mut headers = Headers::new();
        headers.append("vary", "accept").unwrap();
        headers.append("vary", "origin").unwrap();
        headers.set("x-one", "1").unwrap();

        let names: Vec<_> = headers.names().map(HeaderName::as_str).collect();
        assert_eq!(names, vec!["vary", "x-one"]);
        let vary = HeaderName::from_static("vary");
        assert_eq!(headers.combined(&vary).unwrap(), "accept, origin");
        assert_eq!(headers.combined(&HeaderName::from_static("x-none")), None);
    }
}
