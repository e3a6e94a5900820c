//! Header translation in both directions.
//!
//! Ingress keeps every repeated value as its own entry. Egress is
//! deliberately asymmetric: `set-cookie` is the only header written as a
//! list of independent values; every other name is written once, its
//! repeated values combined into one comma-joined value.

use http::header::SET_COOKIE;

use crate::fetch::Headers;
use crate::net::{NativeHeaderValue, ResponseSink, SinkError};

/// Native header list → [`Headers`].
///
/// Absent values are skipped. List values are appended one by one; scalar
/// values overwrite whatever the name held before.
pub fn to_headers(native: &[(String, Option<NativeHeaderValue>)]) -> Headers {
    let mut headers = Headers::new();

    for (name, value) in native {
        let Some(value) = value else { continue };

        let result = match value {
            NativeHeaderValue::Multiple(items) => items
                .iter()
                .try_for_each(|item| headers.append(name, item)),
            NativeHeaderValue::Single(item) => headers.set(name, item),
        };

        if let Err(err) = result {
            tracing::debug!(header = %name, error = %err, "dropping header that does not fit the header model");
        }
    }

    headers
}

/// [`Headers`] → sink.
pub fn merge_into_sink<S: ResponseSink>(headers: &Headers, sink: &mut S) -> Result<(), SinkError> {
    for name in headers.names() {
        if *name == SET_COOKIE {
            sink.set_header_values(name.clone(), headers.get_set_cookie())?;
            continue;
        }
        match headers.combined(name) {
            Some(value) => sink.set_header(name.clone(), value)?,
            None => tracing::debug!(header = %name, "dropping header whose combined value is invalid"),
        }
    }
    Ok(())
}
