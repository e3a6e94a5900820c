//! Body stream adaptation in both directions.
//!
//! Neither direction buffers a whole body. On egress the sink's write
//! watermark is the only flow control: `pipe` pulls the next chunk only
//! after the previous write was accepted.

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::Method;
use http_body_util::BodyDataStream;

use crate::fetch::request::forbids_body;
use crate::fetch::{Body, BoxError};
use crate::net::ResponseSink;

/// Native request body → optional [`Body`].
///
/// GET and HEAD get no body at all, whatever the native stream holds.
/// Other methods get a lazy wrapper that reads nothing until polled.
pub fn to_body<B>(method: &Method, native: B) -> Option<Body>
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    if forbids_body(method) {
        return None;
    }
    Some(Body::from_stream(BodyDataStream::new(native)))
}

/// Drain `body` into `sink`, then end it.
pub async fn pipe<S: ResponseSink>(mut body: Body, sink: &mut S) -> Result<(), BoxError> {
    while let Some(chunk) = body.try_next().await? {
        if chunk.is_empty() {
            continue;
        }
        sink.write(chunk).await?;
    }
    super::finalizer::end_once(sink);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::RecordingSink;
    use crate::net::SinkState;
    use futures_util::stream;
    use http_body_util::{Full, StreamBody};
    use hyper::body::Frame;

    fn chunked(parts: &[&'static str]) -> StreamBody<stream::Iter<std::vec::IntoIter<Result<Frame<Bytes>, std::io::Error>>>> {
        let frames: Vec<_> = parts
            .iter()
            .map(|part| Ok(Frame::data(Bytes::from_static(part.as_bytes()))))
            .collect();
        StreamBody::new(stream::iter(frames))
    }

    #[test]
    fn get_and_head_have_no_body() {
        for method in [Method::GET, Method::HEAD] {
            let native = Full::new(Bytes::from_static(b"ignored"));
            assert!(to_body(&method, native).is_none());
        }
    }

    #[tokio::test]
    async fn post_body_round_trips_in_order() {
        let body = to_body(&Method::POST, chunked(&["b1", "b2", "b3"])).unwrap();
        let chunks: Vec<Bytes> = body.try_collect().await.unwrap();
        assert_eq!(chunks, vec![Bytes::from("b1"), Bytes::from("b2"), Bytes::from("b3")]);
    }

    #[tokio::test]
    async fn other_methods_carry_a_body() {
        for method in [Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS] {
            let body = to_body(&method, Full::new(Bytes::from_static(b"x")));
            assert!(body.is_some(), "{method} should carry a body");
        }
    }

    #[tokio::test]
    async fn native_stream_errors_propagate() {
        let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"ok"))),
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated")),
        ];
        let body = to_body(&Method::POST, StreamBody::new(stream::iter(frames))).unwrap();
        assert_eq!(body.bytes().await.unwrap_err().to_string(), "truncated");
    }

    #[tokio::test]
    async fn pipe_writes_chunks_then_ends() {
        let chunks = vec![
            Ok::<_, BoxError>(Bytes::from_static(b"one ")),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"two")),
        ];
        let mut sink = RecordingSink::new();
        pipe(Body::from_stream(stream::iter(chunks)), &mut sink).await.unwrap();

        assert_eq!(sink.body, b"one two");
        assert_eq!(sink.writes, 2);
        assert_eq!(sink.end_calls, 1);
        assert_eq!(sink.state, SinkState::Ended);
    }

    #[tokio::test]
    async fn pipe_stops_on_source_error_without_ending() {
        let chunks = vec![
            Ok::<_, BoxError>(Bytes::from_static(b"half")),
            Err("source failed".into()),
        ];
        let mut sink = RecordingSink::new();
        let err = pipe(Body::from_stream(stream::iter(chunks)), &mut sink).await.unwrap_err();

        assert_eq!(err.to_string(), "source failed");
        assert_eq!(sink.body, b"half");
        assert_eq!(sink.end_calls, 0);
    }

    #[tokio::test]
    async fn pipe_stops_when_sink_closes() {
        let mut sink = RecordingSink::new();
        sink.writable = false;
        let err = pipe(Body::from("data"), &mut sink).await.unwrap_err();
        assert_eq!(err.to_string(), "connection closed before the response was fully written");
        assert_eq!(sink.end_calls, 0);
    }
}
