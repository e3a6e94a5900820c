//! Lazily-read body byte stream.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use super::BoxError;

/// A body byte stream. Nothing is pulled from the source until it is polled.
pub struct Body {
    stream: BoxStream<'static, Result<Bytes, BoxError>>,
}

impl Body {
    /// A stream that yields no chunks.
    pub fn empty() -> Self {
        Self::from_stream(stream::empty::<Result<Bytes, BoxError>>())
    }

    /// Wrap any fallible byte stream.
    pub fn from_stream<S, E>(source: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            stream: source.map_err(Into::into).boxed(),
        }
    }

    /// Read the whole stream into memory.
    pub async fn bytes(mut self) -> Result<Bytes, BoxError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Read the whole stream and decode it as UTF-8.
    pub async fn text(self) -> Result<String, BoxError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::from_stream(stream::iter([Ok::<_, BoxError>(bytes)]))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}
