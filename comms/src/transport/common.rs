use std::pin::Pin;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::{wrappers::SplitStream, Stream, StreamExt};

pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Failure to read a single message from the other side of the connection
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The underlying stream failed, the connection should be considered gone
    #[error("could not read line from the stream")]
    Io(#[from] std::io::Error),
    /// A line was read but it is not a message we know, the connection itself is still usable
    #[error("failed to deserialize message: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ReadError {
    /// Whether the stream can keep being read after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReadError::Decode(_))
    }
}

/// Reads `reader` as newline delimited JSON, one `T` per line.
///
/// Lines are split on raw bytes, so a line that is not valid UTF-8 is a [ReadError::Decode]
/// for that line only and reading carries on with the next one.
pub(super) fn decode_lines<R, T>(reader: R) -> BoxedStream<Result<T, ReadError>>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(
        SplitStream::new(BufReader::new(reader).split(b'\n')).map(
            |line| -> Result<T, ReadError> {
                let mut line = line?;
                if line.last() == Some(&b'\r') {
                    line.pop();
                }

                Ok(serde_json::from_slice::<T>(&line)?)
            },
        ),
    )
}
