//! Incremental decoding of a newline-delimited (or simply concatenated) JSON
//! feed into [`StatsFrame`]s, independent of how the transport chunks it.
use std::error::Error as StdError;
use std::pin::Pin;

use futures_util::{Stream, StreamExt, stream};

use crate::error::ContainerError;

use super::{StatsFrame, StatsStream};

struct DecodeState<S> {
    chunks: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

/// Turns a byte-chunk stream into a frame stream.
///
/// A malformed frame, a transport error, or a frame cut short by the end of
/// the stream yields one `Err` and then ends the stream.
pub fn decode_frames<S, B, E>(chunks: S) -> StatsStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
{
    let state = DecodeState {
        chunks: Box::pin(chunks),
        buffer: Vec::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            match next_frame(&mut state.buffer) {
                Ok(Some(frame)) => return Some((Ok(frame), state)),
                Ok(None) => {}
                Err(err) => {
                    state.finished = true;
                    return Some((Err(err), state));
                }
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(ContainerError::Stream { source: err.into() }), state));
                }
                None => {
                    state.finished = true;
                    let pending = state
                        .buffer
                        .iter()
                        .filter(|byte| !byte.is_ascii_whitespace())
                        .count();
                    if pending == 0 {
                        return None;
                    }
                    return Some((Err(ContainerError::TruncatedFrame { pending }), state));
                }
            }
        }
    })
    .boxed()
}

/// Pops one complete frame off the front of `buffer`, or returns `None` when
/// more bytes are needed.
fn next_frame(buffer: &mut Vec<u8>) -> Result<Option<StatsFrame>, ContainerError> {
    let (decoded, consumed) = {
        let mut frames = serde_json::Deserializer::from_slice(buffer.as_slice()).into_iter::<StatsFrame>();
        let decoded = frames.next();
        (decoded, frames.byte_offset())
    };

    match decoded {
        None => {
            buffer.clear();
            Ok(None)
        }
        Some(Ok(frame)) => {
            buffer.drain(..consumed.min(buffer.len()));
            Ok(Some(frame))
        }
        Some(Err(err)) if err.is_eof() => Ok(None),
        Some(Err(err)) => Err(ContainerError::Decode {
            endpoint: "stats",
            source: err,
        }),
    }
}
