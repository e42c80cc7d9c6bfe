//! Server-sent-events decoding for provider streams.
//!
//! Buffers raw bytes, splits on blank lines, joins the `data:` lines of each
//! event and parses them as JSON. Frames that are not JSON are skipped; a
//! `[DONE]` payload ends the stream.

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use serde_json::Value;

use super::BackendError;

const DONE_SIGNAL: &str = "[DONE]";

type ByteStream = std::pin::Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

struct SseState {
    input: ByteStream,
    buf: Vec<u8>,
    finished: bool,
}

/// Decodes an SSE byte stream into the JSON payload of each event.
pub(crate) fn decode_events<S>(
    provider: &'static str,
    input: S,
) -> impl Stream<Item = Result<Value, BackendError>> + Send
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let state = SseState {
        input: Box::pin(input),
        buf: Vec::new(),
        finished: false,
    };

    stream::unfold(state, move |mut state| async move {
        loop {
            if let Some(frame) = next_frame(&mut state.buf) {
                match parse_frame(&frame) {
                    Frame::Done => return None,
                    Frame::Payload(value) => return Some((Ok(value), state)),
                    Frame::Skip => continue,
                }
            }

            if state.finished {
                // Trailing event without its terminating blank line
                if state.buf.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut state.buf);
                return match parse_frame(&rest) {
                    Frame::Payload(value) => Some((Ok(value), state)),
                    _ => None,
                };
            }

            match state.input.next().await {
                Some(Ok(bytes)) => state.buf.extend(bytes.iter().filter(|b| **b != b'\r')),
                Some(Err(source)) => {
                    state.finished = true;
                    state.buf.clear();
                    return Some((Err(BackendError::Http { provider, source }), state));
                }
                None => state.finished = true,
            }
        }
    })
}

enum Frame {
    Payload(Value),
    Done,
    Skip,
}

/// Pops one complete event (terminated by a blank line) off the buffer.
fn next_frame(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let idx = buf.windows(2).position(|w| w == b"\n\n")?;
    let mut frame: Vec<u8> = buf.drain(..idx + 2).collect();
    frame.truncate(idx);
    Some(frame)
}

fn parse_frame(frame: &[u8]) -> Frame {
    let text = String::from_utf8_lossy(frame);
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data.is_empty() {
        return Frame::Skip;
    }

    let payload = data.join("\n");
    if payload.trim() == DONE_SIGNAL {
        return Frame::Done;
    }

    match serde_json::from_str(&payload) {
        Ok(value) => Frame::Payload(value),
        Err(_) => Frame::Skip,
    }
}
