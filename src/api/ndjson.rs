//! Incremental newline-delimited JSON decoding.
//!
//! Turns a stream of byte chunks into a lazy stream of decoded records.
//! Lines are split on raw bytes so a multi-byte character cut across two
//! chunks is reassembled before UTF-8 validation. Malformed lines are logged
//! and skipped; a transport error ends the stream after being yielded once.

use std::fmt::Display;
use std::pin::Pin;

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::backend::ApiError;

struct Decoder<S> {
    body: Pin<Box<S>>,
    buffer: Vec<u8>,
    exhausted: bool,
    lines_seen: usize,
}

impl<S> Decoder<S> {
    /// Pops the next complete line (without its terminator) off the buffer.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buffer.iter().position(|byte| *byte == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        Some(line)
    }

    fn parse<T: DeserializeOwned>(&mut self, mut line: Vec<u8>) -> Option<T> {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        self.lines_seen += 1;

        let text = match std::str::from_utf8(&line) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("Skipping non UTF-8 stream line {}: {}", self.lines_seen, e);
                return None;
            }
        };
        if text.is_empty() {
            return None;
        }

        match serde_json::from_str(text) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed stream line {}: {} ({})", self.lines_seen, e, text);
                None
            }
        }
    }
}

/// Decodes `body` as NDJSON into records of type `T`.
///
/// A trailing line without a final newline is parsed as the last record.
pub fn decode<S, B, E, T>(body: S) -> BoxStream<'static, Result<T, ApiError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let decoder = Decoder {
        body: Box::pin(body),
        buffer: Vec::new(),
        exhausted: false,
        lines_seen: 0,
    };

    stream::unfold(decoder, |mut decoder| async move {
        loop {
            while let Some(line) = decoder.next_line() {
                if let Some(record) = decoder.parse::<T>(line) {
                    return Some((Ok(record), decoder));
                }
            }

            if decoder.exhausted {
                if decoder.buffer.is_empty() {
                    debug!("NDJSON stream finished after {} lines", decoder.lines_seen);
                    return None;
                }
                let tail = std::mem::take(&mut decoder.buffer);
                if let Some(record) = decoder.parse::<T>(tail) {
                    return Some((Ok(record), decoder));
                }
                continue;
            }

            match decoder.body.next().await {
                Some(Ok(chunk)) => decoder.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    warn!("Stream read failed after {} lines: {}", decoder.lines_seen, e);
                    decoder.exhausted = true;
                    decoder.buffer.clear();
                    return Some((Err(ApiError::Network(e.to_string())), decoder));
                }
                None => decoder.exhausted = true,
            }
        }
    })
    .boxed()
}
