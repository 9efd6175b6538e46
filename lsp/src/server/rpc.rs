//! Content-Length framed JSON-RPC over plain byte streams.

use std::io::{BufRead, BufReader, Read, Write};

use anyhow::{Context, Result};
use serde_json::Value;

/// One inbound JSON-RPC frame, kept as a raw value since handlers pick the
/// fields they need.
#[derive(Debug)]
pub struct Message {
    pub content: Value,
}

impl Message {
    pub fn method(&self) -> Option<&str> {
        self.content.get("method")?.as_str()
    }

    pub fn id(&self) -> Option<&Value> {
        self.content.get("id")
    }
}

/// Blocking frame reader. Malformed frames are discarded and reading resumes
/// at the next one; only a closed or truncated stream is an error.
pub struct MessageReader<R: Read> {
    input: BufReader<R>,
}

impl<R: Read> MessageReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: BufReader::new(input),
        }
    }

    /// `Ok(Some)` for a parsed frame, `Ok(None)` for a discarded malformed
    /// frame, `Err` when the stream is gone.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        let mut content_length: Option<usize> = None;
        loop {
            let mut line = String::new();
            let read = self.input.read_line(&mut line).context("reading frame header")?;
            if read == 0 {
                anyhow::bail!("input stream closed");
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Content-Length:") {
                content_length = value.trim().parse().ok();
            }
        }

        let Some(length) = content_length else {
            tracing::warn!("frame without a usable Content-Length header, discarding");
            return Ok(None);
        };
        let mut body = vec![0u8; length];
        self.input.read_exact(&mut body).context("reading frame body")?;
        match serde_json::from_slice(&body) {
            Ok(content) => Ok(Some(Message { content })),
            Err(err) => {
                tracing::warn!(%err, "non-JSON frame body, discarding");
                Ok(None)
            }
        }
    }
}

/// Serializes a JSON value into one framed message and flushes.
pub struct MessageWriter<W: Write> {
    output: W,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let body = serde_json::to_string(value)?;
        write!(self.output, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
        self.output.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}
