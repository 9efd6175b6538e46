use std::io::Write;

use anyhow::Result;
use serde_json::{json, Value};

use crate::server::docs::DocumentStore;
use crate::server::rpc::{Message, MessageWriter};

/// Keyword completion items appended to every non-suppressed response.
pub(crate) const KEYWORDS: [&str; 12] = [
    "true", "false", "if", "else", "while", "fn", "var", "break", "match", "each", "null", "use",
];

/// The consumer side of the server: owns the open documents and the response
/// writer. Generic over the output so tests can drive it with a buffer.
pub struct LspServer<W: Write> {
    pub(crate) writer: MessageWriter<W>,
    pub(crate) documents: DocumentStore,
}

impl<W: Write> LspServer<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: MessageWriter::new(output),
            documents: DocumentStore::default(),
        }
    }

    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }

    pub(crate) fn send_response(&mut self, request: &Message, result: Value) -> Result<()> {
        let id = request.id().cloned().unwrap_or(Value::Null);
        self.writer.write_value(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }))
    }

    pub(crate) fn send_error(&mut self, request: &Message, code: i64, message: &str) -> Result<()> {
        let id = request.id().cloned().unwrap_or(Value::Null);
        self.writer.write_value(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message },
        }))
    }
}
