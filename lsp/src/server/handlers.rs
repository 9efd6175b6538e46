use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use mpsl_core::token::TokenKind;

use crate::analyzer;
use crate::protocol::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, Hover, Position, Range,
};
use crate::server::docs;
use crate::server::rpc::Message;
use crate::server::state::{LspServer, KEYWORDS};

impl<W: Write> LspServer<W> {
    /// Handles one inbound message. Returns true when the server should
    /// stop. Handler faults never escape: requests get a protocol-level
    /// error response, notifications just log.
    pub fn process_message(&mut self, message: Message) -> bool {
        let method = message.method().unwrap_or_default().to_string();
        tracing::debug!(%method, "processing message");
        if method == "exit" {
            return true;
        }
        if let Err(err) = self.dispatch(&method, &message) {
            tracing::error!(%method, %err, "handler failed");
            if message.id().is_some() {
                let _ = self.send_error(&message, -32603, &err.to_string());
            }
        }
        false
    }

    fn dispatch(&mut self, method: &str, message: &Message) -> Result<()> {
        match method {
            "initialize" => self.handle_initialize(message),
            "shutdown" => self.send_response(message, Value::Null),
            "textDocument/didOpen" => self.handle_did_open(message),
            "textDocument/didChange" => self.handle_did_change(message),
            "textDocument/didClose" => self.handle_did_close(message),
            "textDocument/completion" => self.handle_completion(message),
            "textDocument/hover" => self.handle_hover(message),
            "textDocument/diagnostic" => self.handle_diagnostic(message),
            _ => Ok(()),
        }
    }

    fn handle_initialize(&mut self, message: &Message) -> Result<()> {
        self.send_response(
            message,
            json!({
                "capabilities": {
                    "textDocumentSync": 2,
                    "completionProvider": { "triggerCharacters": ["@"] },
                    "hoverProvider": {},
                    "diagnosticProvider": {
                        "interFileDependencies": true,
                        "workspaceDiagnostics": false,
                    },
                },
                "serverInfo": {
                    "name": "MPSL Language Server",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    fn handle_did_open(&mut self, message: &Message) -> Result<()> {
        let uri = str_field(message, &["params", "textDocument", "uri"])?;
        let text = str_field(message, &["params", "textDocument", "text"])?;
        self.documents.set(uri, text);
        Ok(())
    }

    fn handle_did_change(&mut self, message: &Message) -> Result<()> {
        let uri = str_field(message, &["params", "textDocument", "uri"])?.to_string();
        let changes = field(message, &["params", "contentChanges"])?
            .as_array()
            .context("contentChanges is not an array")?
            .clone();
        for change in changes {
            let text = change
                .get("text")
                .and_then(Value::as_str)
                .context("content change without text")?;
            match change.get("range") {
                Some(range) => {
                    let range: Range = serde_json::from_value(range.clone())?;
                    self.documents.apply_range_edit(&uri, range, text);
                }
                None => self.documents.set(&uri, text),
            }
        }
        Ok(())
    }

    fn handle_did_close(&mut self, message: &Message) -> Result<()> {
        let uri = str_field(message, &["params", "textDocument", "uri"])?;
        self.documents.remove(uri);
        Ok(())
    }

    fn handle_completion(&mut self, message: &Message) -> Result<()> {
        let (uri, text, index) = self.document_position(message)?;
        let result = mpsl_core::check(&text);
        let file = uri_to_path(&uri);
        let analyzer = analyzer::collect_completions(file.as_deref(), &result.statements, index);

        // Tokens around the cursor decide suppression: no completion inside
        // strings or plain comments, or right where a new name is typed.
        let current = result.tokens.iter().find(|t| index > t.start && index < t.end);
        let current_inclusive = result.tokens.iter().find(|t| index >= t.start && index <= t.end);
        let last = result.tokens.iter().filter(|t| index > t.end).last();

        let in_string = matches!(
            current.map(|t| t.kind),
            Some(TokenKind::String | TokenKind::InterpolatedStringMarker)
        ) || matches!(current_inclusive.map(|t| t.kind), Some(TokenKind::InterpolatedText))
            || current_inclusive.is_some_and(|t| {
                t.kind == TokenKind::InterpolatedStringMarker && index > t.start && t.lexeme == "@\""
            });
        let in_comment = current.is_some_and(|t| t.kind == TokenKind::Comment)
            || current_inclusive.is_some_and(|t| {
                t.kind == TokenKind::Comment && index > t.start && !t.lexeme.starts_with("##")
            });
        let naming = matches!(
            last.map(|t| t.kind),
            Some(TokenKind::Var | TokenKind::Each | TokenKind::Fn)
        );

        if analyzer.in_function_parameter_list() || naming || in_string || in_comment {
            return self.send_response(message, json!([]));
        }

        let mut items = analyzer.into_items();
        items.extend(
            mpsl_stdlib::native_functions()
                .keys()
                .map(|name| CompletionItem::new(format!("@{name}"), CompletionItemKind::Function)),
        );
        items.extend(KEYWORDS.iter().map(|k| CompletionItem::new(*k, CompletionItemKind::Keyword)));
        self.send_response(message, serde_json::to_value(items)?)
    }

    fn handle_hover(&mut self, message: &Message) -> Result<()> {
        let (uri, text, index) = self.document_position(message)?;
        let result = mpsl_core::check(&text);

        // The hovered token: span containing the cursor, else the
        // identifier ending exactly at it.
        let token = result
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::Identifier && index >= t.start && index < t.end)
            .or_else(|| {
                result
                    .tokens
                    .iter()
                    .find(|t| t.kind == TokenKind::Identifier && t.end == index)
            })
            .cloned();
        let Some(token) = token else {
            return self.send_response(message, Value::Null);
        };

        let range = Range::new(
            Position::new(token.line - 1, token.column),
            Position::new(token.line - 1, token.column + (token.end - token.start) as u32),
        );
        let file = uri_to_path(&uri);
        match analyzer::resolve_hover(file.as_deref(), &result.statements, token) {
            Some(text) => {
                self.send_response(message, serde_json::to_value(Hover::markdown(&text, range))?)
            }
            None => self.send_response(message, Value::Null),
        }
    }

    fn handle_diagnostic(&mut self, message: &Message) -> Result<()> {
        let uri = str_field(message, &["params", "textDocument", "uri"])?;
        let text = self
            .documents
            .get(uri)
            .with_context(|| format!("unknown document {uri}"))?;
        let result = mpsl_core::check(text);

        let items: Vec<Diagnostic> = result
            .tokenizer_errors
            .iter()
            .chain(result.parser_errors.iter())
            .map(|error| {
                let position = Position::new(error.line - 1, error.column);
                Diagnostic {
                    range: Range::new(position, position),
                    message: error.message.clone(),
                    severity: DiagnosticSeverity::Error,
                    source: "mpsl",
                }
            })
            .collect();

        self.send_response(message, json!({ "kind": "full", "items": items }))
    }

    /// The document text and cursor byte offset named by a positional
    /// request.
    fn document_position(&self, message: &Message) -> Result<(String, String, usize)> {
        let uri = str_field(message, &["params", "textDocument", "uri"])?;
        let text = self
            .documents
            .get(uri)
            .with_context(|| format!("unknown document {uri}"))?
            .to_string();
        let position: Position =
            serde_json::from_value(field(message, &["params", "position"])?.clone())?;
        let index = docs::position_to_offset(&text, position);
        Ok((uri.to_string(), text, index))
    }
}

fn field<'a>(message: &'a Message, path: &[&str]) -> Result<&'a Value> {
    let mut value = &message.content;
    for key in path {
        value = value.get(key).with_context(|| format!("missing field `{key}`"))?;
    }
    Ok(value)
}

fn str_field<'a>(message: &'a Message, path: &[&str]) -> Result<&'a str> {
    field(message, path)?
        .as_str()
        .with_context(|| format!("field `{}` is not a string", path.join(".")))
}

fn uri_to_path(uri: &str) -> Option<PathBuf> {
    url::Url::parse(uri).ok()?.to_file_path().ok()
}
