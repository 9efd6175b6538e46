//! End-to-end request handling against an in-memory output stream.

use std::io::Cursor;

use mpsl_lsp::server::{LspServer, Message, MessageReader};
use serde_json::{json, Value};

fn send(server: &mut LspServer<Vec<u8>>, content: Value) {
    assert!(!server.process_message(Message { content }));
}

fn open(server: &mut LspServer<Vec<u8>>, uri: &str, text: &str) {
    send(
        server,
        json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": { "textDocument": { "uri": uri, "text": text } },
        }),
    );
}

/// All framed responses written so far, in order.
fn responses(server: LspServer<Vec<u8>>) -> Vec<Value> {
    let mut reader = MessageReader::new(Cursor::new(server.into_output()));
    let mut out = Vec::new();
    while let Ok(Some(message)) = reader.read_message() {
        out.push(message.content);
    }
    out
}

fn completion_request(id: u32, uri: &str, line: u32, character: u32) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "textDocument/completion",
        "params": {
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character },
        },
    })
}

fn labels(result: &Value) -> Vec<&str> {
    result
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].as_str().unwrap())
        .collect()
}

const URI: &str = "file:///tmp/test.mpsl";

#[test]
fn test_initialize_capabilities_and_server_info() {
    let mut server = LspServer::new(Vec::new());
    send(
        &mut server,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
    );
    let responses = responses(server);
    let result = &responses[0]["result"];
    assert_eq!(result["capabilities"]["textDocumentSync"], json!(2));
    assert_eq!(
        result["capabilities"]["completionProvider"]["triggerCharacters"],
        json!(["@"])
    );
    assert_eq!(
        result["capabilities"]["diagnosticProvider"]["interFileDependencies"],
        json!(true)
    );
    assert_eq!(result["serverInfo"]["name"], json!("MPSL Language Server"));
    assert_eq!(responses[0]["id"], json!(1));
}

#[test]
fn test_completion_includes_scope_natives_and_keywords() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var alpha = 1;\n");
    send(&mut server, completion_request(2, URI, 1, 0));

    let responses = responses(server);
    let labels = labels(&responses[0]["result"]);
    assert!(labels.contains(&"alpha"));
    assert!(labels.contains(&"@print"));
    assert!(labels.contains(&"var"));
    let alpha = responses[0]["result"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["label"] == json!("alpha"))
        .unwrap();
    assert_eq!(alpha["kind"], json!(6));
}

#[test]
fn test_completion_suppressed_inside_comment_and_string() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "# note\nvar s = \"text\";\n");
    send(&mut server, completion_request(3, URI, 0, 3));
    send(&mut server, completion_request(4, URI, 1, 11));

    for response in responses(server) {
        assert_eq!(response["result"], json!([]));
    }
}

#[test]
fn test_completion_suppressed_after_declaration_keyword() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var \n");
    send(&mut server, completion_request(5, URI, 0, 4));

    let responses = responses(server);
    assert_eq!(responses[0]["result"], json!([]));
}

#[test]
fn test_incremental_change_applies_to_analysis() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var alpha = 1;\n");
    // Rename `alpha` to `omega` through a range edit.
    send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didChange",
            "params": {
                "textDocument": { "uri": URI },
                "contentChanges": [{
                    "range": {
                        "start": { "line": 0, "character": 4 },
                        "end": { "line": 0, "character": 9 },
                    },
                    "text": "omega",
                }],
            },
        }),
    );
    send(&mut server, completion_request(6, URI, 1, 0));

    let responses = responses(server);
    let labels = labels(&responses[0]["result"]);
    assert!(labels.contains(&"omega"));
    assert!(!labels.contains(&"alpha"));
}

#[test]
fn test_hover_response_is_fenced_markdown() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "fn add(a, b) { }\n");
    send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "textDocument/hover",
            "params": {
                "textDocument": { "uri": URI },
                "position": { "line": 0, "character": 4 },
            },
        }),
    );

    let responses = responses(server);
    let result = &responses[0]["result"];
    assert_eq!(result["contents"]["kind"], json!("markdown"));
    assert_eq!(result["contents"]["value"], json!("```mpsl\nfn add(a, b)\n```"));
    assert_eq!(result["range"]["start"], json!({ "line": 0, "character": 3 }));
    assert_eq!(result["range"]["end"], json!({ "line": 0, "character": 6 }));
}

#[test]
fn test_hover_without_identifier_is_null() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var a = 1;\n");
    send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "id": 8,
            "method": "textDocument/hover",
            "params": {
                "textDocument": { "uri": URI },
                "position": { "line": 0, "character": 7 },
            },
        }),
    );

    let responses = responses(server);
    assert_eq!(responses[0]["result"], json!(null));
}

#[test]
fn test_diagnostics_surface_parser_errors() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var = 1;\n");
    send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "textDocument/diagnostic",
            "params": { "textDocument": { "uri": URI } },
        }),
    );

    let responses = responses(server);
    let result = &responses[0]["result"];
    assert_eq!(result["kind"], json!("full"));
    let items = result["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert_eq!(items[0]["severity"], json!(1));
    assert_eq!(items[0]["source"], json!("mpsl"));
}

#[test]
fn test_unknown_document_yields_internal_error() {
    let mut server = LspServer::new(Vec::new());
    send(&mut server, completion_request(10, URI, 0, 0));

    let responses = responses(server);
    assert_eq!(responses[0]["error"]["code"], json!(-32603));
    assert_eq!(responses[0]["id"], json!(10));
}

#[test]
fn test_shutdown_and_exit() {
    let mut server = LspServer::new(Vec::new());
    send(
        &mut server,
        json!({ "jsonrpc": "2.0", "id": 11, "method": "shutdown" }),
    );
    assert!(server.process_message(Message {
        content: json!({ "jsonrpc": "2.0", "method": "exit" }),
    }));

    let responses = responses(server);
    assert_eq!(responses[0]["result"], json!(null));
    assert_eq!(responses[0]["id"], json!(11));
}

#[test]
fn test_did_close_forgets_document() {
    let mut server = LspServer::new(Vec::new());
    open(&mut server, URI, "var a = 1;\n");
    send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didClose",
            "params": { "textDocument": { "uri": URI } },
        }),
    );
    send(&mut server, completion_request(12, URI, 0, 0));

    let responses = responses(server);
    assert_eq!(responses[0]["error"]["code"], json!(-32603));
}
