use std::collections::HashMap;

use crate::protocol::{Position, Range};

/// In-memory text of every open document, keyed by URI. Owned exclusively by
/// the consumer loop; line endings are normalized to `\n` on every write.
#[derive(Default)]
pub struct DocumentStore {
    documents: HashMap<String, String>,
}

impl DocumentStore {
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.documents.get(uri).map(String::as_str)
    }

    pub fn set(&mut self, uri: &str, text: &str) {
        self.documents.insert(uri.to_string(), normalize_line_endings(text));
    }

    pub fn remove(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Applies one incremental edit. Positions are resolved against the
    /// buffer as it stands now, so a batch of edits must be applied in order
    /// for later positions to land correctly.
    pub fn apply_range_edit(&mut self, uri: &str, range: Range, new_text: &str) {
        let Some(text) = self.documents.get_mut(uri) else {
            return;
        };
        let start = position_to_offset(text, range.start);
        let end = position_to_offset(text, range.end).max(start);
        text.replace_range(start..end, &normalize_line_endings(new_text));
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Byte offset of a zero-based line/character position, clamped to the end
/// of its line (and of the text).
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let mut offset = 0;
    for _ in 0..position.line {
        match text[offset..].find('\n') {
            Some(newline) => offset += newline + 1,
            None => return text.len(),
        }
    }
    let line_end = text[offset..]
        .find('\n')
        .map(|newline| offset + newline)
        .unwrap_or(text.len());
    (offset + position.character as usize).min(line_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_to_offset() {
        let text = "var a = 1;\nfn f(b) { }\n";
        assert_eq!(position_to_offset(text, Position::new(0, 0)), 0);
        assert_eq!(position_to_offset(text, Position::new(0, 4)), 4);
        assert_eq!(position_to_offset(text, Position::new(1, 3)), 14);
        // Past the line end clamps to the newline.
        assert_eq!(position_to_offset(text, Position::new(0, 99)), 10);
        // Past the last line clamps to the text end.
        assert_eq!(position_to_offset(text, Position::new(9, 0)), text.len());
    }

    #[test]
    fn test_set_normalizes_line_endings() {
        let mut store = DocumentStore::default();
        store.set("file:///a.mpsl", "var a = 1;\r\nvar b = 2;\r");
        assert_eq!(store.get("file:///a.mpsl"), Some("var a = 1;\nvar b = 2;\n"));
    }

    #[test]
    fn test_sequential_range_edits() {
        let mut store = DocumentStore::default();
        store.set("file:///a.mpsl", "var a = 1;\n");
        // Rename `a` to `total`, then touch the value: the second edit's
        // position is valid only against the already-renamed buffer.
        store.apply_range_edit(
            "file:///a.mpsl",
            Range::new(Position::new(0, 4), Position::new(0, 5)),
            "total",
        );
        store.apply_range_edit(
            "file:///a.mpsl",
            Range::new(Position::new(0, 12), Position::new(0, 13)),
            "2",
        );
        assert_eq!(store.get("file:///a.mpsl"), Some("var total = 2;\n"));
    }

    #[test]
    fn test_range_edit_on_unknown_document_is_ignored() {
        let mut store = DocumentStore::default();
        store.apply_range_edit(
            "file:///missing.mpsl",
            Range::new(Position::new(0, 0), Position::new(0, 0)),
            "x",
        );
        assert_eq!(store.get("file:///missing.mpsl"), None);
    }
}
