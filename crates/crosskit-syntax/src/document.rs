use lsp_types::{Position, Url};
use ropey::Rope;

use crate::snapshot::{Language, LineIndex, Snapshot};

/// An open document's state: source text (as Rope), language, and the
/// last synchronized version.
pub struct DocumentState {
    pub rope: Rope,
    pub language: Language,
    pub version: i32,
}

impl DocumentState {
    pub fn new(text: &str, language: Language, version: i32) -> DocumentState {
        DocumentState {
            rope: Rope::from_str(text),
            language,
            version,
        }
    }

    /// Replace the whole document text.
    pub fn replace_full(&mut self, text: &str, version: i32) {
        self.rope = Rope::from_str(text);
        self.version = version;
    }

    /// Splice a ranged change into the document text.
    /// The range is an internal (0-based line, UTF-16 column) range.
    pub fn replace_range(
        &mut self,
        start: Position,
        end: Position,
        text: &str,
        version: i32,
    ) {
        let source = self.rope.to_string();
        let lines = LineIndex::new(&source);
        if let (Some(start), Some(end)) = (
            lines.position_to_offset(&source, start),
            lines.position_to_offset(&source, end),
        ) {
            let start_char = self.rope.byte_to_char(start);
            let end_char = self.rope.byte_to_char(end.min(self.rope.len_bytes()));
            self.rope.remove(start_char..end_char);
            self.rope.insert(start_char, text);
        }
        self.version = version;
    }

    /// Produce an immutable snapshot of the current text.
    pub fn snapshot(&self, uri: Url) -> Snapshot {
        Snapshot::new(uri, self.language, self.rope.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_replace() {
        let mut doc = DocumentState::new("let x = 1\n", Language::Swift, 1);
        doc.replace_full("let y = 2\n", 2);
        assert_eq!(doc.rope.to_string(), "let y = 2\n");
        assert_eq!(doc.version, 2);
    }

    #[test]
    fn test_range_replace() {
        let mut doc = DocumentState::new("foo(a: 1)\n", Language::Swift, 1);
        doc.replace_range(Position::new(0, 0), Position::new(0, 3), "bar", 2);
        assert_eq!(doc.rope.to_string(), "bar(a: 1)\n");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut doc = DocumentState::new("foo\n", Language::C, 1);
        let uri = Url::parse("file:///test/a.c").unwrap();
        let snap = doc.snapshot(uri);
        doc.replace_full("bar\n", 2);
        assert_eq!(snap.text(), "foo\n");
        assert_eq!(snap.language, Language::C);
    }
}
