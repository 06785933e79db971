use std::path::Path;

use lsp_types::{Position, Range, TextEdit, Url};

/// Source language of a document. `Swift` stands alone; the remaining
/// variants form the Clang family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Swift,
    C,
    Cpp,
    ObjectiveC,
    ObjectiveCpp,
}

impl Language {
    pub fn is_clang_family(self) -> bool {
        !matches!(self, Language::Swift)
    }

    pub fn is_swift_family(self) -> bool {
        matches!(self, Language::Swift)
    }

    /// Whether two languages are served by the same language service.
    pub fn same_family(self, other: Language) -> bool {
        self.is_swift_family() == other.is_swift_family()
    }

    /// Map an LSP `language_id` to a language.
    pub fn from_language_id(id: &str) -> Option<Language> {
        match id {
            "swift" => Some(Language::Swift),
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "objective-c" => Some(Language::ObjectiveC),
            "objective-cpp" => Some(Language::ObjectiveCpp),
            _ => None,
        }
    }

    /// Guess the language from a file extension. Used for files that
    /// are not open and get read from disk.
    pub fn from_path(path: &Path) -> Option<Language> {
        match path.extension()?.to_str()? {
            "swift" => Some(Language::Swift),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            "m" => Some(Language::ObjectiveC),
            "mm" => Some(Language::ObjectiveCpp),
            _ => None,
        }
    }
}

/// Byte offsets of line starts, supporting conversion between byte
/// offsets, UTF-8 columns, and the internal (line, UTF-16 column)
/// positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> LineIndex {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts }
    }

    /// Byte range of a 0-based line, including its trailing newline.
    fn line_span(&self, text: &str, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(text.len());
        Some((start, end))
    }

    /// Convert a byte offset to a 0-based line + UTF-16 column position.
    pub fn offset_to_position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let line_start = self.line_starts[line];
        let character = text[line_start..offset]
            .chars()
            .map(|c| c.len_utf16())
            .sum::<usize>();
        Position {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Convert a 0-based line + UTF-16 column position to a byte offset.
    /// Returns `None` when the line is out of bounds or the column does
    /// not land on a character boundary within the line.
    pub fn position_to_offset(&self, text: &str, position: Position) -> Option<usize> {
        let (start, end) = self.line_span(text, position.line as usize)?;
        let line_text = &text[start..end];
        let mut utf16 = 0usize;
        for (byte, ch) in line_text.char_indices() {
            if utf16 == position.character as usize {
                return Some(start + byte);
            }
            utf16 += ch.len_utf16();
            if utf16 > position.character as usize {
                return None;
            }
        }
        (utf16 == position.character as usize).then_some(start + line_text.len())
    }

    /// Convert a 0-based line + 0-based UTF-8 column to a position.
    pub fn utf8_to_position(&self, text: &str, line: usize, utf8_column: usize) -> Option<Position> {
        let (start, end) = self.line_span(text, line)?;
        let line_text = &text[start..end];
        if utf8_column > line_text.len() || !line_text.is_char_boundary(utf8_column) {
            return None;
        }
        let character = line_text[..utf8_column]
            .chars()
            .map(|c| c.len_utf16())
            .sum::<usize>();
        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }

    /// Convert a position to its 0-based UTF-8 column.
    pub fn position_to_utf8(&self, text: &str, position: Position) -> Option<usize> {
        let offset = self.position_to_offset(text, position)?;
        let (start, _) = self.line_span(text, position.line as usize)?;
        Some(offset - start)
    }
}

/// An immutable view of one file: its text plus a line table. Open
/// files produce snapshots from server state; closed files are read
/// once from disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub uri: Url,
    pub language: Language,
    text: String,
    lines: LineIndex,
}

impl Snapshot {
    pub fn new(uri: Url, language: Language, text: String) -> Snapshot {
        let lines = LineIndex::new(&text);
        Snapshot {
            uri,
            language,
            text,
            lines,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Byte offset of an internal position.
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        self.lines.position_to_offset(&self.text, position)
    }

    /// Internal position of a byte offset.
    pub fn position_at(&self, offset: usize) -> Position {
        self.lines.offset_to_position(&self.text, offset)
    }

    /// Internal position of a 1-based line and 1-based UTF-8 column,
    /// the convention used by the symbol index and the backend wire.
    pub fn position_of_utf8(&self, line: u32, utf8_column: u32) -> Option<Position> {
        if line == 0 || utf8_column == 0 {
            return None;
        }
        self.lines
            .utf8_to_position(&self.text, line as usize - 1, utf8_column as usize - 1)
    }

    /// 1-based line and UTF-8 column of an internal position.
    pub fn utf8_of_position(&self, position: Position) -> Option<(u32, u32)> {
        let column = self.lines.position_to_utf8(&self.text, position)?;
        Some((position.line + 1, column as u32 + 1))
    }

    /// The text covered by a range, if both ends are locatable.
    pub fn text_in(&self, range: Range) -> Option<&str> {
        let start = self.offset_of(range.start)?;
        let end = self.offset_of(range.end)?;
        self.text.get(start..end)
    }

    /// Apply a set of non-overlapping edits, yielding the new text.
    /// Used by tests to check the idempotence of computed renames.
    pub fn apply_edits(&self, edits: &[TextEdit]) -> String {
        let mut resolved: Vec<(usize, usize, &str)> = edits
            .iter()
            .filter_map(|edit| {
                let start = self.offset_of(edit.range.start)?;
                let end = self.offset_of(edit.range.end)?;
                Some((start, end, edit.new_text.as_str()))
            })
            .collect();
        resolved.sort_by_key(|&(start, end, _)| (start, end));

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for (start, end, new_text) in resolved {
            if start < cursor {
                continue;
            }
            out.push_str(&self.text[cursor..start]);
            out.push_str(new_text);
            cursor = end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}
