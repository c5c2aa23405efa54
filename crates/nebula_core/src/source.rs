//! Source text container shared by every compiler stage.

use crate::text::{LineAndColumn, LineMap, TextPos, TextSpan};
use std::path::Path;

/// The text of one source file together with its names and line table.
#[derive(Debug, Clone)]
pub struct SourceText {
    file_name: String,
    full_path: String,
    text: String,
    line_map: LineMap,
}

impl SourceText {
    /// Create a source from in-memory text. `path` is used for both the
    /// display name (its last component) and the full path.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let full_path = path.into();
        let text = text.into();
        let file_name = Path::new(&full_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| full_path.clone());
        let line_map = LineMap::new(&text);
        Self {
            file_name,
            full_path,
            text,
            line_map,
        }
    }

    /// Read a source file from disk.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(path.to_string_lossy().into_owned(), text))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// The file name without its extension.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// 0-based line index containing `pos`.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        self.line_map.line_of(pos)
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        self.line_map.line_and_column_of(pos)
    }

    /// The text of a line, without its line terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let starts = self.line_map.line_starts();
        let Some(&start) = starts.get(line as usize) else {
            return "";
        };
        let end = starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or(self.text.len() as TextPos);
        self.text[start as usize..end as usize].trim_end_matches(['\r', '\n'])
    }

    /// The text covered by a span. Out-of-range spans yield an empty string.
    pub fn slice(&self, span: TextSpan) -> &str {
        self.text.get(span.to_range()).unwrap_or("")
    }
}
