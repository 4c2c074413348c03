//! Source map - owns the text of every loaded file.
//!
//! The [`SourceMap`] maps [`FileId`]s to their contents and converts byte
//! offsets back into line/column positions for diagnostics.

use super::FileId;
use crate::error::{SourceMapError, SourceMapResult};

/// A single loaded source file.
pub struct SourceFile {
    /// The file name as given to the compiler.
    pub name: String,
    /// The full source text.
    pub src: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Build a source file, computing its line-start table.
    pub fn new(name: String, src: String) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            name,
            src,
            line_starts,
        }
    }

    /// Number of lines in the file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a (line, column) pair, both 1-based.
    ///
    /// Offsets past the end of the file map to the last position.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.src.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let col = self.src[self.line_starts[line]..offset].chars().count();
        (line as u32 + 1, col as u32 + 1)
    }

    /// The text of a 1-based line, without its terminator.
    pub fn line_text(&self, line: u32) -> SourceMapResult<&str> {
        let idx = (line as usize)
            .checked_sub(1)
            .ok_or(SourceMapError::InvalidLineNumber {
                line: line as usize,
                max_lines: self.line_count(),
            })?;
        if idx >= self.line_starts.len() {
            return Err(SourceMapError::InvalidLineNumber {
                line: line as usize,
                max_lines: self.line_count(),
            });
        }
        let start = self.line_starts[idx];
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.src.len(), |&next| next);
        Ok(self.src[start..end].trim_end_matches(['\n', '\r']))
    }
}

/// Collection of all source files loaded in a session.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return its id.
    pub fn add_file(&mut self, name: impl Into<String>, src: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(SourceFile::new(name.into(), src.into()));
        id
    }

    /// Look up a file by id.
    pub fn file(&self, id: FileId) -> SourceMapResult<&SourceFile> {
        self.files
            .get(id.index())
            .ok_or_else(|| SourceMapError::FileNotFound(format!("file id {}", id.index())))
    }

    /// Number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no files are loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
