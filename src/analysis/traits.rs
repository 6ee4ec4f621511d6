//! Core traits for language analysis.

use std::path::Path;

use super::FileFacts;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// This is kept separate from FileFacts so the tree can be inspected by more
/// than one pass without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Language-specific analyzer trait.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations should
/// create parsers as needed.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "go").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Returns an error if parsing fails completely. Syntax errors still
    /// produce a tree with ERROR nodes; `extract_facts` reports them.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Extract all facts from a parsed file.
    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts>;

    /// Parse and extract in one step.
    fn analyze(&self, path: &Path, source: &[u8]) -> anyhow::Result<FileFacts> {
        let parsed = self.parse(path, source)?;
        self.extract_facts(&parsed)
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
