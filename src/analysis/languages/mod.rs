//! Language-specific analyzer implementations.

mod go;

pub use go::GoAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;

/// Static storage for Go analyzer.
static GO_ANALYZER: OnceCell<GoAnalyzer> = OnceCell::new();

/// Register all available language analyzers.
///
/// Idempotent; `get_analyzer` calls it on demand.
pub fn register_analyzers() {
    GO_ANALYZER.get_or_init(GoAnalyzer::new);
}

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    match ext {
        "go" => GO_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}
