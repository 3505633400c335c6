//! Errors surfaced by the translation entry points.

/// Translation itself never fails on malformed Python (unmatched shapes
/// fall back to passthrough); only parser infrastructure can.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("failed to load the Python grammar: {0}")]
    Language(String),

    #[error("parser produced no tree: {0}")]
    Parse(String),
}
