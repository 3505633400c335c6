//! The single recording point for passthrough fallbacks.

use serde::Serialize;
use std::fmt;
use tree_sitter::Node;

/// Why a node was passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// The node's children did not have the expected shape.
    StructuralMismatch,
    /// A construct with no chosen translation.
    Unsupported,
    /// The parser marked the node as an error or missing node.
    Malformed,
}

impl fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackKind::StructuralMismatch => "structural mismatch",
            FallbackKind::Unsupported => "unsupported construct",
            FallbackKind::Malformed => "malformed input",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: FallbackKind,
    pub node_kind: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, in bytes.
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} ({}): {}",
            self.line, self.column, self.kind, self.node_kind, self.message
        )
    }
}

/// Collects fallbacks. Every fallback is logged; entries are only kept when
/// recording is enabled.
#[derive(Debug, Default)]
pub struct Diagnostics {
    keep: bool,
    entries: Vec<Diagnostic>,
    count: usize,
}

impl Diagnostics {
    pub fn new(keep: bool) -> Self {
        Self {
            keep,
            entries: Vec::new(),
            count: 0,
        }
    }

    pub fn record(&mut self, node: Node, kind: FallbackKind, message: impl Into<String>) {
        let message = message.into();
        let position = node.start_position();
        tracing::debug!(
            kind = %kind,
            node = node.kind(),
            line = position.row + 1,
            "passthrough: {message}"
        );
        self.count += 1;
        if self.keep {
            self.entries.push(Diagnostic {
                kind,
                node_kind: node.kind().to_string(),
                line: position.row + 1,
                column: position.column + 1,
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                message,
            });
        }
    }

    /// Number of fallbacks taken, recorded or not.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
