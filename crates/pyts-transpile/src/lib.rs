//! Python to TypeScript source translation.
//!
//! One pass over a tree-sitter syntax tree produces TypeScript text that
//! preserves Python's observable semantics where a mapping exists. Where
//! the languages diverge (floor division, negative indexing, `in`,
//! formatting) the output calls into a small runtime module, and only the
//! primitives actually used are imported.
//!
//! ```text
//! source ─> parse ─> module facts ─> plan declarations ─> emit ─> assemble
//!                    (classes, sigs)  (per Python scope)   │
//!                                                          └─> runtime deps
//! ```
//!
//! Translation never fails on malformed Python: nodes the emitter cannot
//! translate are copied through as source text and recorded as
//! [`Diagnostic`]s.
//!
//! # Example
//!
//! ```ignore
//! let result = pyts_transpile::translate("x = 7 // 2\n")?;
//! assert_eq!(
//!     result.text,
//!     "import { floordiv } from \"@pyts/runtime\";\n\nlet x = floordiv(7, 2);\n"
//! );
//! ```

pub mod analysis;
pub mod context;
pub mod deps;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod kind;
pub mod options;
pub mod parse;
pub mod scope;
pub mod syntax;
pub mod types;

pub use diagnostics::{Diagnostic, FallbackKind};
pub use error::TranslateError;
pub use options::TranslateOptions;
pub use parse::parse_python;
pub use pyts_runtime::Primitive;

use context::TranslationContext;
use emit::Emitter;
use serde::Serialize;
use tree_sitter::Tree;

/// Output of one translation unit.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResult {
    /// The assembled TypeScript module.
    pub text: String,
    /// Runtime primitives the text imports, in name order.
    pub required: Vec<String>,
    /// Imports lifted from below module level.
    pub hoisted_imports: Vec<String>,
    /// Passthrough fallbacks; empty unless recording was enabled.
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate with default options.
pub fn translate(source: &str) -> Result<TranslationResult, TranslateError> {
    translate_with(source, &TranslateOptions::default())
}

pub fn translate_with(
    source: &str,
    options: &TranslateOptions,
) -> Result<TranslationResult, TranslateError> {
    let tree = parse::parse_python(source)?;
    Ok(translate_tree(&tree, source, options))
}

/// Translate an already parsed tree. `source` must be the text it was
/// parsed from.
pub fn translate_tree(tree: &Tree, source: &str, options: &TranslateOptions) -> TranslationResult {
    let root = tree.root_node();
    let facts = analysis::module_facts(root, source);
    let ctx = TranslationContext::new(source, options, facts);
    let mut emitter = Emitter::new(ctx);
    emitter.emit_module(root);
    let (body, ctx) = emitter.finish();

    let text = deps::assemble(&ctx.deps, &options.runtime_module, &body);
    let required = ctx.deps.required_names();
    let hoisted_imports = ctx.deps.hoisted().to_vec();
    tracing::trace!(
        required = required.len(),
        hoisted = hoisted_imports.len(),
        fallbacks = ctx.diagnostics.count(),
        "translated unit"
    );
    TranslationResult {
        text,
        required,
        hoisted_imports,
        diagnostics: ctx.diagnostics.into_entries(),
    }
}
