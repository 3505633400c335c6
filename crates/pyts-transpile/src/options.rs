//! Translation options.

use serde::{Deserialize, Serialize};

/// Knobs that change emitted text. Every field has a default, so a partial
/// TOML table deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Module specifier of the runtime import.
    pub runtime_module: String,
    /// Lower every comprehension to a generator function instead of
    /// `filter`/`map` chains.
    pub lazy_comprehensions: bool,
    /// Evaluate impure middle operands of chained comparisons once through
    /// a temporary.
    pub hoist_chain_operands: bool,
    /// Record a diagnostic for every passthrough fallback.
    pub diagnostics: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            runtime_module: pyts_runtime::DEFAULT_MODULE.to_string(),
            lazy_comprehensions: false,
            hoist_chain_operands: true,
            diagnostics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let options: TranslateOptions = toml::from_str("indent_width = 4").unwrap();
        assert_eq!(options.indent_width, 4);
        assert_eq!(options.runtime_module, "@pyts/runtime");
        assert!(options.hoist_chain_operands);
    }
}
