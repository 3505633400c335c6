//! Tree-sitter adapter for Python source.

use crate::error::TranslateError;
use tree_sitter::{Parser, Tree};

/// Parse Python source into a concrete syntax tree.
///
/// The grammar is total: malformed input yields `ERROR` and missing nodes
/// inside the tree rather than an error here.
pub fn parse_python(source: &str) -> Result<Tree, TranslateError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_python::language().into())
        .map_err(|err| TranslateError::Language(err.to_string()))?;

    parser
        .parse(source, None)
        .ok_or_else(|| TranslateError::Parse("parsing was cancelled".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_still_parses() {
        let tree = parse_python("def broken(:\n    pass\n").unwrap();
        assert!(tree.root_node().has_error());
        assert_eq!(tree.root_node().kind(), "module");
    }
}
