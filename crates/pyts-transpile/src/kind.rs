//! Closed enumeration of the Python grammar node kinds the dispatcher
//! distinguishes.

use tree_sitter::Node;

/// Node kinds, mapped once from tree-sitter's kind strings.
///
/// Dispatch sites match this enum without a wildcard arm, so adding a kind
/// forces every dispatcher to decide how to handle it. Kinds the grammar
/// may produce that are not listed here map to [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Structure
    Module,
    Block,
    Comment,
    Error,

    // Statements
    ExpressionStatement,
    Assignment,
    AugmentedAssignment,
    IfStatement,
    ElifClause,
    ElseClause,
    WhileStatement,
    ForStatement,
    TryStatement,
    ExceptClause,
    FinallyClause,
    WithStatement,
    FunctionDefinition,
    ClassDefinition,
    DecoratedDefinition,
    Decorator,
    ReturnStatement,
    PassStatement,
    BreakStatement,
    ContinueStatement,
    RaiseStatement,
    AssertStatement,
    DeleteStatement,
    GlobalStatement,
    NonlocalStatement,
    ImportStatement,
    ImportFromStatement,
    FutureImportStatement,
    TypeAliasStatement,
    MatchStatement,
    PrintStatement,
    ExecStatement,

    // Expressions
    Identifier,
    Integer,
    Float,
    String,
    ConcatenatedString,
    True,
    False,
    None,
    Ellipsis,
    BinaryOperator,
    BooleanOperator,
    ComparisonOperator,
    NotOperator,
    UnaryOperator,
    Call,
    Attribute,
    Subscript,
    Slice,
    List,
    Tuple,
    Set,
    Dictionary,
    Pair,
    ListComprehension,
    SetComprehension,
    DictionaryComprehension,
    GeneratorExpression,
    ParenthesizedExpression,
    ConditionalExpression,
    Lambda,
    NamedExpression,
    Await,
    Yield,
    ListSplat,
    DictionarySplat,
    KeywordArgument,
    ExpressionList,
    PatternList,
    TuplePattern,
    ListPattern,
    ListSplatPattern,
    AsPattern,
    Type,

    Other,
}

impl NodeKind {
    pub fn from_kind(kind: &str) -> NodeKind {
        match kind {
            "module" => NodeKind::Module,
            "block" => NodeKind::Block,
            "comment" => NodeKind::Comment,
            "ERROR" => NodeKind::Error,
            "expression_statement" => NodeKind::ExpressionStatement,
            "assignment" => NodeKind::Assignment,
            "augmented_assignment" => NodeKind::AugmentedAssignment,
            "if_statement" => NodeKind::IfStatement,
            "elif_clause" => NodeKind::ElifClause,
            "else_clause" => NodeKind::ElseClause,
            "while_statement" => NodeKind::WhileStatement,
            "for_statement" => NodeKind::ForStatement,
            "try_statement" => NodeKind::TryStatement,
            "except_clause" | "except_group_clause" => NodeKind::ExceptClause,
            "finally_clause" => NodeKind::FinallyClause,
            "with_statement" => NodeKind::WithStatement,
            "function_definition" => NodeKind::FunctionDefinition,
            "class_definition" => NodeKind::ClassDefinition,
            "decorated_definition" => NodeKind::DecoratedDefinition,
            "decorator" => NodeKind::Decorator,
            "return_statement" => NodeKind::ReturnStatement,
            "pass_statement" => NodeKind::PassStatement,
            "break_statement" => NodeKind::BreakStatement,
            "continue_statement" => NodeKind::ContinueStatement,
            "raise_statement" => NodeKind::RaiseStatement,
            "assert_statement" => NodeKind::AssertStatement,
            "delete_statement" => NodeKind::DeleteStatement,
            "global_statement" => NodeKind::GlobalStatement,
            "nonlocal_statement" => NodeKind::NonlocalStatement,
            "import_statement" => NodeKind::ImportStatement,
            "import_from_statement" => NodeKind::ImportFromStatement,
            "future_import_statement" => NodeKind::FutureImportStatement,
            "type_alias_statement" => NodeKind::TypeAliasStatement,
            "match_statement" => NodeKind::MatchStatement,
            "print_statement" => NodeKind::PrintStatement,
            "exec_statement" => NodeKind::ExecStatement,
            "identifier" => NodeKind::Identifier,
            "integer" => NodeKind::Integer,
            "float" => NodeKind::Float,
            "string" => NodeKind::String,
            "concatenated_string" => NodeKind::ConcatenatedString,
            "true" => NodeKind::True,
            "false" => NodeKind::False,
            "none" => NodeKind::None,
            "ellipsis" => NodeKind::Ellipsis,
            "binary_operator" => NodeKind::BinaryOperator,
            "boolean_operator" => NodeKind::BooleanOperator,
            "comparison_operator" => NodeKind::ComparisonOperator,
            "not_operator" => NodeKind::NotOperator,
            "unary_operator" => NodeKind::UnaryOperator,
            "call" => NodeKind::Call,
            "attribute" => NodeKind::Attribute,
            "subscript" => NodeKind::Subscript,
            "slice" => NodeKind::Slice,
            "list" => NodeKind::List,
            "tuple" => NodeKind::Tuple,
            "set" => NodeKind::Set,
            "dictionary" => NodeKind::Dictionary,
            "pair" => NodeKind::Pair,
            "list_comprehension" => NodeKind::ListComprehension,
            "set_comprehension" => NodeKind::SetComprehension,
            "dictionary_comprehension" => NodeKind::DictionaryComprehension,
            "generator_expression" => NodeKind::GeneratorExpression,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "conditional_expression" => NodeKind::ConditionalExpression,
            "lambda" => NodeKind::Lambda,
            "named_expression" => NodeKind::NamedExpression,
            "await" => NodeKind::Await,
            "yield" => NodeKind::Yield,
            "list_splat" => NodeKind::ListSplat,
            "dictionary_splat" => NodeKind::DictionarySplat,
            "keyword_argument" => NodeKind::KeywordArgument,
            "expression_list" => NodeKind::ExpressionList,
            "pattern_list" => NodeKind::PatternList,
            "tuple_pattern" => NodeKind::TuplePattern,
            "list_pattern" => NodeKind::ListPattern,
            "list_splat_pattern" => NodeKind::ListSplatPattern,
            "as_pattern" => NodeKind::AsPattern,
            "type" => NodeKind::Type,
            _ => NodeKind::Other,
        }
    }

    pub fn of(node: Node) -> NodeKind {
        NodeKind::from_kind(node.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kinds_map_to_other() {
        assert_eq!(NodeKind::from_kind("keyword_pattern"), NodeKind::Other);
        assert_eq!(NodeKind::from_kind("except_group_clause"), NodeKind::ExceptClause);
        assert_eq!(NodeKind::from_kind("ERROR"), NodeKind::Error);
    }
}
