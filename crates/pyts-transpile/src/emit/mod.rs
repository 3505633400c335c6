//! The node dispatcher.
//!
//! One recursive walk over the syntax tree. Statement emitters append
//! finished lines to the output buffer; expression emitters return their
//! text. Both dispatchers match [`NodeKind`] exhaustively, and any shape
//! they cannot translate falls back to the node's source text through
//! [`Emitter::passthrough_expr`] / [`Emitter::passthrough_statement`].

mod call;
mod class;
mod comprehension;
mod expr;
mod function;
mod imports;
mod stmt;
mod strings;

pub use function::fold_decorators;

use crate::analysis::plan_scope;
use crate::context::TranslationContext;
use crate::diagnostics::FallbackKind;
use crate::kind::NodeKind;
use crate::syntax::{statements, text};
use std::collections::HashSet;
use tree_sitter::Node;

/// Identifiers Python allows that TypeScript reserves.
const RESERVED: &[&str] = &[
    "arguments", "case", "catch", "const", "debugger", "default", "delete", "do", "enum",
    "eval", "export", "extends", "false", "function", "implements", "instanceof",
    "interface", "let", "new", "null", "package", "private", "protected", "public", "static",
    "switch", "this", "throw", "true", "typeof", "undefined", "var", "void", "with",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

pub struct Emitter<'a> {
    pub ctx: TranslationContext<'a>,
    out: String,
}

impl<'a> Emitter<'a> {
    pub fn new(ctx: TranslationContext<'a>) -> Self {
        Self {
            ctx,
            out: String::new(),
        }
    }

    pub fn finish(self) -> (String, TranslationContext<'a>) {
        (self.out, self.ctx)
    }

    fn text(&self, node: Node) -> &'a str {
        text(node, self.ctx.source)
    }

    /// Write one line at the current indentation, after declaring any
    /// temporaries the line's expressions introduced.
    fn line(&mut self, line: impl AsRef<str>) {
        self.flush_temps();
        self.raw_line(line.as_ref());
    }

    fn raw_line(&mut self, line: &str) {
        let width = self.ctx.indent * self.ctx.options.indent_width;
        for _ in 0..width {
            self.out.push(' ');
        }
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn flush_temps(&mut self) {
        if self.ctx.pending_temps.is_empty() {
            return;
        }
        let temps = std::mem::take(&mut self.ctx.pending_temps);
        self.raw_line(&format!("let {};", temps.join(", ")));
    }

    fn open(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.ctx.indent += 1;
    }

    fn close(&mut self, footer: impl AsRef<str>) {
        self.ctx.indent = self.ctx.indent.saturating_sub(1);
        self.line(footer);
    }

    /// `} else {` and friends.
    fn reopen(&mut self, middle: impl AsRef<str>) {
        self.ctx.indent = self.ctx.indent.saturating_sub(1);
        self.line(middle);
        self.ctx.indent += 1;
    }

    pub fn emit_module(&mut self, root: Node) {
        let plan = plan_scope(root, self.ctx.source, HashSet::new(), true);
        self.ctx.add_plan(plan);
        self.emit_predeclarations(root);
        self.emit_statements(root);
    }

    /// Statements of `block` in the current frame.
    fn emit_statements(&mut self, block: Node) {
        for statement in statements(block) {
            self.emit_statement(statement);
        }
    }

    /// A nested TypeScript block: its own frame, then its predeclarations.
    fn emit_block(&mut self, block: Node) {
        self.ctx.scopes.push_block();
        self.emit_predeclarations(block);
        self.emit_statements(block);
        self.ctx.scopes.pop_block();
    }

    fn emit_optional_block(&mut self, block: Option<Node>) {
        if let Some(block) = block {
            self.emit_block(block);
        }
    }

    fn emit_predeclarations(&mut self, block: Node) {
        for predeclaration in self.ctx.take_predeclarations(block.id()) {
            if self.ctx.scopes.is_visible(&predeclaration.name) {
                continue;
            }
            let name = self.ident(&predeclaration.name);
            match predeclaration.annotation {
                Some(ty) => self.line(format!("let {name}: {ty};")),
                None => self.line(format!("let {name};")),
            }
            self.ctx.scopes.declare(&predeclaration.name);
        }
    }

    pub fn emit_statement(&mut self, node: Node) {
        match NodeKind::of(node) {
            NodeKind::Module | NodeKind::Block => self.emit_statements(node),
            NodeKind::Comment => self.comment(node),
            NodeKind::Error => {
                self.passthrough_statement(node, FallbackKind::Malformed, "parse error")
            }
            NodeKind::ExpressionStatement => self.expression_statement(node),
            NodeKind::String if !self.is_fstring(node) => self.docstring(node),
            NodeKind::Ellipsis => {}
            NodeKind::Assignment => self.assignment(node),
            NodeKind::AugmentedAssignment => self.augmented_assignment(node),
            NodeKind::IfStatement => self.if_statement(node),
            NodeKind::WhileStatement => self.while_statement(node),
            NodeKind::ForStatement => self.for_statement(node),
            NodeKind::TryStatement => self.try_statement(node),
            NodeKind::WithStatement => self.with_statement(node),
            NodeKind::FunctionDefinition => self.function_definition(node, &[]),
            NodeKind::ClassDefinition => self.class_definition(node, &[]),
            NodeKind::DecoratedDefinition => self.decorated_definition(node),
            NodeKind::ReturnStatement => self.return_statement(node),
            NodeKind::PassStatement | NodeKind::FutureImportStatement => {}
            NodeKind::BreakStatement => self.break_statement(),
            NodeKind::ContinueStatement => self.line("continue;"),
            NodeKind::RaiseStatement => self.raise_statement(node),
            NodeKind::AssertStatement => self.assert_statement(node),
            NodeKind::DeleteStatement => self.delete_statement(node),
            NodeKind::GlobalStatement => self.global_statement(node),
            NodeKind::NonlocalStatement => {}
            NodeKind::ImportStatement => self.import_statement(node),
            NodeKind::ImportFromStatement => self.import_from_statement(node),
            NodeKind::TypeAliasStatement => self.type_alias_statement(node),
            NodeKind::PrintStatement => self.print_statement(node),
            NodeKind::MatchStatement | NodeKind::ExecStatement => self.passthrough_statement(
                node,
                FallbackKind::Unsupported,
                "no translation for this statement",
            ),
            NodeKind::ElifClause
            | NodeKind::ElseClause
            | NodeKind::ExceptClause
            | NodeKind::FinallyClause
            | NodeKind::Decorator => self.passthrough_statement(
                node,
                FallbackKind::StructuralMismatch,
                "clause outside its statement",
            ),
            NodeKind::Identifier
            | NodeKind::Integer
            | NodeKind::Float
            | NodeKind::String
            | NodeKind::ConcatenatedString
            | NodeKind::True
            | NodeKind::False
            | NodeKind::None
            | NodeKind::BinaryOperator
            | NodeKind::BooleanOperator
            | NodeKind::ComparisonOperator
            | NodeKind::NotOperator
            | NodeKind::UnaryOperator
            | NodeKind::Call
            | NodeKind::Attribute
            | NodeKind::Subscript
            | NodeKind::Slice
            | NodeKind::List
            | NodeKind::Tuple
            | NodeKind::Set
            | NodeKind::Dictionary
            | NodeKind::Pair
            | NodeKind::ListComprehension
            | NodeKind::SetComprehension
            | NodeKind::DictionaryComprehension
            | NodeKind::GeneratorExpression
            | NodeKind::ParenthesizedExpression
            | NodeKind::ConditionalExpression
            | NodeKind::Lambda
            | NodeKind::NamedExpression
            | NodeKind::Await
            | NodeKind::Yield
            | NodeKind::ListSplat
            | NodeKind::DictionarySplat
            | NodeKind::KeywordArgument
            | NodeKind::ExpressionList
            | NodeKind::PatternList
            | NodeKind::TuplePattern
            | NodeKind::ListPattern
            | NodeKind::ListSplatPattern
            | NodeKind::AsPattern
            | NodeKind::Type => {
                let expr = self.emit_expr(node);
                self.line(format!("{expr};"));
            }
            NodeKind::Other => self.passthrough_statement(
                node,
                FallbackKind::Unsupported,
                "unrecognized statement kind",
            ),
        }
    }

    pub fn emit_expr(&mut self, node: Node) -> String {
        match NodeKind::of(node) {
            NodeKind::Identifier => self.ident(self.text(node)),
            NodeKind::Integer => self.integer(node),
            NodeKind::Float => self.text(node).to_string(),
            NodeKind::String => self.string(node),
            NodeKind::ConcatenatedString => self.concatenated_string(node),
            NodeKind::True => "true".to_string(),
            NodeKind::False => "false".to_string(),
            NodeKind::None => "null".to_string(),
            NodeKind::Ellipsis => "undefined".to_string(),
            NodeKind::BinaryOperator => self.binary_operator(node),
            NodeKind::BooleanOperator => self.boolean_operator(node),
            NodeKind::ComparisonOperator => self.comparison(node),
            NodeKind::NotOperator => self.not_operator(node),
            NodeKind::UnaryOperator => self.unary_operator(node),
            NodeKind::Call => self.call(node, false),
            NodeKind::Attribute => self.attribute(node),
            NodeKind::Subscript => self.subscript(node),
            NodeKind::List => self.list(node),
            NodeKind::Tuple | NodeKind::ExpressionList => self.tuple(node),
            NodeKind::Set => self.set(node),
            NodeKind::Dictionary => self.dictionary(node),
            NodeKind::ListComprehension
            | NodeKind::SetComprehension
            | NodeKind::DictionaryComprehension
            | NodeKind::GeneratorExpression => self.comprehension(node),
            NodeKind::ParenthesizedExpression => self.parenthesized(node),
            NodeKind::ConditionalExpression => self.conditional(node),
            NodeKind::Lambda => self.lambda(node),
            NodeKind::NamedExpression => self.named_expression(node),
            NodeKind::Await => self.await_expr(node),
            NodeKind::Yield => self.yield_expr(node),
            NodeKind::ListSplat | NodeKind::DictionarySplat | NodeKind::ListSplatPattern => {
                self.splat(node)
            }
            NodeKind::PatternList | NodeKind::TuplePattern | NodeKind::ListPattern => {
                self.pattern(node)
            }
            NodeKind::Type => crate::types::translate(node, self.ctx.source),
            NodeKind::Error => {
                self.passthrough_expr(node, FallbackKind::Malformed, "parse error")
            }
            NodeKind::Slice | NodeKind::Pair | NodeKind::KeywordArgument | NodeKind::AsPattern => {
                self.passthrough_expr(
                    node,
                    FallbackKind::StructuralMismatch,
                    "expression outside its enclosing construct",
                )
            }
            NodeKind::Module
            | NodeKind::Block
            | NodeKind::Comment
            | NodeKind::ExpressionStatement
            | NodeKind::Assignment
            | NodeKind::AugmentedAssignment
            | NodeKind::IfStatement
            | NodeKind::ElifClause
            | NodeKind::ElseClause
            | NodeKind::WhileStatement
            | NodeKind::ForStatement
            | NodeKind::TryStatement
            | NodeKind::ExceptClause
            | NodeKind::FinallyClause
            | NodeKind::WithStatement
            | NodeKind::FunctionDefinition
            | NodeKind::ClassDefinition
            | NodeKind::DecoratedDefinition
            | NodeKind::Decorator
            | NodeKind::ReturnStatement
            | NodeKind::PassStatement
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::RaiseStatement
            | NodeKind::AssertStatement
            | NodeKind::DeleteStatement
            | NodeKind::GlobalStatement
            | NodeKind::NonlocalStatement
            | NodeKind::ImportStatement
            | NodeKind::ImportFromStatement
            | NodeKind::FutureImportStatement
            | NodeKind::TypeAliasStatement
            | NodeKind::MatchStatement
            | NodeKind::PrintStatement
            | NodeKind::ExecStatement => self.passthrough_expr(
                node,
                FallbackKind::StructuralMismatch,
                "statement in expression position",
            ),
            NodeKind::Other => self.passthrough_expr(
                node,
                FallbackKind::Unsupported,
                "unrecognized expression kind",
            ),
        }
    }

    /// Emit the first named child of `node`, or fall back when there is none.
    fn emit_child(&mut self, node: Node, field: &str) -> String {
        match node.child_by_field_name(field) {
            Some(child) => self.emit_expr(child),
            None => self.passthrough_expr(
                node,
                FallbackKind::StructuralMismatch,
                format!("missing `{field}`"),
            ),
        }
    }

    fn emit_list(&mut self, nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|node| self.emit_expr(*node)).collect()
    }

    pub(crate) fn passthrough_expr(
        &mut self,
        node: Node,
        kind: FallbackKind,
        message: impl Into<String>,
    ) -> String {
        self.ctx.diagnostics.record(node, kind, message);
        self.text(node).to_string()
    }

    pub(crate) fn passthrough_statement(
        &mut self,
        node: Node,
        kind: FallbackKind,
        message: impl Into<String>,
    ) {
        self.ctx.diagnostics.record(node, kind, message);
        let column = node.start_position().column;
        for (index, raw) in self.text(node).lines().enumerate() {
            let line = if index == 0 {
                raw
            } else {
                let indent = raw.len() - raw.trim_start_matches([' ', '\t']).len();
                &raw[indent.min(column)..]
            };
            self.line(line.trim_end());
        }
    }

    fn comment(&mut self, node: Node) {
        let raw = self.text(node);
        let body = raw.strip_prefix('#').unwrap_or(raw);
        self.line(format!("//{body}"));
    }

    /// A TypeScript name for a Python identifier.
    fn ident(&self, name: &str) -> String {
        if let Some(receiver) = &self.ctx.receiver {
            if receiver.name == name {
                return "this".to_string();
            }
        }
        if is_reserved(name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }
}

/// Remove one pair of parentheses wrapping the whole of `expr`.
pub(crate) fn strip_parens(expr: &str) -> &str {
    if !(expr.starts_with('(') && expr.ends_with(')')) {
        return expr;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let last = expr.len() - 1;
    for (index, c) in expr.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '`' => return expr,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && index != last {
                    return expr;
                }
            }
            _ => {}
        }
    }
    &expr[1..last]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(a < b)"), "a < b");
        assert_eq!(strip_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(strip_parens("(f(\")\"))"), "f(\")\")");
        assert_eq!(strip_parens("x"), "x");
    }

    #[test]
    fn test_reserved_identifiers() {
        assert!(is_reserved("new"));
        assert!(is_reserved("function"));
        assert!(!is_reserved("print"));
    }
}
