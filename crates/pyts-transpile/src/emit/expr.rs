//! Operators, subscripts, container literals and assignment targets.

use super::{strip_parens, Emitter};
use crate::diagnostics::FallbackKind;
use crate::syntax::{children, children_by_field, has_token, named_children};
use pyts_runtime::Primitive;
use tree_sitter::Node;

impl<'a> Emitter<'a> {
    pub(super) fn integer(&mut self, node: Node) -> String {
        let raw = self.text(node);
        if raw.ends_with(['j', 'J']) {
            return self.passthrough_expr(node, FallbackKind::Unsupported, "complex literal");
        }
        let digits = raw.trim_end_matches(['l', 'L']);
        // Python 2 octal.
        if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
            let trimmed = digits.trim_start_matches('0');
            return if trimmed.is_empty() {
                "0".to_string()
            } else {
                format!("0o{trimmed}")
            };
        }
        digits.to_string()
    }

    pub(super) fn binary_operator(&mut self, node: Node) -> String {
        let (Some(left), Some(operator), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("operator"),
            node.child_by_field_name("right"),
        ) else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete binary operation");
        };
        let operator = self.text(operator);
        match operator {
            "+" if left.kind() == "list" || right.kind() == "list" => {
                let mut items = self.spread_items(left);
                items.extend(self.spread_items(right));
                return format!("[{}]", items.join(", "));
            }
            "*" => {
                if let Some(repeated) = self.repetition(left, right) {
                    return repeated;
                }
            }
            "@" => return self.passthrough_expr(node, FallbackKind::Unsupported, "matrix multiplication"),
            _ => {}
        }
        let lhs = self.emit_expr(left);
        let rhs = self.emit_expr(right);
        let helper = match operator {
            "//" => Primitive::FloorDiv,
            "%" => Primitive::Mod,
            "**" => Primitive::Pow,
            _ => return format!("({lhs} {operator} {rhs})"),
        };
        self.ctx.deps.require(helper);
        format!("{}({lhs}, {rhs})", helper.name())
    }

    /// Elements of one side of a list concatenation.
    fn spread_items(&mut self, node: Node) -> Vec<String> {
        if node.kind() == "list" {
            self.emit_list(&named_children(node))
        } else {
            vec![format!("...{}", self.emit_expr(node))]
        }
    }

    /// `"ab" * 3` and `[0] * n`.
    fn repetition(&mut self, left: Node, right: Node) -> Option<String> {
        let plain_string = |node: Node| node.kind() == "string" && !self.is_fstring(node);
        if plain_string(left) || plain_string(right) {
            let (text, count) = if plain_string(left) { (left, right) } else { (right, left) };
            let text = self.emit_expr(text);
            let count = self.emit_expr(count);
            return Some(format!("{text}.repeat({count})"));
        }
        let (list, count) = match (left.kind(), right.kind()) {
            ("list", _) => (left, right),
            (_, "list") => (right, left),
            _ => return None,
        };
        let items = self.emit_list(&named_children(list));
        let count = self.emit_expr(count);
        Some(match items.as_slice() {
            [single] if !single.starts_with("...") => format!("new Array({count}).fill({single})"),
            _ => format!("Array.from({{ length: {count} }}, () => [{}]).flat()", items.join(", ")),
        })
    }

    pub(super) fn boolean_operator(&mut self, node: Node) -> String {
        let (Some(left), Some(operator), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("operator"),
            node.child_by_field_name("right"),
        ) else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete boolean operation");
        };
        let operator = if self.text(operator) == "and" { "&&" } else { "||" };
        let lhs = self.emit_expr(left);
        let rhs = self.emit_expr(right);
        format!("({lhs} {operator} {rhs})")
    }

    /// Comparison chains. Middle operands with effects are evaluated once
    /// through a hoisted temporary.
    pub(super) fn comparison(&mut self, node: Node) -> String {
        let operands = named_children(node);
        let operators: Vec<&str> = children_by_field(node, "operators")
            .into_iter()
            .map(|op| op.kind())
            .collect();
        if operands.len() != operators.len() + 1 {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "unbalanced comparison");
        }
        let last = operands.len() - 1;
        // (text at first use, text at second use)
        let mut rendered: Vec<(String, String)> = Vec::new();
        for (index, operand) in operands.iter().enumerate() {
            let text = self.emit_expr(*operand);
            let middle = index > 0 && index < last;
            if middle && self.ctx.options.hoist_chain_operands && !self.is_pure(*operand) {
                let temp = self.ctx.fresh("__cmp");
                self.ctx.pending_temps.push(temp.clone());
                rendered.push((format!("({temp} = {text})"), temp));
            } else {
                rendered.push((text.clone(), text));
            }
        }
        let mut pairs = Vec::new();
        for (index, operator) in operators.iter().enumerate() {
            let lhs = if index == 0 {
                rendered[0].0.clone()
            } else {
                rendered[index].1.clone()
            };
            let rhs = rendered[index + 1].0.clone();
            pairs.push(self.compare(&lhs, operator, &rhs));
        }
        match pairs.as_slice() {
            [single] => single.clone(),
            _ => format!("({})", pairs.join(" && ")),
        }
    }

    fn compare(&mut self, lhs: &str, operator: &str, rhs: &str) -> String {
        match operator {
            "==" | "is" => format!("({lhs} === {rhs})"),
            "!=" | "<>" | "is not" => format!("({lhs} !== {rhs})"),
            "in" => {
                self.ctx.deps.require(Primitive::IsIn);
                format!("isIn({lhs}, {rhs})")
            }
            "not in" => {
                self.ctx.deps.require(Primitive::IsIn);
                format!("!isIn({lhs}, {rhs})")
            }
            _ => format!("({lhs} {operator} {rhs})"),
        }
    }

    /// Evaluating twice is unobservable.
    fn is_pure(&self, node: Node) -> bool {
        match node.kind() {
            "identifier" | "integer" | "float" | "true" | "false" | "none" => true,
            "string" => !self.is_fstring(node),
            "attribute" => node.child_by_field_name("object").is_some_and(|o| self.is_pure(o)),
            "parenthesized_expression" => node.named_child(0).is_some_and(|inner| self.is_pure(inner)),
            _ => false,
        }
    }

    pub(super) fn not_operator(&mut self, node: Node) -> String {
        let Some(argument) = node.child_by_field_name("argument") else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "missing operand");
        };
        let text = self.emit_expr(argument);
        match argument.kind() {
            "identifier" | "call" | "attribute" | "subscript" | "parenthesized_expression"
            | "comparison_operator" | "boolean_operator" | "true" | "false" | "not_operator" => {
                format!("!{text}")
            }
            _ => format!("!({text})"),
        }
    }

    pub(super) fn unary_operator(&mut self, node: Node) -> String {
        let (Some(operator), Some(argument)) = (
            node.child_by_field_name("operator"),
            node.child_by_field_name("argument"),
        ) else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "missing operand");
        };
        let operator = self.text(operator);
        let text = self.emit_expr(argument);
        if text.starts_with(['-', '+', '~']) {
            format!("{operator}({text})")
        } else {
            format!("{operator}{text}")
        }
    }

    pub(super) fn attribute(&mut self, node: Node) -> String {
        let (Some(object), Some(attribute)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("attribute"),
        ) else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete attribute");
        };
        let object = if self.is_super_call(object) {
            "super".to_string()
        } else {
            self.emit_expr(object)
        };
        let attribute = match self.text(attribute) {
            "__class__" => "constructor",
            "__name__" => "name",
            other => other,
        };
        format!("{object}.{attribute}")
    }

    pub(super) fn subscript(&mut self, node: Node) -> String {
        let Some(value) = node.child_by_field_name("value") else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "subscript without value");
        };
        let indices = children_by_field(node, "subscript");
        let [index] = indices.as_slice() else {
            return self.passthrough_expr(node, FallbackKind::Unsupported, "multi-dimensional subscript");
        };
        let object = self.emit_expr(value);
        if index.kind() == "slice" {
            return self.slice(&object, *index);
        }
        let rendered = self.emit_expr(*index);
        if negated_operand(*index).is_some() {
            self.ctx.deps.require(Primitive::At);
            return format!("at({object}, {rendered})");
        }
        format!("{object}[{rendered}]")
    }

    /// All three slots are always passed, `undefined` where omitted.
    fn slice(&mut self, object: &str, slice: Node) -> String {
        let mut slots: [Option<String>; 3] = [None, None, None];
        let mut position = 0;
        for child in children(slice) {
            if child.kind() == ":" {
                position += 1;
            } else if child.is_named() && child.kind() != "comment" && position < 3 {
                slots[position] = Some(self.emit_expr(child));
            }
        }
        let [start, stop, step] = slots.map(|slot| slot.unwrap_or_else(|| "undefined".to_string()));
        self.ctx.deps.require(Primitive::Slice);
        format!("slice({object}, {start}, {stop}, {step})")
    }

    pub(super) fn list(&mut self, node: Node) -> String {
        let items = self.emit_list(&named_children(node));
        format!("[{}]", items.join(", "))
    }

    pub(super) fn tuple(&mut self, node: Node) -> String {
        self.list(node)
    }

    pub(super) fn set(&mut self, node: Node) -> String {
        let items = self.emit_list(&named_children(node));
        format!("new Set([{}])", items.join(", "))
    }

    pub(super) fn dictionary(&mut self, node: Node) -> String {
        let mut entries = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        child.child_by_field_name("key"),
                        child.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    let key = match key.kind() {
                        "string" if !self.is_fstring(key) => self.emit_expr(key),
                        "integer" | "float" => self.text(key).to_string(),
                        _ => format!("[{}]", self.emit_expr(key)),
                    };
                    let value = self.emit_expr(value);
                    entries.push(format!("{key}: {value}"));
                }
                _ => entries.push(self.emit_expr(child)),
            }
        }
        if entries.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }

    pub(super) fn parenthesized(&mut self, node: Node) -> String {
        let Some(inner) = named_children(node).into_iter().next() else {
            return "[]".to_string();
        };
        let text = self.emit_expr(inner);
        match inner.kind() {
            "yield" | "lambda" | "await" | "not_operator" | "unary_operator" => format!("({text})"),
            _ => text,
        }
    }

    /// `a if c else b`
    pub(super) fn conditional(&mut self, node: Node) -> String {
        let parts = named_children(node);
        let [then, condition, otherwise] = parts.as_slice() else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete conditional");
        };
        let condition = self.emit_expr(*condition);
        let then = self.emit_expr(*then);
        let otherwise = self.emit_expr(*otherwise);
        format!("({} ? {then} : {otherwise})", strip_parens(&condition))
    }

    pub(super) fn named_expression(&mut self, node: Node) -> String {
        let (Some(name), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete walrus");
        };
        let value = self.emit_expr(value);
        let name = self.text(name);
        self.ctx.scopes.declare_in_function(name);
        format!("({} = {value})", self.ident(name))
    }

    pub(super) fn await_expr(&mut self, node: Node) -> String {
        match named_children(node).first() {
            Some(inner) => format!("await {}", self.emit_expr(*inner)),
            None => self.passthrough_expr(node, FallbackKind::Malformed, "empty await"),
        }
    }

    pub(super) fn yield_expr(&mut self, node: Node) -> String {
        let delegate = has_token(node, "from");
        match named_children(node).first() {
            Some(value) => {
                let value = self.emit_expr(*value);
                if delegate {
                    format!("yield* {value}")
                } else {
                    format!("yield {value}")
                }
            }
            None => "yield".to_string(),
        }
    }

    pub(super) fn splat(&mut self, node: Node) -> String {
        match named_children(node).first() {
            Some(inner) => format!("...{}", self.emit_expr(*inner)),
            None => self.passthrough_expr(node, FallbackKind::Malformed, "empty splat"),
        }
    }

    /// A destructuring pattern: `[a, [b, c], ...rest]`.
    pub(super) fn pattern(&mut self, node: Node) -> String {
        let mut items = Vec::new();
        for child in named_children(node) {
            let item = match self.target_text(child) {
                Some(item) => item,
                None => self.emit_expr(child),
            };
            items.push(item);
        }
        format!("[{}]", items.join(", "))
    }

    /// Text of an assignable location, or `None` when TypeScript has no
    /// matching target.
    pub(super) fn target_text(&mut self, target: Node) -> Option<String> {
        match target.kind() {
            "identifier" => Some(self.ident(self.text(target))),
            "attribute" => Some(self.attribute(target)),
            "subscript" => {
                let value = target.child_by_field_name("value")?;
                let indices = children_by_field(target, "subscript");
                let [index] = indices.as_slice() else {
                    return None;
                };
                if index.kind() == "slice" {
                    return None;
                }
                let object = self.emit_expr(value);
                if let Some(operand) = negated_operand(*index) {
                    let offset = self.emit_expr(operand);
                    let offset = strip_parens(&offset);
                    let offset = if offset.contains(' ') {
                        format!("({offset})")
                    } else {
                        offset.to_string()
                    };
                    return Some(format!("{object}[{object}.length - {offset}]"));
                }
                let rendered = self.emit_expr(*index);
                Some(format!("{object}[{rendered}]"))
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list" | "expression_list" => {
                Some(self.pattern(target))
            }
            "list_splat_pattern" | "list_splat" => {
                let inner = target.named_child(0)?;
                Some(format!("...{}", self.target_text(inner)?))
            }
            "parenthesized_expression" => self.target_text(target.named_child(0)?),
            _ => None,
        }
    }

    /// `super()` with or without arguments.
    pub(super) fn is_super_call(&self, node: Node) -> bool {
        node.kind() == "call"
            && node
                .child_by_field_name("function")
                .is_some_and(|f| self.text(f) == "super")
    }
}

/// The operand of an index counted from the end: `-1`, `-n`, `(-(n))`.
fn negated_operand(node: Node) -> Option<Node> {
    match node.kind() {
        "parenthesized_expression" => negated_operand(node.named_child(0)?),
        "unary_operator" => node
            .child_by_field_name("operator")
            .filter(|op| op.kind() == "-")
            .and_then(|_| node.child_by_field_name("argument")),
        _ => None,
    }
}
