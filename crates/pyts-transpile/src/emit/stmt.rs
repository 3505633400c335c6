//! Statement lowering: assignment, control flow, exceptions.

use super::{strip_parens, Emitter};
use crate::diagnostics::FallbackKind;
use crate::syntax::{children_by_field, except_parts, has_token, named_children, with_items, ExceptParts};
use crate::types;
use pyts_runtime::Primitive;
use tree_sitter::Node;

const PATTERN_KINDS: &[&str] = &[
    "pattern_list",
    "tuple_pattern",
    "list_pattern",
    "tuple",
    "list",
    "expression_list",
];

impl<'a> Emitter<'a> {
    pub(super) fn expression_statement(&mut self, node: Node) {
        let children = named_children(node);
        match children.as_slice() {
            [] => {}
            [single] => match single.kind() {
                "assignment" => self.assignment(*single),
                "augmented_assignment" => self.augmented_assignment(*single),
                "string" if !self.is_fstring(*single) => self.docstring(*single),
                "ellipsis" => {}
                _ => {
                    let expr = self.emit_expr(*single);
                    self.line(format!("{expr};"));
                }
            },
            many => {
                let items = self.emit_list(many);
                self.line(format!("[{}];", items.join(", ")));
            }
        }
    }

    pub(super) fn assignment(&mut self, node: Node) {
        let Some(left) = node.child_by_field_name("left") else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "assignment without target");
        };
        let annotation = node.child_by_field_name("type");
        let mut targets = vec![left];
        let mut value = node.child_by_field_name("right");
        while let Some(inner) = value.filter(|v| v.kind() == "assignment") {
            if let Some(target) = inner.child_by_field_name("left") {
                targets.push(target);
            }
            value = inner.child_by_field_name("right");
        }

        let Some(value) = value else {
            self.bare_annotation(left, annotation);
            return;
        };
        if targets.len() == 1 && left.kind() == "identifier" && self.type_level_assignment(left, value, annotation) {
            return;
        }

        let rendered = self.emit_expr(value);
        match targets.as_slice() {
            [single] => self.assign(*single, rendered, annotation),
            [first, rest @ ..] if first.kind() == "identifier" => {
                let name = self.text(*first);
                self.assign(*first, rendered, annotation);
                let shared = self.ident(name);
                for target in rest {
                    self.assign(*target, shared.clone(), None);
                }
            }
            _ => {
                let temp = self.ctx.fresh("__chain");
                self.line(format!("const {temp} = {rendered};"));
                for target in targets {
                    self.assign(target, temp.clone(), None);
                }
            }
        }
    }

    /// `x: int` with no value declares the name once.
    fn bare_annotation(&mut self, left: Node, annotation: Option<Node>) {
        if left.kind() != "identifier" {
            return;
        }
        let name = self.text(left);
        if self.ctx.scopes.is_visible(name) {
            return;
        }
        let ident = self.ident(name);
        match annotation.and_then(|a| types::declared_type(a, self.ctx.source)) {
            Some(ty) => self.line(format!("let {ident}: {ty};")),
            None => self.line(format!("let {ident};")),
        }
        self.ctx.scopes.declare(name);
    }

    /// TypeVar, NewType and TypeAlias assignments become type-level
    /// declarations, or vanish.
    fn type_level_assignment(&mut self, left: Node, value: Node, annotation: Option<Node>) -> bool {
        let name = self.text(left);
        if let Some(annotation) = annotation {
            let spelled = self.text(annotation);
            if spelled == "TypeAlias" || spelled.ends_with(".TypeAlias") {
                let ty = types::translate(value, self.ctx.source);
                self.line(format!("type {name} = {ty};"));
                self.ctx.scopes.declare(name);
                return true;
            }
        }
        if value.kind() != "call" {
            return false;
        }
        let Some(callee) = value.child_by_field_name("function") else {
            return false;
        };
        let callee = self.text(callee);
        match callee.rsplit('.').next().unwrap_or(callee) {
            "TypeVar" | "ParamSpec" | "TypeVarTuple" => {
                self.ctx.type_vars.insert(name.to_string());
                true
            }
            "NewType" => {
                let base = value
                    .child_by_field_name("arguments")
                    .and_then(|args| named_children(args).get(1).copied())
                    .map(|base| types::translate(base, self.ctx.source))
                    .unwrap_or_else(|| "any".to_string());
                self.line(format!("type {name} = {base};"));
                self.ctx.scopes.declare(name);
                true
            }
            _ => false,
        }
    }

    /// Bind one target to already-rendered value text.
    pub(super) fn assign(&mut self, target: Node, value: String, annotation: Option<Node>) {
        match target.kind() {
            "identifier" => {
                let name = self.text(target);
                let ident = self.ident(name);
                if self.ctx.scopes.is_visible(name) {
                    self.line(format!("{ident} = {value};"));
                    return;
                }
                let (keyword, ty) = match annotation {
                    Some(a) => {
                        let qualifiers = types::qualifiers(a, self.ctx.source);
                        let keyword = if qualifiers.final_ { "const" } else { "let" };
                        (keyword, types::declared_type(a, self.ctx.source))
                    }
                    None => ("let", None),
                };
                match ty {
                    Some(ty) => self.line(format!("{keyword} {ident}: {ty} = {value};")),
                    None => self.line(format!("{keyword} {ident} = {value};")),
                }
                self.ctx.scopes.declare(name);
            }
            "parenthesized_expression" => match target.named_child(0) {
                Some(inner) => self.assign(inner, value, annotation),
                None => self.passthrough_statement(target, FallbackKind::Malformed, "empty target"),
            },
            kind if PATTERN_KINDS.contains(&kind) => {
                let mut names = Vec::new();
                self.pattern_names(target, &mut names);
                let pattern = self.pattern(target);
                let fresh = names.iter().all(|name| !self.ctx.scopes.is_visible(name));
                if self.is_simple_pattern(target) && fresh {
                    self.line(format!("let {pattern} = {value};"));
                } else {
                    let missing: Vec<String> = names
                        .iter()
                        .filter(|name| !self.ctx.scopes.is_visible(name))
                        .cloned()
                        .collect();
                    for name in &missing {
                        let ident = self.ident(name);
                        self.line(format!("let {ident};"));
                        self.ctx.scopes.declare(name);
                    }
                    self.line(format!("{pattern} = {value};"));
                }
                for name in &names {
                    self.ctx.scopes.declare(name);
                }
            }
            _ => match self.target_text(target) {
                Some(rendered) => self.line(format!("{rendered} = {value};")),
                None => self.passthrough_statement(target, FallbackKind::Unsupported, "assignment target"),
            },
        }
    }

    /// Identifier names of a target in source order, without duplicates.
    pub(super) fn pattern_names(&self, target: Node, out: &mut Vec<String>) {
        match target.kind() {
            "identifier" => {
                let name = self.text(target).to_string();
                if !out.contains(&name) {
                    out.push(name);
                }
            }
            "list_splat_pattern" | "list_splat" | "parenthesized_expression" => {
                for child in named_children(target) {
                    self.pattern_names(child, out);
                }
            }
            kind if PATTERN_KINDS.contains(&kind) => {
                for child in named_children(target) {
                    self.pattern_names(child, out);
                }
            }
            _ => {}
        }
    }

    /// Only names, nested patterns and starred names: a `let` can bind it.
    pub(super) fn is_simple_pattern(&self, target: Node) -> bool {
        match target.kind() {
            "identifier" => true,
            "list_splat_pattern" | "list_splat" | "parenthesized_expression" => {
                named_children(target).into_iter().all(|c| self.is_simple_pattern(c))
            }
            kind if PATTERN_KINDS.contains(&kind) => {
                named_children(target).into_iter().all(|c| self.is_simple_pattern(c))
            }
            _ => false,
        }
    }

    pub(super) fn augmented_assignment(&mut self, node: Node) {
        let (Some(left), Some(operator), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("operator"),
            node.child_by_field_name("right"),
        ) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete augmented assignment");
        };
        let Some(target) = self.target_text(left) else {
            return self.passthrough_statement(node, FallbackKind::Unsupported, "augmented assignment target");
        };
        let operator = self.text(operator);
        if operator == "+=" && right.kind() == "list" {
            let items = self.emit_list(&named_children(right));
            self.line(format!("{target}.push({});", items.join(", ")));
            return;
        }
        let value = self.emit_expr(right);
        let helper = match operator {
            "//=" => Primitive::FloorDiv,
            "%=" => Primitive::Mod,
            "**=" => Primitive::Pow,
            "+=" | "-=" | "*=" | "/=" | "&=" | "|=" | "^=" | "<<=" | ">>=" => {
                self.line(format!("{target} {operator} {value};"));
                return;
            }
            _ => {
                return self.passthrough_statement(node, FallbackKind::Unsupported, format!("operator `{operator}`"));
            }
        };
        self.ctx.deps.require(helper);
        self.line(format!("{target} = {}({target}, {value});", helper.name()));
    }

    fn condition(&mut self, node: Node, field: &str) -> String {
        let rendered = self.emit_child(node, field);
        strip_parens(&rendered).to_string()
    }

    pub(super) fn if_statement(&mut self, node: Node) {
        let condition = self.condition(node, "condition");
        let mut branches = Vec::new();
        let mut otherwise = None;
        for clause in children_by_field(node, "alternative") {
            match clause.kind() {
                "elif_clause" => {
                    let condition = self.condition(clause, "condition");
                    branches.push((condition, clause.child_by_field_name("consequence")));
                }
                "else_clause" => otherwise = clause.child_by_field_name("body"),
                _ => {}
            }
        }
        self.open(format!("if ({condition}) {{"));
        self.emit_optional_block(node.child_by_field_name("consequence"));
        for (condition, body) in branches {
            self.reopen(format!("}} else if ({condition}) {{"));
            self.emit_optional_block(body);
        }
        if let Some(body) = otherwise {
            self.reopen("} else {");
            self.emit_block(body);
        }
        self.close("}");
    }

    /// `else` on a loop runs when no `break` fired.
    fn loop_else_flag(&mut self, node: Node) -> Option<String> {
        node.child_by_field_name("alternative")?;
        let flag = self.ctx.fresh("__noBreak");
        self.line(format!("let {flag} = true;"));
        Some(flag)
    }

    fn loop_else(&mut self, node: Node, flag: Option<String>) {
        let (Some(flag), Some(alternative)) = (flag, node.child_by_field_name("alternative")) else {
            return;
        };
        self.open(format!("if ({flag}) {{"));
        self.emit_optional_block(alternative.child_by_field_name("body"));
        self.close("}");
    }

    pub(super) fn while_statement(&mut self, node: Node) {
        let condition = self.condition(node, "condition");
        let flag = self.loop_else_flag(node);
        self.open(format!("while ({condition}) {{"));
        self.ctx.loop_flags.push(flag.clone());
        self.emit_optional_block(node.child_by_field_name("body"));
        self.ctx.loop_flags.pop();
        self.close("}");
        self.loop_else(node, flag);
    }

    pub(super) fn for_statement(&mut self, node: Node) {
        let (Some(left), Some(right)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete for loop");
        };
        let iterable = self.emit_expr(right);
        let flag = self.loop_else_flag(node);
        let Some((head, inline)) = self.loop_head(left) else {
            return self.passthrough_statement(node, FallbackKind::Unsupported, "loop target");
        };
        let keyword = if has_token(node, "async") { "for await" } else { "for" };
        self.ctx.scopes.push_block();
        for name in &inline {
            self.ctx.scopes.declare(name);
        }
        self.open(format!("{keyword} ({head} of {iterable}) {{"));
        self.ctx.loop_flags.push(flag.clone());
        self.emit_optional_block(node.child_by_field_name("body"));
        self.ctx.loop_flags.pop();
        self.close("}");
        self.ctx.scopes.pop_block();
        self.loop_else(node, flag);
    }

    /// Loop head text and the names it declares itself.
    fn loop_head(&mut self, left: Node) -> Option<(String, Vec<String>)> {
        match left.kind() {
            "identifier" => {
                let name = self.text(left);
                let ident = self.ident(name);
                if self.ctx.scopes.is_visible(name) {
                    Some((ident, Vec::new()))
                } else {
                    Some((format!("let {ident}"), vec![name.to_string()]))
                }
            }
            kind if PATTERN_KINDS.contains(&kind) => {
                let mut names = Vec::new();
                self.pattern_names(left, &mut names);
                let pattern = self.pattern(left);
                let fresh = names.iter().all(|name| !self.ctx.scopes.is_visible(name));
                if fresh && self.is_simple_pattern(left) {
                    return Some((format!("let {pattern}"), names));
                }
                for name in names {
                    if !self.ctx.scopes.is_visible(&name) {
                        let ident = self.ident(&name);
                        self.line(format!("let {ident};"));
                        self.ctx.scopes.declare(&name);
                    }
                }
                Some((pattern, Vec::new()))
            }
            "parenthesized_expression" => self.loop_head(left.named_child(0)?),
            _ => self.target_text(left).map(|text| (text, Vec::new())),
        }
    }

    pub(super) fn try_statement(&mut self, node: Node) {
        let mut body = None;
        let mut handlers = Vec::new();
        let mut otherwise = None;
        let mut finally = None;
        for child in named_children(node) {
            match child.kind() {
                "block" => body = Some(child),
                "except_clause" | "except_group_clause" => handlers.push(except_parts(child)),
                "else_clause" => otherwise = child.child_by_field_name("body"),
                "finally_clause" => {
                    finally = named_children(child).into_iter().find(|c| c.kind() == "block")
                }
                _ => {}
            }
        }

        let completed = otherwise.map(|_| self.ctx.fresh("__ok"));
        if let Some(flag) = &completed {
            self.line(format!("let {flag} = false;"));
        }
        // The else block must run before the finally block.
        let wrap = completed.is_some() && finally.is_some() && !handlers.is_empty();
        if wrap {
            self.open("try {");
        }
        self.open("try {");
        self.emit_optional_block(body);
        if let Some(flag) = &completed {
            self.line(format!("{flag} = true;"));
        }
        if !handlers.is_empty() {
            self.catch_clauses(&handlers);
        }
        if let (false, Some(finally)) = (wrap, finally) {
            self.reopen("} finally {");
            self.emit_block(finally);
        }
        self.close("}");
        if let (Some(flag), Some(otherwise)) = (&completed, otherwise) {
            self.open(format!("if ({flag}) {{"));
            self.emit_block(otherwise);
            self.close("}");
        }
        if let (true, Some(finally)) = (wrap, finally) {
            self.reopen("} finally {");
            self.emit_block(finally);
            self.close("}");
        }
    }

    /// One `catch` with an `instanceof` chain over the handlers. Nothing
    /// matching rethrows.
    fn catch_clauses(&mut self, handlers: &[ExceptParts]) {
        let mut aliases: Vec<&str> = Vec::new();
        for alias in handlers.iter().filter_map(|h| h.alias) {
            let name = self.text(alias);
            if !aliases.contains(&name) {
                aliases.push(name);
            }
        }
        let shared = match aliases.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        let var = shared.map_or_else(|| "__err".to_string(), |name| self.ident(name));
        self.reopen(format!("}} catch ({var}) {{"));
        self.ctx.catch_vars.push(var.clone());
        self.ctx.scopes.push_block();
        if let Some(name) = shared {
            self.ctx.scopes.declare(name);
        }

        let mut opened = false;
        let mut exhaustive = false;
        for handler in handlers {
            let test = handler.types.and_then(|types| self.exception_test(&var, types));
            match (test, opened) {
                (None, false) => {
                    self.handler_body(handler, &var);
                    exhaustive = true;
                    break;
                }
                (None, true) => {
                    self.reopen("} else {");
                    self.handler_body(handler, &var);
                    exhaustive = true;
                    break;
                }
                (Some(test), false) => {
                    self.open(format!("if ({test}) {{"));
                    opened = true;
                }
                (Some(test), true) => self.reopen(format!("}} else if ({test}) {{")),
            }
            self.handler_body(handler, &var);
        }
        if opened {
            if !exhaustive {
                self.reopen("} else {");
                self.line(format!("throw {var};"));
            }
            self.close("}");
        }

        self.ctx.scopes.pop_block();
        self.ctx.catch_vars.pop();
    }

    fn handler_body(&mut self, handler: &ExceptParts, var: &str) {
        self.ctx.scopes.push_block();
        if let Some(body) = handler.body {
            self.emit_predeclarations(body);
        }
        if let Some(alias) = handler.alias {
            let name = self.text(alias);
            let ident = self.ident(name);
            if ident != var {
                self.line(format!("let {ident} = {var};"));
                self.ctx.scopes.declare(name);
            }
        }
        if let Some(body) = handler.body {
            self.emit_statements(body);
        }
        self.ctx.scopes.pop_block();
    }

    /// `instanceof` test for an except clause, or `None` when it catches
    /// everything.
    fn exception_test(&mut self, var: &str, types: Node) -> Option<String> {
        match types.kind() {
            "tuple" | "expression_list" => {
                let mut tests = Vec::new();
                for member in named_children(types) {
                    tests.push(self.exception_test(var, member)?);
                }
                Some(tests.join(" || "))
            }
            "parenthesized_expression" => self.exception_test(var, types.named_child(0)?),
            _ => {
                let spelled = self.text(types);
                let last = spelled.rsplit('.').next().unwrap_or(spelled);
                if matches!(last, "Exception" | "BaseException") && !self.ctx.is_user_defined(last) {
                    return None;
                }
                let class = self.class_reference(types);
                Some(format!("{var} instanceof {class}"))
            }
        }
    }

    pub(super) fn with_statement(&mut self, node: Node) {
        let is_async = has_token(node, "async");
        let items = with_items(node);
        // Later targets must outlive their try blocks.
        for (_, target) in items.iter().skip(1) {
            if let Some(target) = target.filter(|t| t.kind() == "identifier") {
                let name = self.text(target);
                if !self.ctx.scopes.is_visible(name) {
                    let ident = self.ident(name);
                    self.line(format!("let {ident};"));
                    self.ctx.scopes.declare(name);
                }
            }
        }
        let mut resources = Vec::new();
        for (value, target) in items {
            let rendered = self.emit_expr(value);
            let rendered = if is_async { format!("await {rendered}") } else { rendered };
            let resource = match target {
                Some(target) if target.kind() == "identifier" => {
                    self.assign(target, rendered, None);
                    self.ident(self.text(target))
                }
                Some(target) => {
                    let temp = self.ctx.fresh("__res");
                    self.line(format!("const {temp} = {rendered};"));
                    self.assign(target, temp.clone(), None);
                    temp
                }
                None => {
                    let temp = self.ctx.fresh("__res");
                    self.line(format!("const {temp} = {rendered};"));
                    temp
                }
            };
            self.open("try {");
            resources.push(resource);
        }
        self.emit_optional_block(node.child_by_field_name("body"));
        for resource in resources.iter().rev() {
            self.reopen("} finally {");
            if is_async {
                self.line(format!("await {resource}[Symbol.asyncDispose]();"));
            } else {
                self.line(format!("{resource}[Symbol.dispose]();"));
            }
            self.close("}");
        }
    }

    pub(super) fn return_statement(&mut self, node: Node) {
        match named_children(node).first() {
            Some(value) => {
                let value = self.emit_expr(*value);
                self.line(format!("return {value};"));
            }
            None => self.line("return;"),
        }
    }

    pub(super) fn break_statement(&mut self) {
        if let Some(Some(flag)) = self.ctx.loop_flags.last() {
            let flag = flag.clone();
            self.line(format!("{flag} = false;"));
        }
        self.line("break;");
    }

    pub(super) fn raise_statement(&mut self, node: Node) {
        let Some(exception) = named_children(node).into_iter().next() else {
            match self.ctx.catch_vars.last() {
                Some(var) => {
                    let var = var.clone();
                    self.line(format!("throw {var};"));
                }
                None => {
                    self.ctx.deps.require(Primitive::RuntimeError);
                    self.line("throw new RuntimeError(\"No active exception to reraise\");");
                }
            }
            return;
        };
        let thrown = match exception.kind() {
            "call" => self.call(exception, true),
            "identifier" | "attribute" if self.names_class(exception) => {
                let class = self.class_reference(exception);
                format!("new {class}()")
            }
            _ => self.emit_expr(exception),
        };
        self.line(format!("throw {thrown};"));
    }

    /// Whether a bare name in `raise X` refers to a class.
    fn names_class(&self, node: Node) -> bool {
        let spelled = self.text(node);
        let last = spelled.rsplit('.').next().unwrap_or(spelled);
        self.ctx.classes.contains(last)
            || Primitive::for_builtin(last).is_some_and(Primitive::is_exception)
            || (last.starts_with(|c: char| c.is_ascii_uppercase()) && !self.ctx.scopes.is_visible(last))
    }

    pub(super) fn assert_statement(&mut self, node: Node) {
        let parts = named_children(node);
        let Some(test) = parts.first() else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "empty assert");
        };
        let test = self.emit_expr(*test);
        let message = match parts.get(1) {
            Some(message) => self.emit_expr(*message),
            None => String::new(),
        };
        self.ctx.deps.require(Primitive::AssertionError);
        self.open(format!("if (!({})) {{", strip_parens(&test)));
        self.line(format!("throw new AssertionError({message});"));
        self.close("}");
    }

    pub(super) fn delete_statement(&mut self, node: Node) {
        let mut targets = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "expression_list" => targets.extend(named_children(child)),
                _ => targets.push(child),
            }
        }
        for target in targets {
            match target.kind() {
                "identifier" => {
                    let ident = self.ident(self.text(target));
                    self.line(format!("{ident} = undefined;"));
                }
                "attribute" | "subscript" => match self.target_text(target) {
                    Some(rendered) => self.line(format!("delete {rendered};")),
                    None => self.passthrough_statement(target, FallbackKind::Unsupported, "slice deletion"),
                },
                _ => self.passthrough_statement(target, FallbackKind::Unsupported, "deletion target"),
            }
        }
    }

    pub(super) fn global_statement(&mut self, node: Node) {
        for name in named_children(node) {
            let name = self.text(name);
            self.ctx.scopes.declare_global(name);
        }
    }

    /// `type X[T] = ...`
    pub(super) fn type_alias_statement(&mut self, node: Node) {
        let parts = named_children(node);
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left").or_else(|| parts.first().copied()),
            node.child_by_field_name("right").or_else(|| parts.last().copied()),
        ) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete type alias");
        };
        let name = types::translate(left, self.ctx.source);
        let ty = types::translate(right, self.ctx.source);
        self.line(format!("type {name} = {ty};"));
    }

    /// Python 2 `print a, b`.
    pub(super) fn print_statement(&mut self, node: Node) {
        let args: Vec<Node> = named_children(node)
            .into_iter()
            .filter(|child| child.kind() != "chevron")
            .collect();
        let args = self.emit_list(&args);
        self.ctx.deps.require(Primitive::Print);
        self.line(format!("print({});", args.join(", ")));
    }
}
