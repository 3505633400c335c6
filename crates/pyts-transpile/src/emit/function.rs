//! Function definitions, parameters, decorators and lambdas.

use super::Emitter;
use crate::analysis::{contains_yield, escaped_names, parameters, plan_scope, ParamKind, Parameter};
use crate::diagnostics::FallbackKind;
use crate::syntax::{docstring, has_token, is_docstring, named_children, statements};
use crate::types;
use tree_sitter::Node;

/// Stands in for the decorated definition while wrappers are folded.
pub(super) const HOLE: &str = "\u{0}";

/// Apply decorator expressions outermost first: `[a, b]` around `f` is
/// `a(b(f))`.
pub fn fold_decorators(wrappers: &[String], inner: &str) -> String {
    wrappers
        .iter()
        .rev()
        .fold(inner.to_string(), |acc, wrapper| format!("{wrapper}({acc})"))
}

/// Header pieces shared by functions and methods.
pub(super) struct Header {
    pub type_params: String,
    pub params: String,
    pub returns: String,
}

impl<'a> Emitter<'a> {
    pub(super) fn decorated_definition(&mut self, node: Node) {
        let decorators: Vec<Node> = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .collect();
        match node.child_by_field_name("definition") {
            Some(definition) if definition.kind() == "function_definition" => {
                self.function_definition(definition, &decorators)
            }
            Some(definition) if definition.kind() == "class_definition" => {
                self.class_definition(definition, &decorators)
            }
            _ => self.passthrough_statement(node, FallbackKind::StructuralMismatch, "decorated statement"),
        }
    }

    /// The expression of a decorator line.
    pub(super) fn decorator_expr(&mut self, decorator: Node) -> String {
        match decorator.named_child(0) {
            Some(expr) => self.emit_expr(expr),
            None => self.passthrough_expr(decorator, FallbackKind::Malformed, "empty decorator"),
        }
    }

    /// Last dotted segment of a decorator's callee.
    pub(super) fn decorator_name(&self, decorator: Node) -> &'a str {
        let Some(expr) = decorator.named_child(0) else {
            return "";
        };
        let callee = match expr.kind() {
            "call" => expr.child_by_field_name("function").unwrap_or(expr),
            _ => expr,
        };
        let spelled = self.text(callee);
        spelled.rsplit('.').next().unwrap_or(spelled)
    }

    pub(super) fn function_definition(&mut self, node: Node, decorators: &[Node]) {
        let (Some(name_node), Some(params_node)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("parameters"),
        ) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete function");
        };
        let name = self.text(name_node);
        let ident = self.ident(name);
        let is_async = has_token(node, "async");
        let body = node.child_by_field_name("body");
        let generator = body.is_some_and(contains_yield);
        let params = parameters(params_node, self.ctx.source);

        if decorators.iter().any(|d| self.decorator_name(*d) == "overload") {
            let header = self.header(node, &params, is_async, generator);
            let Header { type_params, params, returns } = header;
            self.line(format!("function {ident}{type_params}({params}){returns};"));
            return;
        }

        if let Some(doc) = body.and_then(docstring) {
            self.docstring(doc);
        }
        let header = self.header(node, &params, is_async, generator);
        let wrappers: Vec<String> = decorators.iter().map(|d| self.decorator_expr(*d)).collect();
        let keyword = function_keyword(is_async, generator);
        let Header { type_params, params: params_text, returns } = header;
        // Inside a method, a nested def must keep the method's `this`.
        let arrow = self.ctx.receiver.is_some() && self.ctx.function_depth > 0 && !generator;
        let declared = self.ctx.scopes.is_visible(name);

        if wrappers.is_empty() && !arrow {
            if declared {
                self.open(format!("{ident} = {keyword} {ident}{type_params}({params_text}){returns} {{"));
                self.function_body(&params, body);
                self.close("};");
            } else {
                self.ctx.scopes.declare(name);
                self.open(format!("{keyword} {ident}{type_params}({params_text}){returns} {{"));
                self.function_body(&params, body);
                self.close("}");
            }
            return;
        }

        let head = if arrow {
            let prefix = if is_async { "async " } else { "" };
            format!("{prefix}{type_params}({params_text}){returns} => {{")
        } else {
            format!("{keyword} {ident}{type_params}({params_text}){returns} {{")
        };
        let folded = fold_decorators(&wrappers, HOLE);
        let (before, after) = folded.split_once(HOLE).unwrap_or((folded.as_str(), ""));
        let target = if declared {
            ident.clone()
        } else {
            self.ctx.scopes.declare(name);
            format!("const {ident}")
        };
        self.open(format!("{target} = {before}{head}"));
        self.function_body(&params, body);
        self.close(format!("}}{after};"));
    }

    /// Type parameters, parameter list and return annotation.
    pub(super) fn header(&mut self, node: Node, params: &[Parameter], is_async: bool, generator: bool) -> Header {
        let params_text = self.render_params(params);
        let returns = match node.child_by_field_name("return_type") {
            Some(annotation) => {
                let mut ty = types::translate(annotation, self.ctx.source);
                if ty == "null" {
                    ty = "void".to_string();
                }
                if is_async && !generator {
                    ty = format!("Promise<{ty}>");
                }
                format!(": {ty}")
            }
            None => String::new(),
        };
        let type_params = self.type_params(node, &[&params_text, &returns]);
        Header {
            type_params,
            params: params_text,
            returns,
        }
    }

    /// PEP 695 parameters plus module type variables the signature uses.
    fn type_params(&self, node: Node, texts: &[&str]) -> String {
        let mut names: Vec<String> = Vec::new();
        if let Some(list) = node.child_by_field_name("type_parameters") {
            for param in named_children(list) {
                let mut inner = param;
                while let Some(first) = inner.named_child(0).filter(|_| inner.kind() != "identifier") {
                    inner = first;
                }
                names.push(self.text(inner).to_string());
            }
        }
        let mut vars: Vec<&String> = self.ctx.type_vars.iter().collect();
        vars.sort();
        for var in vars {
            if self.ctx.class_type_params.contains(var) || names.contains(var) {
                continue;
            }
            if texts.iter().any(|text| contains_word(text, var)) {
                names.push(var.clone());
            }
        }
        if names.is_empty() {
            String::new()
        } else {
            format!("<{}>", names.join(", "))
        }
    }

    /// Keyword-only parameters become one destructured options object;
    /// `**kwargs` a record and `*args` a rest parameter, in that order.
    pub(super) fn render_params(&mut self, params: &[Parameter]) -> String {
        let mut out = Vec::new();
        let mut fields = Vec::new();
        let mut field_types = Vec::new();
        let mut all_optional = true;
        let mut rest = None;
        let mut kwargs = None;
        for param in params {
            let ident = self.ident(&param.name);
            let ty = param.annotation.map(|a| types::translate(a, self.ctx.source));
            let default = param.default.map(|d| self.emit_expr(d));
            match param.kind {
                ParamKind::Positional | ParamKind::PositionalOnly => {
                    let mut text = ident;
                    if let Some(ty) = &ty {
                        text.push_str(&format!(": {ty}"));
                    }
                    if let Some(default) = &default {
                        text.push_str(&format!(" = {default}"));
                    }
                    out.push(text);
                }
                ParamKind::KeywordOnly => {
                    let ty = ty.unwrap_or_else(|| "any".to_string());
                    match default {
                        Some(default) => {
                            fields.push(format!("{ident} = {default}"));
                            field_types.push(format!("{ident}?: {ty}"));
                        }
                        None => {
                            all_optional = false;
                            fields.push(ident.clone());
                            field_types.push(format!("{ident}: {ty}"));
                        }
                    }
                }
                ParamKind::VarPositional => {
                    let ty = ty.unwrap_or_else(|| "any".to_string());
                    rest = Some(format!("...{ident}: {}[]", array_element(&ty)));
                }
                ParamKind::VarKeyword => {
                    let ty = ty.unwrap_or_else(|| "any".to_string());
                    kwargs = Some(format!("{ident}: Record<string, {ty}> = {{}}"));
                }
            }
        }
        if !fields.is_empty() {
            let default = if all_optional { " = {}" } else { "" };
            out.push(format!(
                "{{ {} }}: {{ {} }}{default}",
                fields.join(", "),
                field_types.join("; ")
            ));
        }
        out.extend(kwargs);
        out.extend(rest);
        out.join(", ")
    }

    /// Emit a function body in its own frame. Parameters are declared, the
    /// body's locals shadow outer names and the docstring is skipped.
    pub(super) fn function_body(&mut self, params: &[Parameter], body: Option<Node>) {
        let Some(body) = body else {
            return;
        };
        let param_names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let mut excluded = escaped_names(body, self.ctx.source);
        excluded.extend(param_names.iter().cloned());
        let plan = plan_scope(body, self.ctx.source, excluded, false);
        let mut shadowed = plan.locals.clone();
        shadowed.extend(param_names.iter().cloned());
        self.ctx.scopes.push_function(shadowed);
        for name in &param_names {
            self.ctx.scopes.declare(name);
        }
        self.ctx.add_plan(plan);
        self.ctx.function_depth += 1;
        let loops = std::mem::take(&mut self.ctx.loop_flags);

        self.emit_predeclarations(body);
        let doc = docstring(body).map(|d| d.id());
        for statement in statements(body) {
            if !is_docstring(statement, doc) {
                self.emit_statement(statement);
            }
        }

        self.ctx.loop_flags = loops;
        self.ctx.function_depth -= 1;
        self.ctx.scopes.pop_scope();
    }

    pub(super) fn lambda(&mut self, node: Node) -> String {
        let params = node
            .child_by_field_name("parameters")
            .map(|p| parameters(p, self.ctx.source))
            .unwrap_or_default();
        let rendered = self.render_params(&params);
        self.ctx.scopes.push_scope();
        for param in &params {
            self.ctx.scopes.declare(&param.name);
        }
        let body = self.emit_child(node, "body");
        self.ctx.scopes.pop_scope();
        if body.starts_with('{') {
            format!("({rendered}) => ({body})")
        } else {
            format!("({rendered}) => {body}")
        }
    }
}

pub(super) fn function_keyword(is_async: bool, generator: bool) -> &'static str {
    match (is_async, generator) {
        (false, false) => "function",
        (false, true) => "function*",
        (true, false) => "async function",
        (true, true) => "async function*",
    }
}

fn array_element(ty: &str) -> String {
    if ty.contains(['|', '&', '=']) {
        format!("({ty})")
    } else {
        ty.to_string()
    }
}

/// `word` occurs in `text` bounded by non-identifier characters.
fn contains_word(text: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_decorators_outermost_first() {
        let wrappers = vec!["a".to_string(), "b(1)".to_string()];
        assert_eq!(fold_decorators(&wrappers, "f"), "a(b(1)(f))");
        assert_eq!(fold_decorators(&[], "f"), "f");
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("x: T", "T"));
        assert!(contains_word("Array<T>", "T"));
        assert!(!contains_word("x: Tree", "T"));
    }
}
