//! Class lowering: bases, fields, constructors, methods and enums.

use super::Emitter;
use super::function::{fold_decorators, Header, HOLE};
use crate::analysis::{
    contains_yield, dataclass_fields, instance_attributes, is_dataclass_decorator, parameters,
};
use crate::context::Receiver;
use crate::diagnostics::FallbackKind;
use crate::syntax::{docstring, has_token, is_docstring, named_children, statement_body, statements};
use crate::types;
use std::collections::HashSet;
use tree_sitter::Node;

/// Facts about the class being emitted.
struct ClassShape {
    dataclass: bool,
    extends: bool,
    /// Emitted as `abstract class`; only declarations can be.
    abstract_: bool,
}

#[derive(Default)]
struct MethodFlags {
    static_: bool,
    classmethod: bool,
    getter: bool,
    setter: bool,
    abstract_: bool,
    override_: bool,
    overload: bool,
    deleter: bool,
    other: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub(super) fn class_definition(&mut self, node: Node, decorators: &[Node]) {
        self.class_with(node, decorators, false);
    }

    /// `member` places a nested class on its enclosing class as a static
    /// property.
    fn class_with(&mut self, node: Node, decorators: &[Node], member: bool) {
        let (Some(name_node), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete class");
        };
        let name = self.text(name_node);
        let ident = self.ident(name);
        self.ctx.classes.insert(name.to_string());

        let mut extends = None;
        let mut extra = Vec::new();
        let mut type_params = Vec::new();
        let mut is_enum = false;
        let mut record_like = false;
        if let Some(bases) = node.child_by_field_name("superclasses") {
            for base in named_children(bases) {
                if base.kind() == "keyword_argument" {
                    continue;
                }
                let (head, args) = match base.kind() {
                    "subscript" => (
                        base.child_by_field_name("value").map_or("", |v| self.text(v)),
                        true,
                    ),
                    _ => (self.text(base), false),
                };
                match head.rsplit('.').next().unwrap_or(head) {
                    "object" | "ABC" => {}
                    "Generic" | "Protocol" => {
                        if args {
                            for param in crate::syntax::children_by_field(base, "subscript") {
                                type_params.push(types::translate(param, self.ctx.source));
                            }
                        }
                    }
                    "Enum" | "IntEnum" | "StrEnum" | "Flag" | "IntFlag" => is_enum = true,
                    "NamedTuple" | "TypedDict" => record_like = true,
                    _ if extends.is_none() => extends = Some(self.base_class(base)),
                    _ => extra.push(self.text(base).to_string()),
                }
            }
            if !extra.is_empty() {
                self.ctx.diagnostics.record(
                    bases,
                    FallbackKind::Unsupported,
                    format!("multiple inheritance: dropped {}", extra.join(", ")),
                );
            }
        }
        if let Some(list) = node.child_by_field_name("type_parameters") {
            for param in named_children(list) {
                type_params.push(types::translate(param, self.ctx.source));
            }
        }

        let declared = !member && self.ctx.scopes.is_visible(name);
        if is_enum && !member && !declared && decorators.is_empty() {
            if let Some(members) = self.enum_members(body) {
                self.emit_enum(&ident, &members);
                self.ctx.scopes.declare(name);
                return;
            }
        }

        let dataclass = record_like
            || decorators.iter().any(|d| is_dataclass_decorator(*d, self.ctx.source));
        let source = self.ctx.source;
        let wrappers: Vec<String> = decorators
            .iter()
            .filter(|d| !is_dataclass_decorator(**d, source))
            .map(|d| self.decorator_expr(*d))
            .collect();
        let standalone = wrappers.is_empty() && !member && !declared;
        let shape = ClassShape {
            dataclass,
            extends: extends.is_some(),
            abstract_: standalone && self.has_abstract_methods(body),
        };

        let generics = if type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", type_params.join(", "))
        };
        let heritage = extends.map(|base| format!(" extends {base}")).unwrap_or_default();
        let keyword = if shape.abstract_ { "abstract class" } else { "class" };
        let header = format!("{keyword} {ident}{generics}{heritage} {{");

        if let Some(doc) = docstring(body) {
            self.docstring(doc);
        }
        let saved_params = std::mem::replace(&mut self.ctx.class_type_params, type_params);
        if standalone {
            self.ctx.scopes.declare(name);
            self.open(header);
            self.class_body(body, &shape);
            self.close("}");
        } else {
            let folded = fold_decorators(&wrappers, HOLE);
            let (before, after) = folded.split_once(HOLE).unwrap_or((folded.as_str(), ""));
            let target = if member {
                format!("static {ident}")
            } else if declared {
                ident.clone()
            } else {
                self.ctx.scopes.declare(name);
                format!("const {ident}")
            };
            self.open(format!("{target} = {before}{header}"));
            self.class_body(body, &shape);
            self.close(format!("}}{after};"));
        }
        self.ctx.class_type_params = saved_params;
    }

    fn base_class(&mut self, base: Node) -> String {
        match base.kind() {
            "identifier" => self.class_reference(base),
            "subscript" => types::translate(base, self.ctx.source),
            _ => self.emit_expr(base),
        }
    }

    fn class_body(&mut self, body: Node, shape: &ClassShape) {
        self.ctx.scopes.push_class();
        let saved_receiver = self.ctx.receiver.take();

        let mut annotated = HashSet::new();
        let mut methods = HashSet::new();
        let mut has_init = false;
        for statement in named_children(body) {
            if let Some(assignment) = Some(statement_body(statement)).filter(|a| a.kind() == "assignment") {
                if assignment.child_by_field_name("type").is_some() {
                    if let Some(left) = assignment.child_by_field_name("left") {
                        annotated.insert(self.text(left).to_string());
                    }
                }
            }
            if let Some(method) = method_node(statement) {
                if let Some(name) = method.child_by_field_name("name") {
                    let name = self.text(name);
                    has_init |= name == "__init__";
                    methods.insert(name.to_string());
                }
            }
        }
        for (attribute, ty) in instance_attributes(body, self.ctx.source) {
            if annotated.contains(&attribute) || methods.contains(&attribute) {
                continue;
            }
            let ty = ty.unwrap_or_else(|| "any".to_string());
            self.line(format!("{attribute}: {ty};"));
        }

        let mut constructor_pending = shape.dataclass && !has_init;
        let doc = docstring(body).map(|d| d.id());
        for statement in statements(body) {
            if is_docstring(statement, doc) {
                continue;
            }
            match statement.kind() {
                "comment" => self.comment(statement),
                "pass_statement" => {}
                "function_definition" | "class_definition" | "decorated_definition" => {
                    if constructor_pending {
                        self.dataclass_constructor(body, shape);
                        constructor_pending = false;
                    }
                    self.class_member(statement, shape);
                }
                kind if kind.ends_with("_statement") && kind != "expression_statement" => {
                    self.passthrough_statement(
                        statement,
                        FallbackKind::Unsupported,
                        "statement in class body",
                    )
                }
                _ => self.class_statement(statement, shape),
            }
        }
        if constructor_pending {
            self.dataclass_constructor(body, shape);
        }

        self.ctx.receiver = saved_receiver;
        self.ctx.scopes.pop_scope();
    }

    fn class_member(&mut self, statement: Node, shape: &ClassShape) {
        let (definition, decorators) = match statement.kind() {
            "decorated_definition" => {
                let decorators: Vec<Node> = named_children(statement)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .collect();
                match statement.child_by_field_name("definition") {
                    Some(definition) => (definition, decorators),
                    None => return,
                }
            }
            _ => (statement, Vec::new()),
        };
        match definition.kind() {
            "function_definition" => self.method(definition, &decorators, shape),
            "class_definition" => self.class_with(definition, &decorators, true),
            _ => self.passthrough_statement(statement, FallbackKind::StructuralMismatch, "class member"),
        }
    }

    /// Class-level assignments and annotations become fields.
    fn class_statement(&mut self, statement: Node, shape: &ClassShape) {
        let inner = statement_body(statement);
        match inner.kind() {
            "assignment" => {}
            "string" | "ellipsis" => return,
            _ => {
                return self.passthrough_statement(
                    statement,
                    FallbackKind::Unsupported,
                    "expression in class body",
                )
            }
        }
        let Some(left) = inner.child_by_field_name("left").filter(|l| l.kind() == "identifier") else {
            return self.passthrough_statement(statement, FallbackKind::Unsupported, "class attribute target");
        };
        let name = self.text(left);
        let annotation = inner.child_by_field_name("type");
        let value_node = inner.child_by_field_name("right");
        if value_node.is_some_and(|v| v.kind() == "assignment") {
            return self.passthrough_statement(statement, FallbackKind::Unsupported, "chained class attribute");
        }

        let qualifiers = annotation.map(|a| types::qualifiers(a, self.ctx.source)).unwrap_or_default();
        let ty = annotation
            .and_then(|a| types::declared_type(a, self.ctx.source))
            .map(|ty| format!(": {ty}"))
            .unwrap_or_default();
        if shape.dataclass && annotation.is_some() && !qualifiers.class_var {
            self.line(format!("{name}{ty};"));
            return;
        }
        let value = value_node.map(|v| format!(" = {}", self.emit_expr(v))).unwrap_or_default();
        let line = match (annotation.is_some(), qualifiers) {
            (_, q) if q.class_var => format!("static {name}{ty}{value};"),
            (_, q) if q.final_ => format!("readonly {name}{ty}{value};"),
            (true, _) => format!("{name}{ty}{value};"),
            (false, _) => format!("static {name}{value};"),
        };
        self.line(line);
    }

    /// `constructor(x, y = 0) { this.x = x; ... }` from annotated fields.
    fn dataclass_constructor(&mut self, body: Node, shape: &ClassShape) {
        let fields = dataclass_fields(body, self.ctx.source);
        if fields.is_empty() && !shape.extends {
            return;
        }
        let mut params = Vec::new();
        for field in &fields {
            let ident = self.ident(&field.name);
            let mut param = ident;
            if let Some(ty) = types::declared_type(field.annotation, self.ctx.source) {
                param.push_str(&format!(": {ty}"));
            }
            if let Some(default) = field.default.and_then(|d| self.field_default(d)) {
                param.push_str(&format!(" = {default}"));
            }
            params.push(param);
        }
        self.open(format!("constructor({}) {{", params.join(", ")));
        if shape.extends {
            self.line("super();");
        }
        for field in &fields {
            let ident = self.ident(&field.name);
            self.line(format!("this.{} = {ident};", field.name));
        }
        self.close("}");
    }

    /// Default of a dataclass field, looking through `field(...)`.
    fn field_default(&mut self, value: Node) -> Option<String> {
        let is_field_call = value.kind() == "call"
            && value
                .child_by_field_name("function")
                .is_some_and(|f| matches!(self.text(f), "field" | "dataclasses.field"));
        if !is_field_call {
            return Some(self.emit_expr(value));
        }
        let args = self.arguments(value.child_by_field_name("arguments"));
        if let Some(default) = args.keyword("default") {
            return Some(self.emit_expr(default));
        }
        let factory = args.keyword("default_factory")?;
        Some(match self.text(factory) {
            "list" => "[]".to_string(),
            "dict" => "{}".to_string(),
            "set" => "new Set()".to_string(),
            _ => format!("{}()", self.emit_expr(factory)),
        })
    }

    fn method_flags(&mut self, decorators: &[Node]) -> MethodFlags {
        let mut flags = MethodFlags::default();
        for decorator in decorators {
            match self.decorator_name(*decorator) {
                "staticmethod" => flags.static_ = true,
                "classmethod" => flags.classmethod = true,
                "property" | "cached_property" => flags.getter = true,
                "setter" => flags.setter = true,
                "deleter" => flags.deleter = true,
                "abstractmethod" => flags.abstract_ = true,
                "override" => flags.override_ = true,
                "overload" => flags.overload = true,
                _ => {
                    let expr = self.decorator_expr(*decorator);
                    flags.other.push(expr);
                }
            }
        }
        flags
    }

    fn method(&mut self, node: Node, decorators: &[Node], shape: &ClassShape) {
        let (Some(name_node), Some(params_node)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("parameters"),
        ) else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "incomplete method");
        };
        let name = self.text(name_node);
        let flags = self.method_flags(decorators);
        if flags.deleter {
            return self.passthrough_statement(node, FallbackKind::Unsupported, "property deleter");
        }
        let mut params = parameters(params_node, self.ctx.source);
        let receiver = if flags.static_ || params.is_empty() {
            None
        } else {
            let first = params.remove(0);
            Some(Receiver {
                name: first.name,
                is_class: flags.classmethod,
            })
        };
        let is_async = has_token(node, "async");
        let body = node.child_by_field_name("body");
        let generator = body.is_some_and(contains_yield);
        let member = match name {
            "__init__" => "constructor",
            "__str__" => "toString",
            "__iter__" => "[Symbol.iterator]",
            other => other,
        };

        // Defaults and annotations render with the receiver in scope.
        let previous = std::mem::replace(&mut self.ctx.receiver, receiver);
        let Header { type_params, params: params_text, returns } =
            self.header(node, &params, is_async, generator);
        let returns = if member == "constructor" || flags.setter { String::new() } else { returns };

        let mut modifiers = String::new();
        if flags.static_ || flags.classmethod {
            modifiers.push_str("static ");
        }
        if flags.override_ {
            modifiers.push_str("override ");
        }
        if flags.getter {
            modifiers.push_str("get ");
        } else if flags.setter {
            modifiers.push_str("set ");
        }
        if is_async {
            modifiers.push_str("async ");
        }
        if generator {
            modifiers.push('*');
        }
        let signature = format!("{modifiers}{member}{type_params}({params_text}){returns}");

        if let Some(doc) = body.and_then(docstring) {
            self.docstring(doc);
        }
        for decorator in &flags.other {
            self.line(format!("@{decorator}"));
        }
        if flags.overload {
            self.line(format!("{signature};"));
        } else if flags.abstract_ && shape.abstract_ && body.is_none_or(is_placeholder_body) {
            self.line(format!("abstract {signature};"));
        } else {
            self.open(format!("{signature} {{"));
            self.function_body(&params, body);
            self.close("}");
        }
        self.ctx.receiver = previous;
    }

    fn has_abstract_methods(&self, body: Node) -> bool {
        named_children(body).into_iter().any(|statement| {
            statement.kind() == "decorated_definition"
                && named_children(statement)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .any(|d| self.decorator_name(d) == "abstractmethod")
                && statement
                    .child_by_field_name("definition")
                    .and_then(|d| d.child_by_field_name("body"))
                    .is_some_and(is_placeholder_body)
        })
    }

    /// Members of a simple enum: names bound to literals or `auto()`.
    fn enum_members(&mut self, body: Node) -> Option<Vec<(String, Option<String>)>> {
        let mut members: Vec<(String, Option<String>)> = Vec::new();
        let doc = docstring(body).map(|d| d.id());
        for statement in statements(body) {
            match statement.kind() {
                "comment" | "pass_statement" => continue,
                _ if is_docstring(statement, doc) => continue,
                _ => {}
            }
            let inner = statement_body(statement);
            if inner.kind() != "assignment" || inner.child_by_field_name("type").is_some() {
                return None;
            }
            let left = inner.child_by_field_name("left").filter(|l| l.kind() == "identifier")?;
            let right = inner.child_by_field_name("right")?;
            let value = match right.kind() {
                "integer" | "unary_operator" => Some(self.text(right).to_string()),
                "string" if !self.is_fstring(right) => Some(self.emit_expr(right)),
                // TypeScript numbering starts at 0, Python's `auto()` at 1.
                "call" if self.text(right).ends_with("auto()") => members.is_empty().then(|| "1".to_string()),
                _ => return None,
            };
            members.push((self.text(left).to_string(), value));
        }
        Some(members)
    }

    fn emit_enum(&mut self, ident: &str, members: &[(String, Option<String>)]) {
        self.open(format!("enum {ident} {{"));
        for (name, value) in members {
            match value {
                Some(value) => self.line(format!("{name} = {value},")),
                None => self.line(format!("{name},")),
            }
        }
        self.close("}");
    }
}

fn method_node(statement: Node) -> Option<Node> {
    match statement.kind() {
        "function_definition" => Some(statement),
        "decorated_definition" => statement
            .child_by_field_name("definition")
            .filter(|d| d.kind() == "function_definition"),
        _ => None,
    }
}

/// `...`, `pass`, a docstring or `raise NotImplementedError`.
fn is_placeholder_body(body: Node) -> bool {
    named_children(body).into_iter().all(|statement| match statement.kind() {
        "pass_statement" | "raise_statement" => true,
        _ => matches!(statement_body(statement).kind(), "ellipsis" | "string"),
    })
}
