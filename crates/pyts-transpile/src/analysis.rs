//! Pre-passes over Python scopes.
//!
//! The main one is the declaration planner: Python locals are function
//! scoped while `let` is block scoped, so every local gets its declaration
//! in the innermost emitted block that contains all of its occurrences.

use crate::syntax::{
    children_by_field, except_parts, import_bindings, named_children, statement_body, statements,
    text, with_items,
};
use crate::types;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    PositionalOnly,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

#[derive(Debug, Clone)]
pub struct Parameter<'t> {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<Node<'t>>,
    pub default: Option<Node<'t>>,
}

/// Parameters of a `parameters` or `lambda_parameters` node, in order.
pub fn parameters<'t>(node: Node<'t>, source: &str) -> Vec<Parameter<'t>> {
    let mut params: Vec<Parameter<'t>> = Vec::new();
    let mut keyword_only = false;
    for child in named_children(node) {
        let (name_node, annotation, default) = match child.kind() {
            "identifier" => (child, None, None),
            "typed_parameter" => match child.named_child(0) {
                Some(inner) => (inner, child.child_by_field_name("type"), None),
                None => continue,
            },
            "default_parameter" | "typed_default_parameter" => match child.child_by_field_name("name") {
                Some(name) => (
                    name,
                    child.child_by_field_name("type"),
                    child.child_by_field_name("value"),
                ),
                None => continue,
            },
            "list_splat_pattern" | "dictionary_splat_pattern" => (child, None, None),
            "keyword_separator" => {
                keyword_only = true;
                continue;
            }
            "positional_separator" => {
                for param in params.iter_mut() {
                    if param.kind == ParamKind::Positional {
                        param.kind = ParamKind::PositionalOnly;
                    }
                }
                continue;
            }
            _ => continue,
        };
        let (kind, name) = match name_node.kind() {
            "list_splat_pattern" => {
                keyword_only = true;
                (ParamKind::VarPositional, splat_name(name_node, source))
            }
            "dictionary_splat_pattern" => (ParamKind::VarKeyword, splat_name(name_node, source)),
            _ if keyword_only => (ParamKind::KeywordOnly, text(name_node, source).to_string()),
            _ => (ParamKind::Positional, text(name_node, source).to_string()),
        };
        params.push(Parameter {
            name,
            kind,
            annotation,
            default,
        });
    }
    params
}

fn splat_name(node: Node, source: &str) -> String {
    node.named_child(0)
        .map(|inner| text(inner, source).to_string())
        .unwrap_or_default()
}

/// Call shape of a known function or constructor, for mapping keyword
/// arguments onto positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub positional: Vec<String>,
    pub keyword_only: Vec<String>,
    pub var_positional: bool,
    pub var_keyword: bool,
}

impl Signature {
    pub fn from_parameters(params: &[Parameter]) -> Self {
        let mut signature = Signature::default();
        for param in params {
            match param.kind {
                ParamKind::Positional | ParamKind::PositionalOnly => {
                    signature.positional.push(param.name.clone())
                }
                ParamKind::KeywordOnly => signature.keyword_only.push(param.name.clone()),
                ParamKind::VarPositional => signature.var_positional = true,
                ParamKind::VarKeyword => signature.var_keyword = true,
            }
        }
        signature
    }
}

/// Definitions found at module level before emission starts.
#[derive(Debug, Default)]
pub struct ModuleFacts {
    pub classes: HashSet<String>,
    pub functions: HashSet<String>,
    pub type_vars: HashSet<String>,
    pub signatures: HashMap<String, Signature>,
}

pub fn module_facts(root: Node, source: &str) -> ModuleFacts {
    let mut facts = ModuleFacts::default();
    for statement in named_children(root) {
        let (definition, decorated) = match statement.kind() {
            "decorated_definition" => match statement.child_by_field_name("definition") {
                Some(definition) => (definition, true),
                None => continue,
            },
            _ => (statement_body(statement), false),
        };
        match definition.kind() {
            "function_definition" => {
                let Some(name) = definition.child_by_field_name("name") else {
                    continue;
                };
                let name = text(name, source).to_string();
                if !decorated {
                    if let Some(params) = definition.child_by_field_name("parameters") {
                        let params = parameters(params, source);
                        facts
                            .signatures
                            .insert(name.clone(), Signature::from_parameters(&params));
                    }
                }
                facts.functions.insert(name);
            }
            "class_definition" => {
                let Some(name) = definition.child_by_field_name("name") else {
                    continue;
                };
                let name = text(name, source).to_string();
                let dataclass = decorated && is_dataclass(statement, source);
                if let Some(signature) = constructor_signature(definition, dataclass, source) {
                    facts.signatures.insert(name.clone(), signature);
                }
                facts.classes.insert(name);
            }
            "assignment" => {
                if let Some(name) = type_var_assignment(definition, source) {
                    facts.type_vars.insert(name);
                }
            }
            _ => {}
        }
    }
    facts
}

/// Whether a decorated definition carries `@dataclass` in any spelling.
pub fn is_dataclass(decorated: Node, source: &str) -> bool {
    named_children(decorated)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .any(|decorator| is_dataclass_decorator(decorator, source))
}

pub fn is_dataclass_decorator(decorator: Node, source: &str) -> bool {
    let Some(expr) = decorator.named_child(0) else {
        return false;
    };
    let callee = match expr.kind() {
        "call" => expr.child_by_field_name("function").unwrap_or(expr),
        _ => expr,
    };
    let name = text(callee, source);
    name == "dataclass" || name.ends_with(".dataclass")
}

fn constructor_signature(class: Node, dataclass: bool, source: &str) -> Option<Signature> {
    let body = class.child_by_field_name("body")?;
    if dataclass {
        let fields = dataclass_fields(body, source);
        return Some(Signature {
            positional: fields.into_iter().map(|field| field.name).collect(),
            ..Signature::default()
        });
    }
    for statement in named_children(body) {
        if statement.kind() != "function_definition" {
            continue;
        }
        let is_init = statement
            .child_by_field_name("name")
            .is_some_and(|name| text(name, source) == "__init__");
        if !is_init {
            continue;
        }
        let params = parameters(statement.child_by_field_name("parameters")?, source);
        let params = params.get(1..).unwrap_or_default();
        return Some(Signature::from_parameters(params));
    }
    None
}

/// An annotated class-level field of a dataclass.
#[derive(Debug, Clone)]
pub struct Field<'t> {
    pub name: String,
    pub annotation: Node<'t>,
    pub default: Option<Node<'t>>,
}

/// Annotated fields in declaration order, `ClassVar`s excluded.
pub fn dataclass_fields<'t>(body: Node<'t>, source: &str) -> Vec<Field<'t>> {
    let mut fields = Vec::new();
    for statement in named_children(body) {
        let assignment = statement_body(statement);
        if assignment.kind() != "assignment" {
            continue;
        }
        let (Some(left), Some(annotation)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("type"),
        ) else {
            continue;
        };
        if left.kind() != "identifier" || types::qualifiers(annotation, source).class_var {
            continue;
        }
        fields.push(Field {
            name: text(left, source).to_string(),
            annotation,
            default: assignment.child_by_field_name("right"),
        });
    }
    fields
}

/// `T = TypeVar("T")` and its relatives.
pub fn type_var_assignment(statement: Node, source: &str) -> Option<String> {
    let assignment = statement_body(statement);
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    let right = assignment.child_by_field_name("right")?;
    if left.kind() != "identifier" || right.kind() != "call" {
        return None;
    }
    let callee = text(right.child_by_field_name("function")?, source);
    let last = callee.rsplit('.').next().unwrap_or(callee);
    matches!(last, "TypeVar" | "ParamSpec" | "TypeVarTuple")
        .then(|| text(left, source).to_string())
}

/// Whether a function body yields, ignoring nested function, lambda and
/// class bodies.
pub fn contains_yield(node: Node) -> bool {
    for child in named_children(node) {
        match child.kind() {
            "yield" => return true,
            "function_definition" | "lambda" | "class_definition" => {}
            _ => {
                if contains_yield(child) {
                    return true;
                }
            }
        }
    }
    false
}

/// Attributes assigned through the receiver in any method, in first-seen
/// order, with a declared or literal-inferred type.
pub fn instance_attributes(body: Node, source: &str) -> Vec<(String, Option<String>)> {
    let mut found: Vec<(String, Option<String>)> = Vec::new();
    for statement in named_children(body) {
        let method = match statement.kind() {
            "function_definition" => statement,
            "decorated_definition" => match statement.child_by_field_name("definition") {
                Some(definition) if definition.kind() == "function_definition" => definition,
                _ => continue,
            },
            _ => continue,
        };
        let receiver = method
            .child_by_field_name("parameters")
            .and_then(|params| parameters(params, source).into_iter().next())
            .map(|param| param.name);
        let (Some(receiver), Some(method_body)) = (receiver, method.child_by_field_name("body"))
        else {
            continue;
        };
        collect_receiver_assignments(method_body, &receiver, source, &mut found);
    }
    found
}

fn collect_receiver_assignments(
    node: Node,
    receiver: &str,
    source: &str,
    found: &mut Vec<(String, Option<String>)>,
) {
    for child in named_children(node) {
        if matches!(child.kind(), "assignment" | "augmented_assignment") {
            let mut targets = Vec::new();
            if let Some(left) = child.child_by_field_name("left") {
                flatten_targets(left, &mut targets);
            }
            for target in targets {
                let Some(attribute) = receiver_attribute(target, receiver, source) else {
                    continue;
                };
                let declared = child
                    .child_by_field_name("type")
                    .and_then(|annotation| types::declared_type(annotation, source))
                    .or_else(|| {
                        child
                            .child_by_field_name("right")
                            .and_then(|value| literal_type(value, source))
                    });
                match found.iter_mut().find(|(name, _)| *name == attribute) {
                    Some((_, ty)) => {
                        if ty.is_none() {
                            *ty = declared;
                        }
                    }
                    None => found.push((attribute, declared)),
                }
            }
        }
        collect_receiver_assignments(child, receiver, source, found);
    }
}

fn flatten_targets<'t>(target: Node<'t>, out: &mut Vec<Node<'t>>) {
    match target.kind() {
        "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list" | "expression_list" => {
            for child in named_children(target) {
                flatten_targets(child, out);
            }
        }
        _ => out.push(target),
    }
}

fn receiver_attribute(target: Node, receiver: &str, source: &str) -> Option<String> {
    if target.kind() != "attribute" {
        return None;
    }
    let object = target.child_by_field_name("object")?;
    if object.kind() != "identifier" || text(object, source) != receiver {
        return None;
    }
    Some(text(target.child_by_field_name("attribute")?, source).to_string())
}

/// TypeScript type of a literal initializer.
pub fn literal_type(value: Node, source: &str) -> Option<String> {
    Some(
        match value.kind() {
            "integer" | "float" => "number",
            "string" if !text(value, source).starts_with(['b', 'B']) => "string",
            "true" | "false" => "boolean",
            "list" => "any[]",
            "dictionary" => "Record<string, any>",
            _ => return None,
        }
        .to_string(),
    )
}

/// Names a function or class body binds in its own scope, not descending
/// into nested scopes. `global`/`nonlocal` names are excluded.
pub fn bound_names(body: Node, source: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut escaped = HashSet::new();
    collect_bound(body, source, &mut names, &mut escaped);
    names.retain(|name| !escaped.contains(name));
    names
}

/// Names a body marks `global` or `nonlocal`.
pub fn escaped_names(body: Node, source: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut escaped = HashSet::new();
    collect_bound(body, source, &mut names, &mut escaped);
    escaped
}

fn collect_bound(
    node: Node,
    source: &str,
    names: &mut HashSet<String>,
    escaped: &mut HashSet<String>,
) {
    for child in named_children(node) {
        match child.kind() {
            "assignment" | "augmented_assignment" => {
                if let Some(left) = child.child_by_field_name("left") {
                    target_names(left, source, names);
                }
                if let Some(right) = child.child_by_field_name("right") {
                    collect_bound(right, source, names, escaped);
                }
            }
            "for_statement" => {
                if let Some(left) = child.child_by_field_name("left") {
                    target_names(left, source, names);
                }
                collect_bound(child, source, names, escaped);
            }
            "with_statement" => {
                for target in with_items(child).into_iter().filter_map(|(_, target)| target) {
                    target_names(target, source, names);
                }
                collect_bound(child, source, names, escaped);
            }
            "named_expression" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.insert(text(name, source).to_string());
                }
            }
            "function_definition" | "class_definition" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.insert(text(name, source).to_string());
                }
            }
            "import_statement" | "import_from_statement" => {
                names.extend(import_bindings(child, source));
            }
            "global_statement" | "nonlocal_statement" => {
                for name in named_children(child) {
                    escaped.insert(text(name, source).to_string());
                }
            }
            "lambda" | "list_comprehension" | "set_comprehension"
            | "dictionary_comprehension" | "generator_expression" => {}
            _ => collect_bound(child, source, names, escaped),
        }
    }
}

/// Identifier names inside an assignment target.
pub fn target_names(target: Node, source: &str, out: &mut HashSet<String>) {
    match target.kind() {
        "identifier" => {
            out.insert(text(target, source).to_string());
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
        | "expression_list" | "list_splat_pattern" | "list_splat" | "parenthesized_expression" => {
            for child in named_children(target) {
                target_names(child, source, out);
            }
        }
        _ => {}
    }
}

/// A deferred `let name;` at the top of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predeclaration {
    pub name: String,
    pub annotation: Option<String>,
}

/// Where each local of one Python scope is declared.
#[derive(Debug, Default)]
pub struct ScopePlan {
    /// Keyed by the id of the block (or module) node that opens them.
    pub predeclarations: HashMap<usize, Vec<Predeclaration>>,
    /// Every name the scope binds locally.
    pub locals: HashSet<String>,
}

/// Plan declarations for a module (`root`) or function body (`block`).
/// `excluded` names are declared elsewhere (parameters, `global` names).
pub fn plan_scope(body: Node, source: &str, excluded: HashSet<String>, module: bool) -> ScopePlan {
    let mut planner = Planner {
        source,
        module,
        path: vec![body.id()],
        occurrences: Vec::new(),
        loop_bodies: HashSet::new(),
        excluded,
        nested: Vec::new(),
    };
    for statement in statements(body) {
        planner.statement(statement);
    }
    planner.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occurs {
    Reference,
    /// A reference from a nested function or class body. It runs later, so
    /// it widens the declaring block but never comes first.
    Deferred,
    Binding { direct: bool },
    /// `for` target; `end` closes the loop body.
    LoopTarget { start: usize, end: usize },
}

#[derive(Debug)]
struct Occurrence {
    name: String,
    path: Vec<usize>,
    at: usize,
    kind: Occurs,
    annotation: Option<String>,
}

struct Planner<'s> {
    source: &'s str,
    module: bool,
    path: Vec<usize>,
    occurrences: Vec<Occurrence>,
    loop_bodies: HashSet<usize>,
    excluded: HashSet<String>,
    /// Locals of nested scopes being walked for references.
    nested: Vec<HashSet<String>>,
}

impl<'s> Planner<'s> {
    fn text(&self, node: Node) -> &'s str {
        text(node, self.source)
    }

    fn record(&mut self, node: Node, kind: Occurs, annotation: Option<String>) {
        let name = self.text(node).to_string();
        if self.excluded.contains(&name) {
            return;
        }
        self.occurrences.push(Occurrence {
            name,
            path: self.path.clone(),
            at: node.start_byte(),
            kind,
            annotation,
        });
    }

    fn reference(&mut self, node: Node) {
        let name = self.text(node);
        if self.nested.iter().any(|frame| frame.contains(name)) {
            return;
        }
        let kind = if self.nested.is_empty() {
            Occurs::Reference
        } else {
            Occurs::Deferred
        };
        self.record(node, kind, None);
    }

    fn bind(&mut self, node: Node, kind: Occurs, annotation: Option<String>) {
        if self.nested.is_empty() {
            self.record(node, kind, annotation);
        }
    }

    fn block(&mut self, block: Node, loop_body: bool) {
        let nested = !self.nested.is_empty();
        if !nested {
            self.path.push(block.id());
            if loop_body {
                self.loop_bodies.insert(block.id());
            }
        }
        for statement in statements(block) {
            self.statement(statement);
        }
        if !nested {
            self.path.pop();
        }
    }

    fn statement(&mut self, node: Node) {
        let node = statement_body(node);
        match node.kind() {
            "assignment" => self.assignment(node, true),
            "augmented_assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.target(left, false, None);
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.expr(right);
                }
            }
            "expression_statement" => {
                for child in named_children(node) {
                    self.expr(child);
                }
            }
            "if_statement" => {
                self.field_expr(node, "condition");
                self.field_block(node, "consequence", false);
                for clause in children_by_field(node, "alternative") {
                    self.field_expr(clause, "condition");
                    self.field_block(clause, "consequence", false);
                    self.field_block(clause, "body", false);
                }
            }
            "while_statement" => {
                self.field_expr(node, "condition");
                self.field_block(node, "body", true);
                self.loop_else(node);
            }
            "for_statement" => {
                if let Some(right) = node.child_by_field_name("right") {
                    self.expr(right);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    let end = node
                        .child_by_field_name("body")
                        .map_or(node.end_byte(), |body| body.end_byte());
                    let kind = Occurs::LoopTarget {
                        start: node.start_byte(),
                        end,
                    };
                    self.loop_target(left, kind);
                }
                self.field_block(node, "body", true);
                self.loop_else(node);
            }
            "try_statement" => {
                for child in named_children(node) {
                    match child.kind() {
                        "block" => self.block(child, false),
                        "except_clause" | "except_group_clause" => {
                            let parts = except_parts(child);
                            if let Some(types) = parts.types {
                                self.expr(types);
                            }
                            if let Some(body) = parts.body {
                                self.block(body, false);
                            }
                        }
                        "else_clause" => self.field_block(child, "body", false),
                        "finally_clause" => {
                            if let Some(body) = child.named_child(0) {
                                self.block(body, false);
                            }
                        }
                        _ => {}
                    }
                }
            }
            "with_statement" => {
                for (value, target) in with_items(node) {
                    self.expr(value);
                    if let Some(target) = target {
                        self.target(target, true, None);
                    }
                }
                self.field_block(node, "body", false);
            }
            "function_definition" => self.function(node),
            "class_definition" => self.class(node),
            "decorated_definition" => {
                for child in named_children(node) {
                    match child.kind() {
                        "decorator" => self.expr(child),
                        _ => self.statement(child),
                    }
                }
            }
            "import_statement" | "import_from_statement" => {
                if self.nested.is_empty() {
                    self.excluded.extend(import_bindings(node, self.source));
                }
            }
            "global_statement" | "nonlocal_statement" => {
                for name in named_children(node) {
                    if self.nested.is_empty() {
                        self.excluded.insert(self.text(name).to_string());
                    } else if self.module && node.kind() == "global_statement" {
                        // A function rebinding a module name declares it here.
                        self.record(name, Occurs::Binding { direct: false }, None);
                    }
                }
            }
            "type_alias_statement" | "future_import_statement" | "comment"
            | "pass_statement" | "break_statement" | "continue_statement" => {}
            kind if kind.ends_with("_statement") || kind.ends_with("_clause") || kind == "ERROR" => {
                for child in named_children(node) {
                    if child.kind() == "block" {
                        self.block(child, false);
                    } else {
                        self.expr(child);
                    }
                }
            }
            _ => self.expr(node),
        }
    }

    fn loop_else(&mut self, node: Node) {
        if let Some(alternative) = node.child_by_field_name("alternative") {
            self.field_block(alternative, "body", false);
        }
    }

    fn field_expr(&mut self, node: Node, field: &str) {
        if let Some(child) = node.child_by_field_name(field) {
            self.expr(child);
        }
    }

    fn field_block(&mut self, node: Node, field: &str, loop_body: bool) {
        if let Some(child) = node.child_by_field_name(field) {
            self.block(child, loop_body);
        }
    }

    fn assignment(&mut self, node: Node, direct: bool) {
        let annotation = node
            .child_by_field_name("type")
            .and_then(|ty| types::declared_type(ty, self.source));
        if let Some(left) = node.child_by_field_name("left") {
            self.target(left, direct, annotation);
        }
        if let Some(right) = node.child_by_field_name("right") {
            if right.kind() == "assignment" {
                self.assignment(right, direct);
            } else {
                self.expr(right);
            }
        }
    }

    fn target(&mut self, target: Node, direct: bool, annotation: Option<String>) {
        match target.kind() {
            "identifier" => self.bind(target, Occurs::Binding { direct }, annotation),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
            | "expression_list" | "list_splat_pattern" | "list_splat"
            | "parenthesized_expression" => {
                for child in named_children(target) {
                    self.target(child, direct, None);
                }
            }
            _ => self.expr(target),
        }
    }

    fn loop_target(&mut self, target: Node, kind: Occurs) {
        match target.kind() {
            "identifier" => self.bind(target, kind, None),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
            | "expression_list" | "list_splat_pattern" | "parenthesized_expression" => {
                for child in named_children(target) {
                    self.loop_target(child, kind);
                }
            }
            _ => self.expr(target),
        }
    }

    fn function(&mut self, node: Node) {
        if let Some(name) = node.child_by_field_name("name") {
            self.bind(name, Occurs::Binding { direct: true }, None);
        }
        let params = node
            .child_by_field_name("parameters")
            .map(|params| parameters(params, self.source))
            .unwrap_or_default();
        for default in params.iter().filter_map(|param| param.default) {
            self.expr(default);
        }
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut frame = bound_names(body, self.source);
        frame.extend(params.into_iter().map(|param| param.name));
        self.nested.push(frame);
        self.block(body, false);
        self.nested.pop();
    }

    fn class(&mut self, node: Node) {
        if let Some(name) = node.child_by_field_name("name") {
            self.bind(name, Occurs::Binding { direct: true }, None);
        }
        if let Some(bases) = node.child_by_field_name("superclasses") {
            self.expr(bases);
        }
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        self.nested.push(bound_names(body, self.source));
        self.block(body, false);
        self.nested.pop();
    }

    fn expr(&mut self, node: Node) {
        match node.kind() {
            "identifier" => self.reference(node),
            "attribute" => self.field_expr(node, "object"),
            "keyword_argument" => self.field_expr(node, "value"),
            "named_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind(name, Occurs::Binding { direct: false }, None);
                }
                self.field_expr(node, "value");
            }
            "lambda" => {
                let frame: HashSet<String> = node
                    .child_by_field_name("parameters")
                    .map(|params| parameters(params, self.source))
                    .unwrap_or_default()
                    .into_iter()
                    .map(|param| param.name)
                    .collect();
                self.nested.push(frame);
                self.field_expr(node, "body");
                self.nested.pop();
            }
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => {
                let mut frame = HashSet::new();
                for clause in named_children(node) {
                    if clause.kind() == "for_in_clause" {
                        if let Some(left) = clause.child_by_field_name("left") {
                            target_names(left, self.source, &mut frame);
                        }
                    }
                }
                self.nested.push(frame);
                for child in named_children(node) {
                    match child.kind() {
                        "for_in_clause" => self.field_expr(child, "right"),
                        _ => self.expr(child),
                    }
                }
                self.nested.pop();
            }
            "type" => {}
            _ => {
                for child in named_children(node) {
                    self.expr(child);
                }
            }
        }
    }

    fn finish(self) -> ScopePlan {
        let mut plan = ScopePlan::default();
        let mut order: Vec<&str> = Vec::new();
        for occurrence in &self.occurrences {
            let binds = !matches!(occurrence.kind, Occurs::Reference | Occurs::Deferred);
            if binds && !order.contains(&occurrence.name.as_str()) {
                order.push(&occurrence.name);
            }
        }
        for name in order {
            let occurrences: Vec<&Occurrence> = self
                .occurrences
                .iter()
                .filter(|occurrence| occurrence.name == name)
                .collect();
            plan.locals.insert(name.to_string());
            let lca = common_prefix(occurrences.iter().map(|o| o.path.as_slice()));
            let Some(first) = occurrences
                .iter()
                .copied()
                .find(|o| !matches!(o.kind, Occurs::Deferred))
            else {
                continue;
            };
            let inline = match first.kind {
                Occurs::Binding { direct } => direct && first.path.len() == lca.len(),
                Occurs::LoopTarget { start, end } => {
                    first.path.len() == lca.len()
                        && occurrences
                            .iter()
                            .all(|o| std::ptr::eq(*o, first) || (o.at >= start && o.at < end))
                }
                Occurs::Reference | Occurs::Deferred => false,
            };
            if inline {
                continue;
            }
            let mut depth = lca.len();
            while depth > 1 && self.loop_bodies.contains(&lca[depth - 1]) {
                depth -= 1;
            }
            let annotation = occurrences.iter().find_map(|o| o.annotation.clone());
            plan.predeclarations
                .entry(lca[depth - 1])
                .or_default()
                .push(Predeclaration {
                    name: name.to_string(),
                    annotation,
                });
        }
        plan
    }
}

fn common_prefix<'a>(mut paths: impl Iterator<Item = &'a [usize]>) -> Vec<usize> {
    let Some(first) = paths.next() else {
        return Vec::new();
    };
    let mut prefix = first.to_vec();
    for path in paths {
        let shared = prefix
            .iter()
            .zip(path)
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_python;

    fn module_plan(source: &str) -> (ScopePlan, usize) {
        let tree = parse_python(source).unwrap();
        let root = tree.root_node();
        (plan_scope(root, source, HashSet::new(), true), root.id())
    }

    fn names(plan: &ScopePlan, block: usize) -> Vec<String> {
        plan.predeclarations
            .get(&block)
            .map(|list| list.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_straight_line_assignments_stay_inline() {
        let (plan, root) = module_plan("x = 1\ny = x + 1\nx = y\n");
        assert!(names(&plan, root).is_empty());
        assert!(plan.locals.contains("x") && plan.locals.contains("y"));
    }

    #[test]
    fn test_branch_assignment_used_after_is_predeclared() {
        let (plan, root) = module_plan("if c:\n    x = 1\nelse:\n    x = 2\nprint(x)\n");
        assert_eq!(names(&plan, root), vec!["x"]);
    }

    #[test]
    fn test_branch_local_names_stay_in_branch() {
        let (plan, root) = module_plan("if c:\n    y = 1\n    print(y)\n");
        assert!(plan.predeclarations.is_empty(), "{:?}", names(&plan, root));
    }

    #[test]
    fn test_loop_variable_used_after_loop() {
        let (plan, root) = module_plan("for i in xs:\n    pass\nprint(i)\n");
        assert_eq!(names(&plan, root), vec!["i"]);
        let (plan, _) = module_plan("for i in xs:\n    print(i)\n");
        assert!(plan.predeclarations.is_empty());
    }

    #[test]
    fn test_loop_carried_names_leave_the_loop_body() {
        let source = "for v in xs:\n    if v:\n        print(prev)\n    prev = v\n";
        let (plan, root) = module_plan(source);
        assert_eq!(names(&plan, root), vec!["prev"]);
    }

    #[test]
    fn test_annotation_carried_to_predeclaration() {
        let (plan, root) = module_plan("try:\n    n: int = f()\nexcept E:\n    n = 0\nprint(n)\n");
        let list = plan.predeclarations.get(&root).unwrap();
        assert_eq!(list[0].annotation.as_deref(), Some("number"));
    }

    #[test]
    fn test_global_rebinding_declares_at_module() {
        let (plan, root) = module_plan("def bump():\n    global count\n    count = 1\n");
        assert_eq!(names(&plan, root), vec!["count"]);
    }

    #[test]
    fn test_function_local_shadows_module_name() {
        let source = "x = 0\ndef f():\n    x = 5\n    return x\n";
        let tree = parse_python(source).unwrap();
        let function = tree.root_node().named_child(1).unwrap();
        let body = function.child_by_field_name("body").unwrap();
        let plan = plan_scope(body, source, HashSet::new(), false);
        assert!(plan.locals.contains("x"));
        assert!(plan.predeclarations.is_empty());
    }

    #[test]
    fn test_forward_reference_from_function_body_stays_inline() {
        let (plan, root) = module_plan("def g():\n    return f()\ndef f():\n    return 1\n");
        assert!(names(&plan, root).is_empty());
        assert!(plan.locals.contains("f") && plan.locals.contains("g"));
    }

    #[test]
    fn test_nested_reference_widens_declaring_block() {
        let source = "if c:\n    y = 1\ndef g():\n    return y\n";
        let (plan, root) = module_plan(source);
        assert_eq!(names(&plan, root), vec!["y"]);
    }

    #[test]
    fn test_dataclass_fields_skip_class_vars() {
        let source = "class P:\n    \"\"\"doc\"\"\"\n    x: int\n    n: ClassVar[int] = 0\n    y: str = \"s\"\n";
        let tree = parse_python(source).unwrap();
        let class = tree.root_node().named_child(0).unwrap();
        let fields = dataclass_fields(class.child_by_field_name("body").unwrap(), source);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(fields[0].default.is_none() && fields[1].default.is_some());
    }

    #[test]
    fn test_parameters_and_signatures() {
        let source = "def f(a, b=1, /, c=2, *args, d, e=3, **kw):\n    pass\n";
        let tree = parse_python(source).unwrap();
        let facts = module_facts(tree.root_node(), source);
        let signature = &facts.signatures["f"];
        assert_eq!(signature.positional, vec!["a", "b", "c"]);
        assert_eq!(signature.keyword_only, vec!["d", "e"]);
        assert!(signature.var_positional && signature.var_keyword);
    }

    #[test]
    fn test_module_facts() {
        let source = "from typing import TypeVar\nT = TypeVar(\"T\")\n@dataclass\nclass P:\n    x: int\n    y: int = 0\nclass Q:\n    def __init__(self, a):\n        self.a = a\n";
        let tree = parse_python(source).unwrap();
        let facts = module_facts(tree.root_node(), source);
        assert!(facts.type_vars.contains("T"));
        assert!(facts.classes.contains("P") && facts.classes.contains("Q"));
        assert_eq!(facts.signatures["P"].positional, vec!["x", "y"]);
        assert_eq!(facts.signatures["Q"].positional, vec!["a"]);
    }

    #[test]
    fn test_contains_yield_skips_nested_functions() {
        let source = "def outer():\n    def inner():\n        yield 1\n    return inner\n";
        let tree = parse_python(source).unwrap();
        let outer = tree.root_node().named_child(0).unwrap();
        assert!(!contains_yield(outer.child_by_field_name("body").unwrap()));
    }
}
