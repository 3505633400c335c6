//! Small accessors over tree-sitter nodes.

use tree_sitter::Node;

pub fn text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Named children without comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Every child, anonymous tokens included.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Statements of a block or module, comments included.
pub fn statements<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn children_by_field<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Whether an anonymous token such as `async` is a direct child.
pub fn has_token(node: Node, token: &str) -> bool {
    children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

/// Pieces of an `except` clause: exception type, alias, handler body.
pub struct ExceptParts<'t> {
    pub types: Option<Node<'t>>,
    pub alias: Option<Node<'t>>,
    pub body: Option<Node<'t>>,
}

pub fn except_parts<'t>(clause: Node<'t>) -> ExceptParts<'t> {
    let mut parts = ExceptParts {
        types: None,
        alias: None,
        body: None,
    };
    let mut expressions = Vec::new();
    for child in named_children(clause) {
        if child.kind() == "block" {
            parts.body = Some(child);
        } else {
            expressions.push(child);
        }
    }
    match expressions.as_slice() {
        [single] if single.kind() == "as_pattern" => {
            parts.types = single.named_child(0);
            parts.alias = single.child_by_field_name("alias").map(alias_target);
        }
        [types] => parts.types = Some(*types),
        [types, alias, ..] => {
            parts.types = Some(*types);
            parts.alias = Some(*alias);
        }
        [] => {}
    }
    parts
}

fn alias_target<'t>(node: Node<'t>) -> Node<'t> {
    if node.kind() == "as_pattern_target" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

/// `(context expression, optional target)` per `with` item.
pub fn with_items<'t>(statement: Node<'t>) -> Vec<(Node<'t>, Option<Node<'t>>)> {
    let mut items = Vec::new();
    let clauses: Vec<Node> = named_children(statement)
        .into_iter()
        .filter(|child| child.kind() == "with_clause")
        .collect();
    for clause in clauses {
        for item in named_children(clause) {
            if item.kind() != "with_item" {
                continue;
            }
            let Some(value) = item.child_by_field_name("value").or_else(|| item.named_child(0))
            else {
                continue;
            };
            if value.kind() == "as_pattern" {
                if let Some(expr) = value.named_child(0) {
                    let target = value.child_by_field_name("alias").map(alias_target);
                    items.push((expr, target));
                    continue;
                }
            }
            items.push((value, None));
        }
    }
    items
}

/// Names an import statement binds in the importing scope.
pub fn import_bindings(statement: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    match statement.kind() {
        "import_statement" => {
            for name in children_by_field(statement, "name") {
                match name.kind() {
                    "aliased_import" => {
                        if let Some(alias) = name.child_by_field_name("alias") {
                            names.push(text(alias, source).to_string());
                        }
                    }
                    _ => {
                        let dotted = text(name, source);
                        let top = dotted.split('.').next().unwrap_or(dotted);
                        names.push(top.to_string());
                    }
                }
            }
        }
        "import_from_statement" => {
            for name in children_by_field(statement, "name") {
                match name.kind() {
                    "aliased_import" => {
                        if let Some(alias) = name.child_by_field_name("alias") {
                            names.push(text(alias, source).to_string());
                        }
                    }
                    _ => names.push(text(name, source).to_string()),
                }
            }
        }
        _ => {}
    }
    names
}

/// The assignment or expression a simple statement holds. The Python
/// grammar keeps `expression_statement` hidden, so these usually sit
/// directly in the block; a materialized wrapper with one child is looked
/// through.
pub fn statement_body(statement: Node) -> Node {
    if statement.kind() == "expression_statement" && statement.named_child_count() == 1 {
        statement.named_child(0).unwrap_or(statement)
    } else {
        statement
    }
}

/// A block whose first statement is a bare string literal.
pub fn docstring<'t>(block: Node<'t>) -> Option<Node<'t>> {
    let first = named_children(block).into_iter().next()?;
    Some(statement_body(first)).filter(|body| body.kind() == "string")
}

/// Whether `statement` is the docstring found by [`docstring`].
pub fn is_docstring(statement: Node, doc: Option<usize>) -> bool {
    doc.is_some_and(|id| statement_body(statement).id() == id)
}
