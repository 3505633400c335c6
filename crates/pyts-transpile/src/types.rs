//! Python annotation → TypeScript type text.
//!
//! Pure over the annotation subtree. Anything that does not fit the
//! expected shapes degrades to the annotation's own source text.

use crate::syntax::{children_by_field, named_children, text};
use tree_sitter::Node;

/// Declaration modifiers carried by `Final[...]` / `ClassVar[...]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub final_: bool,
    pub class_var: bool,
    /// The qualifier was written without an argument; the declared type is
    /// left to inference.
    pub bare: bool,
}

fn primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "str" => "string",
        "bool" => "boolean",
        "int" | "float" | "complex" => "number",
        "bytes" | "bytearray" => "Uint8Array",
        "None" => "null",
        "Any" => "any",
        "object" => "object",
        "NoReturn" | "Never" => "never",
        _ => return None,
    })
}

/// Translation of a generic base written without arguments.
fn bare_generic(name: &str) -> Option<&'static str> {
    Some(match name {
        "list" | "List" | "Sequence" | "MutableSequence" | "Deque" | "deque" => "any[]",
        "tuple" | "Tuple" => "any[]",
        "dict" | "Dict" | "Mapping" | "MutableMapping" | "DefaultDict" | "OrderedDict" => {
            "Record<string, any>"
        }
        "set" | "Set" => "Set<any>",
        "frozenset" | "FrozenSet" => "ReadonlySet<any>",
        "Callable" => "(...args: unknown[]) => unknown",
        "Iterable" => "Iterable<any>",
        "Iterator" => "Iterator<any>",
        "Generator" => "Generator<any, any, any>",
        "Optional" => "any",
        "type" | "Type" => "new (...args: any[]) => any",
        _ => return None,
    })
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Translate an annotation node (a `type` wrapper or a bare expression).
pub fn translate(node: Node, source: &str) -> String {
    match node.kind() {
        "type" => match node.named_child(0) {
            Some(inner) => translate(inner, source),
            None => text(node, source).to_string(),
        },
        "identifier" => translate_name(text(node, source)),
        "none" => "null".to_string(),
        "attribute" | "member_type" => translate_name(text(node, source)),
        "string" => forward_reference(node, source),
        "subscript" => {
            let Some(base) = node.child_by_field_name("value") else {
                return text(node, source).to_string();
            };
            let args = children_by_field(node, "subscript");
            translate_generic(base, &args, source)
        }
        "generic_type" => {
            let children = named_children(node);
            let Some(base) = children.first().copied() else {
                return text(node, source).to_string();
            };
            let args: Vec<Node> = children
                .iter()
                .filter(|child| child.kind() == "type_parameter")
                .flat_map(|param| named_children(*param))
                .collect();
            translate_generic(base, &args, source)
        }
        "binary_operator" => {
            let operator = node.child_by_field_name("operator");
            match (
                node.child_by_field_name("left"),
                operator.map(|op| text(op, source)),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some("|"), Some(right)) => {
                    union([translate(left, source), translate(right, source)])
                }
                _ => text(node, source).to_string(),
            }
        }
        "union_type" => union(
            named_children(node)
                .into_iter()
                .map(|member| translate(member, source)),
        ),
        "parenthesized_expression" => match node.named_child(0) {
            Some(inner) => translate(inner, source),
            None => text(node, source).to_string(),
        },
        "list" => {
            // Only meaningful as a Callable parameter list.
            let params = callable_params(node, source);
            format!("[{params}]")
        }
        _ => text(node, source).to_string(),
    }
}

fn translate_name(name: &str) -> String {
    let last = last_segment(name);
    if let Some(ts) = primitive(last) {
        return ts.to_string();
    }
    if let Some(ts) = bare_generic(last) {
        return ts.to_string();
    }
    if name.contains('.') && is_typing_module(name) {
        return last.to_string();
    }
    name.to_string()
}

fn is_typing_module(dotted: &str) -> bool {
    matches!(
        dotted.split('.').next(),
        Some("typing" | "typing_extensions" | "collections" | "t")
    )
}

/// `"Node"` → `Node`. The quoted text is parsed as a name only.
fn forward_reference(node: Node, source: &str) -> String {
    let raw = text(node, source);
    let inner = raw
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c| c == '"' || c == '\'');
    translate_name(inner.trim())
}

fn translate_generic(base: Node, args: &[Node], source: &str) -> String {
    let base_text = text(base, source);
    let name = last_segment(base_text);
    let arg = |index: usize| {
        args.get(index)
            .map_or_else(|| "any".to_string(), |node| translate(*node, source))
    };
    match name {
        "list" | "List" | "Sequence" | "MutableSequence" | "Deque" | "deque" => {
            format!("{}[]", array_element(&arg(0)))
        }
        "dict" | "Dict" | "Mapping" | "MutableMapping" | "DefaultDict" | "defaultdict"
        | "OrderedDict" => format!("Record<{}, {}>", arg(0), arg(1)),
        "set" | "Set" | "MutableSet" => format!("Set<{}>", arg(0)),
        "frozenset" | "FrozenSet" | "AbstractSet" => format!("ReadonlySet<{}>", arg(0)),
        "tuple" | "Tuple" => {
            if args.len() == 2 && is_ellipsis(args.get(1), source) {
                return format!("{}[]", array_element(&arg(0)));
            }
            let items: Vec<String> = args.iter().map(|a| translate(*a, source)).collect();
            format!("[{}]", items.join(", "))
        }
        "Optional" => union([arg(0), "null".to_string()]),
        "Union" => union(args.iter().map(|a| translate(*a, source))),
        "Final" | "ClassVar" | "Annotated" | "Required" | "NotRequired" | "ReadOnly" => arg(0),
        "Callable" => translate_callable(args, source),
        "Iterable" | "Iterator" | "AsyncIterable" | "AsyncIterator" => {
            format!("{name}<{}>", arg(0))
        }
        "Generator" => format!("Generator<{}, {}, {}>", arg(0), arg(2), arg(1)),
        "AsyncGenerator" => format!("AsyncGenerator<{}, void, {}>", arg(0), arg(1)),
        "Awaitable" => format!("Promise<{}>", arg(0)),
        "Coroutine" => format!("Promise<{}>", arg(2)),
        "Type" | "type" => format!("new (...args: any[]) => {}", arg(0)),
        "Literal" => args
            .iter()
            .map(|a| literal_member(*a, source))
            .collect::<Vec<_>>()
            .join(" | "),
        _ => {
            let items: Vec<String> = args.iter().map(|a| translate(*a, source)).collect();
            format!("{}<{}>", translate_name(base_text), items.join(", "))
        }
    }
}

fn is_ellipsis(node: Option<&Node>, source: &str) -> bool {
    node.is_some_and(|n| text(*n, source).trim() == "...")
}

/// Union element types must be parenthesized before `[]`.
fn array_element(ts: &str) -> String {
    if ts.contains(' ') && !ts.starts_with('[') && !ts.starts_with('{') && !ts.contains('<') {
        format!("({ts})")
    } else {
        ts.to_string()
    }
}

/// Join union members. A function or constructor type swallows everything
/// after its arrow, so such members are parenthesized.
fn union(members: impl IntoIterator<Item = String>) -> String {
    members
        .into_iter()
        .map(|member| {
            if has_top_level_arrow(&member) {
                format!("({member})")
            } else {
                member
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn has_top_level_arrow(ts: &str) -> bool {
    let mut depth = 0usize;
    let mut previous = ' ';
    for c in ts.chars() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '>' if previous == '=' => {
                if depth == 0 {
                    return true;
                }
            }
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        previous = c;
    }
    false
}

fn translate_callable(args: &[Node], source: &str) -> String {
    let ret = args
        .get(1)
        .map_or_else(|| "unknown".to_string(), |node| translate(*node, source));
    let params = args.first().map(|node| unwrap_type(*node));
    match params {
        Some(list) if list.kind() == "list" => {
            format!("({}) => {ret}", callable_params(list, source))
        }
        _ => format!("(...args: unknown[]) => {ret}"),
    }
}

fn unwrap_type(node: Node) -> Node {
    if node.kind() == "type" {
        if let Some(inner) = node.named_child(0) {
            return inner;
        }
    }
    node
}

fn callable_params(list: Node, source: &str) -> String {
    named_children(list)
        .into_iter()
        .enumerate()
        .map(|(index, param)| format!("arg{index}: {}", translate(param, source)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn literal_member(node: Node, source: &str) -> String {
    let node = unwrap_type(node);
    match node.kind() {
        "string" => {
            let raw = text(node, source);
            let body = raw
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .trim_matches(|c| c == '"' || c == '\'');
            format!("\"{}\"", body.replace('"', "\\\""))
        }
        "true" => "true".to_string(),
        "false" => "false".to_string(),
        "none" => "null".to_string(),
        _ => text(node, source).to_string(),
    }
}

/// Side table for `Final` / `ClassVar` wrappers.
pub fn qualifiers(node: Node, source: &str) -> Qualifiers {
    let node = unwrap_type(node);
    let (base, has_args) = match node.kind() {
        "identifier" | "attribute" => (text(node, source), false),
        "subscript" => match node.child_by_field_name("value") {
            Some(value) => (text(value, source), true),
            None => return Qualifiers::default(),
        },
        "generic_type" => match node.named_child(0) {
            Some(value) => (text(value, source), true),
            None => return Qualifiers::default(),
        },
        _ => return Qualifiers::default(),
    };
    let mut qualifiers = match last_segment(base) {
        "Final" => Qualifiers {
            final_: true,
            ..Qualifiers::default()
        },
        "ClassVar" => Qualifiers {
            class_var: true,
            ..Qualifiers::default()
        },
        _ => return Qualifiers::default(),
    };
    qualifiers.bare = !has_args;
    if has_args {
        // ClassVar[Final[int]] and friends.
        let inner = match node.kind() {
            "subscript" => node.child_by_field_name("subscript"),
            _ => node
                .named_child(1)
                .and_then(|params| params.named_child(0)),
        };
        if let Some(inner) = inner {
            let nested = qualifiers_of_inner(inner, source);
            qualifiers.final_ |= nested.final_;
            qualifiers.class_var |= nested.class_var;
        }
    }
    qualifiers
}

fn qualifiers_of_inner(node: Node, source: &str) -> Qualifiers {
    let inner = unwrap_type(node);
    if matches!(inner.kind(), "subscript" | "generic_type" | "identifier") {
        qualifiers(inner, source)
    } else {
        Qualifiers::default()
    }
}

/// The annotation with qualifiers unwrapped, or `None` for a bare
/// qualifier.
pub fn declared_type(node: Node, source: &str) -> Option<String> {
    let qualifiers = qualifiers(node, source);
    if qualifiers.bare {
        return None;
    }
    Some(translate(node, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_python;
    use crate::syntax::statement_body;

    /// Translate the annotation of `x: <annotation>`.
    fn ts(annotation: &str) -> String {
        let source = format!("x: {annotation}\n");
        let tree = parse_python(&source).unwrap();
        let statement = tree.root_node().named_child(0).unwrap();
        let assignment = statement_body(statement);
        assert_eq!(assignment.kind(), "assignment");
        let ty = assignment.child_by_field_name("type").unwrap();
        translate(ty, &source)
    }

    fn quals(annotation: &str) -> Qualifiers {
        let source = format!("x: {annotation}\n");
        let tree = parse_python(&source).unwrap();
        let assignment = statement_body(tree.root_node().named_child(0).unwrap());
        qualifiers(assignment.child_by_field_name("type").unwrap(), &source)
    }

    #[test]
    fn test_primitive_table() {
        assert_eq!(ts("str"), "string");
        assert_eq!(ts("bool"), "boolean");
        assert_eq!(ts("int"), "number");
        assert_eq!(ts("float"), "number");
        assert_eq!(ts("bytes"), "Uint8Array");
        assert_eq!(ts("None"), "null");
        assert_eq!(ts("Any"), "any");
        assert_eq!(ts("object"), "object");
    }

    #[test]
    fn test_containers() {
        assert_eq!(ts("list[int]"), "number[]");
        assert_eq!(ts("List[str]"), "string[]");
        assert_eq!(ts("dict[str, int]"), "Record<string, number>");
        assert_eq!(ts("Set[int]"), "Set<number>");
        assert_eq!(ts("FrozenSet[str]"), "ReadonlySet<string>");
        assert_eq!(ts("tuple[int, str]"), "[number, string]");
        assert_eq!(ts("Tuple[int, ...]"), "number[]");
        assert_eq!(ts("list"), "any[]");
        assert_eq!(ts("dict"), "Record<string, any>");
    }

    #[test]
    fn test_unions_and_optionals() {
        assert_eq!(ts("Optional[int]"), "number | null");
        assert_eq!(ts("Union[int, str]"), "number | string");
        assert_eq!(ts("int | None"), "number | null");
        assert_eq!(ts("list[int | str]"), "(number | string)[]");
    }

    #[test]
    fn test_function_types_in_unions_are_parenthesized() {
        assert_eq!(ts("Optional[Callable[[int], str]]"), "((arg0: number) => string) | null");
        assert_eq!(ts("Union[Callable[[], int], None]"), "(() => number) | null");
        assert_eq!(ts("Callable[[], int] | None"), "(() => number) | null");
        assert_eq!(ts("Optional[Type[Foo]]"), "(new (...args: any[]) => Foo) | null");
        assert_eq!(ts("Callable[[], Optional[int]]"), "() => number | null");
    }

    #[test]
    fn test_callables() {
        assert_eq!(ts("Callable[[int, str], bool]"), "(arg0: number, arg1: string) => boolean");
        assert_eq!(ts("Callable[..., int]"), "(...args: unknown[]) => number");
        assert_eq!(ts("Callable"), "(...args: unknown[]) => unknown");
    }

    #[test]
    fn test_iteration_and_async() {
        assert_eq!(ts("Iterator[int]"), "Iterator<number>");
        assert_eq!(ts("Generator[int, str, bool]"), "Generator<number, boolean, string>");
        assert_eq!(ts("Awaitable[str]"), "Promise<string>");
        assert_eq!(ts("Coroutine[None, None, int]"), "Promise<number>");
    }

    #[test]
    fn test_misc_forms() {
        assert_eq!(ts("\"Node\""), "Node");
        assert_eq!(ts("typing.List[int]"), "number[]");
        assert_eq!(ts("Literal['a', 1]"), "\"a\" | 1");
        assert_eq!(ts("Type[Foo]"), "new (...args: any[]) => Foo");
        assert_eq!(ts("Final[int]"), "number");
        assert_eq!(ts("Box[int]"), "Box<number>");
    }

    #[test]
    fn test_qualifiers() {
        let q = quals("Final[int]");
        assert!(q.final_ && !q.bare && !q.class_var);
        let q = quals("Final");
        assert!(q.final_ && q.bare);
        let q = quals("ClassVar[int]");
        assert!(q.class_var && !q.final_);
        assert_eq!(quals("int"), Qualifiers::default());
    }
}
