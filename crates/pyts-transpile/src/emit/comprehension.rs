//! Comprehensions and generator expressions.
//!
//! Eager forms become array method chains (`filter`, `map`, `flatMap`);
//! generator expressions and lazy mode become a generator IIFE.

use super::Emitter;
use crate::diagnostics::FallbackKind;
use crate::syntax::{has_token, named_children};
use pyts_runtime::Primitive;
use tree_sitter::Node;

/// One `for ... in ...` with the `if` clauses that follow it.
struct Loop {
    target: String,
    source: String,
    conditions: Vec<String>,
    is_async: bool,
}

/// Iterables that are not arrays and need `list(...)` before chaining.
const LAZY_PRODUCERS: &[&str] = &["range", "enumerate", "zip", "reversed", "map", "filter", "iter"];

impl<'a> Emitter<'a> {
    pub(super) fn comprehension(&mut self, node: Node) -> String {
        let kind = node.kind();
        let Some(body) = node.child_by_field_name("body").or_else(|| node.named_child(0)) else {
            return self.passthrough_expr(node, FallbackKind::Malformed, "empty comprehension");
        };
        let clauses: Vec<Node> = named_children(node)
            .into_iter()
            .filter(|c| matches!(c.kind(), "for_in_clause" | "if_clause"))
            .collect();
        let is_async = clauses
            .iter()
            .any(|c| c.kind() == "for_in_clause" && has_token(*c, "async"));
        let lazy = kind == "generator_expression" || self.ctx.options.lazy_comprehensions || is_async;

        // Iteration targets are parameters of the emitted closures.
        self.ctx.scopes.push_scope();
        let mut loops: Vec<Loop> = Vec::new();
        for clause in clauses {
            match clause.kind() {
                "for_in_clause" => {
                    let (Some(left), Some(right)) = (
                        clause.child_by_field_name("left"),
                        clause.child_by_field_name("right"),
                    ) else {
                        continue;
                    };
                    let source = self.emit_expr(right);
                    let source = if !lazy && self.needs_list(right) {
                        self.ctx.deps.require(Primitive::List);
                        format!("list({source})")
                    } else {
                        source
                    };
                    let mut names = Vec::new();
                    self.pattern_names(left, &mut names);
                    for name in &names {
                        self.ctx.scopes.declare(name);
                    }
                    let target = self.target_text(left).unwrap_or_else(|| self.text(left).to_string());
                    loops.push(Loop {
                        target,
                        source,
                        conditions: Vec::new(),
                        is_async: has_token(clause, "async"),
                    });
                }
                _ => {
                    let Some(condition) = clause.named_child(0) else {
                        continue;
                    };
                    let condition = self.emit_expr(condition);
                    if let Some(current) = loops.last_mut() {
                        current.conditions.push(condition);
                    }
                }
            }
        }
        let element = match (kind, body.kind()) {
            ("dictionary_comprehension", "pair") => {
                let key = self.emit_child(body, "key");
                let value = self.emit_child(body, "value");
                format!("[{key}, {value}]")
            }
            _ => self.emit_expr(body),
        };
        self.ctx.scopes.pop_scope();

        if loops.is_empty() {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "comprehension without loop");
        }
        if lazy {
            let generator = self.generator_iife(&loops, &element, is_async);
            return match kind {
                "list_comprehension" if is_async => format!("(await Array.fromAsync({generator}))"),
                "list_comprehension" => format!("[...{generator}]"),
                "set_comprehension" => format!("new Set({generator})"),
                "dictionary_comprehension" => format!("Object.fromEntries({generator})"),
                _ => generator,
            };
        }
        let chain = eager_chain(&loops, &element);
        match kind {
            "set_comprehension" => format!("new Set({chain})"),
            "dictionary_comprehension" => format!("Object.fromEntries({chain})"),
            _ => chain,
        }
    }

    fn needs_list(&self, source: Node) -> bool {
        match source.kind() {
            "generator_expression" | "string" | "set" | "set_comprehension" => true,
            "call" => source
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .is_some_and(|f| {
                    let name = self.text(f);
                    LAZY_PRODUCERS.contains(&name) && !self.ctx.is_user_defined(name)
                }),
            _ => false,
        }
    }

    /// `(function* () { for (...) { if (...) { yield x; } } })()`. Inside
    /// methods the IIFE is called with the method's `this`.
    fn generator_iife(&self, loops: &[Loop], element: &str, is_async: bool) -> String {
        let mut inner = format!("yield {element};");
        for current in loops.iter().rev() {
            for condition in current.conditions.iter().rev() {
                inner = format!("if ({condition}) {{ {inner} }}");
            }
            let keyword = if current.is_async { "for await" } else { "for" };
            inner = format!(
                "{keyword} (const {} of {}) {{ {inner} }}",
                current.target, current.source
            );
        }
        let function = if is_async { "async function*" } else { "function*" };
        let invoke = if self.ctx.receiver.is_some() { ".call(this)" } else { "()" };
        format!("({function} () {{ {inner} }}){invoke}")
    }
}

fn eager_chain(loops: &[Loop], element: &str) -> String {
    let Some((current, rest)) = loops.split_first() else {
        return element.to_string();
    };
    let mut chain = current.source.clone();
    let param = &current.target;
    if !current.conditions.is_empty() {
        chain.push_str(&format!(
            ".filter(({param}) => {})",
            current.conditions.join(" && ")
        ));
    }
    if rest.is_empty() {
        let element = if element.starts_with('{') {
            format!("({element})")
        } else {
            element.to_string()
        };
        chain.push_str(&format!(".map(({param}) => {element})"));
    } else {
        chain.push_str(&format!(".flatMap(({param}) => {})", eager_chain(rest, element)));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(target: &str, source: &str, conditions: &[&str]) -> Loop {
        Loop {
            target: target.to_string(),
            source: source.to_string(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            is_async: false,
        }
    }

    #[test]
    fn test_eager_chain_nests_with_flat_map() {
        let loops = vec![simple("x", "xs", &["(x > 0)"]), simple("y", "ys", &[])];
        assert_eq!(
            eager_chain(&loops, "[x, y]"),
            "xs.filter((x) => (x > 0)).flatMap((x) => ys.map((y) => [x, y]))"
        );
    }
}
