//! Import statements. Below module level they are hoisted to the
//! prologue, since ES imports are top-level only.

use super::Emitter;
use crate::diagnostics::FallbackKind;
use crate::scope::FrameKind;
use crate::syntax::{children_by_field, named_children};
use tree_sitter::Node;

/// Modules whose names the translator consumes structurally.
const CONSUMED: &[&str] = &[
    "__future__",
    "typing",
    "typing_extensions",
    "abc",
    "dataclasses",
    "enum",
    "collections.abc",
];

fn is_consumed(module: &str) -> bool {
    CONSUMED.contains(&module)
}

/// `a.b.c` → `a/b/c`.
fn module_path(dotted: &str) -> String {
    dotted.replace('.', "/")
}

impl<'a> Emitter<'a> {
    pub(super) fn import_statement(&mut self, node: Node) {
        for name in children_by_field(node, "name") {
            let (module, binding) = match name.kind() {
                "aliased_import" => {
                    let (Some(module), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) else {
                        continue;
                    };
                    (self.text(module), self.text(alias))
                }
                _ => {
                    let dotted = self.text(name);
                    (dotted, dotted.split('.').next().unwrap_or(dotted))
                }
            };
            if is_consumed(module) {
                continue;
            }
            let path = if name.kind() == "aliased_import" {
                module_path(module)
            } else {
                binding.to_string()
            };
            let ident = self.ident(binding);
            self.place_import(format!("import * as {ident} from \"{path}\";"), &[binding]);
        }
    }

    pub(super) fn import_from_statement(&mut self, node: Node) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return self.passthrough_statement(node, FallbackKind::StructuralMismatch, "import without module");
        };
        let path = match module.kind() {
            "relative_import" => self.relative_path(module),
            _ => {
                let dotted = self.text(module);
                if is_consumed(dotted) {
                    return;
                }
                module_path(dotted)
            }
        };
        if named_children(node).iter().any(|c| c.kind() == "wildcard_import") {
            return self.passthrough_statement(node, FallbackKind::Unsupported, "wildcard import");
        }
        let mut specifiers = Vec::new();
        let mut bindings = Vec::new();
        for name in children_by_field(node, "name") {
            match name.kind() {
                "aliased_import" => {
                    let (Some(imported), Some(alias)) = (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ) else {
                        continue;
                    };
                    let alias = self.text(alias);
                    specifiers.push(format!("{} as {}", self.text(imported), self.ident(alias)));
                    bindings.push(alias);
                }
                _ => {
                    let imported = self.text(name);
                    specifiers.push(self.ident(imported));
                    bindings.push(imported);
                }
            }
        }
        if specifiers.is_empty() {
            return;
        }
        self.place_import(
            format!("import {{ {} }} from \"{path}\";", specifiers.join(", ")),
            &bindings,
        );
    }

    /// `.`, `..pkg.mod` → `.`, `../pkg/mod`.
    fn relative_path(&self, node: Node) -> String {
        let mut dots = 0;
        let mut rest = None;
        for child in named_children(node) {
            match child.kind() {
                "import_prefix" => dots = self.text(child).len(),
                _ => rest = Some(module_path(self.text(child))),
            }
        }
        let base = if dots <= 1 {
            ".".to_string()
        } else {
            vec![".."; dots - 1].join("/")
        };
        match rest {
            Some(rest) => format!("{base}/{rest}"),
            None => base,
        }
    }

    fn place_import(&mut self, line: String, bindings: &[&str]) {
        if self.ctx.scopes.innermost_kind() == FrameKind::Module {
            self.line(line);
        } else {
            self.ctx.deps.hoist(line);
        }
        for binding in bindings {
            self.ctx.scopes.declare_global(binding);
            self.ctx.imported.insert(binding.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("os.path"), "os/path");
        assert!(is_consumed("typing"));
        assert!(!is_consumed("json"));
    }
}
