//! Runtime dependency resolution and module assembly.

use pyts_runtime::Primitive;
use std::collections::{BTreeSet, HashSet};

/// Primitives the emitted text calls, and imports lifted to module top.
///
/// Both collections only grow during traversal and are read once at
/// assembly.
#[derive(Debug, Default)]
pub struct RuntimeDeps {
    required: BTreeSet<Primitive>,
    hoisted: Vec<String>,
    seen: HashSet<String>,
}

impl RuntimeDeps {
    pub fn require(&mut self, primitive: Primitive) {
        self.required.insert(primitive);
    }

    /// Record an import line found below module level. Duplicates are
    /// dropped; first-seen order is kept.
    pub fn hoist(&mut self, import: String) {
        if self.seen.insert(import.clone()) {
            self.hoisted.push(import);
        }
    }

    /// Required primitive names in name order.
    pub fn required_names(&self) -> Vec<String> {
        self.required.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn hoisted(&self) -> &[String] {
        &self.hoisted
    }
}

/// Prologue (runtime import, hoisted imports), a blank line, then the body.
/// Without a prologue the body is returned as is.
pub fn assemble(deps: &RuntimeDeps, runtime_module: &str, body: &str) -> String {
    let mut out = String::new();
    let names = deps.required_names();
    if !names.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from \"{runtime_module}\";\n",
            names.join(", ")
        ));
    }
    for import in deps.hoisted() {
        out.push_str(import);
        out.push('\n');
    }
    if out.is_empty() {
        return body.to_string();
    }
    out.push('\n');
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_names_sorted_and_deduplicated() {
        let mut deps = RuntimeDeps::default();
        deps.require(Primitive::Slice);
        deps.require(Primitive::FloorDiv);
        deps.require(Primitive::Slice);
        assert_eq!(deps.required_names(), vec!["floordiv", "slice"]);
    }

    #[test]
    fn test_hoist_keeps_first_seen_order() {
        let mut deps = RuntimeDeps::default();
        deps.hoist("import * as os from \"os\";".into());
        deps.hoist("import { x } from \"m\";".into());
        deps.hoist("import * as os from \"os\";".into());
        assert_eq!(deps.hoisted().len(), 2);
        assert!(deps.hoisted()[0].contains("os"));
    }

    #[test]
    fn test_assemble_layout() {
        let mut deps = RuntimeDeps::default();
        deps.require(Primitive::Mod);
        deps.require(Primitive::FloorDiv);
        deps.hoist("import { sqrt } from \"math\";".into());
        let text = assemble(&deps, "@pyts/runtime", "f();\n");
        assert_eq!(
            text,
            "import { floordiv, mod } from \"@pyts/runtime\";\nimport { sqrt } from \"math\";\n\nf();\n"
        );
    }

    #[test]
    fn test_assemble_without_prologue() {
        let deps = RuntimeDeps::default();
        assert_eq!(assemble(&deps, "rt", "let x = 1;\n"), "let x = 1;\n");
    }
}
