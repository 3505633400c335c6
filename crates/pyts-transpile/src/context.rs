//! Traversal state for one translation unit.

use crate::analysis::{ModuleFacts, Predeclaration, ScopePlan, Signature};
use crate::deps::RuntimeDeps;
use crate::diagnostics::Diagnostics;
use crate::options::TranslateOptions;
use crate::scope::ScopeTracker;
use std::collections::{HashMap, HashSet};

/// The method whose body is being emitted.
#[derive(Debug, Clone)]
pub struct Receiver {
    /// Python name of the receiver parameter (`self`, `cls`).
    pub name: String,
    /// `@classmethod`: the receiver is the class itself.
    pub is_class: bool,
}

/// Owned by one traversal and passed by exclusive reference; never shared.
#[derive(Debug)]
pub struct TranslationContext<'a> {
    pub source: &'a str,
    pub options: &'a TranslateOptions,
    /// Current nesting level of emitted lines.
    pub indent: usize,
    pub deps: RuntimeDeps,
    pub scopes: ScopeTracker,
    /// Classes known by name; calls to them construct with `new`.
    pub classes: HashSet<String>,
    pub functions: HashSet<String>,
    pub type_vars: HashSet<String>,
    /// Names bound by imports; method-name mapping skips them.
    pub imported: HashSet<String>,
    pub signatures: HashMap<String, Signature>,
    /// Depth of enclosing function bodies; 0 at module level.
    pub function_depth: usize,
    predeclarations: HashMap<usize, Vec<Predeclaration>>,
    temp_counter: usize,
    /// Temporaries introduced by the expression being emitted, declared
    /// before the next line is written.
    pub pending_temps: Vec<String>,
    pub receiver: Option<Receiver>,
    /// Type parameters of the enclosing class.
    pub class_type_params: Vec<String>,
    /// One entry per enclosing loop: its no-break flag, if it has an `else`.
    pub loop_flags: Vec<Option<String>>,
    /// Catch variables of the enclosing handlers, innermost last.
    pub catch_vars: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl<'a> TranslationContext<'a> {
    pub fn new(source: &'a str, options: &'a TranslateOptions, facts: ModuleFacts) -> Self {
        Self {
            source,
            options,
            indent: 0,
            deps: RuntimeDeps::default(),
            scopes: ScopeTracker::new(),
            classes: facts.classes,
            functions: facts.functions,
            type_vars: facts.type_vars,
            imported: HashSet::new(),
            signatures: facts.signatures,
            function_depth: 0,
            predeclarations: HashMap::new(),
            temp_counter: 0,
            pending_temps: Vec::new(),
            receiver: None,
            class_type_params: Vec::new(),
            loop_flags: Vec::new(),
            catch_vars: Vec::new(),
            diagnostics: Diagnostics::new(options.diagnostics),
        }
    }

    /// A synthesized name, unique within the unit.
    pub fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    pub fn add_plan(&mut self, plan: ScopePlan) {
        self.predeclarations.extend(plan.predeclarations);
    }

    pub fn take_predeclarations(&mut self, block_id: usize) -> Vec<Predeclaration> {
        self.predeclarations.remove(&block_id).unwrap_or_default()
    }

    /// Whether `name` resolves to a user definition rather than a builtin.
    pub fn is_user_defined(&self, name: &str) -> bool {
        self.scopes.is_visible(name) || self.functions.contains(name) || self.classes.contains(name)
    }
}
