//! Calls: builtins, known methods, constructors and keyword arguments.

use super::Emitter;
use crate::analysis::Signature;
use crate::diagnostics::FallbackKind;
use crate::syntax::named_children;
use pyts_runtime::Primitive;
use tree_sitter::Node;

/// Call arguments split by kind, in source order within each kind.
#[derive(Default)]
pub(super) struct Arguments<'t> {
    pub positional: Vec<Node<'t>>,
    pub keywords: Vec<(String, Node<'t>)>,
    /// `**mapping` arguments.
    pub mappings: Vec<Node<'t>>,
}

impl<'t> Arguments<'t> {
    pub fn keyword(&self, name: &str) -> Option<Node<'t>> {
        self.keywords.iter().find(|(key, _)| key == name).map(|(_, value)| *value)
    }

    fn only_positional(&self, count: usize) -> bool {
        self.positional.len() == count
            && self.keywords.is_empty()
            && self.mappings.is_empty()
            && self.positional.iter().all(|arg| arg.kind() != "list_splat")
    }
}

impl<'a> Emitter<'a> {
    pub(super) fn arguments<'t>(&self, node: Option<Node<'t>>) -> Arguments<'t> {
        let mut args = Arguments::default();
        let Some(node) = node else {
            return args;
        };
        // `f(x for x in xs)`
        if node.kind() == "generator_expression" {
            args.positional.push(node);
            return args;
        }
        for child in named_children(node) {
            match child.kind() {
                "keyword_argument" => {
                    if let (Some(name), Some(value)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("value"),
                    ) {
                        args.keywords.push((self.text(name).to_string(), value));
                    }
                }
                "dictionary_splat" => args.mappings.push(child),
                _ => args.positional.push(child),
            }
        }
        args
    }

    pub(super) fn call(&mut self, node: Node, force_new: bool) -> String {
        let Some(function) = node.child_by_field_name("function") else {
            return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "call without callee");
        };
        let args = self.arguments(node.child_by_field_name("arguments"));
        match function.kind() {
            "identifier" => {
                let name = self.text(function);
                if !self.ctx.is_user_defined(name) {
                    if let Some(lowered) = self.builtin_call(name, &args) {
                        return lowered;
                    }
                }
                let class_receiver = self
                    .ctx
                    .receiver
                    .as_ref()
                    .is_some_and(|r| r.is_class && r.name == name);
                let constructs = force_new || class_receiver || self.ctx.classes.contains(name);
                let callee = self.ident(name);
                let signature = self.ctx.signatures.get(name).cloned();
                let rendered = self.render_arguments(&args, signature.as_ref());
                if constructs {
                    format!("new {callee}({rendered})")
                } else {
                    format!("{callee}({rendered})")
                }
            }
            "attribute" => {
                let (Some(object), Some(attribute)) = (
                    function.child_by_field_name("object"),
                    function.child_by_field_name("attribute"),
                ) else {
                    return self.passthrough_expr(node, FallbackKind::StructuralMismatch, "incomplete attribute");
                };
                let attribute = self.text(attribute);
                if self.is_super_call(object) {
                    let rendered = self.render_arguments(&args, None);
                    return match attribute {
                        "__init__" => format!("super({rendered})"),
                        _ => format!("super.{attribute}({rendered})"),
                    };
                }
                if let Some(mapped) = self.method_call(object, attribute, &args) {
                    return mapped;
                }
                let callee = self.attribute(function);
                let rendered = self.render_arguments(&args, None);
                if force_new {
                    format!("new {callee}({rendered})")
                } else {
                    format!("{callee}({rendered})")
                }
            }
            _ => {
                let callee = self.emit_expr(function);
                let rendered = self.render_arguments(&args, None);
                match function.kind() {
                    "lambda" => format!("({callee})({rendered})"),
                    _ => format!("{callee}({rendered})"),
                }
            }
        }
    }

    /// Argument list text. With a known signature, keywords land in their
    /// positional slots (gaps become `undefined`), keyword-only names go in
    /// one options object and the rest in a trailing kwargs object.
    pub(super) fn render_arguments(&mut self, args: &Arguments, signature: Option<&Signature>) -> String {
        let spread = args.positional.iter().any(|arg| arg.kind() == "list_splat");
        let Some(signature) = signature.filter(|_| !spread) else {
            let mut out = self.emit_list(&args.positional);
            let mut entries = Vec::new();
            for (name, value) in &args.keywords {
                entries.push(format!("{name}: {}", self.emit_expr(*value)));
            }
            for mapping in &args.mappings {
                entries.push(self.emit_expr(*mapping));
            }
            if !entries.is_empty() {
                out.push(object_literal(&entries));
            }
            return out.join(", ");
        };

        let mut slots: Vec<Option<String>> = vec![None; signature.positional.len()];
        let mut extra = Vec::new();
        for (index, arg) in args.positional.iter().enumerate() {
            let rendered = self.emit_expr(*arg);
            match slots.get_mut(index) {
                Some(slot) => *slot = Some(rendered),
                None => extra.push(rendered),
            }
        }
        let mut options = Vec::new();
        let mut kwargs = Vec::new();
        for (name, value) in &args.keywords {
            let rendered = self.emit_expr(*value);
            if let Some(index) = signature.positional.iter().position(|p| p == name) {
                slots[index] = Some(rendered);
            } else if signature.var_keyword && !signature.keyword_only.contains(name) {
                kwargs.push(format!("{name}: {rendered}"));
            } else {
                options.push(format!("{name}: {rendered}"));
            }
        }
        for mapping in &args.mappings {
            let rendered = self.emit_expr(*mapping);
            if signature.var_keyword {
                kwargs.push(rendered);
            } else {
                options.push(rendered);
            }
        }

        let needs_options_slot = !signature.keyword_only.is_empty()
            && (!kwargs.is_empty() || (signature.var_positional && !extra.is_empty()));
        let needs_kwargs_slot = signature.var_keyword && signature.var_positional && !extra.is_empty();
        let trailing = !options.is_empty() || !kwargs.is_empty() || needs_options_slot || needs_kwargs_slot;
        if !trailing {
            while slots.last().is_some_and(Option::is_none) {
                slots.pop();
            }
        }
        let mut out: Vec<String> = slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| "undefined".to_string()))
            .collect();
        if !options.is_empty() {
            out.push(object_literal(&options));
        } else if needs_options_slot {
            out.push("{}".to_string());
        }
        if !kwargs.is_empty() {
            out.push(object_literal(&kwargs));
        } else if needs_kwargs_slot {
            out.push("{}".to_string());
        }
        out.extend(extra);
        out.join(", ")
    }

    /// Builtins with a native spelling, then runtime primitives.
    fn builtin_call(&mut self, name: &str, args: &Arguments) -> Option<String> {
        let arity = args.positional.len();
        let lowered = match name {
            "isinstance" if args.only_positional(2) => {
                let value = self.emit_expr(args.positional[0]);
                self.isinstance(&value, args.positional[1])
            }
            "cast" if args.only_positional(2) => {
                let ty = crate::types::translate(args.positional[0], self.ctx.source);
                let value = self.emit_expr(args.positional[1]);
                format!("({value} as {ty})")
            }
            "callable" if args.only_positional(1) => {
                let value = self.emit_expr(args.positional[0]);
                format!("(typeof {value} === \"function\")")
            }
            "hasattr" if args.only_positional(2) => {
                let object = self.emit_expr(args.positional[0]);
                let key = self.emit_expr(args.positional[1]);
                format!("({key} in {object})")
            }
            "getattr" if args.only_positional(2) || args.only_positional(3) => {
                let object = self.emit_expr(args.positional[0]);
                let key = self.emit_expr(args.positional[1]);
                match args.positional.get(2) {
                    Some(fallback) => format!("({object}[{key}] ?? {})", self.emit_expr(*fallback)),
                    None => format!("{object}[{key}]"),
                }
            }
            "setattr" if args.only_positional(3) => {
                let object = self.emit_expr(args.positional[0]);
                let key = self.emit_expr(args.positional[1]);
                let value = self.emit_expr(args.positional[2]);
                format!("({object}[{key}] = {value})")
            }
            "iter" if args.only_positional(1) => {
                format!("{}[Symbol.iterator]()", self.emit_expr(args.positional[0]))
            }
            "next" if args.only_positional(1) => {
                format!("{}.next().value", self.emit_expr(args.positional[0]))
            }
            "next" if args.only_positional(2) => {
                let iterator = self.emit_expr(args.positional[0]);
                let fallback = self.emit_expr(args.positional[1]);
                format!("({iterator}.next().value ?? {fallback})")
            }
            "map" if args.only_positional(2) => {
                let function = self.emit_expr(args.positional[0]);
                let source = self.emit_expr(args.positional[1]);
                self.ctx.deps.require(Primitive::List);
                format!("list({source}).map((__v) => {function}(__v))")
            }
            "filter" if args.only_positional(2) => {
                let source = self.emit_expr(args.positional[1]);
                self.ctx.deps.require(Primitive::List);
                if args.positional[0].kind() == "none" {
                    format!("list({source}).filter(Boolean)")
                } else {
                    let predicate = self.emit_expr(args.positional[0]);
                    format!("list({source}).filter((__v) => {predicate}(__v))")
                }
            }
            "list" | "tuple" if arity == 0 && args.keywords.is_empty() => "[]".to_string(),
            "set" if arity == 0 => "new Set()".to_string(),
            "str" if arity == 0 => "\"\"".to_string(),
            "dict" if arity == 0 => {
                let mut entries = Vec::new();
                for (key, value) in &args.keywords {
                    entries.push(format!("{key}: {}", self.emit_expr(*value)));
                }
                for mapping in &args.mappings {
                    entries.push(self.emit_expr(*mapping));
                }
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    object_literal(&entries)
                }
            }
            "super" => "super".to_string(),
            _ => {
                let primitive = Primitive::for_builtin(name)?;
                self.ctx.deps.require(primitive);
                let rendered = self.render_arguments(args, None);
                return Some(if primitive.is_exception() {
                    format!("new {}({rendered})", primitive.name())
                } else {
                    format!("{}({rendered})", primitive.name())
                });
            }
        };
        Some(lowered)
    }

    fn isinstance(&mut self, value: &str, classes: Node) -> String {
        if matches!(classes.kind(), "tuple" | "parenthesized_expression") {
            let tests: Vec<String> = named_children(classes)
                .into_iter()
                .map(|class| self.isinstance(value, class))
                .collect();
            return format!("({})", tests.join(" || "));
        }
        let spelled = self.text(classes);
        if self.ctx.is_user_defined(spelled) {
            return format!("({value} instanceof {})", self.emit_expr(classes));
        }
        match spelled {
            "int" | "float" => format!("(typeof {value} === \"number\")"),
            "str" => format!("(typeof {value} === \"string\")"),
            "bool" => format!("(typeof {value} === \"boolean\")"),
            "list" | "tuple" => format!("Array.isArray({value})"),
            "dict" => format!(
                "({value} !== null && typeof {value} === \"object\" && !Array.isArray({value}))"
            ),
            "set" => format!("({value} instanceof Set)"),
            _ => format!("({value} instanceof {})", self.class_reference(classes)),
        }
    }

    /// A class used by name: builtin exceptions come from the runtime.
    pub(super) fn class_reference(&mut self, node: Node) -> String {
        if node.kind() == "identifier" {
            let name = self.text(node);
            if !self.ctx.is_user_defined(name) {
                if let Some(primitive) = Primitive::for_builtin(name).filter(|p| p.is_exception()) {
                    self.ctx.deps.require(primitive);
                    return primitive.name().to_string();
                }
            }
        }
        self.emit_expr(node)
    }

    /// Methods of builtin types with a different native spelling. Calls on
    /// the receiver, imported modules and known classes are left alone.
    fn method_call(&mut self, object: Node, method: &str, args: &Arguments) -> Option<String> {
        if object.kind() == "identifier" {
            let name = self.text(object);
            let receiver = self.ctx.receiver.as_ref().is_some_and(|r| r.name == name);
            if receiver || self.ctx.imported.contains(name) || self.ctx.classes.contains(name) {
                return None;
            }
        }
        let string_literal = object.kind() == "string" && !self.is_fstring(object);
        if method == "format" && string_literal {
            return self.format_method(object, args);
        }
        if method == "sort" {
            return self.sort_call(object, args);
        }
        let arity = (0..=2).find(|count| args.only_positional(*count))?;
        let first = args.positional.first().copied();
        let mapped = match (method, arity) {
            ("append", 1) => format!(".push({})", self.emit_expr(first?)),
            ("extend", 1) => format!(".push(...{})", self.emit_expr(first?)),
            ("pop", 0) => ".pop()".to_string(),
            ("pop", 1) if first.is_some_and(|f| self.text(f) == "0") => ".shift()".to_string(),
            ("insert", 2) => {
                let index = self.emit_expr(args.positional[0]);
                let value = self.emit_expr(args.positional[1]);
                format!(".splice({index}, 0, {value})")
            }
            ("index", 1) | ("find", 1) => format!(".indexOf({})", self.emit_expr(first?)),
            ("strip", 0) => ".trim()".to_string(),
            ("lstrip", 0) => ".trimStart()".to_string(),
            ("rstrip", 0) => ".trimEnd()".to_string(),
            ("lower", 0) => ".toLowerCase()".to_string(),
            ("upper", 0) => ".toUpperCase()".to_string(),
            ("startswith", 1) => format!(".startsWith({})", self.emit_expr(first?)),
            ("endswith", 1) => format!(".endsWith({})", self.emit_expr(first?)),
            ("replace", 2) => {
                let old = self.emit_expr(args.positional[0]);
                let new = self.emit_expr(args.positional[1]);
                format!(".replaceAll({old}, {new})")
            }
            ("split", 0) => ".trim().split(/\\s+/)".to_string(),
            ("split", 1) => format!(".split({})", self.emit_expr(first?)),
            ("join", 1) if string_literal || object.kind() == "identifier" => {
                let separator = self.emit_expr(object);
                let items = first?;
                let items_text = self.emit_expr(items);
                return Some(match items.kind() {
                    "list" | "list_comprehension" => format!("{items_text}.join({separator})"),
                    _ => format!("[...{items_text}].join({separator})"),
                });
            }
            ("items", 0) => return Some(format!("Object.entries({})", self.emit_expr(object))),
            ("keys", 0) => return Some(format!("Object.keys({})", self.emit_expr(object))),
            ("values", 0) => return Some(format!("Object.values({})", self.emit_expr(object))),
            ("get", 1) | ("get", 2) => {
                let target = self.emit_expr(object);
                let key = self.emit_expr(args.positional[0]);
                let fallback = match args.positional.get(1) {
                    Some(fallback) => self.emit_expr(*fallback),
                    None => "null".to_string(),
                };
                return Some(format!("({target}[{key}] ?? {fallback})"));
            }
            ("update", 1) => {
                let target = self.emit_expr(object);
                let source = self.emit_expr(args.positional[0]);
                return Some(format!("Object.assign({target}, {source})"));
            }
            ("isdigit", 0) => return Some(format!("/^\\d+$/.test({})", self.emit_expr(object))),
            ("isspace", 0) => return Some(format!("/^\\s+$/.test({})", self.emit_expr(object))),
            _ => return None,
        };
        let target = self.emit_expr(object);
        Some(format!("{target}{mapped}"))
    }

    /// `xs.sort(key=f, reverse=True)` as a comparator.
    fn sort_call(&mut self, object: Node, args: &Arguments) -> Option<String> {
        if !args.positional.is_empty() || !args.mappings.is_empty() {
            return None;
        }
        if args.keywords.iter().any(|(name, _)| name != "key" && name != "reverse") {
            return None;
        }
        let reverse = match args.keyword("reverse") {
            None => false,
            Some(flag) => match flag.kind() {
                "true" => true,
                "false" => false,
                _ => return None,
            },
        };
        let target = self.emit_expr(object);
        let key = match args.keyword("key") {
            Some(key) => Some(self.emit_expr(key)),
            None => None,
        };
        if key.is_none() && !reverse {
            return Some(format!("{target}.sort((a, b) => (a < b ? -1 : a > b ? 1 : 0))"));
        }
        let (a, b) = if reverse { ("b", "a") } else { ("a", "b") };
        let (x, y) = match &key {
            Some(key) => {
                let key = if key.starts_with('(') && key.contains("=>") {
                    format!("({key})")
                } else {
                    key.clone()
                };
                (format!("{key}({a})"), format!("{key}({b})"))
            }
            None => (a.to_string(), b.to_string()),
        };
        Some(format!(
            "{target}.sort((a, b) => ({x} < {y} ? -1 : {x} > {y} ? 1 : 0))"
        ))
    }
}

fn object_literal(entries: &[String]) -> String {
    format!("{{ {} }}", entries.join(", "))
}
