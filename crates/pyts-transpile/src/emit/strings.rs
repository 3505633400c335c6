//! String literals: decoding Python escapes, re-quoting for TypeScript,
//! f-strings as template literals, bytes and docstrings.

use super::call::Arguments;
use super::Emitter;
use crate::diagnostics::FallbackKind;
use crate::syntax::{children, named_children};
use pyts_runtime::Primitive;
use tree_sitter::Node;

/// Prefix letters and the content between the quotes.
struct Literal<'s> {
    prefix: String,
    content: &'s str,
    /// Byte offset of `content` in the source.
    start: usize,
}

impl Literal<'_> {
    fn has(&self, flag: char) -> bool {
        self.prefix.contains(flag)
    }
}

impl<'a> Emitter<'a> {
    fn literal(&self, node: Node) -> Literal<'a> {
        let parts = children(node);
        let start = parts.first().filter(|p| p.kind() == "string_start");
        let end = parts.last().filter(|p| p.kind() == "string_end");
        let (prefix, from) = match start {
            Some(start) => {
                let spelled = self.text(*start);
                let prefix: String = spelled
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                (prefix, start.end_byte())
            }
            None => (String::new(), node.start_byte()),
        };
        let to = end.map_or(node.end_byte(), |end| end.start_byte());
        let content = self.ctx.source.get(from..to).unwrap_or("");
        Literal {
            prefix,
            content,
            start: from,
        }
    }

    pub(super) fn is_fstring(&self, node: Node) -> bool {
        node.kind() == "string" && self.literal(node).has('f')
    }

    /// Runtime value of a plain (non-f, non-bytes) string literal.
    fn string_value(&self, node: Node) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        let literal = self.literal(node);
        if literal.has('f') || literal.has('b') {
            return None;
        }
        Some(if literal.has('r') {
            literal.content.to_string()
        } else {
            decode_escapes(literal.content)
        })
    }

    pub(super) fn string(&mut self, node: Node) -> String {
        let literal = self.literal(node);
        if literal.has('f') {
            return self.fstring(node, literal.has('r'));
        }
        if literal.has('b') {
            let bytes = if literal.has('r') {
                literal.content.as_bytes().to_vec()
            } else {
                decode_bytes(literal.content)
            };
            return bytes_literal(&bytes);
        }
        match self.string_value(node) {
            Some(value) => quote(&value),
            None => self.passthrough_expr(node, FallbackKind::Malformed, "string literal"),
        }
    }

    /// Adjacent literals. All-plain runs merge into one literal.
    pub(super) fn concatenated_string(&mut self, node: Node) -> String {
        let parts = named_children(node);
        let values: Option<Vec<String>> = parts.iter().map(|p| self.string_value(*p)).collect();
        if let Some(values) = values {
            return quote(&values.concat());
        }
        let rendered = self.emit_list(&parts);
        format!("({})", rendered.join(" + "))
    }

    fn fstring(&mut self, node: Node, raw: bool) -> String {
        let literal = self.literal(node);
        let content_end = literal.start + literal.content.len();
        let mut out = String::from("`");
        let mut cursor = literal.start;
        for part in children(node) {
            if part.kind() != "interpolation" {
                continue;
            }
            let between = self.ctx.source.get(cursor..part.start_byte()).unwrap_or("");
            out.push_str(&template_text(between, raw));
            out.push_str(&self.interpolation(part));
            cursor = part.end_byte();
        }
        let tail = self.ctx.source.get(cursor..content_end).unwrap_or("");
        out.push_str(&template_text(tail, raw));
        out.push('`');
        out
    }

    /// `{expr!r:spec}` as `${...}`. `{expr=}` keeps its source text.
    fn interpolation(&mut self, node: Node) -> String {
        let Some(expression) = node
            .child_by_field_name("expression")
            .or_else(|| named_children(node).into_iter().next())
        else {
            return String::new();
        };
        let mut prefix = String::new();
        let mut conversion = None;
        let mut spec = None;
        for child in children(node) {
            match child.kind() {
                "=" => {
                    let start = expression.start_byte();
                    let spelled = self.ctx.source.get(start..child.end_byte()).unwrap_or("");
                    prefix = escape_template(spelled);
                }
                "type_conversion" => conversion = Some(self.text(child).trim_start_matches('!')),
                "format_specifier" => spec = Some(child),
                _ => {}
            }
        }
        let debug = !prefix.is_empty();
        let value = self.emit_expr(expression);
        let value = match conversion {
            Some("r") | Some("a") => self.runtime_call(Primitive::Repr, &value),
            Some(_) => self.runtime_call(Primitive::Str, &value),
            None if debug && spec.is_none() => self.runtime_call(Primitive::Repr, &value),
            None => value,
        };
        let rendered = match spec {
            Some(spec) => {
                let spec = self.format_spec(spec);
                self.ctx.deps.require(Primitive::Format);
                format!("format({value}, {spec})")
            }
            None if conversion.is_some() || debug => value,
            None => self.runtime_call(Primitive::Str, &value),
        };
        format!("{prefix}${{{rendered}}}")
    }

    fn runtime_call(&mut self, primitive: Primitive, value: &str) -> String {
        self.ctx.deps.require(primitive);
        format!("{}({value})", primitive.name())
    }

    /// A format spec as a string literal, or a template when it nests
    /// interpolations.
    fn format_spec(&mut self, spec: Node) -> String {
        let spelled = self.text(spec);
        let body = spelled.strip_prefix(':').unwrap_or(spelled);
        let nested: Vec<Node> = children(spec)
            .into_iter()
            .filter(|c| matches!(c.kind(), "interpolation" | "format_expression"))
            .collect();
        if nested.is_empty() {
            return quote(body);
        }
        let mut out = String::from("`");
        let mut cursor = spec.start_byte() + (spelled.len() - body.len());
        for part in nested {
            let between = self.ctx.source.get(cursor..part.start_byte()).unwrap_or("");
            out.push_str(&escape_template(between));
            let inner = match part.named_child(0) {
                Some(expr) => self.emit_expr(expr),
                None => String::new(),
            };
            out.push_str(&format!("${{{inner}}}"));
            cursor = part.end_byte();
        }
        out.push_str(&escape_template(self.ctx.source.get(cursor..spec.end_byte()).unwrap_or("")));
        out.push('`');
        out
    }

    /// `"{} {name}".format(a, name=b)` as a template literal, or `None`
    /// when a field uses indexing or attribute access.
    pub(super) fn format_method(&mut self, template: Node, args: &Arguments) -> Option<String> {
        let value = self.string_value(template)?;
        let mut out = String::from("`");
        let mut literal = String::new();
        let mut auto_index = 0;
        let mut chars = value.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    for next in chars.by_ref() {
                        if next == '}' {
                            break;
                        }
                        field.push(next);
                    }
                    let (field, spec) = match field.split_once(':') {
                        Some((field, spec)) => (field.to_string(), Some(spec.to_string())),
                        None => (field, None),
                    };
                    let (name, conversion) = match field.split_once('!') {
                        Some((name, conversion)) => (name.to_string(), Some(conversion.to_string())),
                        None => (field, None),
                    };
                    let argument: Option<Node> = if name.is_empty() {
                        let argument = args.positional.get(auto_index).copied();
                        auto_index += 1;
                        argument
                    } else if let Ok(index) = name.parse::<usize>() {
                        args.positional.get(index).copied()
                    } else if name.contains(['.', '[']) {
                        None
                    } else {
                        args.keyword(&name)
                    };
                    let argument = argument?;
                    let mut value = self.emit_expr(argument);
                    value = match conversion.as_deref() {
                        Some("r") | Some("a") => self.runtime_call(Primitive::Repr, &value),
                        _ => self.runtime_call(Primitive::Str, &value),
                    };
                    if let Some(spec) = spec {
                        self.ctx.deps.require(Primitive::Format);
                        value = format!("format({value}, {})", quote(&spec));
                    }
                    out.push_str(&escape_template(&literal));
                    literal.clear();
                    out.push_str(&format!("${{{value}}}"));
                }
                _ => literal.push(c),
            }
        }
        out.push_str(&escape_template(&literal));
        out.push('`');
        Some(out)
    }

    /// A docstring as a JSDoc block.
    pub(super) fn docstring(&mut self, node: Node) {
        let value = self
            .string_value(node)
            .unwrap_or_else(|| self.text(node).to_string());
        let lines = clean_doc(&value);
        match lines.as_slice() {
            [] => {}
            [single] => self.line(format!("/** {single} */")),
            _ => {
                self.line("/**");
                for line in &lines {
                    if line.is_empty() {
                        self.line(" *");
                    } else {
                        self.line(format!(" * {line}"));
                    }
                }
                self.line(" */");
            }
        }
    }
}

/// Decode Python escape sequences in a non-raw literal body.
fn decode_escapes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut digits = next.to_string();
                while digits.len() < 3 {
                    match chars.next_if(|d| ('0'..='7').contains(d)) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                push_code(&mut out, u32::from_str_radix(&digits, 8).ok(), &format!("\\{digits}"));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).map_while(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                let code = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten();
                push_code(&mut out, code, &format!("\\{next}{digits}"));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code(out: &mut String, code: Option<u32>, spelled: &str) {
    match code.and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push_str(spelled),
    }
}

fn decode_bytes(content: &str) -> Vec<u8> {
    let decoded = decode_escapes(content);
    // Escapes above 0x7f decode to U+0080..U+00FF; bytes keep the low byte.
    decoded.chars().map(|c| (c as u32 & 0xff) as u8).collect()
}

fn bytes_literal(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| b.is_ascii()) {
        let text: String = bytes.iter().map(|b| *b as char).collect();
        format!("new TextEncoder().encode({})", quote(&text))
    } else {
        let items: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
        format!("new Uint8Array([{}])", items.join(", "))
    }
}

/// A double-quoted TypeScript string literal for `value`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            _ => escape_common(&mut out, c),
        }
    }
    out.push('"');
    out
}

fn escape_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => escape_common(&mut out, c),
        }
    }
    out
}

fn escape_common(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{2028}' => out.push_str("\\u2028"),
        '\u{2029}' => out.push_str("\\u2029"),
        c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
        c => out.push(c),
    }
}

/// Literal text of an f-string between interpolations.
fn template_text(raw_text: &str, raw: bool) -> String {
    let unbraced = raw_text.replace("{{", "{").replace("}}", "}");
    let value = if raw { unbraced } else { decode_escapes(&unbraced) };
    escape_template(&value)
}

/// Docstring lines with common indentation removed and blank edges
/// trimmed. `*/` cannot appear inside the comment.
fn clean_doc(value: &str) -> Vec<String> {
    let lines: Vec<&str> = value.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut cleaned: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let line = if index == 0 {
                line.trim()
            } else {
                line.get(indent..).unwrap_or("").trim_end()
            };
            line.replace("*/", "*\\/")
        })
        .collect();
    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes(r"a\tb\n"), "a\tb\n");
        assert_eq!(decode_escapes(r"\x41\101é"), "AAé");
        assert_eq!(decode_escapes(r"\d"), "\\d");
        assert_eq!(decode_escapes("a\\\nb"), "ab");
    }

    #[test]
    fn test_quote_escapes_for_typescript() {
        assert_eq!(quote("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(quote("it's"), r#""it's""#);
        assert_eq!(quote("\u{7}"), r#""\x07""#);
    }

    #[test]
    fn test_template_text_escapes_backticks_and_dollars() {
        assert_eq!(template_text("a `b` ${c} {{d}}", false), "a \\`b\\` \\${c} {d}");
    }

    #[test]
    fn test_bytes_literal() {
        assert_eq!(bytes_literal(b"ab"), "new TextEncoder().encode(\"ab\")");
        assert_eq!(bytes_literal(&[0xff, 1]), "new Uint8Array([255, 1])");
    }

    #[test]
    fn test_clean_doc_dedents() {
        let doc = "Summary.\n\n    Details here.\n    More.\n    ";
        assert_eq!(clean_doc(doc), vec!["Summary.", "", "Details here.", "More."]);
    }
}
