//! The `format()` mini-language and printf-style `%` formatting.
//!
//! Grammar: `[[fill]align][sign][z][#][0][width][grouping][.precision][type]`.

use crate::coerce::{float_repr, repr, to_float, to_int, to_str};
use crate::error::{Result, SupportError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign and the digits (`=`).
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Align> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Minus,
    Plus,
    Space,
}

/// A parsed format specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Option<Sign>,
    pub no_negative_zero: bool,
    pub alternate: bool,
    pub zero_pad: bool,
    pub width: Option<usize>,
    pub grouping: Option<char>,
    pub precision: Option<usize>,
    pub kind: Option<char>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<FormatSpec> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = FormatSpec::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            parsed.align = Some(align);
            i = 1;
        }

        parsed.sign = match chars.get(i) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if parsed.sign.is_some() {
            i += 1;
        }
        if chars.get(i) == Some(&'z') {
            parsed.no_negative_zero = true;
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            parsed.zero_pad = true;
            i += 1;
        }
        parsed.width = read_number(&chars, &mut i)?;
        if let Some(&sep @ (',' | '_')) = chars.get(i) {
            parsed.grouping = Some(sep);
            i += 1;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            parsed.precision = read_number(&chars, &mut i)?;
            if parsed.precision.is_none() {
                return Err(SupportError::Value("Format specifier missing precision".into()));
            }
        }
        match &chars[i..] {
            [] => {}
            [kind] => parsed.kind = Some(*kind),
            _ => return Err(SupportError::Value("Invalid format specifier".into())),
        }
        Ok(parsed)
    }

    fn fill_char(&self) -> char {
        self.fill.unwrap_or(if self.zero_pad { '0' } else { ' ' })
    }

    fn numeric_align(&self) -> Align {
        self.align.unwrap_or(if self.zero_pad && self.fill.is_none() {
            Align::AfterSign
        } else {
            Align::Right
        })
    }
}

fn read_number(chars: &[char], i: &mut usize) -> Result<Option<usize>> {
    let start = *i;
    while chars.get(*i).is_some_and(char::is_ascii_digit) {
        *i += 1;
    }
    if start == *i {
        return Ok(None);
    }
    let digits: String = chars[start..*i].iter().collect();
    digits
        .parse()
        .map(Some)
        .map_err(|_| SupportError::Value("Too many decimal digits in format string".into()))
}

/// `format(value, spec)`.
pub fn format_value(value: &Value, spec: &str) -> Result<String> {
    if spec.is_empty() {
        return Ok(to_str(value));
    }
    let parsed = FormatSpec::parse(spec)?;
    match value {
        Value::Str(s) => format_str(s, &parsed),
        Value::Bool(b) => format_int(i64::from(*b), &parsed, 0),
        Value::Int(i) => format_int(*i, &parsed, 0),
        Value::Float(f) => format_float(*f, &parsed),
        other => Err(SupportError::Type(format!(
            "unsupported format string passed to {}.__format__",
            other.type_name()
        ))),
    }
}

fn pad(head: &str, body: &str, fill: char, align: Align, width: Option<usize>) -> String {
    let len = head.chars().count() + body.chars().count();
    let Some(width) = width.filter(|w| *w > len) else {
        return format!("{head}{body}");
    };
    let padding = width - len;
    let run = |n: usize| fill.to_string().repeat(n);
    match align {
        Align::Left => format!("{head}{body}{}", run(padding)),
        Align::Right => format!("{}{head}{body}", run(padding)),
        Align::Center => {
            let left = padding / 2;
            format!("{}{head}{body}{}", run(left), run(padding - left))
        }
        Align::AfterSign => format!("{head}{}{body}", run(padding)),
    }
}

fn group(digits: &str, sep: char, every: usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / every);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % every == 0 {
            out.push(sep);
        }
        out.push(*c);
    }
    out
}

fn sign_text(negative: bool, sign: Option<Sign>) -> &'static str {
    match (negative, sign) {
        (true, _) => "-",
        (false, Some(Sign::Plus)) => "+",
        (false, Some(Sign::Space)) => " ",
        (false, _) => "",
    }
}

/// Assemble sign, radix prefix, grouped integer digits and the remainder,
/// growing zero padding through the grouping when `0` was requested.
fn finish_number(
    head: &str,
    int_digits: &str,
    rest: &str,
    spec: &FormatSpec,
    group_every: usize,
) -> String {
    let grouped = |digits: &str| match spec.grouping {
        Some(sep) => group(digits, sep, group_every),
        None => digits.to_string(),
    };
    let fill = spec.fill_char();
    let align = spec.numeric_align();
    let mut digits = int_digits.to_string();
    let mut body = grouped(&digits);
    if let (Some(width), Some(_)) = (spec.width, spec.grouping) {
        if spec.zero_pad && fill == '0' && align == Align::AfterSign {
            let target = width.saturating_sub(head.chars().count() + rest.chars().count());
            while body.chars().count() < target {
                digits.insert(0, '0');
                body = grouped(&digits);
            }
        }
    }
    pad(head, &format!("{body}{rest}"), fill, align, spec.width)
}

fn format_str(s: &str, spec: &FormatSpec) -> Result<String> {
    if let Some(kind) = spec.kind.filter(|k| *k != 's') {
        return Err(SupportError::Value(format!(
            "Unknown format code '{kind}' for object of type 'str'"
        )));
    }
    if spec.sign.is_some() {
        return Err(SupportError::Value(
            "Sign not allowed in string format specifier".into(),
        ));
    }
    if spec.alternate {
        return Err(SupportError::Value(
            "Alternate form (#) not allowed in string format specifier".into(),
        ));
    }
    if spec.align == Some(Align::AfterSign) {
        return Err(SupportError::Value(
            "'=' alignment not allowed in string format specifier".into(),
        ));
    }
    if let Some(sep) = spec.grouping {
        return Err(SupportError::Value(format!("Cannot specify '{sep}' with 's'.")));
    }
    let body: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    Ok(pad(
        "",
        &body,
        spec.fill_char(),
        spec.align.unwrap_or(Align::Left),
        spec.width,
    ))
}

/// Format an integer. `min_digits` zero-extends the magnitude (printf
/// precision on `%d`).
fn format_int(value: i64, spec: &FormatSpec, min_digits: usize) -> Result<String> {
    let (radix, prefix) = match spec.kind {
        None | Some('d') | Some('n') => (10, ""),
        Some('b') => (2, "0b"),
        Some('o') => (8, "0o"),
        Some('x') => (16, "0x"),
        Some('X') => (16, "0X"),
        Some('c') => return format_char(value, spec),
        Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') => {
            return format_float(value as f64, spec);
        }
        Some(other) => {
            return Err(SupportError::Value(format!(
                "Unknown format code '{other}' for object of type 'int'"
            )));
        }
    };
    if spec.precision.is_some() {
        return Err(SupportError::Value(
            "Precision not allowed in integer format specifier".into(),
        ));
    }
    if spec.grouping == Some(',') && radix != 10 {
        return Err(SupportError::Value(format!(
            "Cannot specify ',' with '{}'.",
            spec.kind.unwrap_or('d')
        )));
    }
    let magnitude = value.unsigned_abs();
    let mut digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        16 if spec.kind == Some('X') => format!("{magnitude:X}"),
        16 => format!("{magnitude:x}"),
        _ => magnitude.to_string(),
    };
    if digits.len() < min_digits {
        digits = format!("{}{digits}", "0".repeat(min_digits - digits.len()));
    }
    let prefix = if spec.alternate { prefix } else { "" };
    let head = format!("{}{prefix}", sign_text(value < 0, spec.sign));
    let group_every = if radix == 10 { 3 } else { 4 };
    Ok(finish_number(&head, &digits, "", spec, group_every))
}

fn format_char(value: i64, spec: &FormatSpec) -> Result<String> {
    if spec.sign.is_some() {
        return Err(SupportError::Value(
            "Sign not allowed with integer format specifier 'c'".into(),
        ));
    }
    let c = u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| SupportError::Overflow("%c arg not in range(0x110000)".into()))?;
    Ok(pad(
        "",
        &c.to_string(),
        spec.fill_char(),
        spec.numeric_align(),
        spec.width,
    ))
}

fn split_exponent(text: &str) -> (&str, i32) {
    match text.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (text, 0),
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Scientific notation with `digits` fraction digits: `1.500000e+03`.
fn exponent_form(a: f64, digits: usize, alternate: bool, strip: bool) -> String {
    let raw = format!("{a:.digits$e}");
    let (mantissa, exp) = split_exponent(&raw);
    let mut mantissa = if strip {
        strip_fraction_zeros(mantissa).to_string()
    } else {
        mantissa.to_string()
    };
    if alternate && !mantissa.contains('.') {
        mantissa.push('.');
    }
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{exp_sign}{:02}", exp.abs())
}

/// General format (`g`). With `repr_style` this is the no-type float
/// format: at least one fraction digit, scientific from `exp >= p - 1`.
fn general_form(a: f64, precision: usize, alternate: bool, repr_style: bool) -> String {
    let p = precision.max(1);
    let exp = if a == 0.0 {
        0
    } else {
        split_exponent(&format!("{a:.prec$e}", prec = p - 1)).1
    };
    let threshold = if repr_style { p as i32 - 1 } else { p as i32 };
    if (-4..threshold).contains(&exp) {
        let digits = (p as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{a:.digits$}");
        let mut text = if alternate {
            fixed
        } else {
            strip_fraction_zeros(&fixed).to_string()
        };
        if alternate && !text.contains('.') {
            text.push('.');
        }
        if repr_style && !text.contains('.') {
            text.push_str(".0");
        }
        text
    } else {
        exponent_form(a, p - 1, alternate, !alternate)
    }
}

fn format_float(value: f64, spec: &FormatSpec) -> Result<String> {
    let kind = spec.kind;
    if let Some(other) = kind.filter(|k| !"eEfFgGn%".contains(*k)) {
        return Err(SupportError::Value(format!(
            "Unknown format code '{other}' for object of type 'float'"
        )));
    }
    let upper = matches!(kind, Some('E' | 'F' | 'G'));
    let a = value.abs();
    let mut body = if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        "inf".to_string()
    } else {
        match kind {
            Some('f' | 'F') => {
                let mut text = format!("{a:.prec$}", prec = spec.precision.unwrap_or(6));
                if spec.alternate && !text.contains('.') {
                    text.push('.');
                }
                text
            }
            Some('e' | 'E') => exponent_form(a, spec.precision.unwrap_or(6), spec.alternate, false),
            Some('g' | 'G' | 'n') => general_form(a, spec.precision.unwrap_or(6), spec.alternate, false),
            Some('%') => format!("{:.prec$}", a * 100.0, prec = spec.precision.unwrap_or(6)),
            _ => match spec.precision {
                Some(p) => general_form(a, p, spec.alternate, true),
                None => float_repr(a),
            },
        }
    };
    if kind == Some('%') {
        body.push('%');
    }
    if upper {
        body = body.to_uppercase();
    }

    let mut negative = value.is_sign_negative() && !value.is_nan();
    if negative && spec.no_negative_zero {
        let numeric = body.trim_end_matches('%').to_ascii_lowercase();
        if numeric.parse::<f64>() == Ok(0.0) {
            negative = false;
        }
    }
    let head = sign_text(negative, spec.sign);
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (int_digits, rest) = body.split_at(split);
    if int_digits.is_empty() {
        return Ok(pad(head, &body, spec.fill_char(), spec.numeric_align(), spec.width));
    }
    Ok(finish_number(head, int_digits, rest, spec, 3))
}

/// printf-style formatting for `template % args`.
///
/// A tuple supplies positional arguments, a dict supplies `%(name)s`
/// lookups, anything else is a single argument.
pub fn percent_format(template: &str, args: &Value) -> Result<String> {
    let mapping = match args {
        Value::Dict(entries) => Some(entries),
        _ => None,
    };
    let positional: Vec<Value> = match args {
        Value::Tuple(items) => items.clone(),
        other => vec![other.clone()],
    };
    let mut next_arg = 0;
    let mut take_arg = |key: Option<&str>| -> Result<Value> {
        if let (Some(key), Some(entries)) = (key, mapping) {
            return entries
                .iter()
                .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| SupportError::Key(format!("'{key}'")));
        }
        let value = positional.get(next_arg).cloned().ok_or_else(|| {
            SupportError::Type("not enough arguments for format string".into())
        })?;
        next_arg += 1;
        Ok(value)
    };

    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        if chars.get(i) == Some(&'%') {
            out.push('%');
            i += 1;
            continue;
        }
        let mut key = None;
        if chars.get(i) == Some(&'(') {
            let close = chars[i..]
                .iter()
                .position(|c| *c == ')')
                .ok_or_else(|| SupportError::Value("incomplete format key".into()))?;
            key = Some(chars[i + 1..i + close].iter().collect::<String>());
            i += close + 1;
        }
        let mut spec = FormatSpec::default();
        let mut left = false;
        while let Some(&flag) = chars.get(i) {
            match flag {
                '-' => left = true,
                '+' => spec.sign = Some(Sign::Plus),
                ' ' if spec.sign.is_none() => spec.sign = Some(Sign::Space),
                ' ' => {}
                '0' => spec.zero_pad = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            i += 1;
        }
        if chars.get(i) == Some(&'*') {
            spec.width = Some(take_arg(None)?.as_index()?.max(0) as usize);
            i += 1;
        } else {
            spec.width = read_number(&chars, &mut i)?;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            if chars.get(i) == Some(&'*') {
                spec.precision = Some(take_arg(None)?.as_index()?.max(0) as usize);
                i += 1;
            } else {
                spec.precision = Some(read_number(&chars, &mut i)?.unwrap_or(0));
            }
        }
        while matches!(chars.get(i), Some('h' | 'l' | 'L')) {
            i += 1;
        }
        let conversion = *chars
            .get(i)
            .ok_or_else(|| SupportError::Value("incomplete format".into()))?;
        i += 1;
        if left {
            spec.align = Some(Align::Left);
            spec.zero_pad = false;
        }
        let value = take_arg(key.as_deref())?;
        out.push_str(&convert_one(conversion, &value, spec)?);
    }
    if mapping.is_none() && next_arg < positional.len() && matches!(args, Value::Tuple(_)) {
        return Err(SupportError::Type(
            "not all arguments converted during string formatting".into(),
        ));
    }
    Ok(out)
}

fn convert_one(conversion: char, value: &Value, mut spec: FormatSpec) -> Result<String> {
    match conversion {
        's' | 'r' | 'a' => {
            let text = if conversion == 's' { to_str(value) } else { repr(value) };
            spec.sign = None;
            spec.alternate = false;
            if spec.align.is_none() {
                spec.align = Some(Align::Right);
            }
            spec.zero_pad = false;
            format_str(&text, &spec)
        }
        'd' | 'i' | 'u' => {
            let number = match value {
                Value::Str(_) => {
                    return Err(SupportError::Type(format!(
                        "%{conversion} format: a real number is required, not str"
                    )));
                }
                other => to_int(other, None)?,
            };
            let min_digits = spec.precision.take().unwrap_or(0);
            format_int(number, &spec, min_digits)
        }
        'x' | 'X' | 'o' => {
            spec.kind = Some(conversion);
            let min_digits = spec.precision.take().unwrap_or(0);
            format_int(value.as_index()?, &spec, min_digits)
        }
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' => {
            spec.kind = Some(conversion);
            format_float(to_float(value)?, &spec)
        }
        'c' => match value {
            Value::Str(s) if s.chars().count() == 1 => format_str(s, &spec),
            other => {
                spec.kind = Some('c');
                format_char(other.as_index()?, &spec)
            }
        },
        other => Err(SupportError::Value(format!(
            "unsupported format character '{other}'"
        ))),
    }
}

/// The line `print(*args, sep=sep, end=end)` writes.
pub fn print_line(args: &[Value], sep: &str, end: &str) -> String {
    let parts: Vec<String> = args.iter().map(to_str).collect();
    format!("{}{end}", parts.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: impl Into<Value>, spec: &str) -> String {
        format_value(&value.into(), spec).unwrap()
    }

    #[test]
    fn test_parse_full_spec() {
        let spec = FormatSpec::parse("*^+#012,.3f").unwrap();
        assert_eq!(spec.fill, Some('*'));
        assert_eq!(spec.align, Some(Align::Center));
        assert_eq!(spec.sign, Some(Sign::Plus));
        assert!(spec.alternate);
        assert!(spec.zero_pad);
        assert_eq!(spec.width, Some(12));
        assert_eq!(spec.grouping, Some(','));
        assert_eq!(spec.precision, Some(3));
        assert_eq!(spec.kind, Some('f'));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert!(FormatSpec::parse("10dd").is_err());
        assert!(FormatSpec::parse(".f").is_err());
    }

    #[test]
    fn test_alignment_and_fill() {
        assert_eq!(fmt("ab", "<5"), "ab   ");
        assert_eq!(fmt("ab", ">5"), "   ab");
        assert_eq!(fmt("ab", "^5"), " ab  ");
        assert_eq!(fmt("ab", "*^6"), "**ab**");
        assert_eq!(fmt(-42, "=6"), "-   42");
        assert_eq!(fmt(42, "5"), "   42");
    }

    #[test]
    fn test_width_invariant_holds_for_short_bodies() {
        for width in 0..12 {
            for value in ["", "a", "abcdef"] {
                let out = fmt(value, &format!("^{width}"));
                assert_eq!(out.chars().count(), width.max(value.len()));
            }
        }
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(fmt(255, "x"), "ff");
        assert_eq!(fmt(255, "#X"), "0XFF");
        assert_eq!(fmt(5, "b"), "101");
        assert_eq!(fmt(8, "#o"), "0o10");
        assert_eq!(fmt(65, "c"), "A");
        assert_eq!(fmt(255, "#010x"), "0x000000ff");
        assert_eq!(fmt(7, "+d"), "+7");
        assert_eq!(fmt(7, " d"), " 7");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(fmt(1234567, ","), "1,234,567");
        assert_eq!(fmt(1234567, "_"), "1_234_567");
        assert_eq!(fmt(0xdead_beefi64, "_x"), "dead_beef");
        assert_eq!(fmt(1234, "010,"), "00,001,234");
        assert_eq!(fmt(1234.5, ",.2f"), "1,234.50");
        assert!(format_value(&Value::Int(1), ",x").is_err());
    }

    #[test]
    fn test_float_types() {
        assert_eq!(fmt(3.14159, ".2f"), "3.14");
        assert_eq!(fmt(1500.0, ".2e"), "1.50e+03");
        assert_eq!(fmt(0.00001234, "g"), "1.234e-05");
        assert_eq!(fmt(123456789.0, "g"), "1.23457e+08");
        assert_eq!(fmt(100.0, "g"), "100");
        assert_eq!(fmt(0.25, "%"), "25.000000%");
        assert_eq!(fmt(0.5, ".0%"), "50%");
        assert_eq!(fmt(2.0, "F"), "2.000000");
        assert_eq!(fmt(f64::INFINITY, "F"), "INF");
        assert_eq!(fmt(1.0, "e"), "1.000000e+00");
    }

    #[test]
    fn test_float_without_type() {
        assert_eq!(fmt(1.5, ">6"), "   1.5");
        assert_eq!(fmt(123.0, ".3"), "1.23e+02");
        assert_eq!(fmt(100.0, ".5"), "100.0");
        assert_eq!(fmt(-0.0, "z.1f"), "0.0");
    }

    #[test]
    fn test_int_with_float_type() {
        assert_eq!(fmt(3, ".1f"), "3.0");
        assert_eq!(fmt(true, ">3"), "  1");
    }

    #[test]
    fn test_string_errors() {
        assert!(format_value(&Value::str("x"), "d").is_err());
        assert!(format_value(&Value::str("x"), "+").is_err());
        assert!(format_value(&Value::Int(1), ".2d").is_err());
        assert!(format_value(&Value::None, ">4").is_err());
        assert_eq!(fmt("abcdef", ".3"), "abc");
    }

    #[test]
    fn test_percent_format() {
        let args = Value::tuple([Value::str("x"), Value::Int(42), Value::Float(2.5)]);
        assert_eq!(
            percent_format("%s=%05d (%.1f%%)", &args).unwrap(),
            "x=00042 (2.5%)"
        );
        assert_eq!(percent_format("%-4s|", &Value::str("a")).unwrap(), "a   |");
        assert_eq!(percent_format("%r", &Value::str("a")).unwrap(), "'a'");
        assert_eq!(percent_format("%.3d", &Value::Int(5)).unwrap(), "005");
        assert_eq!(percent_format("%#x", &Value::Int(255)).unwrap(), "0xff");
        let named = Value::dict([(Value::str("n"), Value::Int(3))]);
        assert_eq!(percent_format("%(n)d items", &named).unwrap(), "3 items");
    }

    #[test]
    fn test_percent_format_argument_count() {
        let two = Value::tuple([Value::Int(1), Value::Int(2)]);
        assert!(percent_format("%d", &two).is_err());
        assert!(percent_format("%d %d %d", &two).is_err());
    }

    #[test]
    fn test_print_line() {
        let args = [Value::str("a"), Value::Int(1), Value::None];
        assert_eq!(print_line(&args, " ", "\n"), "a 1 None\n");
        assert_eq!(print_line(&args, ",", ""), "a,1,None");
    }
}
