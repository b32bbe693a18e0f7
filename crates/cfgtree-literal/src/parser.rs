//! Scanner for the literal grammar.

use crate::{Literal, LiteralError};

/// Items of a bracketed sequence, split at top-level commas.
struct Items<'a> {
    parts: Vec<&'a str>,
    trailing_comma: bool,
}

/// Parse `input` as a literal.
///
/// Leading and trailing whitespace is ignored. Returns an error for any
/// text outside the grammar; the error never carries a partial value.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(LiteralError::Empty);
    }

    if text.starts_with('[') {
        let inner = strip_delimiters(text, '[', ']')?;
        let items = split_items(inner)?;
        return collect_scalars(&items).map(Literal::List);
    }

    if text.starts_with('(') {
        let inner = strip_delimiters(text, '(', ')')?;
        let items = split_items(inner)?;
        // `(x)` groups a scalar, `(x,)` is a one-element tuple
        if items.parts.len() == 1 && !items.trailing_comma {
            return parse_scalar(items.parts[0]);
        }
        return collect_scalars(&items).map(Literal::Tuple);
    }

    parse_scalar(text)
}

fn strip_delimiters(text: &str, open: char, close: char) -> Result<&str, LiteralError> {
    text.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| LiteralError::Unrecognized(text.to_string()))
}

fn split_items(inner: &str) -> Result<Items<'_>, LiteralError> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in inner.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '[' | ']' | '(' | ')' | '{' | '}' => {
                return Err(LiteralError::Nested(inner.to_string()));
            }
            ',' => {
                parts.push(inner[start..idx].trim());
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(LiteralError::UnterminatedString(inner.to_string()));
    }

    let last = inner[start..].trim();
    let trailing_comma = last.is_empty() && !parts.is_empty();
    if !last.is_empty() {
        parts.push(last);
    }

    if parts.iter().any(|p| p.is_empty()) {
        return Err(LiteralError::EmptyElement(inner.to_string()));
    }

    Ok(Items {
        parts,
        trailing_comma,
    })
}

fn collect_scalars(items: &Items<'_>) -> Result<Vec<Literal>, LiteralError> {
    items.parts.iter().map(|part| parse_scalar(part)).collect()
}

fn parse_scalar(text: &str) -> Result<Literal, LiteralError> {
    match text {
        "None" | "null" => return Ok(Literal::None),
        "True" | "true" => return Ok(Literal::Bool(true)),
        "False" | "false" => return Ok(Literal::Bool(false)),
        _ => {}
    }

    if text.starts_with('\'') || text.starts_with('"') {
        return parse_quoted(text).map(Literal::Str);
    }

    if looks_like_int(text) {
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        return cleaned
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| LiteralError::IntOverflow(text.to_string()));
    }

    if looks_like_float(text) {
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        return cleaned
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| LiteralError::Unrecognized(text.to_string()));
    }

    Err(LiteralError::Unrecognized(text.to_string()))
}

fn unsigned(text: &str) -> &str {
    text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text)
}

fn looks_like_int(text: &str) -> bool {
    let body = unsigned(text);
    let bytes = body.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if first.is_ascii_digit() && last.is_ascii_digit() => {}
        _ => return false,
    }
    // no leading zeros except for zero itself
    if bytes[0] == b'0' && bytes.iter().any(|b| b.is_ascii_digit() && *b != b'0') {
        return false;
    }
    body.bytes().all(|b| b.is_ascii_digit() || b == b'_') && !body.contains("__")
}

fn looks_like_float(text: &str) -> bool {
    let body = unsigned(text);
    let starts_ok = body
        .bytes()
        .next()
        .map_or(false, |b| b.is_ascii_digit() || b == b'.');
    let has_digit = body.bytes().any(|b| b.is_ascii_digit());
    let has_marker = body.contains('.') || body.contains('e') || body.contains('E');
    let charset_ok = body
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-' | b'_'));

    starts_ok && has_digit && has_marker && charset_ok && !body.contains("__")
}

fn parse_quoted(text: &str) -> Result<String, LiteralError> {
    let mut chars = text.chars();
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(LiteralError::Unrecognized(text.to_string())),
    };

    let mut out = String::new();
    let mut closed = false;
    while let Some(ch) = chars.next() {
        if closed {
            // text continues after the closing quote
            return Err(LiteralError::Unrecognized(text.to_string()));
        }
        match ch {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return Err(LiteralError::UnterminatedString(text.to_string())),
            },
            c if c == quote => closed = true,
            c => out.push(c),
        }
    }

    if closed {
        Ok(out)
    } else {
        Err(LiteralError::UnterminatedString(text.to_string()))
    }
}
