//! Layered text codec
//!
//! Nested lists and compounds are persisted as a single flat string. Each
//! child payload is wrapped in one *escaping layer*: the payload's `\`,
//! `[` and `]` are backslash-escaped and the result is enclosed in a
//! bracket pair. Layers stack, so a compound nested three deep is escaped
//! three times and splits back out unambiguously at every level.
//!
//! Splitting consumes exactly one layer: [`split_layered`] scans with an
//! escape-aware depth counter and hands back the unwrapped, unescaped
//! payloads. [`merge_layered`] is its exact inverse, which is what makes
//! the round-trip law (`decode(encode(v)) == v`) hold at arbitrary depth.
//!
//! Decoding never fails. Stray text between groups is skipped, an
//! unterminated group yields its partial payload, and a compound with too
//! few fields is padded out with empty strings by [`split_fields`].

use crate::parse::{ParseError, ParseResult};

/// Escape one layer: backslash every `\`, `[` and `]` in the payload.
pub fn escape_layer(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    for ch in payload.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Undo one [`escape_layer`] pass. A trailing lone backslash is kept.
pub fn unescape_layer(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Wrap a payload in one escaping layer.
pub fn add_layer(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len() + 2);
    out.push('[');
    out.push_str(&escape_layer(payload));
    out.push(']');
    out
}

/// Strip exactly one escaping layer from a wrapped payload.
///
/// Tolerant: input that is not wrapped comes back unchanged, so callers
/// at the entry boundary can normalize without first probing the shape.
pub fn remove_layer(text: &str) -> String {
    if let Some(inner) = unwrap_group(text) {
        unescape_layer(inner)
    } else {
        text.to_string()
    }
}

/// The inner text of `[...]` when the whole input is one balanced group.
fn unwrap_group(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    // The closing bracket must not be escaped and must actually close the
    // opening one, otherwise this is payload text, not a wrapper.
    let mut depth = 1usize;
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                if depth == 1 {
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if escaped || depth != 1 {
        return None;
    }
    Some(inner)
}

/// Split a flattened encoding into its immediate child payloads,
/// consuming one escaping layer per child.
pub fn split_layered(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut group = String::new();
    for ch in text.chars() {
        if escaped {
            escaped = false;
            group.push('\\');
            group.push(ch);
            continue;
        }
        match ch {
            '\\' if depth > 0 => escaped = true,
            '[' => {
                if depth > 0 {
                    group.push(ch);
                }
                depth += 1;
            }
            ']' => {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    out.push(unescape_layer(&group));
                    group.clear();
                } else {
                    group.push(ch);
                }
            }
            _ => {
                if depth > 0 {
                    group.push(ch);
                }
            }
        }
    }
    if depth > 0 {
        // Unterminated group: salvage what was read rather than dropping it.
        out.push(unescape_layer(&group));
    }
    out
}

/// Flatten child payloads into one encoding, adding one layer per child.
pub fn merge_layered<I, S>(payloads: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for payload in payloads {
        out.push_str(&add_layer(payload.as_ref()));
    }
    out
}

/// Split a compound encoding against a known field count.
///
/// Missing trailing fields are padded with empty strings; surplus fields
/// are dropped. Arity mismatches are tolerated here and only surface when
/// a caller asks for them explicitly via [`field_arity`].
pub fn split_fields(text: &str, count: usize) -> Vec<String> {
    let mut fields = split_layered(text);
    if fields.len() != count {
        tracing::trace!(expected = count, found = fields.len(), "padding compound fields");
    }
    fields.truncate(count);
    while fields.len() < count {
        fields.push(String::new());
    }
    fields
}

/// Report (rather than tolerate) an arity mismatch for a compound input.
pub fn field_arity(text: &str, count: usize) -> ParseResult<usize> {
    let found = split_layered(text).len();
    if found == count {
        ParseResult::success(found)
    } else {
        ParseResult::partial(
            found,
            ParseError::StructuralMismatch {
                expected: count,
                found,
            },
        )
    }
}

/// Parse boolean text. Case-insensitive `true`/`false`, nothing else.
pub fn parse_bool(text: &str) -> ParseResult<bool> {
    if text.eq_ignore_ascii_case("true") {
        ParseResult::success(true)
    } else if text.eq_ignore_ascii_case("false") {
        ParseResult::success(false)
    } else {
        ParseResult::failure(ParseError::malformed("boolean", text))
    }
}

/// Parse integer text as `i64`.
pub fn parse_int(text: &str) -> ParseResult<i64> {
    match text.trim().parse::<i64>() {
        Ok(value) => ParseResult::success(value),
        Err(_) => ParseResult::failure(ParseError::malformed("integer", text)),
    }
}

/// Parse decimal text as `f64`.
pub fn parse_double(text: &str) -> ParseResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) => ParseResult::success(value),
        Err(_) => ParseResult::failure(ParseError::malformed("decimal", text)),
    }
}

/// Match text against an enum constant catalog, case-insensitively,
/// normalizing to the catalog's own casing.
pub fn parse_enum(constants: &[String], text: &str) -> ParseResult<String> {
    let candidate = text.trim();
    for constant in constants {
        if constant.eq_ignore_ascii_case(candidate) {
            return ParseResult::success(constant.clone());
        }
    }
    ParseResult::failure(ParseError::validation(
        text,
        "not a recognized constant",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_round_trip() {
        for payload in ["", "plain", "with [brackets]", "back\\slash", "\\[mix]\\"] {
            assert_eq!(remove_layer(&add_layer(payload)), payload);
        }
    }

    #[test]
    fn test_remove_layer_is_tolerant() {
        assert_eq!(remove_layer("no wrapper"), "no wrapper");
        assert_eq!(remove_layer(""), "");
        // Adjacent groups are payload, not a single wrapper.
        assert_eq!(remove_layer("[a][b]"), "[a][b]");
    }

    #[test]
    fn test_split_merge_round_trip() {
        let payloads = vec![
            "one".to_string(),
            String::new(),
            "[nested][pair]".to_string(),
            "esc \\[ aped".to_string(),
        ];
        assert_eq!(split_layered(&merge_layered(&payloads)), payloads);
    }

    #[test]
    fn test_split_nested_depth() {
        // A compound of two fields where the first is itself a compound.
        let inner = merge_layered(["a", "b"]);
        let outer = merge_layered([inner.as_str(), "c"]);
        let fields = split_layered(&outer);
        assert_eq!(fields, vec![inner.clone(), "c".to_string()]);
        assert_eq!(split_layered(&fields[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_split_tolerates_junk_and_truncation() {
        assert_eq!(split_layered("garbage"), Vec::<String>::new());
        assert_eq!(split_layered("[a] junk [b]"), vec!["a", "b"]);
        assert_eq!(split_layered("[partial"), vec!["partial"]);
    }

    #[test]
    fn test_field_padding() {
        let fields = split_fields(&merge_layered(["x"]), 3);
        assert_eq!(fields, vec!["x", "", ""]);
        assert!(field_arity("[x]", 3).has_error());
        assert!(field_arity("[x]", 1).is_success());
    }

    #[test]
    fn test_empty_array_distinct_from_empty_element() {
        assert_eq!(split_layered(""), Vec::<String>::new());
        assert_eq!(split_layered("[]"), vec![""]);
    }

    #[test]
    fn test_scalar_parsing() {
        assert_eq!(parse_bool("TRUE").value(), Some(&true));
        assert!(parse_bool("yes").has_error());
        assert_eq!(parse_int(" 42 ").value(), Some(&42));
        assert!(parse_int("abc").has_error());
        assert_eq!(parse_double("0.5").value(), Some(&0.5));
        assert!(parse_double("half").has_error());
    }

    #[test]
    fn test_enum_normalizes_case() {
        let catalog = vec!["BLACK".to_string(), "WHITE".to_string()];
        assert_eq!(parse_enum(&catalog, "black").value(), Some(&"BLACK".to_string()));
        assert!(parse_enum(&catalog, "purple").has_error());
    }
}
