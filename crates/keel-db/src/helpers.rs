//! Small SQL helpers shared by the index and query modules.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp for the `created_at` column.
///
/// Fixed precision and a `Z` suffix keep lexical order equal to time order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escape `\`, `%` and `_` so `input` matches literally under `LIKE ... ESCAPE '\'`.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Turn a path glob into a `LIKE` pattern: every `*` becomes `%`, everything
/// else matches literally.
#[must_use]
pub fn glob_to_like(glob: &str) -> String {
    glob.split('*')
        .map(escape_like)
        .collect::<Vec<_>>()
        .join("%")
}

/// Detect errors raised by the FTS5 query parser.
///
/// Unbalanced quotes, stray operators, and column filters naming unknown
/// columns all surface as generic SQLite errors, so the message text is the
/// only signal. Everything else (I/O, locking, schema) must propagate.
pub fn is_search_syntax_error(e: &libsql::Error) -> bool {
    let msg = e.to_string().to_lowercase();
    msg.contains("fts5")
        || msg.contains("syntax error")
        || msg.contains("malformed match")
        || msg.contains("unterminated string")
        || msg.contains("no such column")
        || msg.contains("unknown special query")
}

/// Convert a libSQL cell to JSON for ad-hoc query output.
#[must_use]
pub fn value_to_json(value: libsql::Value) -> serde_json::Value {
    match value {
        libsql::Value::Null => serde_json::Value::Null,
        libsql::Value::Integer(i) => i.into(),
        libsql::Value::Real(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        libsql::Value::Text(s) => s.into(),
        libsql::Value::Blob(bytes) => format!("<blob: {} bytes>", bytes.len()).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("src/lib.rs", "src/lib.rs")]
    #[case("100%_done", "100\\%\\_done")]
    #[case("a\\b", "a\\\\b")]
    fn escape_like_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }

    #[rstest]
    #[case("src/*.rs", "src/%.rs")]
    #[case("src/*", "src/%")]
    #[case("*_test.rs", "%\\_test.rs")]
    #[case("no_star", "no\\_star")]
    fn glob_to_like_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(glob_to_like(input), expected);
    }

    #[test]
    fn timestamps_sort_lexically() {
        let a: DateTime<Utc> = "2026-03-01T09:59:59.5Z".parse().unwrap();
        let b: DateTime<Utc> = "2026-03-01T10:00:00Z".parse().unwrap();
        assert!(format_timestamp(&a) < format_timestamp(&b));
        assert_eq!(format_timestamp(&b), "2026-03-01T10:00:00.000000Z");
    }

    #[test]
    fn value_to_json_maps_scalars() {
        assert_eq!(value_to_json(libsql::Value::Integer(3)), serde_json::json!(3));
        assert_eq!(
            value_to_json(libsql::Value::Text("x".into())),
            serde_json::json!("x")
        );
        assert_eq!(value_to_json(libsql::Value::Null), serde_json::Value::Null);
    }
}
