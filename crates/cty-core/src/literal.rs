//! Rendering of raw schema literals (`default`, `example`, `enum` entries)
//!
//! Strings go through the YAML emitter, which leaves them bare only when they
//! read back as the same string. Lists and maps use their compact JSON
//! spelling, which is also valid YAML flow syntax.

use serde_json::Value;

/// Render a literal as it should appear after `key: `
pub fn render_literal(value: &Value) -> String {
    match value {
        Value::String(s) => render_string(s),
        other => other.to_string(),
    }
}

/// Render a list of literals as `a, b, c`
pub fn render_list(values: &[Value]) -> String {
    values
        .iter()
        .map(render_literal)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_string(s: &str) -> String {
    // Multi-line strings would be emitted as a block scalar, which cannot
    // share a line with its key.
    if s.contains('\n') {
        return Value::String(s.to_string()).to_string();
    }

    match serde_yaml::to_string(s) {
        Ok(yaml) => yaml.trim_end_matches('\n').to_string(),
        Err(_) => Value::String(s.to_string()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Read `rendered` back the way a YAML consumer sees it after `key: `
    fn read_back(rendered: &str) -> Value {
        let doc: Value = serde_yaml::from_str(&format!("key: {rendered}")).unwrap();
        doc["key"].clone()
    }

    #[test]
    fn test_plain_strings_stay_bare() {
        assert_eq!(render_literal(&json!("A")), "A");
        assert_eq!(render_literal(&json!("IfNotPresent")), "IfNotPresent");
        assert_eq!(render_literal(&json!("nginx:1.25")), "nginx:1.25");
    }

    #[test]
    fn test_ambiguous_strings_keep_their_type() {
        for s in [
            "", "true", "null", "42", "1.5", "0x10", "0o17", ".inf", "-.inf", ".nan",
            "{{ .Values }}", "a: b", "a #b", " padded", "- item", "*ref", "line\nbreak",
        ] {
            let rendered = render_literal(&json!(s));
            assert_ne!(rendered, s, "{s:?} must be quoted");
            assert_eq!(read_back(&rendered), json!(s), "{s:?} rendered as {rendered}");
        }
    }

    #[test]
    fn test_non_string_literals() {
        assert_eq!(render_literal(&json!(3)), "3");
        assert_eq!(render_literal(&json!(1.5)), "1.5");
        assert_eq!(render_literal(&json!(false)), "false");
        assert_eq!(render_literal(&json!(null)), "null");
        assert_eq!(render_literal(&json!(["a", 1])), r#"["a",1]"#);
        assert_eq!(render_literal(&json!({"k": "v"})), r#"{"k":"v"}"#);
    }

    #[test]
    fn test_render_list() {
        assert_eq!(render_list(&[json!("A"), json!("B"), json!(3)]), "A, B, 3");
        assert_eq!(render_list(&[json!("0x10"), json!("B")]), "'0x10', B");
        assert_eq!(render_list(&[]), "");
    }
}
