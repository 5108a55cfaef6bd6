use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Flat form data: dotted-path key to value. Keys are never split.
pub type FormData = Map<String, Value>;

/// Field name to the first failing message for that field.
pub type ErrorMap = BTreeMap<String, String>;

/// Absent, `null` and `""` all count as "no value".
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Strict equality over JSON values. Numbers compare by value so `1 == 1.0`.
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Human form of a rule value for messages: strings unquoted, rest as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_covers_absent_null_and_blank() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(!is_empty_value(Some(&json!(" "))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(false))));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(strict_eq(&json!(["a", 2]), &json!(["a", 2])));
    }
}
