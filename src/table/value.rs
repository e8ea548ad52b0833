//! Cell value helpers.
//!
//! Rows are read through accessors that produce [`serde_json::Value`]s. These
//! helpers give every value a display string and a total ordering so that
//! filtering and sorting never have to care about the shape of a field.

use std::cmp::Ordering;

use serde_json::Value;

/// Stringify a cell value for display and substring matching.
///
/// Absent values (`null`) become the empty string. Lists are joined with
/// `", "`, which keeps list-valued columns searchable by the default filter.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Order two cell values.
///
/// Values of different kinds are ordered `null < bool < number < string <
/// list < object`, so absent fields always sort lowest. Lists compare by
/// length and objects compare by their serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Substring test used by the built-in predicates.
pub(crate) fn contains_text(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_null_is_empty() {
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(display_value(&json!("Ada")), "Ada");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn test_display_list_joins_items() {
        assert_eq!(display_value(&json!(["a", 1, null])), "a, 1, ");
    }

    #[test]
    fn test_null_sorts_lowest() {
        assert_eq!(compare_values(&Value::Null, &json!("")), Ordering::Less);
        assert_eq!(compare_values(&Value::Null, &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!([]), &Value::Null), Ordering::Greater);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(9), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
    }

    #[test]
    fn test_strings_compare_lexically() {
        assert_eq!(compare_values(&json!("Bob"), &json!("Ada")), Ordering::Greater);
        assert_eq!(compare_values(&json!("Ada"), &json!("Ada")), Ordering::Equal);
    }

    #[test]
    fn test_lists_compare_by_length() {
        assert_eq!(compare_values(&json!([1]), &json!([1, 2])), Ordering::Less);
    }

    #[test]
    fn test_contains_text_case_handling() {
        assert!(contains_text("Algebra", "alg", false));
        assert!(!contains_text("Algebra", "alg", true));
        assert!(contains_text("Algebra", "Alg", true));
    }
}
