//! Value comparison and coercion helpers for the executor.
//!
//! Comparison is loose on purpose: a value's runtime kind is decided per
//! comparison, not stored. Two values compare numerically whenever both
//! sides parse as numbers (so the text literal "60000" equals the number
//! 60000), and lexically otherwise.

use std::cmp::Ordering;

use serde_json::Value;

/// Interpret a value as a number if possible: JSON numbers directly,
/// strings when their full trimmed text parses as f64.
#[inline]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Loose equality: numeric when both sides read as numbers, textual
/// otherwise. Null only equals Null.
#[inline]
pub fn loose_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => {
            if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
                a == b
            } else {
                order_text(left) == order_text(right)
            }
        }
    }
}

/// Ordering comparison for WHERE/HAVING filters. Returns None when either
/// side is Null (a missing field), which fails every ordering operator.
#[inline]
pub fn compare_loose(left: &Value, right: &Value) -> Option<Ordering> {
    if left.is_null() || right.is_null() {
        return None;
    }

    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        a.partial_cmp(&b)
    } else {
        Some(order_text(left).cmp(&order_text(right)))
    }
}

/// Total ordering for ORDER BY: Null sorts before everything else, the
/// rest follows the loose comparison rule.
#[inline]
pub fn sort_compare(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_loose(left, right).unwrap_or(Ordering::Equal),
    }
}

/// Textual rendering for lexical comparison and group keys.
/// Null renders empty, matching how the original joined key parts.
#[inline]
pub fn order_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric reading for SUM/AVG reductions: missing and non-numeric
/// values count as 0.
#[inline]
pub fn numeric_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(as_number).unwrap_or(0.0)
}

/// Create a serde_json::Number from an f64 value.
#[inline]
pub fn number_from_f64(n: f64) -> serde_json::Number {
    serde_json::Number::from_f64(n).unwrap_or_else(|| serde_json::Number::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(60000)), Some(60000.0));
        assert_eq!(as_number(&json!("60000")), Some(60000.0));
        assert_eq!(as_number(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(as_number(&json!("Engineering")), None);
        assert_eq!(as_number(&Value::Null), None);
    }

    #[test]
    fn test_loose_equal_coerces_numeric_strings() {
        assert!(loose_equal(&json!(60000), &json!("60000")));
        assert!(loose_equal(&json!("60000"), &json!(60000.0)));
        assert!(loose_equal(&json!("HR"), &json!("HR")));
        assert!(!loose_equal(&json!("HR"), &json!("hr")));
        assert!(!loose_equal(&json!(60000), &json!("60001")));
    }

    #[test]
    fn test_null_only_equals_null() {
        assert!(loose_equal(&Value::Null, &Value::Null));
        assert!(!loose_equal(&Value::Null, &json!(0)));
        assert!(!loose_equal(&Value::Null, &json!("")));
    }

    #[test]
    fn test_compare_loose() {
        assert_eq!(
            compare_loose(&json!(50000), &json!(60000)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_loose(&json!("90000"), &json!(60000)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_loose(&json!("apple"), &json!("banana")),
            Some(Ordering::Less)
        );
        assert_eq!(compare_loose(&Value::Null, &json!(1)), None);
    }

    #[test]
    fn test_sort_compare_nulls_first() {
        assert_eq!(sort_compare(&Value::Null, &json!(1)), Ordering::Less);
        assert_eq!(sort_compare(&json!(1), &Value::Null), Ordering::Greater);
        assert_eq!(sort_compare(&Value::Null, &Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_numeric_or_zero() {
        assert_eq!(numeric_or_zero(Some(&json!(25))), 25.0);
        assert_eq!(numeric_or_zero(Some(&json!("abc"))), 0.0);
        assert_eq!(numeric_or_zero(None), 0.0);
    }
}
