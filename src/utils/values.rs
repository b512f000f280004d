//! Coercion of free-form YAML values (extra attributes, flavor catalogs).

use serde_yaml::Value;

/// Render a scalar for error messages the way it was written
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Coerce a value to a non-negative integer
///
/// Accepts integers and strings holding an integer (`"2048"`, `" 4 "`).
pub fn coerce_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a value to a boolean flag
///
/// Accepts booleans, `0`/`1` and the usual spellings of true and false.
pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(&yaml("2048")), Some(2048));
        assert_eq!(coerce_integer(&yaml("'4'")), Some(4));
        assert_eq!(coerce_integer(&yaml("four")), None);
        assert_eq!(coerce_integer(&yaml("-1")), None);
        assert_eq!(coerce_integer(&yaml("1.5")), None);
    }

    #[test]
    fn test_coerce_flag() {
        assert_eq!(coerce_flag(&yaml("true")), Some(true));
        assert_eq!(coerce_flag(&yaml("'False'")), Some(false));
        assert_eq!(coerce_flag(&yaml("1")), Some(true));
        assert_eq!(coerce_flag(&yaml("maybe")), None);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&yaml("lots")), "lots");
        assert_eq!(display_value(&yaml("12")), "12");
    }
}
