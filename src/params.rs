//! Field access on JSON request bodies.

use crate::error::AppError;
use serde_json::Value;

/// A present, non-blank string field, trimmed.
pub fn required_str(params: &Value, key: &str) -> Result<String, AppError> {
    match optional_str(params, key)? {
        Some(v) => Ok(v),
        None => Err(AppError::bad_params(format!("missing {key}"))),
    }
}

/// A string field that may be absent, null or blank (all read as `None`).
pub fn optional_str(params: &Value, key: &str) -> Result<Option<String>, AppError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(_) => Err(AppError::bad_params(format!("{key} must be a string"))),
    }
}

/// Form-style clients send numbers as strings; accept either.
pub fn required_f64(params: &Value, key: &str) -> Result<f64, AppError> {
    let n = match params.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(
            s.trim()
                .parse::<f64>()
                .map_err(|_| AppError::bad_params(format!("{key} must be a number")))?,
        ),
        Some(Value::String(_)) => None,
        Some(_) => return Err(AppError::bad_params(format!("{key} must be a number"))),
    };
    n.ok_or_else(|| AppError::bad_params(format!("missing {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_strings_count_as_missing() {
        let p = json!({ "a": "  ", "b": " x ", "c": null });
        assert!(matches!(required_str(&p, "a"), Err(AppError::Validation(_))));
        assert_eq!(required_str(&p, "b").expect("b"), "x");
        assert_eq!(optional_str(&p, "c").expect("c"), None);
        assert_eq!(optional_str(&p, "zzz").expect("zzz"), None);
    }

    #[test]
    fn non_string_is_rejected() {
        let p = json!({ "a": 5 });
        assert!(matches!(optional_str(&p, "a"), Err(AppError::Validation(_))));
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let p = json!({ "a": 8.5, "b": "7.25", "c": "eight", "d": "" });
        assert_eq!(required_f64(&p, "a").expect("a"), 8.5);
        assert_eq!(required_f64(&p, "b").expect("b"), 7.25);
        assert!(matches!(required_f64(&p, "c"), Err(AppError::Validation(_))));
        assert!(matches!(required_f64(&p, "d"), Err(AppError::Validation(_))));
        assert!(matches!(required_f64(&p, "e"), Err(AppError::Validation(_))));
    }
}
