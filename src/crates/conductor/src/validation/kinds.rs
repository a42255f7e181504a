//! Built-in field validators.

use super::FieldValidator;
use serde_json::{Number, Value};

/// Non-empty string. Numbers are accepted and rendered as strings.
pub struct NonEmptyString;

impl FieldValidator for NonEmptyString {
    fn kind(&self) -> &'static str {
        "string"
    }

    fn check(&self, field: &str, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s.trim().to_string())),
            Value::String(_) => Err(format!("{} must not be empty", field)),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            other => Err(format!("{} must be a string (got {})", field, other)),
        }
    }
}

/// JSON number, or a string that parses as one.
pub struct Numeric;

impl Numeric {
    fn parse(raw: &str) -> Option<Number> {
        let raw = raw.trim().replace(',', "");
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Number::from(i));
        }
        raw.parse::<f64>().ok().and_then(Number::from_f64)
    }
}

impl FieldValidator for Numeric {
    fn kind(&self) -> &'static str {
        "number"
    }

    fn check(&self, field: &str, value: &Value) -> Result<Value, String> {
        match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => Self::parse(s)
                .map(Value::Number)
                .ok_or_else(|| format!("{} must be a number (got \"{}\")", field, s)),
            other => Err(format!("{} must be a number (got {})", field, other)),
        }
    }
}

/// JSON boolean, or the strings `true` / `false`.
pub struct Boolean;

impl FieldValidator for Boolean {
    fn kind(&self) -> &'static str {
        "boolean"
    }

    fn check(&self, field: &str, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(format!("{} must be true or false (got {})", field, other)),
        }
    }
}

/// One of a fixed list of values. String options match ignoring ASCII case
/// and the declared spelling is kept.
pub struct OneOf {
    options: Vec<Value>,
}

impl OneOf {
    pub fn new(options: Vec<Value>) -> Self {
        Self { options }
    }
}

impl FieldValidator for OneOf {
    fn kind(&self) -> &'static str {
        "enum"
    }

    fn check(&self, field: &str, value: &Value) -> Result<Value, String> {
        if self.options.contains(value) {
            return Ok(value.clone());
        }
        if let Value::String(s) = value {
            let wanted = s.trim();
            if let Some(option) = self
                .options
                .iter()
                .find(|o| o.as_str().is_some_and(|o| o.eq_ignore_ascii_case(wanted)))
            {
                return Ok(option.clone());
            }
        }

        let allowed: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
        Err(format!("{} must be one of {}", field, allowed.join(", ")))
    }
}

/// Accepts anything.
pub struct AnyValue;

impl FieldValidator for AnyValue {
    fn kind(&self) -> &'static str {
        "any"
    }

    fn check(&self, _field: &str, value: &Value) -> Result<Value, String> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_rules() {
        assert_eq!(NonEmptyString.check("owner", &json!(" 0x123 ")), Ok(json!("0x123")));
        assert_eq!(NonEmptyString.check("zip", &json!(90210)), Ok(json!("90210")));
        assert!(NonEmptyString.check("owner", &json!("  ")).is_err());
        assert!(NonEmptyString.check("owner", &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_numeric_rules() {
        assert_eq!(Numeric.check("amount", &json!(100)), Ok(json!(100)));
        assert_eq!(Numeric.check("amount", &json!("1,000")), Ok(json!(1000)));
        assert_eq!(Numeric.check("amount", &json!("2.5")), Ok(json!(2.5)));
        assert!(Numeric.check("amount", &json!("lots")).is_err());
        assert!(Numeric.check("amount", &json!(true)).is_err());
    }

    #[test]
    fn test_boolean_rules() {
        assert_eq!(Boolean.check("private", &json!(true)), Ok(json!(true)));
        assert_eq!(Boolean.check("private", &json!("False")), Ok(json!(false)));
        assert!(Boolean.check("private", &json!("maybe")).is_err());
    }

    #[test]
    fn test_one_of_keeps_declared_spelling() {
        let v = OneOf::new(vec![json!("mainnet"), json!("Sepolia"), json!(3)]);
        assert_eq!(v.check("network", &json!("sepolia")), Ok(json!("Sepolia")));
        assert_eq!(v.check("network", &json!(3)), Ok(json!(3)));

        let err = v.check("network", &json!("goerli")).unwrap_err();
        assert!(err.contains("mainnet"));
    }
}
