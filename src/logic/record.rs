//! Loan/customer record - the raw input to the feature pipeline
//!
//! A record is a flat map of field name to scalar JSON value. Services
//! merge their request groups into one record, the deriver adds computed
//! fields, and the assembler projects it into a numeric vector.

use serde_json::{Map, Value};

/// Flat field-name -> scalar value record.
///
/// Missing or non-numeric fields never fail lookups; numeric accessors
/// fall back to a caller-supplied default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Merge all entries of a JSON object into this record.
    /// Non-object values are ignored.
    pub fn merge_value(&mut self, value: Value) {
        if let Value::Object(map) = value {
            self.0.extend(map);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric view of a field. Numbers pass through, numeric strings are
    /// parsed, booleans map to 1/0. Anything else is None.
    pub fn num(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Numeric view with a default for absent or unparseable fields.
    pub fn num_or(&self, key: &str, default: f64) -> f64 {
        self.num(key).unwrap_or(default)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Truthiness of a field: true boolean, non-zero number, or "true".
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn set_num(&mut self, key: &str, value: f64) {
        let number = serde_json::Number::from_f64(value)
            .unwrap_or_else(|| serde_json::Number::from(0));
        self.0.insert(key.to_string(), Value::Number(number));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.0.insert(key.to_string(), Value::Number(value.into()));
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        let mut r = Record::new();
        r.merge_value(value);
        r
    }

    #[test]
    fn test_num_coercion() {
        let r = record(json!({
            "amount": 1500.5,
            "tenor": "36",
            "flag": true,
            "name": "customer",
            "empty": null,
        }));

        assert_eq!(r.num("amount"), Some(1500.5));
        assert_eq!(r.num("tenor"), Some(36.0));
        assert_eq!(r.num("flag"), Some(1.0));
        assert_eq!(r.num("name"), None);
        assert_eq!(r.num("empty"), None);
        assert_eq!(r.num("missing"), None);
    }

    #[test]
    fn test_num_or_default() {
        let r = record(json!({ "bad": "not a number" }));
        assert_eq!(r.num_or("bad", 0.5), 0.5);
        assert_eq!(r.num_or("missing", 50.0), 50.0);
    }

    #[test]
    fn test_flag() {
        let r = record(json!({ "a": true, "b": 0, "c": 2, "d": "true" }));
        assert!(r.flag("a"));
        assert!(!r.flag("b"));
        assert!(r.flag("c"));
        assert!(r.flag("d"));
        assert!(!r.flag("missing"));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut r = record(json!({ "x": 1 }));
        r.merge_value(json!({ "x": 2, "y": 3 }));
        assert_eq!(r.num("x"), Some(2.0));
        assert_eq!(r.num("y"), Some(3.0));
    }
}
