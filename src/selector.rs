//! CouchDB-style equality selectors evaluated by the bundled ledger adapter.
//!
//! Accepts `{"selector": {"thid": "Theatre1", "obj": {"$eq": "ShowDetails"}}}`.
//! A record matches when every listed top-level field equals the given value.
use super::error::StorageError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let doc: Value =
            serde_json::from_str(raw).map_err(|e| StorageError::Selector(e.to_string()))?;

        let Some(Value::Object(fields)) = doc.get("selector") else {
            return Err(StorageError::Selector(
                "expected an object under \"selector\"".into(),
            ));
        };

        for (field, expected) in fields {
            if let Value::Object(op) = expected {
                if op.len() != 1 || !op.contains_key("$eq") {
                    return Err(StorageError::Selector(format!(
                        "unsupported operator on field {field}"
                    )));
                }
            }
        }

        Ok(Self {
            fields: fields.clone(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.fields.iter().all(|(field, expected)| {
            let expected = match expected {
                Value::Object(op) => op.get("$eq").unwrap_or(expected),
                _ => expected,
            };
            doc.get(field) == Some(expected)
        })
    }

    /// Matches raw ledger bytes. Non-JSON values only match an empty selector.
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        if self.is_empty() {
            return true;
        }
        serde_json::from_slice::<Value>(bytes).is_ok_and(|doc| self.matches(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_on_every_field() {
        let selector =
            Selector::parse(r#"{"selector": {"thid": "Theatre1", "obj": "ShowDetails"}}"#).unwrap();

        assert!(selector.matches(&json!({"thid": "Theatre1", "obj": "ShowDetails", "screen": "SC1"})));
        assert!(!selector.matches(&json!({"thid": "Theatre1", "obj": "Tickets"})));
        assert!(!selector.matches(&json!({"obj": "ShowDetails"})));
    }

    #[test]
    fn eq_operator_is_accepted() {
        let selector = Selector::parse(r#"{"selector": {"thid": {"$eq": "T1"}}}"#).unwrap();

        assert!(selector.matches(&json!({"thid": "T1"})));
        assert!(!selector.matches(&json!({"thid": "T2"})));
    }

    #[test]
    fn other_operators_are_rejected() {
        let err = Selector::parse(r#"{"selector": {"soda": {"$gt": 3}}}"#).unwrap_err();
        assert!(matches!(err, StorageError::Selector(_)));
    }

    #[test]
    fn missing_selector_object_is_rejected() {
        assert!(Selector::parse(r#"{"thid": "T1"}"#).is_err());
        assert!(Selector::parse("not json").is_err());
    }

    #[test]
    fn empty_selector_matches_anything() {
        let selector = Selector::parse(r#"{"selector": {}}"#).unwrap();

        assert!(selector.matches_bytes(b""));
        assert!(selector.matches_bytes(br#"{"thid":"T1"}"#));
    }
}
