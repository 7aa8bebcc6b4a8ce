//! Argument narrowing and payload helpers shared by tools and resources

use serde_json::{Map, Value};

use crate::errors::HandlerError;

/// Untrusted tool arguments. Each accessor narrows one field and falls back
/// to the caller's default when the field is absent or of the wrong type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }
}

/// Output of a tool handler or resource producer.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    pub fn into_text(self) -> Result<String, HandlerError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }

    pub fn structured(&self) -> Option<Map<String, Value>> {
        match self {
            Self::Json(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }
}

/// Truncates to `max_chars` characters, appending "..." when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Arguments {
        Arguments::new(value.as_object().cloned().expect("object arguments"))
    }

    #[test]
    fn flag_accepts_booleans_and_boolean_strings() {
        let arguments = args(json!({"a": true, "b": "TRUE", "c": "0", "d": false}));
        assert!(arguments.flag_or("a", false));
        assert!(arguments.flag_or("b", false));
        assert!(!arguments.flag_or("c", true));
        assert!(!arguments.flag_or("d", true));
    }

    #[test]
    fn flag_defaults_on_absent_or_wrong_type() {
        let arguments = args(json!({"number": 1, "text": "yes please", "list": [true]}));
        assert!(!arguments.flag_or("missing", false));
        assert!(arguments.flag_or("number", true));
        assert!(!arguments.flag_or("text", false));
        assert!(!arguments.flag_or("list", false));
    }

    #[test]
    fn str_or_ignores_non_strings() {
        let arguments = args(json!({"message": 42, "name": "ok"}));
        assert_eq!(arguments.str_or("message", ""), "");
        assert_eq!(arguments.str_or("name", ""), "ok");
    }

    #[test]
    fn json_payload_serializes_to_text() {
        let payload = Payload::Json(json!({"status": "healthy"}));
        assert!(payload.structured().is_some());
        assert_eq!(
            payload.into_text().expect("serializable"),
            r#"{"status":"healthy"}"#
        );
        assert!(Payload::Text("plain".to_string()).structured().is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ééééé", 3), "ééé...");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }
}
