use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::helpers::time::now_millis;

/// Token as issued by the identity provider.
///
/// Held as the raw JSON object so any shape round-trips unchanged; the
/// accessors only read the well-known string fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Map<String, Value>);

impl Token {
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self::default().with_field("access_token", access_token.into())
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get("access_token").and_then(Value::as_str)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.get("refresh_token").and_then(Value::as_str)
    }

    /// absolute expiry, epoch milliseconds
    pub fn expiry_date(&self) -> Option<i64> {
        self.get("expiry_date").and_then(Value::as_i64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Builds a token from a token-endpoint response, replacing an integral
    /// `expires_in` with an absolute `expiry_date`. Any other `expires_in`
    /// is kept as received.
    pub fn from_response(mut body: Map<String, Value>) -> Self {
        let expiry_date = body
            .get("expires_in")
            .and_then(Value::as_i64)
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|millis| now_millis().checked_add(millis));

        if let Some(expiry_date) = expiry_date {
            body.remove("expires_in");
            body.insert("expiry_date".to_owned(), Value::from(expiry_date));
        }
        Self(body)
    }
}

impl From<Map<String, Value>> for Token {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> Map<String, Value> {
        body.as_object().unwrap().clone()
    }

    #[test]
    fn any_object_survives_a_write() {
        let raw = json!({
            "access_token": "T1",
            "scope": ["a", "b"],
            "expiry_date": 1.7e12,
            "custom": {"a": 1}
        });
        let token: Token = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(token.access_token(), Some("T1"));
        assert_eq!(token.expiry_date(), None);
        assert_eq!(serde_json::to_value(&token).unwrap(), raw);
    }

    #[test]
    fn non_string_access_token_is_kept_but_not_exposed() {
        let token: Token = serde_json::from_value(json!({"access_token": 12345})).unwrap();
        assert_eq!(token.access_token(), None);
        assert_eq!(token.get("access_token"), Some(&json!(12345)));
    }

    #[test]
    fn expires_in_becomes_expiry_date() {
        let before = now_millis();
        let token = Token::from_response(response(
            json!({"access_token": "a", "refresh_token": "r", "expires_in": 3599}),
        ));
        assert!(token.expiry_date().unwrap() >= before + 3_599_000);
        assert!(token.get("expires_in").is_none());
        assert_eq!(token.refresh_token(), Some("r"));
    }

    #[test]
    fn non_integral_expires_in_is_kept() {
        let token = Token::from_response(response(json!({"access_token": "a", "expires_in": "3599"})));
        assert_eq!(token.get("expires_in"), Some(&json!("3599")));
        assert!(token.get("expiry_date").is_none());

        let token = Token::from_response(response(json!({"access_token": "a", "expires_in": 3599.5})));
        assert_eq!(token.get("expires_in"), Some(&json!(3599.5)));
        assert!(token.get("expiry_date").is_none());
    }

    #[test]
    fn overflowing_expires_in_is_kept() {
        let token = Token::from_response(response(
            json!({"access_token": "a", "expires_in": 9_223_372_036_854_775_i64}),
        ));
        assert_eq!(token.get("expires_in"), Some(&json!(9_223_372_036_854_775_i64)));
        assert!(token.expiry_date().is_none());

        let token = Token::from_response(response(json!({"access_token": "a", "expires_in": i64::MAX})));
        assert!(token.expiry_date().is_none());
    }
}
