use crate::helpers::timestamp_to_utc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded (but not necessarily trusted) claims of an ID token.
///
/// The standard claims used for validation are exposed through typed accessors. Any other claim
/// is passed through unchanged and can be read with [`TokenPayload::get`]. Accessors return `None`
/// both when a claim is missing and when it has an unexpected JSON type, so a malformed claim
/// can never be mistaken for a valid one.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenPayload(Map<String, Value>);
impl TokenPayload {
    /// Returns the audience (`aud`) claim, if it is a single string.
    pub fn audience(&self) -> Option<&str> {
        self.string_claim("aud")
    }

    /// Returns the issuer (`iss`) claim.
    pub fn issuer(&self) -> Option<&str> {
        self.string_claim("iss")
    }

    /// Returns the subject (`sub`) claim.
    pub fn subject(&self) -> Option<&str> {
        self.string_claim("sub")
    }

    /// Returns the not-before (`nbf`) claim.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.time_claim("nbf")
    }

    /// Returns the expiration (`exp`) claim.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.time_claim("exp")
    }

    /// Returns the issued-at (`iat`) claim.
    pub fn issue_time(&self) -> Option<DateTime<Utc>> {
        self.time_claim("iat")
    }

    /// Returns the raw value of any claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns all claims as a JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the payload, returning all claims as a JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    fn time_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.0.get(name) {
            Some(Value::Number(seconds)) => timestamp_to_utc(seconds),
            _ => None,
        }
    }
}
impl From<Map<String, Value>> for TokenPayload {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}
