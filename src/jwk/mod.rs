use crate::helpers::deserialize_option_or_none;
use crate::{JsonWebKeyId, JsonWebTokenAlgorithmName};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, VecSkipError};
use thiserror::Error;


/// Error resolving a key from a JSON Web Key Set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonWebKeyError {
    /// The document is not a JSON Web Key Set.
    #[error("Failed to parse JSON Web Key Set")]
    Parse(#[source] serde_path_to_error::Error<serde_json::Error>),
    /// The matching key entry is unusable as an RSA signature verification key.
    #[error("Malformed JSON Web Key Set: {0}")]
    MalformedJwks(String),
    /// No key in the set has the requested key ID.
    #[error("No JSON Web Key found with key ID `{}`", .0.as_str())]
    KeyNotFound(JsonWebKeyId),
    /// The key's exponent or modulus could not be turned into an RSA public key.
    #[error("Invalid RSA key material: {0}")]
    InvalidKeyMaterial(String),
}

// Section 4 of RFC 7517 states that "member names used for representing key parameters for
// different keys types need not be distinct." Fields we fail to understand are therefore set to
// None instead of failing the whole key.
/// Public key expressed as a JSON Web Key.
///
/// Only the members needed to locate and reconstruct an RSA verification key are read.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct JsonWebKey {
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub kty: Option<String>,
    #[serde(
        rename = "use",
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub alg: Option<JsonWebTokenAlgorithmName>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub kid: Option<JsonWebKeyId>,
    /// Base64url-encoded RSA modulus.
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub n: Option<String>,
    /// Base64url-encoded RSA public exponent.
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub e: Option<String>,
}
impl JsonWebKey {
    /// Instantiate a new RSA public key from its base64url-encoded modulus (`n`) and public
    /// exponent (`e`).
    pub fn new_rsa(n: String, e: String, kid: Option<JsonWebKeyId>) -> Self {
        Self {
            kty: Some("RSA".to_string()),
            use_: Some("sig".to_string()),
            alg: None,
            kid,
            n: Some(n),
            e: Some(e),
        }
    }

    // A missing 'kty' or 'use' is tolerated, since several providers omit them.
    fn check_rsa_signing_key(&self) -> Result<(), &'static str> {
        if let Some(ref kty) = self.kty {
            if kty != "RSA" {
                return Err("key type is not RSA");
            }
        }
        if let Some(ref use_) = self.use_ {
            if use_ != "sig" {
                return Err("key usage not permitted for digital signatures");
            }
        }
        Ok(())
    }
}

/// JSON Web Key Set.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct JsonWebKeySet {
    // Ignores invalid keys rather than failing. That way, clients can function using the keys that
    // they do understand, which is fine if they only ever get JWTs signed with those keys.
    #[serde_as(as = "VecSkipError<_>")]
    keys: Vec<JsonWebKey>,
}
impl JsonWebKeySet {
    /// Create a new JSON Web Key Set.
    pub fn new(keys: Vec<JsonWebKey>) -> Self {
        Self { keys }
    }

    /// Parses a JSON Web Key Set document.
    pub fn from_json(jwks_text: &str) -> Result<Self, JsonWebKeyError> {
        serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(jwks_text))
            .map_err(JsonWebKeyError::Parse)
    }

    /// Returns the base64url-encoded RSA exponent and modulus, in that order, of the key with
    /// the given key ID.
    ///
    /// If several keys share the key ID, the first one in document order is used.
    pub fn find_key(&self, kid: &JsonWebKeyId) -> Result<(&str, &str), JsonWebKeyError> {
        let mut matching = self
            .keys
            .iter()
            .filter(|key| key.kid.as_ref() == Some(kid));
        let key = matching
            .next()
            .ok_or_else(|| JsonWebKeyError::KeyNotFound(kid.clone()))?;

        let duplicates = matching.count();
        if duplicates > 0 {
            log::warn!(
                "JSON Web Key Set contains {} keys with key ID `{}`; using the first",
                duplicates + 1,
                kid.as_str()
            );
        }

        key.check_rsa_signing_key().map_err(|err| {
            JsonWebKeyError::InvalidKeyMaterial(format!("key `{}`: {}", kid.as_str(), err))
        })?;

        match (key.e.as_deref(), key.n.as_deref()) {
            (Some(e), Some(n)) => {
                log::debug!("Resolved JSON Web Key `{}`", kid.as_str());
                Ok((e, n))
            }
            _ => Err(JsonWebKeyError::MalformedJwks(format!(
                "key `{}` lacks an RSA exponent or modulus",
                kid.as_str()
            ))),
        }
    }

    /// Return the keys in this JSON Web Key Set.
    pub fn keys(&self) -> &Vec<JsonWebKey> {
        &self.keys
    }
}

/// Parses `jwks_text` and returns the base64url-encoded RSA exponent and modulus of the key with
/// the given key ID.
pub fn find_key(jwks_text: &str, kid: &JsonWebKeyId) -> Result<(String, String), JsonWebKeyError> {
    let jwks = JsonWebKeySet::from_json(jwks_text)?;
    let (e, n) = jwks.find_key(kid)?;
    Ok((e.to_string(), n.to_string()))
}
