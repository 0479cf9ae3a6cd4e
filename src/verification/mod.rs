use crate::claims::TokenPayload;
use crate::crypto::{build_rsa_public_key, verify_rsa_sha256};
use crate::jwk::{find_key, JsonWebKeyError};
use crate::jwt::{JsonWebToken, JsonWebTokenHeader};
use crate::ClientId;

use chrono::{DateTime, Utc};
use thiserror::Error;


/// Error verifying claims.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClaimsVerificationError {
    /// Claims have expired.
    #[error("Expired: {0}")]
    Expired(String),
    /// Audience claim is invalid.
    #[error("Invalid audience: {0}")]
    InvalidAudience(String),
    /// Issuer claim is invalid.
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),
    /// Claims are not valid yet.
    #[error("Not yet valid: {0}")]
    NotYetValid(String),
}

/// Verifies the audience, validity period, and issuer of a token's claims.
///
/// The current time is always passed in explicitly, so the verifier itself holds no clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimsVerifier {
    client_id: ClientId,
    issuer: String,
}
impl ClaimsVerifier {
    /// Initializes a verifier that requires the `aud` claim to equal `client_id` and the `iss`
    /// claim to equal `issuer`.
    pub fn new(client_id: ClientId, issuer: String) -> Self {
        ClaimsVerifier { client_id, issuer }
    }

    /// Returns the first claim that fails verification at time `now`.
    pub fn verify(
        &self,
        payload: &TokenPayload,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimsVerificationError> {
        // The audience must be exactly this client's ID. Multi-valued audiences are not trusted.
        match payload.audience() {
            Some(audience) if audience == self.client_id.as_str() => {}
            Some(audience) => {
                return Err(ClaimsVerificationError::InvalidAudience(format!(
                    "expected `{}` (found `{}`)",
                    self.client_id.as_str(),
                    audience
                )))
            }
            None if payload.get("aud").is_some() => {
                return Err(ClaimsVerificationError::InvalidAudience(
                    "audience claim is not a single string".to_string(),
                ))
            }
            None => {
                return Err(ClaimsVerificationError::InvalidAudience(
                    "missing audience claim".to_string(),
                ))
            }
        }

        let not_before = payload.not_before().ok_or_else(|| {
            ClaimsVerificationError::NotYetValid("missing or invalid not-before claim".to_string())
        })?;
        if not_before > now {
            return Err(ClaimsVerificationError::NotYetValid(format!(
                "token is not valid until {} (current time is {})",
                not_before, now
            )));
        }

        let expiration = payload.expiration().ok_or_else(|| {
            ClaimsVerificationError::Expired("missing or invalid expiration claim".to_string())
        })?;
        if now > expiration {
            return Err(ClaimsVerificationError::Expired(format!(
                "token expired at {} (current time is {})",
                expiration, now
            )));
        }

        match payload.issuer() {
            Some(issuer) if issuer == self.issuer => Ok(()),
            Some(issuer) => Err(ClaimsVerificationError::InvalidIssuer(format!(
                "expected `{}` (found `{}`)",
                self.issuer, issuer
            ))),
            None => Err(ClaimsVerificationError::InvalidIssuer(
                "missing issuer claim".to_string(),
            )),
        }
    }

    /// Returns whether every claim is valid at time `now`.
    pub fn validate(&self, payload: &TokenPayload, now: DateTime<Utc>) -> bool {
        match self.verify(payload, now) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Claims verification failed: {}", err);
                false
            }
        }
    }
}

// Only RS256 is supported. A header without an algorithm is treated as RS256.
fn check_signing_alg(header: &JsonWebTokenHeader) -> Result<(), String> {
    match header.alg {
        Some(ref alg) if !alg.is_rsa_sha_256() => Err(format!(
            "algorithm `{}` is not supported (expected `RS256`)",
            alg.as_str()
        )),
        _ => Ok(()),
    }
}

/// Verifies the RS256 signature of `jwt` with the key named by its `kid` header in the
/// JSON Web Key Set document `jwks_text`.
///
/// Returns `Ok(false)` for an unsupported algorithm or a signature mismatch. Errors mean the key
/// could not be resolved at all.
pub fn verify_signature(jwt: &JsonWebToken, jwks_text: &str) -> Result<bool, JsonWebKeyError> {
    let header = jwt.unverified_header();
    if let Err(err) = check_signing_alg(header) {
        log::debug!("Signature verification failed: {}", err);
        return Ok(false);
    }

    let (e, n) = find_key(jwks_text, &header.kid)?;
    let key = build_rsa_public_key(&e, &n)?;

    let verified = verify_rsa_sha256(jwt.signing_input().as_bytes(), jwt.signature(), &key);
    if !verified {
        log::debug!(
            "Signature verification failed: bad signature for key `{}`",
            header.kid.as_str()
        );
    }
    Ok(verified)
}
