use crate::claims::TokenPayload;
use crate::endpoint::EndpointHandler;
use crate::exchange::CodeExchange;
use crate::jwk::JsonWebKeyError;
use crate::jwt::{JsonWebToken, JsonWebTokenError, SegmentError};
use crate::logout::LogoutRequest;
use crate::types::{EndSessionUrl, PostLogoutRedirectUrl};
use crate::verification::{self, ClaimsVerificationError, ClaimsVerifier};
use crate::{AuthorizationCode, ClientId, JsonWebKeyId};

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FormatterResult};
use std::sync::Arc;


/// What the identity provider sent back to the relying party.
#[derive(Clone, Debug)]
pub enum TokenSource {
    /// A compact ID token, as returned by the implicit flow.
    IdToken(String),
    /// An authorization code, to be exchanged for an ID token at the token endpoint.
    AuthorizationCode(AuthorizationCode),
}

/// Error checking an ID token.
///
/// A token that is well-formed but fails verification is not an error; see
/// [`TokenChecker::authenticate`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenCheckerError {
    /// The token is not three dot-separated segments, or its signature is not valid base64url.
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    /// The token header could not be decoded.
    #[error("Malformed token header")]
    MalformedHeader(#[source] SegmentError),
    /// The token payload could not be decoded.
    #[error("Malformed token payload")]
    MalformedPayload(#[source] SegmentError),
    /// The JSON Web Key Set is not a key set, or the matching key lacks an exponent or modulus.
    #[error("Malformed JSON Web Key Set")]
    MalformedJwks(#[source] JsonWebKeyError),
    /// No key in the JSON Web Key Set matches the token's key ID.
    #[error("No JSON Web Key found with key ID `{}`", .0.as_str())]
    KeyNotFound(JsonWebKeyId),
    /// The matching key's exponent or modulus is unusable.
    #[error("Invalid RSA key material: {0}")]
    InvalidKeyMaterial(String),
    /// The authorization code could not be exchanged for an ID token.
    #[error("ID token unavailable")]
    TokenUnavailable(#[source] Box<dyn Error + Send + Sync>),
}
impl From<JsonWebTokenError> for TokenCheckerError {
    fn from(err: JsonWebTokenError) -> Self {
        match err {
            JsonWebTokenError::MalformedToken(msg) => TokenCheckerError::MalformedToken(msg),
            JsonWebTokenError::MalformedHeader(err) => TokenCheckerError::MalformedHeader(err),
            JsonWebTokenError::MalformedPayload(err) => TokenCheckerError::MalformedPayload(err),
        }
    }
}
impl From<JsonWebKeyError> for TokenCheckerError {
    fn from(err: JsonWebKeyError) -> Self {
        match err {
            JsonWebKeyError::KeyNotFound(kid) => TokenCheckerError::KeyNotFound(kid),
            JsonWebKeyError::InvalidKeyMaterial(msg) => TokenCheckerError::InvalidKeyMaterial(msg),
            other => TokenCheckerError::MalformedJwks(other),
        }
    }
}

/// Checks an OpenID Connect ID token against the identity provider's keys and the relying
/// party's expectations.
///
/// The token is decoded once, when the checker is created. Its signature must verify with the
/// RS256 key named by its `kid` header, and its `aud`, `nbf`, `exp`, and `iss` claims must match
/// the client ID, the current time, and the provider's issuer.
#[derive(Clone)]
pub struct TokenChecker<'a, E>
where
    E: EndpointHandler,
{
    claims_verifier: ClaimsVerifier,
    client_id: ClientId,
    endpoints: E,
    jwt: JsonWebToken,
    time_fn: Arc<dyn Fn() -> DateTime<Utc> + 'a + Send + Sync>,
}
// The compact token and the clock are left out; only the header is shown.
impl<'a, E> Debug for TokenChecker<'a, E>
where
    E: EndpointHandler + Debug,
{
    fn fmt(&self, f: &mut Formatter) -> FormatterResult {
        f.debug_struct("TokenChecker")
            .field("claims_verifier", &self.claims_verifier)
            .field("client_id", &self.client_id)
            .field("endpoints", &self.endpoints)
            .field("header", self.jwt.unverified_header())
            .finish_non_exhaustive()
    }
}
impl<'a, E> TokenChecker<'a, E>
where
    E: EndpointHandler,
{
    /// Decodes a compact ID token.
    pub fn new(
        id_token: &str,
        client_id: ClientId,
        endpoints: E,
    ) -> Result<Self, TokenCheckerError> {
        let jwt = id_token.parse::<JsonWebToken>()?;
        let claims_verifier =
            ClaimsVerifier::new(client_id.clone(), endpoints.issuer().to_string());

        Ok(TokenChecker {
            claims_verifier,
            client_id,
            endpoints,
            jwt,
            // By default, use the current system time.
            time_fn: Arc::new(Utc::now),
        })
    }

    /// Obtains the ID token from `source`, exchanging an authorization code with `exchange` if
    /// necessary, and decodes it.
    pub fn from_source<X>(
        source: TokenSource,
        exchange: &X,
        client_id: ClientId,
        endpoints: E,
    ) -> Result<Self, TokenCheckerError>
    where
        X: CodeExchange + ?Sized,
    {
        let id_token = match source {
            TokenSource::IdToken(id_token) => id_token,
            TokenSource::AuthorizationCode(code) => exchange
                .exchange_code(&code)
                .map_err(|err| TokenCheckerError::TokenUnavailable(Box::new(err)))?,
        };
        Self::new(&id_token, client_id, endpoints)
    }

    /// Specifies a function for returning the current time.
    ///
    /// This function is used for verifying the token's validity period.
    pub fn set_time_fn<T>(mut self, time_fn: T) -> Self
    where
        T: Fn() -> DateTime<Utc> + 'a + Send + Sync,
    {
        self.time_fn = Arc::new(time_fn);
        self
    }

    /// Returns whether the token is authentic and currently valid.
    ///
    /// The signature is checked first; if it does not verify, the claims are not evaluated.
    /// Returns an error only when the token's key cannot be resolved from the key set.
    pub fn authenticate(&self) -> Result<bool, TokenCheckerError> {
        if !self.verify_signature()? {
            return Ok(false);
        }
        match self.verify_claims() {
            Ok(()) => Ok(true),
            Err(err) => {
                log::debug!("Claims verification failed: {}", err);
                Ok(false)
            }
        }
    }

    /// Verifies the token's signature.
    pub fn verify_signature(&self) -> Result<bool, TokenCheckerError> {
        verification::verify_signature(&self.jwt, self.endpoints.jwks_uri_data())
            .map_err(TokenCheckerError::from)
    }

    /// Verifies the token's claims at the current time, without checking its signature.
    pub fn verify_claims(&self) -> Result<(), ClaimsVerificationError> {
        self.claims_verifier
            .verify(self.jwt.unverified_payload(), (*self.time_fn)())
    }

    /// Returns the token's claims. They must not be trusted unless
    /// [`TokenChecker::authenticate`] returned `Ok(true)`.
    pub fn payload(&self) -> &TokenPayload {
        self.jwt.unverified_payload()
    }

    /// Returns the decoded token.
    pub fn id_token(&self) -> &JsonWebToken {
        &self.jwt
    }

    /// Returns the provider's end session (logout) endpoint, if it has one.
    pub fn end_session_endpoint(&self) -> Option<&str> {
        self.endpoints.end_session_endpoint()
    }

    /// Returns the URL that logs the user out of the identity provider, with this token as the
    /// `id_token_hint`, or `None` if the provider has no end session endpoint.
    pub fn logout_url(
        &self,
        post_logout_redirect_uri: Option<PostLogoutRedirectUrl>,
    ) -> Result<Option<Url>, url::ParseError> {
        let end_session_endpoint = match self.end_session_endpoint() {
            Some(end_session_endpoint) => EndSessionUrl::new(end_session_endpoint.to_string())?,
            None => return Ok(None),
        };

        let mut request = LogoutRequest::from(end_session_endpoint)
            .set_id_token_hint(&self.jwt)
            .set_client_id(self.client_id.clone());
        if let Some(post_logout_redirect_uri) = post_logout_redirect_uri {
            request = request.set_post_logout_redirect_uri(post_logout_redirect_uri);
        }
        Ok(Some(request.http_get_url()))
    }
}
