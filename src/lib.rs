#![allow(clippy::unreadable_literal)]
#![cfg_attr(test, allow(clippy::cognitive_complexity))]

//!
//! [OpenID Connect](https://openid.net/specs/openid-connect-core-1_0.html) ID token checking for
//! relying parties, such as web applications signing users in with Azure AD B2C.
//!
//! A [`TokenChecker`] decodes a compact ID token (JWT), verifies its `RS256` signature with the
//! identity provider's JSON Web Key Set, and validates its audience (`aud`), validity period
//! (`nbf`/`exp`), and issuer (`iss`) claims.
//!
//! The identity provider's endpoints and key set come from an [`EndpointHandler`]. The
//! [`ProviderEndpoints`] implementation can be built from known values or fetched with
//! [OpenID Connect Discovery](https://openid.net/specs/openid-connect-discovery-1_0.html) through
//! any [`SyncHttpClient`]. When the provider responds with an authorization code instead of an
//! ID token, a [`CodeExchange`] (such as [`HttpCodeExchange`]) obtains the token first.
//!
//! # HTTP Clients
//!
//! HTTP requests are made through the [`SyncHttpClient`] trait from the
//! [`oauth2`](https://docs.rs/oauth2) crate, which is implemented for the clients enabled by this
//! crate's `reqwest-blocking`, `curl`, and `ureq` features, as well as for any
//! `Fn(HttpRequest) -> Result<HttpResponse, E>` closure.
//!
//! # Example
//!
//! ```rust,no_run
//! use idtoken_checker::{b2c_metadata_url, ClientId, ProviderEndpoints, TokenChecker};
//! # use idtoken_checker::{HttpRequest, HttpResponse};
//! # fn http_client(_request: HttpRequest) -> Result<HttpResponse, std::io::Error> {
//! #     unimplemented!()
//! # }
//!
//! # fn err_wrapper(id_token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let metadata_url = b2c_metadata_url("contoso", "B2C_1_signupsignin")?;
//! let endpoints = ProviderEndpoints::discover(&metadata_url, &http_client)?;
//!
//! let checker = TokenChecker::new(
//!     id_token,
//!     ClientId::new("client_id".to_string()),
//!     endpoints,
//! )?;
//! if checker.authenticate()? {
//!     println!("Signed in as {}", checker.payload().subject().unwrap_or("<unknown>"));
//! }
//! # Ok(())
//! # }
//! ```
//!

pub use oauth2::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest, HttpResponse, RedirectUrl,
    Scope, SyncHttpClient, TokenUrl,
};

#[cfg(all(feature = "curl", not(target_arch = "wasm32")))]
pub use oauth2::CurlHttpClient;
#[cfg(feature = "reqwest-blocking")]
pub use oauth2::reqwest;
#[cfg(feature = "ureq")]
pub use oauth2::ureq;

pub use crate::checker::{TokenChecker, TokenCheckerError, TokenSource};
pub use crate::claims::TokenPayload;
pub use crate::config::{b2c_metadata_url, ClientConfig, ConfigError};
pub use crate::crypto::{build_rsa_public_key, verify_rsa_sha256};
pub use crate::endpoint::{DiscoveryError, EndpointHandler, ProviderEndpoints, ProviderMetadata};
pub use crate::exchange::{CodeExchange, CodeExchangeError, HttpCodeExchange};
pub use crate::jwk::{find_key, JsonWebKey, JsonWebKeyError, JsonWebKeySet};
pub use crate::jwt::{
    CompactToken, JsonWebToken, JsonWebTokenError, JsonWebTokenHeader, SegmentError,
};
pub use crate::logout::LogoutRequest;
pub use crate::types::{
    EndSessionUrl, JsonWebKeyId, JsonWebKeySetUrl, JsonWebTokenAlgorithmName,
    PostLogoutRedirectUrl, ProviderMetadataUrl,
};
pub use crate::verification::{verify_signature, ClaimsVerificationError, ClaimsVerifier};

// Defined first since other modules need the macros, and definition order is significant for
// macros.
#[macro_use]
mod macros;

pub mod base64url;
mod checker;
mod claims;
mod config;
mod crypto;
mod endpoint;
mod exchange;
mod helpers;
mod http_utils;
mod jwk;
mod jwt;
mod logout;
mod types;
mod verification;
