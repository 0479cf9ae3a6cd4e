use crate::http_utils::{check_content_type, MIME_TYPE_JSON, MIME_TYPE_JWKS};
use crate::jwk::JsonWebKeySet;
use crate::types::{EndSessionUrl, JsonWebKeySetUrl, ProviderMetadataUrl};
use crate::{HttpRequest, HttpResponse, SyncHttpClient, TokenUrl};

use http::header::{HeaderValue, ACCEPT};
use http::method::Method;
use http::status::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

#[cfg(test)]
pub(crate) mod tests;

/// Source of the identity provider endpoints and key material needed to check a token.
pub trait EndpointHandler {
    /// Returns the URL of the provider's token endpoint.
    fn token_endpoint(&self) -> &str;

    /// Returns the raw text of the provider's JSON Web Key Set document.
    fn jwks_uri_data(&self) -> &str;

    /// Returns the provider's issuer identifier, which must exactly match the `iss` claim.
    fn issuer(&self) -> &str;

    /// Returns the URL of the provider's end session (logout) endpoint, if it has one.
    fn end_session_endpoint(&self) -> Option<&str>;
}

/// Error retrieving provider metadata.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError<RE>
where
    RE: std::error::Error + 'static,
{
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
    /// Failed to parse server response.
    #[error("Failed to parse server response")]
    Parse(#[source] serde_path_to_error::Error<serde_json::Error>),
    /// An error occurred while sending the request or receiving the response (e.g., network
    /// connectivity failed).
    #[error("Request failed")]
    Request(#[source] RE),
    /// Server returned an invalid response.
    #[error("Server returned invalid response: {2}")]
    Response(StatusCode, Vec<u8>, String),
    /// Failed to parse a URL.
    #[error("Failed to parse URL")]
    UrlParse(#[source] url::ParseError),
}

/// The subset of [OpenID Connect Discovery](
/// https://openid.net/specs/openid-connect-discovery-1_0.html#ProviderMetadata) provider metadata
/// needed to check ID tokens.
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    issuer: String,
    token_endpoint: TokenUrl,
    jwks_uri: JsonWebKeySetUrl,
    #[serde(default)]
    end_session_endpoint: Option<EndSessionUrl>,
}
impl ProviderMetadata {
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn token_endpoint(&self) -> &TokenUrl {
        &self.token_endpoint
    }

    pub fn jwks_uri(&self) -> &JsonWebKeySetUrl {
        &self.jwks_uri
    }

    pub fn end_session_endpoint(&self) -> Option<&EndSessionUrl> {
        self.end_session_endpoint.as_ref()
    }
}

/// Provider endpoints and JSON Web Key Set, either supplied directly or fetched through
/// [`ProviderEndpoints::discover`].
///
/// The key set is fetched once, when the value is created, and is never refreshed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    issuer: String,
    token_endpoint: TokenUrl,
    jwks_text: String,
    end_session_endpoint: Option<EndSessionUrl>,
}
impl ProviderEndpoints {
    /// Creates endpoints from known values. `jwks_text` is the raw JSON Web Key Set document.
    pub fn new(issuer: String, token_endpoint: TokenUrl, jwks_text: String) -> Self {
        ProviderEndpoints {
            issuer,
            token_endpoint,
            jwks_text,
            end_session_endpoint: None,
        }
    }

    /// Sets the end session (logout) endpoint.
    pub fn set_end_session_endpoint(mut self, end_session_endpoint: Option<EndSessionUrl>) -> Self {
        self.end_session_endpoint = end_session_endpoint;
        self
    }

    /// Fetches the provider metadata document at `metadata_url`, followed by the JSON Web Key Set
    /// it references.
    pub fn discover<C>(
        metadata_url: &ProviderMetadataUrl,
        http_client: &C,
    ) -> Result<Self, DiscoveryError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        log::debug!("Fetching provider metadata from {}", metadata_url.as_str());
        let provider_metadata = http_client
            .call(get_request(metadata_url.url(), MIME_TYPE_JSON)?)
            .map_err(DiscoveryError::Request)
            .and_then(|http_response| {
                let body = check_response(metadata_url.url(), &http_response, &[MIME_TYPE_JSON])?;
                parse_json::<ProviderMetadata, _>(body)
            })?;

        log::debug!(
            "Fetching JSON Web Key Set from {}",
            provider_metadata.jwks_uri().as_str()
        );
        let jwks_text = http_client
            .call(get_request(provider_metadata.jwks_uri().url(), MIME_TYPE_JSON)?)
            .map_err(DiscoveryError::Request)
            .and_then(|http_response| {
                let body = check_response(
                    provider_metadata.jwks_uri().url(),
                    &http_response,
                    &[MIME_TYPE_JSON, MIME_TYPE_JWKS],
                )?;
                // The key set is kept as text, but must at least have the shape of a key set.
                parse_json::<JsonWebKeySet, _>(body)?;
                String::from_utf8(body.to_owned()).map_err(|_| {
                    DiscoveryError::Response(
                        http_response.status(),
                        body.to_owned(),
                        "JSON Web Key Set is not valid UTF-8".to_string(),
                    )
                })
            })?;

        Ok(Self::from_metadata(provider_metadata, jwks_text))
    }

    /// Creates endpoints from already-fetched provider metadata and key set text.
    pub fn from_metadata(provider_metadata: ProviderMetadata, jwks_text: String) -> Self {
        ProviderEndpoints {
            issuer: provider_metadata.issuer,
            token_endpoint: provider_metadata.token_endpoint,
            jwks_text,
            end_session_endpoint: provider_metadata.end_session_endpoint,
        }
    }
}
impl EndpointHandler for ProviderEndpoints {
    fn token_endpoint(&self) -> &str {
        self.token_endpoint.as_str()
    }

    fn jwks_uri_data(&self) -> &str {
        &self.jwks_text
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn end_session_endpoint(&self) -> Option<&str> {
        self.end_session_endpoint.as_ref().map(|url| url.as_str())
    }
}

fn get_request<RE>(url: &url::Url, accept: &'static str) -> Result<HttpRequest, DiscoveryError<RE>>
where
    RE: std::error::Error + 'static,
{
    http::Request::builder()
        .uri(url.to_string())
        .method(Method::GET)
        .header(ACCEPT, HeaderValue::from_static(accept))
        .body(Vec::new())
        .map_err(|err| DiscoveryError::Other(format!("failed to prepare request: {err}")))
}

// Returns the response body if the status is 200 and the content type is one of
// `content_types`.
fn check_response<'r, RE>(
    url: &url::Url,
    http_response: &'r HttpResponse,
    content_types: &[&str],
) -> Result<&'r [u8], DiscoveryError<RE>>
where
    RE: std::error::Error + 'static,
{
    if http_response.status() != StatusCode::OK {
        return Err(DiscoveryError::Response(
            http_response.status(),
            http_response.body().to_owned(),
            format!("HTTP status code {} at {}", http_response.status(), url),
        ));
    }

    let mut result = Ok(());
    for content_type in content_types {
        result = check_content_type(http_response.headers(), content_type);
        if result.is_ok() {
            break;
        }
    }
    result.map_err(|err_msg| {
        DiscoveryError::Response(
            http_response.status(),
            http_response.body().to_owned(),
            err_msg,
        )
    })?;

    Ok(http_response.body())
}

fn parse_json<T, RE>(body: &[u8]) -> Result<T, DiscoveryError<RE>>
where
    T: DeserializeOwned,
    RE: std::error::Error + 'static,
{
    serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
        .map_err(DiscoveryError::Parse)
}
