use crate::config::ClientConfig;
use crate::endpoint::EndpointHandler;
use crate::http_utils::{check_content_type, MIME_TYPE_FORM_URLENCODED, MIME_TYPE_JSON};
use crate::{AuthorizationCode, HttpRequest, HttpResponse, SyncHttpClient, TokenUrl};

use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::method::Method;
use http::status::StatusCode;
use oauth2::basic::BasicErrorResponse;
use serde::Deserialize;
use thiserror::Error;

use std::error::Error;


/// Exchanges an authorization code for a compact ID token.
///
/// Any `Fn(&AuthorizationCode) -> Result<String, E>` closure implements this trait.
pub trait CodeExchange {
    /// Error returned when no ID token could be obtained.
    type Error: Error + Send + Sync + 'static;

    /// Returns the compact ID token issued in exchange for `code`.
    fn exchange_code(&self, code: &AuthorizationCode) -> Result<String, Self::Error>;
}
impl<E, F> CodeExchange for F
where
    E: Error + Send + Sync + 'static,
    F: Fn(&AuthorizationCode) -> Result<String, E>,
{
    type Error = E;

    fn exchange_code(&self, code: &AuthorizationCode) -> Result<String, Self::Error> {
        self(code)
    }
}

/// Error exchanging an authorization code at the token endpoint.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodeExchangeError<RE>
where
    RE: Error + 'static,
{
    /// The token response did not include an ID token.
    #[error("Token response does not contain an ID token")]
    MissingIdToken,
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
    /// Server returned an OAuth2 error response.
    #[error("Server returned error response: {0}")]
    ServerResponse(BasicErrorResponse),
}

#[derive(Deserialize)]
struct IdTokenResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Exchanges authorization codes with a form-encoded `POST` to the token endpoint, sending the
/// client credentials in the request body.
pub struct HttpCodeExchange<'c, C>
where
    C: SyncHttpClient,
{
    token_url: TokenUrl,
    config: ClientConfig,
    http_client: &'c C,
}
impl<'c, C> HttpCodeExchange<'c, C>
where
    C: SyncHttpClient,
{
    pub fn new(token_url: TokenUrl, config: ClientConfig, http_client: &'c C) -> Self {
        HttpCodeExchange {
            token_url,
            config,
            http_client,
        }
    }

    /// Uses the token endpoint reported by `endpoints`.
    pub fn from_endpoints<E>(
        endpoints: &E,
        config: ClientConfig,
        http_client: &'c C,
    ) -> Result<Self, url::ParseError>
    where
        E: EndpointHandler + ?Sized,
    {
        Ok(Self::new(
            TokenUrl::new(endpoints.token_endpoint().to_string())?,
            config,
            http_client,
        ))
    }

    fn prepare_request(
        &self,
        code: &AuthorizationCode,
    ) -> Result<HttpRequest, CodeExchangeError<C::Error>> {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("client_id", self.config.client_id().as_str())
            .append_pair("client_secret", self.config.client_secret().secret())
            .append_pair("code", code.secret());
        if let Some(scope) = self.config.scope() {
            form.append_pair("scope", scope.as_str());
        }
        if let Some(redirect_uri) = self.config.redirect_uri() {
            form.append_pair("redirect_uri", redirect_uri.as_str());
        }
        form.append_pair("grant_type", "authorization_code");

        http::Request::builder()
            .uri(self.token_url.url().to_string())
            .method(Method::POST)
            .header(ACCEPT, HeaderValue::from_static(MIME_TYPE_JSON))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static(MIME_TYPE_FORM_URLENCODED),
            )
            .body(form.finish().into_bytes())
            .map_err(|err| CodeExchangeError::Other(format!("failed to prepare request: {err}")))
    }

    fn token_response(
        http_response: HttpResponse,
    ) -> Result<String, CodeExchangeError<C::Error>> {
        let status = http_response.status();
        if status != StatusCode::OK {
            // Token endpoints report failures such as an expired code as an OAuth2 error
            // response (RFC 6749 Section 5.2).
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                if let Ok(error_response) =
                    serde_json::from_slice::<BasicErrorResponse>(http_response.body())
                {
                    return Err(CodeExchangeError::ServerResponse(error_response));
                }
            }
            return Err(CodeExchangeError::Response(
                status,
                http_response.body().to_owned(),
                format!("HTTP status code {}", status),
            ));
        }

        check_content_type(http_response.headers(), MIME_TYPE_JSON).map_err(|err_msg| {
            CodeExchangeError::Response(status, http_response.body().to_owned(), err_msg)
        })?;

        let token_response: IdTokenResponse = serde_path_to_error::deserialize(
            &mut serde_json::Deserializer::from_slice(http_response.body()),
        )
        .map_err(CodeExchangeError::Parse)?;

        token_response
            .id_token
            .filter(|id_token| !id_token.is_empty())
            .ok_or(CodeExchangeError::MissingIdToken)
    }
}
impl<'c, C> CodeExchange for HttpCodeExchange<'c, C>
where
    C: SyncHttpClient,
    C::Error: Send + Sync,
{
    type Error = CodeExchangeError<C::Error>;

    fn exchange_code(&self, code: &AuthorizationCode) -> Result<String, Self::Error> {
        log::debug!(
            "Exchanging authorization code at {}",
            self.token_url.as_str()
        );
        self.http_client
            .call(self.prepare_request(code)?)
            .map_err(CodeExchangeError::Request)
            .and_then(Self::token_response)
    }
}
