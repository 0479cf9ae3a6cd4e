use crate::types::ProviderMetadataUrl;

use oauth2::{ClientId, ClientSecret, RedirectUrl, Scope};
use thiserror::Error;

const ENV_CLIENT_ID: &str = "AZ_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZ_CLIENT_SECRET";
const ENV_SCOPE: &str = "AZ_SCOPE";
const ENV_REDIRECT_URI: &str = "AZ_REDIRECT_URI";

/// Error loading client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting is missing or empty.
    #[error("Missing configuration value `{0}`")]
    Missing(&'static str),
    /// A URL setting could not be parsed.
    #[error("Invalid URL in configuration value `{0}`")]
    InvalidUrl(&'static str, #[source] url::ParseError),
}

/// Relying party credentials used when exchanging an authorization code for tokens.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    client_id: ClientId,
    client_secret: ClientSecret,
    scope: Option<Scope>,
    redirect_uri: Option<RedirectUrl>,
}
impl ClientConfig {
    pub fn new(client_id: ClientId, client_secret: ClientSecret) -> Self {
        ClientConfig {
            client_id,
            client_secret,
            scope: None,
            redirect_uri: None,
        }
    }

    /// Loads the configuration from the `AZ_CLIENT_ID`, `AZ_CLIENT_SECRET`, `AZ_SCOPE`, and
    /// `AZ_REDIRECT_URI` environment variables. The last two are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from the same settings as [`ClientConfig::from_env`], reading each
    /// value with `lookup`. Empty values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let client_id = read(ENV_CLIENT_ID).ok_or(ConfigError::Missing(ENV_CLIENT_ID))?;
        let client_secret =
            read(ENV_CLIENT_SECRET).ok_or(ConfigError::Missing(ENV_CLIENT_SECRET))?;

        let mut config = Self::new(ClientId::new(client_id), ClientSecret::new(client_secret));
        if let Some(scope) = read(ENV_SCOPE) {
            config = config.set_scope(Scope::new(scope));
        }
        if let Some(redirect_uri) = read(ENV_REDIRECT_URI) {
            config = config.set_redirect_uri(
                RedirectUrl::new(redirect_uri)
                    .map_err(|err| ConfigError::InvalidUrl(ENV_REDIRECT_URI, err))?,
            );
        }
        Ok(config)
    }

    /// Sets the scope requested when exchanging an authorization code.
    pub fn set_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the redirect URI sent when exchanging an authorization code. It must match the one
    /// used in the authorization request.
    pub fn set_redirect_uri(mut self, redirect_uri: RedirectUrl) -> Self {
        self.redirect_uri = Some(redirect_uri);
        self
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn redirect_uri(&self) -> Option<&RedirectUrl> {
        self.redirect_uri.as_ref()
    }
}

/// Returns the OpenID Provider metadata URL of an Azure AD B2C user flow (`policy`) in `tenant`.
///
/// `tenant` is the short tenant name, without the `.onmicrosoft.com` suffix.
pub fn b2c_metadata_url(tenant: &str, policy: &str) -> Result<ProviderMetadataUrl, ConfigError> {
    ProviderMetadataUrl::new(format!(
        "https://{tenant}.b2clogin.com/{tenant}.onmicrosoft.com/{policy}\
         /v2.0/.well-known/openid-configuration"
    ))
    .map_err(|err| ConfigError::InvalidUrl("tenant", err))
}
