use serde::{Deserialize, Serialize};

new_type![
    /// ID of a JSON Web Key.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    #[serde(transparent)]
    JsonWebKeyId(String)
];
impl AsRef<str> for JsonWebKeyId {
    fn as_ref(&self) -> &str {
        self
    }
}

new_type![
    /// JSON Web Signature (JWS) algorithm name, as found in the `alg` header parameter.
    #[derive(Deserialize, Hash, Serialize)]
    #[serde(transparent)]
    JsonWebTokenAlgorithmName(String)
    impl {
        /// Returns true if this is `RS256` (RSASSA-PKCS1-v1_5 using SHA-256).
        ///
        /// NB: Section 4.1.1 of RFC 7515 states that the `alg` value is case-sensitive.
        pub fn is_rsa_sha_256(&self) -> bool {
            self.0 == "RS256"
        }
    }
];

new_url_type![
    /// URL of an OpenID Provider metadata (discovery) document.
    ProviderMetadataUrl
];

new_url_type![
    /// JSON Web Key Set URL.
    JsonWebKeySetUrl
];

new_url_type![
    /// URL for the [OpenID Connect RP-Initiated Logout 1.0](
    /// https://openid.net/specs/openid-connect-rpinitiated-1_0.html) end session endpoint.
    EndSessionUrl
];

new_url_type![
    /// URL to which the identity provider redirects the browser after logout.
    PostLogoutRedirectUrl
];
