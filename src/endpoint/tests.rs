use crate::endpoint::{DiscoveryError, EndpointHandler, ProviderEndpoints, ProviderMetadata};
use crate::jwt::tests::test_jwks;
use crate::types::{EndSessionUrl, ProviderMetadataUrl};
use crate::{HttpRequest, HttpResponse, TokenUrl};

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use thiserror::Error;

use std::cell::RefCell;

pub const METADATA_URL: &str = concat!(
    "https://tenant.b2clogin.com/tenant.onmicrosoft.com/b2c_1_signin",
    "/v2.0/.well-known/openid-configuration"
);
pub const ISSUER: &str = "https://tenant.b2clogin.com/00000000-0000-0000-0000-000000000000/v2.0/";
pub const TOKEN_URL: &str =
    "https://tenant.b2clogin.com/tenant.onmicrosoft.com/b2c_1_signin/oauth2/v2.0/token";
pub const JWKS_URL: &str =
    "https://tenant.b2clogin.com/tenant.onmicrosoft.com/b2c_1_signin/discovery/v2.0/keys";
pub const END_SESSION_URL: &str =
    "https://tenant.b2clogin.com/tenant.onmicrosoft.com/b2c_1_signin/oauth2/v2.0/logout";

#[derive(Debug, Error)]
#[error("fake HTTP error")]
pub struct FakeError;

pub fn response(status: StatusCode, content_type: &str, body: &str) -> HttpResponse {
    http::Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(body.as_bytes().to_vec())
        .expect("failed to build response")
}

pub fn metadata_json() -> String {
    serde_json::json!({
        "issuer": ISSUER,
        "authorization_endpoint":
            "https://tenant.b2clogin.com/tenant.onmicrosoft.com/b2c_1_signin/oauth2/v2.0/authorize",
        "token_endpoint": TOKEN_URL,
        "end_session_endpoint": END_SESSION_URL,
        "jwks_uri": JWKS_URL,
        "response_modes_supported": ["query", "fragment", "form_post"],
        "id_token_signing_alg_values_supported": ["RS256"],
    })
    .to_string()
}

fn metadata_url() -> ProviderMetadataUrl {
    ProviderMetadataUrl::new(METADATA_URL.to_string()).expect("failed to parse URL")
}

fn discover_with<F>(respond: F) -> Result<ProviderEndpoints, DiscoveryError<FakeError>>
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, FakeError>,
{
    ProviderEndpoints::discover(&metadata_url(), &|request: HttpRequest| respond(&request))
}

#[test]
fn test_discover() {
    let requests = RefCell::new(Vec::new());
    let endpoints = discover_with(|request| {
        requests.borrow_mut().push((
            request.method().clone(),
            request.uri().to_string(),
            request.headers().get(ACCEPT).cloned(),
        ));
        match request.uri().to_string().as_str() {
            METADATA_URL => Ok(response(StatusCode::OK, "application/json", &metadata_json())),
            JWKS_URL => Ok(response(
                StatusCode::OK,
                "application/jwk-set+json; charset=utf-8",
                &test_jwks("k1"),
            )),
            _ => Err(FakeError),
        }
    })
    .expect("discovery should succeed");

    assert_eq!(endpoints.issuer(), ISSUER);
    assert_eq!(endpoints.token_endpoint(), TOKEN_URL);
    assert_eq!(endpoints.jwks_uri_data(), test_jwks("k1"));
    assert_eq!(endpoints.end_session_endpoint(), Some(END_SESSION_URL));

    let requests = requests.into_inner();
    assert_eq!(requests.len(), 2);
    for (i, url) in [METADATA_URL, JWKS_URL].iter().enumerate() {
        assert_eq!(requests[i].0, Method::GET);
        assert_eq!(requests[i].1, *url);
        assert_eq!(
            requests[i].2.as_ref().map(|value| value.to_str().unwrap()),
            Some("application/json")
        );
    }
}

#[test]
fn test_discover_without_end_session_endpoint() {
    let mut metadata: serde_json::Value = serde_json::from_str(&metadata_json()).unwrap();
    metadata.as_object_mut().unwrap().remove("end_session_endpoint");

    let endpoints = discover_with(|request| match request.uri().to_string().as_str() {
        METADATA_URL => Ok(response(
            StatusCode::OK,
            "application/json",
            &metadata.to_string(),
        )),
        _ => Ok(response(StatusCode::OK, "application/json", &test_jwks("k1"))),
    })
    .expect("discovery should succeed");

    assert_eq!(endpoints.end_session_endpoint(), None);
}

#[test]
fn test_discover_request_error() {
    match discover_with(|_| Err(FakeError)) {
        Err(DiscoveryError::Request(FakeError)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_discover_bad_status() {
    match discover_with(|_| Ok(response(StatusCode::NOT_FOUND, "text/html", "not found"))) {
        Err(DiscoveryError::Response(status, body, msg)) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, b"not found".to_vec());
            assert!(msg.contains(METADATA_URL));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    match discover_with(|request| match request.uri().to_string().as_str() {
        METADATA_URL => Ok(response(StatusCode::OK, "application/json", &metadata_json())),
        _ => Ok(response(StatusCode::INTERNAL_SERVER_ERROR, "application/json", "{}")),
    }) {
        Err(DiscoveryError::Response(status, _, msg)) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(msg.contains(JWKS_URL));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_discover_bad_content_type() {
    match discover_with(|_| Ok(response(StatusCode::OK, "text/html", &metadata_json()))) {
        Err(DiscoveryError::Response(status, _, msg)) => {
            assert_eq!(status, StatusCode::OK);
            assert!(msg.contains("Unexpected response Content-Type"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_discover_parse_errors() {
    match discover_with(|_| {
        Ok(response(
            StatusCode::OK,
            "application/json",
            r#"{"issuer": "https://issuer.example/", "token_endpoint": "not a url"}"#,
        ))
    }) {
        Err(DiscoveryError::Parse(err)) => assert_eq!(err.path().to_string(), "token_endpoint"),
        other => panic!("unexpected result: {:?}", other),
    }

    match discover_with(|request| match request.uri().to_string().as_str() {
        METADATA_URL => Ok(response(StatusCode::OK, "application/json", &metadata_json())),
        _ => Ok(response(StatusCode::OK, "application/json", r#"["k1"]"#)),
    }) {
        Err(DiscoveryError::Parse(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_metadata_deserialization() {
    let metadata: ProviderMetadata =
        serde_json::from_str(&metadata_json()).expect("failed to deserialize");
    assert_eq!(metadata.issuer(), ISSUER);
    assert_eq!(metadata.token_endpoint().as_str(), TOKEN_URL);
    assert_eq!(metadata.jwks_uri().as_str(), JWKS_URL);
    assert_eq!(
        metadata.end_session_endpoint().map(|url| url.as_str()),
        Some(END_SESSION_URL)
    );

    let endpoints = ProviderEndpoints::from_metadata(metadata, test_jwks("k1"));
    assert_eq!(endpoints.token_endpoint(), TOKEN_URL);
}

#[test]
fn test_new() {
    let endpoints = ProviderEndpoints::new(
        ISSUER.to_string(),
        TokenUrl::new(TOKEN_URL.to_string()).unwrap(),
        test_jwks("k1"),
    );
    assert_eq!(endpoints.end_session_endpoint(), None);

    let endpoints = endpoints.set_end_session_endpoint(Some(
        EndSessionUrl::new(END_SESSION_URL.to_string()).unwrap(),
    ));
    assert_eq!(endpoints.issuer(), ISSUER);
    assert_eq!(endpoints.end_session_endpoint(), Some(END_SESSION_URL));
}
