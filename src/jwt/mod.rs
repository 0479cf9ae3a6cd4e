use crate::base64url::{self, MalformedEncoding};
use crate::claims::TokenPayload;
use crate::{JsonWebKeyId, JsonWebTokenAlgorithmName};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt::{Display, Formatter, Result as FormatterResult};
use std::str::FromStr;


/// Error parsing a compact JSON Web Token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonWebTokenError {
    /// The token is not three dot-separated segments, or its signature segment is not valid
    /// base64url.
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    /// The JOSE header is not valid base64url-encoded JSON, or lacks a key ID.
    #[error("Malformed token header")]
    MalformedHeader(#[source] SegmentError),
    /// The payload is not a valid base64url-encoded JSON object.
    #[error("Malformed token payload")]
    MalformedPayload(#[source] SegmentError),
}

/// Error decoding a JSON segment of a compact JSON Web Token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SegmentError {
    /// The segment is not valid base64url.
    #[error("Invalid base64url encoding")]
    Encoding(#[source] MalformedEncoding),
    /// The segment does not contain the expected JSON structure.
    #[error("Failed to parse JSON")]
    Json(#[source] serde_json::Error),
}

/// JOSE header of a signed JSON Web Token.
///
/// Only the fields needed for verification are read; any other header parameters are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct JsonWebTokenHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<JsonWebTokenAlgorithmName>,
    pub kid: JsonWebKeyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// The three segments of a compact JSON Web Token, exactly as received.
///
/// The segments are kept verbatim because the signing input must be recomputed from the bytes
/// the issuer signed, never from a re-encoding of the decoded header and payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactToken {
    header_segment: String,
    payload_segment: String,
    signature_segment: String,
}
impl CompactToken {
    /// Splits a compact token into its header, payload, and signature segments.
    pub fn parse(token: &str) -> Result<Self, JsonWebTokenError> {
        let parts = token.split('.').collect::<Vec<_>>();

        // NB: We avoid including the token itself in the error output to avoid clients
        // potentially logging sensitive values.
        if parts.len() != 3 {
            return Err(JsonWebTokenError::MalformedToken(format!(
                "found {} parts (expected 3)",
                parts.len()
            )));
        }
        log::trace!(
            "Split token into segments of {}, {}, and {} bytes",
            parts[0].len(),
            parts[1].len(),
            parts[2].len()
        );

        Ok(CompactToken {
            header_segment: parts[0].to_string(),
            payload_segment: parts[1].to_string(),
            signature_segment: parts[2].to_string(),
        })
    }

    /// Decodes the JOSE header.
    pub fn decode_header(&self) -> Result<JsonWebTokenHeader, JsonWebTokenError> {
        decode_json_segment(&self.header_segment).map_err(JsonWebTokenError::MalformedHeader)
    }

    /// Decodes the claims payload.
    pub fn decode_payload(&self) -> Result<TokenPayload, JsonWebTokenError> {
        decode_json_segment(&self.payload_segment).map_err(JsonWebTokenError::MalformedPayload)
    }

    /// Decodes the signature bytes.
    pub fn decode_signature(&self) -> Result<Vec<u8>, JsonWebTokenError> {
        base64url::decode(&self.signature_segment).map_err(|_| {
            JsonWebTokenError::MalformedToken("invalid base64url signature encoding".to_string())
        })
    }

    /// Returns the JWS signing input (`header_segment.payload_segment`).
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header_segment, self.payload_segment)
    }

    /// Returns the raw, still-encoded header segment.
    pub fn header_segment(&self) -> &str {
        &self.header_segment
    }

    /// Returns the raw, still-encoded payload segment.
    pub fn payload_segment(&self) -> &str {
        &self.payload_segment
    }

    /// Returns the raw, still-encoded signature segment.
    pub fn signature_segment(&self) -> &str {
        &self.signature_segment
    }
}
impl Display for CompactToken {
    fn fmt(&self, f: &mut Formatter) -> FormatterResult {
        write!(
            f,
            "{}.{}.{}",
            self.header_segment, self.payload_segment, self.signature_segment
        )
    }
}

fn decode_json_segment<T>(segment: &str) -> Result<T, SegmentError>
where
    T: DeserializeOwned,
{
    let raw = base64url::decode(segment).map_err(SegmentError::Encoding)?;
    serde_json::from_slice(&raw).map_err(SegmentError::Json)
}

/// A fully decoded JSON Web Token whose signature has not yet been verified.
///
/// Every segment is decoded exactly once, when the token is parsed. The value is immutable
/// afterwards and is passed explicitly to each check.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonWebToken {
    compact: CompactToken,
    header: JsonWebTokenHeader,
    payload: TokenPayload,
    signature: Vec<u8>,
    signing_input: String,
}
impl JsonWebToken {
    /// Decodes the header, payload, and signature of a compact token.
    pub fn decode(compact: CompactToken) -> Result<Self, JsonWebTokenError> {
        let header = compact.decode_header()?;
        let payload = compact.decode_payload()?;
        let signature = compact.decode_signature()?;
        let signing_input = compact.signing_input();

        Ok(JsonWebToken {
            compact,
            header,
            payload,
            signature,
            signing_input,
        })
    }

    /// Returns the JOSE header. It has not been verified and must not be trusted on its own.
    pub fn unverified_header(&self) -> &JsonWebTokenHeader {
        &self.header
    }

    /// Returns the claims payload without any verification.
    pub fn unverified_payload(&self) -> &TokenPayload {
        &self.payload
    }

    /// Returns the decoded signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the signing input covered by the signature.
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// Returns the token segments as received.
    pub fn compact(&self) -> &CompactToken {
        &self.compact
    }
}
impl FromStr for JsonWebToken {
    type Err = JsonWebTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompactToken::parse(s).and_then(JsonWebToken::decode)
    }
}
impl Display for JsonWebToken {
    fn fmt(&self, f: &mut Formatter) -> FormatterResult {
        Display::fmt(&self.compact, f)
    }
}
