//! URL-safe base64 without padding, as used by every JOSE serialization
//! ([RFC 7515 Section 2](https://www.rfc-editor.org/rfc/rfc7515#section-2)).

use base64::prelude::{BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD};
use base64::Engine;
use thiserror::Error;

/// Input was not valid base64url.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Malformed base64url encoding")]
pub struct MalformedEncoding(#[source] pub base64::DecodeError);

/// Decodes a base64url string, with or without trailing `=` padding.
///
/// The URL-safe alphabet is mapped onto the standard one (`-` to `+`, `_` to `/`) and the input
/// is padded to a multiple of four characters before decoding with the standard engine, which
/// rejects any character outside the alphabet as well as non-canonical trailing bits. An empty
/// string decodes to an empty byte vector.
pub fn decode(input: &str) -> Result<Vec<u8>, MalformedEncoding> {
    let mut standard = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect::<String>();
    let remainder = standard.len() % 4;
    if remainder > 0 {
        standard.extend(std::iter::repeat('=').take(4 - remainder));
    }

    BASE64_STANDARD.decode(standard).map_err(MalformedEncoding)
}

/// Encodes bytes as unpadded base64url.
pub fn encode<T>(input: T) -> String
where
    T: AsRef<[u8]>,
{
    BASE64_URL_SAFE_NO_PAD.encode(input)
}
