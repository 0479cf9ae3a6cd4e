use crate::base64url;
use crate::jwk::JsonWebKeyError;

use rsa::{BigUint, Pkcs1v15Sign, RsaPublicKey};
use sha2::Digest;

#[cfg(test)]
mod tests;

const MIN_RSA_MODULUS_BITS: usize = 512;

/// Reconstructs an RSA public key from the base64url-encoded, big-endian public exponent (`e`)
/// and modulus (`n`) of a JSON Web Key.
pub fn build_rsa_public_key(e: &str, n: &str) -> Result<RsaPublicKey, JsonWebKeyError> {
    let e = decode_unsigned(e, "exponent `e`")?;
    let n = decode_unsigned(n, "modulus `n`")?;

    let modulus_bits = significant_bits(&n);
    if modulus_bits < MIN_RSA_MODULUS_BITS {
        return Err(JsonWebKeyError::InvalidKeyMaterial(format!(
            "RSA modulus has {} bits (expected at least {})",
            modulus_bits, MIN_RSA_MODULUS_BITS
        )));
    }

    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|err| JsonWebKeyError::InvalidKeyMaterial(format!("RSA key rejected: {}", err)))
}

fn decode_unsigned(value: &str, name: &str) -> Result<Vec<u8>, JsonWebKeyError> {
    let bytes = base64url::decode(value).map_err(|_| {
        JsonWebKeyError::InvalidKeyMaterial(format!("RSA {} is not valid base64url", name))
    })?;
    if bytes.iter().all(|byte| *byte == 0) {
        return Err(JsonWebKeyError::InvalidKeyMaterial(format!(
            "RSA {} is zero",
            name
        )));
    }
    Ok(bytes)
}

// Number of bits in a big-endian unsigned integer, ignoring leading zeros.
fn significant_bits(bytes: &[u8]) -> usize {
    match bytes.iter().position(|byte| *byte != 0) {
        Some(first) => (bytes.len() - first) * 8 - bytes[first].leading_zeros() as usize,
        None => 0,
    }
}

/// Verifies an RSASSA-PKCS1-v1_5 signature using SHA-256 (`RS256`) over `signing_input`.
///
/// Any mismatch, including a signature of the wrong length, yields `false`.
pub fn verify_rsa_sha256(signing_input: &[u8], signature: &[u8], key: &RsaPublicKey) -> bool {
    let hash = sha2::Sha256::digest(signing_input);
    match key.verify(Pkcs1v15Sign::new::<sha2::Sha256>(), &hash, signature) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("RSA signature verification failed: {}", err);
            false
        }
    }
}
