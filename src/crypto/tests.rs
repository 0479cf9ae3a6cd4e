use crate::base64url;
use crate::crypto::{build_rsa_public_key, significant_bits, verify_rsa_sha256};
use crate::jwk::JsonWebKeyError;
use crate::jwt::tests::{sign_rs256, TEST_JWT, TEST_RSA_E, TEST_RSA_N};
use crate::jwt::CompactToken;

use rsa::traits::PublicKeyParts;

fn expect_invalid_key_material(e: &str, n: &str, expected: &str) {
    match build_rsa_public_key(e, n) {
        Err(JsonWebKeyError::InvalidKeyMaterial(msg)) => {
            assert!(msg.contains(expected), "unexpected message: {}", msg)
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_build_rsa_public_key() {
    let key = build_rsa_public_key(TEST_RSA_E, TEST_RSA_N).expect("failed to build key");
    assert_eq!(key.size(), 256);
    assert_eq!(key.e().to_bytes_be(), vec![0x01, 0x00, 0x01]);
    assert_eq!(key.n().to_bytes_be(), base64url::decode(TEST_RSA_N).unwrap());

    // Leading zero bytes don't change the integer.
    let mut padded = vec![0u8, 0u8];
    padded.extend(base64url::decode(TEST_RSA_N).unwrap());
    let padded_key = build_rsa_public_key(TEST_RSA_E, &base64url::encode(padded))
        .expect("failed to build key");
    assert_eq!(padded_key, key);
}

#[test]
fn test_build_rsa_public_key_invalid() {
    expect_invalid_key_material("AQ*B", TEST_RSA_N, "exponent `e` is not valid base64url");
    expect_invalid_key_material(TEST_RSA_E, "n4EP tAOC", "modulus `n` is not valid base64url");
    expect_invalid_key_material("AAAA", TEST_RSA_N, "exponent `e` is zero");
    expect_invalid_key_material("", TEST_RSA_N, "exponent `e` is zero");
    expect_invalid_key_material(TEST_RSA_E, "AAAAAA", "modulus `n` is zero");
    expect_invalid_key_material(
        TEST_RSA_E,
        &base64url::encode([0xffu8; 32]),
        "RSA modulus has 256 bits",
    );

    // Exponents the RSA primitive refuses.
    expect_invalid_key_material("AQ", TEST_RSA_N, "RSA key rejected");
    expect_invalid_key_material(
        &base64url::encode([0x01u8, 0, 0, 0, 0, 0x01]),
        TEST_RSA_N,
        "RSA key rejected",
    );
    // Modulus over 4096 bits.
    expect_invalid_key_material(TEST_RSA_E, &base64url::encode([0xffu8; 513]), "RSA key rejected");
}

#[test]
fn test_significant_bits() {
    assert_eq!(significant_bits(&[]), 0);
    assert_eq!(significant_bits(&[0, 0]), 0);
    assert_eq!(significant_bits(&[1]), 1);
    assert_eq!(significant_bits(&[0, 0x80]), 8);
    assert_eq!(significant_bits(&[0x01, 0x00, 0x01]), 17);
}

#[test]
fn test_verify_rfc7520_signature() {
    let key = build_rsa_public_key(TEST_RSA_E, TEST_RSA_N).expect("failed to build key");
    let compact = CompactToken::parse(TEST_JWT).expect("failed to parse token");
    let signature = compact.decode_signature().expect("failed to decode signature");

    assert!(verify_rsa_sha256(
        compact.signing_input().as_bytes(),
        &signature,
        &key
    ));
    // Deterministic.
    assert!(verify_rsa_sha256(
        compact.signing_input().as_bytes(),
        &signature,
        &key
    ));
}

#[test]
fn test_verify_rejects_mismatch() {
    let key = build_rsa_public_key(TEST_RSA_E, TEST_RSA_N).expect("failed to build key");
    let message = b"header.payload";
    let signature = sign_rs256(message);
    assert!(verify_rsa_sha256(message, &signature, &key));

    // Altered message.
    assert!(!verify_rsa_sha256(b"header.payloaD", &signature, &key));

    // Altered signature.
    let mut mutated = signature.clone();
    let last = mutated.len() - 1;
    mutated[last] ^= 0x01;
    assert!(!verify_rsa_sha256(message, &mutated, &key));

    // Wrong signature lengths.
    assert!(!verify_rsa_sha256(message, &signature[1..], &key));
    assert!(!verify_rsa_sha256(message, &[], &key));
    let mut extended = signature.clone();
    extended.push(0);
    assert!(!verify_rsa_sha256(message, &extended, &key));

    // Different key.
    let mut other_modulus = base64url::decode(TEST_RSA_N).unwrap();
    let last = other_modulus.len() - 1;
    other_modulus[last] ^= 0x02;
    let other_key = build_rsa_public_key(TEST_RSA_E, &base64url::encode(other_modulus))
        .expect("failed to build key");
    assert!(!verify_rsa_sha256(message, &signature, &other_key));
}
