//! Envelope encryption to the DON public key.
//!
//! Layout: `ephemeral public key (65, uncompressed SEC1) || nonce (12) || AES-256-GCM ciphertext`.
//! The AES key is SHA-256 of the secp256k1 ECDH shared secret.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::ExternalError;

const PUBLIC_KEY_LEN: usize = 65;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Parse a DON public key as returned by the coordinator.
///
/// Accepts 64-byte raw `x || y` coordinates or any SEC1 encoding.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, ExternalError> {
    let parsed = if bytes.len() == 64 {
        let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LEN);
        sec1.push(0x04);
        sec1.extend_from_slice(bytes);
        PublicKey::from_sec1_bytes(&sec1)
    } else {
        PublicKey::from_sec1_bytes(bytes)
    };
    parsed.map_err(|e| ExternalError::Encryption(format!("Invalid DON public key: {}", e)))
}

fn derive_key(shared_secret: &[u8]) -> Result<Aes256Gcm, ExternalError> {
    let key = Sha256::digest(shared_secret);
    Aes256Gcm::new_from_slice(&key).map_err(|e| ExternalError::Encryption(e.to_string()))
}

/// Encrypt `plaintext` so only the holder of `recipient`'s secret key can read it.
pub fn seal(recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, ExternalError> {
    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let shared = ephemeral.diffie_hellman(recipient);
    let cipher = derive_key(shared.raw_secret_bytes())?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| ExternalError::Encryption(e.to_string()))?;

    let mut envelope = ephemeral
        .public_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by [`seal`].
pub fn open(secret: &SecretKey, envelope: &[u8]) -> Result<Vec<u8>, ExternalError> {
    if envelope.len() < PUBLIC_KEY_LEN + NONCE_LEN + TAG_LEN {
        return Err(ExternalError::Encryption("Envelope too short".to_string()));
    }
    let (ephemeral, rest) = envelope.split_at(PUBLIC_KEY_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral = PublicKey::from_sec1_bytes(ephemeral)
        .map_err(|e| ExternalError::Encryption(format!("Invalid ephemeral key: {}", e)))?;
    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    let cipher = derive_key(shared.raw_secret_bytes())?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| ExternalError::Encryption(e.to_string()))
}
