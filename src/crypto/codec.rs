//! RSA-OAEP file codec
//!
//! Encoded layout:
//! - `MAGIC` (4 bytes, `RSAF`)
//! - `FORMAT_VERSION` (1 byte, ASCII `1`)
//! - standard padded base64 of the raw OAEP ciphertext
//!
//! The whole encoded form is ASCII, so it survives text-mode tooling.

use crate::crypto::{PrivateKeyHandle, PublicKeyHandle, FORMAT_VERSION, HEADER_LEN, MAGIC};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Options controlling how encoded payloads are accepted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecOptions {
    /// Accept bare base64 ciphertext with no header (files written by
    /// earlier versions of the tool)
    #[serde(default)]
    pub accept_headerless: bool,
}

fn oaep() -> Oaep {
    // Oaep::new uses the same digest for the label hash and MGF1
    Oaep::new::<Sha256>()
}

/// Encrypt `plaintext` with the public key and wrap it in the on-disk format
pub fn encode(plaintext: &[u8], key: &PublicKeyHandle) -> Result<Vec<u8>> {
    let limit = key.capacity();
    if plaintext.len() > limit {
        return Err(Error::PayloadTooLarge {
            size: plaintext.len(),
            limit,
        });
    }

    let ciphertext = key
        .rsa()
        .encrypt(&mut rand::thread_rng(), oaep(), plaintext)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len().div_ceil(3) * 4);
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(STANDARD.encode(&ciphertext).as_bytes());
    Ok(out)
}

/// Decrypt an encoded payload with the private key
pub fn decode(encoded: &[u8], key: &PrivateKeyHandle) -> Result<Zeroizing<Vec<u8>>> {
    decode_with(encoded, key, &CodecOptions::default())
}

/// Decrypt an encoded payload, honouring `options`
pub fn decode_with(
    encoded: &[u8],
    key: &PrivateKeyHandle,
    options: &CodecOptions,
) -> Result<Zeroizing<Vec<u8>>> {
    let body = if has_header(encoded) {
        let version = encoded[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        &encoded[HEADER_LEN..]
    } else if options.accept_headerless {
        encoded
    } else {
        return Err(Error::NotEncrypted);
    };

    let ciphertext = STANDARD
        .decode(body.trim_ascii_end())
        .map_err(|e| Error::Decode(e.to_string()))?;

    let plaintext = key
        .rsa()
        .decrypt_blinded(&mut rand::thread_rng(), oaep(), &ciphertext)
        .map_err(|_| Error::CipherMismatch)?;

    Ok(Zeroizing::new(plaintext))
}

fn has_header(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_LEN && bytes.starts_with(MAGIC)
}

/// Whether `bytes` are exactly in the current encrypted format for a key
/// with `modulus_bytes`: header, current version, and base64 of one
/// full-width ciphertext block
pub fn is_encoded(bytes: &[u8], modulus_bytes: usize) -> bool {
    if !has_header(bytes) || bytes[MAGIC.len()] != FORMAT_VERSION {
        return false;
    }

    let body = bytes[HEADER_LEN..].trim_ascii_end();
    if body.len() != modulus_bytes.div_ceil(3) * 4 {
        return false;
    }

    STANDARD
        .decode(body)
        .is_ok_and(|raw| raw.len() == modulus_bytes)
}
