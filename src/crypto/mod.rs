//! Cryptography module for pemcrypt
//!
//! Provides RSA-OAEP (SHA-256) encryption of whole files, stored on disk
//! as a short format header followed by base64 ciphertext.

mod codec;
mod keys;

pub use codec::{decode, decode_with, encode, is_encoded, CodecOptions};
pub use keys::{PrivateKeyHandle, PublicKeyHandle};

#[cfg(test)]
pub(crate) use keys::test_keys;

/// Output size of the OAEP hash and MGF1 digest (SHA-256)
pub const OAEP_HASH_LEN: usize = 32;

/// Magic tag that starts every encrypted file
pub const MAGIC: &[u8; 4] = b"RSAF";

/// Current on-disk format version
pub const FORMAT_VERSION: u8 = b'1';

/// Length of the header (magic + version byte)
pub const HEADER_LEN: usize = MAGIC.len() + 1;
