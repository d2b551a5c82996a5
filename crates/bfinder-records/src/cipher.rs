//! Per-cell AES-256-GCM encryption using the `ring` crate.
//!
//! Every cell of the dataset is sealed independently under one 256-bit key
//! with a randomly generated 96-bit nonce.  The wire form of a cell is a
//! text-safe token:
//!
//! ```text
//! base64( nonce[12] || ciphertext || gcm-tag[16] )
//! ```
//!
//! so ciphertexts can live in an ordinary CSV file.  Decryption is
//! authenticated: a wrong key, a flipped bit, or a truncated token fails
//! loudly instead of yielding garbage text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::aead::{self, Aad, BoundKey, NONCE_LEN, Nonce, NonceSequence, SealingKey, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{RecordsError, Result};

/// Length of the AES-256-GCM key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN_BYTES: usize = NONCE_LEN;

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM algorithm from `ring`.
static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

// ---------------------------------------------------------------------------
// Nonce handling
// ---------------------------------------------------------------------------

/// A single-use nonce sequence that yields exactly one nonce and then errors.
///
/// `ring` requires a [`NonceSequence`] for sealing and opening operations.
/// Since every cell operation uses a fresh key binding, this wrapper ensures
/// each bound key is used exactly once.
struct SingleNonce(Option<[u8; NONCE_LEN_BYTES]>);

impl SingleNonce {
    fn new(bytes: [u8; NONCE_LEN_BYTES]) -> Self {
        Self(Some(bytes))
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

// ---------------------------------------------------------------------------
// Cell cipher
// ---------------------------------------------------------------------------

/// Symmetric cipher that seals and opens individual dataset cells.
///
/// Cheap to clone key material is deliberately not exposed; the cipher owns
/// its key bytes for the lifetime of the record store.
pub struct CellCipher {
    key: Vec<u8>,
}

impl CellCipher {
    /// Create a cipher from a 256-bit key.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::InvalidKey`] if the key is not exactly
    /// [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(RecordsError::InvalidKey {
                reason: format!("key must be {} bytes, got {}", KEY_LEN, key.len()),
            });
        }
        Ok(Self { key: key.to_vec() })
    }

    /// Encrypt one plaintext cell into a base64 token.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Encryption`] if nonce generation or sealing
    /// fails.
    pub fn encrypt_cell(&self, plaintext: &str) -> Result<String> {
        let rng = SystemRandom::new();

        let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| RecordsError::Encryption {
                reason: "failed to generate random nonce".into(),
            })?;

        let unbound_key =
            UnboundKey::new(AEAD_ALG, &self.key).map_err(|_| RecordsError::Encryption {
                reason: "failed to create AES-256-GCM key".into(),
            })?;
        let mut sealing_key = SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        // `ring` encrypts in-place and appends the authentication tag.
        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| RecordsError::Encryption {
                reason: "seal_in_place failed".into(),
            })?;

        let mut token = Vec::with_capacity(NONCE_LEN_BYTES + in_out.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&in_out);

        Ok(BASE64.encode(token))
    }

    /// Decrypt one base64 token back into the plaintext cell.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Decryption`] if the token is not valid base64,
    /// is too short to contain a nonce and tag, fails GCM authentication
    /// (wrong key or tampered data), or does not decode to UTF-8.
    pub fn decrypt_cell(&self, token: &str) -> Result<String> {
        let raw = BASE64
            .decode(token.trim())
            .map_err(|e| RecordsError::Decryption {
                reason: format!("cell is not valid base64: {e}"),
            })?;

        if raw.len() < NONCE_LEN_BYTES + TAG_LEN {
            return Err(RecordsError::Decryption {
                reason: format!("cell token too short: {} bytes", raw.len()),
            });
        }

        let mut nonce_bytes = [0u8; NONCE_LEN_BYTES];
        nonce_bytes.copy_from_slice(&raw[..NONCE_LEN_BYTES]);

        let unbound_key =
            UnboundKey::new(AEAD_ALG, &self.key).map_err(|_| RecordsError::Decryption {
                reason: "failed to create AES-256-GCM key".into(),
            })?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = raw[NONCE_LEN_BYTES..].to_vec();
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| RecordsError::Decryption {
                reason: "authentication failed: wrong key or corrupted data".into(),
            })?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| RecordsError::Decryption {
            reason: "decrypted cell is not valid UTF-8".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

/// Generate a fresh random 256-bit key.
///
/// # Errors
///
/// Returns [`RecordsError::Internal`] if the system CSPRNG fails.
pub fn generate_key() -> Result<[u8; KEY_LEN]> {
    let rng = SystemRandom::new();
    let mut key = [0u8; KEY_LEN];
    rng.fill(&mut key)
        .map_err(|_| RecordsError::Internal("failed to generate random key".into()))?;
    Ok(key)
}

/// Encode a key as base64 for storage in configuration.
pub fn encode_key(key: &[u8; KEY_LEN]) -> String {
    BASE64.encode(key)
}

/// Decode a base64-encoded key from configuration.
///
/// # Errors
///
/// Returns [`RecordsError::InvalidKey`] on bad base64 or wrong length.
pub fn decode_key(encoded: &str) -> Result<[u8; KEY_LEN]> {
    let raw = BASE64
        .decode(encoded.trim())
        .map_err(|e| RecordsError::InvalidKey {
            reason: format!("key is not valid base64: {e}"),
        })?;

    let mut key = [0u8; KEY_LEN];
    if raw.len() != KEY_LEN {
        return Err(RecordsError::InvalidKey {
            reason: format!("key must be {} bytes, got {}", KEY_LEN, raw.len()),
        });
    }
    key.copy_from_slice(&raw);
    Ok(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> CellCipher {
        CellCipher::new(&generate_key().unwrap()).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = test_cipher();
        let token = cipher.encrypt_cell("Ananya Sharma").unwrap();
        assert_eq!(cipher.decrypt_cell(&token).unwrap(), "Ananya Sharma");
    }

    #[test]
    fn tokens_are_text_safe() {
        let cipher = test_cipher();
        let token = cipher.encrypt_cell("2001-05-14 00:00:00").unwrap();
        assert!(!token.contains(','));
        assert!(!token.contains('"'));
        assert!(!token.contains('\n'));
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let cipher1 = test_cipher();
        let cipher2 = test_cipher();

        let token = cipher1.encrypt_cell("secret").unwrap();
        let result = cipher2.decrypt_cell(&token);
        assert!(matches!(result, Err(RecordsError::Decryption { .. })));
    }

    #[test]
    fn decrypt_tampered_token_fails() {
        let cipher = test_cipher();
        let token = cipher.encrypt_cell("secret").unwrap();

        let mut raw = BASE64.decode(&token).unwrap();
        *raw.last_mut().unwrap() ^= 0x01;
        let tampered = BASE64.encode(raw);

        let result = cipher.decrypt_cell(&tampered);
        assert!(matches!(result, Err(RecordsError::Decryption { .. })));
    }

    #[test]
    fn decrypt_truncated_token_fails() {
        let cipher = test_cipher();
        let token = cipher.encrypt_cell("secret").unwrap();

        let raw = BASE64.decode(&token).unwrap();
        let truncated = BASE64.encode(&raw[..NONCE_LEN_BYTES + 4]);

        let result = cipher.decrypt_cell(&truncated);
        assert!(matches!(result, Err(RecordsError::Decryption { .. })));
    }

    #[test]
    fn decrypt_garbage_fails() {
        let cipher = test_cipher();
        assert!(cipher.decrypt_cell("not base64 at all!!!").is_err());
        assert!(cipher.decrypt_cell("").is_err());
    }

    #[test]
    fn invalid_key_length_rejected() {
        let result = CellCipher::new(&[0u8; 16]);
        assert!(matches!(result, Err(RecordsError::InvalidKey { .. })));
    }

    #[test]
    fn key_encode_decode_roundtrip() {
        let key = generate_key().unwrap();
        let encoded = encode_key(&key);
        assert_eq!(decode_key(&encoded).unwrap(), key);
    }

    #[test]
    fn empty_cell_roundtrip() {
        let cipher = test_cipher();
        let token = cipher.encrypt_cell("").unwrap();
        assert_eq!(cipher.decrypt_cell(&token).unwrap(), "");
    }
}
