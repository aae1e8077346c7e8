//! AES-256-GCM sealing of provider token entities stored at rest.
//!
//! The key is a 32-byte value given as 64 hex characters. Sealed output is
//! `base64(nonce || ciphertext)` so it fits a text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;
use serde_json::Value;

use crate::error::{storage_error, Error, ErrorKind, StorageErrorKind};

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Cipher built from a validated key. Construct once at startup so a bad key
/// fails before the first callback is served.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Parse a hex-encoded 32-byte key.
    pub fn from_hex_key(key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(key_hex.trim()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::EncryptionFailed),
        })?;
        if bytes.len() != KEY_SIZE {
            return Err(storage_error(
                StorageErrorKind::EncryptionFailed,
                "Token encryption key must be 32 bytes (64 hex characters)",
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(&bytes).map_err(|_| {
            storage_error(StorageErrorKind::EncryptionFailed, "Invalid encryption key")
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| storage_error(StorageErrorKind::EncryptionFailed, "Encryption failed"))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Reverse [`TokenCipher::encrypt`].
    pub fn decrypt(&self, sealed: &str) -> Result<String, Error> {
        let combined = BASE64.decode(sealed).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })?;

        if combined.len() < NONCE_SIZE {
            return Err(storage_error(
                StorageErrorKind::DecryptionFailed,
                "Sealed value shorter than nonce",
            ));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| storage_error(StorageErrorKind::DecryptionFailed, "Decryption failed"))?;

        String::from_utf8(plaintext).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })
    }

    /// Serialize and encrypt a token entity.
    pub fn seal_token(&self, token: &Value) -> Result<String, Error> {
        let json = serde_json::to_string(token).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::Serialization),
        })?;
        self.encrypt(&json)
    }

    /// Decrypt and parse a token entity sealed with [`TokenCipher::seal_token`].
    pub fn open_token(&self, sealed: &str) -> Result<Value, Error> {
        let json = self.decrypt(sealed)?;
        serde_json::from_str(&json).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::Serialization),
        })
    }
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn cipher() -> TokenCipher {
        TokenCipher::from_hex_key(TEST_KEY).unwrap()
    }

    fn is_kind(result: &Result<impl std::fmt::Debug, Error>, kind: StorageErrorKind) -> bool {
        matches!(result, Err(Error { error_kind: ErrorKind::Storage(k), .. }) if *k == kind)
    }

    #[test]
    fn test_seal_and_open_token() {
        let token = json!({"access_token": "T1", "scope": "repo", "token_type": "bearer"});
        let sealed = cipher().seal_token(&token).unwrap();
        assert!(!sealed.contains("T1"));
        assert_eq!(cipher().open_token(&sealed).unwrap(), token);
    }

    #[test]
    fn test_each_seal_uses_a_fresh_nonce() {
        let first = cipher().encrypt("T1").unwrap();
        let second = cipher().encrypt("T1").unwrap();
        assert_ne!(first, second);
        assert_eq!(cipher().decrypt(&second).unwrap(), "T1");
    }

    #[test]
    fn test_short_or_non_hex_key_is_rejected() {
        assert!(is_kind(
            &TokenCipher::from_hex_key("abcd"),
            StorageErrorKind::EncryptionFailed
        ));
        assert!(is_kind(
            &TokenCipher::from_hex_key("not-valid-hex!"),
            StorageErrorKind::EncryptionFailed
        ));
    }

    #[test]
    fn test_wrong_key_fails_to_open() {
        let sealed = cipher().seal_token(&json!("T1")).unwrap();
        let other = TokenCipher::from_hex_key(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        )
        .unwrap();
        assert!(is_kind(&other.open_token(&sealed), StorageErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_corrupted_or_truncated_values_fail_to_open() {
        assert!(is_kind(
            &cipher().decrypt("not_valid_base64!!!"),
            StorageErrorKind::DecryptionFailed
        ));
        // "abc" is shorter than a nonce
        assert!(is_kind(&cipher().decrypt("YWJj"), StorageErrorKind::DecryptionFailed));
    }
}
