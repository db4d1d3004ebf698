//! ChaCha20-Poly1305 key type and manager.

use chacha20poly1305::{
    aead::{Aead as _, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{KeyloomError, Result};
use crate::key_manager::{validate_key_version, KeyManager};
use crate::keyset::{KeyData, KeyMaterialType};
use crate::primitives::{Aead, BoxedAead};

/// Type URL for ChaCha20-Poly1305 keys.
pub const CHACHA20_POLY1305_KEY_TYPE_URL: &str =
    "type.keyloom.dev/keyloom.ChaCha20Poly1305Key";

/// Key length in bytes.
pub const KEY_SIZE: usize = 32;
/// Nonce length in bytes, prepended to every ciphertext.
pub const NONCE_SIZE: usize = 12;
/// Poly1305 tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Key format for new ChaCha20-Poly1305 keys. No tunable parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaCha20Poly1305KeyFormat {
    pub version: u32,
}

/// Serialized form of a ChaCha20-Poly1305 key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChaCha20Poly1305Key {
    pub version: u32,
    pub key_value: Vec<u8>,
}

impl Drop for ChaCha20Poly1305Key {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

struct ChaCha20Poly1305Cipher {
    cipher: ChaCha20Poly1305,
}

impl Aead for ChaCha20Poly1305Cipher {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let sealed = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|e| KeyloomError::EncryptionFailed(format!("encrypt: {e}")))?;

        let mut ciphertext = Vec::with_capacity(NONCE_SIZE + sealed.len());
        ciphertext.extend_from_slice(&nonce_bytes);
        ciphertext.extend_from_slice(&sealed);
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(KeyloomError::DecryptionFailed);
        }
        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: sealed,
                    aad: associated_data,
                },
            )
            .map_err(|_| KeyloomError::DecryptionFailed)
    }
}

/// Key manager for [`CHACHA20_POLY1305_KEY_TYPE_URL`].
pub struct ChaCha20Poly1305Manager;

impl KeyManager<BoxedAead> for ChaCha20Poly1305Manager {
    fn type_url(&self) -> &'static str {
        CHACHA20_POLY1305_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedAead> {
        let key: ChaCha20Poly1305Key = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed chacha20 key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        if key.key_value.len() != KEY_SIZE {
            return Err(KeyloomError::InvalidKey(format!(
                "chacha20 key must be {KEY_SIZE} bytes, got {}",
                key.key_value.len()
            )));
        }
        let cipher = ChaCha20Poly1305::new_from_slice(&key.key_value)
            .map_err(|e| KeyloomError::InvalidKey(format!("cipher init: {e}")))?;
        Ok(Box::new(ChaCha20Poly1305Cipher { cipher }))
    }

    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData> {
        if !serialized_format.is_empty() {
            let format: ChaCha20Poly1305KeyFormat = bincode::deserialize(serialized_format)
                .map_err(|e| {
                    KeyloomError::InvalidKeyFormat(format!("malformed chacha20 key format: {e}"))
                })?;
            validate_key_version(format.version, self.version(), self.type_url())?;
        }

        let mut key_value = vec![0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key_value);
        let key = ChaCha20Poly1305Key {
            version: self.version(),
            key_value,
        };

        let value = bincode::serialize(&key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: CHACHA20_POLY1305_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::Symmetric,
        })
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }
}
