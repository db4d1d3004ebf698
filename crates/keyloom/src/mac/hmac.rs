//! HMAC-SHA256 key type and manager.
//!
//! Keys carry their tag length: a 128-bit-tag key and a 256-bit-tag key are
//! distinct key materials, not a runtime switch.

use hmac::{Hmac, Mac as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{KeyloomError, Result};
use crate::key_manager::{validate_key_version, KeyManager};
use crate::keyset::{KeyData, KeyMaterialType};
use crate::primitives::{BoxedMac, Mac};

/// Type URL for HMAC-SHA256 keys.
pub const HMAC_SHA256_KEY_TYPE_URL: &str = "type.keyloom.dev/keyloom.HmacSha256Key";

/// Smallest accepted key, in bytes.
pub const MIN_KEY_SIZE: u32 = 16;
/// Smallest accepted tag, in bytes. Shorter tags forge too easily.
pub const MIN_TAG_SIZE: u32 = 10;
/// Largest accepted tag: the full SHA-256 output.
pub const MAX_TAG_SIZE: u32 = 32;

/// Parameters for new HMAC-SHA256 keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmacKeyFormat {
    pub key_size: u32,
    pub tag_size: u32,
}

/// Serialized form of an HMAC-SHA256 key.
#[derive(Clone, Serialize, Deserialize)]
pub struct HmacKey {
    pub version: u32,
    pub key_value: Vec<u8>,
    pub tag_size: u32,
}

impl Drop for HmacKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

fn validate_params(key_size: u32, tag_size: u32) -> Result<()> {
    if key_size < MIN_KEY_SIZE {
        return Err(KeyloomError::InvalidKeyFormat(format!(
            "hmac key size {key_size} below minimum {MIN_KEY_SIZE}"
        )));
    }
    if !(MIN_TAG_SIZE..=MAX_TAG_SIZE).contains(&tag_size) {
        return Err(KeyloomError::InvalidKeyFormat(format!(
            "hmac tag size {tag_size} outside {MIN_TAG_SIZE}..={MAX_TAG_SIZE}"
        )));
    }
    Ok(())
}

struct HmacSha256 {
    key: Vec<u8>,
    tag_size: usize,
}

impl Drop for HmacSha256 {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl Mac for HmacSha256 {
    fn compute(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| KeyloomError::InvalidKey(format!("hmac key rejected: {e}")))?;
        mac.update(data);
        let full = mac.finalize().into_bytes();
        Ok(full[..self.tag_size].to_vec())
    }

    fn verify(&self, tag: &[u8], data: &[u8]) -> Result<()> {
        // A tag of the wrong length fails before any computation
        if tag.len() != self.tag_size {
            return Err(KeyloomError::VerificationFailed);
        }
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|_| KeyloomError::VerificationFailed)?;
        mac.update(data);
        mac.verify_truncated_left(tag)
            .map_err(|_| KeyloomError::VerificationFailed)
    }
}

/// Key manager for [`HMAC_SHA256_KEY_TYPE_URL`].
pub struct HmacManager;

impl KeyManager<BoxedMac> for HmacManager {
    fn type_url(&self) -> &'static str {
        HMAC_SHA256_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedMac> {
        let key: HmacKey = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed hmac key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        validate_params(key.key_value.len() as u32, key.tag_size)
            .map_err(|e| KeyloomError::InvalidKey(e.to_string()))?;
        Ok(Box::new(HmacSha256 {
            key: key.key_value.clone(),
            tag_size: key.tag_size as usize,
        }))
    }

    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData> {
        if serialized_format.is_empty() {
            return Err(KeyloomError::InvalidKeyFormat(
                "hmac key format with key_size and tag_size is required".into(),
            ));
        }
        let format: HmacKeyFormat = bincode::deserialize(serialized_format)
            .map_err(|e| KeyloomError::InvalidKeyFormat(format!("malformed hmac key format: {e}")))?;
        validate_params(format.key_size, format.tag_size)?;

        let mut key_value = vec![0u8; format.key_size as usize];
        rand::thread_rng().fill_bytes(&mut key_value);
        let key = HmacKey {
            version: self.version(),
            key_value,
            tag_size: format.tag_size,
        };

        let value = bincode::serialize(&key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: HMAC_SHA256_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::Symmetric,
        })
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }
}
