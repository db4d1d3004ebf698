//! ECIES over X25519 + HKDF-SHA256 + ChaCha20-Poly1305.
//!
//! Encryption generates an ephemeral X25519 key, derives a one-time
//! symmetric key with HKDF over (kem_bytes ‖ shared_secret) and the caller's
//! context info, and seals the payload. Ciphertext layout:
//! `kem_bytes(32) ‖ nonce(12) ‖ sealed`.

use chacha20poly1305::{
    aead::{Aead as _, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::aead::chacha20::{NONCE_SIZE, TAG_SIZE};
use crate::error::{KeyloomError, Result};
use crate::key_manager::{validate_key_version, KeyManager};
use crate::keyset::{KeyData, KeyMaterialType};
use crate::primitives::{BoxedHybridDecrypt, BoxedHybridEncrypt, HybridDecrypt, HybridEncrypt};

/// Type URL for ECIES X25519 private keys.
pub const ECIES_X25519_PRIVATE_KEY_TYPE_URL: &str =
    "type.keyloom.dev/keyloom.EciesX25519PrivateKey";
/// Type URL for ECIES X25519 public keys.
pub const ECIES_X25519_PUBLIC_KEY_TYPE_URL: &str =
    "type.keyloom.dev/keyloom.EciesX25519PublicKey";

/// Ephemeral public key length carried at the front of every ciphertext.
pub const KEM_SIZE: usize = 32;

/// Key format for new ECIES X25519 keys. No tunable parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EciesX25519KeyFormat {
    pub version: u32,
}

/// Serialized form of an ECIES X25519 public key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EciesX25519PublicKey {
    pub version: u32,
    pub key_value: Vec<u8>,
}

/// Serialized form of an ECIES X25519 private key with its public half.
///
/// No `Debug` impl: the scalar must not end up in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct EciesX25519PrivateKey {
    pub version: u32,
    pub key_value: Vec<u8>,
    pub public_key: EciesX25519PublicKey,
}

impl Drop for EciesX25519PrivateKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

/// Derive the one-time symmetric key for one ciphertext.
///
/// HKDF-SHA256 with no salt, IKM = kem_bytes ‖ shared_secret, and the
/// caller's context info as the info input, so the same key pair yields
/// unrelated symmetric keys per context.
fn derive_dem_key(
    kem_bytes: &[u8; KEM_SIZE],
    shared_secret: &[u8; 32],
    context_info: &[u8],
) -> Result<[u8; 32]> {
    let mut ikm = Vec::with_capacity(KEM_SIZE + 32);
    ikm.extend_from_slice(kem_bytes);
    ikm.extend_from_slice(shared_secret);
    let hk = Hkdf::<Sha256>::new(None, &ikm);
    let mut okm = [0u8; 32];
    let expanded = hk
        .expand(context_info, &mut okm)
        .map_err(|e| KeyloomError::DerivationFailed(format!("HKDF expand failed: {e}")));
    ikm.zeroize();
    expanded?;
    Ok(okm)
}

struct EciesX25519HybridEncrypt {
    recipient_public: X25519PublicKey,
}

impl HybridEncrypt for EciesX25519HybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
        let kem_bytes = X25519PublicKey::from(&ephemeral).to_bytes();
        let shared_secret = ephemeral.diffie_hellman(&self.recipient_public);
        let mut dem_key = derive_dem_key(&kem_bytes, shared_secret.as_bytes(), context_info)?;

        let cipher = ChaCha20Poly1305::new_from_slice(&dem_key)
            .map_err(|e| KeyloomError::EncryptionFailed(format!("cipher init: {e}")))?;
        dem_key.zeroize();

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| KeyloomError::EncryptionFailed(format!("encrypt: {e}")))?;

        let mut ciphertext = Vec::with_capacity(KEM_SIZE + NONCE_SIZE + sealed.len());
        ciphertext.extend_from_slice(&kem_bytes);
        ciphertext.extend_from_slice(&nonce_bytes);
        ciphertext.extend_from_slice(&sealed);
        Ok(ciphertext)
    }
}

struct EciesX25519HybridDecrypt {
    secret: StaticSecret,
}

impl HybridDecrypt for EciesX25519HybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < KEM_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(KeyloomError::DecryptionFailed);
        }
        let (kem_bytes, rest) = ciphertext.split_at(KEM_SIZE);
        let (nonce_bytes, sealed) = rest.split_at(NONCE_SIZE);
        let kem_array: [u8; KEM_SIZE] = kem_bytes
            .try_into()
            .map_err(|_| KeyloomError::DecryptionFailed)?;

        let ephemeral_public = X25519PublicKey::from(kem_array);
        let shared_secret = self.secret.diffie_hellman(&ephemeral_public);
        let mut dem_key = derive_dem_key(&kem_array, shared_secret.as_bytes(), context_info)
            .map_err(|_| KeyloomError::DecryptionFailed)?;

        let cipher = ChaCha20Poly1305::new_from_slice(&dem_key)
            .map_err(|_| KeyloomError::DecryptionFailed)?;
        dem_key.zeroize();
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| KeyloomError::DecryptionFailed)
    }
}

/// Key manager for [`ECIES_X25519_PRIVATE_KEY_TYPE_URL`], producing
/// hybrid decrypters.
pub struct EciesHybridDecryptManager;

impl KeyManager<BoxedHybridDecrypt> for EciesHybridDecryptManager {
    fn type_url(&self) -> &'static str {
        ECIES_X25519_PRIVATE_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedHybridDecrypt> {
        let key: EciesX25519PrivateKey = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ecies private key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        let scalar: [u8; 32] = key
            .key_value
            .as_slice()
            .try_into()
            .map_err(|_| KeyloomError::InvalidKey("x25519 secret must be 32 bytes".into()))?;
        Ok(Box::new(EciesX25519HybridDecrypt {
            secret: StaticSecret::from(scalar),
        }))
    }

    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData> {
        if !serialized_format.is_empty() {
            let format: EciesX25519KeyFormat = bincode::deserialize(serialized_format)
                .map_err(|e| {
                    KeyloomError::InvalidKeyFormat(format!("malformed ecies key format: {e}"))
                })?;
            validate_key_version(format.version, self.version(), self.type_url())?;
        }

        let secret = StaticSecret::random_from_rng(rand::thread_rng());
        let public = X25519PublicKey::from(&secret);
        let mut scalar = secret.to_bytes();
        let key = EciesX25519PrivateKey {
            version: self.version(),
            key_value: scalar.to_vec(),
            public_key: EciesX25519PublicKey {
                version: self.version(),
                key_value: public.as_bytes().to_vec(),
            },
        };
        scalar.zeroize();

        let value = bincode::serialize(&key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: ECIES_X25519_PRIVATE_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::AsymmetricPrivate,
        })
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        let key: EciesX25519PrivateKey = bincode::deserialize(serialized_private_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ecies private key: {e}")))?;
        let value = bincode::serialize(&key.public_key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: ECIES_X25519_PUBLIC_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::AsymmetricPublic,
        })
    }
}

/// Key manager for [`ECIES_X25519_PUBLIC_KEY_TYPE_URL`], producing
/// hybrid encrypters.
pub struct EciesHybridEncryptManager;

impl KeyManager<BoxedHybridEncrypt> for EciesHybridEncryptManager {
    fn type_url(&self) -> &'static str {
        ECIES_X25519_PUBLIC_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedHybridEncrypt> {
        let key: EciesX25519PublicKey = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ecies public key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        let bytes: [u8; 32] = key
            .key_value
            .as_slice()
            .try_into()
            .map_err(|_| KeyloomError::InvalidKey("x25519 public key must be 32 bytes".into()))?;
        Ok(Box::new(EciesX25519HybridEncrypt {
            recipient_public: X25519PublicKey::from(bytes),
        }))
    }

    fn new_key(&self, _serialized_format: &[u8]) -> Result<KeyData> {
        Err(KeyloomError::InvalidKey(format!(
            "{ECIES_X25519_PUBLIC_KEY_TYPE_URL} cannot generate keys; derive from a private key"
        )))
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }
}
