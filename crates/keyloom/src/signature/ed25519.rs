//! Ed25519 key types and their managers.

use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey, Verifier as DalekVerifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{KeyloomError, Result};
use crate::key_manager::{validate_key_version, KeyManager};
use crate::keyset::{KeyData, KeyMaterialType};
use crate::primitives::{BoxedSigner, BoxedVerifier, Signer, Verifier};

/// Type URL for Ed25519 private (signing) keys.
pub const ED25519_PRIVATE_KEY_TYPE_URL: &str = "type.keyloom.dev/keyloom.Ed25519PrivateKey";
/// Type URL for Ed25519 public (verifying) keys.
pub const ED25519_PUBLIC_KEY_TYPE_URL: &str = "type.keyloom.dev/keyloom.Ed25519PublicKey";

/// Key format for new Ed25519 keys. Ed25519 has no tunable parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ed25519KeyFormat {
    pub version: u32,
}

/// Serialized form of an Ed25519 verifying key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ed25519PublicKey {
    pub version: u32,
    pub key_value: Vec<u8>,
}

/// Serialized form of an Ed25519 signing key, carrying its public half.
///
/// No `Debug` impl: the seed must not end up in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct Ed25519PrivateKey {
    pub version: u32,
    pub key_value: Vec<u8>,
    pub public_key: Ed25519PublicKey,
}

impl Drop for Ed25519PrivateKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

struct Ed25519Verifier {
    verifying_key: VerifyingKey,
}

impl Verifier for Ed25519Verifier {
    fn verify(&self, signature: &[u8], message: &[u8]) -> Result<()> {
        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| KeyloomError::VerificationFailed)?;
        let sig = Signature::from_bytes(&sig_bytes);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| KeyloomError::VerificationFailed)
    }
}

/// Key manager for [`ED25519_PRIVATE_KEY_TYPE_URL`], producing signers.
pub struct Ed25519SignManager;

impl KeyManager<BoxedSigner> for Ed25519SignManager {
    fn type_url(&self) -> &'static str {
        ED25519_PRIVATE_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedSigner> {
        let key: Ed25519PrivateKey = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ed25519 private key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        let seed: [u8; 32] = key
            .key_value
            .as_slice()
            .try_into()
            .map_err(|_| KeyloomError::InvalidKey("ed25519 seed must be 32 bytes".into()))?;
        let signing_key = SigningKey::from_bytes(&seed);
        Ok(Box::new(Ed25519Signer { signing_key }))
    }

    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData> {
        if !serialized_format.is_empty() {
            let format: Ed25519KeyFormat = bincode::deserialize(serialized_format).map_err(|e| {
                KeyloomError::InvalidKeyFormat(format!("malformed ed25519 key format: {e}"))
            })?;
            validate_key_version(format.version, self.version(), self.type_url())?;
        }

        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let mut seed = signing_key.to_bytes();
        let key = Ed25519PrivateKey {
            version: self.version(),
            key_value: seed.to_vec(),
            public_key: Ed25519PublicKey {
                version: self.version(),
                key_value: signing_key.verifying_key().to_bytes().to_vec(),
            },
        };
        seed.zeroize();

        let value = bincode::serialize(&key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: ED25519_PRIVATE_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::AsymmetricPrivate,
        })
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPrivate
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        let key: Ed25519PrivateKey = bincode::deserialize(serialized_private_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ed25519 private key: {e}")))?;
        let value = bincode::serialize(&key.public_key)
            .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
        Ok(KeyData {
            type_url: ED25519_PUBLIC_KEY_TYPE_URL.to_string(),
            value,
            material_type: KeyMaterialType::AsymmetricPublic,
        })
    }
}

/// Key manager for [`ED25519_PUBLIC_KEY_TYPE_URL`], producing verifiers.
///
/// Public keys are derived from private keys, never generated standalone,
/// so [`new_key`](KeyManager::new_key) always fails.
pub struct Ed25519VerifyManager;

impl KeyManager<BoxedVerifier> for Ed25519VerifyManager {
    fn type_url(&self) -> &'static str {
        ED25519_PUBLIC_KEY_TYPE_URL
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<BoxedVerifier> {
        let key: Ed25519PublicKey = bincode::deserialize(serialized_key)
            .map_err(|e| KeyloomError::InvalidKey(format!("malformed ed25519 public key: {e}")))?;
        validate_key_version(key.version, self.version(), self.type_url())?;
        let bytes: [u8; 32] = key
            .key_value
            .as_slice()
            .try_into()
            .map_err(|_| KeyloomError::InvalidKey("ed25519 public key must be 32 bytes".into()))?;
        let verifying_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| KeyloomError::InvalidKey(format!("invalid ed25519 public key: {e}")))?;
        Ok(Box::new(Ed25519Verifier { verifying_key }))
    }

    fn new_key(&self, _serialized_format: &[u8]) -> Result<KeyData> {
        Err(KeyloomError::InvalidKey(format!(
            "{ED25519_PUBLIC_KEY_TYPE_URL} cannot generate keys; derive from a private key"
        )))
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::AsymmetricPublic
    }
}
