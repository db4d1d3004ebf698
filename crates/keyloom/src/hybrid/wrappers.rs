//! Keyset-level hybrid encryption: primary encrypts, every matching key
//! may decrypt.

use crate::error::{KeyloomError, Result};
use crate::primitive_set::{PrimitiveSet, PrimitiveWrapper};
use crate::primitives::{BoxedHybridDecrypt, BoxedHybridEncrypt, HybridDecrypt, HybridEncrypt};

struct WrappedHybridEncrypt {
    primitives: PrimitiveSet<BoxedHybridEncrypt>,
}

impl HybridEncrypt for WrappedHybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let primary = self
            .primitives
            .primary()
            .ok_or(KeyloomError::MissingPrimary)?;
        let raw = primary.primitive().encrypt(plaintext, context_info)?;
        let mut ciphertext = Vec::with_capacity(primary.prefix().len() + raw.len());
        ciphertext.extend_from_slice(primary.prefix());
        ciphertext.extend_from_slice(&raw);
        Ok(ciphertext)
    }
}

struct WrappedHybridDecrypt {
    primitives: PrimitiveSet<BoxedHybridDecrypt>,
}

impl HybridDecrypt for WrappedHybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        for entry in self.primitives.prefixed_entries(ciphertext) {
            let stripped = &ciphertext[entry.prefix().len()..];
            if let Ok(plaintext) = entry.primitive().decrypt(stripped, context_info) {
                return Ok(plaintext);
            }
        }
        for entry in self.primitives.raw() {
            if let Ok(plaintext) = entry.primitive().decrypt(ciphertext, context_info) {
                return Ok(plaintext);
            }
        }
        Err(KeyloomError::DecryptionFailed)
    }
}

/// Folds a hybrid-encrypt set into one encrypter bound to the primary key.
pub struct HybridEncryptWrapper;

impl PrimitiveWrapper<BoxedHybridEncrypt> for HybridEncryptWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedHybridEncrypt>) -> Result<BoxedHybridEncrypt> {
        if primitives.primary().is_none() {
            return Err(KeyloomError::MissingPrimary);
        }
        Ok(Box::new(WrappedHybridEncrypt { primitives }))
    }
}

/// Folds a hybrid-decrypt set into one decrypter accepting any enabled key.
pub struct HybridDecryptWrapper;

impl PrimitiveWrapper<BoxedHybridDecrypt> for HybridDecryptWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedHybridDecrypt>) -> Result<BoxedHybridDecrypt> {
        Ok(Box::new(WrappedHybridDecrypt { primitives }))
    }
}
