//! Keyset-level AEAD: primary encrypts, every matching key may decrypt.

use crate::error::{KeyloomError, Result};
use crate::primitive_set::{PrimitiveSet, PrimitiveWrapper};
use crate::primitives::{Aead, BoxedAead};

struct WrappedAead {
    primitives: PrimitiveSet<BoxedAead>,
}

impl Aead for WrappedAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let primary = self
            .primitives
            .primary()
            .ok_or(KeyloomError::MissingPrimary)?;
        let raw = primary.primitive().encrypt(plaintext, associated_data)?;
        let mut ciphertext = Vec::with_capacity(primary.prefix().len() + raw.len());
        ciphertext.extend_from_slice(primary.prefix());
        ciphertext.extend_from_slice(&raw);
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        for entry in self.primitives.prefixed_entries(ciphertext) {
            let stripped = &ciphertext[entry.prefix().len()..];
            if let Ok(plaintext) = entry.primitive().decrypt(stripped, associated_data) {
                return Ok(plaintext);
            }
        }
        for entry in self.primitives.raw() {
            if let Ok(plaintext) = entry.primitive().decrypt(ciphertext, associated_data) {
                return Ok(plaintext);
            }
        }
        Err(KeyloomError::DecryptionFailed)
    }
}

/// Folds an AEAD set into one AEAD bound to the primary key for encryption.
pub struct AeadWrapper;

impl PrimitiveWrapper<BoxedAead> for AeadWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedAead>) -> Result<BoxedAead> {
        if primitives.primary().is_none() {
            return Err(KeyloomError::MissingPrimary);
        }
        Ok(Box::new(WrappedAead { primitives }))
    }
}
