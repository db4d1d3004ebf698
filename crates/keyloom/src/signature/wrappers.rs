//! Keyset-level signer and verifier.
//!
//! The wrapped signer signs with the primary key only; the wrapped verifier
//! tries every key whose output prefix matches, then the raw keys.

use crate::error::{KeyloomError, Result};
use crate::primitive_set::{PrimitiveSet, PrimitiveWrapper};
use crate::primitives::{BoxedSigner, BoxedVerifier, Signer, Verifier};

struct WrappedSigner {
    primitives: PrimitiveSet<BoxedSigner>,
}

impl Signer for WrappedSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let primary = self
            .primitives
            .primary()
            .ok_or(KeyloomError::MissingPrimary)?;
        let raw = primary.primitive().sign(message)?;
        let mut signature = Vec::with_capacity(primary.prefix().len() + raw.len());
        signature.extend_from_slice(primary.prefix());
        signature.extend_from_slice(&raw);
        Ok(signature)
    }
}

struct WrappedVerifier {
    primitives: PrimitiveSet<BoxedVerifier>,
}

impl Verifier for WrappedVerifier {
    fn verify(&self, signature: &[u8], message: &[u8]) -> Result<()> {
        for entry in self.primitives.prefixed_entries(signature) {
            let stripped = &signature[entry.prefix().len()..];
            if entry.primitive().verify(stripped, message).is_ok() {
                return Ok(());
            }
        }
        for entry in self.primitives.raw() {
            if entry.primitive().verify(signature, message).is_ok() {
                return Ok(());
            }
        }
        // Constant failure: nothing identifies which keys were tried
        Err(KeyloomError::VerificationFailed)
    }
}

/// Folds a signer set into a single signer bound to the primary key.
pub struct SignerWrapper;

impl PrimitiveWrapper<BoxedSigner> for SignerWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedSigner>) -> Result<BoxedSigner> {
        if primitives.primary().is_none() {
            return Err(KeyloomError::MissingPrimary);
        }
        Ok(Box::new(WrappedSigner { primitives }))
    }
}

/// Folds a verifier set into a single verifier accepting any enabled key.
pub struct VerifierWrapper;

impl PrimitiveWrapper<BoxedVerifier> for VerifierWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedVerifier>) -> Result<BoxedVerifier> {
        Ok(Box::new(WrappedVerifier { primitives }))
    }
}
