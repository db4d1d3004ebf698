//! Keyset-level MAC: primary computes, every matching key may verify.

use crate::error::{KeyloomError, Result};
use crate::primitive_set::{PrimitiveSet, PrimitiveWrapper};
use crate::primitives::{BoxedMac, Mac};

struct WrappedMac {
    primitives: PrimitiveSet<BoxedMac>,
}

impl Mac for WrappedMac {
    fn compute(&self, data: &[u8]) -> Result<Vec<u8>> {
        let primary = self
            .primitives
            .primary()
            .ok_or(KeyloomError::MissingPrimary)?;
        let raw = primary.primitive().compute(data)?;
        let mut tag = Vec::with_capacity(primary.prefix().len() + raw.len());
        tag.extend_from_slice(primary.prefix());
        tag.extend_from_slice(&raw);
        Ok(tag)
    }

    fn verify(&self, tag: &[u8], data: &[u8]) -> Result<()> {
        for entry in self.primitives.prefixed_entries(tag) {
            let stripped = &tag[entry.prefix().len()..];
            if entry.primitive().verify(stripped, data).is_ok() {
                return Ok(());
            }
        }
        for entry in self.primitives.raw() {
            if entry.primitive().verify(tag, data).is_ok() {
                return Ok(());
            }
        }
        Err(KeyloomError::VerificationFailed)
    }
}

/// Folds a MAC set into one MAC bound to the primary key for computation.
pub struct MacWrapper;

impl PrimitiveWrapper<BoxedMac> for MacWrapper {
    fn wrap(&self, primitives: PrimitiveSet<BoxedMac>) -> Result<BoxedMac> {
        if primitives.primary().is_none() {
            return Err(KeyloomError::MissingPrimary);
        }
        Ok(Box::new(WrappedMac { primitives }))
    }
}
