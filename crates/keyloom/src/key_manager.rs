//! Key manager interface and the typed handle the registry stores.
//!
//! A key manager owns everything specific to one key type: parsing and
//! validating serialized key material, instantiating the primitive, and
//! generating fresh keys.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::{KeyloomError, Result};
use crate::keyset::{KeyData, KeyMaterialType};

/// Per-key-type factory for primitives of kind `P`.
pub trait KeyManager<P>: Send + Sync + 'static {
    /// Type URL this manager serves.
    fn type_url(&self) -> &'static str;

    /// Highest key material version this manager understands.
    fn version(&self) -> u32 {
        0
    }

    /// Whether this manager serves `type_url`.
    fn does_support(&self, type_url: &str) -> bool {
        type_url == self.type_url()
    }

    /// Build a primitive from serialized key material.
    fn primitive(&self, serialized_key: &[u8]) -> Result<P>;

    /// Generate fresh key material from a serialized key format.
    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData>;

    /// Material class of the keys this manager produces.
    fn key_material_type(&self) -> KeyMaterialType;

    /// Derive the public key data embedded in asymmetric private material.
    ///
    /// Only meaningful when [`key_material_type`](Self::key_material_type)
    /// is [`KeyMaterialType::AsymmetricPrivate`].
    fn public_key_data(&self, _serialized_private_key: &[u8]) -> Result<KeyData> {
        Err(KeyloomError::InvalidKey(format!(
            "{} has no public key variant",
            self.type_url()
        )))
    }
}

/// Enforce the version gate on key material.
///
/// A key written at `key_version` must never be consumed by a manager
/// supporting only an older version.
pub fn validate_key_version(key_version: u32, manager_version: u32, type_url: &str) -> Result<()> {
    if key_version > manager_version {
        return Err(KeyloomError::VersionMismatch {
            type_url: type_url.to_string(),
            key_version,
            manager_version,
        });
    }
    Ok(())
}

/// A shareable [`KeyManager`] together with its concrete type identity.
///
/// The registry compares the captured [`TypeId`] to distinguish an idempotent
/// re-registration from a genuine conflict, which the trait object alone
/// cannot express.
pub struct KeyManagerHandle<P> {
    inner: Arc<dyn KeyManager<P>>,
    impl_type: TypeId,
    impl_name: &'static str,
}

impl<P: 'static> KeyManagerHandle<P> {
    /// Wrap a concrete manager, capturing its type identity.
    pub fn new<M: KeyManager<P>>(manager: M) -> Self {
        Self {
            inner: Arc::new(manager),
            impl_type: TypeId::of::<M>(),
            impl_name: std::any::type_name::<M>(),
        }
    }

    /// The wrapped key manager.
    pub fn manager(&self) -> &dyn KeyManager<P> {
        self.inner.as_ref()
    }

    pub(crate) fn impl_type(&self) -> TypeId {
        self.impl_type
    }

    pub(crate) fn impl_name(&self) -> &'static str {
        self.impl_name
    }
}

impl<P> Clone for KeyManagerHandle<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            impl_type: self.impl_type,
            impl_name: self.impl_name,
        }
    }
}

impl<P> fmt::Debug for KeyManagerHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManagerHandle")
            .field("impl", &self.impl_name)
            .finish()
    }
}
