//! Keyset handles: immutable snapshots and primitive materialization.

use log::debug;

use crate::error::{KeyloomError, Result};
use crate::key_manager::KeyManagerHandle;
use crate::keyset::manager::KeysetManager;
use crate::keyset::{Key, KeyMaterialType, KeyStatus, Keyset, KeysetInfo, KeyTemplate};
use crate::primitive_set::PrimitiveSet;
use crate::registry::Registry;

/// An immutable keyset plus the operations that materialize its keys.
///
/// Handles are cheap to clone and safe to share across threads; every
/// [`primitives`](Self::primitives) call builds an independent set.
#[derive(Debug, Clone)]
pub struct KeysetHandle {
    keyset: Keyset,
}

impl KeysetHandle {
    /// Generate a single-key keyset from `template`.
    ///
    /// The new key is enabled and primary.
    pub fn generate_new(registry: &Registry, template: &KeyTemplate) -> Result<Self> {
        let mut manager = KeysetManager::new();
        manager.rotate(registry, template)?;
        manager.handle()
    }

    /// Wrap an existing keyset, e.g. one deserialized from storage.
    pub fn from_keyset(keyset: Keyset) -> Result<Self> {
        if keyset.keys.is_empty() {
            return Err(KeyloomError::InvalidKeyset("keyset has no keys".into()));
        }
        Ok(Self { keyset })
    }

    /// Borrow the underlying keyset.
    pub fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    /// Material-free summary, safe to log.
    pub fn info(&self) -> KeysetInfo {
        self.keyset.info()
    }

    /// Derive the public keyset for an asymmetric-private keyset.
    ///
    /// Every key's id, status, and prefix type carry over unchanged, so
    /// output produced under the private keyset verifies against primitives
    /// built from the public one. Destroyed keys carry no material and are
    /// dropped from the result.
    pub fn public_handle(&self, registry: &Registry) -> Result<Self> {
        let mut keys = Vec::with_capacity(self.keyset.keys.len());
        for key in &self.keyset.keys {
            if key.status == KeyStatus::Destroyed {
                continue;
            }
            if key.data.material_type != KeyMaterialType::AsymmetricPrivate {
                return Err(KeyloomError::InvalidKey(format!(
                    "key {} is not an asymmetric private key",
                    key.key_id
                )));
            }
            let public_data = registry.public_key_data(&key.data.type_url, &key.data.value)?;
            keys.push(Key {
                key_id: key.key_id,
                data: public_data,
                status: key.status,
                output_prefix_type: key.output_prefix_type,
            });
        }
        Self::from_keyset(Keyset {
            primary_key_id: self.keyset.primary_key_id,
            keys,
        })
    }

    /// Materialize every enabled key as a primitive of kind `P`, resolving
    /// managers through `registry`.
    ///
    /// Disabled and destroyed keys are never instantiated. Exactly one
    /// enabled key must carry the primary id.
    pub fn primitives<P: 'static>(&self, registry: &Registry) -> Result<PrimitiveSet<P>> {
        self.build_primitives(|key| {
            let handle = registry.get_key_manager::<P>(&key.data.type_url)?;
            handle.manager().primitive(&key.data.value)
        })
    }

    /// Like [`primitives`](Self::primitives), but resolving every key
    /// through `manager` instead of the registry.
    pub fn primitives_with<P: 'static>(
        &self,
        manager: &KeyManagerHandle<P>,
    ) -> Result<PrimitiveSet<P>> {
        self.build_primitives(|key| {
            if !manager.manager().does_support(&key.data.type_url) {
                return Err(KeyloomError::InvalidKey(format!(
                    "manager {} does not support {}",
                    manager.impl_name(),
                    key.data.type_url
                )));
            }
            manager.manager().primitive(&key.data.value)
        })
    }

    fn build_primitives<P, F>(&self, mut build: F) -> Result<PrimitiveSet<P>>
    where
        F: FnMut(&Key) -> Result<P>,
    {
        let mut set = PrimitiveSet::new();
        for key in &self.keyset.keys {
            if key.status != KeyStatus::Enabled {
                continue;
            }
            let primitive = build(key)?;
            set.add(primitive, key)?;
        }
        set.set_primary(self.keyset.primary_key_id)?;
        debug!(
            "materialized {} primitives (primary {})",
            set.len(),
            self.keyset.primary_key_id
        );
        Ok(set)
    }
}
