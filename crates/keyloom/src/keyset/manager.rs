//! Mutable keyset editing, producing immutable handles.

use log::debug;
use zeroize::Zeroize;

use crate::error::{KeyloomError, Result};
use crate::keyset::handle::KeysetHandle;
use crate::keyset::{random_key_id, Key, KeyStatus, Keyset, KeyTemplate};
use crate::registry::Registry;

/// Editor for building and rotating keysets.
///
/// All mutation happens here; consumers only ever see the immutable
/// [`KeysetHandle`] snapshots produced by [`handle`](Self::handle).
#[derive(Debug)]
pub struct KeysetManager {
    keyset: Keyset,
}

impl KeysetManager {
    /// Start from an empty keyset.
    pub fn new() -> Self {
        Self {
            keyset: Keyset {
                primary_key_id: 0,
                keys: Vec::new(),
            },
        }
    }

    /// Continue editing an existing keyset.
    pub fn from_handle(handle: &KeysetHandle) -> Self {
        Self {
            keyset: handle.keyset().clone(),
        }
    }

    /// Generate and append a new enabled key without changing the primary.
    ///
    /// Returns the new key's id.
    pub fn add_key(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let data = registry.new_key_data(template)?;
        let key_id = random_key_id(&self.keyset);
        self.keyset.keys.push(Key {
            key_id,
            data,
            status: KeyStatus::Enabled,
            output_prefix_type: template.output_prefix_type,
        });
        debug!("added key {key_id} ({})", template.type_url);
        Ok(key_id)
    }

    /// Generate a new key and make it the primary.
    ///
    /// The previous primary stays enabled, so output it produced remains
    /// consumable.
    pub fn rotate(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let key_id = self.add_key(registry, template)?;
        self.keyset.primary_key_id = key_id;
        debug!("rotated primary to {key_id}");
        Ok(key_id)
    }

    /// Make an existing enabled key the primary.
    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        let key = self
            .keyset
            .key(key_id)
            .ok_or(KeyloomError::KeyNotFound(key_id))?;
        if key.status != KeyStatus::Enabled {
            return Err(KeyloomError::InvalidKeyset(format!(
                "key {key_id} is {:?}, only enabled keys can be primary",
                key.status
            )));
        }
        self.keyset.primary_key_id = key_id;
        Ok(())
    }

    /// Re-enable a disabled key.
    pub fn enable(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(KeyloomError::InvalidKeyset(format!(
                "key {key_id} is destroyed and cannot be enabled"
            )));
        }
        key.status = KeyStatus::Enabled;
        Ok(())
    }

    /// Disable a key, keeping its material.
    ///
    /// The primary cannot be disabled; rotate or pick another primary first.
    pub fn disable(&mut self, key_id: u32) -> Result<()> {
        if key_id == self.keyset.primary_key_id {
            return Err(KeyloomError::InvalidKeyset(format!(
                "cannot disable primary key {key_id}"
            )));
        }
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(KeyloomError::InvalidKeyset(format!(
                "key {key_id} is destroyed and cannot be disabled"
            )));
        }
        key.status = KeyStatus::Disabled;
        Ok(())
    }

    /// Wipe a key's material, keeping its id in the history.
    pub fn destroy(&mut self, key_id: u32) -> Result<()> {
        if key_id == self.keyset.primary_key_id {
            return Err(KeyloomError::InvalidKeyset(format!(
                "cannot destroy primary key {key_id}"
            )));
        }
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(KeyloomError::InvalidKeyset(format!(
                "key {key_id} is already destroyed"
            )));
        }
        key.data.value.zeroize();
        key.data.value.clear();
        key.status = KeyStatus::Destroyed;
        debug!("destroyed key {key_id}");
        Ok(())
    }

    /// Immutable snapshot of the current keyset.
    pub fn handle(&self) -> Result<KeysetHandle> {
        KeysetHandle::from_keyset(self.keyset.clone())
    }

    fn key_mut(&mut self, key_id: u32) -> Result<&mut Key> {
        self.keyset
            .keys
            .iter_mut()
            .find(|k| k.key_id == key_id)
            .ok_or(KeyloomError::KeyNotFound(key_id))
    }
}

impl Default for KeysetManager {
    fn default() -> Self {
        Self::new()
    }
}
