//! Authenticated encryption family: ChaCha20-Poly1305.

pub mod chacha20;
pub mod wrapper;

pub use chacha20::{ChaCha20Poly1305Manager, CHACHA20_POLY1305_KEY_TYPE_URL};
pub use wrapper::AeadWrapper;

use crate::catalogue::Catalogue;
use crate::config::{self, ConfigEntry, RegistryConfig};
use crate::error::{KeyloomError, Result};
use crate::key_manager::{KeyManager, KeyManagerHandle};
use crate::keyset::{KeyTemplate, OutputPrefixType};
use crate::primitives::BoxedAead;
use crate::registry::Registry;

/// Catalogue name for AEAD key managers.
pub const AEAD_CATALOGUE: &str = "KeyloomAead";
/// Primitive name served by [`AEAD_CATALOGUE`].
pub const AEAD_PRIMITIVE: &str = "Aead";

/// Catalogue of AEAD key managers.
pub struct AeadCatalogue;

impl Catalogue<BoxedAead> for AeadCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedAead>> {
        if !primitive_name.eq_ignore_ascii_case(AEAD_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            CHACHA20_POLY1305_KEY_TYPE_URL => {
                let manager = ChaCha20Poly1305Manager;
                if manager.version() < min_version {
                    return Err(KeyloomError::ManagerNotFound(format!(
                        "{type_url} with version at least {min_version}"
                    )));
                }
                Ok(KeyManagerHandle::new(manager))
            }
            _ => Err(KeyloomError::ManagerNotFound(type_url.to_string())),
        }
    }
}

/// The current AEAD registration config.
pub fn latest() -> RegistryConfig {
    RegistryConfig {
        config_name: "AEAD".to_string(),
        entries: vec![ConfigEntry::new(
            AEAD_CATALOGUE,
            AEAD_PRIMITIVE,
            CHACHA20_POLY1305_KEY_TYPE_URL,
            true,
            0,
        )],
    }
}

/// Install the AEAD family: catalogue, manager, and wrapper.
pub fn register(registry: &Registry) -> Result<()> {
    registry.add_catalogue(AEAD_CATALOGUE, AeadCatalogue)?;
    config::register(registry, &latest())?;
    registry.register_primitive_wrapper::<BoxedAead, _>(AeadWrapper)?;
    Ok(())
}

/// Template for a ChaCha20-Poly1305 key with the standard output prefix.
pub fn chacha20_poly1305_key_template() -> KeyTemplate {
    KeyTemplate {
        type_url: CHACHA20_POLY1305_KEY_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Tink,
    }
}
