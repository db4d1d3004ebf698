//! Message authentication family: HMAC-SHA256.

pub mod hmac;
pub mod wrapper;

pub use hmac::{HmacKeyFormat, HmacManager, HMAC_SHA256_KEY_TYPE_URL};
pub use wrapper::MacWrapper;

use crate::catalogue::Catalogue;
use crate::config::{self, ConfigEntry, RegistryConfig};
use crate::error::{KeyloomError, Result};
use crate::key_manager::{KeyManager, KeyManagerHandle};
use crate::keyset::{KeyTemplate, OutputPrefixType};
use crate::primitives::BoxedMac;
use crate::registry::Registry;

/// Catalogue name for MAC key managers.
pub const MAC_CATALOGUE: &str = "KeyloomMac";
/// Primitive name served by [`MAC_CATALOGUE`].
pub const MAC_PRIMITIVE: &str = "Mac";

/// Catalogue of MAC key managers.
pub struct MacCatalogue;

impl Catalogue<BoxedMac> for MacCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedMac>> {
        if !primitive_name.eq_ignore_ascii_case(MAC_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            HMAC_SHA256_KEY_TYPE_URL => {
                let manager = HmacManager;
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

/// The current MAC registration config.
pub fn latest() -> RegistryConfig {
    RegistryConfig {
        config_name: "MAC".to_string(),
        entries: vec![ConfigEntry::new(
            MAC_CATALOGUE,
            MAC_PRIMITIVE,
            HMAC_SHA256_KEY_TYPE_URL,
            true,
            0,
        )],
    }
}

/// Install the MAC family: catalogue, manager, and wrapper.
pub fn register(registry: &Registry) -> Result<()> {
    registry.add_catalogue(MAC_CATALOGUE, MacCatalogue)?;
    config::register(registry, &latest())?;
    registry.register_primitive_wrapper::<BoxedMac, _>(MacWrapper)?;
    Ok(())
}

fn hmac_template(key_size: u32, tag_size: u32) -> Result<KeyTemplate> {
    let value = bincode::serialize(&HmacKeyFormat { key_size, tag_size })
        .map_err(|e| KeyloomError::SerializationError(e.to_string()))?;
    Ok(KeyTemplate {
        type_url: HMAC_SHA256_KEY_TYPE_URL.to_string(),
        value,
        output_prefix_type: OutputPrefixType::Tink,
    })
}

/// Template for a 32-byte HMAC-SHA256 key with 128-bit tags.
pub fn hmac_sha256_tag128_template() -> Result<KeyTemplate> {
    hmac_template(32, 16)
}

/// Template for a 32-byte HMAC-SHA256 key with full 256-bit tags.
pub fn hmac_sha256_tag256_template() -> Result<KeyTemplate> {
    hmac_template(32, 32)
}
