//! Hybrid public-key encryption family: X25519 ECIES.

pub mod ecies;
pub mod wrappers;

pub use ecies::{
    EciesHybridDecryptManager, EciesHybridEncryptManager, ECIES_X25519_PRIVATE_KEY_TYPE_URL,
    ECIES_X25519_PUBLIC_KEY_TYPE_URL,
};
pub use wrappers::{HybridDecryptWrapper, HybridEncryptWrapper};

use crate::catalogue::Catalogue;
use crate::config::{self, ConfigEntry, RegistryConfig};
use crate::error::{KeyloomError, Result};
use crate::key_manager::{KeyManager, KeyManagerHandle};
use crate::keyset::{KeyTemplate, OutputPrefixType};
use crate::primitives::{BoxedHybridDecrypt, BoxedHybridEncrypt};
use crate::registry::Registry;

/// Catalogue name for hybrid-encryption key managers.
pub const HYBRID_ENCRYPT_CATALOGUE: &str = "KeyloomHybridEncrypt";
/// Catalogue name for hybrid-decryption key managers.
pub const HYBRID_DECRYPT_CATALOGUE: &str = "KeyloomHybridDecrypt";
/// Primitive name served by [`HYBRID_ENCRYPT_CATALOGUE`].
pub const HYBRID_ENCRYPT_PRIMITIVE: &str = "HybridEncrypt";
/// Primitive name served by [`HYBRID_DECRYPT_CATALOGUE`].
pub const HYBRID_DECRYPT_PRIMITIVE: &str = "HybridDecrypt";

/// Catalogue of hybrid-encryption key managers.
pub struct HybridEncryptCatalogue;

impl Catalogue<BoxedHybridEncrypt> for HybridEncryptCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedHybridEncrypt>> {
        if !primitive_name.eq_ignore_ascii_case(HYBRID_ENCRYPT_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            ECIES_X25519_PUBLIC_KEY_TYPE_URL => {
                let manager = EciesHybridEncryptManager;
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

/// Catalogue of hybrid-decryption key managers.
pub struct HybridDecryptCatalogue;

impl Catalogue<BoxedHybridDecrypt> for HybridDecryptCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedHybridDecrypt>> {
        if !primitive_name.eq_ignore_ascii_case(HYBRID_DECRYPT_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            ECIES_X25519_PRIVATE_KEY_TYPE_URL => {
                let manager = EciesHybridDecryptManager;
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

/// The current hybrid registration config: the decrypting entry paired with
/// its encrypting entry.
pub fn latest() -> RegistryConfig {
    RegistryConfig {
        config_name: "HYBRID".to_string(),
        entries: vec![
            ConfigEntry::new(
                HYBRID_DECRYPT_CATALOGUE,
                HYBRID_DECRYPT_PRIMITIVE,
                ECIES_X25519_PRIVATE_KEY_TYPE_URL,
                true,
                0,
            ),
            ConfigEntry::new(
                HYBRID_ENCRYPT_CATALOGUE,
                HYBRID_ENCRYPT_PRIMITIVE,
                ECIES_X25519_PUBLIC_KEY_TYPE_URL,
                true,
                0,
            ),
        ],
    }
}

/// Install the hybrid family: catalogues, managers, and wrappers.
pub fn register(registry: &Registry) -> Result<()> {
    registry.add_catalogue(HYBRID_DECRYPT_CATALOGUE, HybridDecryptCatalogue)?;
    registry.add_catalogue(HYBRID_ENCRYPT_CATALOGUE, HybridEncryptCatalogue)?;
    config::register(registry, &latest())?;
    registry.register_primitive_wrapper::<BoxedHybridEncrypt, _>(HybridEncryptWrapper)?;
    registry.register_primitive_wrapper::<BoxedHybridDecrypt, _>(HybridDecryptWrapper)?;
    Ok(())
}

/// Template for an ECIES X25519 key with the standard output prefix.
pub fn ecies_x25519_key_template() -> KeyTemplate {
    KeyTemplate {
        type_url: ECIES_X25519_PRIVATE_KEY_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Tink,
    }
}
