//! Digital signature family.
//!
//! Bundles the Ed25519 key managers behind catalogues, a registration
//! config, key templates, and the keyset-level signer/verifier wrappers.

pub mod ed25519;
pub mod wrappers;

pub use ed25519::{
    Ed25519SignManager, Ed25519VerifyManager, ED25519_PRIVATE_KEY_TYPE_URL,
    ED25519_PUBLIC_KEY_TYPE_URL,
};
pub use wrappers::{SignerWrapper, VerifierWrapper};

use crate::catalogue::Catalogue;
use crate::config::{self, ConfigEntry, RegistryConfig};
use crate::error::{KeyloomError, Result};
use crate::key_manager::{KeyManager, KeyManagerHandle};
use crate::keyset::{KeyTemplate, OutputPrefixType};
use crate::primitives::{BoxedSigner, BoxedVerifier};
use crate::registry::Registry;

/// Catalogue name for signing key managers.
pub const SIGNER_CATALOGUE: &str = "KeyloomSigner";
/// Catalogue name for verifying key managers.
pub const VERIFIER_CATALOGUE: &str = "KeyloomVerifier";
/// Primitive name served by [`SIGNER_CATALOGUE`].
pub const SIGNER_PRIMITIVE: &str = "Signer";
/// Primitive name served by [`VERIFIER_CATALOGUE`].
pub const VERIFIER_PRIMITIVE: &str = "Verifier";

/// Catalogue of signing key managers.
pub struct SignerCatalogue;

impl Catalogue<BoxedSigner> for SignerCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedSigner>> {
        if !primitive_name.eq_ignore_ascii_case(SIGNER_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            ED25519_PRIVATE_KEY_TYPE_URL => {
                let manager = Ed25519SignManager;
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

/// Catalogue of verifying key managers.
pub struct VerifierCatalogue;

impl Catalogue<BoxedVerifier> for VerifierCatalogue {
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<BoxedVerifier>> {
        if !primitive_name.eq_ignore_ascii_case(VERIFIER_PRIMITIVE) {
            return Err(KeyloomError::ManagerNotFound(format!(
                "{type_url} serving primitive {primitive_name}"
            )));
        }
        match type_url {
            ED25519_PUBLIC_KEY_TYPE_URL => {
                let manager = Ed25519VerifyManager;
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

/// The current signature registration config: Ed25519 signing paired with
/// its verifying entry.
pub fn latest() -> RegistryConfig {
    RegistryConfig {
        config_name: "SIGNATURE".to_string(),
        entries: vec![
            ConfigEntry::new(
                SIGNER_CATALOGUE,
                SIGNER_PRIMITIVE,
                ED25519_PRIVATE_KEY_TYPE_URL,
                true,
                0,
            ),
            ConfigEntry::new(
                VERIFIER_CATALOGUE,
                VERIFIER_PRIMITIVE,
                ED25519_PUBLIC_KEY_TYPE_URL,
                true,
                0,
            ),
        ],
    }
}

/// Install the signature family: catalogues, managers, and wrappers.
pub fn register(registry: &Registry) -> Result<()> {
    registry.add_catalogue(SIGNER_CATALOGUE, SignerCatalogue)?;
    registry.add_catalogue(VERIFIER_CATALOGUE, VerifierCatalogue)?;
    config::register(registry, &latest())?;
    registry.register_primitive_wrapper::<BoxedSigner, _>(SignerWrapper)?;
    registry.register_primitive_wrapper::<BoxedVerifier, _>(VerifierWrapper)?;
    Ok(())
}

/// Template for an Ed25519 key with the standard output prefix.
pub fn ed25519_key_template() -> KeyTemplate {
    KeyTemplate {
        type_url: ED25519_PRIVATE_KEY_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Tink,
    }
}

/// Template for an Ed25519 key producing unprefixed signatures.
pub fn ed25519_raw_key_template() -> KeyTemplate {
    KeyTemplate {
        type_url: ED25519_PRIVATE_KEY_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Raw,
    }
}
