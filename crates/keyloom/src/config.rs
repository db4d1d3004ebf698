//! Declarative registration: named entry lists applied to a registry.
//!
//! A family ships a canonical entry list (its `latest()`), and callers apply
//! it with [`register`]. Entries resolve through catalogues, so swapping a
//! catalogue swaps every manager the family provides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::Registry;

/// One declarative registration: which catalogue provides the manager for a
/// type URL, and under what constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub catalogue_name: String,
    pub primitive_name: String,
    pub type_url: String,
    pub new_key_allowed: bool,
    pub key_manager_version: u32,
}

impl ConfigEntry {
    pub fn new(
        catalogue_name: &str,
        primitive_name: &str,
        type_url: &str,
        new_key_allowed: bool,
        key_manager_version: u32,
    ) -> Self {
        Self {
            catalogue_name: catalogue_name.to_string(),
            primitive_name: primitive_name.to_string(),
            type_url: type_url.to_string(),
            new_key_allowed,
            key_manager_version,
        }
    }
}

/// A named, ordered list of registrations for one primitive family.
///
/// Entry order is a compatibility surface: families list related entries
/// (sign/verify, decrypt/encrypt) in adjacent pairs, and callers may
/// enumerate them pairwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub config_name: String,
    pub entries: Vec<ConfigEntry>,
}

/// Apply every entry of `config` to `registry`, in order.
///
/// Not transactional: the first failing entry's error propagates unchanged
/// and earlier entries stay applied. Every entry is individually idempotent,
/// so retrying a corrected config converges on the same registry state.
pub fn register(registry: &Registry, config: &RegistryConfig) -> Result<()> {
    for entry in &config.entries {
        registry.apply_config_entry(entry)?;
    }
    Ok(())
}
