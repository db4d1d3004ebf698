//! Keyset record model: key material, key records, templates, and summaries.
//!
//! A keyset is one key-rotation lineage: an ordered list of keys of possibly
//! mixed types and statuses, with one designated primary. Everything here is
//! a plain serializable record; behavior lives in [`handle`] and [`manager`].

pub mod handle;
pub mod manager;
pub mod prefix;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub use handle::KeysetHandle;
pub use manager::KeysetManager;

/// Status of a key within a keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Usable for producing and consuming output.
    Enabled,
    /// Kept in the keyset but never instantiated.
    Disabled,
    /// Material wiped; only the id remains, keeping the history intact.
    Destroyed,
}

/// Material class of a key, deciding how it may be derived or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMaterialType {
    Symmetric,
    AsymmetricPrivate,
    AsymmetricPublic,
    /// Held outside the process, e.g. by an external key service.
    Remote,
}

/// Output tagging scheme, deciding the prefix on bytes a key produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputPrefixType {
    /// Five-byte prefix: a 0x01 start byte, then the big-endian key id.
    Tink,
    /// Like [`Tink`](Self::Tink) with a 0x00 start byte.
    Legacy,
    /// No prefix at all.
    Raw,
    /// Four-byte prefix: the big-endian key id with no start byte.
    Crunchy,
}

/// Opaque key material plus the type URL that tells a manager how to read it.
///
/// The material is zeroized on drop and redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyData {
    pub type_url: String,
    #[serde(with = "b64")]
    pub value: Vec<u8>,
    pub material_type: KeyMaterialType,
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value_len", &self.value.len())
            .field("material_type", &self.material_type)
            .finish()
    }
}

impl Drop for KeyData {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// One key record in a keyset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    pub key_id: u32,
    pub data: KeyData,
    pub status: KeyStatus,
    pub output_prefix_type: OutputPrefixType,
}

/// Ordered key records with one designated primary.
///
/// The primary invariant (exactly one enabled key carries
/// `primary_key_id`) is checked when primitives are built, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyset {
    pub primary_key_id: u32,
    pub keys: Vec<Key>,
}

impl Keyset {
    /// The key with `key_id`, if present.
    pub fn key(&self, key_id: u32) -> Option<&Key> {
        self.keys.iter().find(|k| k.key_id == key_id)
    }

    /// Material-free summary, safe to log or display.
    pub fn info(&self) -> KeysetInfo {
        KeysetInfo {
            primary_key_id: self.primary_key_id,
            entries: self
                .keys
                .iter()
                .map(|k| KeyInfo {
                    key_id: k.key_id,
                    type_url: k.data.type_url.clone(),
                    status: k.status,
                    output_prefix_type: k.output_prefix_type,
                })
                .collect(),
        }
    }
}

/// Recipe for generating a key: the type plus its serialized key format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTemplate {
    pub type_url: String,
    #[serde(with = "b64")]
    pub value: Vec<u8>,
    pub output_prefix_type: OutputPrefixType,
}

/// Material-free view of a keyset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetInfo {
    pub primary_key_id: u32,
    pub entries: Vec<KeyInfo>,
}

/// Material-free view of a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key_id: u32,
    pub type_url: String,
    pub status: KeyStatus,
    pub output_prefix_type: OutputPrefixType,
}

/// Pick a key id that is nonzero and unused in `keyset`.
pub(crate) fn random_key_id(keyset: &Keyset) -> u32 {
    loop {
        let id = rand::thread_rng().gen::<u32>();
        if id != 0 && keyset.key(id).is_none() {
            return id;
        }
    }
}

/// Base64 (de)serialization for binary fields in human-readable formats.
///
/// Binary serializers (bincode) keep the raw bytes.
mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        if ser.is_human_readable() {
            ser.serialize_str(&STANDARD.encode(bytes))
        } else {
            ser.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        if de.is_human_readable() {
            let s = String::deserialize(de)?;
            STANDARD.decode(s).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(de)
        }
    }
}
