//! Keyloom — pluggable multi-key cryptographic primitive framework.
//!
//! A registry maps opaque key-type URLs to key managers; keysets hold
//! multiple keys of mixed type, version, and status; wrappers present a
//! whole keyset as one primitive. Keys rotate without breaking old
//! signatures or ciphertexts, and new key types plug in at runtime.
//!
//! ```
//! use keyloom::{signature, KeysetHandle, Registry};
//! use keyloom::{BoxedSigner, BoxedVerifier, Signer, Verifier};
//!
//! # fn main() -> keyloom::Result<()> {
//! let registry = Registry::new();
//! signature::register(&registry)?;
//!
//! let handle = KeysetHandle::generate_new(&registry, &signature::ed25519_key_template())?;
//! let signer = registry.wrap(handle.primitives::<BoxedSigner>(&registry)?)?;
//! let signature = signer.sign(b"signed text")?;
//!
//! let public = handle.public_handle(&registry)?;
//! let verifier = registry.wrap(public.primitives::<BoxedVerifier>(&registry)?)?;
//! verifier.verify(&signature, b"signed text")?;
//! # Ok(())
//! # }
//! ```

pub mod aead;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod hybrid;
pub mod key_manager;
pub mod keyset;
pub mod mac;
pub mod primitive_set;
pub mod primitives;
pub mod registry;
pub mod signature;

// Re-export the framework surface
pub use catalogue::Catalogue;
pub use config::{ConfigEntry, RegistryConfig};
pub use error::{ErrorCode, KeyloomError, Result};
pub use key_manager::{KeyManager, KeyManagerHandle};
pub use registry::Registry;

// Re-export the record model and keyset surface
pub use keyset::{
    Key, KeyData, KeyInfo, KeyMaterialType, KeysetHandle, KeysetInfo, KeysetManager, KeyStatus,
    KeyTemplate, Keyset, OutputPrefixType,
};

// Re-export primitive interfaces
pub use primitive_set::{PrimitiveSet, PrimitiveSetEntry, PrimitiveWrapper};
pub use primitives::{
    Aead, BoxedAead, BoxedHybridDecrypt, BoxedHybridEncrypt, BoxedMac, BoxedSigner, BoxedVerifier,
    HybridDecrypt, HybridEncrypt, Mac, Signer, Verifier,
};

/// Install every built-in primitive family into `registry`.
pub fn register_all(registry: &Registry) -> Result<()> {
    signature::register(registry)?;
    mac::register(registry)?;
    aead::register(registry)?;
    hybrid::register(registry)?;
    Ok(())
}
