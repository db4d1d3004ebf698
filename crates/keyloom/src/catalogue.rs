//! Catalogues: versioned directories of key managers for one primitive kind.

use crate::error::Result;
use crate::key_manager::KeyManagerHandle;

/// Resolves type URLs to key managers for a family of related key types.
///
/// A catalogue hands out a manager for `type_url` supporting at least
/// `min_version`. It fails with a not-found error when it has nothing
/// suitable, or with an unknown-classified refusal when it is a
/// non-functional stand-in that resolves nothing at all.
pub trait Catalogue<P>: Send + Sync + 'static {
    /// Resolve a key manager for `type_url` serving `primitive_name`.
    fn key_manager(
        &self,
        type_url: &str,
        primitive_name: &str,
        min_version: u32,
    ) -> Result<KeyManagerHandle<P>>;
}
