//! Live primitive collections built from the enabled keys of a keyset.
//!
//! A [`PrimitiveSet`] owns one instantiated primitive per enabled key,
//! indexed by output prefix so consumers can narrow candidates in O(1).
//! A [`PrimitiveWrapper`] folds a whole set back into a single primitive
//! that encapsulates the fan-out policy.

use std::collections::HashMap;
use std::fmt;

use crate::error::{KeyloomError, Result};
use crate::keyset::prefix::{self, FULL_PREFIX_LEN, SHORT_PREFIX_LEN};
use crate::keyset::{Key, KeyStatus, OutputPrefixType};

/// One instantiated primitive plus the key metadata consumers need.
pub struct PrimitiveSetEntry<P> {
    primitive: P,
    key_id: u32,
    prefix: Vec<u8>,
    status: KeyStatus,
    output_prefix_type: OutputPrefixType,
}

impl<P> PrimitiveSetEntry<P> {
    /// The live primitive.
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Output prefix of bytes this key produces; empty for raw keys.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }
}

/// Exclusive owner of every entry built from one keyset snapshot.
///
/// Entries keep their keyset order within a prefix; two keys may share a
/// prefix (collisions are resolved by trying candidates in order). Exactly
/// one entry is primary once [`set_primary`](Self::set_primary) has run.
pub struct PrimitiveSet<P> {
    entries: Vec<PrimitiveSetEntry<P>>,
    by_prefix: HashMap<Vec<u8>, Vec<usize>>,
    primary: Option<usize>,
}

impl<P> PrimitiveSet<P> {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_prefix: HashMap::new(),
            primary: None,
        }
    }

    /// Instantiate-and-insert, called once per enabled key in keyset order.
    ///
    /// Only enabled keys may enter a set; disabled or destroyed records are
    /// the caller's responsibility to skip.
    pub fn add(&mut self, primitive: P, key: &Key) -> Result<()> {
        if key.status != KeyStatus::Enabled {
            return Err(KeyloomError::InvalidKeyset(format!(
                "cannot add key {} with status {:?}",
                key.key_id, key.status
            )));
        }
        let prefix = prefix::output_prefix(key.output_prefix_type, key.key_id);
        let index = self.entries.len();
        self.entries.push(PrimitiveSetEntry {
            primitive,
            key_id: key.key_id,
            prefix: prefix.clone(),
            status: key.status,
            output_prefix_type: key.output_prefix_type,
        });
        self.by_prefix.entry(prefix).or_default().push(index);
        Ok(())
    }

    /// Mark the entry carrying `key_id` as primary.
    ///
    /// Fails unless exactly one entry carries that id.
    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        let mut matches = self.entries.iter().enumerate().filter(|(_, e)| e.key_id == key_id);
        let first = matches.next();
        let second = matches.next();
        match (first, second) {
            (Some((index, _)), None) => {
                self.primary = Some(index);
                Ok(())
            }
            (None, _) => Err(KeyloomError::InvalidKeyset(format!(
                "primary key {key_id} is not present and enabled"
            ))),
            (Some(_), Some(_)) => Err(KeyloomError::InvalidKeyset(format!(
                "multiple enabled keys carry primary id {key_id}"
            ))),
        }
    }

    /// The primary entry, if one has been designated.
    pub fn primary(&self) -> Option<&PrimitiveSetEntry<P>> {
        self.primary.map(|index| &self.entries[index])
    }

    /// Entries whose output prefix equals `prefix`, in insertion order.
    pub fn by_prefix(&self, prefix: &[u8]) -> Vec<&PrimitiveSetEntry<P>> {
        self.by_prefix
            .get(prefix)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Entries with no prefix at all (raw keys), in insertion order.
    pub fn raw(&self) -> Vec<&PrimitiveSetEntry<P>> {
        self.by_prefix(&[])
    }

    /// Entries whose prefix matches the leading bytes of `input`, longest
    /// prefix length first, insertion order within a length.
    ///
    /// This is the candidate list consumers walk before falling back to
    /// [`raw`](Self::raw) entries.
    pub fn prefixed_entries(&self, input: &[u8]) -> Vec<&PrimitiveSetEntry<P>> {
        let mut candidates = Vec::new();
        for len in [FULL_PREFIX_LEN, SHORT_PREFIX_LEN] {
            if input.len() >= len {
                candidates.extend(self.by_prefix(&input[..len]));
            }
        }
        candidates
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PrimitiveSetEntry<P>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> Default for PrimitiveSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("len", &self.entries.len())
            .field("primary", &self.primary)
            .finish()
    }
}

/// Folds a [`PrimitiveSet`] into one composite primitive of the same kind.
///
/// One wrapper per primitive kind. The wrapper fixes the fan-out policy:
/// produce with the primary entry only, consume by trying prefix-matched
/// candidates and then raw entries.
pub trait PrimitiveWrapper<P>: Send + Sync + 'static {
    /// Build the composite primitive, taking ownership of the set.
    fn wrap(&self, primitives: PrimitiveSet<P>) -> Result<P>;
}
