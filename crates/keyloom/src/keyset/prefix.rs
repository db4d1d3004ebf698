//! Output prefix computation.
//!
//! The prefix prepended to signatures, tags, and ciphertexts names the
//! producing key, so consumers can narrow verification candidates with one
//! map lookup instead of trying every key.

use crate::keyset::OutputPrefixType;

/// Start byte of a [`OutputPrefixType::Tink`] prefix.
pub const TINK_START_BYTE: u8 = 0x01;
/// Start byte of a [`OutputPrefixType::Legacy`] prefix.
pub const LEGACY_START_BYTE: u8 = 0x00;

/// Length of a Tink or Legacy prefix: start byte plus big-endian key id.
pub const FULL_PREFIX_LEN: usize = 5;
/// Length of a Crunchy prefix: big-endian key id only.
pub const SHORT_PREFIX_LEN: usize = 4;

/// Compute the output prefix for `key_id` under `prefix_type`.
pub fn output_prefix(prefix_type: OutputPrefixType, key_id: u32) -> Vec<u8> {
    match prefix_type {
        OutputPrefixType::Tink => full_prefix(TINK_START_BYTE, key_id),
        OutputPrefixType::Legacy => full_prefix(LEGACY_START_BYTE, key_id),
        OutputPrefixType::Crunchy => key_id.to_be_bytes().to_vec(),
        OutputPrefixType::Raw => Vec::new(),
    }
}

fn full_prefix(start_byte: u8, key_id: u32) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(FULL_PREFIX_LEN);
    prefix.push(start_byte);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    prefix
}
