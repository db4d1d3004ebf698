//! Primitive interfaces implemented by every key type.
//!
//! Each trait captures one cryptographic capability independent of the
//! algorithm behind it. Single-key implementations come from key managers;
//! composite implementations come from [`Registry::wrap`] and fan out over
//! a whole keyset behind the same interface.
//!
//! [`Registry::wrap`]: crate::registry::Registry::wrap

use crate::error::Result;

/// Produces signatures over arbitrary messages.
pub trait Signer: Send + Sync {
    /// Sign `message`, returning the signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Checks signatures produced by a [`Signer`].
pub trait Verifier: Send + Sync {
    /// Verify `signature` over `message`.
    fn verify(&self, signature: &[u8], message: &[u8]) -> Result<()>;
}

/// Computes and checks message authentication tags.
pub trait Mac: Send + Sync {
    /// Compute the authentication tag for `data`.
    fn compute(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Verify that `tag` authenticates `data`.
    fn verify(&self, tag: &[u8], data: &[u8]) -> Result<()>;
}

/// Authenticated encryption with associated data.
///
/// The associated data is authenticated but not encrypted; decryption with
/// different associated data fails.
pub trait Aead: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Public-key encryption bound to caller-supplied context info.
///
/// The context info is folded into key derivation; decryption with different
/// context fails.
pub trait HybridEncrypt: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

/// Private-key counterpart of [`HybridEncrypt`].
pub trait HybridDecrypt: Send + Sync {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

/// Boxed signer, the primitive kind carried through sets and wrappers.
pub type BoxedSigner = Box<dyn Signer>;
/// Boxed verifier.
pub type BoxedVerifier = Box<dyn Verifier>;
/// Boxed MAC.
pub type BoxedMac = Box<dyn Mac>;
/// Boxed AEAD.
pub type BoxedAead = Box<dyn Aead>;
/// Boxed hybrid encrypter.
pub type BoxedHybridEncrypt = Box<dyn HybridEncrypt>;
/// Boxed hybrid decrypter.
pub type BoxedHybridDecrypt = Box<dyn HybridDecrypt>;
