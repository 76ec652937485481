//! Capability boundary for single-key primitives.
//!
//! The composite layer never touches a concrete curve type. It asks
//! [`PrimitiveProvider`] for key generation, derivation, signers, encryptors
//! and Diffie-Hellman, all over the opaque encodings stored in
//! [`PrimitiveKeyPair`]. Providers are stateless and shared (`&'static`);
//! signers and encryptors are per-operation boxed engines.

use crate::core::crypto::hkdf::HkdfError;
use crate::domain::keypairset::{PrimitiveKeyPair, PrimitiveSpec, PrivateKeyBytes};
use crate::ports::crypto::AeadError;
use zeroize::Zeroizing;

#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    #[error("{spec} does not support {op}")]
    Unsupported { spec: PrimitiveSpec, op: &'static str },
    #[error("invalid {0} public key")]
    InvalidPublicKey(PrimitiveSpec),
    #[error("invalid {0} private key")]
    InvalidPrivateKey(PrimitiveSpec),
    #[error("{0} private key does not match its public key")]
    KeyMismatch(PrimitiveSpec),
    #[error("{0} operation needs a private key")]
    MissingPrivateKey(PrimitiveSpec),
    #[error("{spec} engine was initialised for {mode}")]
    WrongMode { spec: PrimitiveSpec, mode: &'static str },
    #[error("{0} signing failed")]
    Signing(PrimitiveSpec),
    #[error("{0} ciphertext is truncated")]
    Truncated(PrimitiveSpec),
    #[error("{0} agreement produced a degenerate shared secret")]
    WeakSharedSecret(PrimitiveSpec),
    #[error("aead: {0}")]
    Aead(#[from] AeadError),
    #[error("kdf: {0}")]
    Kdf(#[from] HkdfError),
}

/// What a signer engine was initialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMode {
    Sign,
    Verify,
}

/// What an encryptor engine was initialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    Encrypt,
    Decrypt,
}

/// Incremental signer / verifier over a digest accumulator.
///
/// `sign` and `verify` consume the accumulated input and leave the engine
/// reset, ready for the next message.
pub trait PrimitiveSigner: Send {
    fn update(&mut self, data: &[u8]);

    fn reset(&mut self);

    /// Sign everything absorbed since the last reset.
    ///
    /// # Errors
    /// `WrongMode` for a verify-only engine, `Signing` if the backend refuses.
    fn sign(&mut self) -> Result<Vec<u8>, PrimitiveError>;

    /// Check `signature` against everything absorbed since the last reset.
    /// A malformed signature is a `false` verdict, not an error.
    fn verify(&mut self, signature: &[u8]) -> bool;
}

/// One-shot public-key encryption for a single constituent.
pub trait PrimitiveEncryptor: Send {
    /// # Errors
    /// `WrongMode` for a decrypt-only engine, or a backend failure.
    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, PrimitiveError>;

    /// # Errors
    /// `WrongMode`, `Truncated`, or `Aead` on authentication failure.
    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, PrimitiveError>;
}

/// Stateless provider for one [`PrimitiveSpec`].
///
/// Capability methods default to `Unsupported`; a provider overrides exactly
/// the ones its primitive offers, mirroring `PrimitiveSpec::can_*`.
pub trait PrimitiveProvider: Send + Sync {
    fn spec(&self) -> PrimitiveSpec;

    /// Length of the canonical public key encoding.
    fn public_key_len(&self) -> usize;

    /// # Errors
    /// Backend failure while sampling a key.
    fn generate(&self) -> Result<PrimitiveKeyPair, PrimitiveError>;

    /// Rebuild a full pair, checking that `private` matches `public`.
    ///
    /// # Errors
    /// `InvalidPublicKey`, `InvalidPrivateKey` or `KeyMismatch`.
    fn derive(&self, public: &[u8], private: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError>;

    /// # Errors
    /// `InvalidPublicKey` if `public` does not parse.
    fn derive_public_only(&self, public: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError>;

    fn export_public(&self, pair: &PrimitiveKeyPair) -> Vec<u8> {
        pair.public_key().to_vec()
    }

    /// # Errors
    /// `MissingPrivateKey` for a public-only pair.
    fn export_private(&self, pair: &PrimitiveKeyPair) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        pair.private_key()
            .map(|k| Zeroizing::new(k.as_bytes().to_vec()))
            .ok_or(PrimitiveError::MissingPrivateKey(self.spec()))
    }

    /// # Errors
    /// `Unsupported` unless the primitive signs; key errors otherwise.
    fn signer(
        &self,
        _pair: &PrimitiveKeyPair,
        _mode: SignMode,
    ) -> Result<Box<dyn PrimitiveSigner>, PrimitiveError> {
        Err(PrimitiveError::Unsupported {
            spec: self.spec(),
            op: "signing",
        })
    }

    /// # Errors
    /// `Unsupported` unless the primitive encrypts; key errors otherwise.
    fn encryptor(
        &self,
        _pair: &PrimitiveKeyPair,
        _mode: CipherMode,
    ) -> Result<Box<dyn PrimitiveEncryptor>, PrimitiveError> {
        Err(PrimitiveError::Unsupported {
            spec: self.spec(),
            op: "encryption",
        })
    }

    /// Fresh single-use key pair for Diffie-Hellman.
    ///
    /// # Errors
    /// `Unsupported` unless the primitive agrees.
    fn ephemeral(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        Err(PrimitiveError::Unsupported {
            spec: self.spec(),
            op: "key agreement",
        })
    }

    /// Raw Diffie-Hellman output between `private` and `peer_public`.
    ///
    /// # Errors
    /// `Unsupported` unless the primitive agrees; key errors and
    /// `WeakSharedSecret` otherwise.
    fn agree(
        &self,
        _private: &PrivateKeyBytes,
        _peer_public: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        Err(PrimitiveError::Unsupported {
            spec: self.spec(),
            op: "key agreement",
        })
    }
}
