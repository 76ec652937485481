//! Crate root for `keypairset`.
//!
//! Composite key pairs: a [`KeyPairSet`](domain::keypairset::KeyPairSet)
//! bundles one key pair per constituent primitive (Ed25519, secp256k1
//! ECDSA/ECDH, BIP-340 Schnorr, X25519) and every operation runs over all of
//! them, so breaking one primitive does not break the composite.
//!
//! High-level tree:
//! * `domain::keypairset` – specs, key pair sets, agreement parameters, errors.
//! * `ports` / `adapters` – the single-primitive capability boundary and its
//!   curve implementations.
//! * `protocol` – algorithm identifier registry and canonical CBOR wire
//!   messages.
//! * `application` – generator, chained signer, layered encryptor and the
//!   anonymous / signed / handshake agreement sessions.
//! * `config` – caller-side agreement defaults.
pub mod adapters;
pub mod application;
pub mod config;
pub mod core;
pub mod domain;
pub mod ports;
pub mod protocol;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::{
    AnonymousAgreement, HandshakeAgreement, KeyPairSetEncryptor, KeyPairSetFactory,
    KeyPairSetGenerator, KeyPairSetSigner, SignedAgreement,
};
pub use config::KeyPairSetConfig;
pub use crate::core::crypto::secret::AgreementSecret;
pub use domain::keypairset::{
    AgreementStatus, AgreementType, KdfSpec, KeyPairSet, KeyPairSetAgreementSpec,
    KeyPairSetError, KeyPairSetSpec,
};
