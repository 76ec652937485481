//! Composite operations over whole key pair sets.

pub mod encryptor;
pub mod generator;
pub mod signer;

pub use encryptor::KeyPairSetEncryptor;
pub use generator::{KeyPairSetFactory, KeyPairSetGenerator};
pub use signer::KeyPairSetSigner;
