//! Layered composite encryption.
//!
//! Encryption runs constituent 0 over the plaintext, then feeds each
//! ciphertext to the next constituent. Decryption peels the layers in
//! reverse order. Recovering the plaintext therefore needs every
//! constituent private key.

use crate::adapters::primitive::provider_for;
use crate::domain::keypairset::{KeyPairSet, KeyPairSetError, KeyPairSetSpec};
use crate::ports::primitive::{CipherMode, PrimitiveEncryptor};
use tracing::{debug, trace};
use zeroize::Zeroizing;

pub struct KeyPairSetEncryptor {
    spec: KeyPairSetSpec,
    mode: CipherMode,
    engines: Vec<Box<dyn PrimitiveEncryptor>>,
}

impl KeyPairSetEncryptor {
    /// # Errors
    /// `MismatchedSpec` if `set` is of another kind, `UnsupportedSpec` if the
    /// kind cannot encrypt, `PublicOnly` when decrypting with a public-only
    /// set.
    pub fn new(spec: KeyPairSetSpec, set: &KeyPairSet, mode: CipherMode) -> Result<Self, KeyPairSetError> {
        set.check_spec(spec)?;
        if !spec.can_encrypt() {
            return Err(KeyPairSetError::UnsupportedSpec(format!(
                "{spec} does not support encryption"
            )));
        }
        if mode == CipherMode::Decrypt {
            set.require_private()?;
        }
        let engines = set
            .pairs()
            .iter()
            .map(|pair| provider_for(pair.spec()).encryptor(pair, mode))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(spec = %spec, ?mode, "encryptor initialised");
        Ok(Self {
            spec,
            mode,
            engines,
        })
    }

    /// # Errors
    /// See [`KeyPairSetEncryptor::new`].
    pub fn for_encryption(set: &KeyPairSet) -> Result<Self, KeyPairSetError> {
        Self::new(set.spec(), set, CipherMode::Encrypt)
    }

    /// # Errors
    /// See [`KeyPairSetEncryptor::new`].
    pub fn for_decryption(set: &KeyPairSet) -> Result<Self, KeyPairSetError> {
        Self::new(set.spec(), set, CipherMode::Decrypt)
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// # Errors
    /// `Primitive` if any layer fails, including use in decrypt mode.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, KeyPairSetError> {
        let mut data = Zeroizing::new(plaintext.to_vec());
        for (i, engine) in self.engines.iter_mut().enumerate() {
            data = Zeroizing::new(engine.encrypt(&data)?);
            trace!(layer = i, len = data.len(), "encrypted layer");
        }
        Ok(std::mem::take(&mut *data))
    }

    /// # Errors
    /// `Primitive` if any layer fails to authenticate, including use in
    /// encrypt mode.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, KeyPairSetError> {
        let mut data = Zeroizing::new(ciphertext.to_vec());
        for (i, engine) in self.engines.iter_mut().enumerate().rev() {
            data = Zeroizing::new(engine.decrypt(&data)?);
            trace!(layer = i, len = data.len(), "decrypted layer");
        }
        Ok(std::mem::take(&mut *data))
    }
}
