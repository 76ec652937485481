//! Composite key generation, export and derivation.

use crate::adapters::primitive::provider_for;
use crate::domain::keypairset::{KeyPairSet, KeyPairSetBuilder, KeyPairSetError, KeyPairSetSpec};
use crate::ports::primitive::PrimitiveProvider;
use crate::protocol::wire::{PrivateKeyMessage, PublicKeyMessage};
use std::sync::OnceLock;
use tracing::{debug, trace};
use zeroize::Zeroizing;

/// Generator bound to one composite kind. Holds the constituent providers in
/// constituent order.
pub struct KeyPairSetGenerator {
    spec: KeyPairSetSpec,
    providers: Vec<&'static dyn PrimitiveProvider>,
}

impl KeyPairSetGenerator {
    #[must_use]
    pub fn new(spec: KeyPairSetSpec) -> Self {
        Self {
            spec,
            providers: spec.constituents().iter().map(|p| provider_for(*p)).collect(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    /// Fresh key pair set. Fails as a whole if any constituent fails.
    ///
    /// # Errors
    /// `Primitive` if a constituent cannot generate a key.
    pub fn generate(&self) -> Result<KeyPairSet, KeyPairSetError> {
        let mut builder = KeyPairSetBuilder::new(self.spec);
        for (i, provider) in self.providers.iter().enumerate() {
            trace!(index = i, primitive = %provider.spec(), "generating constituent");
            builder.push(provider.generate()?)?;
        }
        let set = builder.build()?;
        debug!(spec = %self.spec, "generated key pair set");
        Ok(set)
    }

    /// Encoded composite public key.
    ///
    /// # Errors
    /// `MismatchedSpec` if `set` is of another kind, or an encoding error.
    pub fn export_public(&self, set: &KeyPairSet) -> Result<Vec<u8>, KeyPairSetError> {
        set.check_spec(self.spec)?;
        let keys = self
            .providers
            .iter()
            .zip(set.pairs())
            .map(|(provider, pair)| provider.export_public(pair))
            .collect();
        Ok(PublicKeyMessage::new(self.spec, keys)?.encode()?)
    }

    /// Encoded composite private key.
    ///
    /// # Errors
    /// `MismatchedSpec`, `PublicOnly`, or an encoding error.
    pub fn export_private(&self, set: &KeyPairSet) -> Result<Zeroizing<Vec<u8>>, KeyPairSetError> {
        set.check_spec(self.spec)?;
        set.require_private()?;
        let mut keys = Vec::with_capacity(self.providers.len());
        for (provider, pair) in self.providers.iter().zip(set.pairs()) {
            let mut exported = provider.export_private(pair)?;
            keys.push(std::mem::take(&mut *exported));
        }
        let message = PrivateKeyMessage::new(self.spec, keys)?;
        Ok(Zeroizing::new(message.encode()?))
    }

    /// Rebuild a full set from its encoded halves.
    ///
    /// Both messages must declare this generator's kind; that is checked
    /// before any constituent is parsed.
    ///
    /// # Errors
    /// `Decode` for malformed input, `MismatchedSpec` for a kind mismatch,
    /// `Primitive` if a constituent key is invalid or the halves disagree.
    pub fn derive(&self, public: &[u8], private: &[u8]) -> Result<KeyPairSet, KeyPairSetError> {
        let public = PublicKeyMessage::decode(public)?;
        let private = PrivateKeyMessage::decode(private)?;
        self.check_declared(public.spec())?;
        self.check_declared(private.spec())?;

        let mut builder = KeyPairSetBuilder::new(self.spec);
        for (i, ((provider, pk), sk)) in self
            .providers
            .iter()
            .zip(public.keys())
            .zip(private.keys())
            .enumerate()
        {
            trace!(index = i, primitive = %provider.spec(), "deriving constituent");
            builder.push(provider.derive(pk.as_bytes(), sk.as_bytes())?)?;
        }
        let set = builder.build()?;
        debug!(spec = %self.spec, "derived key pair set");
        Ok(set)
    }

    /// Rebuild a public-only set from an encoded public key.
    ///
    /// # Errors
    /// `Decode`, `MismatchedSpec` or `Primitive`.
    pub fn derive_public_only(&self, public: &[u8]) -> Result<KeyPairSet, KeyPairSetError> {
        let public = PublicKeyMessage::decode(public)?;
        self.check_declared(public.spec())?;
        let mut builder = KeyPairSetBuilder::new(self.spec);
        for (provider, pk) in self.providers.iter().zip(public.keys()) {
            builder.push(provider.derive_public_only(pk.as_bytes())?)?;
        }
        let set = builder.build()?;
        debug!(spec = %self.spec, "derived public-only key pair set");
        Ok(set)
    }

    fn check_declared(&self, decoded: KeyPairSetSpec) -> Result<(), KeyPairSetError> {
        if decoded == self.spec {
            Ok(())
        } else {
            Err(KeyPairSetError::MismatchedSpec {
                expected: self.spec,
                actual: decoded,
            })
        }
    }
}

/// Lazily populated, shareable cache of one generator per composite kind.
pub struct KeyPairSetFactory {
    generators: [OnceLock<KeyPairSetGenerator>; KeyPairSetSpec::ALL.len()],
}

impl Default for KeyPairSetFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPairSetFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generators: [const { OnceLock::new() }; KeyPairSetSpec::ALL.len()],
        }
    }

    /// Process-wide factory.
    pub fn global() -> &'static KeyPairSetFactory {
        static FACTORY: KeyPairSetFactory = KeyPairSetFactory::new();
        &FACTORY
    }

    /// Cached generator for `spec`, constructed on first use.
    pub fn generator(&self, spec: KeyPairSetSpec) -> &KeyPairSetGenerator {
        self.generators[spec.ordinal()].get_or_init(|| KeyPairSetGenerator::new(spec))
    }

    /// # Errors
    /// See [`KeyPairSetGenerator::generate`].
    pub fn generate(&self, spec: KeyPairSetSpec) -> Result<KeyPairSet, KeyPairSetError> {
        self.generator(spec).generate()
    }

    /// Derive a set whose kind is taken from the public key bytes.
    ///
    /// # Errors
    /// See [`KeyPairSetGenerator::derive`].
    pub fn derive(&self, public: &[u8], private: &[u8]) -> Result<KeyPairSet, KeyPairSetError> {
        let spec = PublicKeyMessage::decode(public)?.spec();
        self.generator(spec).derive(public, private)
    }

    /// # Errors
    /// See [`KeyPairSetGenerator::derive_public_only`].
    pub fn derive_public_only(&self, public: &[u8]) -> Result<KeyPairSet, KeyPairSetError> {
        let spec = PublicKeyMessage::decode(public)?.spec();
        self.generator(spec).derive_public_only(public)
    }
}
