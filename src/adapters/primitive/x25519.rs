// src/adapters/primitive/x25519.rs
use super::ecies::EciesEncryptor;
use super::fixed;
use crate::domain::keypairset::params::{X25519_PK_LEN, X25519_SK_LEN};
use crate::domain::keypairset::{PrimitiveKeyPair, PrimitiveSpec, PrivateKeyBytes};
use crate::ports::primitive::{CipherMode, PrimitiveEncryptor, PrimitiveError, PrimitiveProvider};
use rand_core::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

const SPEC: PrimitiveSpec = PrimitiveSpec::X25519;

/// X25519 Diffie-Hellman and ECIES. Ephemerals are `StaticSecret`s so the
/// public half can be sent before the exchange completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Provider;

fn parse_public(public: &[u8]) -> Result<PublicKey, PrimitiveError> {
    let bytes: [u8; X25519_PK_LEN] = fixed(public, PrimitiveError::InvalidPublicKey(SPEC))?;
    Ok(PublicKey::from(bytes))
}

fn parse_private(private: &[u8]) -> Result<StaticSecret, PrimitiveError> {
    let bytes: Zeroizing<[u8; X25519_SK_LEN]> =
        Zeroizing::new(fixed(private, PrimitiveError::InvalidPrivateKey(SPEC))?);
    Ok(StaticSecret::from(*bytes))
}

fn pair_of(secret: &StaticSecret) -> PrimitiveKeyPair {
    PrimitiveKeyPair::new(
        SPEC,
        PublicKey::from(secret).as_bytes().to_vec(),
        Some(PrivateKeyBytes::new(secret.to_bytes().to_vec())),
    )
}

impl PrimitiveProvider for X25519Provider {
    fn spec(&self) -> PrimitiveSpec {
        SPEC
    }

    fn public_key_len(&self) -> usize {
        X25519_PK_LEN
    }

    fn generate(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        Ok(pair_of(&StaticSecret::random_from_rng(OsRng)))
    }

    fn derive(&self, public: &[u8], private: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let pk = parse_public(public)?;
        let sk = parse_private(private)?;
        if PublicKey::from(&sk) != pk {
            return Err(PrimitiveError::KeyMismatch(SPEC));
        }
        Ok(pair_of(&sk))
    }

    fn derive_public_only(&self, public: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let pk = parse_public(public)?;
        Ok(PrimitiveKeyPair::new(SPEC, pk.as_bytes().to_vec(), None))
    }

    fn encryptor(
        &self,
        pair: &PrimitiveKeyPair,
        mode: CipherMode,
    ) -> Result<Box<dyn PrimitiveEncryptor>, PrimitiveError> {
        parse_public(pair.public_key())?;
        Ok(Box::new(EciesEncryptor::new(pair.clone(), mode)?))
    }

    fn ephemeral(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        self.generate()
    }

    fn agree(
        &self,
        private: &PrivateKeyBytes,
        peer_public: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        let sk = parse_private(private.as_bytes())?;
        let pk = parse_public(peer_public)?;
        let shared = sk.diffie_hellman(&pk);
        if !shared.was_contributory() {
            return Err(PrimitiveError::WeakSharedSecret(SPEC));
        }
        Ok(Zeroizing::new(shared.as_bytes().to_vec()))
    }
}
