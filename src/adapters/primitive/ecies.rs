// src/adapters/primitive/ecies.rs
//
// Envelope: ephemeral_public || salt(16) || ciphertext || tag(16)
// The AEAD key is HKDF(DH(ephemeral, recipient)) salted with the ephemeral
// public key; the ephemeral public key is also the AAD.
use super::provider_for;
use crate::adapters::crypto::xchacha20poly1305::ChaChaAead;
use crate::core::crypto::hkdf::derive_ecies_key;
use crate::domain::keypairset::PrimitiveKeyPair;
use crate::ports::crypto::{AEAD_TAG_LEN, AeadSeal, NONCE_SALT_LEN, NonceSalt, Seq};
use crate::ports::primitive::{CipherMode, PrimitiveEncryptor, PrimitiveError};
use rand_core::{OsRng, RngCore};

/// ECIES engine usable with any provider that implements Diffie-Hellman.
pub struct EciesEncryptor {
    pair: PrimitiveKeyPair,
    mode: CipherMode,
    aead: ChaChaAead,
}

impl EciesEncryptor {
    /// # Errors
    /// `MissingPrivateKey` when a decryptor is built from a public-only pair.
    pub fn new(pair: PrimitiveKeyPair, mode: CipherMode) -> Result<Self, PrimitiveError> {
        if mode == CipherMode::Decrypt && pair.is_public_only() {
            return Err(PrimitiveError::MissingPrivateKey(pair.spec()));
        }
        Ok(Self {
            pair,
            mode,
            aead: ChaChaAead,
        })
    }
}

impl PrimitiveEncryptor for EciesEncryptor {
    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        let spec = self.pair.spec();
        if self.mode != CipherMode::Encrypt {
            return Err(PrimitiveError::WrongMode {
                spec,
                mode: "decryption",
            });
        }
        let provider = provider_for(spec);
        let eph = provider.ephemeral()?;
        let eph_private = eph
            .private_key()
            .ok_or(PrimitiveError::MissingPrivateKey(spec))?;
        let shared = provider.agree(eph_private, self.pair.public_key())?;
        let key = derive_ecies_key(&shared, eph.public_key())?;

        let mut salt = [0u8; NONCE_SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut body = Vec::with_capacity(plaintext.len() + AEAD_TAG_LEN);
        body.extend_from_slice(plaintext);
        self.aead
            .seal_in_place(&key, NonceSalt(salt), Seq(0), eph.public_key(), &mut body)?;

        let mut out = Vec::with_capacity(eph.public_key().len() + NONCE_SALT_LEN + body.len());
        out.extend_from_slice(eph.public_key());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        let spec = self.pair.spec();
        if self.mode != CipherMode::Decrypt {
            return Err(PrimitiveError::WrongMode {
                spec,
                mode: "encryption",
            });
        }
        let provider = provider_for(spec);
        let pk_len = provider.public_key_len();
        if ciphertext.len() < pk_len + NONCE_SALT_LEN + AEAD_TAG_LEN {
            return Err(PrimitiveError::Truncated(spec));
        }
        let (eph_public, rest) = ciphertext.split_at(pk_len);
        let (salt, body) = rest.split_at(NONCE_SALT_LEN);
        let salt: [u8; NONCE_SALT_LEN] = super::fixed(salt, PrimitiveError::Truncated(spec))?;

        let private = self
            .pair
            .private_key()
            .ok_or(PrimitiveError::MissingPrivateKey(spec))?;
        let shared = provider.agree(private, eph_public)?;
        let key = derive_ecies_key(&shared, eph_public)?;

        let mut buf = body.to_vec();
        self.aead
            .open_in_place(&key, NonceSalt(salt), Seq(0), eph_public, &mut buf)?;
        Ok(buf)
    }
}
