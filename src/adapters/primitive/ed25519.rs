// src/adapters/primitive/ed25519.rs
use super::fixed;
use crate::domain::keypairset::params::{ED25519_PK_LEN, ED25519_SK_LEN, ED25519_SIG_LEN};
use crate::domain::keypairset::{PrimitiveKeyPair, PrimitiveSpec, PrivateKeyBytes};
use crate::ports::primitive::{PrimitiveError, PrimitiveProvider, PrimitiveSigner, SignMode};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

const SPEC: PrimitiveSpec = PrimitiveSpec::Ed25519;

/// Ed25519 over a SHA-512 digest of the absorbed input (hash-then-sign).
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

fn parse_public(public: &[u8]) -> Result<VerifyingKey, PrimitiveError> {
    let bytes: [u8; ED25519_PK_LEN] = fixed(public, PrimitiveError::InvalidPublicKey(SPEC))?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| PrimitiveError::InvalidPublicKey(SPEC))
}

fn parse_private(private: &[u8]) -> Result<SigningKey, PrimitiveError> {
    let seed: Zeroizing<[u8; ED25519_SK_LEN]> =
        Zeroizing::new(fixed(private, PrimitiveError::InvalidPrivateKey(SPEC))?);
    Ok(SigningKey::from_bytes(&seed))
}

fn pair_of(sk: &SigningKey) -> PrimitiveKeyPair {
    PrimitiveKeyPair::new(
        SPEC,
        sk.verifying_key().to_bytes().to_vec(),
        Some(PrivateKeyBytes::new(sk.to_bytes().to_vec())),
    )
}

impl PrimitiveProvider for Ed25519Provider {
    fn spec(&self) -> PrimitiveSpec {
        SPEC
    }

    fn public_key_len(&self) -> usize {
        ED25519_PK_LEN
    }

    fn generate(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        Ok(pair_of(&SigningKey::generate(&mut OsRng)))
    }

    fn derive(&self, public: &[u8], private: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let vk = parse_public(public)?;
        let sk = parse_private(private)?;
        if sk.verifying_key() != vk {
            return Err(PrimitiveError::KeyMismatch(SPEC));
        }
        Ok(pair_of(&sk))
    }

    fn derive_public_only(&self, public: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let vk = parse_public(public)?;
        Ok(PrimitiveKeyPair::new(SPEC, vk.to_bytes().to_vec(), None))
    }

    fn signer(
        &self,
        pair: &PrimitiveKeyPair,
        mode: SignMode,
    ) -> Result<Box<dyn PrimitiveSigner>, PrimitiveError> {
        let verifying = parse_public(pair.public_key())?;
        let signing = match mode {
            SignMode::Verify => None,
            SignMode::Sign => {
                let private = pair
                    .private_key()
                    .ok_or(PrimitiveError::MissingPrivateKey(SPEC))?;
                Some(parse_private(private.as_bytes())?)
            }
        };
        Ok(Box::new(Ed25519Signer {
            digest: Sha512::new(),
            signing,
            verifying,
        }))
    }
}

struct Ed25519Signer {
    digest: Sha512,
    signing: Option<SigningKey>,
    verifying: VerifyingKey,
}

impl PrimitiveSigner for Ed25519Signer {
    fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.digest);
    }

    fn sign(&mut self) -> Result<Vec<u8>, PrimitiveError> {
        let digest = self.digest.finalize_reset();
        let sk = self.signing.as_ref().ok_or(PrimitiveError::WrongMode {
            spec: SPEC,
            mode: "verification",
        })?;
        Ok(sk.sign(&digest).to_bytes().to_vec())
    }

    fn verify(&mut self, signature: &[u8]) -> bool {
        let digest = self.digest.finalize_reset();
        let Ok(sig) = <[u8; ED25519_SIG_LEN]>::try_from(signature) else {
            return false;
        };
        self.verifying
            .verify_strict(&digest, &Signature::from_bytes(&sig))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_and_reuse() {
        let p = Ed25519Provider;
        let kp = p.generate().unwrap();
        let mut s = p.signer(&kp, SignMode::Sign).unwrap();
        s.update(b"part one, ");
        s.update(b"part two");
        let sig = s.sign().unwrap();
        assert_eq!(sig.len(), ED25519_SIG_LEN);

        let mut v = p.signer(&kp.to_public_only(), SignMode::Verify).unwrap();
        v.update(b"part one, part two");
        assert!(v.verify(&sig));
        // engine was reset by verify
        v.update(b"something else");
        assert!(!v.verify(&sig));
    }

    #[test]
    fn verify_only_engine_cannot_sign() {
        let p = Ed25519Provider;
        let kp = p.generate().unwrap();
        let mut v = p.signer(&kp, SignMode::Verify).unwrap();
        assert!(matches!(v.sign(), Err(PrimitiveError::WrongMode { .. })));
        assert!(matches!(
            p.signer(&kp.to_public_only(), SignMode::Sign),
            Err(PrimitiveError::MissingPrivateKey(PrimitiveSpec::Ed25519))
        ));
    }

    #[test]
    fn malformed_signature_is_false() {
        let p = Ed25519Provider;
        let kp = p.generate().unwrap();
        let mut v = p.signer(&kp, SignMode::Verify).unwrap();
        assert!(!v.verify(&[0u8; 10]));
    }
}
