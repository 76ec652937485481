// src/adapters/primitive/schnorr.rs
use crate::domain::keypairset::params::{SCHNORR_PK_LEN, SCHNORR_SIG_LEN};
use crate::domain::keypairset::{PrimitiveKeyPair, PrimitiveSpec, PrivateKeyBytes};
use crate::ports::primitive::{PrimitiveError, PrimitiveProvider, PrimitiveSigner, SignMode};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha256};

const SPEC: PrimitiveSpec = PrimitiveSpec::Schnorr;

/// BIP-340 Schnorr over secp256k1. The 32-byte SHA-256 digest of the
/// absorbed input is the signed message; public keys are x-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchnorrProvider;

fn parse_public(public: &[u8]) -> Result<VerifyingKey, PrimitiveError> {
    if public.len() != SCHNORR_PK_LEN {
        return Err(PrimitiveError::InvalidPublicKey(SPEC));
    }
    VerifyingKey::from_bytes(public).map_err(|_| PrimitiveError::InvalidPublicKey(SPEC))
}

fn parse_private(private: &[u8]) -> Result<SigningKey, PrimitiveError> {
    SigningKey::from_bytes(private).map_err(|_| PrimitiveError::InvalidPrivateKey(SPEC))
}

fn pair_of(sk: &SigningKey) -> PrimitiveKeyPair {
    PrimitiveKeyPair::new(
        SPEC,
        sk.verifying_key().to_bytes().to_vec(),
        Some(PrivateKeyBytes::new(sk.to_bytes().to_vec())),
    )
}

impl PrimitiveProvider for SchnorrProvider {
    fn spec(&self) -> PrimitiveSpec {
        SPEC
    }

    fn public_key_len(&self) -> usize {
        SCHNORR_PK_LEN
    }

    fn generate(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        Ok(pair_of(&SigningKey::random(&mut OsRng)))
    }

    fn derive(&self, public: &[u8], private: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let vk = parse_public(public)?;
        let sk = parse_private(private)?;
        if sk.verifying_key().to_bytes() != vk.to_bytes() {
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
        Ok(Box::new(SchnorrSigner {
            digest: Sha256::new(),
            signing,
            verifying,
        }))
    }
}

struct SchnorrSigner {
    digest: Sha256,
    signing: Option<SigningKey>,
    verifying: VerifyingKey,
}

impl PrimitiveSigner for SchnorrSigner {
    fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.digest);
    }

    fn sign(&mut self) -> Result<Vec<u8>, PrimitiveError> {
        let msg = self.digest.finalize_reset();
        let sk = self.signing.as_ref().ok_or(PrimitiveError::WrongMode {
            spec: SPEC,
            mode: "verification",
        })?;
        let sig: Signature = sk.try_sign(&msg).map_err(|_| PrimitiveError::Signing(SPEC))?;
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&mut self, signature: &[u8]) -> bool {
        let msg = self.digest.finalize_reset();
        if signature.len() != SCHNORR_SIG_LEN {
            return false;
        }
        let Ok(sig) = Signature::try_from(signature) else {
            return false;
        };
        self.verifying.verify(&msg, &sig).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_x_only_key() {
        let p = SchnorrProvider;
        let kp = p.generate().unwrap();
        assert_eq!(kp.public_key().len(), SCHNORR_PK_LEN);
        let mut s = p.signer(&kp, SignMode::Sign).unwrap();
        s.update(b"bip340");
        let sig = s.sign().unwrap();
        assert_eq!(sig.len(), SCHNORR_SIG_LEN);

        let mut v = p.signer(&kp.to_public_only(), SignMode::Verify).unwrap();
        v.update(b"bip340");
        assert!(v.verify(&sig));
        v.update(b"bip341");
        assert!(!v.verify(&sig));
    }

    #[test]
    fn reset_discards_absorbed_input() {
        let p = SchnorrProvider;
        let kp = p.generate().unwrap();
        let mut s = p.signer(&kp, SignMode::Sign).unwrap();
        s.update(b"junk");
        s.reset();
        s.update(b"msg");
        let sig = s.sign().unwrap();
        let mut v = p.signer(&kp, SignMode::Verify).unwrap();
        v.update(b"msg");
        assert!(v.verify(&sig));
    }
}
