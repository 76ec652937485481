// src/adapters/primitive/secp256k1.rs
use super::ecies::EciesEncryptor;
use super::fixed;
use crate::domain::keypairset::params::{ECDSA_SIG_LEN, SECP256K1_PK_LEN, SECP256K1_SK_LEN};
use crate::domain::keypairset::{PrimitiveKeyPair, PrimitiveSpec, PrivateKeyBytes};
use crate::ports::primitive::{
    CipherMode, PrimitiveEncryptor, PrimitiveError, PrimitiveProvider, PrimitiveSigner, SignMode,
};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const SPEC: PrimitiveSpec = PrimitiveSpec::Secp256k1;

/// secp256k1: ECDSA over a SHA-256 prehash, ECDH, and ECIES.
///
/// Public keys are 33-byte compressed SEC1 points; private keys are 32-byte
/// big-endian scalars. The same pair serves all three capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Provider;

fn parse_public(public: &[u8]) -> Result<PublicKey, PrimitiveError> {
    if public.len() != SECP256K1_PK_LEN {
        return Err(PrimitiveError::InvalidPublicKey(SPEC));
    }
    PublicKey::from_sec1_bytes(public).map_err(|_| PrimitiveError::InvalidPublicKey(SPEC))
}

fn parse_private(private: &[u8]) -> Result<SecretKey, PrimitiveError> {
    let bytes: Zeroizing<[u8; SECP256K1_SK_LEN]> =
        Zeroizing::new(fixed(private, PrimitiveError::InvalidPrivateKey(SPEC))?);
    SecretKey::from_slice(&bytes[..]).map_err(|_| PrimitiveError::InvalidPrivateKey(SPEC))
}

fn encode_public(pk: &PublicKey) -> Vec<u8> {
    pk.to_encoded_point(true).as_bytes().to_vec()
}

fn pair_of(sk: &SecretKey) -> PrimitiveKeyPair {
    PrimitiveKeyPair::new(
        SPEC,
        encode_public(&sk.public_key()),
        Some(PrivateKeyBytes::new(sk.to_bytes().to_vec())),
    )
}

impl PrimitiveProvider for Secp256k1Provider {
    fn spec(&self) -> PrimitiveSpec {
        SPEC
    }

    fn public_key_len(&self) -> usize {
        SECP256K1_PK_LEN
    }

    fn generate(&self) -> Result<PrimitiveKeyPair, PrimitiveError> {
        Ok(pair_of(&SecretKey::random(&mut OsRng)))
    }

    fn derive(&self, public: &[u8], private: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let pk = parse_public(public)?;
        let sk = parse_private(private)?;
        if sk.public_key() != pk {
            return Err(PrimitiveError::KeyMismatch(SPEC));
        }
        Ok(pair_of(&sk))
    }

    fn derive_public_only(&self, public: &[u8]) -> Result<PrimitiveKeyPair, PrimitiveError> {
        let pk = parse_public(public)?;
        Ok(PrimitiveKeyPair::new(SPEC, encode_public(&pk), None))
    }

    fn signer(
        &self,
        pair: &PrimitiveKeyPair,
        mode: SignMode,
    ) -> Result<Box<dyn PrimitiveSigner>, PrimitiveError> {
        let verifying = VerifyingKey::from(parse_public(pair.public_key())?);
        let signing = match mode {
            SignMode::Verify => None,
            SignMode::Sign => {
                let private = pair
                    .private_key()
                    .ok_or(PrimitiveError::MissingPrivateKey(SPEC))?;
                Some(SigningKey::from(parse_private(private.as_bytes())?))
            }
        };
        Ok(Box::new(EcdsaSigner {
            digest: Sha256::new(),
            signing,
            verifying,
        }))
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
        let shared = k256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
        Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
    }
}

struct EcdsaSigner {
    digest: Sha256,
    signing: Option<SigningKey>,
    verifying: VerifyingKey,
}

impl PrimitiveSigner for EcdsaSigner {
    fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.digest);
    }

    fn sign(&mut self) -> Result<Vec<u8>, PrimitiveError> {
        let prehash = self.digest.finalize_reset();
        let sk = self.signing.as_ref().ok_or(PrimitiveError::WrongMode {
            spec: SPEC,
            mode: "verification",
        })?;
        let sig: Signature = sk
            .sign_prehash(&prehash)
            .map_err(|_| PrimitiveError::Signing(SPEC))?;
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&mut self, signature: &[u8]) -> bool {
        let prehash = self.digest.finalize_reset();
        if signature.len() != ECDSA_SIG_LEN {
            return false;
        }
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        self.verifying.verify_prehash(&prehash, &sig).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_is_compressed_sec1() {
        let kp = Secp256k1Provider.generate().unwrap();
        assert_eq!(kp.public_key().len(), SECP256K1_PK_LEN);
        assert!(matches!(kp.public_key()[0], 0x02 | 0x03));
    }

    #[test]
    fn ecdsa_sign_verify() {
        let p = Secp256k1Provider;
        let kp = p.generate().unwrap();
        let mut s = p.signer(&kp, SignMode::Sign).unwrap();
        s.update(b"hello");
        let sig = s.sign().unwrap();
        assert_eq!(sig.len(), ECDSA_SIG_LEN);

        let mut v = p.signer(&kp.to_public_only(), SignMode::Verify).unwrap();
        v.update(b"hello");
        assert!(v.verify(&sig));

        let mut bad = sig.clone();
        bad[10] ^= 0x01;
        v.update(b"hello");
        assert!(!v.verify(&bad));
    }

    #[test]
    fn ecies_round_trip_and_wrong_key() {
        let p = Secp256k1Provider;
        let kp = p.generate().unwrap();
        let other = p.generate().unwrap();
        let mut enc = p.encryptor(&kp.to_public_only(), CipherMode::Encrypt).unwrap();
        let ct = enc.encrypt(b"secret payload").unwrap();
        let mut dec = p.encryptor(&kp, CipherMode::Decrypt).unwrap();
        assert_eq!(dec.decrypt(&ct).unwrap(), b"secret payload");
        let mut wrong = p.encryptor(&other, CipherMode::Decrypt).unwrap();
        assert!(wrong.decrypt(&ct).is_err());
    }
}
