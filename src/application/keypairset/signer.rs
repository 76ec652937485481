//! Chained composite signatures.
//!
//! Constituent `i > 0` absorbs the signature of constituent `i - 1` before
//! signing, so each later signature covers every earlier one. Verification
//! replays the chain with the *decoded* previous signatures.

use crate::adapters::primitive::provider_for;
use crate::domain::keypairset::{KeyPairSet, KeyPairSetError, KeyPairSetSpec};
use crate::ports::primitive::{PrimitiveSigner, SignMode};
use crate::protocol::wire::SignatureMessage;
use tracing::{debug, warn};

pub struct KeyPairSetSigner {
    spec: KeyPairSetSpec,
    mode: SignMode,
    engines: Vec<Box<dyn PrimitiveSigner>>,
}

impl KeyPairSetSigner {
    /// Signer for composite kind `spec` over `set`.
    ///
    /// # Errors
    /// `MismatchedSpec` if `set` is of another kind, `UnsupportedSpec` if the
    /// kind cannot sign, `PublicOnly` when signing with a public-only set.
    pub fn new(spec: KeyPairSetSpec, set: &KeyPairSet, mode: SignMode) -> Result<Self, KeyPairSetError> {
        set.check_spec(spec)?;
        if !spec.can_sign() {
            return Err(KeyPairSetError::UnsupportedSpec(format!(
                "{spec} does not support signing"
            )));
        }
        if mode == SignMode::Sign {
            set.require_private()?;
        }
        let engines = set
            .pairs()
            .iter()
            .map(|pair| provider_for(pair.spec()).signer(pair, mode))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(spec = %spec, ?mode, "signer initialised");
        Ok(Self {
            spec,
            mode,
            engines,
        })
    }

    /// # Errors
    /// See [`KeyPairSetSigner::new`].
    pub fn for_signing(set: &KeyPairSet) -> Result<Self, KeyPairSetError> {
        Self::new(set.spec(), set, SignMode::Sign)
    }

    /// # Errors
    /// See [`KeyPairSetSigner::new`].
    pub fn for_verification(set: &KeyPairSet) -> Result<Self, KeyPairSetError> {
        Self::new(set.spec(), set, SignMode::Verify)
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn mode(&self) -> SignMode {
        self.mode
    }

    pub fn update(&mut self, data: &[u8]) {
        for engine in &mut self.engines {
            engine.update(data);
        }
    }

    pub fn update_byte(&mut self, byte: u8) {
        self.update(&[byte]);
    }

    pub fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    /// Sign everything absorbed since the last reset and return an encoded
    /// signature message. The signer is reset afterwards, even on failure.
    ///
    /// # Errors
    /// `Primitive` if a constituent fails, or an encoding error.
    pub fn sign(&mut self) -> Result<Vec<u8>, KeyPairSetError> {
        let out = self.sign_chain();
        self.reset();
        let signatures = out?;
        Ok(SignatureMessage::new(self.spec, signatures)?.encode()?)
    }

    fn sign_chain(&mut self) -> Result<Vec<Vec<u8>>, KeyPairSetError> {
        let mut signatures: Vec<Vec<u8>> = Vec::with_capacity(self.engines.len());
        for (i, engine) in self.engines.iter_mut().enumerate() {
            if let Some(prev) = i.checked_sub(1).map(|p| &signatures[p]) {
                engine.update(prev);
            }
            signatures.push(engine.sign()?);
        }
        Ok(signatures)
    }

    /// Per-constituent verdicts for an encoded signature message.
    ///
    /// Every constituent is evaluated regardless of earlier failures. The
    /// signer is reset afterwards.
    ///
    /// # Errors
    /// `Decode` for malformed bytes, `MismatchedSpec` if the message is of
    /// another kind.
    pub fn verify_detailed(&mut self, signature: &[u8]) -> Result<Vec<bool>, KeyPairSetError> {
        let message = match SignatureMessage::decode(signature) {
            Ok(m) => m,
            Err(e) => {
                self.reset();
                return Err(e.into());
            }
        };
        if message.spec() != self.spec {
            self.reset();
            return Err(KeyPairSetError::MismatchedSpec {
                expected: self.spec,
                actual: message.spec(),
            });
        }
        let blobs = message.signatures();
        let verdicts: Vec<bool> = self
            .engines
            .iter_mut()
            .enumerate()
            .map(|(i, engine)| {
                if i > 0 {
                    engine.update(blobs[i - 1].as_bytes());
                }
                engine.verify(blobs[i].as_bytes())
            })
            .collect();
        self.reset();
        Ok(verdicts)
    }

    /// `true` iff every constituent signature verifies.
    ///
    /// # Errors
    /// See [`KeyPairSetSigner::verify_detailed`].
    pub fn verify(&mut self, signature: &[u8]) -> Result<bool, KeyPairSetError> {
        let verdicts = self.verify_detailed(signature)?;
        let ok = verdicts.iter().fold(true, |acc, v| acc & v);
        if !ok {
            let failed: Vec<usize> = verdicts
                .iter()
                .enumerate()
                .filter_map(|(i, v)| (!v).then_some(i))
                .collect();
            warn!(spec = %self.spec, ?failed, "composite signature rejected");
        }
        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mk_set;
    use crate::protocol::wire::SignatureMessage;

    #[test]
    fn sign_then_verify_every_signing_kind() {
        for spec in KeyPairSetSpec::ALL.into_iter().filter(|s| s.can_sign()) {
            let keys = mk_set(spec);
            let mut s = KeyPairSetSigner::for_signing(&keys).unwrap();
            s.update(b"hel");
            s.update_byte(b'l');
            s.update_byte(b'o');
            let sig = s.sign().unwrap();
            assert_eq!(
                SignatureMessage::decode(&sig).unwrap().signatures().len(),
                spec.num_key_pairs()
            );

            let mut v = KeyPairSetSigner::for_verification(&keys.public_only()).unwrap();
            v.update(b"hello");
            assert!(v.verify(&sig).unwrap(), "{spec}");
        }
    }

    #[test]
    fn signer_is_reusable_after_sign() {
        let keys = mk_set(KeyPairSetSpec::Sign2);
        let mut s = KeyPairSetSigner::for_signing(&keys).unwrap();
        s.update(b"first");
        let first = s.sign().unwrap();
        s.update(b"second");
        let second = s.sign().unwrap();
        let mut v = KeyPairSetSigner::for_verification(&keys).unwrap();
        v.update(b"second");
        assert!(v.verify(&second).unwrap());
        v.update(b"second");
        assert!(!v.verify(&first).unwrap());
    }

    #[test]
    fn reset_discards_pending_input() {
        let keys = mk_set(KeyPairSetSpec::Sign3);
        let mut s = KeyPairSetSigner::for_signing(&keys).unwrap();
        s.update(b"noise");
        s.reset();
        s.update(b"msg");
        let sig = s.sign().unwrap();
        let mut v = KeyPairSetSigner::for_verification(&keys).unwrap();
        v.update(b"msg");
        assert!(v.verify(&sig).unwrap());
    }

    #[test]
    fn non_signing_kind_and_public_only_signing_are_rejected() {
        let agree = mk_set(KeyPairSetSpec::Agree2);
        assert!(matches!(
            KeyPairSetSigner::for_signing(&agree),
            Err(KeyPairSetError::UnsupportedSpec(_))
        ));
        let keys = mk_set(KeyPairSetSpec::Sign2).public_only();
        assert!(matches!(
            KeyPairSetSigner::for_signing(&keys),
            Err(KeyPairSetError::PublicOnly)
        ));
        let other = mk_set(KeyPairSetSpec::Sign3);
        assert!(matches!(
            KeyPairSetSigner::new(KeyPairSetSpec::Sign2, &other, SignMode::Verify),
            Err(KeyPairSetError::MismatchedSpec { .. })
        ));
    }

    #[test]
    fn signature_of_another_kind_is_mismatched() {
        let a = mk_set(KeyPairSetSpec::Sign2);
        let b = mk_set(KeyPairSetSpec::Unified1);
        let mut s = KeyPairSetSigner::for_signing(&b).unwrap();
        s.update(b"x");
        let sig = s.sign().unwrap();
        let mut v = KeyPairSetSigner::for_verification(&a).unwrap();
        v.update(b"x");
        assert!(matches!(
            v.verify(&sig),
            Err(KeyPairSetError::MismatchedSpec { .. })
        ));
    }
}
