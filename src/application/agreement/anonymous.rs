//! One-message agreement against a static key pair set.
//!
//! The initiator generates an ephemeral pair per constituent, runs DH against
//! the target's static public keys and sends the ephemeral publics. The
//! target replays the same DHs with its static private keys. Neither side is
//! authenticated to the other beyond possession of the target's private set.

use super::{
    Ikms, agreement_from_message, assemble, check_flavour, check_state, context, decode_for, dh, ephemerals,
    public_parts, require_bare,
};
use crate::core::crypto::secret::AgreementSecret;
use crate::domain::keypairset::{
    AgreementStatus, AgreementType, KeyPairSet, KeyPairSetAgreementSpec, KeyPairSetError,
};
use crate::protocol::wire::AgreementMessage;
use tracing::debug;

enum State {
    Clean,
    Done(AgreementSecret),
}

pub struct AnonymousAgreement {
    agreement: KeyPairSetAgreementSpec,
    state: State,
}

impl AnonymousAgreement {
    /// # Errors
    /// `UnsupportedSpec` unless `agreement` is an anonymous agreement.
    pub fn new(agreement: KeyPairSetAgreementSpec) -> Result<Self, KeyPairSetError> {
        check_flavour(&agreement, AgreementType::Anonymous)?;
        Ok(Self {
            agreement,
            state: State::Clean,
        })
    }

    /// Responder session whose parameters are the ones the initiator's message carries.
    /// Answer it with [`Self::accept`] on the same bytes.
    ///
    /// # Errors
    /// `Decode` for a malformed message, `UnsupportedSpec` unless it asks for
    /// an anonymous agreement.
    pub fn for_client_hello(message: &[u8]) -> Result<Self, KeyPairSetError> {
        Self::new(agreement_from_message(message, AgreementType::Anonymous)?)
    }

    #[must_use]
    pub fn agreement_spec(&self) -> KeyPairSetAgreementSpec {
        self.agreement
    }

    #[must_use]
    pub fn status(&self) -> AgreementStatus {
        match self.state {
            State::Clean => AgreementStatus::Clean,
            State::Done(_) => AgreementStatus::Done,
        }
    }

    /// Run the initiator side against `target` (public halves suffice) and
    /// return the message to send.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, `MismatchedSpec` for a target of
    /// another kind, or a primitive failure.
    pub fn initiate(&mut self, target: &KeyPairSet) -> Result<Vec<u8>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        target.check_spec(self.agreement.spec())?;

        let eph = ephemerals(self.agreement.spec())?;
        let ikms = eph
            .iter()
            .zip(target.pairs())
            .map(|(e, t)| dh(e, t.public_key()))
            .collect::<Result<Ikms, _>>()?;
        let msg = AgreementMessage::new(self.agreement, public_parts(&eph))?;
        let bytes = msg.encode()?;
        let secret = assemble(&self.agreement, &ikms, &context(&self.agreement, &bytes)?)?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, "anonymous agreement initiated");
        Ok(bytes)
    }

    /// Run the target side with the private set the initiator aimed at.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, `PublicOnly` without private keys,
    /// `MismatchedSpec` / `UnsupportedSpec` / `Decode` for a foreign or
    /// malformed message.
    pub fn accept(&mut self, target: &KeyPairSet, message: &[u8]) -> Result<(), KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        target.check_spec(self.agreement.spec())?;
        target.require_private()?;

        let msg = decode_for(&self.agreement, message)?;
        require_bare(&msg)?;
        let ikms = target
            .pairs()
            .iter()
            .zip(msg.parts())
            .map(|(t, part)| dh(t, part.as_bytes()))
            .collect::<Result<Ikms, _>>()?;
        let secret = assemble(&self.agreement, &ikms, &context(&self.agreement, &msg.encode()?)?)?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, "anonymous agreement accepted");
        Ok(())
    }

    /// # Errors
    /// `ProtocolState` until the agreement is done.
    pub fn result(&self) -> Result<&AgreementSecret, KeyPairSetError> {
        match &self.state {
            State::Done(secret) => Ok(secret),
            State::Clean => Err(KeyPairSetError::ProtocolState {
                expected: AgreementStatus::Done,
                actual: AgreementStatus::Clean,
            }),
        }
    }

    /// Wipe any secret material and return to `Clean`.
    pub fn destroy(&mut self) {
        self.state = State::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::keypairset::KeyPairSetFactory;
    use crate::domain::keypairset::{KdfSpec, KeyPairSetSpec};
    use crate::domain::keypairset::params::{KDF_RESULT_LEN, PARTIAL_SECRET_LEN};
    use crate::test_support::mk_agreement;

    fn spec(kdf: KdfSpec) -> KeyPairSetAgreementSpec {
        mk_agreement(KeyPairSetSpec::Agree2, AgreementType::Anonymous, kdf, false)
    }

    #[test]
    fn both_sides_agree() {
        for kdf in KdfSpec::ALL {
            let target = KeyPairSetFactory::global().generate(KeyPairSetSpec::Agree2).unwrap();
            let mut a = AnonymousAgreement::new(spec(kdf)).unwrap();
            let mut b = AnonymousAgreement::new(spec(kdf)).unwrap();
            let msg = a.initiate(&target.public_only()).unwrap();
            b.accept(&target, &msg).unwrap();
            assert_eq!(a.status(), AgreementStatus::Done);
            let (sa, sb) = (a.result().unwrap(), b.result().unwrap());
            assert_eq!(sa.as_bytes(), sb.as_bytes());
            let expected = match kdf {
                KdfSpec::None => 2 * PARTIAL_SECRET_LEN,
                _ => KDF_RESULT_LEN,
            };
            assert_eq!(sa.len(), expected);
        }
    }

    #[test]
    fn responder_takes_parameters_from_the_message() {
        let target = KeyPairSetFactory::global().generate(KeyPairSetSpec::Agree2).unwrap();
        let mut a = AnonymousAgreement::new(spec(KdfSpec::Sha256Kdf)).unwrap();
        let msg = a.initiate(&target.public_only()).unwrap();

        let mut b = AnonymousAgreement::for_client_hello(&msg).unwrap();
        assert_eq!(b.agreement_spec(), spec(KdfSpec::Sha256Kdf));
        b.accept(&target, &msg).unwrap();
        assert_eq!(a.result().unwrap().as_bytes(), b.result().unwrap().as_bytes());

        // A responder pinned to other parameters still refuses.
        let mut pinned = AnonymousAgreement::new(spec(KdfSpec::Sha384Kdf)).unwrap();
        assert!(matches!(
            pinned.accept(&target, &msg),
            Err(KeyPairSetError::UnsupportedSpec(_))
        ));
    }

    #[test]
    fn responder_refuses_a_message_of_another_flavour() {
        let handshake = mk_agreement(KeyPairSetSpec::Agree2, AgreementType::Handshake, KdfSpec::None, false);
        let bytes = AgreementMessage::new(handshake, vec![vec![9; 32], vec![2; 33]])
            .unwrap()
            .encode()
            .unwrap();
        assert!(matches!(
            AnonymousAgreement::for_client_hello(&bytes),
            Err(KeyPairSetError::UnsupportedSpec(_))
        ));
        assert!(matches!(
            AnonymousAgreement::for_client_hello(&bytes[1..]),
            Err(KeyPairSetError::Decode(_))
        ));
    }

    #[test]
    fn wrong_target_disagrees() {
        let factory = KeyPairSetFactory::global();
        let target = factory.generate(KeyPairSetSpec::Agree2).unwrap();
        let other = factory.generate(KeyPairSetSpec::Agree2).unwrap();
        let mut a = AnonymousAgreement::new(spec(KdfSpec::None)).unwrap();
        let mut b = AnonymousAgreement::new(spec(KdfSpec::None)).unwrap();
        let msg = a.initiate(&target).unwrap();
        b.accept(&other, &msg).unwrap();
        assert_ne!(a.result().unwrap().as_bytes(), b.result().unwrap().as_bytes());
    }

    #[test]
    fn state_is_enforced_and_destroy_resets() {
        let target = KeyPairSetFactory::global().generate(KeyPairSetSpec::Unified1).unwrap();
        let agreement = KeyPairSetAgreementSpec::new(
            KeyPairSetSpec::Unified1,
            AgreementType::Anonymous,
            KdfSpec::Sha256Kdf,
            false,
        )
        .unwrap();
        let mut a = AnonymousAgreement::new(agreement).unwrap();
        assert!(matches!(a.result(), Err(KeyPairSetError::ProtocolState { .. })));
        a.initiate(&target).unwrap();
        assert!(matches!(
            a.initiate(&target),
            Err(KeyPairSetError::ProtocolState { .. })
        ));
        a.destroy();
        assert_eq!(a.status(), AgreementStatus::Clean);
        assert!(a.result().is_err());
    }

    #[test]
    fn other_flavours_and_kinds_are_rejected() {
        let handshake = KeyPairSetAgreementSpec::new(
            KeyPairSetSpec::Agree2,
            AgreementType::Handshake,
            KdfSpec::None,
            false,
        )
        .unwrap();
        assert!(AnonymousAgreement::new(handshake).is_err());

        let unified = KeyPairSetFactory::global().generate(KeyPairSetSpec::Unified1).unwrap();
        let mut a = AnonymousAgreement::new(spec(KdfSpec::None)).unwrap();
        assert!(matches!(
            a.initiate(&unified),
            Err(KeyPairSetError::MismatchedSpec { .. })
        ));
        assert_eq!(a.status(), AgreementStatus::Clean);
    }

    #[test]
    fn kdf_mismatch_is_unsupported() {
        let target = KeyPairSetFactory::global().generate(KeyPairSetSpec::Agree2).unwrap();
        let mut a = AnonymousAgreement::new(spec(KdfSpec::Sha256Kdf)).unwrap();
        let mut b = AnonymousAgreement::new(spec(KdfSpec::Sha384Kdf)).unwrap();
        let msg = a.initiate(&target).unwrap();
        assert!(matches!(
            b.accept(&target, &msg),
            Err(KeyPairSetError::UnsupportedSpec(_))
        ));
        assert_eq!(b.status(), AgreementStatus::Clean);
    }

    #[test]
    fn public_only_target_cannot_accept() {
        let target = KeyPairSetFactory::global().generate(KeyPairSetSpec::Agree2).unwrap();
        let mut a = AnonymousAgreement::new(spec(KdfSpec::None)).unwrap();
        let msg = a.initiate(&target).unwrap();
        let mut b = AnonymousAgreement::new(spec(KdfSpec::None)).unwrap();
        assert!(matches!(
            b.accept(&target.public_only(), &msg),
            Err(KeyPairSetError::PublicOnly)
        ));
    }
}
