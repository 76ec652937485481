//! Mutually authenticated agreement between two static key pair sets.
//!
//! Per constituent the keying material is `DH(eph, eph') || DH(static,
//! static')`, so only holders of both static private sets can derive the
//! secret. Everything derived is bound to the transcript `hello || reply`.
//!
//! With confirmation the exchange gains a third message:
//!
//! ```text
//! client                                   server
//!   create_client_hello     -- hello -->     accept_client_hello
//!   accept_server_hello     <-- reply --     (server tags, deferred)
//!     verify server tags
//!                           -- confirm -->   accept_client_confirm
//! ```
//!
//! Tags are HMAC-SHA-384 over a role label and the context, keyed per
//! constituent by a confirmation key derived from `ikm_i`. The client
//! reveals its tags only after every server tag checked out, and the server
//! assembles its secret only after every client tag checked out.

use super::{
    Ikms, agreement_from_message, assemble, check_flavour, check_state, concat_ikms, context, decode_for, dh, ephemerals,
    public_parts, require_bare,
};
use crate::core::crypto::hkdf::{HkdfError, derive_confirm_key};
use crate::core::crypto::secret::AgreementSecret;
use crate::domain::keypairset::{
    AgreementStatus, AgreementType, KeyPairSet, KeyPairSetAgreementSpec, KeyPairSetError,
    PrimitiveKeyPair,
};
use crate::ports::primitive::PrimitiveError;
use crate::protocol::wire::{AgreementMessage, Blob, DecodeError};
use hmac::{Hmac, Mac};
use sha2::Sha384;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

type HmacSha384 = Hmac<Sha384>;

const SERVER_LABEL: &[u8] = b"server";
const CLIENT_LABEL: &[u8] = b"client";

enum State {
    Clean,
    AwaitingServerHello {
        client_static: KeyPairSet,
        ephemerals: Vec<PrimitiveKeyPair>,
        hello: Vec<u8>,
    },
    AwaitingClientConfirm {
        ikms: Ikms,
        context: Zeroizing<Vec<u8>>,
    },
    Done(AgreementSecret),
}

fn tag_mac(ikm: &[u8], context: &[u8], index: usize, label: &[u8]) -> Result<HmacSha384, KeyPairSetError> {
    let index = u8::try_from(index)
        .map_err(|_| KeyPairSetError::InvalidKeyPairSet(format!("constituent index {index} out of range")))?;
    let key = derive_confirm_key(ikm, context, index).map_err(PrimitiveError::from)?;
    let mut mac = <HmacSha384 as Mac>::new_from_slice(&key[..])
        .map_err(|_| PrimitiveError::Kdf(HkdfError::InvalidPrk))?;
    mac.update(label);
    mac.update(context);
    Ok(mac)
}

fn make_tags(ikms: &Ikms, context: &[u8], label: &[u8]) -> Result<Vec<Vec<u8>>, KeyPairSetError> {
    ikms.iter()
        .enumerate()
        .map(|(i, ikm)| -> Result<Vec<u8>, KeyPairSetError> {
            Ok(tag_mac(ikm, context, i, label)?.finalize().into_bytes().to_vec())
        })
        .collect()
}

/// Check every tag, then AND the verdicts.
fn verify_tags(ikms: &Ikms, context: &[u8], label: &[u8], tags: &[Blob]) -> Result<bool, KeyPairSetError> {
    let mut ok = true;
    for (i, (ikm, tag)) in ikms.iter().zip(tags).enumerate() {
        let verdict = tag_mac(ikm, context, i, label)?.verify_slice(tag.as_bytes()).is_ok();
        trace!(index = i, verdict, "confirmation tag checked");
        ok &= verdict;
    }
    Ok(ok)
}

fn transcript(hello: &[u8], reply: &AgreementMessage) -> Result<Vec<u8>, KeyPairSetError> {
    let mut t = hello.to_vec();
    t.extend_from_slice(&reply.unauthenticated_bytes()?);
    Ok(t)
}

fn static_ikms(own: &KeyPairSet, peer: &KeyPairSet) -> Result<Ikms, KeyPairSetError> {
    own.pairs()
        .iter()
        .zip(peer.pairs())
        .map(|(o, p)| dh(o, p.public_key()))
        .collect()
}

fn ephemeral_ikms(own: &[PrimitiveKeyPair], peer: &[Blob]) -> Result<Ikms, KeyPairSetError> {
    own.iter()
        .zip(peer)
        .map(|(o, p)| dh(o, p.as_bytes()))
        .collect()
}

pub struct HandshakeAgreement {
    agreement: KeyPairSetAgreementSpec,
    state: State,
}

impl HandshakeAgreement {
    /// # Errors
    /// `UnsupportedSpec` unless `agreement` is a handshake agreement.
    pub fn new(agreement: KeyPairSetAgreementSpec) -> Result<Self, KeyPairSetError> {
        check_flavour(&agreement, AgreementType::Handshake)?;
        Ok(Self {
            agreement,
            state: State::Clean,
        })
    }

    /// Responder session whose parameters are the ones the client hello carries.
    /// Answer it with [`Self::accept_client_hello`] on the same bytes.
    ///
    /// # Errors
    /// `Decode` for a malformed message, `UnsupportedSpec` unless it asks for
    /// a handshake agreement.
    pub fn for_client_hello(hello: &[u8]) -> Result<Self, KeyPairSetError> {
        Self::new(agreement_from_message(hello, AgreementType::Handshake)?)
    }

    #[must_use]
    pub fn agreement_spec(&self) -> KeyPairSetAgreementSpec {
        self.agreement
    }

    #[must_use]
    pub fn status(&self) -> AgreementStatus {
        match self.state {
            State::Clean => AgreementStatus::Clean,
            State::AwaitingServerHello { .. } => AgreementStatus::AwaitingServerHello,
            State::AwaitingClientConfirm { .. } => AgreementStatus::AwaitingClientConfirm,
            State::Done(_) => AgreementStatus::Done,
        }
    }

    fn check_static(&self, set: &KeyPairSet, private: bool) -> Result<(), KeyPairSetError> {
        set.check_spec(self.agreement.spec())?;
        if private {
            set.require_private()?;
        }
        Ok(())
    }

    /// Client: remember `client_static` and return the hello.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, `MismatchedSpec` / `PublicOnly` for an
    /// unusable static set, or a primitive failure.
    pub fn create_client_hello(&mut self, client_static: &KeyPairSet) -> Result<Vec<u8>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        self.check_static(client_static, true)?;
        let eph = ephemerals(self.agreement.spec())?;
        let hello = AgreementMessage::new(self.agreement, public_parts(&eph))?.encode()?;
        self.state = State::AwaitingServerHello {
            client_static: client_static.clone(),
            ephemerals: eph,
            hello: hello.clone(),
        };
        debug!(agreement = %self.agreement, "handshake client hello created");
        Ok(hello)
    }

    /// Server: answer `hello` from the holder of `client_public`.
    ///
    /// Without confirmation the server is done once this returns. With it,
    /// the reply carries the server tags and the session waits in
    /// `AwaitingClientConfirm`.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, `MismatchedSpec` / `PublicOnly` for
    /// unusable static sets, or a decode / primitive failure.
    pub fn accept_client_hello(
        &mut self,
        client_public: &KeyPairSet,
        server_static: &KeyPairSet,
        hello: &[u8],
    ) -> Result<Vec<u8>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        self.check_static(client_public, false)?;
        self.check_static(server_static, true)?;
        let client = decode_for(&self.agreement, hello)?;
        require_bare(&client)?;

        let eph = ephemerals(self.agreement.spec())?;
        let ikms = concat_ikms(
            ephemeral_ikms(&eph, client.parts())?,
            static_ikms(server_static, client_public)?,
        );
        let reply = AgreementMessage::new(self.agreement, public_parts(&eph))?;
        let ctx = Zeroizing::new(context(&self.agreement, &transcript(hello, &reply)?)?);

        if self.agreement.with_confirm() {
            let tags = make_tags(&ikms, &ctx, SERVER_LABEL)?;
            let bytes = reply.with_confirm_tags(tags)?.encode()?;
            self.state = State::AwaitingClientConfirm { ikms, context: ctx };
            debug!(agreement = %self.agreement, "handshake server hello sent, awaiting confirmation");
            Ok(bytes)
        } else {
            let secret = assemble(&self.agreement, &ikms, &ctx)?;
            let bytes = reply.encode()?;
            self.state = State::Done(secret);
            debug!(agreement = %self.agreement, "handshake server done");
            Ok(bytes)
        }
    }

    /// Client: process the server reply from the holder of `server_public`.
    ///
    /// Returns the confirmation message to send when the agreement requires
    /// one. The client is done once this returns.
    ///
    /// # Errors
    /// `ProtocolState` unless awaiting the server hello,
    /// `VerificationFailed` for missing or wrong server tags, `Decode` for
    /// tags on an unconfirmed agreement. The session is unchanged on error.
    pub fn accept_server_hello(
        &mut self,
        server_public: &KeyPairSet,
        reply: &[u8],
    ) -> Result<Option<Vec<u8>>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::AwaitingServerHello)?;
        let State::AwaitingServerHello {
            client_static,
            ephemerals: eph,
            hello,
        } = &self.state
        else {
            return Err(KeyPairSetError::ProtocolState {
                expected: AgreementStatus::AwaitingServerHello,
                actual: self.status(),
            });
        };
        self.check_static(server_public, false)?;
        let server = decode_for(&self.agreement, reply)?;
        if server.signature().is_some() {
            return Err(DecodeError::Malformed("handshake reply carries a signature".into()).into());
        }
        let confirm = self.agreement.with_confirm();
        let tags = match (confirm, server.confirm_tags()) {
            (true, Some(tags)) => Some(tags),
            (false, None) => None,
            (true, None) => {
                warn!(agreement = %self.agreement, "server hello lacks confirmation tags");
                return Err(KeyPairSetError::VerificationFailed(
                    "server confirmation tags missing".into(),
                ));
            }
            (false, Some(_)) => {
                return Err(DecodeError::Malformed("unexpected confirmation tags".into()).into());
            }
        };

        let ikms = concat_ikms(
            ephemeral_ikms(eph, server.parts())?,
            static_ikms(client_static, server_public)?,
        );
        let ctx = Zeroizing::new(context(&self.agreement, &transcript(hello, &server)?)?);

        let confirmation = match tags {
            Some(tags) => {
                if !verify_tags(&ikms, &ctx, SERVER_LABEL, tags)? {
                    warn!(agreement = %self.agreement, "server confirmation rejected");
                    return Err(KeyPairSetError::VerificationFailed(
                        "server confirmation tags".into(),
                    ));
                }
                let ours = make_tags(&ikms, &ctx, CLIENT_LABEL)?;
                Some(AgreementMessage::new(self.agreement, ours)?.encode()?)
            }
            None => None,
        };
        let secret = assemble(&self.agreement, &ikms, &ctx)?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, confirmed = confirm, "handshake client done");
        Ok(confirmation)
    }

    /// Server: check the client's confirmation and assemble the secret.
    ///
    /// # Errors
    /// `ProtocolState` unless awaiting confirmation, `VerificationFailed`
    /// for wrong tags, or a decode failure. The session is unchanged on
    /// error.
    pub fn accept_client_confirm(&mut self, confirm: &[u8]) -> Result<(), KeyPairSetError> {
        check_state(self.status(), AgreementStatus::AwaitingClientConfirm)?;
        let State::AwaitingClientConfirm { ikms, context: ctx } = &self.state else {
            return Err(KeyPairSetError::ProtocolState {
                expected: AgreementStatus::AwaitingClientConfirm,
                actual: self.status(),
            });
        };
        let msg = decode_for(&self.agreement, confirm)?;
        require_bare(&msg)?;
        if !verify_tags(ikms, ctx, CLIENT_LABEL, msg.parts())? {
            warn!(agreement = %self.agreement, "client confirmation rejected");
            return Err(KeyPairSetError::VerificationFailed(
                "client confirmation tags".into(),
            ));
        }
        let secret = assemble(&self.agreement, ikms, ctx)?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, "handshake server done");
        Ok(())
    }

    /// # Errors
    /// `ProtocolState` until the agreement is done.
    pub fn result(&self) -> Result<&AgreementSecret, KeyPairSetError> {
        match &self.state {
            State::Done(secret) => Ok(secret),
            _ => Err(KeyPairSetError::ProtocolState {
                expected: AgreementStatus::Done,
                actual: self.status(),
            }),
        }
    }

    /// Wipe all key material held by the session and return to `Clean`.
    pub fn destroy(&mut self) {
        self.state = State::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::keypairset::KeyPairSetFactory;
    use crate::domain::keypairset::params::CONFIRM_TAG_LEN;
    use crate::domain::keypairset::{KdfSpec, KeyPairSetSpec};

    fn spec(confirm: bool) -> KeyPairSetAgreementSpec {
        KeyPairSetAgreementSpec::new(
            KeyPairSetSpec::Agree2,
            AgreementType::Handshake,
            KdfSpec::Sha384Kdf,
            confirm,
        )
        .unwrap()
    }

    fn statics() -> (KeyPairSet, KeyPairSet) {
        let f = KeyPairSetFactory::global();
        (
            f.generate(KeyPairSetSpec::Agree2).unwrap(),
            f.generate(KeyPairSetSpec::Agree2).unwrap(),
        )
    }

    #[test]
    fn unconfirmed_exchange_agrees() {
        let (c, s) = statics();
        let mut client = HandshakeAgreement::new(spec(false)).unwrap();
        let mut server = HandshakeAgreement::new(spec(false)).unwrap();
        let hello = client.create_client_hello(&c).unwrap();
        let reply = server
            .accept_client_hello(&c.public_only(), &s, &hello)
            .unwrap();
        assert_eq!(server.status(), AgreementStatus::Done);
        assert!(client.accept_server_hello(&s.public_only(), &reply).unwrap().is_none());
        assert_eq!(
            client.result().unwrap().as_bytes(),
            server.result().unwrap().as_bytes()
        );
    }

    #[test]
    fn server_built_from_an_unconfirmed_hello() {
        let (c, s) = statics();
        let mut client = HandshakeAgreement::new(spec(false)).unwrap();
        let hello = client.create_client_hello(&c).unwrap();

        let mut server = HandshakeAgreement::for_client_hello(&hello).unwrap();
        assert_eq!(server.agreement_spec(), spec(false));
        let reply = server.accept_client_hello(&c.public_only(), &s, &hello).unwrap();
        assert!(client.accept_server_hello(&s.public_only(), &reply).unwrap().is_none());
        assert_eq!(
            client.result().unwrap().as_bytes(),
            server.result().unwrap().as_bytes()
        );
    }

    #[test]
    fn server_built_from_a_confirmed_hello_waits_for_tags() {
        let (c, s) = statics();
        let mut client = HandshakeAgreement::new(spec(true)).unwrap();
        let hello = client.create_client_hello(&c).unwrap();
        let mut server = HandshakeAgreement::for_client_hello(&hello).unwrap();
        let reply = server.accept_client_hello(&c, &s, &hello).unwrap();
        assert_eq!(server.status(), AgreementStatus::AwaitingClientConfirm);
        let confirm = client.accept_server_hello(&s, &reply).unwrap().unwrap();
        server.accept_client_confirm(&confirm).unwrap();
        assert_eq!(
            client.result().unwrap().as_bytes(),
            server.result().unwrap().as_bytes()
        );
    }

    #[test]
    fn confirmed_exchange_agrees_after_three_messages() {
        let (c, s) = statics();
        let mut client = HandshakeAgreement::new(spec(true)).unwrap();
        let mut server = HandshakeAgreement::new(spec(true)).unwrap();
        let hello = client.create_client_hello(&c).unwrap();
        let reply = server.accept_client_hello(&c, &s, &hello).unwrap();
        assert_eq!(server.status(), AgreementStatus::AwaitingClientConfirm);
        assert!(server.result().is_err());
        let tags = AgreementMessage::decode(&reply).unwrap();
        assert!(tags.confirm_tags().unwrap().iter().all(|t| t.len() == CONFIRM_TAG_LEN));

        let confirm = client.accept_server_hello(&s, &reply).unwrap().unwrap();
        assert_eq!(client.status(), AgreementStatus::Done);
        server.accept_client_confirm(&confirm).unwrap();
        assert_eq!(
            client.result().unwrap().as_bytes(),
            server.result().unwrap().as_bytes()
        );
    }

    #[test]
    fn wrong_client_static_fails_confirmation() {
        let (c, s) = statics();
        let (impostor, _) = statics();
        let mut client = HandshakeAgreement::new(spec(true)).unwrap();
        let mut server = HandshakeAgreement::new(spec(true)).unwrap();
        let hello = client.create_client_hello(&impostor).unwrap();
        // server believes it talks to `c`
        let reply = server.accept_client_hello(&c, &s, &hello).unwrap();
        assert!(matches!(
            client.accept_server_hello(&s, &reply),
            Err(KeyPairSetError::VerificationFailed(_))
        ));
        assert_eq!(client.status(), AgreementStatus::AwaitingServerHello);
    }

    #[test]
    fn forged_client_confirm_keeps_server_waiting() {
        let (c, s) = statics();
        let mut client = HandshakeAgreement::new(spec(true)).unwrap();
        let mut server = HandshakeAgreement::new(spec(true)).unwrap();
        let hello = client.create_client_hello(&c).unwrap();
        let _reply = server.accept_client_hello(&c, &s, &hello).unwrap();
        let forged = AgreementMessage::new(spec(true), vec![vec![0; CONFIRM_TAG_LEN]; 2])
            .unwrap()
            .encode()
            .unwrap();
        assert!(matches!(
            server.accept_client_confirm(&forged),
            Err(KeyPairSetError::VerificationFailed(_))
        ));
        assert_eq!(server.status(), AgreementStatus::AwaitingClientConfirm);
    }

    #[test]
    fn out_of_order_calls_are_state_errors() {
        let (c, s) = statics();
        let mut session = HandshakeAgreement::new(spec(true)).unwrap();
        assert!(matches!(
            session.accept_server_hello(&s, &[]),
            Err(KeyPairSetError::ProtocolState { .. })
        ));
        assert!(matches!(
            session.accept_client_confirm(&[]),
            Err(KeyPairSetError::ProtocolState { .. })
        ));
        session.create_client_hello(&c).unwrap();
        assert!(matches!(
            session.create_client_hello(&c),
            Err(KeyPairSetError::ProtocolState { .. })
        ));
        session.destroy();
        assert_eq!(session.status(), AgreementStatus::Clean);
    }

    #[test]
    fn public_only_static_cannot_start() {
        let (c, _) = statics();
        let mut session = HandshakeAgreement::new(spec(false)).unwrap();
        assert!(matches!(
            session.create_client_hello(&c.public_only()),
            Err(KeyPairSetError::PublicOnly)
        ));
    }
}
