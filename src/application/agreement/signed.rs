//! Ephemeral-ephemeral agreement where the server signs the exchange.
//!
//! ```text
//! client                                server
//!   create_client_hello  -- hello -->     accept_client_hello
//!   accept_server_hello  <-- reply --     (signs hello || reply parts)
//! ```
//!
//! The server's composite signature covers the client hello followed by the
//! unauthenticated encoding of its own reply, so the client knows the server
//! ephemerals were chosen by the holder of the server signing set.

use super::{
    Ikms, agreement_from_message, assemble, check_flavour, check_state, context, decode_for, dh, ephemerals,
    public_parts, require_bare,
};
use crate::application::keypairset::KeyPairSetSigner;
use crate::core::crypto::secret::AgreementSecret;
use crate::domain::keypairset::{
    AgreementStatus, AgreementType, KeyPairSet, KeyPairSetAgreementSpec, KeyPairSetError,
    PrimitiveKeyPair,
};
use crate::protocol::wire::{AgreementMessage, DecodeError};
use tracing::{debug, warn};

enum State {
    Clean,
    AwaitingServerHello {
        ephemerals: Vec<PrimitiveKeyPair>,
        hello: Vec<u8>,
    },
    Done(AgreementSecret),
}

pub struct SignedAgreement {
    agreement: KeyPairSetAgreementSpec,
    state: State,
}

fn transcript(hello: &[u8], reply: &AgreementMessage) -> Result<Vec<u8>, KeyPairSetError> {
    let mut t = hello.to_vec();
    t.extend_from_slice(&reply.unauthenticated_bytes()?);
    Ok(t)
}

impl SignedAgreement {
    /// # Errors
    /// `UnsupportedSpec` unless `agreement` is a signed agreement.
    pub fn new(agreement: KeyPairSetAgreementSpec) -> Result<Self, KeyPairSetError> {
        check_flavour(&agreement, AgreementType::Signed)?;
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
    /// a signed agreement.
    pub fn for_client_hello(hello: &[u8]) -> Result<Self, KeyPairSetError> {
        Self::new(agreement_from_message(hello, AgreementType::Signed)?)
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
            State::Done(_) => AgreementStatus::Done,
        }
    }

    /// Client: generate ephemerals and return the hello.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, or a primitive / encoding failure.
    pub fn create_client_hello(&mut self) -> Result<Vec<u8>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        let eph = ephemerals(self.agreement.spec())?;
        let hello = AgreementMessage::new(self.agreement, public_parts(&eph))?.encode()?;
        self.state = State::AwaitingServerHello {
            ephemerals: eph,
            hello: hello.clone(),
        };
        debug!(agreement = %self.agreement, "client hello created");
        Ok(hello)
    }

    /// Server: answer `hello` with fresh ephemerals signed by
    /// `server_signing_set`. The server is done once this returns.
    ///
    /// # Errors
    /// `ProtocolState` unless clean, `UnsupportedSpec` if the signing set
    /// cannot sign, `PublicOnly` without its private keys, or a decode /
    /// primitive failure.
    pub fn accept_client_hello(
        &mut self,
        server_signing_set: &KeyPairSet,
        hello: &[u8],
    ) -> Result<Vec<u8>, KeyPairSetError> {
        check_state(self.status(), AgreementStatus::Clean)?;
        let mut signer = KeyPairSetSigner::for_signing(server_signing_set)?;
        let client = decode_for(&self.agreement, hello)?;
        require_bare(&client)?;

        let eph = ephemerals(self.agreement.spec())?;
        let ikms = eph
            .iter()
            .zip(client.parts())
            .map(|(e, part)| dh(e, part.as_bytes()))
            .collect::<Result<Ikms, _>>()?;
        let reply = AgreementMessage::new(self.agreement, public_parts(&eph))?;
        let transcript = transcript(hello, &reply)?;
        signer.update(&transcript);
        let signature = signer.sign()?;
        let secret = assemble(&self.agreement, &ikms, &context(&self.agreement, &transcript)?)?;
        let bytes = reply.with_signature(signature).encode()?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, signer = %server_signing_set.spec(), "client hello accepted");
        Ok(bytes)
    }

    /// Client: verify the server's signature with `server_public_set` and
    /// derive the secret.
    ///
    /// # Errors
    /// `ProtocolState` unless awaiting the server hello,
    /// `VerificationFailed` for a missing or invalid signature, or a decode /
    /// primitive failure. The session is unchanged on error.
    pub fn accept_server_hello(
        &mut self,
        server_public_set: &KeyPairSet,
        reply: &[u8],
    ) -> Result<(), KeyPairSetError> {
        check_state(self.status(), AgreementStatus::AwaitingServerHello)?;
        let State::AwaitingServerHello {
            ephemerals: eph,
            hello,
        } = &self.state
        else {
            return Err(KeyPairSetError::ProtocolState {
                expected: AgreementStatus::AwaitingServerHello,
                actual: self.status(),
            });
        };
        let mut verifier = KeyPairSetSigner::for_verification(server_public_set)?;
        let server = decode_for(&self.agreement, reply)?;
        if server.confirm_tags().is_some() {
            return Err(DecodeError::Malformed("signed agreement carries confirmation tags".into()).into());
        }
        let Some(signature) = server.signature() else {
            warn!(agreement = %self.agreement, "server hello is unsigned");
            return Err(KeyPairSetError::VerificationFailed("server hello is unsigned".into()));
        };

        let transcript = transcript(hello, &server)?;
        verifier.update(&transcript);
        if !verifier.verify(signature.as_bytes())? {
            warn!(agreement = %self.agreement, "server hello signature rejected");
            return Err(KeyPairSetError::VerificationFailed(
                "server hello signature".into(),
            ));
        }
        let ikms = eph
            .iter()
            .zip(server.parts())
            .map(|(e, part)| dh(e, part.as_bytes()))
            .collect::<Result<Ikms, _>>()?;
        let secret = assemble(&self.agreement, &ikms, &context(&self.agreement, &transcript)?)?;

        self.state = State::Done(secret);
        debug!(agreement = %self.agreement, "server hello accepted");
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

    /// Wipe ephemerals and secrets and return to `Clean`.
    pub fn destroy(&mut self) {
        self.state = State::Clean;
    }
}
