//! Composite key agreement sessions.
//!
//! Each flavour is its own session type with an explicit, status-tagged
//! state. Every transition checks the status first and computes everything
//! it needs before touching the state, so a failed call leaves the session
//! exactly as it was.
//!
//! Per constituent `i` a session produces raw keying material `ikm_i`, turns
//! it into a 64-byte partial secret bound to a context (agreement id and
//! transcript), and copies it into slot `i` of a [`CombinedSecret`]. The
//! negotiated KDF then post-processes the combined buffer.

pub mod anonymous;
pub mod handshake;
pub mod signed;

pub use anonymous::AnonymousAgreement;
pub use handshake::HandshakeAgreement;
pub use signed::SignedAgreement;

use crate::adapters::primitive::provider_for;
use crate::core::crypto::hkdf::{derive_partial_secret, process_result};
use crate::core::crypto::secret::{AgreementSecret, CombinedSecret};
use crate::domain::keypairset::{
    AgreementStatus, AgreementType, KeyPairSetAgreementSpec, KeyPairSetError, KeyPairSetSpec,
    PrimitiveKeyPair,
};
use crate::ports::primitive::PrimitiveError;
use crate::protocol::registry::registry;
use crate::protocol::wire::{AgreementMessage, DecodeError};
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

/// Raw per-constituent keying material, in constituent order.
pub(crate) type Ikms = Vec<Zeroizing<Vec<u8>>>;

pub(crate) fn check_flavour(
    agreement: &KeyPairSetAgreementSpec,
    expected: AgreementType,
) -> Result<(), KeyPairSetError> {
    if agreement.agreement_type() == expected {
        Ok(())
    } else {
        Err(KeyPairSetError::UnsupportedSpec(format!(
            "{agreement} is not a {expected:?} agreement"
        )))
    }
}

pub(crate) fn check_state(
    actual: AgreementStatus,
    expected: AgreementStatus,
) -> Result<(), KeyPairSetError> {
    if actual == expected {
        Ok(())
    } else {
        warn!(%actual, %expected, "agreement call out of order");
        Err(KeyPairSetError::ProtocolState { expected, actual })
    }
}

/// Agreement parameters for a responder built from the first inbound
/// message: the carried agreement id, which must name a `flavour` agreement
/// over a kind that can agree.
pub(crate) fn agreement_from_message(
    message: &[u8],
    flavour: AgreementType,
) -> Result<KeyPairSetAgreementSpec, KeyPairSetError> {
    let agreement = AgreementMessage::peek_agreement_spec(message)?;
    check_flavour(&agreement, flavour)?;
    if !agreement.spec().can_agree() {
        return Err(KeyPairSetError::UnsupportedSpec(format!(
            "{} does not support key agreement",
            agreement.spec()
        )));
    }
    debug!(%agreement, "responder parameters taken from peer message");
    Ok(agreement)
}

/// Decode an inbound agreement message and make sure it belongs to
/// `agreement`.
pub(crate) fn decode_for(
    agreement: &KeyPairSetAgreementSpec,
    bytes: &[u8],
) -> Result<AgreementMessage, KeyPairSetError> {
    let msg = AgreementMessage::decode(bytes)?;
    if msg.spec() != agreement.spec() {
        warn!(expected = %agreement.spec(), actual = %msg.spec(), "agreement message of another kind");
        return Err(KeyPairSetError::MismatchedSpec {
            expected: agreement.spec(),
            actual: msg.spec(),
        });
    }
    if msg.agreement_spec() != *agreement {
        warn!(expected = %agreement, actual = %msg.agreement_spec(), "agreement parameters differ");
        return Err(KeyPairSetError::UnsupportedSpec(format!(
            "expected {agreement}, peer sent {}",
            msg.agreement_spec()
        )));
    }
    Ok(msg)
}

/// Reject a message that carries a signature or confirmation tags.
pub(crate) fn require_bare(msg: &AgreementMessage) -> Result<(), KeyPairSetError> {
    if msg.signature().is_some() || msg.confirm_tags().is_some() {
        return Err(DecodeError::Malformed("unexpected authenticator on agreement message".into()).into());
    }
    Ok(())
}

/// Fresh ephemeral pairs, one per constituent of `spec`.
pub(crate) fn ephemerals(spec: KeyPairSetSpec) -> Result<Vec<PrimitiveKeyPair>, KeyPairSetError> {
    spec.constituents()
        .iter()
        .map(|p| provider_for(*p).ephemeral().map_err(KeyPairSetError::from))
        .collect()
}

pub(crate) fn public_parts(pairs: &[PrimitiveKeyPair]) -> Vec<Vec<u8>> {
    pairs.iter().map(|p| p.public_key().to_vec()).collect()
}

/// Diffie-Hellman between the private half of `own` and `peer_public`.
pub(crate) fn dh(own: &PrimitiveKeyPair, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeyPairSetError> {
    let private = own
        .private_key()
        .ok_or(PrimitiveError::MissingPrivateKey(own.spec()))?;
    Ok(provider_for(own.spec()).agree(private, peer_public)?)
}

/// Agreement id bytes followed by `transcript`.
pub(crate) fn context(
    agreement: &KeyPairSetAgreementSpec,
    transcript: &[u8],
) -> Result<Vec<u8>, KeyPairSetError> {
    let mut ctx = registry().id_for_agreement_spec(agreement)?.to_bytes();
    ctx.extend_from_slice(transcript);
    Ok(ctx)
}

/// Turn per-constituent keying material into the final agreement secret.
///
/// There must be exactly one `ikm` per constituent of the agreed kind, and
/// every slot of the combined buffer must be written before the KDF runs.
pub(crate) fn assemble(
    agreement: &KeyPairSetAgreementSpec,
    ikms: &[Zeroizing<Vec<u8>>],
    context: &[u8],
) -> Result<AgreementSecret, KeyPairSetError> {
    let parts = agreement.spec().num_key_pairs();
    if ikms.len() != parts {
        return Err(KeyPairSetError::InvalidKeyPairSet(format!(
            "expected keying material for {parts} constituents, got {}",
            ikms.len()
        )));
    }
    let mut combined = CombinedSecret::new(parts);
    for (i, ikm) in ikms.iter().enumerate() {
        let index = u8::try_from(i)
            .map_err(|_| KeyPairSetError::InvalidKeyPairSet(format!("constituent index {i} out of range")))?;
        let partial = derive_partial_secret(ikm, context, index).map_err(PrimitiveError::from)?;
        if !combined.absorb_owned(i, partial) {
            return Err(KeyPairSetError::InvalidKeyPairSet(format!("slot {i} of the combined secret refused")));
        }
        trace!(index = i, "partial secret absorbed");
    }
    if !combined.is_complete() {
        return Err(KeyPairSetError::InvalidKeyPairSet("combined secret incomplete".into()));
    }
    let info = registry().id_for_agreement_spec(agreement)?.to_bytes();
    let processed = process_result(agreement.kdf(), combined.as_bytes(), &info);
    combined.destroy();
    let mut out = processed.map_err(PrimitiveError::from)?;
    Ok(AgreementSecret::new(std::mem::take(&mut *out)))
}

/// Keying material of the shape `a_0 || b_0, a_1 || b_1, ...`.
pub(crate) fn concat_ikms(first: Ikms, second: Ikms) -> Ikms {
    first
        .into_iter()
        .zip(second)
        .map(|(a, b)| {
            let mut joined = Zeroizing::new(Vec::with_capacity(a.len() + b.len()));
            joined.extend_from_slice(&a);
            joined.extend_from_slice(&b);
            joined
        })
        .collect()
}
