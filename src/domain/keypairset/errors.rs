use thiserror::Error;

use crate::core::cbor::CodecError;
use crate::domain::keypairset::agreement::AgreementStatus;
use crate::domain::keypairset::spec::KeyPairSetSpec;
use crate::ports::primitive::PrimitiveError;
use crate::protocol::wire::DecodeError;

/// Errors surfaced by every key pair set operation.
///
/// Nothing is retried and nothing is swallowed: a failure in any constituent
/// fails the whole operation, since partial success across constituents is
/// not a valid state.
#[derive(Debug, Error)]
pub enum KeyPairSetError {
    /// Unknown or disallowed spec / algorithm identifier. Never falls back
    /// to a default.
    #[error("unsupported spec: {0}")]
    UnsupportedSpec(String),

    /// The operation object and the supplied key pair set or message disagree
    /// on the composite spec. Raised before any cryptographic work.
    #[error("mismatched spec: expected {expected:?}, got {actual:?}")]
    MismatchedSpec {
        expected: KeyPairSetSpec,
        actual: KeyPairSetSpec,
    },

    /// Malformed wire bytes, wrong blob count or truncated data.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Serializing an outbound message failed.
    #[error("encode error: {0}")]
    Encode(#[from] CodecError),

    /// A session method was called outside its required state. The session
    /// is left unchanged.
    #[error("protocol state error: expected {expected}, session is {actual}")]
    ProtocolState {
        expected: AgreementStatus,
        actual: AgreementStatus,
    },

    /// An underlying constituent primitive reported an error.
    #[error("primitive failure: {0}")]
    Primitive(#[from] PrimitiveError),

    /// A private-key operation was attempted with a public-only set.
    #[error("key pair set is public-only")]
    PublicOnly,

    /// A signature or confirmation tag carried by an agreement message did
    /// not verify.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Structural invariant of a key pair set violated while building it.
    #[error("invalid key pair set: {0}")]
    InvalidKeyPairSet(String),

    /// Configuration bytes could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}
