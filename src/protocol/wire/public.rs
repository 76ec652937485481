use crate::core::cbor::CodecError;
use crate::domain::keypairset::{KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::AlgorithmId;
use crate::protocol::wire::{Blob, DecodeError, FrameType, blobs_for, decode_set, encode_set, spec_id};

/// Composite public key: one encoded public key per constituent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMessage {
    spec: KeyPairSetSpec,
    alg: AlgorithmId,
    keys: Vec<Blob>,
}

impl PublicKeyMessage {
    /// # Errors
    /// `UnsupportedSpec` if `spec` has no identifier, `Decode(BlobCount)` if
    /// `keys` does not hold one entry per constituent.
    pub fn new(spec: KeyPairSetSpec, keys: Vec<Vec<u8>>) -> Result<Self, KeyPairSetError> {
        Ok(Self {
            spec,
            alg: spec_id(spec)?,
            keys: blobs_for(spec, keys)?,
        })
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn algorithm_id(&self) -> &AlgorithmId {
        &self.alg
    }

    /// Encoded public keys in constituent order.
    #[must_use]
    pub fn keys(&self) -> &[Blob] {
        &self.keys
    }

    /// # Errors
    /// `CodecError::Ser` if CBOR serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_set(FrameType::PublicKey, &self.alg, &self.keys)
    }

    /// # Errors
    /// Any `DecodeError`; nothing is returned for malformed input.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (spec, alg, keys) = decode_set(FrameType::PublicKey, bytes)?;
        Ok(Self { spec, alg, keys })
    }
}
