use crate::core::cbor::CodecError;
use crate::domain::keypairset::{KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::AlgorithmId;
use crate::protocol::wire::{Blob, DecodeError, FrameType, blobs_for, decode_set, encode_set, spec_id};

/// Chained composite signature: blob `i` is constituent `i`'s signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMessage {
    spec: KeyPairSetSpec,
    alg: AlgorithmId,
    signatures: Vec<Blob>,
}

impl SignatureMessage {
    /// # Errors
    /// `UnsupportedSpec` or `Decode(BlobCount)`.
    pub fn new(spec: KeyPairSetSpec, signatures: Vec<Vec<u8>>) -> Result<Self, KeyPairSetError> {
        Ok(Self {
            spec,
            alg: spec_id(spec)?,
            signatures: blobs_for(spec, signatures)?,
        })
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn signatures(&self) -> &[Blob] {
        &self.signatures
    }

    /// # Errors
    /// `CodecError::Ser` if CBOR serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_set(FrameType::Signature, &self.alg, &self.signatures)
    }

    /// # Errors
    /// Any `DecodeError`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (spec, alg, signatures) = decode_set(FrameType::Signature, bytes)?;
        Ok(Self {
            spec,
            alg,
            signatures,
        })
    }
}
