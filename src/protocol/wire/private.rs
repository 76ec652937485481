use crate::core::cbor::CodecError;
use crate::domain::keypairset::{KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::AlgorithmId;
use crate::protocol::wire::{Blob, DecodeError, FrameType, blobs_for, decode_set, encode_set, spec_id};
use core::fmt;
use zeroize::Zeroize;

/// Composite private key: one encoded private key per constituent.
///
/// The blobs are wiped when the message is dropped. Callers own the encoded
/// bytes returned by [`PrivateKeyMessage::encode`] and should wrap them in
/// `zeroize::Zeroizing` themselves.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyMessage {
    spec: KeyPairSetSpec,
    alg: AlgorithmId,
    keys: Vec<Blob>,
}

impl PrivateKeyMessage {
    /// # Errors
    /// `UnsupportedSpec` or `Decode(BlobCount)`.
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
    pub fn keys(&self) -> &[Blob] {
        &self.keys
    }

    /// # Errors
    /// `CodecError::Ser` if CBOR serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_set(FrameType::PrivateKey, &self.alg, &self.keys)
    }

    /// # Errors
    /// Any `DecodeError`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (spec, alg, keys) = decode_set(FrameType::PrivateKey, bytes)?;
        Ok(Self { spec, alg, keys })
    }
}

impl Drop for PrivateKeyMessage {
    fn drop(&mut self) {
        self.keys.zeroize();
    }
}

impl fmt::Debug for PrivateKeyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMessage")
            .field("spec", &self.spec)
            .field("keys", &self.keys.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::PublicKeyMessage;

    #[test]
    fn round_trip_and_frame_separation() {
        let m = PrivateKeyMessage::new(KeyPairSetSpec::Agree2, vec![vec![7; 32], vec![8; 32]])
            .unwrap();
        let bytes = m.encode().unwrap();
        let back = PrivateKeyMessage::decode(&bytes).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.encode().unwrap(), bytes);
        assert!(PublicKeyMessage::decode(&bytes).is_err());
    }

    #[test]
    fn debug_hides_key_bytes() {
        let m = PrivateKeyMessage::new(KeyPairSetSpec::Unified1, vec![vec![0xEE; 32]]).unwrap();
        let d = format!("{m:?}");
        assert!(!d.contains("238"), "{d}");
    }
}
