use crate::core::cbor::{CodecError, from_cbor, to_cbor};
use crate::domain::keypairset::{KeyPairSetAgreementSpec, KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::{AlgorithmId, registry};
use crate::protocol::wire::blob::check_count;
use crate::protocol::wire::{
    Blob, DecodeError, FrameType, blobs_for, prepend_frame, resolve_spec, spec_id, split_frame,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct AgreementBody {
    alg: AlgorithmId,
    result: AlgorithmId,
    parts: Vec<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sig: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirm: Option<Vec<Blob>>,
}

/// One agreement protocol message.
///
/// Carries the key pair set id, the agreement id (which fixes flavour, KDF
/// and confirmation), one part per constituent, and optionally a composite
/// signature (signed responders) or per-constituent confirmation tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementMessage {
    agreement: KeyPairSetAgreementSpec,
    alg: AlgorithmId,
    result: AlgorithmId,
    parts: Vec<Blob>,
    signature: Option<Blob>,
    confirm: Option<Vec<Blob>>,
}

impl AgreementMessage {
    /// # Errors
    /// `UnsupportedSpec` if `agreement` is not registered, `Decode(BlobCount)`
    /// if `parts` does not hold one entry per constituent.
    pub fn new(
        agreement: KeyPairSetAgreementSpec,
        parts: Vec<Vec<u8>>,
    ) -> Result<Self, KeyPairSetError> {
        let spec = agreement.spec();
        Ok(Self {
            agreement,
            alg: spec_id(spec)?,
            result: registry().id_for_agreement_spec(&agreement)?.clone(),
            parts: blobs_for(spec, parts)?,
            signature: None,
            confirm: None,
        })
    }

    /// Attach an encoded composite signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(Blob::new(signature));
        self
    }

    /// Attach one confirmation tag per constituent.
    ///
    /// # Errors
    /// `Decode(BlobCount)` on a count mismatch.
    pub fn with_confirm_tags(mut self, tags: Vec<Vec<u8>>) -> Result<Self, KeyPairSetError> {
        self.confirm = Some(blobs_for(self.spec(), tags)?);
        Ok(self)
    }

    #[must_use]
    pub fn agreement_spec(&self) -> KeyPairSetAgreementSpec {
        self.agreement
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.agreement.spec()
    }

    /// Agreement identifier; also the `info` the final KDF binds to.
    #[must_use]
    pub fn result_id(&self) -> &AlgorithmId {
        &self.result
    }

    #[must_use]
    pub fn parts(&self) -> &[Blob] {
        &self.parts
    }

    #[must_use]
    pub fn signature(&self) -> Option<&Blob> {
        self.signature.as_ref()
    }

    #[must_use]
    pub fn confirm_tags(&self) -> Option<&[Blob]> {
        self.confirm.as_deref()
    }

    /// # Errors
    /// `CodecError::Ser` if CBOR serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        self.encode_with(self.signature.clone(), self.confirm.clone())
    }

    /// Encoding with signature and confirmation tags stripped: the bytes
    /// those authenticators are computed over.
    ///
    /// # Errors
    /// `CodecError::Ser` if CBOR serialization fails.
    pub fn unauthenticated_bytes(&self) -> Result<Vec<u8>, CodecError> {
        self.encode_with(None, None)
    }

    fn encode_with(
        &self,
        sig: Option<Blob>,
        confirm: Option<Vec<Blob>>,
    ) -> Result<Vec<u8>, CodecError> {
        let body = AgreementBody {
            alg: self.alg.clone(),
            result: self.result.clone(),
            parts: self.parts.clone(),
            sig,
            confirm,
        };
        Ok(prepend_frame(FrameType::Agreement, to_cbor(&body)?))
    }

    /// # Errors
    /// `UnknownAlgorithm` for unregistered ids, `Malformed` when the agreement
    /// id names a different key pair set kind, `BlobCount` when parts or tags
    /// do not match the constituent count, or a framing / CBOR error.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let body: AgreementBody = from_cbor(split_frame(FrameType::Agreement, bytes)?)?;
        let spec = resolve_spec(&body.alg)?;
        let agreement = registry()
            .agreement_spec_for_id(&body.result)
            .map_err(|_| DecodeError::UnknownAlgorithm(body.result.clone()))?;
        if agreement.spec() != spec {
            return Err(DecodeError::Malformed(format!(
                "agreement {} does not use {spec}",
                body.result
            )));
        }
        check_count(&body.parts, spec.num_key_pairs())?;
        if let Some(tags) = &body.confirm {
            check_count(tags, spec.num_key_pairs())?;
        }
        Ok(Self {
            agreement,
            alg: body.alg,
            result: body.result,
            parts: body.parts,
            signature: body.sig,
            confirm: body.confirm,
        })
    }

    /// Agreement parameters an inbound message asks for, resolved from its
    /// agreement id. Performs the full `decode` validation.
    ///
    /// # Errors
    /// As [`AgreementMessage::decode`].
    pub fn peek_agreement_spec(bytes: &[u8]) -> Result<KeyPairSetAgreementSpec, DecodeError> {
        Self::decode(bytes).map(|m| m.agreement)
    }
}
