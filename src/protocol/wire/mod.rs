//! Canonical wire encodings of composite keys, signatures and agreement
//! messages.
//!
//! Every message is `frame_type || canonical CBOR body`. Bodies carry the
//! algorithm identifier of the composite kind and one opaque blob per
//! constituent, in constituent order. Decoding is strict: the id must resolve,
//! the blob count must equal the constituent count, and the body must be the
//! unique canonical encoding (so `encode(decode(b)) == b` for every accepted
//! `b`).

pub mod agreement;
pub mod blob;
pub mod errors;
pub mod frame;
pub mod private;
pub mod public;
pub mod signature;

pub use agreement::AgreementMessage;
pub use blob::Blob;
pub use errors::DecodeError;
pub use frame::{FrameType, prepend_frame, split_frame};
pub use private::PrivateKeyMessage;
pub use public::PublicKeyMessage;
pub use signature::SignatureMessage;

use crate::core::cbor::{CodecError, from_cbor, to_cbor};
use crate::domain::keypairset::{KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::{AlgorithmId, registry};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct SetBodyRef<'a> {
    alg: &'a AlgorithmId,
    blobs: &'a [Blob],
}

#[derive(Serialize, Deserialize)]
struct SetBody {
    alg: AlgorithmId,
    blobs: Vec<Blob>,
}

/// Encode a `{ alg, blobs }` body under frame `ft`.
pub(crate) fn encode_set(
    ft: FrameType,
    alg: &AlgorithmId,
    blobs: &[Blob],
) -> Result<Vec<u8>, CodecError> {
    Ok(prepend_frame(ft, to_cbor(&SetBodyRef { alg, blobs })?))
}

/// Decode a `{ alg, blobs }` body under frame `ft`, resolving the id and
/// checking the blob count.
pub(crate) fn decode_set(
    ft: FrameType,
    bytes: &[u8],
) -> Result<(KeyPairSetSpec, AlgorithmId, Vec<Blob>), DecodeError> {
    let body: SetBody = from_cbor(split_frame(ft, bytes)?)?;
    let spec = resolve_spec(&body.alg)?;
    blob::check_count(&body.blobs, spec.num_key_pairs())?;
    Ok((spec, body.alg, body.blobs))
}

pub(crate) fn resolve_spec(alg: &AlgorithmId) -> Result<KeyPairSetSpec, DecodeError> {
    registry()
        .spec_for_id(alg)
        .map_err(|_| DecodeError::UnknownAlgorithm(alg.clone()))
}

/// Identifier for `spec` from the shared registry.
pub(crate) fn spec_id(spec: KeyPairSetSpec) -> Result<AlgorithmId, KeyPairSetError> {
    registry().id_for_spec(spec).cloned()
}

/// Wrap raw per-constituent bytes, checking the count against `spec`.
pub(crate) fn blobs_for(
    spec: KeyPairSetSpec,
    parts: Vec<Vec<u8>>,
) -> Result<Vec<Blob>, DecodeError> {
    blob::check_count(&parts, spec.num_key_pairs())?;
    Ok(parts.into_iter().map(Blob::new).collect())
}
