//! Generic CBOR codec helpers used by every wire type
//!
//! This module is *infrastructure*, not domain-specific:
//! - `to_cbor` serializes any `T: Serialize` using **ciborium** (deterministic by default).
//! - `from_cbor` deserializes, always strict (no trailing bytes) and
//!   always rejects non-canonical encodings (fail when bytes are not the unique deterministic form).
//!
//! Notes:
//! - `from_cbor` expects exactly the CBOR payload (no framing/preambles). Strip the
//!   frame type byte before calling it (the wire layer does this).
//! - Canonical enforcement is what makes `encode(decode(b)) == b` hold for every
//!   accepted input.

use serde::{Serialize, de::DeserializeOwned};
use std::io::Cursor;
use zeroize::Zeroizing;

/// Errors produced by the generic codec.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// Error produced during serialization.
    #[error("CBOR serialize error: {0}")]
    Ser(#[from] ciborium::ser::Error<std::io::Error>),

    /// Error produced during deserialization.
    #[error("CBOR deserialize error: {0}")]
    De(#[from] ciborium::de::Error<std::io::Error>),

    /// Well-formed CBOR followed by extra bytes.
    #[error("trailing bytes after CBOR value")]
    Trailing,

    /// The input bytes were well-formed CBOR but not in deterministic form.
    #[error("CBOR input is not in canonical/deterministic form")]
    NonCanonical,
}

/// Serialize any `T: Serialize` to CBOR bytes (deterministic under ciborium).
///
/// # Errors
///
/// Returns a [`CodecError::Ser`] if serialization fails.
pub fn to_cbor<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(256);
    ciborium::ser::into_writer(v, &mut buf)?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned + Serialize` from CBOR bytes.
///
/// Always strict:
/// * Rejects trailing garbage after a valid item.
/// * Rejects non-canonical encodings by re-encoding deterministically and
///   requiring an exact byte-for-byte match to the input.
///
/// # Errors
///
/// * [`CodecError::De`] if deserialization fails.
/// * [`CodecError::Trailing`] if bytes follow the first item.
/// * [`CodecError::NonCanonical`] if the input is well‑formed but not canonical.
pub fn from_cbor<T: DeserializeOwned + Serialize>(b: &[u8]) -> Result<T, CodecError> {
    let mut cur = Cursor::new(b);
    let value: T = ciborium::de::from_reader(&mut cur)?;
    let consumed = usize::try_from(cur.position()).map_err(|_| CodecError::Trailing)?;
    if consumed != b.len() {
        return Err(CodecError::Trailing);
    }
    // Private key bodies pass through here too.
    let canon = Zeroizing::new(to_cbor(&value)?);
    if canon.as_slice() != b {
        return Err(CodecError::NonCanonical);
    }
    Ok(value)
}
