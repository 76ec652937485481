/*
    HKDF helpers for composite key pairs.

    - RFC5869: https://datatracker.ietf.org/doc/html/rfc5869
    - SHA-384: https://datatracker.ietf.org/doc/html/rfc6234#section-4.2

    Derivations used by the composite operations, all on `hkdf::Hkdf`:
    * per-constituent partial secret from a raw DH output
    * handshake confirmation key
    * ECIES AEAD key from an ephemeral DH output
    * final agreement result according to the negotiated `KdfSpec`
*/

use crate::domain::keypairset::KdfSpec;
use crate::domain::keypairset::params::{CONFIRM_KEY_LEN, KDF_RESULT_LEN, PARTIAL_SECRET_LEN};
use crate::ports::crypto::AeadKey;
use ::hkdf::Hkdf;
use sha2::{Sha256, Sha384};
use zeroize::{Zeroize, Zeroizing};

#[derive(Debug, thiserror::Error)]
pub enum HkdfError {
    #[error("invalid PRK")]
    InvalidPrk,
    #[error("invalid length")]
    InvalidLength,
}

/// Extract-then-expand with HKDF-SHA-384 into `out`. An absent salt is the
/// RFC5869 string of 48 zeros.
fn sha384_into(salt: Option<&[u8]>, ikm: &[u8], info: &[u8], out: &mut [u8]) -> Result<(), HkdfError> {
    Hkdf::<Sha384>::new(salt, ikm)
        .expand(info, out)
        .map_err(|_| HkdfError::InvalidLength)
}

// ---------- Composite-specific derivations ----------

const L_PARTIAL: &[u8] = b"kps v1 partial secret";
const L_CONFIRM: &[u8] = b"kps v1 confirm key";
const L_ECIES: &[u8] = b"kps v1 ecies key";
const L_RESULT: &[u8] = b"kps v1 agreement result";

fn labelled_info(label: &[u8], context: &[u8], index: u8) -> Vec<u8> {
    let mut info = Vec::with_capacity(label.len() + 1 + context.len());
    info.extend_from_slice(label);
    info.push(index);
    info.extend_from_slice(context);
    info
}

/// Derive the fixed-length partial secret of constituent `index` from its
/// raw agreement output `ikm`, bound to `context` (algorithm id and
/// transcript).
///
/// # Errors
/// Returns `HkdfError::InvalidLength` if HKDF refuses the output length.
pub fn derive_partial_secret(
    ikm: &[u8],
    context: &[u8],
    index: u8,
) -> Result<Zeroizing<[u8; PARTIAL_SECRET_LEN]>, HkdfError> {
    let mut out = Zeroizing::new([0u8; PARTIAL_SECRET_LEN]);
    sha384_into(None, ikm, &labelled_info(L_PARTIAL, context, index), &mut out[..])?;
    Ok(out)
}

/// Derive the handshake confirmation key for constituent `index`.
///
/// # Errors
/// Returns `HkdfError::InvalidLength` if HKDF refuses the output length.
pub fn derive_confirm_key(
    ikm: &[u8],
    context: &[u8],
    index: u8,
) -> Result<Zeroizing<[u8; CONFIRM_KEY_LEN]>, HkdfError> {
    let mut out = Zeroizing::new([0u8; CONFIRM_KEY_LEN]);
    sha384_into(None, ikm, &labelled_info(L_CONFIRM, context, index), &mut out[..])?;
    Ok(out)
}

/// Derive an ECIES AEAD key from a DH output, bound to the ephemeral public
/// key that produced it.
///
/// # Errors
/// Returns `HkdfError::InvalidLength` if HKDF refuses the output length.
pub fn derive_ecies_key(shared: &[u8], ephemeral_public: &[u8]) -> Result<AeadKey, HkdfError> {
    let mut key = [0u8; 32];
    sha384_into(Some(ephemeral_public), shared, L_ECIES, &mut key)?;
    let out = AeadKey(key);
    key.zeroize();
    Ok(out)
}

/// Post-process a combined secret according to `kdf`. `info` binds the
/// result to the negotiated agreement.
///
/// # Errors
/// Returns `HkdfError::InvalidLength` if the underlying HKDF refuses the
/// output length.
pub fn process_result(
    kdf: KdfSpec,
    combined: &[u8],
    info: &[u8],
) -> Result<Zeroizing<Vec<u8>>, HkdfError> {
    let mut full_info = Vec::with_capacity(L_RESULT.len() + info.len());
    full_info.extend_from_slice(L_RESULT);
    full_info.extend_from_slice(info);
    match kdf {
        KdfSpec::None => Ok(Zeroizing::new(combined.to_vec())),
        KdfSpec::Sha256Kdf => {
            let hk = Hkdf::<Sha256>::new(None, combined);
            let mut out = Zeroizing::new(vec![0u8; KDF_RESULT_LEN]);
            hk.expand(&full_info, &mut out[..])
                .map_err(|_| HkdfError::InvalidLength)?;
            Ok(out)
        }
        KdfSpec::Sha384Kdf => {
            let hk = Hkdf::<Sha384>::new(None, combined);
            let mut out = Zeroizing::new(vec![0u8; KDF_RESULT_LEN]);
            hk.expand(&full_info, &mut out[..])
                .map_err(|_| HkdfError::InvalidLength)?;
            Ok(out)
        }
    }
}
