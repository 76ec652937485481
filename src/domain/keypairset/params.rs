/// ---- Fixed sizes & defensive constants (v1 parameter set) ----
/// Partial secret sizes are wire commitments: changing them changes every
/// combined secret. Defensive maxima (`*_MAX`) only bound resource usage.
///
/// Length of every per-constituent partial secret (512 bits).
pub const PARTIAL_SECRET_LEN: usize = 64;
/// Length of the post-KDF agreement result when a KDF is negotiated.
pub const KDF_RESULT_LEN: usize = 64;
/// Handshake confirmation tag length (`HMAC-SHA-384`).
pub const CONFIRM_TAG_LEN: usize = 48;
/// Handshake confirmation key length.
pub(crate) const CONFIRM_KEY_LEN: usize = 48;

pub(crate) const ED25519_PK_LEN: usize = 32;
pub(crate) const ED25519_SK_LEN: usize = 32;
pub(crate) const ED25519_SIG_LEN: usize = 64;
pub(crate) const X25519_PK_LEN: usize = 32;
pub(crate) const X25519_SK_LEN: usize = 32;
pub(crate) const SECP256K1_PK_LEN: usize = 33; // SEC1 compressed point
pub(crate) const SECP256K1_SK_LEN: usize = 32;
pub(crate) const SCHNORR_PK_LEN: usize = 32; // BIP-340 x-only key
pub(crate) const SCHNORR_SIG_LEN: usize = 64;
pub(crate) const ECDSA_SIG_LEN: usize = 64; // r || s, low-S normalized

/// Defensive bound on any single wire blob.
pub(crate) const BLOB_MAX: usize = 64 * 1024;
