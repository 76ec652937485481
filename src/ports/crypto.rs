// src/ports/crypto.rs
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the authentication tag in bytes.
pub const AEAD_TAG_LEN: usize = 16;

/// Length of the random per-message nonce salt carried in an ECIES envelope.
pub const NONCE_SALT_LEN: usize = 16;

#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct AeadKey(pub [u8; 32]); // XChaCha20-Poly1305 key size

impl core::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AeadKey(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceSalt(pub [u8; NONCE_SALT_LEN]); // 16B salt + 8B seq = 24B nonce

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seq(pub u64);

/// In-place Authenticated Encryption with Associated Data.
///
/// Used by the ECIES layer of every encrypting constituent: each envelope
/// carries a fresh ephemeral key, so the derived key is single-use and the
/// envelope seals exactly one message under `Seq(0)` with a random salt.
///
/// Nonce construction:
/// The (`salt`, `seq`) pair MUST be unique per key for every call to
/// `seal_in_place`.
///
/// In-place semantics:
/// - Encryption: `buf` holds plaintext; on success it holds
///   `ciphertext || tag` (grows by [`AEAD_TAG_LEN`]).
/// - Decryption: `buf` holds `ciphertext || tag`; on success it is truncated
///   back to the plaintext.
///
/// On a decryption error the buffer contents are untrustworthy. Failures never
/// reveal whether the tag or some other input was at fault.
pub trait AeadSeal {
    /// Encrypts `buf` in place and appends the tag.
    /// # Errors
    /// Returns `AeadError::Internal` if encryption fails.
    fn seal_in_place(
        &self,
        key: &AeadKey,
        salt: NonceSalt,
        seq: Seq,
        aad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<(), AeadError>;

    /// Decrypts `buf` in place and removes the tag.
    /// # Errors
    /// Returns `AeadError::TagMismatch` if authentication fails.
    fn open_in_place(
        &self,
        key: &AeadKey,
        salt: NonceSalt,
        seq: Seq,
        aad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<(), AeadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AeadError {
    #[error("decryption failed (tag mismatch)")]
    TagMismatch,
    #[error("internal crypto error")]
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reversible XOR "cipher" with a fixed tag. Only exercises the trait flow.
    struct XorAead;

    impl XorAead {
        fn pad(salt: NonceSalt, seq: Seq, aad: &[u8]) -> u8 {
            aad.iter()
                .fold(seq.0 as u8 ^ salt.0[0], |acc, b| acc.wrapping_add(*b))
        }
    }

    impl AeadSeal for XorAead {
        fn seal_in_place(
            &self,
            _key: &AeadKey,
            salt: NonceSalt,
            seq: Seq,
            aad: &[u8],
            buf: &mut Vec<u8>,
        ) -> Result<(), AeadError> {
            let k = Self::pad(salt, seq, aad);
            buf.iter_mut().for_each(|b| *b ^= k);
            buf.extend(std::iter::repeat_n(k, AEAD_TAG_LEN));
            Ok(())
        }

        fn open_in_place(
            &self,
            _key: &AeadKey,
            salt: NonceSalt,
            seq: Seq,
            aad: &[u8],
            buf: &mut Vec<u8>,
        ) -> Result<(), AeadError> {
            if buf.len() < AEAD_TAG_LEN {
                return Err(AeadError::TagMismatch);
            }
            let k = Self::pad(salt, seq, aad);
            let body = buf.len() - AEAD_TAG_LEN;
            if !buf[body..].iter().all(|t| *t == k) {
                return Err(AeadError::TagMismatch);
            }
            buf.truncate(body);
            buf.iter_mut().for_each(|b| *b ^= k);
            Ok(())
        }
    }

    #[test]
    fn seal_and_open_round_trip() {
        let a = XorAead;
        let key = AeadKey([7u8; 32]);
        let salt = NonceSalt([3u8; NONCE_SALT_LEN]);
        let mut data = b"composite".to_vec();
        a.seal_in_place(&key, salt, Seq(0), b"eph", &mut data).unwrap();
        assert_eq!(data.len(), "composite".len() + AEAD_TAG_LEN);
        a.open_in_place(&key, salt, Seq(0), b"eph", &mut data).unwrap();
        assert_eq!(&data, b"composite");
    }

    #[test]
    fn open_rejects_wrong_aad() {
        let a = XorAead;
        let key = AeadKey([0u8; 32]);
        let salt = NonceSalt([9u8; NONCE_SALT_LEN]);
        let mut data = b"abc".to_vec();
        a.seal_in_place(&key, salt, Seq(0), b"A", &mut data).unwrap();
        let err = a
            .open_in_place(&key, salt, Seq(0), b"B", &mut data)
            .unwrap_err();
        assert!(matches!(err, AeadError::TagMismatch));
    }

    #[test]
    fn open_errors_on_short_buffer() {
        let a = XorAead;
        let mut data = vec![1, 2, 3];
        let err = a
            .open_in_place(&AeadKey([0u8; 32]), NonceSalt([0; 16]), Seq(0), b"x", &mut data)
            .unwrap_err();
        assert!(matches!(err, AeadError::TagMismatch));
    }
}
