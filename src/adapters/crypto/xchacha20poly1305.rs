// src/adapters/crypto/xchacha20poly1305.rs
use crate::ports::crypto::{AeadError, AeadKey, AeadSeal, NonceSalt, Seq};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{AeadInPlace, KeyInit},
};

// 16-byte salt then 8-byte big-endian sequence
fn make_nonce(salt: NonceSalt, seq: Seq) -> XNonce {
    let mut n = [0u8; 24];
    n[0..16].copy_from_slice(&salt.0);
    n[16..24].copy_from_slice(&seq.0.to_be_bytes());
    XNonce::from(n)
}

/// `AeadSeal` backed by XChaCha20-Poly1305.
///
/// The 24-byte extended nonce leaves room for a random 16-byte salt, so ECIES
/// envelopes can pick a fresh salt per message without any counter state.
///
/// Error mapping:
/// - `seal_in_place` maps any underlying failure to `AeadError::Internal`.
/// - `open_in_place` maps every failure to `AeadError::TagMismatch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaAead;

impl AeadSeal for ChaChaAead {
    fn seal_in_place(
        &self,
        key: &AeadKey,
        salt: NonceSalt,
        seq: Seq,
        aad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<(), AeadError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
        cipher
            .encrypt_in_place(&make_nonce(salt, seq), aad, buf)
            .map_err(|_| AeadError::Internal)
    }

    fn open_in_place(
        &self,
        key: &AeadKey,
        salt: NonceSalt,
        seq: Seq,
        aad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<(), AeadError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
        cipher
            .decrypt_in_place(&make_nonce(salt, seq), aad, buf)
            .map_err(|_| AeadError::TagMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::crypto::AEAD_TAG_LEN;

    fn key() -> AeadKey {
        AeadKey([0x11; 32])
    }
    fn salt() -> NonceSalt {
        NonceSalt([
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
            0x88, 0x99,
        ])
    }

    #[test]
    fn seal_open_round_trip() {
        let a = ChaChaAead;
        let mut buf = b"layered payload".to_vec();
        a.seal_in_place(&key(), salt(), Seq(0), b"eph-pk", &mut buf)
            .unwrap();
        assert_eq!(buf.len(), b"layered payload".len() + AEAD_TAG_LEN);
        a.open_in_place(&key(), salt(), Seq(0), b"eph-pk", &mut buf)
            .unwrap();
        assert_eq!(&buf, b"layered payload");
    }

    #[test]
    fn aad_mismatch_fails() {
        let a = ChaChaAead;
        let mut buf = b"data".to_vec();
        a.seal_in_place(&key(), salt(), Seq(0), b"auth", &mut buf)
            .unwrap();
        let err = a
            .open_in_place(&key(), salt(), Seq(0), b"AUTH", &mut buf)
            .unwrap_err();
        assert!(matches!(err, AeadError::TagMismatch));
    }

    #[test]
    fn tag_corruption_detected() {
        let a = ChaChaAead;
        let mut buf = b"x".to_vec();
        a.seal_in_place(&key(), salt(), Seq(0), b"aad", &mut buf)
            .unwrap();
        *buf.last_mut().unwrap() ^= 0x80;
        assert!(
            a.open_in_place(&key(), salt(), Seq(0), b"aad", &mut buf)
                .is_err()
        );
    }

    #[test]
    fn salt_changes_ciphertext() {
        let a = ChaChaAead;
        let mut p1 = b"salted".to_vec();
        let mut p2 = b"salted".to_vec();
        a.seal_in_place(&key(), salt(), Seq(0), b"aad", &mut p1)
            .unwrap();
        a.seal_in_place(&key(), NonceSalt([0; 16]), Seq(0), b"aad", &mut p2)
            .unwrap();
        assert_ne!(p1, p2);
    }
}
