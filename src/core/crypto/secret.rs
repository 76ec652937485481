//! Fixed-layout secret buffers for composite agreements.
//!
//! The combined secret is `N * PARTIAL_SECRET_LEN` bytes; constituent `i`
//! owns the slice `[i * PARTIAL_SECRET_LEN, (i + 1) * PARTIAL_SECRET_LEN)`.
//! Partials are wiped the moment they are copied in.

use crate::domain::keypairset::params::PARTIAL_SECRET_LEN;
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Concatenation of per-constituent partial secrets, in spec order.
///
/// Zeroized on drop. `Debug` never prints contents.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CombinedSecret {
    buf: Vec<u8>,
    filled: Vec<bool>,
}

impl CombinedSecret {
    /// Pre-sized buffer for `parts` constituents.
    #[must_use]
    pub fn new(parts: usize) -> Self {
        Self {
            buf: vec![0u8; parts * PARTIAL_SECRET_LEN],
            filled: vec![false; parts],
        }
    }

    #[must_use]
    pub fn parts(&self) -> usize {
        self.filled.len()
    }

    /// Copy `partial` into slot `index`, then wipe `partial`.
    ///
    /// Returns `false` (and still wipes `partial`) if `index` is out of range
    /// or the slot was already written.
    pub fn absorb(&mut self, index: usize, partial: &mut [u8; PARTIAL_SECRET_LEN]) -> bool {
        let ok = index < self.filled.len() && !self.filled[index];
        if ok {
            let start = index * PARTIAL_SECRET_LEN;
            self.buf[start..start + PARTIAL_SECRET_LEN].copy_from_slice(partial);
            self.filled[index] = true;
        }
        partial.zeroize();
        ok
    }

    /// Move a `Zeroizing` partial into slot `index`.
    pub fn absorb_owned(
        &mut self,
        index: usize,
        mut partial: Zeroizing<[u8; PARTIAL_SECRET_LEN]>,
    ) -> bool {
        self.absorb(index, &mut partial)
    }

    /// True once every slot has been written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled.iter().all(|f| *f)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Overwrite the buffer with zeros and mark every slot empty.
    pub fn destroy(&mut self) {
        self.buf.zeroize();
        self.buf.resize(self.filled.len() * PARTIAL_SECRET_LEN, 0);
        self.filled.iter_mut().for_each(|f| *f = false);
    }
}

impl fmt::Debug for CombinedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedSecret")
            .field("parts", &self.parts())
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}

/// Secret handed to the caller once an agreement completes. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AgreementSecret(Vec<u8>);

impl AgreementSecret {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AgreementSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgreementSecret({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_land_at_fixed_offsets_and_are_wiped() {
        let mut c = CombinedSecret::new(3);
        let mut p1 = [0x11u8; PARTIAL_SECRET_LEN];
        let mut p0 = [0x22u8; PARTIAL_SECRET_LEN];
        // Out-of-order absorption still lands in the right slots.
        assert!(c.absorb(1, &mut p1));
        assert!(c.absorb(0, &mut p0));
        assert_eq!(p1, [0u8; PARTIAL_SECRET_LEN]);
        assert_eq!(p0, [0u8; PARTIAL_SECRET_LEN]);
        assert!(!c.is_complete());
        let bytes = c.as_bytes();
        assert!(bytes[..PARTIAL_SECRET_LEN].iter().all(|b| *b == 0x22));
        assert!(bytes[PARTIAL_SECRET_LEN..2 * PARTIAL_SECRET_LEN]
            .iter()
            .all(|b| *b == 0x11));
        let mut p2 = [0x33u8; PARTIAL_SECRET_LEN];
        assert!(c.absorb(2, &mut p2));
        assert!(c.is_complete());
    }

    #[test]
    fn double_write_and_out_of_range_are_refused_but_wiped() {
        let mut c = CombinedSecret::new(1);
        let mut p = [1u8; PARTIAL_SECRET_LEN];
        assert!(c.absorb(0, &mut p));
        let mut again = [2u8; PARTIAL_SECRET_LEN];
        assert!(!c.absorb(0, &mut again));
        assert_eq!(again, [0u8; PARTIAL_SECRET_LEN]);
        let mut far = [3u8; PARTIAL_SECRET_LEN];
        assert!(!c.absorb(5, &mut far));
        assert_eq!(far, [0u8; PARTIAL_SECRET_LEN]);
        assert!(c.as_bytes().iter().all(|b| *b == 1));
    }

    #[test]
    fn destroy_zeroes_buffer() {
        let mut c = CombinedSecret::new(2);
        c.absorb_owned(0, Zeroizing::new([9u8; PARTIAL_SECRET_LEN]));
        c.absorb_owned(1, Zeroizing::new([9u8; PARTIAL_SECRET_LEN]));
        c.destroy();
        assert_eq!(c.as_bytes().len(), 2 * PARTIAL_SECRET_LEN);
        assert!(c.as_bytes().iter().all(|b| *b == 0));
        assert!(!c.is_complete());
    }

    #[test]
    fn debug_is_redacted() {
        let s = AgreementSecret::new(vec![0xAA; 4]);
        assert_eq!(format!("{s:?}"), "AgreementSecret(4 bytes)");
    }
}
