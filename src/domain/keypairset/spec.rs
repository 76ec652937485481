use crate::domain::keypairset::primitive::PrimitiveSpec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// The kind of a composite key pair: a fixed, ordered list of constituent
/// primitives.
///
/// The constituent order is a protocol invariant. Every aggregation
/// (signature chaining, layered encryption, secret concatenation) walks
/// constituents in exactly this order, and the wire formats carry one blob
/// per constituent in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyPairSetSpec {
    /// Ed25519 + secp256k1 ECDSA.
    Sign2,
    /// Ed25519 + secp256k1 ECDSA + BIP-340 Schnorr.
    Sign3,
    /// X25519 + secp256k1 ECDH (also encrypts).
    Agree2,
    /// secp256k1 alone; signs, agrees and encrypts.
    Unified1,
}

impl KeyPairSetSpec {
    /// Every composite kind, in registry order.
    pub const ALL: [KeyPairSetSpec; 4] = [
        KeyPairSetSpec::Sign2,
        KeyPairSetSpec::Sign3,
        KeyPairSetSpec::Agree2,
        KeyPairSetSpec::Unified1,
    ];

    /// Ordered constituent primitives.
    #[must_use]
    pub fn constituents(self) -> &'static [PrimitiveSpec] {
        match self {
            KeyPairSetSpec::Sign2 => &[PrimitiveSpec::Ed25519, PrimitiveSpec::Secp256k1],
            KeyPairSetSpec::Sign3 => &[
                PrimitiveSpec::Ed25519,
                PrimitiveSpec::Secp256k1,
                PrimitiveSpec::Schnorr,
            ],
            KeyPairSetSpec::Agree2 => &[PrimitiveSpec::X25519, PrimitiveSpec::Secp256k1],
            KeyPairSetSpec::Unified1 => &[PrimitiveSpec::Secp256k1],
        }
    }

    /// Number of constituent key pairs (`N`), always `>= 1`.
    #[must_use]
    pub fn num_key_pairs(self) -> usize {
        self.constituents().len()
    }

    /// Position of `primitive` within this spec, if present.
    #[must_use]
    pub fn index_of(self, primitive: PrimitiveSpec) -> Option<usize> {
        self.constituents().iter().position(|p| *p == primitive)
    }

    #[must_use]
    pub fn can_sign(self) -> bool {
        self.constituents().iter().all(|p| p.can_sign())
    }

    #[must_use]
    pub fn can_agree(self) -> bool {
        self.constituents().iter().all(|p| p.can_agree())
    }

    #[must_use]
    pub fn can_encrypt(self) -> bool {
        self.constituents().iter().all(|p| p.can_encrypt())
    }

    /// Dense index used for per-spec caches.
    #[must_use]
    pub(crate) fn ordinal(self) -> usize {
        match self {
            KeyPairSetSpec::Sign2 => 0,
            KeyPairSetSpec::Sign3 => 1,
            KeyPairSetSpec::Agree2 => 2,
            KeyPairSetSpec::Unified1 => 3,
        }
    }
}

impl fmt::Display for KeyPairSetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.constituents().iter().map(|p| p.name()).collect();
        write!(f, "{self:?}({})", names.join("+"))
    }
}
