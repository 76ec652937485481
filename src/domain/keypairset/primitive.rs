use core::fmt;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A single asymmetric primitive that can occupy a slot in a `KeyPairSet`.
///
/// The variant only names the primitive; key material lives in
/// [`PrimitiveKeyPair`] as opaque encodings so the domain stays free of
/// concrete crypto types. Adapters parse the encodings on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrimitiveSpec {
    /// Ed25519 signatures (hash-then-sign over a SHA-512 digest).
    Ed25519,
    /// secp256k1: ECDSA signatures, ECDH agreement and ECIES encryption.
    Secp256k1,
    /// BIP-340 Schnorr signatures over secp256k1.
    Schnorr,
    /// X25519: Diffie-Hellman agreement and ECIES encryption.
    X25519,
}

impl PrimitiveSpec {
    /// Every primitive known to this build, in declaration order.
    pub const ALL: [PrimitiveSpec; 4] = [
        PrimitiveSpec::Ed25519,
        PrimitiveSpec::Secp256k1,
        PrimitiveSpec::Schnorr,
        PrimitiveSpec::X25519,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveSpec::Ed25519 => "Ed25519",
            PrimitiveSpec::Secp256k1 => "secp256k1",
            PrimitiveSpec::Schnorr => "Schnorr",
            PrimitiveSpec::X25519 => "X25519",
        }
    }

    #[must_use]
    pub fn can_sign(self) -> bool {
        matches!(
            self,
            PrimitiveSpec::Ed25519 | PrimitiveSpec::Secp256k1 | PrimitiveSpec::Schnorr
        )
    }

    #[must_use]
    pub fn can_agree(self) -> bool {
        matches!(self, PrimitiveSpec::Secp256k1 | PrimitiveSpec::X25519)
    }

    #[must_use]
    pub fn can_encrypt(self) -> bool {
        matches!(self, PrimitiveSpec::Secp256k1 | PrimitiveSpec::X25519)
    }
}

impl fmt::Display for PrimitiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded private key bytes. Zeroized on drop; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyBytes(Vec<u8>);

impl PrivateKeyBytes {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyBytes(..)")
    }
}

/// One constituent key pair of a `KeyPairSet`.
///
/// Invariants (upheld by the generator adapters that construct these):
/// - `public` is the canonical encoding for `spec`.
/// - `private`, when present, corresponds to `public`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrimitiveKeyPair {
    spec: PrimitiveSpec,
    public: Vec<u8>,
    private: Option<PrivateKeyBytes>,
}

impl PrimitiveKeyPair {
    #[must_use]
    pub fn new(spec: PrimitiveSpec, public: Vec<u8>, private: Option<PrivateKeyBytes>) -> Self {
        Self {
            spec,
            public,
            private,
        }
    }

    #[must_use]
    pub fn spec(&self) -> PrimitiveSpec {
        self.spec
    }

    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    #[must_use]
    pub fn private_key(&self) -> Option<&PrivateKeyBytes> {
        self.private.as_ref()
    }

    #[must_use]
    pub fn is_public_only(&self) -> bool {
        self.private.is_none()
    }

    /// Copy of this pair with the private half dropped.
    #[must_use]
    pub fn to_public_only(&self) -> Self {
        Self {
            spec: self.spec,
            public: self.public.clone(),
            private: None,
        }
    }
}

impl fmt::Debug for PrimitiveKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveKeyPair")
            .field("spec", &self.spec)
            .field("public_len", &self.public.len())
            .field("has_private", &self.private.is_some())
            .finish()
    }
}
