//! Concrete providers behind `ports::primitive`, one per `PrimitiveSpec`.

mod ecies;
mod ed25519;
mod schnorr;
mod secp256k1;
mod x25519;

pub use ecies::EciesEncryptor;
pub use ed25519::Ed25519Provider;
pub use schnorr::SchnorrProvider;
pub use secp256k1::Secp256k1Provider;
pub use x25519::X25519Provider;

use crate::domain::keypairset::PrimitiveSpec;
use crate::ports::primitive::{PrimitiveError, PrimitiveProvider};

static ED25519: Ed25519Provider = Ed25519Provider;
static SECP256K1: Secp256k1Provider = Secp256k1Provider;
static SCHNORR: SchnorrProvider = SchnorrProvider;
static X25519: X25519Provider = X25519Provider;

/// Shared provider for `spec`.
#[must_use]
pub fn provider_for(spec: PrimitiveSpec) -> &'static dyn PrimitiveProvider {
    match spec {
        PrimitiveSpec::Ed25519 => &ED25519,
        PrimitiveSpec::Secp256k1 => &SECP256K1,
        PrimitiveSpec::Schnorr => &SCHNORR,
        PrimitiveSpec::X25519 => &X25519,
    }
}

/// Copy `bytes` into a fixed array or fail with `err`.
pub(crate) fn fixed<const N: usize>(
    bytes: &[u8],
    err: PrimitiveError,
) -> Result<[u8; N], PrimitiveError> {
    <[u8; N]>::try_from(bytes).map_err(|_| err)
}
