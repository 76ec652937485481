/*
Composite key pair domain model.

Pure types and invariants: no crypto, no IO. The constituent key material
is carried as opaque encodings; adapters (`crate::adapters::primitive`)
are the only place that interprets it.

* [`KeyPairSetSpec`] fixes the ordered constituent list of a composite kind.
* [`KeyPairSet`] holds one [`PrimitiveKeyPair`] per constituent, in order.
* [`KeyPairSetAgreementSpec`] names a negotiated agreement (kind, flavour,
  KDF, confirmation).
*/

pub mod agreement;
pub mod errors;
pub mod params;
pub mod primitive;
pub mod set;
pub mod spec;

pub use agreement::*;
pub use errors::KeyPairSetError;
pub use primitive::*;
pub use set::*;
pub use spec::*;
