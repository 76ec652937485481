pub mod cbor;
pub mod crypto;
