pub mod crypto;
pub mod primitive;

pub use primitive::provider_for;
