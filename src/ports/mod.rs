pub mod crypto;
pub mod primitive;

pub use crypto::*;
pub use primitive::*;
