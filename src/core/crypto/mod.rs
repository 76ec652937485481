pub mod hkdf;
pub mod secret;
