pub mod xchacha20poly1305;

pub use xchacha20poly1305::ChaChaAead;
