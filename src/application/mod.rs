pub mod agreement;
pub mod keypairset;

pub use agreement::{AnonymousAgreement, HandshakeAgreement, SignedAgreement};
pub use keypairset::{KeyPairSetEncryptor, KeyPairSetFactory, KeyPairSetGenerator, KeyPairSetSigner};
