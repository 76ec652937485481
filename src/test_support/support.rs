#![allow(dead_code)]
use crate::application::keypairset::KeyPairSetFactory;
use crate::domain::keypairset::{
    AgreementType, KdfSpec, KeyPairSet, KeyPairSetAgreementSpec, KeyPairSetSpec,
};

/// Fresh key pair set of kind `spec`.
///
/// # Panics
/// If generation fails.
pub fn mk_set(spec: KeyPairSetSpec) -> KeyPairSet {
    KeyPairSetFactory::global()
        .generate(spec)
        .expect("key generation")
}

/// Registered agreement spec.
///
/// # Panics
/// If the combination is not valid.
pub fn mk_agreement(
    spec: KeyPairSetSpec,
    agreement_type: AgreementType,
    kdf: KdfSpec,
    confirm: bool,
) -> KeyPairSetAgreementSpec {
    KeyPairSetAgreementSpec::new(spec, agreement_type, kdf, confirm).expect("valid agreement spec")
}
