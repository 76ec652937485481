use crate::domain::keypairset::errors::KeyPairSetError;
use crate::domain::keypairset::spec::KeyPairSetSpec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Flavour of composite key agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgreementType {
    /// One message; the initiator stays anonymous, the responder is the
    /// holder of the target key pair set.
    Anonymous,
    /// Two messages; the responder authenticates by signing the exchange
    /// with a signing-capable key pair set.
    Signed,
    /// Two messages (three with confirmation); both sides hold static key
    /// pair sets of the agreement spec.
    Handshake,
}

impl AgreementType {
    pub const ALL: [AgreementType; 3] = [
        AgreementType::Anonymous,
        AgreementType::Signed,
        AgreementType::Handshake,
    ];
}

/// How the combined secret is post-processed before it is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KdfSpec {
    /// Hand out the raw concatenation of partial secrets.
    None,
    /// `HKDF-SHA-256`.
    Sha256Kdf,
    /// `HKDF-SHA-384`.
    Sha384Kdf,
}

impl KdfSpec {
    pub const ALL: [KdfSpec; 3] = [KdfSpec::None, KdfSpec::Sha256Kdf, KdfSpec::Sha384Kdf];
}

/// Full description of a composite agreement: which key pair set kind, which
/// flavour, which KDF, and whether a confirmation round is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyPairSetAgreementSpec {
    spec: KeyPairSetSpec,
    agreement_type: AgreementType,
    kdf: KdfSpec,
    confirm: bool,
}

impl KeyPairSetAgreementSpec {
    /// Build a validated agreement spec.
    ///
    /// # Errors
    /// Returns `KeyPairSetError::UnsupportedSpec` when `spec` cannot agree or
    /// when confirmation is requested for a flavour other than `Handshake`.
    pub fn new(
        spec: KeyPairSetSpec,
        agreement_type: AgreementType,
        kdf: KdfSpec,
        confirm: bool,
    ) -> Result<Self, KeyPairSetError> {
        if !spec.can_agree() {
            return Err(KeyPairSetError::UnsupportedSpec(format!(
                "{spec} does not support key agreement"
            )));
        }
        if confirm && agreement_type != AgreementType::Handshake {
            return Err(KeyPairSetError::UnsupportedSpec(format!(
                "confirmation is only defined for handshake agreements, not {agreement_type:?}"
            )));
        }
        Ok(Self {
            spec,
            agreement_type,
            kdf,
            confirm,
        })
    }

    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn agreement_type(&self) -> AgreementType {
        self.agreement_type
    }

    #[must_use]
    pub fn kdf(&self) -> KdfSpec {
        self.kdf
    }

    #[must_use]
    pub fn with_confirm(&self) -> bool {
        self.confirm
    }
}

impl fmt::Display for KeyPairSetAgreementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.agreement_type, self.spec, self.kdf)?;
        if self.confirm {
            f.write_str("/confirm")?;
        }
        Ok(())
    }
}

/// Coarse progress of an agreement session.
///
/// Client: `Clean → AwaitingServerHello → Done`.
/// Server: `Clean → Done` or `Clean → AwaitingClientConfirm → Done`.
/// Anonymous sessions go `Clean → Done` on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgreementStatus {
    Clean,
    AwaitingServerHello,
    AwaitingClientConfirm,
    Done,
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgreementStatus::Clean => "CLEAN",
            AgreementStatus::AwaitingServerHello => "AWAITING_SERVERHELLO",
            AgreementStatus::AwaitingClientConfirm => "AWAITING_CLIENTCONFIRM",
            AgreementStatus::Done => "DONE",
        };
        f.write_str(s)
    }
}
