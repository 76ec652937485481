//! Caller-side defaults for negotiating agreements.
//!
//! Nothing in the crate reads configuration implicitly: callers load a
//! [`KeyPairSetConfig`] (or use `Default`) and ask it for the agreement
//! spec to hand to a session.

use crate::core::cbor::to_cbor;
use crate::domain::keypairset::{AgreementType, KdfSpec, KeyPairSetAgreementSpec, KeyPairSetError, KeyPairSetSpec};
use crate::protocol::registry::registry;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Agreement defaults. Missing fields fall back to [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPairSetConfig {
    /// Post-processing applied to combined secrets.
    pub kdf: KdfSpec,
    /// Whether handshake agreements add the confirmation round.
    pub handshake_confirm: bool,
}

impl Default for KeyPairSetConfig {
    fn default() -> Self {
        Self {
            kdf: KdfSpec::Sha384Kdf,
            handshake_confirm: true,
        }
    }
}

impl KeyPairSetConfig {
    /// Load from CBOR. Unlike wire messages, partial maps are accepted since
    /// absent keys take their defaults; trailing bytes are still rejected.
    ///
    /// # Errors
    /// `Config` for undecodable input or trailing bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, KeyPairSetError> {
        let mut cur = Cursor::new(bytes);
        let cfg: Self = ciborium::de::from_reader(&mut cur)
            .map_err(|e| KeyPairSetError::Config(e.to_string()))?;
        if usize::try_from(cur.position()).ok() != Some(bytes.len()) {
            return Err(KeyPairSetError::Config("trailing bytes after config".into()));
        }
        Ok(cfg)
    }

    /// # Errors
    /// `Encode` if serialization fails.
    pub fn to_cbor(&self) -> Result<Vec<u8>, KeyPairSetError> {
        Ok(to_cbor(self)?)
    }

    /// Agreement spec for `spec` and `agreement_type` under these defaults.
    /// Confirmation only ever applies to handshakes.
    ///
    /// # Errors
    /// `UnsupportedSpec` if `spec` cannot agree.
    pub fn agreement_spec(
        &self,
        spec: KeyPairSetSpec,
        agreement_type: AgreementType,
    ) -> Result<KeyPairSetAgreementSpec, KeyPairSetError> {
        let confirm = agreement_type == AgreementType::Handshake && self.handshake_confirm;
        let agreement = KeyPairSetAgreementSpec::new(spec, agreement_type, self.kdf, confirm)?;
        registry().id_for_agreement_spec(&agreement)?;
        Ok(agreement)
    }
}
