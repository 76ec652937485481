//! Algorithm identifier registry.
//!
//! Every composite kind and every valid agreement configuration gets a
//! stable OID-style identifier under a fixed, versioned arc:
//!
//! ```text
//! base                         = 1.3.6.1.4.1.58426.7
//! key pair set                 = base.1.<spec>
//! agreement                    = base.2.<type>.<spec>.<kdf>.<confirm>
//! ```
//!
//! Branch numbers are assigned statically per variant and never derived from
//! content, so adding a variant never renumbers an existing one.

use crate::domain::keypairset::{
    AgreementType, KdfSpec, KeyPairSetAgreementSpec, KeyPairSetError, KeyPairSetSpec,
};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Arc prefix shared by every identifier this crate emits.
pub const BASE_ARC: [u32; 8] = [1, 3, 6, 1, 4, 1, 58426, 7];

const KEY_PAIR_SET_ARC: u32 = 1;
const AGREEMENT_ARC: u32 = 2;

/// OID-style algorithm identifier carried in every wire message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmId(Vec<u32>);

impl AlgorithmId {
    fn under_base(tail: &[u32]) -> Self {
        let mut arcs = Vec::with_capacity(BASE_ARC.len() + tail.len());
        arcs.extend_from_slice(&BASE_ARC);
        arcs.extend_from_slice(tail);
        Self(arcs)
    }

    /// Identifier from raw arcs. No validation: unknown ids simply fail to
    /// resolve in the registry.
    #[must_use]
    pub fn from_arcs(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }

    #[must_use]
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Big-endian arc bytes, used to bind derived secrets to the identifier.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|a| a.to_be_bytes()).collect()
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
            first = false;
        }
        Ok(())
    }
}

fn spec_branch(spec: KeyPairSetSpec) -> u32 {
    match spec {
        KeyPairSetSpec::Sign2 => 1,
        KeyPairSetSpec::Sign3 => 2,
        KeyPairSetSpec::Agree2 => 3,
        KeyPairSetSpec::Unified1 => 4,
    }
}

fn type_branch(t: AgreementType) -> u32 {
    match t {
        AgreementType::Anonymous => 1,
        AgreementType::Signed => 2,
        AgreementType::Handshake => 3,
    }
}

fn kdf_branch(kdf: KdfSpec) -> u32 {
    match kdf {
        KdfSpec::None => 0,
        KdfSpec::Sha256Kdf => 1,
        KdfSpec::Sha384Kdf => 2,
    }
}

/// Immutable bidirectional tables between specs and identifiers.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    spec_by_id: HashMap<AlgorithmId, KeyPairSetSpec>,
    id_by_spec: HashMap<KeyPairSetSpec, AlgorithmId>,
    agreement_by_id: HashMap<AlgorithmId, KeyPairSetAgreementSpec>,
    id_by_agreement: HashMap<KeyPairSetAgreementSpec, AlgorithmId>,
}

/// Build the registry from scratch. Pure; callers normally go through
/// [`registry`].
#[must_use]
pub fn build_registry() -> SpecRegistry {
    let mut reg = SpecRegistry {
        spec_by_id: HashMap::new(),
        id_by_spec: HashMap::new(),
        agreement_by_id: HashMap::new(),
        id_by_agreement: HashMap::new(),
    };
    for spec in KeyPairSetSpec::ALL {
        let id = AlgorithmId::under_base(&[KEY_PAIR_SET_ARC, spec_branch(spec)]);
        reg.spec_by_id.insert(id.clone(), spec);
        reg.id_by_spec.insert(spec, id);
    }
    for spec in KeyPairSetSpec::ALL {
        for t in AgreementType::ALL {
            for kdf in KdfSpec::ALL {
                for confirm in [false, true] {
                    // Invalid combinations are simply not registered.
                    let Ok(a) = KeyPairSetAgreementSpec::new(spec, t, kdf, confirm) else {
                        continue;
                    };
                    let id = AlgorithmId::under_base(&[
                        AGREEMENT_ARC,
                        type_branch(t),
                        spec_branch(spec),
                        kdf_branch(kdf),
                        u32::from(confirm),
                    ]);
                    reg.agreement_by_id.insert(id.clone(), a);
                    reg.id_by_agreement.insert(a, id);
                }
            }
        }
    }
    reg
}

/// Process-wide registry, built on first use.
pub fn registry() -> &'static SpecRegistry {
    static REGISTRY: OnceLock<SpecRegistry> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

impl SpecRegistry {
    /// # Errors
    /// `UnsupportedSpec` for an identifier that names no key pair set kind.
    pub fn spec_for_id(&self, id: &AlgorithmId) -> Result<KeyPairSetSpec, KeyPairSetError> {
        self.spec_by_id
            .get(id)
            .copied()
            .ok_or_else(|| KeyPairSetError::UnsupportedSpec(format!("unknown key pair set id {id}")))
    }

    /// # Errors
    /// `UnsupportedSpec` if `spec` was never registered.
    pub fn id_for_spec(&self, spec: KeyPairSetSpec) -> Result<&AlgorithmId, KeyPairSetError> {
        self.id_by_spec
            .get(&spec)
            .ok_or_else(|| KeyPairSetError::UnsupportedSpec(format!("{spec} has no identifier")))
    }

    /// # Errors
    /// `UnsupportedSpec` for an identifier that names no agreement.
    pub fn agreement_spec_for_id(
        &self,
        id: &AlgorithmId,
    ) -> Result<KeyPairSetAgreementSpec, KeyPairSetError> {
        self.agreement_by_id
            .get(id)
            .copied()
            .ok_or_else(|| KeyPairSetError::UnsupportedSpec(format!("unknown agreement id {id}")))
    }

    /// # Errors
    /// `UnsupportedSpec` if `spec` was never registered.
    pub fn id_for_agreement_spec(
        &self,
        spec: &KeyPairSetAgreementSpec,
    ) -> Result<&AlgorithmId, KeyPairSetError> {
        self.id_by_agreement
            .get(spec)
            .ok_or_else(|| KeyPairSetError::UnsupportedSpec(format!("{spec} has no identifier")))
    }

    /// Number of registered agreement configurations.
    #[must_use]
    pub fn agreement_count(&self) -> usize {
        self.agreement_by_id.len()
    }
}
