use crate::domain::keypairset::errors::KeyPairSetError;
use crate::domain::keypairset::primitive::{PrimitiveKeyPair, PrimitiveSpec};
use crate::domain::keypairset::spec::KeyPairSetSpec;
use core::fmt;

/// A composite key pair: exactly one constituent pair per primitive of
/// `spec`, stored in spec order, all sharing the same public-only flag.
///
/// Instances are immutable. They are produced by [`KeyPairSetBuilder`]
/// (normally driven by the generator) and projected with
/// [`KeyPairSet::public_only`].
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPairSet {
    spec: KeyPairSetSpec,
    pairs: Vec<PrimitiveKeyPair>,
    public_only: bool,
}

impl KeyPairSet {
    #[must_use]
    pub fn spec(&self) -> KeyPairSetSpec {
        self.spec
    }

    #[must_use]
    pub fn is_public_only(&self) -> bool {
        self.public_only
    }

    /// Constituent pairs in spec order.
    #[must_use]
    pub fn pairs(&self) -> &[PrimitiveKeyPair] {
        &self.pairs
    }

    /// Constituent pair for `primitive`, if it is part of this set.
    #[must_use]
    pub fn pair(&self, primitive: PrimitiveSpec) -> Option<&PrimitiveKeyPair> {
        self.spec.index_of(primitive).map(|i| &self.pairs[i])
    }

    /// New set holding only the public halves.
    #[must_use]
    pub fn public_only(&self) -> KeyPairSet {
        KeyPairSet {
            spec: self.spec,
            pairs: self.pairs.iter().map(PrimitiveKeyPair::to_public_only).collect(),
            public_only: true,
        }
    }

    /// Fail with `MismatchedSpec` unless this set is of kind `expected`.
    ///
    /// # Errors
    /// `KeyPairSetError::MismatchedSpec` on disagreement.
    pub fn check_spec(&self, expected: KeyPairSetSpec) -> Result<(), KeyPairSetError> {
        if self.spec == expected {
            Ok(())
        } else {
            Err(KeyPairSetError::MismatchedSpec {
                expected,
                actual: self.spec,
            })
        }
    }

    /// Fail with `PublicOnly` unless private halves are present.
    ///
    /// # Errors
    /// `KeyPairSetError::PublicOnly` for a public-only set.
    pub fn require_private(&self) -> Result<(), KeyPairSetError> {
        if self.public_only {
            Err(KeyPairSetError::PublicOnly)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for KeyPairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairSet")
            .field("spec", &self.spec)
            .field("public_only", &self.public_only)
            .field("pairs", &self.pairs)
            .finish()
    }
}

/// Incremental constructor for [`KeyPairSet`].
///
/// Constituents must be pushed in spec order; the first pushed pair fixes
/// the public-only flag for the whole set.
#[derive(Debug)]
pub struct KeyPairSetBuilder {
    spec: KeyPairSetSpec,
    pairs: Vec<PrimitiveKeyPair>,
    public_only: Option<bool>,
}

impl KeyPairSetBuilder {
    #[must_use]
    pub fn new(spec: KeyPairSetSpec) -> Self {
        Self {
            spec,
            pairs: Vec::with_capacity(spec.num_key_pairs()),
            public_only: None,
        }
    }

    /// Primitive expected by the next `push`, or `None` when complete.
    #[must_use]
    pub fn next_primitive(&self) -> Option<PrimitiveSpec> {
        self.spec.constituents().get(self.pairs.len()).copied()
    }

    /// Append the next constituent pair.
    ///
    /// # Errors
    /// `KeyPairSetError::InvalidKeyPairSet` when the set is already complete,
    /// the pair is for the wrong primitive, or its public-only flag differs
    /// from the pairs already pushed.
    pub fn push(&mut self, pair: PrimitiveKeyPair) -> Result<&mut Self, KeyPairSetError> {
        let expected = self.next_primitive().ok_or_else(|| {
            KeyPairSetError::InvalidKeyPairSet(format!("{} is already complete", self.spec))
        })?;
        if pair.spec() != expected {
            return Err(KeyPairSetError::InvalidKeyPairSet(format!(
                "slot {} of {} expects {expected}, got {}",
                self.pairs.len(),
                self.spec,
                pair.spec()
            )));
        }
        match self.public_only {
            Some(flag) if flag != pair.is_public_only() => {
                return Err(KeyPairSetError::InvalidKeyPairSet(
                    "constituents disagree on public-only flag".into(),
                ));
            }
            Some(_) => {}
            None => self.public_only = Some(pair.is_public_only()),
        }
        self.pairs.push(pair);
        Ok(self)
    }

    /// Finish the set.
    ///
    /// # Errors
    /// `KeyPairSetError::InvalidKeyPairSet` if any constituent is missing.
    pub fn build(self) -> Result<KeyPairSet, KeyPairSetError> {
        if let Some(missing) = self.next_primitive() {
            return Err(KeyPairSetError::InvalidKeyPairSet(format!(
                "{} is missing constituent {missing}",
                self.spec
            )));
        }
        Ok(KeyPairSet {
            spec: self.spec,
            pairs: self.pairs,
            public_only: self.public_only.unwrap_or(false),
        })
    }
}
