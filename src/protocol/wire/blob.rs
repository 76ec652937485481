//! Opaque per-constituent byte blob, serialized as a CBOR byte string.

use crate::domain::keypairset::params::BLOB_MAX;
use crate::protocol::wire::errors::DecodeError;
use core::fmt;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct Blob(Vec<u8>);

impl Blob {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({} bytes)", self.0.len())
    }
}

impl Serialize for Blob {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        // A byte string, not a sequence of u8.
        s.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct V;
        impl serde::de::Visitor<'_> for V {
            type Value = Vec<u8>;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "byte string of at most {BLOB_MAX} bytes")
            }
            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                self.visit_byte_buf(v.to_vec())
            }
            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                if v.len() > BLOB_MAX {
                    return Err(E::invalid_length(v.len(), &self));
                }
                Ok(v)
            }
        }
        d.deserialize_byte_buf(V).map(Blob)
    }
}

/// Fail unless exactly `expected` blobs are present.
///
/// # Errors
/// `DecodeError::BlobCount`.
pub fn check_count<T>(items: &[T], expected: usize) -> Result<(), DecodeError> {
    if items.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::BlobCount {
            expected,
            actual: items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cbor::{from_cbor, to_cbor};

    #[test]
    fn encodes_as_byte_string() {
        let b = Blob::new(vec![1, 2, 3]);
        // major type 2 (bytes), length 3
        assert_eq!(to_cbor(&b).unwrap(), vec![0x43, 1, 2, 3]);
        let back: Blob = from_cbor(&[0x43, 1, 2, 3]).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn integer_array_form_is_rejected() {
        // [1, 2, 3] as a CBOR array of ints
        assert!(from_cbor::<Blob>(&[0x83, 1, 2, 3]).is_err());
    }

    #[test]
    fn count_check() {
        assert!(check_count(&[0u8; 3], 3).is_ok());
        assert!(matches!(
            check_count(&[0u8; 2], 3),
            Err(DecodeError::BlobCount {
                expected: 3,
                actual: 2
            })
        ));
    }
}
