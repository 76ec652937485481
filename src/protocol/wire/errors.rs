use crate::core::cbor::CodecError;
use crate::protocol::registry::AlgorithmId;
use crate::protocol::wire::frame::FrameType;

/// Why a composite wire message was rejected. No partially decoded message
/// is ever returned alongside one of these.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,

    #[error("unknown frame type 0x{0:02x}")]
    UnknownFrame(u8),

    #[error("expected {expected:?} frame, got {actual:?}")]
    WrongFrame {
        expected: FrameType,
        actual: FrameType,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("algorithm identifier {0} is not registered")]
    UnknownAlgorithm(AlgorithmId),

    /// Blob count differs from the constituent count of the declared spec.
    #[error("expected {expected} blobs, found {actual}")]
    BlobCount { expected: usize, actual: usize },

    #[error("malformed message: {0}")]
    Malformed(String),
}
