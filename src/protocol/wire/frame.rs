//! Frame type preamble shared by every composite wire message.

use crate::protocol::wire::errors::DecodeError;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    PublicKey = 0x01,
    PrivateKey = 0x02,
    Agreement = 0x03,
    Signature = 0x04,
}

impl TryFrom<u8> for FrameType {
    type Error = DecodeError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0x01 => Ok(Self::PublicKey),
            0x02 => Ok(Self::PrivateKey),
            0x03 => Ok(Self::Agreement),
            0x04 => Ok(Self::Signature),
            _ => Err(DecodeError::UnknownFrame(v)),
        }
    }
}

#[inline]
pub fn prepend_frame(ft: FrameType, payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(ft as u8);
    out.extend_from_slice(&payload);
    out
}

/// Split off the preamble and check it is `expected`.
///
/// # Errors
/// `Empty`, `UnknownFrame` or `WrongFrame`.
#[inline]
pub fn split_frame(expected: FrameType, input: &[u8]) -> Result<&[u8], DecodeError> {
    let (&first, rest) = input.split_first().ok_or(DecodeError::Empty)?;
    let ft = FrameType::try_from(first)?;
    if ft != expected {
        return Err(DecodeError::WrongFrame {
            expected,
            actual: ft,
        });
    }
    Ok(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_then_split() {
        let framed = prepend_frame(FrameType::Signature, vec![0xA0]);
        assert_eq!(framed, vec![0x04, 0xA0]);
        assert_eq!(split_frame(FrameType::Signature, &framed).unwrap(), &[0xA0]);
    }

    #[test]
    fn wrong_unknown_and_empty_frames() {
        assert!(matches!(
            split_frame(FrameType::PublicKey, &[0x02, 0xA0]),
            Err(DecodeError::WrongFrame {
                expected: FrameType::PublicKey,
                actual: FrameType::PrivateKey
            })
        ));
        assert!(matches!(
            split_frame(FrameType::PublicKey, &[0x7F]),
            Err(DecodeError::UnknownFrame(0x7F))
        ));
        assert!(matches!(
            split_frame(FrameType::PublicKey, &[]),
            Err(DecodeError::Empty)
        ));
    }
}
