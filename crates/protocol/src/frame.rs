//! Integer and data-frame codec.
//!
//! The server is a C program exchanging raw structs, so the layout is fixed:
//! `long int` fields are 4-byte little-endian and a data frame is always the
//! full 2056-byte struct regardless of how much payload it carries.

use crate::{ACK_LEN, FRAME_LEN, FRAME_PAYLOAD, ProtocolError};

/// A decoded view into a data-frame datagram.
///
/// `payload` borrows the meaningful bytes only; padding past the length
/// field is already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRef<'a> {
    /// 1-based sequence number within the transfer.
    pub id: i32,
    /// The `length` leading bytes of the payload slot.
    pub payload: &'a [u8],
}

/// Encodes an i32 as 4 little-endian bytes.
pub fn encode_i32(value: i32) -> [u8; ACK_LEN] {
    value.to_le_bytes()
}

/// Decodes an i32 from the first 4 bytes of a datagram.
pub fn decode_i32(bytes: &[u8]) -> Result<i32, ProtocolError> {
    let Some(head) = bytes.get(..ACK_LEN) else {
        return Err(ProtocolError::ShortDatagram {
            expected: ACK_LEN,
            got: bytes.len(),
        });
    };
    let mut raw = [0u8; ACK_LEN];
    raw.copy_from_slice(head);
    Ok(i32::from_le_bytes(raw))
}

/// Builds a full 2056-byte frame datagram: id, payload length, payload,
/// zero padding.
pub fn encode_frame(id: i32, payload: &[u8]) -> Result<[u8; FRAME_LEN], ProtocolError> {
    if payload.len() > FRAME_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge { len: payload.len() });
    }
    let mut buf = [0u8; FRAME_LEN];
    buf[..4].copy_from_slice(&id.to_le_bytes());
    buf[4..8].copy_from_slice(&(payload.len() as i32).to_le_bytes());
    buf[8..8 + payload.len()].copy_from_slice(payload);
    Ok(buf)
}

/// Decodes a frame datagram into its id and meaningful payload bytes.
///
/// Rejects datagrams shorter than the fixed frame size and length fields
/// outside `0..=2048`.
pub fn decode_frame(bytes: &[u8]) -> Result<FrameRef<'_>, ProtocolError> {
    if bytes.len() < FRAME_LEN {
        return Err(ProtocolError::ShortDatagram {
            expected: FRAME_LEN,
            got: bytes.len(),
        });
    }
    let id = decode_i32(&bytes[..4])?;
    let length = decode_i32(&bytes[4..8])?;
    if length < 0 || length as usize > FRAME_PAYLOAD {
        return Err(ProtocolError::InvalidLength(length));
    }
    Ok(FrameRef {
        id,
        payload: &bytes[8..8 + length as usize],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_roundtrip() {
        for value in [0, 1, -1, 904, i32::MAX, i32::MIN] {
            assert_eq!(decode_i32(&encode_i32(value)).unwrap(), value);
        }
    }

    #[test]
    fn i32_is_little_endian() {
        assert_eq!(encode_i32(1), [1, 0, 0, 0]);
        assert_eq!(encode_i32(0x0102_0304), [4, 3, 2, 1]);
    }

    #[test]
    fn i32_rejects_short_input() {
        let err = decode_i32(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ShortDatagram { expected: 4, got: 3 }
        ));
    }

    #[test]
    fn frame_roundtrip() {
        let payload = b"hello frame";
        let wire = encode_frame(7, payload).unwrap();
        assert_eq!(wire.len(), FRAME_LEN);

        let frame = decode_frame(&wire).unwrap();
        assert_eq!(frame.id, 7);
        assert_eq!(frame.payload, payload);
    }

    #[test]
    fn frame_wire_size_is_fixed() {
        let empty = encode_frame(1, b"").unwrap();
        let full = encode_frame(1, &[0xAB; FRAME_PAYLOAD]).unwrap();
        assert_eq!(empty.len(), FRAME_LEN);
        assert_eq!(full.len(), FRAME_LEN);
    }

    #[test]
    fn frame_padding_is_ignored() {
        let mut wire = encode_frame(3, b"abc").unwrap();
        // Garbage past `length` must not leak into the payload view.
        wire[11..].fill(0xFF);
        let frame = decode_frame(&wire).unwrap();
        assert_eq!(frame.payload, b"abc");
    }

    #[test]
    fn frame_rejects_oversized_payload() {
        let err = encode_frame(1, &[0u8; FRAME_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadTooLarge { len } if len == FRAME_PAYLOAD + 1));
    }

    #[test]
    fn frame_rejects_short_datagram() {
        let err = decode_frame(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, ProtocolError::ShortDatagram { .. }));
    }

    #[test]
    fn frame_rejects_bad_length_field() {
        let mut wire = [0u8; FRAME_LEN];
        wire[..4].copy_from_slice(&1i32.to_le_bytes());
        wire[4..8].copy_from_slice(&(FRAME_PAYLOAD as i32 + 1).to_le_bytes());
        assert!(matches!(
            decode_frame(&wire).unwrap_err(),
            ProtocolError::InvalidLength(_)
        ));

        wire[4..8].copy_from_slice(&(-5i32).to_le_bytes());
        assert!(matches!(
            decode_frame(&wire).unwrap_err(),
            ProtocolError::InvalidLength(-5)
        ));
    }
}
