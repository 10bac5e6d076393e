//! Wire field framing and bounds checking.
//!
//! Every item that crosses the wire is one length-prefixed tagged field:
//!
//! ```text
//! +----------------+----------+----------------------+
//! | LENGTH (2B BE) | KIND (1B)| PAYLOAD (LENGTH-1 B) |
//! +----------------+----------+----------------------+
//! ```
//!
//! Integers travel as big-endian magnitudes (zero is one 0x00 byte),
//! the ciphertext travels as UTF-8 hex text. An unknown kind, an empty
//! body or an oversize body is a protocol violation. Validation happens
//! at parse time; a constructed field is always well-formed.

use num_bigint::BigUint;

use crate::error::ProtocolError;

/// Maximum field body length (kind byte + payload).
pub const MAX_FIELD_LENGTH: usize = 4096;

/// Minimum body length (at least the kind byte).
pub const MIN_BODY_LENGTH: usize = 1;

/// Length prefix size.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Field kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldKind {
    /// Arbitrary-precision unsigned integer, big-endian magnitude.
    Integer = 0x01,

    /// UTF-8 text (the hex-encoded ciphertext).
    Text = 0x02,
}

impl FieldKind {
    /// Parse a field kind from its wire byte.
    /// Returns an error for unknown kinds. No fallback. No default.
    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x01 => Ok(Self::Integer),
            0x02 => Ok(Self::Text),
            _ => Err(ProtocolError::UnknownFieldKind),
        }
    }

    /// Convert to the wire byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// A validated wire field.
///
/// Fields are immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireField {
    kind: FieldKind,
    payload: Vec<u8>,
}

impl WireField {
    /// Parse a field from raw bytes (body only, after the length prefix).
    ///
    /// # Errors
    ///
    /// Returns an error if the body is empty, exceeds
    /// [`MAX_FIELD_LENGTH`], or carries an unknown kind byte.
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        if body.is_empty() {
            return Err(ProtocolError::FieldEmpty);
        }
        if body.len() > MAX_FIELD_LENGTH {
            return Err(ProtocolError::FieldTooLarge);
        }

        let kind = FieldKind::from_byte(body[0])?;
        Ok(Self {
            kind,
            payload: body[1..].to_vec(),
        })
    }

    /// Read the length prefix.
    ///
    /// Returns the body length (not including the prefix itself).
    ///
    /// # Errors
    ///
    /// Returns an error if the length is 0 or exceeds
    /// [`MAX_FIELD_LENGTH`].
    pub fn read_length(bytes: &[u8; LENGTH_PREFIX_SIZE]) -> Result<usize, ProtocolError> {
        let length = u16::from_be_bytes(*bytes) as usize;
        if length < MIN_BODY_LENGTH {
            return Err(ProtocolError::FieldEmpty);
        }
        if length > MAX_FIELD_LENGTH {
            return Err(ProtocolError::FieldTooLarge);
        }
        Ok(length)
    }

    /// Create an Integer field.
    ///
    /// # Errors
    ///
    /// Returns an error if the magnitude would exceed the wire limit.
    pub fn integer(value: &BigUint) -> Result<Self, ProtocolError> {
        let payload = value.to_bytes_be();
        if payload.len() + 1 > MAX_FIELD_LENGTH {
            return Err(ProtocolError::FieldTooLarge);
        }
        Ok(Self {
            kind: FieldKind::Integer,
            payload,
        })
    }

    /// Create a Text field.
    ///
    /// # Errors
    ///
    /// Returns an error if the text would exceed the wire limit.
    pub fn text(value: &str) -> Result<Self, ProtocolError> {
        if value.len() + 1 > MAX_FIELD_LENGTH {
            return Err(ProtocolError::FieldTooLarge);
        }
        Ok(Self {
            kind: FieldKind::Text,
            payload: value.as_bytes().to_vec(),
        })
    }

    /// Get the field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Interpret the payload as an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not an Integer field.
    pub fn as_integer(&self) -> Result<BigUint, ProtocolError> {
        if self.kind != FieldKind::Integer {
            return Err(ProtocolError::UnexpectedFieldKind);
        }
        Ok(BigUint::from_bytes_be(&self.payload))
    }

    /// Interpret the payload as text.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not a Text field or the payload is
    /// not valid UTF-8.
    pub fn as_text(&self) -> Result<&str, ProtocolError> {
        if self.kind != FieldKind::Text {
            return Err(ProtocolError::UnexpectedFieldKind);
        }
        std::str::from_utf8(&self.payload).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Serialize to wire format (length prefix + kind + payload).
    pub fn to_wire(&self) -> Vec<u8> {
        let body_len = 1 + self.payload.len();
        let mut wire = Vec::with_capacity(LENGTH_PREFIX_SIZE + body_len);

        // Cast is safe: construction bounds body_len by MAX_FIELD_LENGTH
        // which fits in a u16.
        #[allow(clippy::cast_possible_truncation)]
        let len_bytes = (body_len as u16).to_be_bytes();
        wire.extend_from_slice(&len_bytes);
        wire.push(self.kind.to_byte());
        wire.extend_from_slice(&self.payload);
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_field_kind_round_trip() {
        for byte in [0x01, 0x02] {
            let kind = FieldKind::from_byte(byte).unwrap();
            assert_eq!(kind.to_byte(), byte);
        }
    }

    #[test]
    fn test_unknown_field_kind() {
        for byte in [0x00, 0x03, 0xFF] {
            assert_eq!(
                FieldKind::from_byte(byte),
                Err(ProtocolError::UnknownFieldKind)
            );
        }
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(WireField::parse(&[]), Err(ProtocolError::FieldEmpty));
    }

    #[test]
    fn test_integer_wire_round_trip() {
        let value = BigUint::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
        let field = WireField::integer(&value).unwrap();
        let wire = field.to_wire();

        let len = WireField::read_length(&[wire[0], wire[1]]).unwrap();
        assert_eq!(len, wire.len() - LENGTH_PREFIX_SIZE);

        let parsed = WireField::parse(&wire[LENGTH_PREFIX_SIZE..]).unwrap();
        assert_eq!(parsed.kind(), FieldKind::Integer);
        assert_eq!(parsed.as_integer().unwrap(), value);
    }

    #[test]
    fn test_zero_encodes_as_one_byte() {
        let field = WireField::integer(&BigUint::zero()).unwrap();
        let wire = field.to_wire();
        assert_eq!(wire, vec![0x00, 0x02, 0x01, 0x00]);
        let parsed = WireField::parse(&wire[LENGTH_PREFIX_SIZE..]).unwrap();
        assert!(parsed.as_integer().unwrap().is_zero());
    }

    #[test]
    fn test_text_wire_round_trip() {
        let field = WireField::text("a1b2c3").unwrap();
        let wire = field.to_wire();
        let parsed = WireField::parse(&wire[LENGTH_PREFIX_SIZE..]).unwrap();
        assert_eq!(parsed.kind(), FieldKind::Text);
        assert_eq!(parsed.as_text().unwrap(), "a1b2c3");
    }

    #[test]
    fn test_kind_mismatch_is_violation() {
        let int_field = WireField::integer(&BigUint::from(7u32)).unwrap();
        assert_eq!(int_field.as_text(), Err(ProtocolError::UnexpectedFieldKind));

        let text_field = WireField::text("hi").unwrap();
        assert_eq!(
            text_field.as_integer(),
            Err(ProtocolError::UnexpectedFieldKind)
        );
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(
            WireField::read_length(&0u16.to_be_bytes()),
            Err(ProtocolError::FieldEmpty)
        );
        assert_eq!(
            WireField::read_length(&(MAX_FIELD_LENGTH as u16 + 1).to_be_bytes()),
            Err(ProtocolError::FieldTooLarge)
        );
        assert_eq!(WireField::read_length(&1u16.to_be_bytes()), Ok(1));
    }

    #[test]
    fn test_oversize_text_rejected() {
        let big = "a".repeat(MAX_FIELD_LENGTH);
        assert_eq!(WireField::text(&big), Err(ProtocolError::FieldTooLarge));
    }

    #[test]
    fn test_non_utf8_text_rejected() {
        let parsed = WireField::parse(&[0x02, 0xFF, 0xFE]).unwrap();
        assert_eq!(parsed.as_text(), Err(ProtocolError::InvalidUtf8));
    }
}
