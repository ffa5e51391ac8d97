//! Binary message framing shared with the game client.
//!
//! All integers are big-endian. Strings are an `int16` byte length followed
//! by UTF-8 bytes.

use crate::error::{ErrorSeverity, GameError};

/// Outbound message identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum MessageId {
    /// Repeated `{ id: i16, base×256: i32, modified×256: i32 }`.
    PlayerAttributeChange = 0x0130,
    /// `{ attribute_points: i16, correction_points: i16 }`.
    AttributePointsStatus = 0x0140,
    /// Repeated `{ id: i8, recharge_remaining_ms: i32 }`.
    AbilityStatus = 0x0293,
    /// `{ global_cooldown_remaining_ms: i16 }`.
    AbilityCooldown = 0x0295,
    /// `{ npc_id: i16 }`.
    NpcClose = 0x02B5,
}

impl MessageId {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Message under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageOut {
    id: MessageId,
    payload: Vec<u8>,
}

impl MessageOut {
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            payload: Vec::new(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.payload.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.payload.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.payload.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Writes a length-prefixed string, truncated to what an `int16` length
    /// can describe.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        let mut end = value.len().min(i16::MAX as usize);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        self.write_i16(end as i16);
        self.payload.extend_from_slice(&value.as_bytes()[..end]);
        self
    }

    /// Bytes written after the id.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Full frame: id followed by the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.payload.len());
        bytes.extend_from_slice(&self.id.code().to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

/// Failure to read a primitive from an inbound message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("message truncated: needed {needed} bytes at offset {offset}, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("negative string length {0}")]
    NegativeLength(i16),

    #[error("string at offset {0} is not valid UTF-8")]
    InvalidString(usize),
}

impl GameError for WireError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "WIRE_TRUNCATED",
            Self::NegativeLength(_) => "WIRE_NEGATIVE_LENGTH",
            Self::InvalidString(_) => "WIRE_INVALID_STRING",
        }
    }
}

/// Cursor over an inbound payload.
#[derive(Clone, Debug)]
pub struct MessageIn<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> MessageIn<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let bytes = self.take_slice(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    fn take_slice(&mut self, needed: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < needed {
            return Err(WireError::Truncated {
                offset: self.offset,
                needed,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(slice)
    }

    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        self.take::<1>().map(i8::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        self.take::<2>().map(i16::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        self.take::<4>().map(i32::from_be_bytes)
    }

    pub fn read_string(&mut self) -> Result<String, WireError> {
        let length = self.read_i16()?;
        let length = usize::try_from(length).map_err(|_| WireError::NegativeLength(length))?;
        let start = self.offset;
        let bytes = self.take_slice(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidString(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_is_big_endian_and_prefixes_the_id() {
        let mut msg = MessageOut::new(MessageId::NpcClose);
        msg.write_i16(0x0102);

        assert_eq!(msg.payload(), &[0x01, 0x02]);
        assert_eq!(msg.to_bytes(), vec![0x02, 0xB5, 0x01, 0x02]);
    }

    #[test]
    fn reader_consumes_what_the_writer_produces() {
        let mut msg = MessageOut::new(MessageId::AbilityStatus);
        msg.write_i32(-7).write_string("Ayla").write_i8(-1);

        let mut reader = MessageIn::new(msg.payload());
        assert_eq!(reader.read_i32(), Ok(-7));
        assert_eq!(reader.read_string().as_deref(), Ok("Ayla"));
        assert_eq!(reader.read_i8(), Ok(-1));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_input_is_reported() {
        let mut reader = MessageIn::new(&[0x00, 0x05, b'a']);
        assert_eq!(
            reader.read_string(),
            Err(WireError::Truncated {
                offset: 2,
                needed: 5,
                available: 1
            })
        );
    }

    #[test]
    fn negative_length_and_bad_utf8() {
        assert_eq!(
            MessageIn::new(&[0xFF, 0xFF]).read_string(),
            Err(WireError::NegativeLength(-1))
        );
        assert_eq!(
            MessageIn::new(&[0x00, 0x01, 0xFF]).read_string(),
            Err(WireError::InvalidString(2))
        );
    }
}
