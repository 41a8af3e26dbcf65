// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire-format primitives.
//!
//! The lowest layer of the codec engine: varint/zigzag/fixed integer
//! codecs and tag assembly. Everything above (scalar codecs, message,
//! repeated and map codecs) is built from these.
//!
//! A tag is `(field_number << 3) | wire_type`, encoded as a varint. The
//! wire type tells a decoder the shape of the payload that follows, so
//! unknown fields can be skipped without schema knowledge.

pub mod fixed;
pub mod varint;

use crate::core::{CodecError, Result};

/// Largest field number representable in a tag (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Payload shape carried in the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint payload
    Varint = 0,
    /// 8-byte little-endian payload
    Fixed64 = 1,
    /// Varint length prefix followed by that many bytes
    LengthDelimited = 2,
    /// Legacy group start; accepted on decode as length-delimited, never emitted
    StartGroup = 3,
    /// Legacy group end; accepted on decode as length-delimited, never emitted
    EndGroup = 4,
    /// 4-byte little-endian payload
    Fixed32 = 5,
}

impl WireType {
    /// Parse a wire type from the low three bits of a tag.
    ///
    /// Values 6 and 7 are not assigned by the format and make the tag
    /// malformed.
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(CodecError::malformed_tag(
                u64::from(value),
                format!("unknown wire type {value}"),
            )),
        }
    }
}

/// Assemble the raw tag value for a field number and wire type.
#[inline]
pub fn make_tag(number: u32, wire: WireType) -> u64 {
    (u64::from(number) << 3) | u64::from(wire as u8)
}

/// Byte length of an encoded tag.
#[inline]
pub fn size_of_tag(number: u32, wire: WireType) -> usize {
    varint::size_of_varint(make_tag(number, wire))
}

/// Append an encoded tag to the output buffer.
pub fn append_tag(buf: &mut Vec<u8>, number: u32, wire: WireType) {
    varint::append_varint(buf, make_tag(number, wire));
}

/// Decode a tag from the front of `buf`.
///
/// Returns the field number, wire type, and bytes consumed. A field
/// number of zero or above [`MAX_FIELD_NUMBER`] is malformed, as is a
/// wire type of 6 or 7.
pub fn decode_tag(buf: &[u8]) -> Result<(u32, WireType, usize)> {
    let (tag, consumed) = varint::decode_varint(buf)?;
    let number = tag >> 3;
    if number == 0 {
        return Err(CodecError::malformed_tag(tag, "field number 0"));
    }
    if number > u64::from(MAX_FIELD_NUMBER) {
        return Err(CodecError::malformed_tag(
            tag,
            format!("field number {number} out of range"),
        ));
    }
    let wire = WireType::from_value((tag & 0x7) as u8)?;
    Ok((number as u32, wire, consumed))
}
