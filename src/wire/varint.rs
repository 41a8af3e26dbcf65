// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Base-128 varint and zigzag codecs.
//!
//! Varints encode unsigned integers seven bits at a time, least
//! significant group first, with the high bit of each byte flagging a
//! continuation. Zigzag maps signed integers onto unsigned ones so that
//! small negative magnitudes stay compact under varint encoding.

use crate::core::{CodecError, Result};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Byte length of `value` as a varint.
#[inline]
pub fn size_of_varint(value: u64) -> usize {
    let mut n = 1;
    let mut v = value >> 7;
    while v != 0 {
        n += 1;
        v >>= 7;
    }
    n
}

/// Append `value` as a varint to the output buffer.
pub fn append_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode a varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed. Sequences longer
/// than ten bytes, or whose tenth byte carries more than one significant
/// bit, overflow 64 bits and are rejected as [`CodecError::InvalidVarint`].
/// A buffer that ends mid-varint (including an empty buffer) reports
/// [`CodecError::UnexpectedEof`].
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(CodecError::invalid_varint(MAX_VARINT_LEN));
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::unexpected_eof(buf.len() + 1, buf.len()))
}

/// Zigzag-encode a signed 32-bit integer.
#[inline]
pub fn zigzag32(value: i32) -> u32 {
    ((value as u32) << 1) ^ ((value >> 31) as u32)
}

/// Invert [`zigzag32`].
#[inline]
pub fn unzigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Zigzag-encode a signed 64-bit integer.
#[inline]
pub fn zigzag64(value: i64) -> u64 {
    ((value as u64) << 1) ^ ((value >> 63) as u64)
}

/// Invert [`zigzag64`].
#[inline]
pub fn unzigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Decode a length prefix and verify the payload it announces is present.
///
/// Returns `(payload_len, header_len)`. A prefix announcing more bytes
/// than remain is truncation strictly inside a length-delimited unit.
pub fn read_length_prefix(buf: &[u8]) -> Result<(usize, usize)> {
    let (len, header) = decode_varint(buf)?;
    let available = (buf.len() - header) as u64;
    if len > available {
        return Err(CodecError::unexpected_eof(len as usize, available as usize));
    }
    Ok((len as usize, header))
}
