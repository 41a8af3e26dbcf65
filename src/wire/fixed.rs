// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixed-width wire codecs.
//!
//! Fixed32 and fixed64 payloads are the raw little-endian bytes of the
//! value; floats travel as their IEEE 754 bit patterns.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CodecError, Result};

/// Byte width of a fixed32 payload.
pub const FIXED32_LEN: usize = 4;

/// Byte width of a fixed64 payload.
pub const FIXED64_LEN: usize = 8;

/// Append a 32-bit value as four little-endian bytes.
pub fn append_fixed32(buf: &mut Vec<u8>, value: u32) {
    let mut raw = [0u8; FIXED32_LEN];
    LittleEndian::write_u32(&mut raw, value);
    buf.extend_from_slice(&raw);
}

/// Append a 64-bit value as eight little-endian bytes.
pub fn append_fixed64(buf: &mut Vec<u8>, value: u64) {
    let mut raw = [0u8; FIXED64_LEN];
    LittleEndian::write_u64(&mut raw, value);
    buf.extend_from_slice(&raw);
}

/// Read a fixed32 payload from the front of `buf`.
pub fn read_fixed32(buf: &[u8]) -> Result<(u32, usize)> {
    if buf.len() < FIXED32_LEN {
        return Err(CodecError::unexpected_eof(FIXED32_LEN, buf.len()));
    }
    Ok((LittleEndian::read_u32(buf), FIXED32_LEN))
}

/// Read a fixed64 payload from the front of `buf`.
pub fn read_fixed64(buf: &[u8]) -> Result<(u64, usize)> {
    if buf.len() < FIXED64_LEN {
        return Err(CodecError::unexpected_eof(FIXED64_LEN, buf.len()));
    }
    Ok((LittleEndian::read_u64(buf), FIXED64_LEN))
}
