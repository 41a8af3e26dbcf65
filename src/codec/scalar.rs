// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-kind scalar codecs.
//!
//! Each [`ScalarKind`] resolves to a [`ScalarCodec`]: a fixed table of
//! functions that size, emit and parse one payload of that kind against
//! its type-erased storage. Tags are the caller's business; a scalar
//! codec handles the payload only, which for string and bytes kinds
//! includes the length prefix.

use std::any::Any;

use crate::core::{CodecError, Result};
use crate::schema::ScalarKind;
use crate::wire::varint::{
    append_varint, decode_varint, read_length_prefix, size_of_varint, unzigzag32, unzigzag64,
    zigzag32, zigzag64,
};
use crate::wire::fixed::{
    append_fixed32, append_fixed64, read_fixed32, read_fixed64, FIXED32_LEN, FIXED64_LEN,
};
use crate::wire::WireType;

use super::storage_ref;
use crate::schema::descriptor::storage_mismatch;

/// Operations of one scalar kind over its type-erased storage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScalarCodec {
    /// Wire type carried in this kind's tags
    pub wire: WireType,
    /// Whether the stored value is the kind's zero
    pub is_zero: fn(&dyn Any) -> bool,
    /// Encoded payload size, including any length prefix
    pub size: fn(&dyn Any) -> usize,
    /// Append the encoded payload to the output buffer
    pub encode: fn(&mut Vec<u8>, &dyn Any),
    /// Parse one payload from the front of `buf` into the storage,
    /// returning the bytes consumed
    pub decode: fn(&[u8], &mut dyn Any) -> Result<usize>,
}

/// Resolve the codec table for a scalar kind.
pub(crate) fn scalar_codec(kind: ScalarKind) -> ScalarCodec {
    match kind {
        ScalarKind::Bool => ScalarCodec {
            wire: WireType::Varint,
            is_zero: bool_is_zero,
            size: bool_size,
            encode: bool_encode,
            decode: bool_decode,
        },
        ScalarKind::Int32 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<i32>,
            size: int32_size,
            encode: int32_encode,
            decode: int32_decode,
        },
        ScalarKind::Int64 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<i64>,
            size: int64_size,
            encode: int64_encode,
            decode: int64_decode,
        },
        ScalarKind::Uint32 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<u32>,
            size: uint32_size,
            encode: uint32_encode,
            decode: uint32_decode,
        },
        ScalarKind::Uint64 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<u64>,
            size: uint64_size,
            encode: uint64_encode,
            decode: uint64_decode,
        },
        ScalarKind::Sint32 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<i32>,
            size: sint32_size,
            encode: sint32_encode,
            decode: sint32_decode,
        },
        ScalarKind::Sint64 => ScalarCodec {
            wire: WireType::Varint,
            is_zero: int_is_zero::<i64>,
            size: sint64_size,
            encode: sint64_encode,
            decode: sint64_decode,
        },
        ScalarKind::Fixed32 => ScalarCodec {
            wire: WireType::Fixed32,
            is_zero: int_is_zero::<u32>,
            size: fixed32_size,
            encode: fixed32_encode,
            decode: fixed32_decode,
        },
        ScalarKind::Fixed64 => ScalarCodec {
            wire: WireType::Fixed64,
            is_zero: int_is_zero::<u64>,
            size: fixed64_size,
            encode: fixed64_encode,
            decode: fixed64_decode,
        },
        ScalarKind::Sfixed32 => ScalarCodec {
            wire: WireType::Fixed32,
            is_zero: int_is_zero::<i32>,
            size: sfixed32_size,
            encode: sfixed32_encode,
            decode: sfixed32_decode,
        },
        ScalarKind::Sfixed64 => ScalarCodec {
            wire: WireType::Fixed64,
            is_zero: int_is_zero::<i64>,
            size: sfixed64_size,
            encode: sfixed64_encode,
            decode: sfixed64_decode,
        },
        ScalarKind::Float => ScalarCodec {
            wire: WireType::Fixed32,
            is_zero: float_is_zero,
            size: float_size,
            encode: float_encode,
            decode: float_decode,
        },
        ScalarKind::Double => ScalarCodec {
            wire: WireType::Fixed64,
            is_zero: double_is_zero,
            size: double_size,
            encode: double_encode,
            decode: double_decode,
        },
        ScalarKind::String => ScalarCodec {
            wire: WireType::LengthDelimited,
            is_zero: string_is_zero,
            size: string_size,
            encode: string_encode,
            decode: string_decode,
        },
        ScalarKind::Bytes => ScalarCodec {
            wire: WireType::LengthDelimited,
            is_zero: bytes_is_zero,
            size: bytes_size,
            encode: bytes_encode,
            decode: bytes_decode,
        },
    }
}

fn storage_mut<T: 'static>(storage: &mut dyn Any) -> &mut T {
    match storage.downcast_mut::<T>() {
        Some(value) => value,
        None => storage_mismatch(std::any::type_name::<T>()),
    }
}

fn int_is_zero<T>(storage: &dyn Any) -> bool
where
    T: Default + PartialEq + 'static,
{
    *storage_ref::<T>(storage) == T::default()
}

// bool

fn bool_is_zero(storage: &dyn Any) -> bool {
    !*storage_ref::<bool>(storage)
}

fn bool_size(_storage: &dyn Any) -> usize {
    1
}

fn bool_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    buf.push(u8::from(*storage_ref::<bool>(storage)));
}

fn bool_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<bool>(storage) = value != 0;
    Ok(consumed)
}

// int32: negative values sign-extend to 64 bits before varint encoding

fn int32_size(storage: &dyn Any) -> usize {
    size_of_varint(i64::from(*storage_ref::<i32>(storage)) as u64)
}

fn int32_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, i64::from(*storage_ref::<i32>(storage)) as u64);
}

fn int32_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<i32>(storage) = value as i32;
    Ok(consumed)
}

// int64

fn int64_size(storage: &dyn Any) -> usize {
    size_of_varint(*storage_ref::<i64>(storage) as u64)
}

fn int64_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, *storage_ref::<i64>(storage) as u64);
}

fn int64_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<i64>(storage) = value as i64;
    Ok(consumed)
}

// uint32

fn uint32_size(storage: &dyn Any) -> usize {
    size_of_varint(u64::from(*storage_ref::<u32>(storage)))
}

fn uint32_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, u64::from(*storage_ref::<u32>(storage)));
}

fn uint32_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<u32>(storage) = value as u32;
    Ok(consumed)
}

// uint64

fn uint64_size(storage: &dyn Any) -> usize {
    size_of_varint(*storage_ref::<u64>(storage))
}

fn uint64_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, *storage_ref::<u64>(storage));
}

fn uint64_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<u64>(storage) = value;
    Ok(consumed)
}

// sint32 / sint64: zigzag before varint

fn sint32_size(storage: &dyn Any) -> usize {
    size_of_varint(u64::from(zigzag32(*storage_ref::<i32>(storage))))
}

fn sint32_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, u64::from(zigzag32(*storage_ref::<i32>(storage))));
}

fn sint32_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<i32>(storage) = unzigzag32(value as u32);
    Ok(consumed)
}

fn sint64_size(storage: &dyn Any) -> usize {
    size_of_varint(zigzag64(*storage_ref::<i64>(storage)))
}

fn sint64_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_varint(buf, zigzag64(*storage_ref::<i64>(storage)));
}

fn sint64_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = decode_varint(buf)?;
    *storage_mut::<i64>(storage) = unzigzag64(value);
    Ok(consumed)
}

// fixed32 / sfixed32 / float

fn fixed32_size(_storage: &dyn Any) -> usize {
    FIXED32_LEN
}

fn fixed32_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed32(buf, *storage_ref::<u32>(storage));
}

fn fixed32_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed32(buf)?;
    *storage_mut::<u32>(storage) = value;
    Ok(consumed)
}

fn sfixed32_size(_storage: &dyn Any) -> usize {
    FIXED32_LEN
}

fn sfixed32_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed32(buf, *storage_ref::<i32>(storage) as u32);
}

fn sfixed32_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed32(buf)?;
    *storage_mut::<i32>(storage) = value as i32;
    Ok(consumed)
}

// Zero tests on floats compare bit patterns, so a negative zero is a
// real value and survives a round trip.
fn float_is_zero(storage: &dyn Any) -> bool {
    storage_ref::<f32>(storage).to_bits() == 0
}

fn float_size(_storage: &dyn Any) -> usize {
    FIXED32_LEN
}

fn float_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed32(buf, storage_ref::<f32>(storage).to_bits());
}

fn float_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed32(buf)?;
    *storage_mut::<f32>(storage) = f32::from_bits(value);
    Ok(consumed)
}

// fixed64 / sfixed64 / double

fn fixed64_size(_storage: &dyn Any) -> usize {
    FIXED64_LEN
}

fn fixed64_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed64(buf, *storage_ref::<u64>(storage));
}

fn fixed64_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed64(buf)?;
    *storage_mut::<u64>(storage) = value;
    Ok(consumed)
}

fn sfixed64_size(_storage: &dyn Any) -> usize {
    FIXED64_LEN
}

fn sfixed64_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed64(buf, *storage_ref::<i64>(storage) as u64);
}

fn sfixed64_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed64(buf)?;
    *storage_mut::<i64>(storage) = value as i64;
    Ok(consumed)
}

fn double_is_zero(storage: &dyn Any) -> bool {
    storage_ref::<f64>(storage).to_bits() == 0
}

fn double_size(_storage: &dyn Any) -> usize {
    FIXED64_LEN
}

fn double_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    append_fixed64(buf, storage_ref::<f64>(storage).to_bits());
}

fn double_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (value, consumed) = read_fixed64(buf)?;
    *storage_mut::<f64>(storage) = f64::from_bits(value);
    Ok(consumed)
}

// string / bytes: length-prefixed payloads

fn string_is_zero(storage: &dyn Any) -> bool {
    storage_ref::<String>(storage).is_empty()
}

fn string_size(storage: &dyn Any) -> usize {
    let len = storage_ref::<String>(storage).len();
    size_of_varint(len as u64) + len
}

fn string_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    let value = storage_ref::<String>(storage);
    append_varint(buf, value.len() as u64);
    buf.extend_from_slice(value.as_bytes());
}

fn string_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (len, header) = read_length_prefix(buf)?;
    let raw = &buf[header..header + len];
    let text = std::str::from_utf8(raw)
        .map_err(|e| CodecError::parse("string field", format!("invalid utf-8: {e}")))?;
    let slot = storage_mut::<String>(storage);
    slot.clear();
    slot.push_str(text);
    Ok(header + len)
}

fn bytes_is_zero(storage: &dyn Any) -> bool {
    storage_ref::<Vec<u8>>(storage).is_empty()
}

fn bytes_size(storage: &dyn Any) -> usize {
    let len = storage_ref::<Vec<u8>>(storage).len();
    size_of_varint(len as u64) + len
}

fn bytes_encode(buf: &mut Vec<u8>, storage: &dyn Any) {
    let value = storage_ref::<Vec<u8>>(storage);
    append_varint(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

fn bytes_decode(buf: &[u8], storage: &mut dyn Any) -> Result<usize> {
    let (len, header) = read_length_prefix(buf)?;
    let slot = storage_mut::<Vec<u8>>(storage);
    slot.clear();
    slot.extend_from_slice(&buf[header..header + len]);
    Ok(header + len)
}
