// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field codecs for map storage.
//!
//! Each entry travels as a length-delimited payload shaped like a tiny
//! two-field record: key at field 1, value at field 2. Inside an entry
//! the singular zero rule applies, so a zero key or zero scalar value
//! is left out and an all-zero entry is a zero-length payload. Decoding
//! an entry with missing parts therefore restores the zero key or value,
//! and each decoded entry is inserted, later duplicates replacing
//! earlier ones.
//!
//! Decode goes through pooled scratch entries so that map-heavy records
//! do not allocate one box per entry; a scratch is zeroed before it
//! returns to the pool.

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::core::{CodecError, Result};
use crate::schema::{FieldDescriptor, MapOps, ScalarKind};
use crate::wire::varint::{append_varint, read_length_prefix, size_of_varint};
use crate::wire::{append_tag, decode_tag, size_of_tag, WireType};

use super::message::skip_field;
use super::scalar::{scalar_codec, ScalarCodec};
use super::{Codec, FieldCodec};

/// Field number of the key inside an entry payload.
const KEY_FIELD: u32 = 1;

/// Field number of the value inside an entry payload.
const VALUE_FIELD: u32 = 2;

/// Codec for an entry's value part.
pub(crate) enum ValueCodec {
    Scalar(ScalarCodec),
    Message(Arc<Codec>),
}

type ScratchPool = Arc<Mutex<Vec<Box<dyn Any + Send + Sync>>>>;

/// Codec for a `HashMap<K, V>` field.
pub(crate) fn map_field(
    fd: &FieldDescriptor,
    ops: MapOps,
    key_kind: ScalarKind,
    value: ValueCodec,
) -> FieldCodec {
    let kc = scalar_codec(key_kind);
    let access = fd.access;
    let number = fd.number;
    let field_tag_len = size_of_tag(number, WireType::LengthDelimited);
    let key_tag_len = size_of_tag(KEY_FIELD, kc.wire);
    let pool: ScratchPool = Arc::new(Mutex::new(Vec::new()));

    let size_value = match &value {
        ValueCodec::Scalar(sc) => ValueCodec::Scalar(*sc),
        ValueCodec::Message(codec) => ValueCodec::Message(codec.clone()),
    };
    let encode_value = match &value {
        ValueCodec::Scalar(sc) => ValueCodec::Scalar(*sc),
        ValueCodec::Message(codec) => ValueCodec::Message(codec.clone()),
    };

    FieldCodec {
        number,
        wire: WireType::LengthDelimited,
        size: Box::new(move |record| {
            let storage = (access.get)(record);
            let mut total = 0;
            (ops.visit)(storage, &mut |key, val| {
                let body = entry_size(&kc, key_tag_len, &size_value, key, val);
                total += field_tag_len + size_of_varint(body as u64) + body;
            });
            total
        }),
        encode: Box::new(move |buf, record| {
            let storage = (access.get)(record);
            (ops.visit)(storage, &mut |key, val| {
                let body = entry_size(&kc, key_tag_len, &encode_value, key, val);
                append_tag(buf, number, WireType::LengthDelimited);
                append_varint(buf, body as u64);
                if !(kc.is_zero)(key) {
                    append_tag(buf, KEY_FIELD, kc.wire);
                    (kc.encode)(buf, key);
                }
                encode_entry_value(&encode_value, buf, val);
            });
        }),
        decode: Box::new(move |buf, record| {
            let (len, header) = read_length_prefix(buf)?;
            let mut scratch = take_scratch(&pool, ops.new_entry)?;
            let outcome =
                decode_entry(&kc, &value, &ops, &buf[header..header + len], scratch.as_mut());
            let result = match outcome {
                Ok(()) => {
                    (ops.insert)((access.get_mut)(record), scratch.as_mut());
                    Ok(header + len)
                }
                Err(e) => {
                    (ops.clear_entry)(scratch.as_mut());
                    Err(e)
                }
            };
            return_scratch(&pool, scratch)?;
            result
        }),
    }
}

/// Payload size of one entry; omitted zero parts contribute nothing.
fn entry_size(
    kc: &ScalarCodec,
    key_tag_len: usize,
    value: &ValueCodec,
    key: &dyn Any,
    val: &dyn Any,
) -> usize {
    let key_part = if (kc.is_zero)(key) {
        0
    } else {
        key_tag_len + (kc.size)(key)
    };
    let value_part = match value {
        ValueCodec::Scalar(sc) => {
            if (sc.is_zero)(val) {
                0
            } else {
                size_of_tag(VALUE_FIELD, sc.wire) + (sc.size)(val)
            }
        }
        ValueCodec::Message(codec) => {
            let body = codec.encoded_size(val);
            size_of_tag(VALUE_FIELD, WireType::LengthDelimited) + size_of_varint(body as u64) + body
        }
    };
    key_part + value_part
}

fn encode_entry_value(value: &ValueCodec, buf: &mut Vec<u8>, val: &dyn Any) {
    match value {
        ValueCodec::Scalar(sc) => {
            if !(sc.is_zero)(val) {
                append_tag(buf, VALUE_FIELD, sc.wire);
                (sc.encode)(buf, val);
            }
        }
        ValueCodec::Message(codec) => {
            let body = codec.encoded_size(val);
            append_tag(buf, VALUE_FIELD, WireType::LengthDelimited);
            append_varint(buf, body as u64);
            codec.encode_into(buf, val);
        }
    }
}

/// Decode one entry payload into a scratch entry.
///
/// A zero-length payload is a legal entry and leaves the scratch at its
/// zero key and value.
fn decode_entry(
    kc: &ScalarCodec,
    value: &ValueCodec,
    ops: &MapOps,
    mut buf: &[u8],
    scratch: &mut dyn Any,
) -> Result<()> {
    while !buf.is_empty() {
        let (number, wire, tag_len) = decode_tag(buf)?;
        buf = &buf[tag_len..];
        let consumed = match (number, wire) {
            (KEY_FIELD, w) if w == kc.wire => {
                (kc.decode)(buf, (ops.entry_key.get_mut)(scratch))?
            }
            (VALUE_FIELD, w) => match value {
                ValueCodec::Scalar(sc) if w == sc.wire => {
                    (sc.decode)(buf, (ops.entry_value.get_mut)(scratch))?
                }
                ValueCodec::Message(codec) if w == WireType::LengthDelimited => {
                    let (len, header) = read_length_prefix(buf)?;
                    codec.decode_into(&buf[header..header + len], (ops.entry_value.get_mut)(scratch))?;
                    header + len
                }
                _ => skip_field(wire, buf)?,
            },
            _ => skip_field(wire, buf)?,
        };
        buf = &buf[consumed..];
    }
    Ok(())
}

fn take_scratch(
    pool: &ScratchPool,
    new_entry: fn() -> Box<dyn Any + Send + Sync>,
) -> Result<Box<dyn Any + Send + Sync>> {
    let mut pool = pool
        .lock()
        .map_err(|e| CodecError::Other(format!("map scratch pool lock poisoned: {e}")))?;
    Ok(pool.pop().unwrap_or_else(new_entry))
}

fn return_scratch(pool: &ScratchPool, scratch: Box<dyn Any + Send + Sync>) -> Result<()> {
    let mut pool = pool
        .lock()
        .map_err(|e| CodecError::Other(format!("map scratch pool lock poisoned: {e}")))?;
    pool.push(scratch);
    Ok(())
}
