// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field codecs for repeated storage.
//!
//! Every element gets its own tag; elements are never packed. Zero
//! elements are emitted like any other, since element count is part of
//! the data. One decode call handles one wire occurrence, appending an
//! element to the sequence; an element that fails to parse is removed
//! again so the sequence never holds half-decoded data.

use std::sync::Arc;

use crate::schema::{FieldDescriptor, ScalarKind, SequenceOps};
use crate::wire::varint::{append_varint, read_length_prefix, size_of_varint};
use crate::wire::{append_tag, size_of_tag, WireType};

use super::scalar::scalar_codec;
use super::{Codec, FieldCodec};

/// Codec for a `Vec<T>` scalar field.
pub(crate) fn repeated_scalar_field(
    fd: &FieldDescriptor,
    ops: SequenceOps,
    kind: ScalarKind,
) -> FieldCodec {
    let sc = scalar_codec(kind);
    let access = fd.access;
    let number = fd.number;
    let tag_len = size_of_tag(number, sc.wire);
    FieldCodec {
        number,
        wire: sc.wire,
        size: Box::new(move |record| {
            let storage = (access.get)(record);
            let mut total = 0;
            for i in 0..(ops.len)(storage) {
                total += tag_len + (sc.size)((ops.get)(storage, i));
            }
            total
        }),
        encode: Box::new(move |buf, record| {
            let storage = (access.get)(record);
            for i in 0..(ops.len)(storage) {
                append_tag(buf, number, sc.wire);
                (sc.encode)(buf, (ops.get)(storage, i));
            }
        }),
        decode: Box::new(move |buf, record| {
            let storage = (access.get_mut)(record);
            let slot = (ops.push_default)(storage);
            match (sc.decode)(buf, slot) {
                Ok(consumed) => Ok(consumed),
                Err(e) => {
                    (ops.pop)((access.get_mut)(record));
                    Err(e)
                }
            }
        }),
    }
}

/// Codec for a `Vec<M>` embedded record field.
pub(crate) fn repeated_message_field(
    fd: &FieldDescriptor,
    ops: SequenceOps,
    inner: Arc<Codec>,
) -> FieldCodec {
    let access = fd.access;
    let number = fd.number;
    let tag_len = size_of_tag(number, WireType::LengthDelimited);
    let size_inner = inner.clone();
    let encode_inner = inner.clone();
    FieldCodec {
        number,
        wire: WireType::LengthDelimited,
        size: Box::new(move |record| {
            let storage = (access.get)(record);
            let mut total = 0;
            for i in 0..(ops.len)(storage) {
                let body = size_inner.encoded_size((ops.get)(storage, i));
                total += tag_len + size_of_varint(body as u64) + body;
            }
            total
        }),
        encode: Box::new(move |buf, record| {
            let storage = (access.get)(record);
            for i in 0..(ops.len)(storage) {
                let elem = (ops.get)(storage, i);
                let body = encode_inner.encoded_size(elem);
                append_tag(buf, number, WireType::LengthDelimited);
                append_varint(buf, body as u64);
                encode_inner.encode_into(buf, elem);
            }
        }),
        decode: Box::new(move |buf, record| {
            let (len, header) = read_length_prefix(buf)?;
            let storage = (access.get_mut)(record);
            let slot = (ops.push_default)(storage);
            match inner.decode_into(&buf[header..header + len], slot) {
                Ok(()) => Ok(header + len),
                Err(e) => {
                    (ops.pop)((access.get_mut)(record));
                    Err(e)
                }
            }
        }),
    }
}
