// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field codecs for explicit-presence storage.
//!
//! Presence changes the zero rule: an absent field contributes nothing,
//! a present field is always emitted, zero value included. Embedded
//! records ride on the same storage shape and are framed as
//! length-delimited payloads.

use std::sync::Arc;

use crate::schema::{FieldDescriptor, PresenceOps, ScalarKind};
use crate::wire::varint::{append_varint, read_length_prefix, size_of_varint};
use crate::wire::{append_tag, size_of_tag, WireType};

use super::scalar::scalar_codec;
use super::{Codec, FieldCodec};

/// Codec for an `Option<T>` scalar field.
pub(crate) fn optional_scalar_field(
    fd: &FieldDescriptor,
    ops: PresenceOps,
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
            match (ops.get)((access.get)(record)) {
                Some(inner) => tag_len + (sc.size)(inner),
                None => 0,
            }
        }),
        encode: Box::new(move |buf, record| {
            if let Some(inner) = (ops.get)((access.get)(record)) {
                append_tag(buf, number, sc.wire);
                (sc.encode)(buf, inner);
            }
        }),
        decode: Box::new(move |buf, record| {
            let slot = (ops.get_or_insert)((access.get_mut)(record));
            (sc.decode)(buf, slot)
        }),
    }
}

/// Codec for an `Option<Box<M>>` embedded record field.
///
/// A present record is emitted even when empty, as a zero-length
/// payload. Repeated occurrences on the wire merge into the same
/// record, field by field.
pub(crate) fn message_field(fd: &FieldDescriptor, ops: PresenceOps, inner: Arc<Codec>) -> FieldCodec {
    let access = fd.access;
    let number = fd.number;
    let tag_len = size_of_tag(number, WireType::LengthDelimited);
    let size_inner = inner.clone();
    let encode_inner = inner.clone();
    FieldCodec {
        number,
        wire: WireType::LengthDelimited,
        size: Box::new(move |record| {
            match (ops.get)((access.get)(record)) {
                Some(msg) => {
                    let body = size_inner.encoded_size(msg);
                    tag_len + size_of_varint(body as u64) + body
                }
                None => 0,
            }
        }),
        encode: Box::new(move |buf, record| {
            if let Some(msg) = (ops.get)((access.get)(record)) {
                let body = encode_inner.encoded_size(msg);
                append_tag(buf, number, WireType::LengthDelimited);
                append_varint(buf, body as u64);
                encode_inner.encode_into(buf, msg);
            }
        }),
        decode: Box::new(move |buf, record| {
            let (len, header) = read_length_prefix(buf)?;
            let slot = (ops.get_or_insert)((access.get_mut)(record));
            inner.decode_into(&buf[header..header + len], slot)?;
            Ok(header + len)
        }),
    }
}
