// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message codec construction and the field decode loop.
//!
//! [`build_vtable`] turns a record type's descriptor table into a
//! [`CodecVtable`]: one [`FieldCodec`] per field, validated against the
//! actual storage of a probe record so that any mismatch between a
//! descriptor and its struct field fails the build instead of a later
//! encode. Embedded record types are resolved through the
//! [`CodecBuilder`], which breaks descriptor cycles with unfilled codec
//! shells.

use std::any::Any;

use crate::core::{CodecError, Result};
use crate::schema::{Cardinality, FieldDescriptor, FieldKind, MessageType, ScalarKind};
use crate::wire::fixed::{FIXED32_LEN, FIXED64_LEN};
use crate::wire::varint::{decode_varint, read_length_prefix};
use crate::wire::{append_tag, decode_tag, size_of_tag, WireType, MAX_FIELD_NUMBER};

use super::registry::CodecBuilder;
use super::scalar::scalar_codec;
use super::{map, optional, repeated, CodecVtable, FieldCodec};

/// Build the codec table for one record type.
///
/// Validates every descriptor against a probe record, resolves embedded
/// record codecs, and returns the field codecs sorted by field number.
pub(crate) fn build_vtable(mt: &MessageType, builder: &mut CodecBuilder) -> Result<CodecVtable> {
    let descriptors = mt.descriptors();
    let mut probe = mt.default_boxed();
    let mut fields = Vec::with_capacity(descriptors.len());
    for fd in &descriptors {
        fields.push(build_field(mt, fd, probe.as_mut(), builder)?);
    }
    fields.sort_by_key(|f| f.number);
    for pair in fields.windows(2) {
        if pair[0].number == pair[1].number {
            return Err(CodecError::invalid_descriptor(
                mt.name(),
                format!("duplicate field number {}", pair[0].number),
            ));
        }
    }
    Ok(CodecVtable { fields })
}

fn build_field(
    mt: &MessageType,
    fd: &FieldDescriptor,
    probe: &mut dyn Any,
    builder: &mut CodecBuilder,
) -> Result<FieldCodec> {
    if fd.number == 0 || fd.number > MAX_FIELD_NUMBER {
        return Err(field_error(mt, fd, "field number out of range"));
    }
    match fd.cardinality {
        Cardinality::Singular => match fd.kind {
            FieldKind::Scalar(kind) => {
                let actual = (fd.access.get)(probe).type_id();
                if actual != kind.storage_type_id() {
                    return Err(field_error(mt, fd, "storage does not match scalar kind"));
                }
                Ok(singular_scalar_field(fd, kind))
            }
            FieldKind::Message(_) => Err(field_error(
                mt,
                fd,
                "embedded record fields must declare explicit presence",
            )),
        },
        Cardinality::Optional(ops) => {
            if (fd.access.get)(probe).type_id() != (ops.storage_type)() {
                return Err(field_error(mt, fd, "storage does not match presence type"));
            }
            // materialize the inner slot on the probe to check its type
            let inner = (*(ops.get_or_insert)((fd.access.get_mut)(probe))).type_id();
            match fd.kind {
                FieldKind::Scalar(kind) => {
                    if kind == ScalarKind::Bytes {
                        return Err(field_error(
                            mt,
                            fd,
                            "bytes fields cannot declare explicit presence",
                        ));
                    }
                    if inner != kind.storage_type_id() {
                        return Err(field_error(mt, fd, "presence slot does not match scalar kind"));
                    }
                    Ok(optional::optional_scalar_field(fd, ops, kind))
                }
                FieldKind::Message(inner_mt) => {
                    if inner != inner_mt.id() {
                        return Err(field_error(mt, fd, "presence slot does not match record type"));
                    }
                    let codec = builder.resolve(&inner_mt)?;
                    Ok(optional::message_field(fd, ops, codec))
                }
            }
        }
        Cardinality::Repeated(ops) => {
            if (fd.access.get)(probe).type_id() != (ops.storage_type)() {
                return Err(field_error(mt, fd, "storage does not match sequence type"));
            }
            // push one probe element to check its type, then discard it
            let storage = (fd.access.get_mut)(probe);
            let elem = (*(ops.push_default)(storage)).type_id();
            (ops.pop)((fd.access.get_mut)(probe));
            match fd.kind {
                FieldKind::Scalar(kind) => {
                    if elem != kind.storage_type_id() {
                        return Err(field_error(mt, fd, "element does not match scalar kind"));
                    }
                    Ok(repeated::repeated_scalar_field(fd, ops, kind))
                }
                FieldKind::Message(inner_mt) => {
                    if elem != inner_mt.id() {
                        return Err(field_error(mt, fd, "element does not match record type"));
                    }
                    let codec = builder.resolve(&inner_mt)?;
                    Ok(repeated::repeated_message_field(fd, ops, codec))
                }
            }
        }
        Cardinality::Map(ops) => {
            let key_kind = match fd.map_key {
                Some(kind) => kind,
                None => return Err(field_error(mt, fd, "map field without a key kind")),
            };
            if !key_kind.is_valid_map_key() {
                return Err(field_error(mt, fd, "key kind cannot key a map"));
            }
            if (fd.access.get)(probe).type_id() != (ops.storage_type)() {
                return Err(field_error(mt, fd, "storage does not match map type"));
            }
            let entry = (ops.new_entry)();
            if (ops.entry_key.get)(entry.as_ref()).type_id() != key_kind.storage_type_id() {
                return Err(field_error(mt, fd, "map key does not match key kind"));
            }
            let value_id = (ops.entry_value.get)(entry.as_ref()).type_id();
            let value = match fd.kind {
                FieldKind::Scalar(kind) => {
                    if value_id != kind.storage_type_id() {
                        return Err(field_error(mt, fd, "map value does not match scalar kind"));
                    }
                    map::ValueCodec::Scalar(scalar_codec(kind))
                }
                FieldKind::Message(inner_mt) => {
                    if value_id != inner_mt.id() {
                        return Err(field_error(mt, fd, "map value does not match record type"));
                    }
                    map::ValueCodec::Message(builder.resolve(&inner_mt)?)
                }
            };
            drop(entry);
            Ok(map::map_field(fd, ops, key_kind, value))
        }
    }
}

fn field_error(mt: &MessageType, fd: &FieldDescriptor, reason: &str) -> CodecError {
    CodecError::invalid_descriptor(mt.name(), format!("field '{}': {reason}", fd.name))
}

/// Codec for a singular scalar field: a zero value contributes nothing
/// to the wire, any other value is one tag plus one payload.
fn singular_scalar_field(fd: &FieldDescriptor, kind: ScalarKind) -> FieldCodec {
    let sc = scalar_codec(kind);
    let access = fd.access;
    let number = fd.number;
    let tag_len = size_of_tag(number, sc.wire);
    FieldCodec {
        number,
        wire: sc.wire,
        size: Box::new(move |record| {
            let storage = (access.get)(record);
            if (sc.is_zero)(storage) {
                0
            } else {
                tag_len + (sc.size)(storage)
            }
        }),
        encode: Box::new(move |buf, record| {
            let storage = (access.get)(record);
            if !(sc.is_zero)(storage) {
                append_tag(buf, number, sc.wire);
                (sc.encode)(buf, storage);
            }
        }),
        decode: Box::new(move |buf, record| (sc.decode)(buf, (access.get_mut)(record))),
    }
}

/// Decode a field stream into a record.
///
/// Runs until `buf` is exhausted. Fields whose number is unknown, and
/// known fields arriving under an unexpected wire type, are skipped by
/// payload shape.
pub(crate) fn decode_fields(
    fields: &[FieldCodec],
    mut buf: &[u8],
    record: &mut dyn Any,
) -> Result<()> {
    while !buf.is_empty() {
        let (number, wire, tag_len) = decode_tag(buf)?;
        buf = &buf[tag_len..];
        let known = fields
            .binary_search_by_key(&number, |f| f.number)
            .ok()
            .map(|i| &fields[i]);
        let consumed = match known {
            Some(field) if field.wire == wire => (field.decode)(buf, record)?,
            _ => skip_field(wire, buf)?,
        };
        buf = &buf[consumed..];
    }
    Ok(())
}

/// Skip one payload of the given wire type, returning the bytes skipped.
///
/// Legacy group wire types are accepted with a length-delimited payload
/// shape.
pub(crate) fn skip_field(wire: WireType, buf: &[u8]) -> Result<usize> {
    match wire {
        WireType::Varint => {
            let (_, consumed) = decode_varint(buf)?;
            Ok(consumed)
        }
        WireType::Fixed64 => {
            if buf.len() < FIXED64_LEN {
                return Err(CodecError::unexpected_eof(FIXED64_LEN, buf.len()));
            }
            Ok(FIXED64_LEN)
        }
        WireType::Fixed32 => {
            if buf.len() < FIXED32_LEN {
                return Err(CodecError::unexpected_eof(FIXED32_LEN, buf.len()));
            }
            Ok(FIXED32_LEN)
        }
        WireType::LengthDelimited | WireType::StartGroup | WireType::EndGroup => {
            let (len, header) = read_length_prefix(buf)?;
            Ok(header + len)
        }
    }
}
