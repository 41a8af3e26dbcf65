// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The codec engine.
//!
//! A [`Codec`] is the compiled form of one record type's descriptor
//! table: a list of per-field codecs that size, emit and parse that
//! field against type-erased storage. Codecs are built once per type,
//! cached process-wide, and shared behind `Arc`s; see [`registry`].
//!
//! The free functions [`marshal`] and [`unmarshal`] are the typed
//! entry points most callers want.

pub mod registry;

mod map;
mod message;
mod optional;
mod repeated;
mod scalar;

pub use registry::{codec_for, codec_for_type};

use std::any::{Any, TypeId};
use std::sync::OnceLock;

use tracing::debug;

use crate::core::{CodecError, Result};
use crate::schema::descriptor::storage_mismatch;
use crate::schema::{Message, MessageType};
use crate::wire::WireType;

type SizeFn = dyn Fn(&dyn Any) -> usize + Send + Sync;
type EncodeFn = dyn Fn(&mut Vec<u8>, &dyn Any) + Send + Sync;
type DecodeFn = dyn Fn(&[u8], &mut dyn Any) -> Result<usize> + Send + Sync;

/// Compiled codec for one field.
///
/// `size` and `encode` take the whole record and resolve the field
/// storage themselves; `encode` emits nothing for an absent or omitted
/// field. `decode` handles one wire occurrence, positioned just past
/// the tag, and returns the bytes consumed.
pub(crate) struct FieldCodec {
    pub(crate) number: u32,
    pub(crate) wire: WireType,
    pub(crate) size: Box<SizeFn>,
    pub(crate) encode: Box<EncodeFn>,
    pub(crate) decode: Box<DecodeFn>,
}

/// Field codecs of one record type, sorted by field number.
pub(crate) struct CodecVtable {
    pub(crate) fields: Vec<FieldCodec>,
}

/// Compiled wire codec for one record type.
///
/// Obtained from [`codec_for`] and always shared; the same type yields
/// the same `Arc<Codec>` for the lifetime of the process.
pub struct Codec {
    type_id: TypeId,
    type_name: &'static str,
    vtable: OnceLock<CodecVtable>,
}

impl Codec {
    /// An unfilled codec, registered before its fields are compiled so
    /// recursive record types can refer back to it.
    pub(crate) fn shell(mt: &MessageType) -> Self {
        Codec {
            type_id: mt.id(),
            type_name: mt.name(),
            vtable: OnceLock::new(),
        }
    }

    /// Install the compiled field table. Exactly once per shell.
    pub(crate) fn fill(&self, vtable: CodecVtable) -> Result<()> {
        if self.vtable.set(vtable).is_err() {
            return Err(CodecError::invariant_violation(format!(
                "codec for {} filled twice",
                self.type_name
            )));
        }
        Ok(())
    }

    /// Name of the record type this codec serves.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    // Shells become reachable from other codecs and the cache only
    // after fill, so the table is always present here.
    fn table(&self) -> &CodecVtable {
        match self.vtable.get() {
            Some(table) => table,
            None => panic!("codec for {} used before it was filled", self.type_name),
        }
    }

    /// Exact encoded size of `record`, in bytes.
    pub fn encoded_size(&self, record: &dyn Any) -> usize {
        self.table()
            .fields
            .iter()
            .map(|f| (f.size)(record))
            .sum()
    }

    /// Append the encoded record to `buf`, fields in ascending number
    /// order.
    pub(crate) fn encode_into(&self, buf: &mut Vec<u8>, record: &dyn Any) {
        for field in &self.table().fields {
            (field.encode)(buf, record);
        }
    }

    /// Decode a field stream into `record`, merging with its current
    /// contents.
    pub(crate) fn decode_into(&self, buf: &[u8], record: &mut dyn Any) -> Result<()> {
        message::decode_fields(&self.table().fields, buf, record)
    }

    /// Encode `record` into a fresh buffer sized exactly to fit.
    pub fn marshal(&self, record: &dyn Any) -> Result<Vec<u8>> {
        self.check_record_type(record.type_id(), "marshal")?;
        let size = self.encoded_size(record);
        let mut buf = Vec::with_capacity(size);
        self.encode_into(&mut buf, record);
        debug_assert_eq!(buf.len(), size);
        Ok(buf)
    }

    /// Decode `buf` into `record`.
    ///
    /// Decoding merges into the record: scalars and presence slots are
    /// overwritten, repeated fields are appended to, map entries are
    /// inserted. Callers wanting a pure decode pass a default record.
    pub fn unmarshal(&self, buf: &[u8], record: &mut dyn Any) -> Result<()> {
        self.check_record_type((*record).type_id(), "unmarshal")?;
        self.decode_into(buf, record).map_err(|e| {
            debug!(type_name = self.type_name, error = %e, "decode failed");
            e
        })
    }

    fn check_record_type(&self, actual: TypeId, op: &str) -> Result<()> {
        if actual != self.type_id {
            return Err(CodecError::parse(
                op,
                format!("record is not a {}", self.type_name),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Encode a record to its wire representation.
pub fn marshal<M: Message>(record: &M) -> Result<Vec<u8>> {
    codec_for::<M>()?.marshal(record)
}

/// Decode a wire representation into `record`, merging with its
/// current contents.
pub fn unmarshal<M: Message>(buf: &[u8], record: &mut M) -> Result<()> {
    codec_for::<M>()?.unmarshal(buf, record)
}

/// Exact encoded size of a record, without encoding it.
pub fn encoded_size<M: Message>(record: &M) -> Result<usize> {
    Ok(codec_for::<M>()?.encoded_size(record))
}

fn storage_ref<T: 'static>(storage: &dyn Any) -> &T {
    match storage.downcast_ref::<T>() {
        Some(value) => value,
        None => storage_mismatch(std::any::type_name::<T>()),
    }
}
