// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Static field metadata for record types.
//!
//! A record type participates in the wire format by implementing
//! [`Message`](descriptor::Message): a name plus a table of
//! [`FieldDescriptor`](descriptor::FieldDescriptor)s. Descriptors carry
//! the field number, wire kind, cardinality, and type-erased accessors
//! into the record's storage. The codec engine reads this table exactly
//! once per type, when it builds the type's codec.

pub mod descriptor;

pub use descriptor::{
    downcast_message, downcast_message_mut, Cardinality, FieldAccess, FieldDescriptor, FieldKind,
    MapOps, Message, MessageType, PresenceOps, ScalarKind, SequenceOps,
};
