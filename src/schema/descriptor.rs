// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field descriptors and type-erased record access.
//!
//! The engine never touches record memory through pointer arithmetic.
//! Each field descriptor instead carries a pair of accessor functions
//! that map a type-erased record reference to the field's storage, plus
//! (for presence, repeated and map cardinalities) a small table of
//! monomorphized container operations. Accessors and operation tables
//! are produced where the record type is declared, either by generated
//! code or by hand via the [`field_access!`](crate::field_access) macro,
//! so the
//! engine itself stays fully type-erased.
//!
//! Storage conventions:
//! - singular scalar: the plain Rust value (`i32`, `String`, `Vec<u8>`, ...)
//! - explicit presence: `Option<T>` (any scalar kind except bytes)
//! - singular message: `Option<Box<M>>` (absence carried by the indirection)
//! - repeated: `Vec<T>` / `Vec<M>`
//! - map: `HashMap<K, V>`

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;

use crate::wire::WireType;

/// A record type with static wire metadata.
///
/// This is the collaborator interface the engine consumes: one call to
/// [`Message::fields`] per type, at codec-build time. Implementations
/// are normally emitted by a schema-to-struct generator; hand-written
/// impls are equivalent.
pub trait Message: Any + Default + Send + Sync {
    /// Human-readable type name, used in build errors and logs.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Field metadata table, in declaration order.
    fn fields() -> Vec<FieldDescriptor>
    where
        Self: Sized;
}

/// Primitive wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarKind {
    /// Wire type carried in tags for this kind.
    pub fn wire_type(self) -> WireType {
        match self {
            ScalarKind::Bool
            | ScalarKind::Int32
            | ScalarKind::Int64
            | ScalarKind::Uint32
            | ScalarKind::Uint64
            | ScalarKind::Sint32
            | ScalarKind::Sint64 => WireType::Varint,
            ScalarKind::Fixed32 | ScalarKind::Sfixed32 | ScalarKind::Float => WireType::Fixed32,
            ScalarKind::Fixed64 | ScalarKind::Sfixed64 | ScalarKind::Double => WireType::Fixed64,
            ScalarKind::String | ScalarKind::Bytes => WireType::LengthDelimited,
        }
    }

    /// Whether this kind may key a map field (integer, bool, and string
    /// kinds only).
    pub fn is_valid_map_key(self) -> bool {
        !matches!(
            self,
            ScalarKind::Float | ScalarKind::Double | ScalarKind::Bytes
        )
    }

    /// `TypeId` of the singular storage for this kind.
    pub(crate) fn storage_type_id(self) -> TypeId {
        match self {
            ScalarKind::Bool => TypeId::of::<bool>(),
            ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => TypeId::of::<i32>(),
            ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => TypeId::of::<i64>(),
            ScalarKind::Uint32 | ScalarKind::Fixed32 => TypeId::of::<u32>(),
            ScalarKind::Uint64 | ScalarKind::Fixed64 => TypeId::of::<u64>(),
            ScalarKind::Float => TypeId::of::<f32>(),
            ScalarKind::Double => TypeId::of::<f64>(),
            ScalarKind::String => TypeId::of::<String>(),
            ScalarKind::Bytes => TypeId::of::<Vec<u8>>(),
        }
    }
}

/// What a field holds: a primitive or an embedded record.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Primitive payload
    Scalar(ScalarKind),
    /// Embedded record, length-delimited on the wire
    Message(MessageType),
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy)]
pub enum Cardinality {
    /// Exactly one value; zero values are omitted from the wire
    Singular,
    /// Explicit presence; an absent field is omitted, a present zero is emitted
    Optional(PresenceOps),
    /// Zero or more values, one tag per element
    Repeated(SequenceOps),
    /// Unordered key/value entries, each a length-delimited two-field record
    Map(MapOps),
}

/// Type-erased handle to a [`Message`] implementation.
#[derive(Debug, Clone, Copy)]
pub struct MessageType {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    fields: fn() -> Vec<FieldDescriptor>,
    default_boxed: fn() -> Box<dyn Any + Send + Sync>,
}

impl MessageType {
    /// Capture the metadata entry points of `M`.
    pub fn of<M: Message>() -> Self {
        MessageType {
            type_id: TypeId::of::<M>,
            type_name: M::type_name,
            fields: M::fields,
            default_boxed: boxed_default::<M>,
        }
    }

    /// Type identity, the codec cache key.
    pub fn id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Type name for diagnostics.
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The field metadata table.
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        (self.fields)()
    }

    /// A boxed zero value, used as a probe during build-time validation.
    pub(crate) fn default_boxed(&self) -> Box<dyn Any + Send + Sync> {
        (self.default_boxed)()
    }
}

fn boxed_default<M: Message>() -> Box<dyn Any + Send + Sync> {
    Box::new(M::default())
}

/// Static metadata for one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field number, unique within the record type, 1 ..= 2^29-1
    pub number: u32,
    /// Field name for diagnostics
    pub name: &'static str,
    /// Payload kind (element/value kind for repeated and map fields)
    pub kind: FieldKind,
    /// Cardinality plus the container operations it needs
    pub cardinality: Cardinality,
    /// Key kind for map fields, `None` otherwise
    pub map_key: Option<ScalarKind>,
    /// Accessors into the record's storage for this field
    pub access: FieldAccess,
}

impl FieldDescriptor {
    /// Singular scalar field; zero values vanish from the wire.
    pub fn scalar(number: u32, name: &'static str, kind: ScalarKind, access: FieldAccess) -> Self {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Scalar(kind),
            cardinality: Cardinality::Singular,
            map_key: None,
            access,
        }
    }

    /// Explicit-presence scalar field stored as `Option<T>`.
    pub fn optional<T>(number: u32, name: &'static str, kind: ScalarKind, access: FieldAccess) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Scalar(kind),
            cardinality: Cardinality::Optional(PresenceOps::scalar::<T>()),
            map_key: None,
            access,
        }
    }

    /// Embedded message field stored as `Option<Box<M>>`.
    pub fn message<M: Message>(number: u32, name: &'static str, access: FieldAccess) -> Self {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Message(MessageType::of::<M>()),
            cardinality: Cardinality::Optional(PresenceOps::message::<M>()),
            map_key: None,
            access,
        }
    }

    /// Repeated scalar field stored as `Vec<T>`.
    pub fn repeated<T>(number: u32, name: &'static str, kind: ScalarKind, access: FieldAccess) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Scalar(kind),
            cardinality: Cardinality::Repeated(SequenceOps::of::<T>()),
            map_key: None,
            access,
        }
    }

    /// Repeated message field stored as `Vec<M>`.
    pub fn repeated_message<M: Message>(number: u32, name: &'static str, access: FieldAccess) -> Self {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Message(MessageType::of::<M>()),
            cardinality: Cardinality::Repeated(SequenceOps::of::<M>()),
            map_key: None,
            access,
        }
    }

    /// Map field with scalar values, stored as `HashMap<K, V>`.
    pub fn map<K, V>(
        number: u32,
        name: &'static str,
        key_kind: ScalarKind,
        value_kind: ScalarKind,
        access: FieldAccess,
    ) -> Self
    where
        K: Eq + Hash + Default + Send + Sync + 'static,
        V: Default + Send + Sync + 'static,
    {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Scalar(value_kind),
            cardinality: Cardinality::Map(MapOps::of::<K, V>()),
            map_key: Some(key_kind),
            access,
        }
    }

    /// Map field with message values, stored as `HashMap<K, M>`.
    pub fn message_map<K, M>(
        number: u32,
        name: &'static str,
        key_kind: ScalarKind,
        access: FieldAccess,
    ) -> Self
    where
        K: Eq + Hash + Default + Send + Sync + 'static,
        M: Message,
    {
        FieldDescriptor {
            number,
            name,
            kind: FieldKind::Message(MessageType::of::<M>()),
            cardinality: Cardinality::Map(MapOps::of::<K, M>()),
            map_key: Some(key_kind),
            access,
        }
    }
}

/// Accessor pair mapping a type-erased record to one field's storage.
#[derive(Debug, Clone, Copy)]
pub struct FieldAccess {
    /// Shared access to the field storage
    pub get: fn(&dyn Any) -> &dyn Any,
    /// Mutable access to the field storage
    pub get_mut: fn(&mut dyn Any) -> &mut dyn Any,
}

/// Downcast a type-erased record reference.
///
/// # Panics
///
/// Panics if `record` is not an `M`. Accessors are only ever invoked by
/// the codec built for their own record type, so a mismatch means the
/// descriptor table handed to the engine was corrupted.
pub fn downcast_message<M: Message>(record: &dyn Any) -> &M {
    match record.downcast_ref::<M>() {
        Some(m) => m,
        None => storage_mismatch(std::any::type_name::<M>()),
    }
}

/// Mutable counterpart of [`downcast_message`].
pub fn downcast_message_mut<M: Message>(record: &mut dyn Any) -> &mut M {
    match record.downcast_mut::<M>() {
        Some(m) => m,
        None => storage_mismatch(std::any::type_name::<M>()),
    }
}

/// Storage types are validated against descriptors when a codec is
/// built, so a downcast failure after that point is a corrupted
/// descriptor table, not a caller error.
pub(crate) fn storage_mismatch(expected: &'static str) -> ! {
    panic!("field storage does not match its descriptor (expected {expected})")
}

/// Build a [`FieldAccess`] for a named field of a record struct.
///
/// Stand-in for the accessor pair a schema-to-struct generator emits.
///
/// # Example
///
/// ```
/// use protowire::field_access;
/// use protowire::schema::{FieldDescriptor, Message, ScalarKind};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Probe {
///     value: i32,
/// }
///
/// impl Message for Probe {
///     fn type_name() -> &'static str {
///         "Probe"
///     }
///     fn fields() -> Vec<FieldDescriptor> {
///         vec![FieldDescriptor::scalar(
///             1,
///             "value",
///             ScalarKind::Int32,
///             field_access!(Probe, value),
///         )]
///     }
/// }
/// ```
#[macro_export]
macro_rules! field_access {
    ($owner:ty, $field:ident) => {{
        fn get(record: &dyn ::std::any::Any) -> &dyn ::std::any::Any {
            &$crate::schema::downcast_message::<$owner>(record).$field
        }
        fn get_mut(record: &mut dyn ::std::any::Any) -> &mut dyn ::std::any::Any {
            &mut $crate::schema::downcast_message_mut::<$owner>(record).$field
        }
        $crate::schema::FieldAccess { get, get_mut }
    }};
}

// ---------------------------------------------------------------------------
// Presence operations
// ---------------------------------------------------------------------------

/// Type-erased operations over an `Option` field storage.
#[derive(Debug, Clone, Copy)]
pub struct PresenceOps {
    pub(crate) storage_type: fn() -> TypeId,
    pub(crate) get: fn(&dyn Any) -> Option<&dyn Any>,
    pub(crate) get_or_insert: fn(&mut dyn Any) -> &mut dyn Any,
}

impl PresenceOps {
    /// Operations over `Option<T>` for a scalar storage type.
    pub fn scalar<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        PresenceOps {
            storage_type: TypeId::of::<Option<T>>,
            get: presence_get::<T>,
            get_or_insert: presence_get_or_insert::<T>,
        }
    }

    /// Operations over `Option<Box<M>>` for an embedded message.
    pub fn message<M: Message>() -> Self {
        PresenceOps {
            storage_type: TypeId::of::<Option<Box<M>>>,
            get: boxed_get::<M>,
            get_or_insert: boxed_get_or_insert::<M>,
        }
    }
}

fn presence_get<T: 'static>(storage: &dyn Any) -> Option<&dyn Any> {
    match storage.downcast_ref::<Option<T>>() {
        Some(Some(inner)) => Some(inner),
        Some(None) => None,
        None => storage_mismatch(std::any::type_name::<Option<T>>()),
    }
}

fn presence_get_or_insert<T: Default + 'static>(storage: &mut dyn Any) -> &mut dyn Any {
    match storage.downcast_mut::<Option<T>>() {
        Some(slot) => slot.get_or_insert_with(T::default),
        None => storage_mismatch(std::any::type_name::<Option<T>>()),
    }
}

fn boxed_get<M: Message>(storage: &dyn Any) -> Option<&dyn Any> {
    match storage.downcast_ref::<Option<Box<M>>>() {
        Some(Some(inner)) => Some(inner.as_ref()),
        Some(None) => None,
        None => storage_mismatch(std::any::type_name::<Option<Box<M>>>()),
    }
}

fn boxed_get_or_insert<M: Message>(storage: &mut dyn Any) -> &mut dyn Any {
    match storage.downcast_mut::<Option<Box<M>>>() {
        Some(slot) => slot.get_or_insert_with(|| Box::new(M::default())).as_mut(),
        None => storage_mismatch(std::any::type_name::<Option<Box<M>>>()),
    }
}

// ---------------------------------------------------------------------------
// Sequence operations
// ---------------------------------------------------------------------------

/// Initial capacity of a repeated-field backing buffer on first append.
pub(crate) const INITIAL_SEQUENCE_CAPACITY: usize = 10;

/// Type-erased operations over a `Vec` field storage.
#[derive(Debug, Clone, Copy)]
pub struct SequenceOps {
    pub(crate) storage_type: fn() -> TypeId,
    pub(crate) len: fn(&dyn Any) -> usize,
    pub(crate) get: fn(&dyn Any, usize) -> &dyn Any,
    pub(crate) push_default: fn(&mut dyn Any) -> &mut dyn Any,
    pub(crate) pop: fn(&mut dyn Any),
}

impl SequenceOps {
    /// Operations over `Vec<T>`.
    pub fn of<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        SequenceOps {
            storage_type: TypeId::of::<Vec<T>>,
            len: sequence_len::<T>,
            get: sequence_get::<T>,
            push_default: sequence_push_default::<T>,
            pop: sequence_pop::<T>,
        }
    }
}

fn sequence_ref<T: 'static>(storage: &dyn Any) -> &Vec<T> {
    match storage.downcast_ref::<Vec<T>>() {
        Some(seq) => seq,
        None => storage_mismatch(std::any::type_name::<Vec<T>>()),
    }
}

fn sequence_mut<T: 'static>(storage: &mut dyn Any) -> &mut Vec<T> {
    match storage.downcast_mut::<Vec<T>>() {
        Some(seq) => seq,
        None => storage_mismatch(std::any::type_name::<Vec<T>>()),
    }
}

fn sequence_len<T: 'static>(storage: &dyn Any) -> usize {
    sequence_ref::<T>(storage).len()
}

fn sequence_get<T: 'static>(storage: &dyn Any, index: usize) -> &dyn Any {
    &sequence_ref::<T>(storage)[index]
}

/// Append a zero element and return a handle to its slot.
///
/// Growth doubles the backing capacity, starting from
/// [`INITIAL_SEQUENCE_CAPACITY`], and preserves existing elements.
fn sequence_push_default<T: Default + 'static>(storage: &mut dyn Any) -> &mut dyn Any {
    let seq = sequence_mut::<T>(storage);
    if seq.len() == seq.capacity() {
        let additional = if seq.capacity() == 0 {
            INITIAL_SEQUENCE_CAPACITY
        } else {
            seq.capacity()
        };
        seq.reserve_exact(additional);
    }
    seq.push(T::default());
    let last = seq.len() - 1;
    &mut seq[last]
}

fn sequence_pop<T: 'static>(storage: &mut dyn Any) {
    sequence_mut::<T>(storage).pop();
}

// ---------------------------------------------------------------------------
// Map operations
// ---------------------------------------------------------------------------

/// Scratch record for one map entry during decode; field 1 is the key,
/// field 2 the value, mirroring the entry's wire layout.
#[derive(Debug, Default)]
pub(crate) struct MapEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// Type-erased operations over a `HashMap` field storage.
#[derive(Debug, Clone, Copy)]
pub struct MapOps {
    pub(crate) storage_type: fn() -> TypeId,
    pub(crate) len: fn(&dyn Any) -> usize,
    pub(crate) visit: fn(&dyn Any, &mut dyn FnMut(&dyn Any, &dyn Any)),
    pub(crate) new_entry: fn() -> Box<dyn Any + Send + Sync>,
    pub(crate) clear_entry: fn(&mut dyn Any),
    pub(crate) entry_key: FieldAccess,
    pub(crate) entry_value: FieldAccess,
    pub(crate) insert: fn(&mut dyn Any, &mut dyn Any),
}

impl MapOps {
    /// Operations over `HashMap<K, V>`.
    pub fn of<K, V>() -> Self
    where
        K: Eq + Hash + Default + Send + Sync + 'static,
        V: Default + Send + Sync + 'static,
    {
        MapOps {
            storage_type: TypeId::of::<HashMap<K, V>>,
            len: map_len::<K, V>,
            visit: map_visit::<K, V>,
            new_entry: entry_new::<K, V>,
            clear_entry: entry_clear::<K, V>,
            entry_key: FieldAccess {
                get: entry_key_get::<K, V>,
                get_mut: entry_key_get_mut::<K, V>,
            },
            entry_value: FieldAccess {
                get: entry_value_get::<K, V>,
                get_mut: entry_value_get_mut::<K, V>,
            },
            insert: map_insert::<K, V>,
        }
    }
}

fn map_ref<K: 'static, V: 'static>(storage: &dyn Any) -> &HashMap<K, V>
where
    K: Eq + Hash,
{
    match storage.downcast_ref::<HashMap<K, V>>() {
        Some(map) => map,
        None => storage_mismatch(std::any::type_name::<HashMap<K, V>>()),
    }
}

fn entry_ref<K: 'static, V: 'static>(storage: &dyn Any) -> &MapEntry<K, V> {
    match storage.downcast_ref::<MapEntry<K, V>>() {
        Some(entry) => entry,
        None => storage_mismatch(std::any::type_name::<MapEntry<K, V>>()),
    }
}

fn entry_mut<K: 'static, V: 'static>(storage: &mut dyn Any) -> &mut MapEntry<K, V> {
    match storage.downcast_mut::<MapEntry<K, V>>() {
        Some(entry) => entry,
        None => storage_mismatch(std::any::type_name::<MapEntry<K, V>>()),
    }
}

fn map_len<K: Eq + Hash + 'static, V: 'static>(storage: &dyn Any) -> usize {
    map_ref::<K, V>(storage).len()
}

fn map_visit<K: Eq + Hash + 'static, V: 'static>(
    storage: &dyn Any,
    f: &mut dyn FnMut(&dyn Any, &dyn Any),
) {
    for (key, value) in map_ref::<K, V>(storage) {
        f(key, value);
    }
}

fn entry_new<K, V>() -> Box<dyn Any + Send + Sync>
where
    K: Default + Send + Sync + 'static,
    V: Default + Send + Sync + 'static,
{
    Box::new(MapEntry::<K, V>::default())
}

fn entry_clear<K: Default + 'static, V: Default + 'static>(storage: &mut dyn Any) {
    *entry_mut::<K, V>(storage) = MapEntry::default();
}

fn entry_key_get<K: 'static, V: 'static>(entry: &dyn Any) -> &dyn Any {
    &entry_ref::<K, V>(entry).key
}

fn entry_key_get_mut<K: 'static, V: 'static>(entry: &mut dyn Any) -> &mut dyn Any {
    &mut entry_mut::<K, V>(entry).key
}

fn entry_value_get<K: 'static, V: 'static>(entry: &dyn Any) -> &dyn Any {
    &entry_ref::<K, V>(entry).value
}

fn entry_value_get_mut<K: 'static, V: 'static>(entry: &mut dyn Any) -> &mut dyn Any {
    &mut entry_mut::<K, V>(entry).value
}

/// Move the scratch entry's key and value into the map, leaving the
/// scratch zeroed.
fn map_insert<K, V>(map: &mut dyn Any, entry: &mut dyn Any)
where
    K: Eq + Hash + Default + 'static,
    V: Default + 'static,
{
    let entry = entry_mut::<K, V>(entry);
    let key = std::mem::take(&mut entry.key);
    let value = std::mem::take(&mut entry.value);
    match map.downcast_mut::<HashMap<K, V>>() {
        Some(map) => {
            map.insert(key, value);
        }
        None => storage_mismatch(std::any::type_name::<HashMap<K, V>>()),
    }
}
