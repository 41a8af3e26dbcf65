// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec construction: caching, recursion, concurrency, and descriptor
//! validation failures.

mod common;

use std::sync::Arc;
use std::thread;

use common::{assert_round_trip, Detail, Ping, Pong, Scalars, Telemetry, TreeNode, WithMap};
use protowire::codec_for;
use protowire::field_access;
use protowire::schema::{Cardinality, FieldDescriptor, FieldKind, Message, MessageType, ScalarKind};
use protowire::CodecError;

#[test]
fn test_codec_is_cached_and_shared() {
    let a = codec_for::<Scalars>().unwrap();
    let b = codec_for::<Scalars>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.type_name(), "Scalars");
}

#[test]
fn test_concurrent_lookups_yield_one_codec() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| codec_for::<Telemetry>().unwrap()))
        .collect();
    let codecs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for codec in &codecs[1..] {
        assert!(Arc::ptr_eq(&codecs[0], codec));
    }
}

#[test]
fn test_concurrent_encode_through_shared_codec() {
    let record = Telemetry {
        a: 1,
        b: 2,
        c: 3,
        detail: Some(Box::new(Detail {
            x: "ab".to_string(),
            y: String::new(),
        })),
    };
    let expected = protowire::marshal(&record).unwrap();
    let record = Arc::new(record);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let record = record.clone();
            thread::spawn(move || protowire::marshal(record.as_ref()).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_recursive_record_round_trip() {
    let tree = TreeNode {
        value: 1,
        children: vec![
            TreeNode {
                value: 2,
                children: vec![TreeNode {
                    value: 4,
                    children: Vec::new(),
                }],
            },
            TreeNode {
                value: 3,
                children: Vec::new(),
            },
        ],
    };
    assert_round_trip(&tree);
}

#[test]
fn test_mutually_recursive_records_round_trip() {
    let ping = Ping {
        seq: 1,
        reply: Some(Box::new(Pong {
            seq: 2,
            reply: Some(Box::new(Ping {
                seq: 3,
                reply: None,
            })),
        })),
    };
    assert_round_trip(&ping);
    // both codecs of the cycle are published together
    assert_eq!(codec_for::<Pong>().unwrap().type_name(), "Pong");
}

#[test]
fn test_codec_rejects_record_of_another_type() {
    let codec = codec_for::<Telemetry>().unwrap();
    let err = codec.marshal(&WithMap::default()).unwrap_err();
    assert!(matches!(err, CodecError::ParseError { .. }));

    let mut wrong = WithMap::default();
    let err = codec.unmarshal(&[], &mut wrong).unwrap_err();
    assert!(matches!(err, CodecError::ParseError { .. }));
}

// ============================================================================
// Descriptor validation failures
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct DupNumbers {
    a: i32,
    b: i32,
}

impl Message for DupNumbers {
    fn type_name() -> &'static str {
        "DupNumbers"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "a", ScalarKind::Int32, field_access!(DupNumbers, a)),
            FieldDescriptor::scalar(1, "b", ScalarKind::Int32, field_access!(DupNumbers, b)),
        ]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SingularNested {
    inner: Detail,
}

impl Message for SingularNested {
    fn type_name() -> &'static str {
        "SingularNested"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor {
            number: 1,
            name: "inner",
            kind: FieldKind::Message(MessageType::of::<Detail>()),
            cardinality: Cardinality::Singular,
            map_key: None,
            access: field_access!(SingularNested, inner),
        }]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct WrongStorage {
    value: i64,
}

impl Message for WrongStorage {
    fn type_name() -> &'static str {
        "WrongStorage"
    }

    fn fields() -> Vec<FieldDescriptor> {
        // declared as int32 but stored as i64
        vec![FieldDescriptor::scalar(
            1,
            "value",
            ScalarKind::Int32,
            field_access!(WrongStorage, value),
        )]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct WrongPresenceInner {
    value: Option<i64>,
}

impl Message for WrongPresenceInner {
    fn type_name() -> &'static str {
        "WrongPresenceInner"
    }

    fn fields() -> Vec<FieldDescriptor> {
        // presence slot holds i64 but the kind stores i32
        vec![FieldDescriptor::optional::<i64>(
            1,
            "value",
            ScalarKind::Sint32,
            field_access!(WrongPresenceInner, value),
        )]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct WrongElemStorage {
    values: Vec<i64>,
}

impl Message for WrongElemStorage {
    fn type_name() -> &'static str {
        "WrongElemStorage"
    }

    fn fields() -> Vec<FieldDescriptor> {
        // elements hold i64 but the kind stores i32
        vec![FieldDescriptor::repeated::<i64>(
            1,
            "values",
            ScalarKind::Int32,
            field_access!(WrongElemStorage, values),
        )]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct FloatKeyMap {
    entries: std::collections::HashMap<i32, i32>,
}

impl Message for FloatKeyMap {
    fn type_name() -> &'static str {
        "FloatKeyMap"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::map::<i32, i32>(
            1,
            "entries",
            ScalarKind::Double,
            ScalarKind::Int32,
            field_access!(FloatKeyMap, entries),
        )]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct OptionalBytes {
    blob: Option<Vec<u8>>,
}

impl Message for OptionalBytes {
    fn type_name() -> &'static str {
        "OptionalBytes"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::optional::<Vec<u8>>(
            1,
            "blob",
            ScalarKind::Bytes,
            field_access!(OptionalBytes, blob),
        )]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct FieldNumberTooLarge {
    value: i32,
}

impl Message for FieldNumberTooLarge {
    fn type_name() -> &'static str {
        "FieldNumberTooLarge"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::scalar(
            1 << 29,
            "value",
            ScalarKind::Int32,
            field_access!(FieldNumberTooLarge, value),
        )]
    }
}

fn assert_build_fails<M: Message>() {
    let err = codec_for::<M>().unwrap_err();
    assert!(
        matches!(err, CodecError::InvalidDescriptor { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_duplicate_field_numbers_fail_construction() {
    assert_build_fails::<DupNumbers>();
}

#[test]
fn test_singular_nested_record_fails_construction() {
    assert_build_fails::<SingularNested>();
}

#[test]
fn test_storage_kind_mismatch_fails_construction() {
    assert_build_fails::<WrongStorage>();
}

#[test]
fn test_presence_inner_mismatch_fails_construction() {
    assert_build_fails::<WrongPresenceInner>();
}

#[test]
fn test_repeated_element_mismatch_fails_construction() {
    assert_build_fails::<WrongElemStorage>();
}

#[test]
fn test_float_map_key_fails_construction() {
    assert_build_fails::<FloatKeyMap>();
}

#[test]
fn test_optional_bytes_fails_construction() {
    assert_build_fails::<OptionalBytes>();
}

#[test]
fn test_out_of_range_field_number_fails_construction() {
    assert_build_fails::<FieldNumberTooLarge>();
}

#[test]
fn test_failed_build_is_not_cached() {
    assert_build_fails::<DupNumbers>();
    assert_build_fails::<DupNumbers>();
}
