// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared record fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use protowire::field_access;
use protowire::schema::{FieldDescriptor, Message, ScalarKind};

// ============================================================================
// Scalar coverage
// ============================================================================

/// One field of every scalar kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scalars {
    pub flag: bool,
    pub i32_field: i32,
    pub i64_field: i64,
    pub u32_field: u32,
    pub u64_field: u64,
    pub s32_field: i32,
    pub s64_field: i64,
    pub f32_field: u32,
    pub f64_field: u64,
    pub sf32_field: i32,
    pub sf64_field: i64,
    pub float_field: f32,
    pub double_field: f64,
    pub text: String,
    pub blob: Vec<u8>,
}

impl Message for Scalars {
    fn type_name() -> &'static str {
        "Scalars"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "flag", ScalarKind::Bool, field_access!(Scalars, flag)),
            FieldDescriptor::scalar(2, "i32_field", ScalarKind::Int32, field_access!(Scalars, i32_field)),
            FieldDescriptor::scalar(3, "i64_field", ScalarKind::Int64, field_access!(Scalars, i64_field)),
            FieldDescriptor::scalar(4, "u32_field", ScalarKind::Uint32, field_access!(Scalars, u32_field)),
            FieldDescriptor::scalar(5, "u64_field", ScalarKind::Uint64, field_access!(Scalars, u64_field)),
            FieldDescriptor::scalar(6, "s32_field", ScalarKind::Sint32, field_access!(Scalars, s32_field)),
            FieldDescriptor::scalar(7, "s64_field", ScalarKind::Sint64, field_access!(Scalars, s64_field)),
            FieldDescriptor::scalar(8, "f32_field", ScalarKind::Fixed32, field_access!(Scalars, f32_field)),
            FieldDescriptor::scalar(9, "f64_field", ScalarKind::Fixed64, field_access!(Scalars, f64_field)),
            FieldDescriptor::scalar(10, "sf32_field", ScalarKind::Sfixed32, field_access!(Scalars, sf32_field)),
            FieldDescriptor::scalar(11, "sf64_field", ScalarKind::Sfixed64, field_access!(Scalars, sf64_field)),
            FieldDescriptor::scalar(12, "float_field", ScalarKind::Float, field_access!(Scalars, float_field)),
            FieldDescriptor::scalar(13, "double_field", ScalarKind::Double, field_access!(Scalars, double_field)),
            FieldDescriptor::scalar(14, "text", ScalarKind::String, field_access!(Scalars, text)),
            FieldDescriptor::scalar(15, "blob", ScalarKind::Bytes, field_access!(Scalars, blob)),
        ]
    }
}

// ============================================================================
// Nested records
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Detail {
    pub x: String,
    pub y: String,
}

impl Message for Detail {
    fn type_name() -> &'static str {
        "Detail"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "x", ScalarKind::String, field_access!(Detail, x)),
            FieldDescriptor::scalar(2, "y", ScalarKind::String, field_access!(Detail, y)),
        ]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Telemetry {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub detail: Option<Box<Detail>>,
}

impl Message for Telemetry {
    fn type_name() -> &'static str {
        "Telemetry"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "a", ScalarKind::Int64, field_access!(Telemetry, a)),
            FieldDescriptor::scalar(2, "b", ScalarKind::Int64, field_access!(Telemetry, b)),
            FieldDescriptor::scalar(3, "c", ScalarKind::Int64, field_access!(Telemetry, c)),
            FieldDescriptor::message::<Detail>(4, "detail", field_access!(Telemetry, detail)),
        ]
    }
}

// ============================================================================
// Repeated fields
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WithRepeated {
    pub counts: Vec<i32>,
    pub names: Vec<String>,
    pub details: Vec<Detail>,
}

impl Message for WithRepeated {
    fn type_name() -> &'static str {
        "WithRepeated"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::repeated::<i32>(1, "counts", ScalarKind::Int32, field_access!(WithRepeated, counts)),
            FieldDescriptor::repeated::<String>(2, "names", ScalarKind::String, field_access!(WithRepeated, names)),
            FieldDescriptor::repeated_message::<Detail>(3, "details", field_access!(WithRepeated, details)),
        ]
    }
}

// ============================================================================
// Map fields
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WithMap {
    pub ratings: HashMap<String, i32>,
    pub children: HashMap<i32, Detail>,
}

impl Message for WithMap {
    fn type_name() -> &'static str {
        "WithMap"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::map::<String, i32>(
                1,
                "ratings",
                ScalarKind::String,
                ScalarKind::Int32,
                field_access!(WithMap, ratings),
            ),
            FieldDescriptor::message_map::<i32, Detail>(
                2,
                "children",
                ScalarKind::Int32,
                field_access!(WithMap, children),
            ),
        ]
    }
}

// ============================================================================
// Explicit presence
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WithPresence {
    pub threshold: Option<u32>,
    pub label: Option<String>,
    pub armed: Option<bool>,
}

impl Message for WithPresence {
    fn type_name() -> &'static str {
        "WithPresence"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional::<u32>(
                1,
                "threshold",
                ScalarKind::Fixed32,
                field_access!(WithPresence, threshold),
            ),
            FieldDescriptor::optional::<String>(
                2,
                "label",
                ScalarKind::String,
                field_access!(WithPresence, label),
            ),
            FieldDescriptor::optional::<bool>(
                3,
                "armed",
                ScalarKind::Bool,
                field_access!(WithPresence, armed),
            ),
        ]
    }
}

// ============================================================================
// Recursive records
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeNode {
    pub value: i32,
    pub children: Vec<TreeNode>,
}

impl Message for TreeNode {
    fn type_name() -> &'static str {
        "TreeNode"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "value", ScalarKind::Int32, field_access!(TreeNode, value)),
            FieldDescriptor::repeated_message::<TreeNode>(2, "children", field_access!(TreeNode, children)),
        ]
    }
}

/// Mutually recursive pair, for exercising codec construction across a
/// type cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ping {
    pub seq: u32,
    pub reply: Option<Box<Pong>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pong {
    pub seq: u32,
    pub reply: Option<Box<Ping>>,
}

impl Message for Ping {
    fn type_name() -> &'static str {
        "Ping"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "seq", ScalarKind::Uint32, field_access!(Ping, seq)),
            FieldDescriptor::message::<Pong>(2, "reply", field_access!(Ping, reply)),
        ]
    }
}

impl Message for Pong {
    fn type_name() -> &'static str {
        "Pong"
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar(1, "seq", ScalarKind::Uint32, field_access!(Pong, seq)),
            FieldDescriptor::message::<Ping>(2, "reply", field_access!(Pong, reply)),
        ]
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Marshal, then unmarshal into a fresh record, asserting equality.
pub fn assert_round_trip<M>(record: &M)
where
    M: Message + Clone + PartialEq + std::fmt::Debug,
{
    let wire = protowire::marshal(record).expect("marshal");
    let mut decoded = M::default();
    protowire::unmarshal(&wire, &mut decoded).expect("unmarshal");
    assert_eq!(&decoded, record);
}
