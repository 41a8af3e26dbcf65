// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protowire
//!
//! Schema-driven binary wire-format runtime for structured record
//! types, compatible with the protobuf encoding.
//!
//! A record type declares its wire layout once, as a table of field
//! descriptors (see [`schema`]). The first time a type is encoded or
//! decoded the engine compiles that table into a [`Codec`](codec::Codec)
//! and caches it process-wide; every later operation on the type reuses
//! the compiled codec.
//!
//! The library is organized in layers:
//! - `wire/` - varint, zigzag, fixed-width and tag primitives
//! - `schema/` - field descriptors and type-erased record access
//! - `codec/` - compiled per-type codecs, the cache, and marshal/unmarshal
//! - `core/` - error types shared by all layers
//!
//! ## Example
//!
//! ```rust
//! use protowire::{field_access, marshal, unmarshal};
//! use protowire::schema::{FieldDescriptor, Message, ScalarKind};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Message for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::scalar(1, "x", ScalarKind::Int32, field_access!(Point, x)),
//!             FieldDescriptor::scalar(2, "y", ScalarKind::Int32, field_access!(Point, y)),
//!         ]
//!     }
//! }
//!
//! # fn main() -> protowire::Result<()> {
//! let point = Point { x: 3, y: -4 };
//! let wire = marshal(&point)?;
//! let mut decoded = Point::default();
//! unmarshal(&wire, &mut decoded)?;
//! assert_eq!(decoded, point);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, Result};

// Wire-format primitives
pub mod wire;

// Field descriptors and record access
pub mod schema;

pub use schema::{FieldDescriptor, Message, ScalarKind};

// The codec engine and cache
pub mod codec;

pub use codec::{codec_for, codec_for_type, encoded_size, marshal, unmarshal, Codec};
