// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for protowire.
//!
//! Provides error types for wire-format operations:
//! - Truncated and malformed input during decode
//! - Field metadata validation during codec construction
//! - Internal invariant violations

use std::fmt;

/// Errors that can occur during wire-format operations.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Input ended strictly inside a multi-byte unit (varint, fixed-width
    /// value, or length-delimited payload).
    UnexpectedEof {
        /// Bytes the current unit still required
        requested: usize,
        /// Bytes that were actually available
        available: usize,
    },

    /// Varint exceeded the 10-byte limit or overflowed 64 bits.
    InvalidVarint {
        /// Number of bytes consumed before the varint was rejected
        length: usize,
    },

    /// Tag with an invalid field number or wire type.
    MalformedTag {
        /// The raw tag value as read from the wire
        tag: u64,
        /// Why the tag was rejected
        reason: String,
    },

    /// Parse error in decoded payload data (e.g. invalid UTF-8 in a string field)
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// A record type's field metadata is unsupported or inconsistent.
    ///
    /// Raised at first codec-build time, never deferred to first use.
    InvalidDescriptor {
        /// Record type whose metadata was rejected
        type_name: String,
        /// Validation error message
        reason: String,
    },

    /// Invariant violation (internal consistency failures)
    InvariantViolation {
        /// Description of the invariant that was violated
        invariant: String,
    },

    /// Other error
    Other(String),
}

impl CodecError {
    /// Create an "unexpected end of input" error.
    pub fn unexpected_eof(requested: usize, available: usize) -> Self {
        CodecError::UnexpectedEof {
            requested,
            available,
        }
    }

    /// Create an invalid varint error.
    pub fn invalid_varint(length: usize) -> Self {
        CodecError::InvalidVarint { length }
    }

    /// Create a malformed tag error.
    pub fn malformed_tag(tag: u64, reason: impl Into<String>) -> Self {
        CodecError::MalformedTag {
            tag,
            reason: reason.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidDescriptor {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant_violation(invariant: impl Into<String>) -> Self {
        CodecError::InvariantViolation {
            invariant: invariant.into(),
        }
    }

    /// Whether this error reports truncated input.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, CodecError::UnexpectedEof { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::UnexpectedEof {
                requested,
                available,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
            ],
            CodecError::InvalidVarint { length } => vec![("length", length.to_string())],
            CodecError::MalformedTag { tag, reason } => {
                vec![("tag", tag.to_string()), ("reason", reason.clone())]
            }
            CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::InvalidDescriptor { type_name, reason } => {
                vec![("type", type_name.clone()), ("reason", reason.clone())]
            }
            CodecError::InvariantViolation { invariant } => {
                vec![("invariant", invariant.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnexpectedEof {
                requested,
                available,
            } => write!(
                f,
                "Unexpected end of input: needed {requested} more bytes, but only {available} available"
            ),
            CodecError::InvalidVarint { length } => {
                write!(f, "Invalid varint: exceeds 64 bits after {length} bytes")
            }
            CodecError::MalformedTag { tag, reason } => {
                write!(f, "Malformed tag {tag:#x}: {reason}")
            }
            CodecError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            CodecError::InvalidDescriptor { type_name, reason } => {
                write!(f, "Invalid field metadata for '{type_name}': {reason}")
            }
            CodecError::InvariantViolation { invariant } => {
                write!(f, "Invariant violation: {invariant}")
            }
            CodecError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Result type for protowire operations.
pub type Result<T> = std::result::Result<T, CodecError>;
