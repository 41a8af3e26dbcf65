// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoding truncated and malformed buffers.
//!
//! A buffer prefix that ends exactly on a field boundary is a valid
//! (shorter) record; a prefix that ends strictly inside a varint,
//! fixed-width value or length-delimited payload must be rejected as
//! truncation.

mod common;

use common::{Detail, Telemetry, WithPresence};
use protowire::{marshal, unmarshal, CodecError};

#[test]
fn test_every_prefix_is_boundary_or_eof() {
    let record = Telemetry {
        a: 1,
        b: 2,
        c: 3,
        detail: Some(Box::new(Detail {
            x: "ab".to_string(),
            y: String::new(),
        })),
    };
    let wire = marshal(&record).unwrap();
    assert_eq!(wire.len(), 12);

    // field boundaries: nothing, after a, after b, after c, full record
    let boundaries = [0usize, 2, 4, 6, 12];
    for cut in 0..=wire.len() {
        let mut decoded = Telemetry::default();
        let result = unmarshal(&wire[..cut], &mut decoded);
        if boundaries.contains(&cut) {
            result.unwrap_or_else(|e| panic!("prefix {cut} should decode: {e}"));
        } else {
            let err = result.expect_err("prefix should be rejected");
            assert!(err.is_unexpected_eof(), "prefix {cut}: {err}");
        }
    }
}

#[test]
fn test_varint_field_boundaries_shift_with_value_width() {
    // c = 1000 needs a two-byte varint, moving the last boundary
    let record = Telemetry {
        a: 1,
        b: 2,
        c: 1000,
        ..Telemetry::default()
    };
    let wire = marshal(&record).unwrap();
    assert_eq!(hex::encode(&wire), "0801100218e807");

    let boundaries = [0usize, 2, 4, 7];
    for cut in 0..=wire.len() {
        let mut decoded = Telemetry::default();
        let result = unmarshal(&wire[..cut], &mut decoded);
        if boundaries.contains(&cut) {
            result.unwrap_or_else(|e| panic!("prefix {cut} should decode: {e}"));
        } else {
            assert!(result.unwrap_err().is_unexpected_eof(), "prefix {cut}");
        }
    }
}

#[test]
fn test_boundary_prefixes_keep_decoded_fields() {
    let record = Telemetry {
        a: 1,
        b: 2,
        c: 3,
        ..Telemetry::default()
    };
    let wire = marshal(&record).unwrap();
    let mut decoded = Telemetry::default();
    unmarshal(&wire[..4], &mut decoded).unwrap();
    assert_eq!(decoded.a, 1);
    assert_eq!(decoded.b, 2);
    assert_eq!(decoded.c, 0);
}

#[test]
fn test_truncated_fixed32_is_eof() {
    let record = WithPresence {
        threshold: Some(0x41C06DB4),
        ..WithPresence::default()
    };
    let wire = marshal(&record).unwrap();
    for cut in 1..wire.len() {
        let mut decoded = WithPresence::default();
        let err = unmarshal(&wire[..cut], &mut decoded).unwrap_err();
        assert!(err.is_unexpected_eof(), "prefix {cut}: {err}");
    }
}

#[test]
fn test_truncated_length_prefix_payload_is_eof() {
    // nested record announcing 4 bytes with only 2 present
    let wire = [0x22, 0x04, 0x0A, 0x02];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(err.is_unexpected_eof());
}

#[test]
fn test_truncated_unknown_field_is_eof() {
    // unknown field 9, length-delimited, payload cut short
    let wire = [0x4A, 0x05, 0x01];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(err.is_unexpected_eof());
}

#[test]
fn test_failed_decode_leaves_no_partial_repeated_element() {
    use common::WithRepeated;
    // one good element, then a truncated varint
    let wire = [0x08, 0x07, 0x08, 0x80];
    let mut decoded = WithRepeated::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(err.is_unexpected_eof());
    assert_eq!(decoded.counts, vec![7]);
}

#[test]
fn test_wire_type_six_is_malformed() {
    let wire = [0x0E];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::MalformedTag { .. }));
}

#[test]
fn test_wire_type_seven_is_malformed() {
    let wire = [0x0F];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::MalformedTag { .. }));
}

#[test]
fn test_field_number_zero_is_malformed() {
    let wire = [0x00];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::MalformedTag { .. }));
}

#[test]
fn test_oversized_varint_value_is_invalid() {
    // field 1 varint whose payload overflows 64 bits
    let wire = [
        0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F,
    ];
    let mut decoded = Telemetry::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::InvalidVarint { .. }));
}

#[test]
fn test_invalid_utf8_string_is_parse_error() {
    // Detail.x carrying bytes that are not UTF-8
    let wire = [0x0A, 0x02, 0xFF, 0xFE];
    let mut decoded = Detail::default();
    let err = unmarshal(&wire, &mut decoded).unwrap_err();
    assert!(matches!(err, CodecError::ParseError { .. }));
}
