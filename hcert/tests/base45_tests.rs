// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Base45 codec tests, including the RFC 9285 example vectors.

use hcert::base45::{decode, encode, Base45Error};

#[test]
fn encodes_the_rfc_example_vectors() {
    assert_eq!(encode(b"AB"), "BB8");
    assert_eq!(encode(b"Hello!!"), "%69 VD92EX0");
    assert_eq!(encode(b"base-45"), "UJCLQE7W581");
}

#[test]
fn decodes_the_rfc_example_vectors() {
    assert_eq!(decode("QED8WEX0").unwrap(), b"ietf!");
    assert_eq!(decode("BB8").unwrap(), b"AB");
    assert_eq!(decode("%69 VD92EX0").unwrap(), b"Hello!!");
}

#[test]
fn empty_input_round_trips() {
    assert_eq!(encode(b""), "");
    assert_eq!(decode("").unwrap(), Vec::<u8>::new());
}

#[test]
fn round_trips_arbitrary_bytes() {
    let bytes: Vec<u8> = (0u8..=255).collect();
    assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);

    let odd = &bytes[..251];
    assert_eq!(decode(&encode(odd)).unwrap(), odd);
}

#[test]
fn rejects_characters_outside_the_alphabet() {
    assert_eq!(decode("zz"), Err(Base45Error::InvalidCharacter('z')));
    assert_eq!(decode("BB~"), Err(Base45Error::InvalidCharacter('~')));
}

#[test]
fn rejects_a_trailing_group_of_one() {
    assert_eq!(decode("A"), Err(Base45Error::InvalidLength(1)));
    assert_eq!(decode("BB8A"), Err(Base45Error::InvalidLength(4)));
}

#[test]
fn rejects_non_canonical_groups() {
    // ":::" decodes to 44 + 44*45 + 44*2025 > u16::MAX.
    assert_eq!(decode(":::"), Err(Base45Error::ValueOutOfRange));
    // "::" decodes to 44 + 44*45 > u8::MAX.
    assert_eq!(decode("::"), Err(Base45Error::ValueOutOfRange));
}
