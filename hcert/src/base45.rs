// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Base45 codec (RFC 9285).
//!
//! Base45 maps two bytes onto three characters of a 45-character alphabet
//! (one byte onto two characters for a trailing odd byte), which keeps the
//! result inside the QR alphanumeric character set.
//!
//! The decoder is deliberately strict:
//! - Rejects characters outside the alphabet.
//! - Rejects a trailing group of one character.
//! - Rejects triples whose value exceeds `u16::MAX` and pairs whose value
//!   exceeds `u8::MAX` (non-canonical encodings).

const ALPHABET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Base45Error {
    #[error("character {0:?} is not in the base45 alphabet")]
    InvalidCharacter(char),

    #[error("base45 input length {0} is invalid (trailing group of one)")]
    InvalidLength(usize),

    #[error("base45 group decodes to a value out of range")]
    ValueOutOfRange,
}

fn value_of(c: u8) -> Option<u32> {
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u32)
}

/// Decode a base45 string to bytes.
pub fn decode(input: &str) -> Result<Vec<u8>, Base45Error> {
    let bytes = input.as_bytes();
    if bytes.len() % 3 == 1 {
        return Err(Base45Error::InvalidLength(bytes.len()));
    }

    let mut out = Vec::with_capacity(bytes.len() / 3 * 2 + 1);
    for group in bytes.chunks(3) {
        let mut v: u32 = 0;
        // Little-endian base-45 digits: c + d*45 + e*45^2.
        for &c in group.iter().rev() {
            let digit = value_of(c).ok_or(Base45Error::InvalidCharacter(c as char))?;
            v = v * 45 + digit;
        }

        match group.len() {
            3 => {
                if v > u16::MAX as u32 {
                    return Err(Base45Error::ValueOutOfRange);
                }
                out.push((v >> 8) as u8);
                out.push(v as u8);
            }
            2 => {
                if v > u8::MAX as u32 {
                    return Err(Base45Error::ValueOutOfRange);
                }
                out.push(v as u8);
            }
            // chunks(3) with len % 3 != 1 never yields a 1-length group.
            _ => unreachable!(),
        }
    }

    Ok(out)
}

/// Encode bytes as a base45 string.
pub fn encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() / 2 * 3 + 2);
    for pair in input.chunks(2) {
        match *pair {
            [a, b] => {
                let v = u32::from(a) * 256 + u32::from(b);
                out.push(ALPHABET[(v % 45) as usize] as char);
                out.push(ALPHABET[(v / 45 % 45) as usize] as char);
                out.push(ALPHABET[(v / 2025) as usize] as char);
            }
            [a] => {
                let v = u32::from(a);
                out.push(ALPHABET[(v % 45) as usize] as char);
                out.push(ALPHABET[(v / 45) as usize] as char);
            }
            _ => unreachable!(),
        }
    }
    out
}
