// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! COSE_Sign1 parsing and Sig_structure encoding.
//!
//! COSE_Sign1 is defined in RFC 8152 / RFC 9052:
//!
//! ```text
//! COSE_Sign1 = [ protected : bstr,
//!               unprotected : map,
//!               payload : bstr / null,
//!               signature : bstr ]
//! ```
//!
//! Health certificates place the CWT claims in the payload and the signing
//! key identifier (`kid`, label 4) in the protected headers, though some
//! issuers put it in the unprotected headers instead.

use std::collections::BTreeMap;

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

/// Standard CBOR tag number used for COSE_Sign1.
pub const COSE_SIGN1_TAG: u64 = 18;

/// Context string for the COSE_Sign1 Sig_structure.
const SIG_STRUCTURE_CONTEXT: &str = "Signature1";

const HEADER_LABEL_ALG: i64 = 1;
const HEADER_LABEL_KID: i64 = 4;

/// Header values this format needs. Anything else is skipped during
/// decoding rather than rejected, since issuers attach assorted metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeaderValue {
    Int(i64),
    Bytes(Vec<u8>),
}

#[derive(Debug, Default, Clone)]
pub struct CoseSign1Message {
    /// Original CBOR bytes of the protected header map (bstr content).
    /// COSE requires these exact bytes in the Sig_structure, so they are
    /// retained instead of re-encoded.
    protected_encoded: Vec<u8>,
    protected: BTreeMap<i64, HeaderValue>,
    unprotected: BTreeMap<i64, HeaderValue>,
    /// Embedded claims payload; `None` represents a detached payload.
    pub payload: Option<Vec<u8>>,
    pub signature: Vec<u8>,
}

impl CoseSign1Message {
    /// Signing key identifier, protected headers first.
    pub fn kid(&self) -> Option<&[u8]> {
        self.header_bytes(HEADER_LABEL_KID)
    }

    /// COSE `alg` header value, protected headers first.
    pub fn algorithm(&self) -> Option<i64> {
        match self
            .protected
            .get(&HEADER_LABEL_ALG)
            .or_else(|| self.unprotected.get(&HEADER_LABEL_ALG))
        {
            Some(HeaderValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    fn header_bytes(&self, label: i64) -> Option<&[u8]> {
        match self
            .protected
            .get(&label)
            .or_else(|| self.unprotected.get(&label))
        {
            Some(HeaderValue::Bytes(b)) => Some(b.as_slice()),
            _ => None,
        }
    }
}

/// Parse a COSE_Sign1 structure from its CBOR encoding.
///
/// This parser is deliberately strict about the envelope:
/// - Rejects empty input.
/// - Accepts an optional COSE_Sign1 tag (18), but rejects any other tag.
/// - Requires the top-level array length to be exactly 4.
/// - Rejects indefinite-length arrays/maps.
/// - Rejects trailing bytes.
pub fn parse_cose_sign1(input: &[u8]) -> Result<CoseSign1Message, String> {
    if input.is_empty() {
        return Err("empty input".to_string());
    }

    let mut dec = Decoder::new(input);

    if matches!(dec.datatype().map_err(|e| e.to_string())?, Type::Tag) {
        let tag = dec.tag().map_err(|e| format!("failed to read CBOR tag: {e}"))?;
        if tag != Tag::new(COSE_SIGN1_TAG) {
            return Err("unexpected CBOR tag (expected COSE_Sign1 tag 18 or no tag)".to_string());
        }
    }

    let len = dec
        .array()
        .map_err(|e| format!("top-level item is not an array: {e}"))?
        .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;

    if len != 4 {
        return Err("array length was not 4".to_string());
    }

    // Protected headers: a bstr whose content is itself a CBOR map.
    let protected_encoded = dec
        .bytes()
        .map_err(|e| format!("failed to read protected headers (bstr): {e}"))?
        .to_vec();

    let protected = decode_header_map_from_cbor(&protected_encoded)
        .map_err(|e| format!("failed to parse protected headers: {e}"))?;

    // Unprotected headers: an inline CBOR map.
    if !matches!(dec.datatype().map_err(|e| e.to_string())?, Type::Map) {
        return Err("unprotected headers are not a map".to_string());
    }

    let unprotected = decode_header_map_from_decoder(&mut dec)
        .map_err(|e| format!("failed to parse unprotected headers: {e}"))?;

    // Payload: bstr, or null for detached.
    let payload = match dec.datatype().map_err(|e| e.to_string())? {
        Type::Null => {
            dec.null().map_err(|e| e.to_string())?;
            None
        }
        Type::Bytes => Some(
            dec.bytes()
                .map_err(|e| format!("failed to read payload (bstr or null): {e}"))?
                .to_vec(),
        ),
        _ => return Err("failed to read payload (bstr or null)".to_string()),
    };

    let signature = dec
        .bytes()
        .map_err(|e| format!("failed to read signature (bstr): {e}"))?
        .to_vec();

    if dec.position() != input.len() {
        return Err("trailing bytes after COSE_Sign1".to_string());
    }

    Ok(CoseSign1Message {
        protected_encoded,
        protected,
        unprotected,
        payload,
        signature,
    })
}

/// Encode the COSE Sig_structure bytes for COSE_Sign1.
///
/// These bytes are what signature algorithms verify. The certificate format
/// always embeds its payload, so a detached payload is an error here.
pub fn encode_signature1_sig_structure(msg: &CoseSign1Message) -> Result<Vec<u8>, String> {
    let payload = msg
        .payload
        .as_deref()
        .ok_or_else(|| "detached payload is not supported".to_string())?;

    // Sig_structure = [ context, body_protected, external_aad, payload ]
    let mut out = Vec::with_capacity(128 + msg.protected_encoded.len() + payload.len());
    {
        let mut enc = Encoder::new(&mut out);
        enc.array(4).map_err(|e| e.to_string())?;
        enc.str(SIG_STRUCTURE_CONTEXT).map_err(|e| e.to_string())?;
        enc.bytes(&msg.protected_encoded).map_err(|e| e.to_string())?;
        enc.bytes(&[]).map_err(|e| e.to_string())?; // external_aad empty bstr
        enc.bytes(payload).map_err(|e| e.to_string())?;
    }
    Ok(out)
}

/// Decode a header map from the CBOR bytes inside a protected header bstr.
///
/// An empty bstr means an empty map.
fn decode_header_map_from_cbor(bytes: &[u8]) -> Result<BTreeMap<i64, HeaderValue>, String> {
    if bytes.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut dec = Decoder::new(bytes);
    let map = decode_header_map_from_decoder(&mut dec)?;

    if dec.position() != bytes.len() {
        return Err("trailing bytes after header map".to_string());
    }

    Ok(map)
}

/// Decode a header map directly from a CBOR decoder.
///
/// Only integer-labeled entries with the value types this format needs are
/// retained; all other entries are skipped.
fn decode_header_map_from_decoder(dec: &mut Decoder<'_>) -> Result<BTreeMap<i64, HeaderValue>, String> {
    let len = dec
        .map()
        .map_err(|e| format!("failed to read map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut map = BTreeMap::new();
    for _ in 0..len {
        let label = match dec.datatype().map_err(|e| e.to_string())? {
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int | Type::U8 | Type::U16
            | Type::U32 | Type::U64 => Some(
                dec.i64()
                    .map_err(|e| format!("failed to decode int header label: {e}"))?,
            ),
            Type::String => {
                dec.skip().map_err(|e| e.to_string())?;
                None
            }
            other => return Err(format!("unsupported header label type: {other:?}")),
        };

        let Some(label) = label else {
            // Text-labeled entry: value skipped along with the label.
            dec.skip().map_err(|e| e.to_string())?;
            continue;
        };

        match dec.datatype().map_err(|e| e.to_string())? {
            Type::Bytes => {
                let b = dec.bytes().map_err(|e| e.to_string())?;
                map.insert(label, HeaderValue::Bytes(b.to_vec()));
            }
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int | Type::U8 | Type::U16
            | Type::U32 | Type::U64 => {
                let i = dec.i64().map_err(|e| e.to_string())?;
                map.insert(label, HeaderValue::Int(i));
            }
            _ => {
                dec.skip().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(map)
}
