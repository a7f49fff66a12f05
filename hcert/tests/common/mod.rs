// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Shared helpers for `hcert` integration tests.
//!
//! The integration tests exercise production code paths end to end, so
//! these helpers build real QR payloads: hand-encoded CWT claims, signed
//! through the production Sig_structure encoder with an rcgen-generated
//! P-256 certificate, zlib-compressed, base45-encoded and prefixed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use minicbor::Encoder;
use p256::pkcs8::DecodePrivateKey as _;
use signature::Signer as _;

use hcert_abstractions::SigningCertificateProvider;

/// Signing key identifier used by default in these tests.
pub const TEST_KID: &[u8] = &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];

/// Statement groups for the claims builder. Only non-empty groups are
/// encoded.
#[derive(Default, Clone)]
pub struct StatementGroups {
    /// (medicinal product, dose number, series total, vaccination date)
    pub vaccinations: Vec<(&'static str, u32, u32, &'static str)>,
    /// (result code, collection date-time)
    pub tests: Vec<(&'static str, &'static str)>,
    /// (valid from, valid until)
    pub recoveries: Vec<(&'static str, &'static str)>,
}

impl StatementGroups {
    pub fn vaccination(product: &'static str, dose: u32, total: u32, date: &'static str) -> Self {
        Self {
            vaccinations: vec![(product, dose, total, date)],
            ..Self::default()
        }
    }

    pub fn test(result_code: &'static str, collected: &'static str) -> Self {
        Self {
            tests: vec![(result_code, collected)],
            ..Self::default()
        }
    }

    pub fn recovery(valid_from: &'static str, valid_until: &'static str) -> Self {
        Self {
            recoveries: vec![(valid_from, valid_until)],
            ..Self::default()
        }
    }
}

fn encode_text_entry(enc: &mut Encoder<Vec<u8>>, key: &str, value: &str) {
    enc.str(key).unwrap();
    enc.str(value).unwrap();
}

fn encode_certificate_map(enc: &mut Encoder<Vec<u8>>, groups: &StatementGroups, with_version: bool) {
    let mut fields = 3u64; // nam, dob + one of ver/…
    if !with_version {
        fields -= 1;
    }
    fields += [
        !groups.vaccinations.is_empty(),
        !groups.tests.is_empty(),
        !groups.recoveries.is_empty(),
    ]
    .iter()
    .filter(|present| **present)
    .count() as u64;

    enc.map(fields).unwrap();
    if with_version {
        encode_text_entry(enc, "ver", "1.0.0");
    }

    enc.str("nam").unwrap();
    enc.map(4).unwrap();
    encode_text_entry(enc, "fn", "Rossi");
    encode_text_entry(enc, "fnt", "ROSSI");
    encode_text_entry(enc, "gn", "Mario");
    encode_text_entry(enc, "gnt", "MARIO");

    encode_text_entry(enc, "dob", "1980-01-01");

    if !groups.vaccinations.is_empty() {
        enc.str("v").unwrap();
        enc.array(groups.vaccinations.len() as u64).unwrap();
        for (product, dose, total, date) in &groups.vaccinations {
            enc.map(5).unwrap();
            encode_text_entry(enc, "tg", "840539006");
            encode_text_entry(enc, "mp", product);
            enc.str("dn").unwrap();
            enc.u32(*dose).unwrap();
            enc.str("sd").unwrap();
            enc.u32(*total).unwrap();
            encode_text_entry(enc, "dt", date);
        }
    }

    if !groups.tests.is_empty() {
        enc.str("t").unwrap();
        enc.array(groups.tests.len() as u64).unwrap();
        for (result_code, collected) in &groups.tests {
            enc.map(3).unwrap();
            encode_text_entry(enc, "tg", "840539006");
            encode_text_entry(enc, "tr", result_code);
            encode_text_entry(enc, "sc", collected);
        }
    }

    if !groups.recoveries.is_empty() {
        enc.str("r").unwrap();
        enc.array(groups.recoveries.len() as u64).unwrap();
        for (valid_from, valid_until) in &groups.recoveries {
            enc.map(3).unwrap();
            encode_text_entry(enc, "tg", "840539006");
            encode_text_entry(enc, "df", valid_from);
            encode_text_entry(enc, "du", valid_until);
        }
    }
}

/// Encode a CWT claims payload carrying the given statement groups.
pub fn encode_claims_payload(groups: &StatementGroups) -> Vec<u8> {
    encode_claims_payload_opts(groups, true)
}

/// Claims builder variant that can omit the schema version field.
pub fn encode_claims_payload_opts(groups: &StatementGroups, with_version: bool) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    enc.map(4).unwrap();
    enc.i64(1).unwrap();
    enc.str("IT").unwrap();
    enc.i64(6).unwrap();
    enc.i64(1_620_000_000).unwrap();
    enc.i64(4).unwrap();
    enc.i64(1_720_000_000).unwrap();
    enc.i64(-260).unwrap();
    enc.map(1).unwrap();
    enc.i64(1).unwrap();
    encode_certificate_map(&mut enc, groups, with_version);
    enc.into_writer()
}

/// Encode a COSE_Sign1 message from components (empty unprotected map).
pub fn encode_cose_sign1(protected_bstr: &[u8], payload: &[u8], signature: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    enc.array(4).unwrap();
    enc.bytes(protected_bstr).unwrap();
    enc.map(0).unwrap();
    enc.bytes(payload).unwrap();
    enc.bytes(signature).unwrap();
    enc.into_writer()
}

/// Encode protected headers carrying ES256 and the given kid.
pub fn es256_protected_headers(kid: Option<&[u8]>) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    match kid {
        Some(kid) => {
            enc.map(2).unwrap();
            enc.i64(1).unwrap();
            enc.i64(-7).unwrap();
            enc.i64(4).unwrap();
            enc.bytes(kid).unwrap();
        }
        None => {
            enc.map(1).unwrap();
            enc.i64(1).unwrap();
            enc.i64(-7).unwrap();
        }
    }
    enc.into_writer()
}

/// Sign a claims payload with ES256 through the production Sig_structure
/// encoder and embed the signature into COSE_Sign1.
pub fn sign_cose_es256(
    payload: &[u8],
    kid: Option<&[u8]>,
    signing_key: &p256::ecdsa::SigningKey,
) -> Vec<u8> {
    let protected = es256_protected_headers(kid);
    let placeholder = encode_cose_sign1(&protected, payload, &[]);
    let parsed = hcert::parse_cose_sign1(&placeholder).unwrap();

    let sig_structure = hcert::encode_signature1_sig_structure(&parsed).unwrap();
    let sig: p256::ecdsa::Signature = signing_key.sign(&sig_structure);

    encode_cose_sign1(&protected, payload, sig.to_bytes().as_slice())
}

/// Zlib-compress a COSE message.
pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap()
}

/// Wrap a COSE message into the full QR transport encoding.
pub fn qr_text(cose: &[u8]) -> String {
    format!("HC1:{}", hcert::base45::encode(&compress(cose)))
}

/// Creates a self-signed P-256 certificate and matching signing key.
pub fn make_self_signed_p256_cert_and_key() -> (Vec<u8>, p256::ecdsa::SigningKey) {
    let certified = rcgen::generate_simple_self_signed(["example.test".to_string()]).unwrap();
    let cert_der = certified.cert.der().to_vec();

    let key_der = certified.key_pair.serialize_der();
    let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&key_der).unwrap();

    (cert_der, signing_key)
}

/// In-memory kid → certificate store.
#[derive(Default)]
pub struct MapCertificateProvider {
    certificates: HashMap<String, Vec<u8>>,
}

impl MapCertificateProvider {
    pub fn with_certificate(kid: &[u8], cert_der: Vec<u8>) -> Self {
        let mut certificates = HashMap::new();
        certificates.insert(BASE64_STANDARD.encode(kid), cert_der);
        Self { certificates }
    }
}

impl SigningCertificateProvider for MapCertificateProvider {
    fn certificate_for_kid(&self, kid_base64: &str) -> Option<Vec<u8>> {
        self.certificates.get(kid_base64).cloned()
    }
}
