// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! CWT claims decoding.
//!
//! The COSE payload is a CWT (RFC 8392) claims map. The certificate itself
//! sits under the hcert claim:
//!
//! ```text
//! claims = { 1 : issuer, 6 : issued-at, 4 : expiry, -260 : { 1 : hcert } }
//! ```
//!
//! The hcert entry is a string-keyed map: `ver`, `nam` (name container),
//! `dob`, and at most one populated statement group among `v` (vaccination),
//! `t` (test), `r` (recovery). Unknown keys are skipped; statement dates are
//! kept as strings and only parsed during validity classification.

use minicbor::data::Type;
use minicbor::Decoder;

use hcert_abstractions::{
    DecodedCertificate, PersonModel, RecoveryStatement, TestResult, TestStatement,
    VaccinationStatement,
};

const CLAIM_HCERT: i64 = -260;
const HCERT_DIGITAL_GREEN_CERTIFICATE: i64 = 1;

/// Decode the CWT claims payload into certificate data.
pub fn decode_certificate(payload: &[u8]) -> Result<DecodedCertificate, String> {
    if payload.is_empty() {
        return Err("empty claims payload".to_string());
    }

    let mut dec = Decoder::new(payload);
    let len = dec
        .map()
        .map_err(|e| format!("claims payload is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut certificate = None;
    for _ in 0..len {
        let key = match dec.datatype().map_err(|e| e.to_string())? {
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int | Type::U8 | Type::U16
            | Type::U32 | Type::U64 => dec
                .i64()
                .map_err(|e| format!("failed to decode claim key: {e}"))?,
            _ => {
                dec.skip().map_err(|e| e.to_string())?;
                dec.skip().map_err(|e| e.to_string())?;
                continue;
            }
        };

        if key == CLAIM_HCERT {
            certificate = Some(decode_hcert_container(&mut dec)?);
        } else {
            // Issuer, issued-at, expiry and anything else: not needed here.
            dec.skip().map_err(|e| e.to_string())?;
        }
    }

    certificate.ok_or_else(|| "missing hcert claim (-260)".to_string())
}

/// Decode the hcert claim container: `{ 1 : certificate }`.
fn decode_hcert_container(dec: &mut Decoder<'_>) -> Result<DecodedCertificate, String> {
    let len = dec
        .map()
        .map_err(|e| format!("hcert claim is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut certificate = None;
    for _ in 0..len {
        let key = dec
            .i64()
            .map_err(|e| format!("failed to decode hcert container key: {e}"))?;
        if key == HCERT_DIGITAL_GREEN_CERTIFICATE {
            certificate = Some(decode_hcert_map(dec)?);
        } else {
            dec.skip().map_err(|e| e.to_string())?;
        }
    }

    certificate.ok_or_else(|| "missing certificate entry (1) in hcert claim".to_string())
}

fn decode_hcert_map(dec: &mut Decoder<'_>) -> Result<DecodedCertificate, String> {
    let len = dec
        .map()
        .map_err(|e| format!("certificate entry is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut cert = DecodedCertificate::default();
    for _ in 0..len {
        let key = dec
            .str()
            .map_err(|e| format!("failed to decode certificate field key: {e}"))?
            .to_string();

        match key.as_str() {
            "nam" => cert.person = decode_person(dec)?,
            "dob" => cert.date_of_birth = decode_text(dec, "dob")?,
            "v" => cert.vaccinations = Some(decode_entries(dec, "v", decode_vaccination)?),
            "t" => cert.tests = Some(decode_entries(dec, "t", decode_test)?),
            "r" => cert.recoveries = Some(decode_entries(dec, "r", decode_recovery)?),
            _ => dec.skip().map_err(|e| e.to_string())?,
        }
    }

    Ok(cert)
}

fn decode_person(dec: &mut Decoder<'_>) -> Result<PersonModel, String> {
    let len = dec
        .map()
        .map_err(|e| format!("name container is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut person = PersonModel::default();
    for _ in 0..len {
        let key = dec
            .str()
            .map_err(|e| format!("failed to decode name field key: {e}"))?
            .to_string();
        match key.as_str() {
            "fn" => person.family_name = decode_text(dec, "fn")?,
            "fnt" => person.standardised_family_name = decode_text(dec, "fnt")?,
            "gn" => person.given_name = decode_text(dec, "gn")?,
            "gnt" => person.standardised_given_name = decode_text(dec, "gnt")?,
            _ => dec.skip().map_err(|e| e.to_string())?,
        }
    }

    Ok(person)
}

/// Decode a statement array, applying `entry` to each element.
fn decode_entries<T>(
    dec: &mut Decoder<'_>,
    group: &str,
    entry: fn(&mut Decoder<'_>) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    let len = dec
        .array()
        .map_err(|e| format!("statement group {group:?} is not an array: {e}"))?
        .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;

    // The claimed length is untrusted; grow as elements actually decode.
    let mut out = Vec::new();
    for _ in 0..len {
        out.push(entry(dec)?);
    }
    Ok(out)
}

fn decode_vaccination(dec: &mut Decoder<'_>) -> Result<VaccinationStatement, String> {
    let len = dec
        .map()
        .map_err(|e| format!("vaccination entry is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut medicinal_product = String::new();
    let mut dose_number = 0u32;
    let mut total_series_of_doses = 0u32;
    let mut date_of_vaccination = String::new();

    for _ in 0..len {
        let key = dec
            .str()
            .map_err(|e| format!("failed to decode vaccination field key: {e}"))?
            .to_string();
        match key.as_str() {
            "mp" => medicinal_product = decode_text(dec, "mp")?,
            "dn" => dose_number = decode_dose(dec, "dn")?,
            "sd" => total_series_of_doses = decode_dose(dec, "sd")?,
            "dt" => date_of_vaccination = decode_text(dec, "dt")?,
            _ => dec.skip().map_err(|e| e.to_string())?,
        }
    }

    Ok(VaccinationStatement {
        medicinal_product,
        dose_number,
        total_series_of_doses,
        date_of_vaccination,
    })
}

fn decode_test(dec: &mut Decoder<'_>) -> Result<TestStatement, String> {
    let len = dec
        .map()
        .map_err(|e| format!("test entry is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut result_code = String::new();
    let mut date_time_of_collection = String::new();

    for _ in 0..len {
        let key = dec
            .str()
            .map_err(|e| format!("failed to decode test field key: {e}"))?
            .to_string();
        match key.as_str() {
            "tr" => result_code = decode_text(dec, "tr")?,
            "sc" => date_time_of_collection = decode_text(dec, "sc")?,
            _ => dec.skip().map_err(|e| e.to_string())?,
        }
    }

    Ok(TestStatement {
        result_type: TestResult::from_code(&result_code),
        date_time_of_collection,
    })
}

fn decode_recovery(dec: &mut Decoder<'_>) -> Result<RecoveryStatement, String> {
    let len = dec
        .map()
        .map_err(|e| format!("recovery entry is not a map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut certificate_valid_from = String::new();
    let mut certificate_valid_until = String::new();

    for _ in 0..len {
        let key = dec
            .str()
            .map_err(|e| format!("failed to decode recovery field key: {e}"))?
            .to_string();
        match key.as_str() {
            "df" => certificate_valid_from = decode_text(dec, "df")?,
            "du" => certificate_valid_until = decode_text(dec, "du")?,
            _ => dec.skip().map_err(|e| e.to_string())?,
        }
    }

    Ok(RecoveryStatement {
        certificate_valid_from,
        certificate_valid_until,
    })
}

fn decode_text(dec: &mut Decoder<'_>, field: &str) -> Result<String, String> {
    Ok(dec
        .str()
        .map_err(|e| format!("failed to decode text field {field:?}: {e}"))?
        .to_string())
}

fn decode_dose(dec: &mut Decoder<'_>, field: &str) -> Result<u32, String> {
    match dec.datatype().map_err(|e| e.to_string())? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => dec
            .u32()
            .map_err(|e| format!("failed to decode dose field {field:?}: {e}")),
        // Some issuers encode dose counters as strings.
        Type::String => {
            let s = dec.str().map_err(|e| e.to_string())?;
            s.parse::<u32>()
                .map_err(|e| format!("dose field {field:?} is not a number: {e}"))
        }
        other => Err(format!("dose field {field:?} has unsupported type: {other:?}")),
    }
}
