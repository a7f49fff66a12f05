// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Structural validation of the claims payload.
//!
//! Runs over the raw CBOR and checks the shape the certificate schema
//! requires, independently of whether the full decode succeeds: schema
//! validity and decode success are separate diagnostics and gate different
//! outcomes downstream.

use minicbor::data::Type;
use minicbor::Decoder;

const CLAIM_HCERT: i64 = -260;
const HCERT_DIGITAL_GREEN_CERTIFICATE: i64 = 1;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("claims payload is malformed: {0}")]
    Malformed(String),

    #[error("required field {0:?} is missing or empty")]
    MissingField(&'static str),

    #[error("no statement group (v, t or r) is present")]
    NoStatementGroup,
}

/// Validate the structural shape of the CWT claims payload.
///
/// Required: the hcert claim with a certificate map carrying a non-empty
/// schema version, a name container with the standardised family name, a
/// date of birth, and at least one non-empty statement group.
pub fn validate_claims(payload: &[u8]) -> Result<(), SchemaError> {
    let mut dec = Decoder::new(payload);

    let len = map_len(&mut dec, "claims")?;
    for _ in 0..len {
        let key = match dec.datatype().map_err(malformed)? {
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int | Type::U8 | Type::U16
            | Type::U32 | Type::U64 => dec.i64().map_err(malformed)?,
            _ => {
                skip(&mut dec)?;
                skip(&mut dec)?;
                continue;
            }
        };

        if key == CLAIM_HCERT {
            return validate_hcert_container(&mut dec);
        }
        skip(&mut dec)?;
    }

    Err(SchemaError::MissingField("hcert"))
}

fn validate_hcert_container(dec: &mut Decoder<'_>) -> Result<(), SchemaError> {
    let len = map_len(dec, "hcert claim")?;
    for _ in 0..len {
        let key = dec.i64().map_err(malformed)?;
        if key == HCERT_DIGITAL_GREEN_CERTIFICATE {
            return validate_certificate(dec);
        }
        skip(dec)?;
    }

    Err(SchemaError::MissingField("hcert certificate entry"))
}

fn validate_certificate(dec: &mut Decoder<'_>) -> Result<(), SchemaError> {
    let len = map_len(dec, "certificate")?;

    let mut has_version = false;
    let mut has_name = false;
    let mut has_date_of_birth = false;
    let mut has_statements = false;

    for _ in 0..len {
        let key = dec.str().map_err(malformed)?.to_string();
        match key.as_str() {
            "ver" => has_version = !dec.str().map_err(malformed)?.is_empty(),
            "nam" => has_name = validate_name(dec)?,
            "dob" => {
                dec.str().map_err(malformed)?;
                has_date_of_birth = true;
            }
            "v" | "t" | "r" => {
                let entries = dec
                    .array()
                    .map_err(malformed)?
                    .ok_or_else(|| SchemaError::Malformed("indefinite-length array".to_string()))?;
                for _ in 0..entries {
                    skip(dec)?;
                }
                has_statements |= entries > 0;
            }
            _ => skip(dec)?,
        }
    }

    if !has_version {
        return Err(SchemaError::MissingField("ver"));
    }
    if !has_name {
        return Err(SchemaError::MissingField("nam.fnt"));
    }
    if !has_date_of_birth {
        return Err(SchemaError::MissingField("dob"));
    }
    if !has_statements {
        return Err(SchemaError::NoStatementGroup);
    }

    Ok(())
}

/// The name container must carry the standardised family name.
fn validate_name(dec: &mut Decoder<'_>) -> Result<bool, SchemaError> {
    let len = map_len(dec, "name container")?;

    let mut has_standardised_family_name = false;
    for _ in 0..len {
        let key = dec.str().map_err(malformed)?.to_string();
        if key == "fnt" {
            has_standardised_family_name = !dec.str().map_err(malformed)?.is_empty();
        } else {
            skip(dec)?;
        }
    }

    Ok(has_standardised_family_name)
}

fn map_len(dec: &mut Decoder<'_>, what: &str) -> Result<u64, SchemaError> {
    dec.map()
        .map_err(|e| SchemaError::Malformed(format!("{what} is not a map: {e}")))?
        .ok_or_else(|| SchemaError::Malformed("indefinite-length map".to_string()))
}

fn skip(dec: &mut Decoder<'_>) -> Result<(), SchemaError> {
    dec.skip().map_err(malformed)
}

fn malformed(e: impl std::fmt::Display) -> SchemaError {
    SchemaError::Malformed(e.to_string())
}
