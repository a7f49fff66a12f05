// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Certificate data model.
//!
//! `DecodedCertificate` is the raw decoder output: statement fields keep the
//! wire's string-encoded dates, which are only parsed (and may fail) during
//! validity classification. `CertificateModel` is the classifier/display
//! input: the same data plus the two trust flags taken from the decode
//! diagnostics.

use crate::verification_result::VerificationResult;

/// Subject identity as carried on the wire: the as-written names plus their
/// ICAO 9303 machine-readable transliterations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersonModel {
    pub family_name: String,
    pub standardised_family_name: String,
    pub given_name: String,
    pub standardised_given_name: String,
}

/// One dose entry of a vaccination course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccinationStatement {
    /// Medicinal product code; keys the product-specific validity rules.
    pub medicinal_product: String,
    pub dose_number: u32,
    pub total_series_of_doses: u32,
    /// Day-precision date string (`YYYY-MM-DD`).
    pub date_of_vaccination: String,
}

/// Outcome of a test statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Detected,
    NotDetected,
}

impl TestResult {
    /// Maps the wire result code. `260373001` is the "detected" code; every
    /// other code reads as not detected.
    pub fn from_code(code: &str) -> Self {
        if code == "260373001" {
            TestResult::Detected
        } else {
            TestResult::NotDetected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStatement {
    pub result_type: TestResult,
    /// RFC 3339 date-time string with offset.
    pub date_time_of_collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryStatement {
    /// Day-precision date string; a time-of-day suffix is tolerated.
    pub certificate_valid_from: String,
    pub certificate_valid_until: String,
}

/// Structurally decoded certificate, before any trust or validity judgment.
///
/// The data shape allows all three statement lists to be present, though a
/// certificate logically carries one kind of history. Lists are ordered with
/// the most recent entry last; classification only ever evaluates the last
/// entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedCertificate {
    pub person: PersonModel,
    /// Day-precision date string (`YYYY-MM-DD`).
    pub date_of_birth: String,
    pub vaccinations: Option<Vec<VaccinationStatement>>,
    pub tests: Option<Vec<TestStatement>>,
    pub recoveries: Option<Vec<RecoveryStatement>>,
}

impl DecodedCertificate {
    /// Combine decoded data with the decode diagnostics into the classifier
    /// and display input.
    pub fn into_certificate_model(self, result: &VerificationResult) -> CertificateModel {
        CertificateModel {
            person: self.person,
            date_of_birth: self.date_of_birth,
            vaccinations: self.vaccinations,
            tests: self.tests,
            recoveries: self.recoveries,
            is_valid: result.is_certificate_valid(),
            is_cbor_decoded: result.cbor_decoded,
        }
    }
}

/// Classifier input: decoded certificate data plus the trust flags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CertificateModel {
    pub person: PersonModel,
    pub date_of_birth: String,
    pub vaccinations: Option<Vec<VaccinationStatement>>,
    pub tests: Option<Vec<TestStatement>>,
    pub recoveries: Option<Vec<RecoveryStatement>>,
    /// Conjunction of structural validity and signature validity.
    pub is_valid: bool,
    /// Whether the claims payload structurally decoded at all. Separates
    /// untrusted-but-readable certificates from outright decode failures.
    pub is_cbor_decoded: bool,
}

impl CertificateModel {
    /// Model for a decode that produced no certificate data. Classifies as a
    /// technical error unless the diagnostics say the payload did decode.
    pub fn undecoded(result: &VerificationResult) -> Self {
        Self {
            is_valid: result.is_certificate_valid(),
            is_cbor_decoded: result.cbor_decoded,
            ..Self::default()
        }
    }
}

/// Terminal verdict of validity classification.
///
/// `PartiallyValid` belongs to the downstream display vocabulary; the
/// classifier itself never yields it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    Valid,
    PartiallyValid,
    NotValid,
    NotValidYet,
    Expired,
    TechnicalError,
}
