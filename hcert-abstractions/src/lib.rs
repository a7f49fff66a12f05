// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Shared interfaces and datatypes for the hcert verification crates.
//!
//! This crate exists to prevent circular dependencies across:
//! - the decode facade (`hcert`)
//! - the validity classification layer (`hcert-validity`)
//!
//! It is intentionally kept small and stable: plain data structures plus the
//! trait seam for signing-certificate resolution.

pub mod certificate_provider;
pub mod model;
pub mod verification_result;

pub use certificate_provider::SigningCertificateProvider;
pub use model::{
    CertificateModel, CertificateStatus, DecodedCertificate, PersonModel, RecoveryStatement,
    TestResult, TestStatement, VaccinationStatement,
};
pub use verification_result::VerificationResult;
