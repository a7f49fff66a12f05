// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! QR health-certificate decoding and signature verification.
//!
//! This crate is the decode-side entry point. A scanned QR payload passes
//! through a layered encoding (transport prefix, base45, zlib, COSE_Sign1,
//! CWT/CBOR claims) and [`Decoder::decode`] drives all of it, recording a
//! per-stage diagnostic record and verifying the COSE signature against a
//! trust certificate resolved through an injected
//! [`SigningCertificateProvider`].
//!
//! The individual codec stages are public modules with their own fallible
//! contracts; the orchestrator owns flag recording and abort decisions.

pub mod base45;
pub mod compression;
pub mod prefix;

// Internal implementation modules; their public surface is re-exported below
// (lib.rs is a publisher).
mod cose;
mod cwt;
mod decoder;
mod schema;
mod signature;

pub use cose::{
    encode_signature1_sig_structure, parse_cose_sign1, CoseSign1Message, COSE_SIGN1_TAG,
};
pub use cwt::decode_certificate;
pub use decoder::Decoder;
pub use schema::{validate_claims, SchemaError};
pub use signature::{verify_signature, CoseAlgorithm, SignatureError};

pub use hcert_abstractions::{
    CertificateModel, DecodedCertificate, SigningCertificateProvider, VerificationResult,
};
