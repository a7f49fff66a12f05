// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Per-decode diagnostic record.
//!
//! Each decode call owns a fresh instance and threads it through every
//! pipeline stage. The struct is deliberately a bag of independent booleans
//! rather than an error type: a stage that fails does not erase what earlier
//! stages established, and the record stays available for operator-facing
//! troubleshooting even when the pipeline aborts early.

/// Outcome flags for each stage of the QR decode pipeline.
///
/// Flags are write-once per decode call: the orchestrator sets each flag at
/// most once, and stages never reset a flag already set. Unreached stages
/// stay `false`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// The transport prefix was present and stripped.
    pub prefix_validated: bool,
    /// The base45 segment decoded to bytes.
    pub base45_decoded: bool,
    /// The zlib payload inflated to a usable COSE buffer.
    pub zlib_decoded: bool,
    /// The COSE_Sign1 structure parsed.
    pub cose_decoded: bool,
    /// The claims payload passed structural validation.
    pub schema_valid: bool,
    /// The claims payload decoded into certificate data.
    pub cbor_decoded: bool,
    /// The COSE signature verified against the resolved trust certificate.
    pub signature_valid: bool,
}

impl VerificationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall trust verdict: the payload conformed to the expected shape
    /// and the signature verified. Encoding-stage flags do not participate;
    /// a decode that never reached those checks is simply not valid.
    pub fn is_certificate_valid(&self) -> bool {
        self.schema_valid && self.signature_valid
    }
}
