// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Decode orchestration.
//!
//! One [`Decoder::decode`] call drives the full pipeline in order:
//!
//! 1. prefix strip (non-fatal on failure)
//! 2. base45 decode (abort on failure)
//! 3. zlib decompress (abort)
//! 4. COSE_Sign1 parse (abort)
//! 5. kid extraction (abort when absent)
//! 6. structural claims validation (non-fatal)
//! 7. CWT/CBOR decode into certificate data (abort)
//! 8. signing-certificate resolution (abort; the decoded certificate is
//!    still returned)
//! 9. signature verification
//!
//! "Abort" means no further stages run; diagnostics collected so far are
//! returned as-is and unset flags stay false. A `None` certificate together
//! with diagnostics is an expected outcome for malformed or untrusted
//! input, not a defect.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use tracing::debug;

use hcert_abstractions::{DecodedCertificate, SigningCertificateProvider, VerificationResult};

use crate::{base45, compression, cose, cwt, prefix, schema, signature};

/// Decode pipeline with an injected signing-certificate provider.
///
/// Holds no mutable state: every `decode` call owns its diagnostic record
/// and working buffers, so one decoder may serve concurrent calls.
pub struct Decoder<P> {
    provider: P,
}

impl<P: SigningCertificateProvider> Decoder<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Decode and verify one scanned QR payload.
    pub fn decode(&self, qr_text: &str) -> (Option<DecodedCertificate>, VerificationResult) {
        let mut result = VerificationResult::new();

        let plain = match prefix::strip(qr_text) {
            Some(rest) => {
                result.prefix_validated = true;
                rest
            }
            // Missing prefix is non-fatal: downstream stages run on the
            // unstripped input and fail naturally.
            None => qr_text,
        };

        let compressed = match base45::decode(plain) {
            Ok(bytes) => {
                result.base45_decoded = true;
                bytes
            }
            Err(e) => {
                debug!(error = %e, "verification failed: base45 segment did not decode");
                return (None, result);
            }
        };

        let cose_bytes = match compression::decompress(&compressed) {
            Ok(bytes) => {
                result.zlib_decoded = true;
                bytes
            }
            Err(e) => {
                debug!(error = %e, "verification failed: payload did not decompress");
                return (None, result);
            }
        };

        let cose = match cose::parse_cose_sign1(&cose_bytes) {
            Ok(msg) => {
                result.cose_decoded = true;
                msg
            }
            Err(e) => {
                debug!(error = %e, "verification failed: COSE not decoded");
                return (None, result);
            }
        };

        let Some(kid) = cose.kid() else {
            debug!("verification failed: cannot extract kid from COSE");
            return (None, result);
        };
        let kid_base64 = BASE64_STANDARD.encode(kid);

        let payload = cose.payload.as_deref().unwrap_or_default();

        match schema::validate_claims(payload) {
            Ok(()) => result.schema_valid = true,
            Err(e) => debug!(error = %e, "claims payload failed structural validation"),
        }

        let certificate = match cwt::decode_certificate(payload) {
            Ok(cert) => {
                result.cbor_decoded = true;
                cert
            }
            Err(e) => {
                debug!(error = %e, "verification failed: certificate data not decoded");
                return (None, result);
            }
        };

        let Some(signer_cert_der) = self.provider.certificate_for_kid(&kid_base64) else {
            debug!(kid = %kid_base64, "verification failed: failed to load signing certificate");
            return (Some(certificate), result);
        };

        match signature::verify_signature(&cose, &signer_cert_der) {
            Ok(()) => result.signature_valid = true,
            Err(e) => debug!(error = %e, "signature verification failed"),
        }

        (Some(certificate), result)
    }
}
