// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Signing-certificate resolution seam.
//!
//! The decode pipeline never fetches trust anchors itself; it asks an
//! injected provider. Implementations typically sit on top of a national
//! backend download or a local cache of DSC certificates.

/// Resolves the trust-anchor certificate that signed a COSE message.
///
/// Contract:
/// - `kid_base64` is the standard-base64 encoding of the COSE `kid` header.
/// - Return `Some(der)` with the certificate's DER bytes when the kid is
///   known, `None` when it is not.
///
/// Providers are shared across concurrent decode calls and must be safe for
/// concurrent read access.
pub trait SigningCertificateProvider: Sync {
    fn certificate_for_kid(&self, kid_base64: &str) -> Option<Vec<u8>>;
}
