// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! COSE signature verification against a resolved trust certificate.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::pss;
use rsa::RsaPublicKey;
use sha2::Sha256;
use signature::Verifier;

use crate::cose::{encode_signature1_sig_structure, CoseSign1Message};

/// Signature algorithms deployed for health certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoseAlgorithm {
    Es256 = -7,
    Ps256 = -37,
    Rs256 = -257,
}

#[derive(thiserror::Error, Debug)]
pub enum SignatureError {
    #[error("missing alg header")]
    MissingAlgorithm,

    #[error("unsupported alg: {0}")]
    UnsupportedAlgorithm(i64),

    #[error("failed to encode Sig_structure: {0}")]
    SigStructure(String),

    #[error("bad trust certificate: {0}")]
    InvalidCertificate(String),

    #[error("bad public key: {0}")]
    InvalidPublicKey(String),

    #[error("bad signature bytes: {0}")]
    MalformedSignature(String),

    #[error("signature verification failed")]
    VerificationFailed,
}

/// Verify the COSE_Sign1 signature against the signer's certificate DER.
///
/// The algorithm is taken from the COSE `alg` header; the public key is
/// extracted from the certificate's SubjectPublicKeyInfo.
pub fn verify_signature(
    msg: &CoseSign1Message,
    signer_cert_der: &[u8],
) -> Result<(), SignatureError> {
    let alg = cose_algorithm(msg)?;
    let sig_structure =
        encode_signature1_sig_structure(msg).map_err(SignatureError::SigStructure)?;
    let spki = extract_spki_der(signer_cert_der)?;

    match alg {
        CoseAlgorithm::Es256 => verify_ecdsa_p256(&spki, &sig_structure, &msg.signature),
        CoseAlgorithm::Ps256 => verify_rsa_pss(&spki, &sig_structure, &msg.signature),
        CoseAlgorithm::Rs256 => verify_rsa_pkcs1(&spki, &sig_structure, &msg.signature),
    }
}

fn cose_algorithm(msg: &CoseSign1Message) -> Result<CoseAlgorithm, SignatureError> {
    match msg.algorithm().ok_or(SignatureError::MissingAlgorithm)? {
        -7 => Ok(CoseAlgorithm::Es256),
        -37 => Ok(CoseAlgorithm::Ps256),
        -257 => Ok(CoseAlgorithm::Rs256),
        other => Err(SignatureError::UnsupportedAlgorithm(other)),
    }
}

/// Extract the SubjectPublicKeyInfo DER from a certificate.
///
/// Raw SPKI input is passed through, which keeps test fixtures simple.
fn extract_spki_der(der: &[u8]) -> Result<Vec<u8>, SignatureError> {
    if let Ok((_, cert)) = x509_parser::parse_x509_certificate(der) {
        return Ok(cert.tbs_certificate.subject_pki.raw.to_vec());
    }
    Ok(der.to_vec())
}

fn verify_ecdsa_p256(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let pk = p256::PublicKey::from_public_key_der(spki)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad P-256 public key: {e}")))?;

    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad P-256 public key: {e}")))?;

    let signature = p256::ecdsa::Signature::from_slice(sig)
        .map_err(|e| SignatureError::MalformedSignature(format!("bad ES256 signature: {e}")))?;
    vk.verify(msg, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

fn rsa_public_key(spki: &[u8]) -> Result<RsaPublicKey, SignatureError> {
    RsaPublicKey::from_public_key_der(spki)
        .map_err(|e| SignatureError::InvalidPublicKey(format!("bad RSA public key: {e}")))
}

fn verify_rsa_pkcs1(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let vk = pkcs1v15::VerifyingKey::<Sha256>::new(rsa_public_key(spki)?);
    let signature = pkcs1v15::Signature::try_from(sig)
        .map_err(|e| SignatureError::MalformedSignature(format!("bad RS256 signature bytes: {e}")))?;
    vk.verify(msg, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

fn verify_rsa_pss(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let vk = pss::VerifyingKey::<Sha256>::new(rsa_public_key(spki)?);
    let signature = pss::Signature::try_from(sig)
        .map_err(|e| SignatureError::MalformedSignature(format!("bad PS256 signature bytes: {e}")))?;
    vk.verify(msg, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
