// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Transport prefix handling.
//!
//! QR payloads carry a versioned context identifier before the base45
//! segment. Only the `HC1:` identifier is accepted.

/// Context identifier for version 1 health certificates.
pub const HC1_PREFIX: &str = "HC1:";

/// Strip the transport prefix.
///
/// Returns `None` when the prefix is absent. Callers treat that as
/// non-fatal: the remaining pipeline still runs on the unstripped input and
/// fails naturally at the base45 stage.
pub fn strip(input: &str) -> Option<&str> {
    input.strip_prefix(HC1_PREFIX)
}
