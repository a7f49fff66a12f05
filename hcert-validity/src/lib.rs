// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Temporal validity classification.
//!
//! Consumes a decoded certificate (plus its decode diagnostics) and the
//! country-supplied validity rules, and maps them to one terminal
//! [`CertificateStatus`]. The classifier is a pure function of its inputs;
//! the evaluation instant is injected rather than read from the wall clock.

mod classifier;
mod rules;

pub use classifier::certificate_status;
pub use rules::{Rule, RuleName, ValidationRules};

pub use hcert_abstractions::{CertificateModel, CertificateStatus};
