// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Validity state machine.
//!
//! One classification call makes one pass over one statement and yields
//! exactly one status. Per statement kind the reference event time plus the
//! applicable rules define a [start, end] window with inclusive boundaries:
//! strict is-after comparisons in both directions, so an instant equal to
//! either boundary is valid.
//!
//! Every local failure, such as an unparseable date or a missing rule
//! value, degrades to `NotValid` instead of propagating.

use std::cmp::Ordering;

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, Duration, OffsetDateTime};
use tracing::debug;

use hcert_abstractions::{
    CertificateModel, CertificateStatus, RecoveryStatement, TestResult, TestStatement,
    VaccinationStatement,
};

use crate::rules::{RuleName, ValidationRules};

/// The one statement a classification call evaluates, chosen by fixed
/// priority: recovery over test over vaccination, last entry of the first
/// non-empty list.
enum Statement<'a> {
    Recovery(&'a RecoveryStatement),
    Test(&'a TestStatement),
    Vaccination(&'a VaccinationStatement),
    None,
}

fn select_statement(cert: &CertificateModel) -> Statement<'_> {
    if let Some(recovery) = cert.recoveries.as_deref().and_then(<[_]>::last) {
        return Statement::Recovery(recovery);
    }
    if let Some(test) = cert.tests.as_deref().and_then(<[_]>::last) {
        return Statement::Test(test);
    }
    if let Some(vaccination) = cert.vaccinations.as_deref().and_then(<[_]>::last) {
        return Statement::Vaccination(vaccination);
    }
    Statement::None
}

/// Classify a certificate's current validity.
///
/// Pure function of its inputs; `now` is injected so callers control the
/// evaluation instant.
pub fn certificate_status(
    cert: &CertificateModel,
    rules: &ValidationRules,
    now: OffsetDateTime,
) -> CertificateStatus {
    if !cert.is_valid {
        return if cert.is_cbor_decoded {
            CertificateStatus::NotValid
        } else {
            CertificateStatus::TechnicalError
        };
    }

    match select_statement(cert) {
        Statement::Recovery(recovery) => {
            recovery_status(recovery, now.date()).unwrap_or(CertificateStatus::NotValid)
        }
        Statement::Test(test) => {
            test_status(test, rules, now).unwrap_or(CertificateStatus::NotValid)
        }
        Statement::Vaccination(vaccination) => {
            vaccination_status(vaccination, rules, now.date())
                .unwrap_or(CertificateStatus::NotValid)
        }
        // No statement list at all. Kept as observed in the deployed
        // verifier; pending product confirmation (see DESIGN.md).
        Statement::None => CertificateStatus::Expired,
    }
}

fn recovery_status(recovery: &RecoveryStatement, today: Date) -> Option<CertificateStatus> {
    let start = parse_day(&recovery.certificate_valid_from)?;
    let end = parse_day(&recovery.certificate_valid_until)?;
    debug!(%start, %end, "recovery validity window");

    Some(window_status(start > today, today > end))
}

fn test_status(
    test: &TestStatement,
    rules: &ValidationRules,
    now: OffsetDateTime,
) -> Option<CertificateStatus> {
    if test.result_type == TestResult::Detected {
        return Some(CertificateStatus::NotValid);
    }

    let collected = OffsetDateTime::parse(&test.date_time_of_collection, &Rfc3339).ok()?;
    let start_hours: i64 = rules.value(RuleName::RapidTestStartHour).parse().ok()?;
    let end_hours: i64 = rules.value(RuleName::RapidTestEndHour).parse().ok()?;

    let start = collected.checked_add(Duration::hours(start_hours))?;
    let end = collected.checked_add(Duration::hours(end_hours))?;
    debug!(%start, %end, "test validity window");

    Some(window_status(start > now, now > end))
}

fn vaccination_status(
    vaccination: &VaccinationStatement,
    rules: &ValidationRules,
    today: Date,
) -> Option<CertificateStatus> {
    // Dose progress selects the rule pair: a partial course uses the
    // NOT_COMPLETE offsets, a completed one the COMPLETE offsets. More
    // doses than the declared series is inconsistent data.
    let (start_rule, end_rule) = match vaccination
        .dose_number
        .cmp(&vaccination.total_series_of_doses)
    {
        Ordering::Less => (
            RuleName::VaccineStartDayNotComplete,
            RuleName::VaccineEndDayNotComplete,
        ),
        Ordering::Equal => (
            RuleName::VaccineStartDayComplete,
            RuleName::VaccineEndDayComplete,
        ),
        Ordering::Greater => return Some(CertificateStatus::NotValid),
    };

    let product = vaccination.medicinal_product.as_str();
    let start_days: i64 = rules.value_for_type(start_rule, product).parse().ok()?;
    let end_days: i64 = rules.value_for_type(end_rule, product).parse().ok()?;

    let vaccinated = parse_day(&vaccination.date_of_vaccination)?;
    let start = vaccinated.checked_add(Duration::days(start_days))?;
    let end = vaccinated.checked_add(Duration::days(end_days))?;
    debug!(%start, %end, "vaccination validity window");

    Some(window_status(start > today, today > end))
}

fn window_status(before_start: bool, after_end: bool) -> CertificateStatus {
    if before_start {
        CertificateStatus::NotValidYet
    } else if after_end {
        CertificateStatus::Expired
    } else {
        CertificateStatus::Valid
    }
}

/// Parse a day-precision date, tolerating a time-of-day suffix.
fn parse_day(value: &str) -> Option<Date> {
    let day = value.split('T').next().unwrap_or(value);
    Date::parse(day, &Iso8601::DEFAULT).ok()
}
