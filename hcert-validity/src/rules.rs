// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Validity rule feed and typed lookup index.
//!
//! The backend supplies rules as a flat JSON array of
//! `{name, type, value}` string records. The index is built once per
//! classification pass and keyed by (rule name, discriminator): `type` is
//! empty for rules global to a certificate kind (test-window hours) and a
//! medicinal product code for the vaccination rules. Missing lookups
//! degrade to the empty string, which downstream integer parsing turns
//! into a not-valid verdict.

use std::collections::HashMap;

use serde::Deserialize;

/// Fixed vocabulary of validity rule names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleName {
    RecoveryCertStartDay,
    RecoveryCertEndDay,
    RapidTestStartHour,
    RapidTestEndHour,
    VaccineStartDayNotComplete,
    VaccineEndDayNotComplete,
    VaccineStartDayComplete,
    VaccineEndDayComplete,
}

impl RuleName {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleName::RecoveryCertStartDay => "RECOVERY_CERT_START_DAY",
            RuleName::RecoveryCertEndDay => "RECOVERY_CERT_END_DAY",
            RuleName::RapidTestStartHour => "RAPID_TEST_START_HOUR",
            RuleName::RapidTestEndHour => "RAPID_TEST_END_HOUR",
            RuleName::VaccineStartDayNotComplete => "VACCINE_START_DAY_NOT_COMPLETE",
            RuleName::VaccineEndDayNotComplete => "VACCINE_END_DAY_NOT_COMPLETE",
            RuleName::VaccineStartDayComplete => "VACCINE_START_DAY_COMPLETE",
            RuleName::VaccineEndDayComplete => "VACCINE_END_DAY_COMPLETE",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "RECOVERY_CERT_START_DAY" => Some(RuleName::RecoveryCertStartDay),
            "RECOVERY_CERT_END_DAY" => Some(RuleName::RecoveryCertEndDay),
            "RAPID_TEST_START_HOUR" => Some(RuleName::RapidTestStartHour),
            "RAPID_TEST_END_HOUR" => Some(RuleName::RapidTestEndHour),
            "VACCINE_START_DAY_NOT_COMPLETE" => Some(RuleName::VaccineStartDayNotComplete),
            "VACCINE_END_DAY_NOT_COMPLETE" => Some(RuleName::VaccineEndDayNotComplete),
            "VACCINE_START_DAY_COMPLETE" => Some(RuleName::VaccineStartDayComplete),
            "VACCINE_END_DAY_COMPLETE" => Some(RuleName::VaccineEndDayComplete),
            _ => None,
        }
    }
}

/// One record of the rule feed, as fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default)]
    pub value: String,
}

/// Typed index over the rule feed, keyed by (name, discriminator).
///
/// Built once and read-only afterwards; safe to share across concurrent
/// classification passes.
#[derive(Debug, Default, Clone)]
pub struct ValidationRules {
    index: HashMap<RuleName, HashMap<String, String>>,
}

impl ValidationRules {
    /// Parse the backing JSON feed and build the index.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Ok(Self::from_rules(rules))
    }

    /// Build the index from already-parsed records.
    ///
    /// Records with a name outside the vocabulary are ignored. For
    /// duplicate (name, type) pairs the first record wins, matching a
    /// first-match scan over the feed.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut index: HashMap<RuleName, HashMap<String, String>> = HashMap::new();
        for rule in rules {
            let Some(name) = RuleName::parse(&rule.name) else {
                continue;
            };
            index
                .entry(name)
                .or_default()
                .entry(rule.rule_type)
                .or_insert(rule.value);
        }
        Self { index }
    }

    /// Look up a rule global to a certificate kind (empty discriminator).
    pub fn value(&self, name: RuleName) -> &str {
        self.value_for_type(name, "")
    }

    /// Look up a discriminated rule, e.g. a vaccination rule keyed by
    /// medicinal product code. Returns `""` when absent.
    pub fn value_for_type(&self, name: RuleName, rule_type: &str) -> &str {
        self.index
            .get(&name)
            .and_then(|by_type| by_type.get(rule_type))
            .map(String::as_str)
            .unwrap_or("")
    }
}
