use serde::Serialize;
use std::fmt;

/// Stable key describing why a message was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    RegexMismatch,
    TooShort,
    TooLong,
    TooFewWords,
    TooManyWords,
    CustomValidationFailed,
    Rejected,
    SoftReject,
}

impl Reason {
    pub const ALL: [Reason; 8] = [
        Reason::RegexMismatch,
        Reason::TooShort,
        Reason::TooLong,
        Reason::TooFewWords,
        Reason::TooManyWords,
        Reason::CustomValidationFailed,
        Reason::Rejected,
        Reason::SoftReject,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Reason::RegexMismatch => "regex-mismatch",
            Reason::TooShort => "too-short",
            Reason::TooLong => "too-long",
            Reason::TooFewWords => "too-few-words",
            Reason::TooManyWords => "too-many-words",
            Reason::CustomValidationFailed => "custom-validation-failed",
            Reason::Rejected => "rejected",
            Reason::SoftReject => "soft-reject",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    /// Likely unwanted, but not definitively spam.
    SoftReject(Reason),
    Reject(Reason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Decision::Accept => None,
            Decision::SoftReject(reason) | Decision::Reject(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_addresses: usize,
    pub address_threshold: usize,
    pub spam_threshold: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_addresses: 1,
            address_threshold: 2,
            spam_threshold: 8,
        }
    }
}

impl From<&crate::config::Config> for Thresholds {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            min_addresses: config.min_addresses,
            address_threshold: config.address_threshold,
            spam_threshold: config.spam_threshold,
        }
    }
}

/// Address count plus spam score, compared against the spam threshold.
pub fn total_score(address_count: usize, spam_score: u32) -> u32 {
    u32::try_from(address_count)
        .unwrap_or(u32::MAX)
        .saturating_add(spam_score)
}

pub fn classify(address_count: usize, spam_score: u32, thresholds: &Thresholds) -> Decision {
    if address_count < thresholds.min_addresses {
        return Decision::Accept;
    }

    let total = total_score(address_count, spam_score);
    // Too many addresses outright and score overflow share one outcome
    if address_count > thresholds.address_threshold.saturating_mul(2)
        || total > thresholds.spam_threshold
    {
        Decision::Reject(Reason::Rejected)
    } else if address_count > thresholds.address_threshold {
        Decision::SoftReject(Reason::SoftReject)
    } else {
        Decision::Accept
    }
}
