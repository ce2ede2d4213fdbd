//! Certificate expiry classification
//!
//! Decides whether a validity window warrants a warning at a given instant.

use crate::CertificateValidity;
use chrono::{DateTime, Utc};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Why a certificate needs attention, if it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// `now` is before `notBefore`.
    NotYetValid,
    /// `notAfter` is a full day or more in the past.
    Expired,
    /// Less than one whole day left.
    ExpiresToday,
    /// One whole day left.
    ExpiresTomorrow,
    /// Whole days left, always below the warning period.
    ExpiresSoon(i64),
    /// Valid, with at least the warning period remaining.
    NoWarning,
}

impl WarningKind {
    /// Whether this outcome calls for a warning.
    pub fn should_warn(self) -> bool {
        self != WarningKind::NoWarning
    }

    /// Condition text used in the notice subject line.
    pub fn condition(self) -> Option<String> {
        let text = match self {
            WarningKind::NotYetValid => "is not yet valid".to_string(),
            WarningKind::Expired => "has expired".to_string(),
            WarningKind::ExpiresToday => "will expire today".to_string(),
            WarningKind::ExpiresTomorrow => "will expire tomorrow".to_string(),
            WarningKind::ExpiresSoon(days) => format!("will expire in {} days", days),
            WarningKind::NoWarning => return None,
        };
        Some(text)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.condition() {
            Some(text) => f.write_str(&text),
            None => f.write_str("no warning"),
        }
    }
}

/// Outcome of evaluating one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningDecision {
    /// Classification of the validity window.
    pub kind: WarningKind,
    /// Rendered notice; only set when warning and not quiet.
    pub message: Option<String>,
}

impl WarningDecision {
    /// Whether the process should report a warning condition.
    pub fn should_warn(&self) -> bool {
        self.kind.should_warn()
    }
}

/// Whole days from `now` until `not_after`.
///
/// Integer division truncates toward zero, so anything less than a full day
/// past expiry still counts as day 0.
pub fn days_until_expiry(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after.timestamp() - now.timestamp()) / SECONDS_PER_DAY
}

/// Classify a validity window at `now`. First matching rule wins.
pub fn classify(
    validity: &CertificateValidity,
    now: DateTime<Utc>,
    warn_period_days: u32,
) -> WarningKind {
    let days = days_until_expiry(validity.not_after, now);

    if now < validity.not_before {
        WarningKind::NotYetValid
    } else if days < 0 {
        WarningKind::Expired
    } else if days == 0 {
        WarningKind::ExpiresToday
    } else if days == 1 {
        WarningKind::ExpiresTomorrow
    } else if days < i64::from(warn_period_days) {
        WarningKind::ExpiresSoon(days)
    } else {
        WarningKind::NoWarning
    }
}

/// Evaluate a validity window. The decision carries no message; see
/// [`crate::notice::render`] for that.
pub fn evaluate(
    validity: &CertificateValidity,
    now: DateTime<Utc>,
    warn_period_days: u32,
) -> WarningDecision {
    WarningDecision {
        kind: classify(validity, now, warn_period_days),
        message: None,
    }
}
