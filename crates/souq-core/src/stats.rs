//! # Stat Windows
//!
//! Pure time-window math for the aggregation engine: half-open windows,
//! period-over-period window derivation, and the percent-change policy.
//!
//! ## Half-Open Windows
//! Every window is `[starts_at, ends_before)`. A sale stamped exactly at
//! `ends_before` belongs to the next window, never to two windows at once.
//!
//! ## Percent-Change Policy
//! ```text
//! previous == 0, current == 0  →    0%
//! previous == 0, current  > 0  →  100%   (never undefined/infinite)
//! otherwise                    →  (current − previous) / previous × 100
//! ```
//! The asymmetric zero handling is deliberate: a move from zero revenue to
//! any positive revenue reports as +100%.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Stat Window
// =============================================================================

/// Aggregated revenue and sale count over one half-open time window.
///
/// Derived on demand from committed sales; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_before: DateTime<Utc>,
    pub revenue_cents: i64,
    pub sale_count: i64,
}

impl StatWindow {
    /// An empty window over the given bounds (the "no data" state).
    pub fn empty(starts_at: DateTime<Utc>, ends_before: DateTime<Utc>) -> Self {
        StatWindow {
            starts_at,
            ends_before,
            revenue_cents: 0,
            sale_count: 0,
        }
    }

    /// Total revenue as Money.
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

// =============================================================================
// Percent Change
// =============================================================================

/// Period-over-period percent change with the zero-previous policy above.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }

    (current - previous) as f64 / previous as f64 * 100.0
}

// =============================================================================
// Period Kinds
// =============================================================================

/// The bounds of one comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub starts_at: DateTime<Utc>,
    pub ends_before: DateTime<Utc>,
}

/// Current and previous window bounds for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonWindows {
    pub current: WindowBounds,
    pub previous: WindowBounds,
}

/// Which period-over-period comparison to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// `[today 00:00, now)` against `[yesterday 00:00, today 00:00)`.
    Daily,
    /// `[first of this month, now)` against
    /// `[first of last month, first of this month)`.
    Monthly,
}

impl PeriodKind {
    /// Derives the comparison windows relative to `now` (UTC).
    pub fn windows(&self, now: DateTime<Utc>) -> ComparisonWindows {
        match self {
            PeriodKind::Daily => {
                let today = start_of_day(now.date_naive());
                let yesterday = today - Duration::days(1);
                ComparisonWindows {
                    current: WindowBounds {
                        starts_at: today,
                        ends_before: now,
                    },
                    previous: WindowBounds {
                        starts_at: yesterday,
                        ends_before: today,
                    },
                }
            }
            PeriodKind::Monthly => {
                let first = start_of_day(first_of_month(now.date_naive()));
                let previous_first = start_of_day(
                    first_of_month(now.date_naive())
                        .checked_sub_months(Months::new(1))
                        .unwrap_or(now.date_naive()),
                );
                ComparisonWindows {
                    current: WindowBounds {
                        starts_at: first,
                        ends_before: now,
                    },
                    previous: WindowBounds {
                        starts_at: previous_first,
                        ends_before: first,
                    },
                }
            }
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists; fall back to the input date rather than panic.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
