//! Period-over-period comparison
//!
//! Deltas carry both the absolute difference and a growth rate. A zero or
//! absent previous value reports a growth rate of 0, not infinity; callers
//! that need to tell "new this period" apart from "flat" read the
//! difference alongside the rate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Direction of movement between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthDirection {
    Positive,
    Negative,
    Neutral,
}

/// Delta between a period and the one before it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    /// Current minus previous
    pub difference: f64,
    /// Difference as a percentage of the previous value, 0 when the
    /// previous value was 0
    pub growth_rate: f64,
    pub direction: GrowthDirection,
}

/// Compare a current value against its previous-period baseline
pub fn compare(current: f64, previous: f64) -> PeriodDelta {
    let difference = current - previous;
    let growth_rate = if previous == 0.0 {
        0.0
    } else {
        difference / previous * 100.0
    };
    let direction = if difference > 0.0 {
        GrowthDirection::Positive
    } else if difference < 0.0 {
        GrowthDirection::Negative
    } else {
        GrowthDirection::Neutral
    };

    PeriodDelta {
        difference,
        growth_rate,
        direction,
    }
}

/// One month in an ascending month-over-month series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// "YYYY-MM" key
    pub month: String,
    pub value: f64,
    /// Delta against the preceding month; `None` for the first point
    pub delta: Option<PeriodDelta>,
}

/// Build an ascending month series with deltas against the prior month
///
/// Months absent from the input are skipped, not zero-filled; a gap makes
/// the next point compare against the last month that had data.
pub fn month_over_month(totals: &HashMap<String, f64>) -> Vec<MonthPoint> {
    let mut months: Vec<&String> = totals.keys().collect();
    months.sort();

    let mut series = Vec::with_capacity(months.len());
    let mut previous: Option<f64> = None;
    for month in months {
        let value = totals[month];
        series.push(MonthPoint {
            month: month.clone(),
            value,
            delta: previous.map(|prior| compare(value, prior)),
        });
        previous = Some(value);
    }
    series
}

/// One year in a descending year-on-year table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOnYearRow {
    /// "YYYY" key
    pub year: String,
    pub value: f64,
    /// Delta against the preceding year; `None` for the oldest year
    pub delta: Option<PeriodDelta>,
}

/// Build a descending year table with deltas against the prior year
///
/// Fewer than two years is not a comparison; the table comes back empty.
pub fn year_on_year(totals: &HashMap<String, f64>) -> Vec<YearOnYearRow> {
    if totals.len() < 2 {
        debug!(
            "Skipping year-on-year table with {} year(s) of data",
            totals.len()
        );
        return Vec::new();
    }

    let mut years: Vec<&String> = totals.keys().collect();
    years.sort();

    let mut rows = Vec::with_capacity(years.len());
    let mut previous: Option<f64> = None;
    for year in years {
        let value = totals[year];
        rows.push(YearOnYearRow {
            year: year.clone(),
            value,
            delta: previous.map(|prior| compare(value, prior)),
        });
        previous = Some(value);
    }
    rows.reverse();
    rows
}
