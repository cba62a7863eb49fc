//! Record filtering
//!
//! Filters compose with AND semantics: a record survives only when it
//! matches every populated criterion. Empty criterion lists match
//! everything. All filter state is hashable so filtered views can be
//! cached by key.

use crate::dates::{month_year_to_date, parse_date};
use chrono::NaiveDate;
use pulse_common::{ClientRecord, LeadRecord, SessionRecord, TrainerRecord, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Inclusive date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Whether the given date falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    /// Whether a raw date cell falls inside the window
    ///
    /// Unbounded ranges accept everything, including unparseable cells.
    /// A bounded range drops records whose date cannot be normalized.
    pub fn contains_raw(&self, raw: &str) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        match parse_date(raw) {
            Some(date) => self.contains(date),
            None => false,
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Criteria applied across all record domains
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub date_range: DateRange,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
    pub sold_by: Vec<String>,
    pub payment_methods: Vec<String>,
    pub trainers: Vec<String>,
    /// Applies to lead and client conversion statuses
    pub conversion_statuses: Vec<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub min_ltv: Option<f64>,
    pub max_ltv: Option<f64>,
}

impl Eq for FilterOptions {}

impl Hash for FilterOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date_range.hash(state);
        self.locations.hash(state);
        self.categories.hash(state);
        self.products.hash(state);
        self.sold_by.hash(state);
        self.payment_methods.hash(state);
        self.trainers.hash(state);
        self.conversion_statuses.hash(state);
        self.min_amount.map(f64::to_bits).hash(state);
        self.max_amount.map(f64::to_bits).hash(state);
        self.min_ltv.map(f64::to_bits).hash(state);
        self.max_ltv.map(f64::to_bits).hash(state);
    }
}

fn list_matches(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|candidate| candidate == value)
}

impl FilterOptions {
    /// Filter with every criterion unset; matches all records
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = locations;
        self
    }

    fn amount_matches(&self, amount: f64) -> bool {
        if let Some(min) = self.min_amount {
            if amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if amount > max {
                return false;
            }
        }
        true
    }

    pub fn matches_transaction(&self, record: &TransactionRecord) -> bool {
        self.date_range.contains_raw(&record.payment_date)
            && list_matches(&self.locations, &record.location)
            && list_matches(&self.categories, &record.category)
            && list_matches(&self.products, &record.product)
            && list_matches(&self.sold_by, &record.sold_by)
            && list_matches(&self.payment_methods, &record.payment_method)
            && self.amount_matches(record.payment_value)
    }

    fn ltv_matches(&self, ltv: f64) -> bool {
        if let Some(min) = self.min_ltv {
            if ltv < min {
                return false;
            }
        }
        if let Some(max) = self.max_ltv {
            if ltv > max {
                return false;
            }
        }
        true
    }

    pub fn matches_client(&self, record: &ClientRecord) -> bool {
        self.date_range.contains_raw(&record.first_visit_date)
            && list_matches(&self.locations, &record.first_visit_location)
            && list_matches(&self.trainers, &record.trainer_name)
            && list_matches(&self.payment_methods, &record.payment_method)
            && list_matches(&self.conversion_statuses, &record.conversion_status)
            && self.ltv_matches(record.ltv)
    }

    pub fn matches_lead(&self, record: &LeadRecord) -> bool {
        self.date_range.contains_raw(&record.created_at)
            && list_matches(&self.conversion_statuses, &record.conversion_status)
            && self.ltv_matches(record.ltv)
    }

    /// Payroll rows carry a "Mon-YYYY" label instead of a full date; the
    /// date window applies to the first day of that month
    pub fn matches_trainer(&self, record: &TrainerRecord) -> bool {
        let month_in_range = if self.date_range.start.is_none() && self.date_range.end.is_none() {
            true
        } else {
            match month_year_to_date(&record.month_year) {
                Some(date) => self.date_range.contains(date),
                None => false,
            }
        };
        month_in_range
            && list_matches(&self.locations, &record.location)
            && list_matches(&self.trainers, &record.teacher_name)
    }

    pub fn matches_session(&self, record: &SessionRecord) -> bool {
        self.date_range.contains_raw(&record.session_date)
            && list_matches(&self.locations, &record.location)
            && list_matches(&self.trainers, &record.trainer_name)
    }
}
