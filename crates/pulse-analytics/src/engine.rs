//! Analytics engine over an in-memory data snapshot
//!
//! The engine holds one immutable snapshot of decoded records and exposes
//! every dashboard view as a pure method: filter, group, aggregate, rank.
//! Views on an empty snapshot return empty collections or all-zero
//! summaries, never errors.

use crate::comparison::{month_over_month, year_on_year, MonthPoint, YearOnYearRow};
use crate::dates::{parse_month_year, parse_parts};
use crate::filters::FilterOptions;
use crate::grouping::{group_by, group_by_or};
use crate::metrics::{
    ClientConversionSummary, DiscountSummary, LeadSourceSummary, SalesSummary, SessionSummary,
    TrainerSummary,
};
use crate::ranking::rank_desc;
use pulse_common::{ClientRecord, LeadRecord, SessionRecord, TrainerRecord, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Immutable bundle of decoded records for one refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSnapshot {
    pub transactions: Vec<TransactionRecord>,
    pub clients: Vec<ClientRecord>,
    pub leads: Vec<LeadRecord>,
    pub trainers: Vec<TrainerRecord>,
    pub sessions: Vec<SessionRecord>,
}

impl DataSnapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
            && self.clients.is_empty()
            && self.leads.is_empty()
            && self.trainers.is_empty()
            && self.sessions.is_empty()
    }
}

/// Grouping dimension for transaction views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesDimension {
    Location,
    Product,
    Category,
    SoldBy,
    PaymentMethod,
}

impl SalesDimension {
    fn key(&self, record: &TransactionRecord) -> String {
        match self {
            Self::Location => record.location.clone(),
            Self::Product => record.product.clone(),
            Self::Category => record.category.clone(),
            Self::SoldBy => record.sold_by.clone(),
            Self::PaymentMethod => record.payment_method.clone(),
        }
    }
}

/// Grouping dimension for lead views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadDimension {
    Source,
    Stage,
    Associate,
}

impl LeadDimension {
    fn key(&self, record: &LeadRecord) -> String {
        match self {
            Self::Source => record.source.clone(),
            Self::Stage => record.stage.clone(),
            Self::Associate => record.associate.clone(),
        }
    }
}

/// Grouping dimension for client conversion views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientDimension {
    Location,
    Trainer,
    PaymentMethod,
}

impl ClientDimension {
    fn key(&self, record: &ClientRecord) -> String {
        match self {
            Self::Location => record.first_visit_location.clone(),
            Self::Trainer => record.trainer_name.clone(),
            Self::PaymentMethod => record.payment_method.clone(),
        }
    }
}

/// Grouping dimension for session views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionDimension {
    Location,
    Trainer,
    ClassType,
}

impl SessionDimension {
    fn key(&self, record: &SessionRecord) -> String {
        match self {
            Self::Location => record.location.clone(),
            Self::Trainer => record.trainer_name.clone(),
            Self::ClassType => record.class_type.clone(),
        }
    }
}

/// Studio-wide roll-up across every domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub sales: SalesSummary,
    pub clients: ClientConversionSummary,
    pub leads: LeadSourceSummary,
    pub sessions: SessionSummary,
}

/// Pure aggregation facade over one snapshot
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    snapshot: DataSnapshot,
}

impl AnalyticsEngine {
    pub fn new(snapshot: DataSnapshot) -> Self {
        info!(
            transactions = snapshot.transactions.len(),
            clients = snapshot.clients.len(),
            leads = snapshot.leads.len(),
            trainers = snapshot.trainers.len(),
            sessions = snapshot.sessions.len(),
            "Loaded analytics snapshot"
        );
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &DataSnapshot {
        &self.snapshot
    }

    fn filtered_transactions(&self, filter: &FilterOptions) -> Vec<&TransactionRecord> {
        self.snapshot
            .transactions
            .iter()
            .filter(|record| filter.matches_transaction(record))
            .collect()
    }

    fn filtered_clients(&self, filter: &FilterOptions) -> Vec<&ClientRecord> {
        self.snapshot
            .clients
            .iter()
            .filter(|record| filter.matches_client(record))
            .collect()
    }

    fn filtered_leads(&self, filter: &FilterOptions) -> Vec<&LeadRecord> {
        self.snapshot
            .leads
            .iter()
            .filter(|record| filter.matches_lead(record))
            .collect()
    }

    fn filtered_sessions(&self, filter: &FilterOptions) -> Vec<&SessionRecord> {
        self.snapshot
            .sessions
            .iter()
            .filter(|record| filter.matches_session(record))
            .collect()
    }

    fn filtered_trainers(&self, filter: &FilterOptions) -> Vec<&TrainerRecord> {
        self.snapshot
            .trainers
            .iter()
            .filter(|record| filter.matches_trainer(record))
            .collect()
    }

    /// Sales summaries per group, ranked by revenue descending
    pub fn sales_by(
        &self,
        dimension: SalesDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, SalesSummary)> {
        let records = self.filtered_transactions(filter);
        debug!(
            "Aggregating sales across {} filtered transactions",
            records.len()
        );
        let groups = group_by_or(records, |record| dimension.key(record));
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, SalesSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_revenue, limit)
    }

    /// Discount summaries per group, ranked by total discount descending
    pub fn discounts_by(
        &self,
        dimension: SalesDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, DiscountSummary)> {
        let records = self.filtered_transactions(filter);
        let groups = group_by_or(records, |record| dimension.key(record));
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, DiscountSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_discount, limit)
    }

    /// Lead summaries per group, ranked by lead volume descending
    pub fn leads_by(
        &self,
        dimension: LeadDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, LeadSourceSummary)> {
        let records = self.filtered_leads(filter);
        let groups = group_by_or(records, |record| dimension.key(record));
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, LeadSourceSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_leads as f64, limit)
    }

    /// Client conversion summaries per group, ranked by client count
    pub fn clients_by(
        &self,
        dimension: ClientDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, ClientConversionSummary)> {
        let records = self.filtered_clients(filter);
        let groups = group_by_or(records, |record| dimension.key(record));
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, ClientConversionSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_clients as f64, limit)
    }

    /// Session summaries per group, ranked by attendance
    pub fn sessions_by(
        &self,
        dimension: SessionDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, SessionSummary)> {
        let records = self.filtered_sessions(filter);
        let groups = group_by_or(records, |record| dimension.key(record));
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, SessionSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_checked_in as f64, limit)
    }

    /// Trainer summaries keyed by trainer name, ranked by revenue
    pub fn trainer_performance(
        &self,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, TrainerSummary)> {
        let records = self.filtered_trainers(filter);
        let groups = group_by_or(records, |record| record.teacher_name.clone());
        let summaries = groups
            .into_iter()
            .map(|(key, members)| (key, TrainerSummary::from_records(&members)))
            .collect();
        rank_desc(summaries, |entry| entry.1.total_paid, limit)
    }

    /// Ascending monthly revenue series with month-over-month deltas
    ///
    /// Transactions whose payment date does not parse are left out.
    pub fn monthly_revenue(&self, filter: &FilterOptions) -> Vec<MonthPoint> {
        let records = self.filtered_transactions(filter);
        let groups = group_by(records, |record| {
            parse_parts(&record.payment_date).map(|parts| parts.month_key())
        });
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(month, members)| {
                let revenue = members.iter().map(|r| r.payment_value).sum();
                (month, revenue)
            })
            .collect();
        month_over_month(&totals)
    }

    /// Ascending monthly lead volume series
    pub fn monthly_leads(&self, filter: &FilterOptions) -> Vec<MonthPoint> {
        let records = self.filtered_leads(filter);
        let groups = group_by(records, |record| {
            parse_parts(&record.created_at).map(|parts| parts.month_key())
        });
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(month, members)| (month, members.len() as f64))
            .collect();
        month_over_month(&totals)
    }

    /// Ascending monthly discount series
    pub fn monthly_discounts(&self, filter: &FilterOptions) -> Vec<MonthPoint> {
        let records = self.filtered_transactions(filter);
        let groups = group_by(records, |record| {
            parse_parts(&record.payment_date).map(|parts| parts.month_key())
        });
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(month, members)| {
                let discount = members.iter().map(|r| r.discount_amount).sum();
                (month, discount)
            })
            .collect();
        month_over_month(&totals)
    }

    /// Month with the highest lead volume, if any leads match
    pub fn peak_lead_month(&self, filter: &FilterOptions) -> Option<MonthPoint> {
        self.monthly_leads(filter)
            .into_iter()
            .max_by(|a, b| {
                a.value
                    .partial_cmp(&b.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Highest-volume lead source
    pub fn top_lead_source(&self, filter: &FilterOptions) -> Option<(String, LeadSourceSummary)> {
        self.leads_by(LeadDimension::Source, filter, Some(1))
            .into_iter()
            .next()
    }

    /// Lead source with the best conversion rate
    pub fn best_converting_source(
        &self,
        filter: &FilterOptions,
    ) -> Option<(String, LeadSourceSummary)> {
        let sources = self.leads_by(LeadDimension::Source, filter, None);
        rank_desc(sources, |entry| entry.1.conversion_rate, Some(1))
            .into_iter()
            .next()
    }

    /// Ascending monthly payroll series keyed from "Mon-YYYY" labels
    pub fn monthly_trainer_pay(&self, filter: &FilterOptions) -> Vec<MonthPoint> {
        let records = self.filtered_trainers(filter);
        let groups = group_by(records, |record| parse_month_year(&record.month_year));
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(month, members)| {
                let paid = members.iter().map(|r| r.total_paid).sum();
                (month, paid)
            })
            .collect();
        month_over_month(&totals)
    }

    /// Descending year-on-year revenue table; empty below two years
    pub fn yearly_revenue(&self, filter: &FilterOptions) -> Vec<YearOnYearRow> {
        let records = self.filtered_transactions(filter);
        let groups = group_by(records, |record| {
            parse_parts(&record.payment_date).map(|parts| parts.year_key())
        });
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(year, members)| {
                let revenue = members.iter().map(|r| r.payment_value).sum();
                (year, revenue)
            })
            .collect();
        year_on_year(&totals)
    }

    /// Descending year-on-year lead volume table
    pub fn yearly_leads(&self, filter: &FilterOptions) -> Vec<YearOnYearRow> {
        let records = self.filtered_leads(filter);
        let groups = group_by(records, |record| {
            parse_parts(&record.created_at).map(|parts| parts.year_key())
        });
        let totals: HashMap<String, f64> = groups
            .into_iter()
            .map(|(year, members)| (year, members.len() as f64))
            .collect();
        year_on_year(&totals)
    }

    /// One roll-up across every domain for the given filter
    pub fn executive_summary(&self, filter: &FilterOptions) -> ExecutiveSummary {
        ExecutiveSummary {
            sales: SalesSummary::from_records(&self.filtered_transactions(filter)),
            clients: ClientConversionSummary::from_records(&self.filtered_clients(filter)),
            leads: LeadSourceSummary::from_records(&self.filtered_leads(filter)),
            sessions: SessionSummary::from_records(&self.filtered_sessions(filter)),
        }
    }
}
