//! Metric aggregation
//!
//! Every summary is built in two passes: accumulate raw counts and sums
//! first, then derive rates and averages from the finished totals. Derived
//! ratios guard the zero denominator and report 0 instead of NaN, so empty
//! groups render as zeros downstream.

use pulse_common::{ClientRecord, LeadRecord, SessionRecord, TrainerRecord, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ratio as a percentage, 0 when the denominator is 0
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Mean of a sum over a count, 0 when the count is 0
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn is_converted(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("converted")
}

fn is_retained(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("retained")
}

/// Revenue roll-up for one group of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub transactions: usize,
    pub total_revenue: f64,
    pub total_vat: f64,
    /// Revenue net of VAT
    pub net_revenue: f64,
    pub total_discount: f64,
    /// Distinct non-blank member ids seen in the group
    pub unique_members: usize,
    /// Mean revenue per transaction
    pub average_ticket: f64,
    /// Mean revenue per distinct member
    pub average_spend: f64,
    /// Discount as a percentage of pre-discount list value
    pub discount_rate: f64,
}

impl SalesSummary {
    pub fn from_records(records: &[&TransactionRecord]) -> Self {
        let mut summary = Self::default();
        let mut members: HashSet<&str> = HashSet::new();
        let mut total_mrp = 0.0;

        for record in records {
            summary.transactions += 1;
            summary.total_revenue += record.payment_value;
            summary.total_vat += record.payment_vat;
            summary.total_discount += record.discount_amount;
            total_mrp += record.mrp_post_tax;
            let member = record.member_id.trim();
            if !member.is_empty() {
                members.insert(member);
            }
        }

        summary.net_revenue = summary.total_revenue - summary.total_vat;
        summary.unique_members = members.len();
        summary.average_ticket = average(summary.total_revenue, summary.transactions);
        summary.average_spend = average(summary.total_revenue, summary.unique_members);
        summary.discount_rate = percentage(summary.total_discount, total_mrp);
        summary
    }
}

/// Discount roll-up for one group of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountSummary {
    pub transactions: usize,
    /// Transactions carrying a non-zero discount
    pub discounted_transactions: usize,
    pub total_discount: f64,
    pub total_revenue: f64,
    /// Share of transactions that were discounted
    pub discounted_share: f64,
    /// Mean discount over discounted transactions only
    pub average_discount: f64,
}

impl DiscountSummary {
    pub fn from_records(records: &[&TransactionRecord]) -> Self {
        let mut summary = Self::default();

        for record in records {
            summary.transactions += 1;
            summary.total_revenue += record.payment_value;
            if record.discount_amount > 0.0 {
                summary.discounted_transactions += 1;
                summary.total_discount += record.discount_amount;
            }
        }

        summary.discounted_share =
            percentage(summary.discounted_transactions as f64, summary.transactions as f64);
        summary.average_discount =
            average(summary.total_discount, summary.discounted_transactions);
        summary
    }
}

/// Funnel roll-up for one group of leads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSourceSummary {
    pub total_leads: usize,
    pub converted: usize,
    /// Leads whose stage reached a completed trial
    pub trials_completed: usize,
    pub lost: usize,
    pub total_ltv: f64,
    /// Converted share of all leads in the group
    pub conversion_rate: f64,
    /// Trial-completed share of all leads in the group
    pub trial_rate: f64,
    pub average_ltv: f64,
}

impl LeadSourceSummary {
    pub fn from_records(records: &[&LeadRecord]) -> Self {
        let mut summary = Self::default();

        for record in records {
            summary.total_leads += 1;
            summary.total_ltv += record.ltv;
            if is_converted(&record.conversion_status) {
                summary.converted += 1;
            }
            if record.stage.trim().eq_ignore_ascii_case("trial completed") {
                summary.trials_completed += 1;
            }
            if record.conversion_status.trim().eq_ignore_ascii_case("lost") {
                summary.lost += 1;
            }
        }

        summary.conversion_rate =
            percentage(summary.converted as f64, summary.total_leads as f64);
        summary.trial_rate =
            percentage(summary.trials_completed as f64, summary.total_leads as f64);
        summary.average_ltv = average(summary.total_ltv, summary.total_leads);
        summary
    }
}

/// Conversion and retention roll-up for one group of client records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConversionSummary {
    pub total_clients: usize,
    pub new_members: usize,
    pub converted: usize,
    pub retained: usize,
    /// Clients with at least one visit after their trial
    pub active: usize,
    pub total_ltv: f64,
    /// LTV contributed by converted clients only
    pub converted_ltv: f64,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub new_client_rate: f64,
    pub activation_rate: f64,
    pub average_ltv: f64,
    pub average_visits_post_trial: f64,
    pub average_purchase_count: f64,
    /// Mean days from first visit to conversion, over every client with a
    /// recorded non-zero span
    pub average_conversion_span: f64,
}

impl ClientConversionSummary {
    pub fn from_records(records: &[&ClientRecord]) -> Self {
        let mut summary = Self::default();
        let mut span_total = 0.0;
        let mut span_count = 0usize;
        let mut visits_total = 0u64;
        let mut purchases_total = 0u64;

        for record in records {
            summary.total_clients += 1;
            summary.total_ltv += record.ltv;
            visits_total += u64::from(record.visits_post_trial);
            purchases_total += u64::from(record.purchase_count_post_trial);
            if record.is_new.trim().eq_ignore_ascii_case("yes") {
                summary.new_members += 1;
            }
            if record.visits_post_trial > 0 {
                summary.active += 1;
            }
            if record.conversion_span > 0.0 {
                span_total += record.conversion_span;
                span_count += 1;
            }
            if is_converted(&record.conversion_status) {
                summary.converted += 1;
                summary.converted_ltv += record.ltv;
            }
            if is_retained(&record.retention_status) {
                summary.retained += 1;
            }
        }

        summary.conversion_rate =
            percentage(summary.converted as f64, summary.total_clients as f64);
        summary.retention_rate =
            percentage(summary.retained as f64, summary.total_clients as f64);
        summary.new_client_rate =
            percentage(summary.new_members as f64, summary.total_clients as f64);
        summary.activation_rate =
            percentage(summary.active as f64, summary.total_clients as f64);
        summary.average_ltv = average(summary.total_ltv, summary.total_clients);
        summary.average_visits_post_trial =
            average(visits_total as f64, summary.total_clients);
        summary.average_purchase_count =
            average(purchases_total as f64, summary.total_clients);
        summary.average_conversion_span = average(span_total, span_count);
        summary
    }
}

/// Performance roll-up for one group of payroll rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerSummary {
    pub total_sessions: u32,
    pub empty_sessions: u32,
    pub non_empty_sessions: u32,
    pub total_customers: u32,
    pub total_paid: f64,
    pub cycle_sessions: u32,
    pub barre_sessions: u32,
    pub cycle_paid: f64,
    pub barre_paid: f64,
    pub new_members: u32,
    pub retained: u32,
    pub converted: u32,
    /// Mean attendance across all sessions, empty ones included
    pub class_average: f64,
    /// Mean attendance across non-empty sessions only
    pub class_average_excl_empty: f64,
    /// Non-empty share of all sessions
    pub utilization_rate: f64,
    pub revenue_per_session: f64,
    pub revenue_per_customer: f64,
    /// Mean of the per-month retention rate fields
    pub retention_rate: f64,
    /// Mean of the per-month conversion rate fields
    pub conversion_rate: f64,
}

impl TrainerSummary {
    pub fn from_records(records: &[&TrainerRecord]) -> Self {
        let mut summary = Self::default();
        let mut retention_total = 0.0;
        let mut conversion_total = 0.0;

        for record in records {
            retention_total += record.retention;
            conversion_total += record.conversion;
            summary.total_sessions += record.total_sessions;
            summary.empty_sessions += record.total_empty_sessions;
            summary.non_empty_sessions += record.total_non_empty_sessions;
            summary.total_customers += record.total_customers;
            summary.total_paid += record.total_paid;
            summary.cycle_sessions += record.cycle_sessions;
            summary.barre_sessions += record.barre_sessions;
            summary.cycle_paid += record.cycle_paid;
            summary.barre_paid += record.barre_paid;
            summary.new_members += record.new_members;
            summary.retained += record.retained;
            summary.converted += record.converted;
        }

        summary.class_average =
            average(summary.total_customers as f64, summary.total_sessions as usize);
        summary.class_average_excl_empty = average(
            summary.total_customers as f64,
            summary.non_empty_sessions as usize,
        );
        summary.utilization_rate = percentage(
            summary.non_empty_sessions as f64,
            summary.total_sessions as f64,
        );
        summary.revenue_per_session =
            average(summary.total_paid, summary.total_sessions as usize);
        summary.revenue_per_customer =
            average(summary.total_paid, summary.total_customers as usize);
        summary.retention_rate = average(retention_total, records.len());
        summary.conversion_rate = average(conversion_total, records.len());
        summary
    }
}

/// Attendance roll-up for one group of sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_sessions: usize,
    pub total_checked_in: u32,
    pub total_capacity: u32,
    pub total_revenue: f64,
    /// Checked-in share of capacity
    pub fill_rate: f64,
    pub average_attendance: f64,
    pub revenue_per_session: f64,
}

impl SessionSummary {
    pub fn from_records(records: &[&SessionRecord]) -> Self {
        let mut summary = Self::default();

        for record in records {
            summary.total_sessions += 1;
            summary.total_checked_in += record.checked_in;
            summary.total_capacity += record.capacity;
            summary.total_revenue += record.revenue;
        }

        summary.fill_rate = percentage(
            summary.total_checked_in as f64,
            summary.total_capacity as f64,
        );
        summary.average_attendance = average(
            summary.total_checked_in as f64,
            summary.total_sessions,
        );
        summary.revenue_per_session = average(summary.total_revenue, summary.total_sessions);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_guards_zero_denominator() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_average_guards_zero_count() {
        assert_eq!(average(10.0, 0), 0.0);
        assert_eq!(average(10.0, 4), 2.5);
    }

    #[test]
    fn test_empty_group_yields_all_zero_summary() {
        let summary = SalesSummary::from_records(&[]);
        assert_eq!(summary, SalesSummary::default());
        let sessions = SessionSummary::from_records(&[]);
        assert_eq!(sessions.fill_rate, 0.0);
    }

    #[test]
    fn test_sales_summary_counts_unique_members() {
        let a = TransactionRecord {
            member_id: "M1".to_string(),
            payment_value: 100.0,
            mrp_post_tax: 125.0,
            discount_amount: 25.0,
            ..Default::default()
        };
        let b = TransactionRecord {
            member_id: "M1".to_string(),
            payment_value: 300.0,
            mrp_post_tax: 300.0,
            ..Default::default()
        };
        let c = TransactionRecord {
            member_id: " ".to_string(),
            payment_value: 50.0,
            mrp_post_tax: 50.0,
            ..Default::default()
        };

        let summary = SalesSummary::from_records(&[&a, &b, &c]);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.total_revenue, 450.0);
        // Blank member id does not count toward uniques
        assert_eq!(summary.unique_members, 1);
        assert_eq!(summary.average_ticket, 150.0);
        assert_eq!(summary.average_spend, 450.0);
        // 25 discount on 475 list value
        assert!((summary.discount_rate - 25.0 / 475.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_discount_summary_averages_over_discounted_only() {
        let full_price = TransactionRecord {
            payment_value: 100.0,
            ..Default::default()
        };
        let discounted = TransactionRecord {
            payment_value: 80.0,
            discount_amount: 20.0,
            ..Default::default()
        };

        let summary = DiscountSummary::from_records(&[&full_price, &discounted]);
        assert_eq!(summary.discounted_transactions, 1);
        assert_eq!(summary.discounted_share, 50.0);
        assert_eq!(summary.average_discount, 20.0);
    }

    #[test]
    fn test_lead_summary_funnel_counts() {
        let won = LeadRecord {
            stage: "Trial Completed".to_string(),
            conversion_status: "Converted".to_string(),
            ltv: 1000.0,
            ..Default::default()
        };
        let open = LeadRecord {
            stage: "Trial Scheduled".to_string(),
            conversion_status: "Open".to_string(),
            ..Default::default()
        };
        let dropped = LeadRecord {
            stage: "Trial Completed".to_string(),
            conversion_status: "Lost".to_string(),
            ..Default::default()
        };

        let summary = LeadSourceSummary::from_records(&[&won, &open, &dropped]);
        assert_eq!(summary.total_leads, 3);
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.trials_completed, 2);
        assert_eq!(summary.lost, 1);
        assert!((summary.conversion_rate - 100.0 / 3.0).abs() < 1e-9);
        assert!((summary.trial_rate - 200.0 / 3.0).abs() < 1e-9);
        assert!((summary.average_ltv - 1000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_client_summary_rates_and_span() {
        let converted = ClientRecord {
            is_new: "Yes".to_string(),
            conversion_status: "Converted".to_string(),
            retention_status: "Retained".to_string(),
            conversion_span: 10.0,
            visits_post_trial: 8,
            purchase_count_post_trial: 2,
            ltv: 5000.0,
            ..Default::default()
        };
        let churned = ClientRecord {
            is_new: "Yes".to_string(),
            conversion_status: "Not Converted".to_string(),
            retention_status: "Not Retained".to_string(),
            conversion_span: 20.0,
            ..Default::default()
        };

        let summary = ClientConversionSummary::from_records(&[&converted, &churned]);
        assert_eq!(summary.new_members, 2);
        assert_eq!(summary.new_client_rate, 100.0);
        assert_eq!(summary.conversion_rate, 50.0);
        assert_eq!(summary.retention_rate, 50.0);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.activation_rate, 50.0);
        assert_eq!(summary.converted_ltv, 5000.0);
        assert_eq!(summary.average_visits_post_trial, 4.0);
        assert_eq!(summary.average_purchase_count, 1.0);
        // Span averages over every client with a recorded span, converted
        // or not
        assert_eq!(summary.average_conversion_span, 15.0);
    }

    #[test]
    fn test_new_client_flag_is_the_yes_literal() {
        let flagged = ClientRecord {
            is_new: "Yes".to_string(),
            ..Default::default()
        };
        let unflagged = ClientRecord {
            is_new: "No".to_string(),
            ..Default::default()
        };
        let blank = ClientRecord::default();

        let summary = ClientConversionSummary::from_records(&[&flagged, &unflagged, &blank]);
        assert_eq!(summary.new_members, 1);
        assert!((summary.new_client_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_trainer_summary_derives_from_totals() {
        let january = TrainerRecord {
            total_sessions: 40,
            total_empty_sessions: 8,
            total_non_empty_sessions: 32,
            total_customers: 320,
            total_paid: 40000.0,
            retention: 62.0,
            conversion: 45.0,
            new_members: 10,
            retained: 6,
            converted: 4,
            ..Default::default()
        };
        let february = TrainerRecord {
            total_sessions: 10,
            total_empty_sessions: 2,
            total_non_empty_sessions: 8,
            total_customers: 80,
            total_paid: 10000.0,
            retention: 38.0,
            conversion: 35.0,
            new_members: 0,
            ..Default::default()
        };

        let summary = TrainerSummary::from_records(&[&january, &february]);
        assert_eq!(summary.total_sessions, 50);
        assert_eq!(summary.class_average, 8.0);
        assert_eq!(summary.class_average_excl_empty, 10.0);
        assert_eq!(summary.utilization_rate, 80.0);
        assert_eq!(summary.revenue_per_session, 1000.0);
        assert_eq!(summary.revenue_per_customer, 125.0);
        // Rates are the mean of the per-month rate columns, not a ratio of
        // the summed counts
        assert_eq!(summary.retention_rate, 50.0);
        assert_eq!(summary.conversion_rate, 40.0);
        assert_eq!(summary.retained, 6);
        assert_eq!(summary.new_members, 10);
    }

    #[test]
    fn test_session_summary_fill_rate() {
        let full = SessionRecord {
            checked_in: 10,
            capacity: 10,
            revenue: 500.0,
            ..Default::default()
        };
        let half = SessionRecord {
            checked_in: 5,
            capacity: 10,
            revenue: 250.0,
            ..Default::default()
        };

        let summary = SessionSummary::from_records(&[&full, &half]);
        assert_eq!(summary.fill_rate, 75.0);
        assert_eq!(summary.average_attendance, 7.5);
        assert_eq!(summary.total_revenue, 750.0);
    }

    #[test]
    fn test_zero_capacity_sessions_have_zero_fill_rate() {
        let workshop = SessionRecord {
            checked_in: 0,
            capacity: 0,
            ..Default::default()
        };
        let summary = SessionSummary::from_records(&[&workshop]);
        assert_eq!(summary.fill_rate, 0.0);
    }
}
