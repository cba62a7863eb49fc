//! Google Sheets values client and row decoding
//!
//! A thin read-only client for the sheets values API. Authentication uses a
//! bearer token injected through [`SheetsConfig`]; token refresh and retry
//! policies live outside this crate. Decoding maps positional cells onto the
//! record schema in one pass, defaulting every missing or malformed cell.

use crate::config::SheetsConfig;
use crate::error::{PulseError, Result};
use crate::records::{
    parse_rate, ClientRecord, LeadRecord, SessionRecord, TrainerRecord, TransactionRecord,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Response body of a values range request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValuesResponse {
    pub range: String,
    pub major_dimension: String,
    pub values: Vec<Vec<String>>,
}

impl ValuesResponse {
    /// Data rows, skipping the header row if present
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.values.len() < 2 {
            &[]
        } else {
            &self.values[1..]
        }
    }
}

/// Read-only client for the sheets values API
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
}

impl SheetsClient {
    /// Create a new client with the given configuration
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PulseError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.spreadsheet_id,
            range
        )
    }

    /// Fetch one sheet tab (or A1 range) as raw string cells
    #[instrument(skip(self), fields(range = %range))]
    pub async fn fetch_values(&self, range: &str) -> Result<ValuesResponse> {
        let url = self.values_url(range);
        debug!("Fetching values from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .query(&[("alt", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Values request failed with status {}", status);
            return Err(PulseError::sheets_with_status(
                format!("Values request for '{}' failed", range),
                status.as_u16(),
            ));
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| PulseError::network_with_source("Failed to decode values body", e))?;

        info!(
            "Fetched {} rows from range '{}'",
            body.values.len().saturating_sub(1),
            range
        );
        Ok(body)
    }

    /// Fetch and decode the sales tab
    pub async fn fetch_transactions(&self, range: &str) -> Result<Vec<TransactionRecord>> {
        Ok(decode_transactions(&self.fetch_values(range).await?))
    }

    /// Fetch and decode the new-client tab
    pub async fn fetch_clients(&self, range: &str) -> Result<Vec<ClientRecord>> {
        Ok(decode_clients(&self.fetch_values(range).await?))
    }

    /// Fetch and decode the leads tab
    pub async fn fetch_leads(&self, range: &str) -> Result<Vec<LeadRecord>> {
        Ok(decode_leads(&self.fetch_values(range).await?))
    }

    /// Fetch and decode the payroll tab
    pub async fn fetch_trainers(&self, range: &str) -> Result<Vec<TrainerRecord>> {
        Ok(decode_trainers(&self.fetch_values(range).await?))
    }

    /// Fetch and decode the sessions tab
    pub async fn fetch_sessions(&self, range: &str) -> Result<Vec<SessionRecord>> {
        Ok(decode_sessions(&self.fetch_values(range).await?))
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn cell_f64(row: &[String], index: usize) -> f64 {
    row.get(index)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn cell_u32(row: &[String], index: usize) -> u32 {
    row.get(index)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

fn cell_rate(row: &[String], index: usize) -> f64 {
    row.get(index).map(|v| parse_rate(v)).unwrap_or(0.0)
}

/// Decode the sales tab (column layout of the Sales sheet)
pub fn decode_transactions(values: &ValuesResponse) -> Vec<TransactionRecord> {
    values
        .data_rows()
        .iter()
        .map(|row| TransactionRecord {
            member_id: cell(row, 0),
            customer_name: cell(row, 1),
            payment_date: cell(row, 5),
            payment_value: cell_f64(row, 6),
            payment_vat: cell_f64(row, 8),
            payment_method: cell(row, 10),
            sold_by: cell(row, 14),
            location: cell(row, 16),
            product: cell(row, 17),
            category: cell(row, 18),
            mrp_post_tax: cell_f64(row, 21),
            discount_amount: cell_f64(row, 22),
            discount_percentage: cell_f64(row, 23),
        })
        .collect()
}

/// Decode the new-client tab
pub fn decode_clients(values: &ValuesResponse) -> Vec<ClientRecord> {
    values
        .data_rows()
        .iter()
        .map(|row| ClientRecord {
            member_id: cell(row, 0),
            first_visit_date: cell(row, 1),
            first_visit_location: cell(row, 2),
            home_location: cell(row, 3),
            trainer_name: cell(row, 4),
            payment_method: cell(row, 5),
            is_new: cell(row, 6),
            visits_post_trial: cell_u32(row, 7),
            purchase_count_post_trial: cell_u32(row, 8),
            ltv: cell_f64(row, 9),
            conversion_status: cell(row, 10),
            retention_status: cell(row, 11),
            conversion_span: cell_f64(row, 12),
        })
        .collect()
}

/// Decode the leads tab
pub fn decode_leads(values: &ValuesResponse) -> Vec<LeadRecord> {
    values
        .data_rows()
        .iter()
        .map(|row| LeadRecord {
            source: cell(row, 0),
            stage: cell(row, 1),
            associate: cell(row, 2),
            created_at: cell(row, 3),
            conversion_status: cell(row, 4),
            ltv: cell_f64(row, 5),
        })
        .collect()
}

/// Decode the payroll tab
pub fn decode_trainers(values: &ValuesResponse) -> Vec<TrainerRecord> {
    values
        .data_rows()
        .iter()
        .map(|row| TrainerRecord {
            teacher_name: cell(row, 0),
            location: cell(row, 1),
            month_year: cell(row, 2),
            total_sessions: cell_u32(row, 3),
            total_customers: cell_u32(row, 4),
            total_paid: cell_f64(row, 5),
            total_empty_sessions: cell_u32(row, 6),
            total_non_empty_sessions: cell_u32(row, 7),
            cycle_sessions: cell_u32(row, 8),
            barre_sessions: cell_u32(row, 9),
            cycle_paid: cell_f64(row, 10),
            barre_paid: cell_f64(row, 11),
            class_average_incl_empty: cell_f64(row, 12),
            class_average_excl_empty: cell_f64(row, 13),
            retention: cell_rate(row, 14),
            conversion: cell_rate(row, 15),
            new_members: cell_u32(row, 16),
            retained: cell_u32(row, 17),
            converted: cell_u32(row, 18),
        })
        .collect()
}

/// Decode the sessions tab
pub fn decode_sessions(values: &ValuesResponse) -> Vec<SessionRecord> {
    values
        .data_rows()
        .iter()
        .map(|row| SessionRecord {
            session_date: cell(row, 0),
            location: cell(row, 1),
            trainer_name: cell(row, 2),
            class_type: cell(row, 3),
            checked_in: cell_u32(row, 4),
            capacity: cell_u32(row, 5),
            revenue: cell_f64(row, 6),
        })
        .collect()
}
