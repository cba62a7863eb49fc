//! Domain record schema for the studio analytics snapshot
//!
//! Every numeric field defaults to 0 when the upstream cell is missing or
//! malformed, so the aggregation layer can assume fully populated records.
//! Rate fields on payroll rows arrive either as numbers or as `"57%"`
//! strings and are normalized to plain numbers here, at the ingestion
//! boundary.

use serde::{Deserialize, Deserializer, Serialize};

/// One sales transaction row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionRecord {
    pub member_id: String,
    pub customer_name: String,
    pub payment_date: String,
    pub payment_value: f64,
    pub payment_vat: f64,
    pub payment_method: String,
    pub product: String,
    pub category: String,
    pub location: String,
    pub sold_by: String,
    pub mrp_post_tax: f64,
    pub discount_amount: f64,
    pub discount_percentage: f64,
}

/// One new-client / conversion-funnel row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientRecord {
    pub member_id: String,
    pub first_visit_date: String,
    pub first_visit_location: String,
    pub home_location: String,
    pub trainer_name: String,
    pub payment_method: String,
    /// "Yes" marks a genuinely new client
    pub is_new: String,
    pub visits_post_trial: u32,
    pub purchase_count_post_trial: u32,
    pub ltv: f64,
    /// "Converted" or anything else
    pub conversion_status: String,
    /// "Retained" or anything else
    pub retention_status: String,
    /// Days from first visit to conversion; 0 means unset
    pub conversion_span: f64,
}

/// One lead-funnel row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadRecord {
    pub source: String,
    pub stage: String,
    pub associate: String,
    pub created_at: String,
    pub conversion_status: String,
    pub ltv: f64,
}

/// One trainer payroll row, keyed by trainer and `Mon-YYYY` month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainerRecord {
    pub teacher_name: String,
    pub location: String,
    /// Month label in `Mon-YYYY` form, e.g. "Jan-2024"
    pub month_year: String,
    pub total_sessions: u32,
    pub total_customers: u32,
    pub total_paid: f64,
    pub total_empty_sessions: u32,
    pub total_non_empty_sessions: u32,
    pub cycle_sessions: u32,
    pub barre_sessions: u32,
    pub cycle_paid: f64,
    pub barre_paid: f64,
    pub class_average_incl_empty: f64,
    pub class_average_excl_empty: f64,
    /// Retention rate, accepts `57.5` or `"57.5%"`
    #[serde(deserialize_with = "deserialize_rate")]
    pub retention: f64,
    /// Conversion rate, accepts `57.5` or `"57.5%"`
    #[serde(deserialize_with = "deserialize_rate")]
    pub conversion: f64,
    #[serde(rename = "new")]
    pub new_members: u32,
    pub retained: u32,
    pub converted: u32,
}

/// One class-session row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_date: String,
    pub location: String,
    pub trainer_name: String,
    pub class_type: String,
    pub checked_in: u32,
    pub capacity: u32,
    pub revenue: f64,
}

/// Parse a rate value that may be a number, a numeric string, or an
/// `"NN%"` string. Anything unparseable becomes 0.
pub fn parse_rate(raw: &str) -> f64 {
    let cleaned = raw.trim().trim_end_matches('%');
    cleaned.parse::<f64>().unwrap_or(0.0)
}

fn deserialize_rate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RateValue {
        Number(f64),
        Text(String),
        Missing(Option<()>),
    }

    Ok(match RateValue::deserialize(deserializer)? {
        RateValue::Number(n) if n.is_finite() => n,
        RateValue::Number(_) => 0.0,
        RateValue::Text(s) => parse_rate(&s),
        RateValue::Missing(_) => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_numeric_fields_default_to_zero() {
        let record: TransactionRecord =
            serde_json::from_str(r#"{"memberId": "M1", "product": "Studio Pack"}"#).unwrap();
        assert_eq!(record.member_id, "M1");
        assert_eq!(record.payment_value, 0.0);
        assert_eq!(record.payment_vat, 0.0);
        assert_eq!(record.discount_amount, 0.0);
    }

    #[test]
    fn test_parse_rate_variants() {
        assert_eq!(parse_rate("57.5%"), 57.5);
        assert_eq!(parse_rate("57.5"), 57.5);
        assert_eq!(parse_rate(" 12% "), 12.0);
        assert_eq!(parse_rate("n/a"), 0.0);
        assert_eq!(parse_rate(""), 0.0);
    }

    #[test]
    fn test_trainer_rate_accepts_string_and_number() {
        let with_string: TrainerRecord = serde_json::from_str(
            r#"{"teacherName": "Anita", "retention": "62%", "conversion": 41.5}"#,
        )
        .unwrap();
        assert_eq!(with_string.retention, 62.0);
        assert_eq!(with_string.conversion, 41.5);

        let with_null: TrainerRecord =
            serde_json::from_str(r#"{"teacherName": "Anita", "retention": null}"#).unwrap();
        assert_eq!(with_null.retention, 0.0);
    }

    #[test]
    fn test_client_record_defaults() {
        let record: ClientRecord = serde_json::from_str(r#"{"memberId": "M2"}"#).unwrap();
        assert_eq!(record.visits_post_trial, 0);
        assert_eq!(record.ltv, 0.0);
        assert_eq!(record.conversion_status, "");
        assert_eq!(record.conversion_span, 0.0);
    }
}
