//! End-to-end tests over a realistic mixed snapshot

use pulse_analytics::{
    AnalyticsEngine, CachedAnalyticsEngine, ClientDimension, DataSnapshot, DateRange,
    FilterOptions, GrowthDirection, LeadDimension, SalesDimension, SessionDimension, UNKNOWN_GROUP,
};
use pulse_common::{ClientRecord, LeadRecord, SessionRecord, TransactionRecord};

fn transaction(
    member: &str,
    location: &str,
    product: &str,
    date: &str,
    value: f64,
    discount: f64,
) -> TransactionRecord {
    TransactionRecord {
        member_id: member.to_string(),
        location: location.to_string(),
        product: product.to_string(),
        category: "Membership".to_string(),
        payment_date: date.to_string(),
        payment_value: value,
        discount_amount: discount,
        mrp_post_tax: value + discount,
        ..Default::default()
    }
}

fn studio_snapshot() -> DataSnapshot {
    DataSnapshot {
        transactions: vec![
            transaction("M1", "Bandra", "Unlimited", "05/01/2023", 1000.0, 0.0),
            transaction("M2", "Bandra", "Unlimited", "12/01/2024", 900.0, 100.0),
            transaction("M1", "Bandra", "Single Class", "20/02/2024", 300.0, 0.0),
            transaction("M3", "Juhu", "Unlimited", "07/02/2024", 800.0, 0.0),
            // Blank location and a date cell that never parses
            transaction("M4", "", "Single Class", "pending", 250.0, 50.0),
        ],
        clients: vec![
            ClientRecord {
                member_id: "M1".to_string(),
                first_visit_location: "Bandra".to_string(),
                first_visit_date: "03/01/2024".to_string(),
                is_new: "Yes".to_string(),
                conversion_status: "Converted".to_string(),
                retention_status: "Retained".to_string(),
                conversion_span: 14.0,
                ltv: 4000.0,
                ..Default::default()
            },
            ClientRecord {
                member_id: "M5".to_string(),
                first_visit_location: "Juhu".to_string(),
                first_visit_date: "09/01/2024".to_string(),
                is_new: "Yes".to_string(),
                conversion_status: "Not Converted".to_string(),
                retention_status: "Not Retained".to_string(),
                ..Default::default()
            },
        ],
        leads: vec![
            LeadRecord {
                source: "Website".to_string(),
                created_at: "02/01/2024".to_string(),
                conversion_status: "Converted".to_string(),
                ltv: 3000.0,
                ..Default::default()
            },
            LeadRecord {
                source: "Website".to_string(),
                created_at: "15/02/2024".to_string(),
                conversion_status: "Lost".to_string(),
                ..Default::default()
            },
            LeadRecord {
                source: "Walk-in".to_string(),
                created_at: "20/02/2024".to_string(),
                conversion_status: "Trial Scheduled".to_string(),
                ..Default::default()
            },
        ],
        sessions: vec![
            SessionRecord {
                session_date: "08/01/2024".to_string(),
                location: "Bandra".to_string(),
                class_type: "Cycle".to_string(),
                checked_in: 18,
                capacity: 20,
                revenue: 9000.0,
                ..Default::default()
            },
            SessionRecord {
                session_date: "09/01/2024".to_string(),
                location: "Bandra".to_string(),
                class_type: "Barre".to_string(),
                checked_in: 0,
                capacity: 0,
                revenue: 0.0,
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

#[test]
fn sales_groups_partition_all_transactions() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let view = engine.sales_by(SalesDimension::Location, &FilterOptions::all(), None);

    let grouped_total: usize = view.iter().map(|(_, summary)| summary.transactions).sum();
    assert_eq!(grouped_total, 5);

    let grouped_revenue: f64 = view.iter().map(|(_, summary)| summary.total_revenue).sum();
    assert_eq!(grouped_revenue, 3250.0);

    assert!(view.iter().any(|(key, _)| key == UNKNOWN_GROUP));
}

#[test]
fn unique_members_count_distinct_ids_per_group() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let view = engine.sales_by(SalesDimension::Location, &FilterOptions::all(), None);

    let bandra = view
        .iter()
        .find(|(key, _)| key == "Bandra")
        .map(|(_, summary)| summary)
        .unwrap();
    // M1 appears twice in Bandra
    assert_eq!(bandra.transactions, 3);
    assert_eq!(bandra.unique_members, 2);
}

#[test]
fn zero_denominators_surface_as_zero_rates() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let filter = FilterOptions::all();

    let sessions = engine.sessions_by(SessionDimension::ClassType, &filter, None);
    let barre = sessions
        .iter()
        .find(|(key, _)| key == "Barre")
        .map(|(_, summary)| summary)
        .unwrap();
    assert_eq!(barre.fill_rate, 0.0);

    let clients = engine.clients_by(ClientDimension::Location, &filter, None);
    let juhu = clients
        .iter()
        .find(|(key, _)| key == "Juhu")
        .map(|(_, summary)| summary)
        .unwrap();
    assert_eq!(juhu.conversion_rate, 0.0);
    assert_eq!(juhu.average_conversion_span, 0.0);
}

#[test]
fn monthly_revenue_series_is_chronological_and_skips_bad_dates() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let series = engine.monthly_revenue(&FilterOptions::all());

    let months: Vec<&str> = series.iter().map(|point| point.month.as_str()).collect();
    assert_eq!(months, vec!["2023-01", "2024-01", "2024-02"]);

    // The "pending" transaction is absent from every month
    let series_total: f64 = series.iter().map(|point| point.value).sum();
    assert_eq!(series_total, 3000.0);
}

#[test]
fn yearly_revenue_compares_against_prior_year() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let rows = engine.yearly_revenue(&FilterOptions::all());

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, "2024");
    assert_eq!(rows[0].value, 2000.0);
    let delta = rows[0].delta.unwrap();
    assert_eq!(delta.difference, 1000.0);
    assert_eq!(delta.growth_rate, 100.0);
    assert_eq!(delta.direction, GrowthDirection::Positive);
    assert!(rows[1].delta.is_none());
}

#[test]
fn year_table_is_empty_without_a_baseline_year() {
    let single_year = DataSnapshot {
        transactions: vec![transaction(
            "M1", "Bandra", "Unlimited", "05/01/2024", 1000.0, 0.0,
        )],
        ..Default::default()
    };
    let engine = AnalyticsEngine::new(single_year);
    assert!(engine.yearly_revenue(&FilterOptions::all()).is_empty());
}

#[test]
fn date_filter_is_day_first() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    // January 2024 only; "12/01/2024" must read as 12 January
    let filter = FilterOptions::all().with_date_range(DateRange::new(
        chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        chrono::NaiveDate::from_ymd_opt(2024, 1, 31),
    ));

    let view = engine.sales_by(SalesDimension::Location, &filter, None);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].0, "Bandra");
    assert_eq!(view[0].1.total_revenue, 900.0);
}

#[test]
fn lead_views_rank_by_volume_with_limit() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let view = engine.leads_by(LeadDimension::Source, &FilterOptions::all(), Some(1));

    assert_eq!(view.len(), 1);
    assert_eq!(view[0].0, "Website");
    assert_eq!(view[0].1.total_leads, 2);
    assert_eq!(view[0].1.conversion_rate, 50.0);
}

#[test]
fn views_are_idempotent_over_the_same_snapshot() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let filter = FilterOptions::all();

    let first = engine.sales_by(SalesDimension::Product, &filter, None);
    let second = engine.sales_by(SalesDimension::Product, &filter, None);
    assert_eq!(first, second);

    let first_summary = engine.executive_summary(&filter);
    let second_summary = engine.executive_summary(&filter);
    assert_eq!(first_summary, second_summary);
}

#[test]
fn executive_summary_spans_all_domains() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let summary = engine.executive_summary(&FilterOptions::all());

    assert_eq!(summary.sales.transactions, 5);
    assert_eq!(summary.clients.total_clients, 2);
    assert_eq!(summary.clients.retention_rate, 50.0);
    assert_eq!(summary.leads.total_leads, 3);
    assert_eq!(summary.sessions.total_sessions, 2);
    assert_eq!(summary.sessions.fill_rate, 90.0);
}

#[test]
fn discount_views_cover_products_and_months() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let filter = FilterOptions::all();

    let by_product = engine.discounts_by(SalesDimension::Product, &filter, None);
    let unlimited = by_product
        .iter()
        .find(|(key, _)| key == "Unlimited")
        .map(|(_, summary)| summary)
        .unwrap();
    assert_eq!(unlimited.discounted_transactions, 1);
    assert_eq!(unlimited.total_discount, 100.0);
    assert_eq!(unlimited.average_discount, 100.0);

    let monthly = engine.monthly_discounts(&filter);
    // Only parseable payment dates appear in the series
    let total: f64 = monthly.iter().map(|point| point.value).sum();
    assert_eq!(total, 100.0);
}

#[test]
fn lead_highlight_helpers_pick_peak_and_best() {
    let engine = AnalyticsEngine::new(studio_snapshot());
    let filter = FilterOptions::all();

    let peak = engine.peak_lead_month(&filter).unwrap();
    assert_eq!(peak.month, "2024-02");
    assert_eq!(peak.value, 2.0);

    let (top_source, top_summary) = engine.top_lead_source(&filter).unwrap();
    assert_eq!(top_source, "Website");
    assert_eq!(top_summary.total_leads, 2);

    let (best_source, best_summary) = engine.best_converting_source(&filter).unwrap();
    assert_eq!(best_source, "Website");
    assert_eq!(best_summary.conversion_rate, 50.0);
}

#[test]
fn cached_engine_matches_uncached_results() {
    let snapshot = studio_snapshot();
    let engine = AnalyticsEngine::new(snapshot.clone());
    let cached = CachedAnalyticsEngine::with_defaults(snapshot);
    let filter = FilterOptions::all();

    assert_eq!(
        engine.sales_by(SalesDimension::Location, &filter, None),
        cached.sales_by(SalesDimension::Location, &filter, None)
    );
    assert_eq!(
        engine.monthly_revenue(&filter),
        cached.monthly_revenue(&filter)
    );
    // Second read served from cache must still agree
    assert_eq!(
        engine.monthly_revenue(&filter),
        cached.monthly_revenue(&filter)
    );
}
