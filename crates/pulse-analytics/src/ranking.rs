//! Ranking of aggregated groups

use tracing::debug;

/// Sort descending by a metric, keeping input order on ties, then
/// optionally keep only the first `limit` entries
///
/// Non-finite metric values compare as equal, so NaN never reorders the
/// rest of the list.
pub fn rank_desc<T, F>(mut items: Vec<T>, metric: F, limit: Option<usize>) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| {
        metric(b)
            .partial_cmp(&metric(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(limit) = limit {
        debug!("Truncating ranking to top {}", limit);
        items.truncate(limit);
    }
    items
}
