//! Cached engine that wraps the analytics views with keyed caching
//!
//! View results are cached by view kind plus the full filter, so repeated
//! dashboard reads with the same criteria skip the aggregation pass.
//! Replacing the snapshot invalidates every entry.

use crate::comparison::{MonthPoint, YearOnYearRow};
use crate::engine::{
    AnalyticsEngine, ClientDimension, DataSnapshot, ExecutiveSummary, LeadDimension,
    SalesDimension, SessionDimension,
};
use crate::filters::FilterOptions;
use crate::metrics::{
    ClientConversionSummary, DiscountSummary, LeadSourceSummary, SalesSummary, SessionSummary,
    TrainerSummary,
};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Identity of one cacheable view invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ViewKey {
    Sales {
        dimension: SalesDimension,
        filter: FilterOptions,
        limit: Option<usize>,
    },
    Discounts {
        dimension: SalesDimension,
        filter: FilterOptions,
        limit: Option<usize>,
    },
    Leads {
        dimension: LeadDimension,
        filter: FilterOptions,
        limit: Option<usize>,
    },
    Clients {
        dimension: ClientDimension,
        filter: FilterOptions,
        limit: Option<usize>,
    },
    Sessions {
        dimension: SessionDimension,
        filter: FilterOptions,
        limit: Option<usize>,
    },
    Trainers {
        filter: FilterOptions,
        limit: Option<usize>,
    },
    MonthlyRevenue {
        filter: FilterOptions,
    },
    YearlyRevenue {
        filter: FilterOptions,
    },
    Executive {
        filter: FilterOptions,
    },
}

/// Cached result payload, one variant per view shape
#[derive(Debug, Clone)]
enum CachedView {
    Sales(Vec<(String, SalesSummary)>),
    Discounts(Vec<(String, DiscountSummary)>),
    Leads(Vec<(String, LeadSourceSummary)>),
    Clients(Vec<(String, ClientConversionSummary)>),
    Sessions(Vec<(String, SessionSummary)>),
    Trainers(Vec<(String, TrainerSummary)>),
    MonthSeries(Vec<MonthPoint>),
    YearTable(Vec<YearOnYearRow>),
    Executive(ExecutiveSummary),
}

/// Cache sizing and expiry settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub time_to_live: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            time_to_live: Duration::from_secs(300),
        }
    }
}

/// Analytics engine with transparent per-view caching
pub struct CachedAnalyticsEngine {
    engine: AnalyticsEngine,
    cache: Cache<ViewKey, Arc<CachedView>>,
    cache_enabled: bool,
}

impl CachedAnalyticsEngine {
    pub fn new(snapshot: DataSnapshot, config: CacheConfig) -> Self {
        Self {
            engine: AnalyticsEngine::new(snapshot),
            cache: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.time_to_live)
                .build(),
            cache_enabled: true,
        }
    }

    /// Create with default cache settings
    pub fn with_defaults(snapshot: DataSnapshot) -> Self {
        Self::new(snapshot, CacheConfig::default())
    }

    /// Create in pass-through mode
    pub fn without_cache(snapshot: DataSnapshot) -> Self {
        let mut cached = Self::with_defaults(snapshot);
        cached.cache_enabled = false;
        cached
    }

    pub fn engine(&self) -> &AnalyticsEngine {
        &self.engine
    }

    /// Swap in a fresh snapshot and drop every cached view
    pub fn replace_snapshot(&mut self, snapshot: DataSnapshot) {
        info!("Replacing analytics snapshot, invalidating view cache");
        self.engine = AnalyticsEngine::new(snapshot);
        self.cache.invalidate_all();
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn lookup<F>(&self, key: ViewKey, compute: F) -> Arc<CachedView>
    where
        F: FnOnce() -> CachedView,
    {
        if !self.cache_enabled {
            return Arc::new(compute());
        }
        if let Some(cached) = self.cache.get(&key) {
            debug!("View cache hit for {:?}", key);
            return cached;
        }
        debug!("View cache miss for {:?}", key);
        let computed = Arc::new(compute());
        self.cache.insert(key, Arc::clone(&computed));
        computed
    }

    pub fn sales_by(
        &self,
        dimension: SalesDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, SalesSummary)> {
        let key = ViewKey::Sales {
            dimension,
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Sales(self.engine.sales_by(dimension, filter, limit))
        });
        match cached.as_ref() {
            CachedView::Sales(view) => view.clone(),
            _ => self.engine.sales_by(dimension, filter, limit),
        }
    }

    pub fn discounts_by(
        &self,
        dimension: SalesDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, DiscountSummary)> {
        let key = ViewKey::Discounts {
            dimension,
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Discounts(self.engine.discounts_by(dimension, filter, limit))
        });
        match cached.as_ref() {
            CachedView::Discounts(view) => view.clone(),
            _ => self.engine.discounts_by(dimension, filter, limit),
        }
    }

    pub fn leads_by(
        &self,
        dimension: LeadDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, LeadSourceSummary)> {
        let key = ViewKey::Leads {
            dimension,
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Leads(self.engine.leads_by(dimension, filter, limit))
        });
        match cached.as_ref() {
            CachedView::Leads(view) => view.clone(),
            _ => self.engine.leads_by(dimension, filter, limit),
        }
    }

    pub fn clients_by(
        &self,
        dimension: ClientDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, ClientConversionSummary)> {
        let key = ViewKey::Clients {
            dimension,
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Clients(self.engine.clients_by(dimension, filter, limit))
        });
        match cached.as_ref() {
            CachedView::Clients(view) => view.clone(),
            _ => self.engine.clients_by(dimension, filter, limit),
        }
    }

    pub fn sessions_by(
        &self,
        dimension: SessionDimension,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, SessionSummary)> {
        let key = ViewKey::Sessions {
            dimension,
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Sessions(self.engine.sessions_by(dimension, filter, limit))
        });
        match cached.as_ref() {
            CachedView::Sessions(view) => view.clone(),
            _ => self.engine.sessions_by(dimension, filter, limit),
        }
    }

    pub fn trainer_performance(
        &self,
        filter: &FilterOptions,
        limit: Option<usize>,
    ) -> Vec<(String, TrainerSummary)> {
        let key = ViewKey::Trainers {
            filter: filter.clone(),
            limit,
        };
        let cached = self.lookup(key, || {
            CachedView::Trainers(self.engine.trainer_performance(filter, limit))
        });
        match cached.as_ref() {
            CachedView::Trainers(view) => view.clone(),
            _ => self.engine.trainer_performance(filter, limit),
        }
    }

    pub fn monthly_revenue(&self, filter: &FilterOptions) -> Vec<MonthPoint> {
        let key = ViewKey::MonthlyRevenue {
            filter: filter.clone(),
        };
        let cached = self.lookup(key, || {
            CachedView::MonthSeries(self.engine.monthly_revenue(filter))
        });
        match cached.as_ref() {
            CachedView::MonthSeries(view) => view.clone(),
            _ => self.engine.monthly_revenue(filter),
        }
    }

    pub fn yearly_revenue(&self, filter: &FilterOptions) -> Vec<YearOnYearRow> {
        let key = ViewKey::YearlyRevenue {
            filter: filter.clone(),
        };
        let cached = self.lookup(key, || {
            CachedView::YearTable(self.engine.yearly_revenue(filter))
        });
        match cached.as_ref() {
            CachedView::YearTable(view) => view.clone(),
            _ => self.engine.yearly_revenue(filter),
        }
    }

    pub fn executive_summary(&self, filter: &FilterOptions) -> ExecutiveSummary {
        let key = ViewKey::Executive {
            filter: filter.clone(),
        };
        let cached = self.lookup(key, || {
            CachedView::Executive(self.engine.executive_summary(filter))
        });
        match cached.as_ref() {
            CachedView::Executive(view) => view.clone(),
            _ => self.engine.executive_summary(filter),
        }
    }
}
