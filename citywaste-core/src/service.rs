//! Throttled fetcher that aggregates every page into one published snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use chrono::Local;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::model::{DateRange, DischargeRecord, FirstPage, QueryIdentity, Snapshot};
use crate::ports::{DischargePort, FetchError};

/// Minimum time between two fetch cycles.
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(30 * 60);

/// Owns the household query, the latest snapshot, and the availability flag.
pub struct CityWasteData {
    port: Arc<dyn DischargePort>,
    query: QueryIdentity,
    min_interval: Duration,
    // Held for the whole cycle so overlapping callers queue up behind it.
    last_run: Mutex<Option<Instant>>,
    snapshot: ArcSwapOption<Snapshot>,
    available: AtomicBool,
}

impl CityWasteData {
    /// Create a fetcher for `query`, throttled to [`MIN_TIME_BETWEEN_UPDATES`].
    #[must_use]
    pub fn new(port: Arc<dyn DischargePort>, query: QueryIdentity) -> Self {
        Self {
            port,
            query,
            min_interval: MIN_TIME_BETWEEN_UPDATES,
            last_run: Mutex::new(None),
            snapshot: ArcSwapOption::empty(),
            available: AtomicBool::new(false),
        }
    }

    /// Override the throttle window.
    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Household this fetcher queries for.
    #[must_use]
    pub fn query(&self) -> &QueryIdentity {
        &self.query
    }

    /// Latest successfully aggregated snapshot, if any cycle has succeeded yet.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.load_full()
    }

    /// Whether the last fetch cycle succeeded.
    #[must_use]
    pub fn available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Run one fetch cycle unless the previous one started within the throttle window.
    ///
    /// Failures are logged and leave the previous snapshot in place with the
    /// availability flag cleared.
    pub async fn update(&self) {
        let mut last_run = self.last_run.lock().await;
        let now = Instant::now();
        if let Some(previous) = *last_run
            && now.duration_since(previous) < self.min_interval
        {
            debug!(
                elapsed = ?now.duration_since(previous),
                "update throttled, keeping current snapshot"
            );
            return;
        }
        *last_run = Some(now);

        let range = DateRange::month_to_date(Local::now().date_naive());
        match self.fetch(range).await {
            Ok(snapshot) => {
                info!(
                    total_kg = snapshot.total_kg,
                    total_count = snapshot.total_count,
                    last_kg = ?snapshot.last_kg,
                    "discharge data updated"
                );
                self.snapshot.store(Some(Arc::new(snapshot)));
                self.available.store(true, Ordering::Release);
            }
            Err(err) => {
                error!(error = %err, tag = %self.query.tag_code, "discharge update failed");
                self.available.store(false, Ordering::Release);
            }
        }
    }

    async fn fetch(&self, range: DateRange) -> Result<Snapshot, FetchError> {
        let first = self.port.first_page(&self.query, range).await?;
        // Every page holds at least one record, so more pages than records is bogus.
        if i64::from(first.total_pages) > first.total_count.max(1) {
            return Err(FetchError::PageCount {
                total_pages: first.total_pages,
                total_count: first.total_count,
            });
        }
        let mut tally = Tally::from_first_page(first);

        for index in 2..=tally.total_pages {
            let records = self.port.page(&self.query, range, index).await?;
            tally.add_records(&records);
        }

        Ok(tally.into_snapshot())
    }
}

/// Running aggregate over the pages of one cycle.
#[derive(Debug)]
struct Tally {
    total_count: i64,
    total_pages: u32,
    address: String,
    last: Option<DischargeRecord>,
    total_kg: f64,
}

impl Tally {
    fn from_first_page(page: FirstPage) -> Self {
        let mut tally = Self {
            total_count: page.total_count,
            total_pages: page.total_pages,
            address: page.address,
            last: page.records.first().cloned(),
            total_kg: 0.0,
        };
        tally.add_records(&page.records);
        tally
    }

    fn add_records(&mut self, records: &[DischargeRecord]) {
        self.total_kg += records.iter().map(|record| record.kg).sum::<f64>();
    }

    fn into_snapshot(self) -> Snapshot {
        let (last_kg, last_date) = match self.last {
            Some(record) => (Some(record.kg), Some(record.date)),
            None => (None, None),
        };

        Snapshot {
            total_count: self.total_count,
            last_kg,
            last_date,
            total_kg: self.total_kg,
            address: self.address,
        }
    }
}
