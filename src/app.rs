// The two halves of the tool.
//
// `run_setup` is the one-shot full refresh: schema, CSV, load, verify.
// `DashboardSession` keeps one connection open and serves filtered
// snapshots from a cached full-table read.
use crate::cache::TtlCache;
use crate::config::Config;
use crate::dashboard::{DashboardSnapshot, FilterOptions, Filters};
use crate::error::Result;
use crate::loader::{load_and_clean, LoadReport};
use crate::output::render_dashboard;
use crate::query::fetch_content;
use crate::schema;
use crate::store;
use crate::types::{ContentRow, VerificationStats};
use chrono::Local;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct SetupSummary {
    pub load_report: LoadReport,
    pub loaded: usize,
    pub stats: VerificationStats,
}

/// Recreate the `content` table and fill it from the configured CSV.
///
/// Destructive by contract: existing rows are gone once the schema step
/// runs, even if the CSV later turns out to be missing or malformed.
pub fn run_setup(cfg: &Config) -> Result<SetupSummary> {
    let mut conn = store::connect(&cfg.database_url)?;
    info!("database connection successful");

    schema::recreate(&conn)?;

    let (records, load_report) = load_and_clean(&cfg.csv_path)?;
    let loaded = store::replace_all(&mut conn, &records)?;
    let stats = store::verify(&conn)?;
    info!(
        "verification: {} records, {} categories",
        stats.total_records, stats.unique_categories
    );
    Ok(SetupSummary {
        load_report,
        loaded,
        stats,
    })
}

pub struct DashboardSession {
    conn: Connection,
    cache: TtlCache<Vec<ContentRow>>,
    filters: Filters,
}

impl DashboardSession {
    pub fn open(cfg: &Config) -> Result<Self> {
        let conn = store::connect_existing(&cfg.database_url)?;
        Ok(Self::with_connection(conn, cfg.cache_ttl))
    }

    pub fn with_connection(conn: Connection, ttl: std::time::Duration) -> Self {
        Self {
            conn,
            cache: TtlCache::new(ttl),
            filters: Filters::default(),
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
    }

    /// Drop the cached read so the next access hits the database.
    pub fn refresh(&mut self) {
        info!("manual refresh requested");
        self.cache.invalidate();
    }

    pub fn rows(&mut self) -> Result<&[ContentRow]> {
        let conn = &self.conn;
        let rows = self.cache.get_or_try_load(|| fetch_content(conn))?;
        Ok(rows.as_slice())
    }

    pub fn options(&mut self) -> Result<FilterOptions> {
        Ok(FilterOptions::from_rows(self.rows()?))
    }

    pub fn snapshot(&mut self) -> Result<DashboardSnapshot> {
        let filters = self.filters.clone();
        Ok(DashboardSnapshot::compute(self.rows()?, &filters))
    }

    pub fn render(&mut self) -> Result<String> {
        let snap = self.snapshot()?;
        Ok(render_dashboard(&snap, Local::now(), self.cache.ttl()))
    }
}
