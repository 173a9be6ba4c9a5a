use crate::types::{ContentRow, GroupTotal, HistogramBin, TopPerformerRow, MONTH_NAMES};
use crate::util::{argmax_first, format_number};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

pub const ALL: &str = "All";
pub const TOP_CATEGORIES: usize = 10;
pub const TOP_PERFORMERS: usize = 20;
pub const HISTOGRAM_BINS: usize = 20;

/// Exact-match selection; `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub category: Option<String>,
    pub content_type: Option<String>,
}

impl Filters {
    /// Build from selector values, where `"All"` (or nothing) disables a filter.
    pub fn from_selection(category: Option<&str>, content_type: Option<&str>) -> Self {
        let pick = |v: Option<&str>| v.filter(|s| *s != ALL).map(str::to_string);
        Self {
            category: pick(category),
            content_type: pick(content_type),
        }
    }

    pub fn matches(&self, row: &ContentRow) -> bool {
        self.category.as_deref().map_or(true, |c| row.category == c)
            && self
                .content_type
                .as_deref()
                .map_or(true, |t| row.content_type == t)
    }

    pub fn apply<'a>(&self, rows: &'a [ContentRow]) -> Vec<&'a ContentRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Selector choices, always led by `"All"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub content_types: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[ContentRow]) -> Self {
        let with_all = |set: BTreeSet<&str>| -> Vec<String> {
            std::iter::once(ALL.to_string())
                .chain(set.into_iter().map(str::to_string))
                .collect()
        };
        Self {
            categories: with_all(rows.iter().map(|r| r.category.as_str()).collect()),
            content_types: with_all(rows.iter().map(|r| r.content_type.as_str()).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPerformer {
    pub title: String,
    pub category: String,
    pub total_traffic: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PeakMonth {
    pub month: &'static str,
    pub total_traffic: f64,
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub total_content: usize,
    pub available_content: usize,
    pub total_traffic: f64,
    pub avg_traffic: Option<f64>,
    pub unique_categories: usize,
    pub category_totals: Vec<GroupTotal>,
    pub type_totals: Vec<GroupTotal>,
    pub monthly_totals: [f64; 12],
    pub histogram: Vec<HistogramBin>,
    pub top_performer: Option<TopPerformer>,
    pub peak_month: Option<PeakMonth>,
    #[serde(skip)]
    pub top_rows: Vec<TopPerformerRow>,
}

impl DashboardSnapshot {
    /// Aggregate `rows` (already sorted busiest first) under `filters`.
    pub fn compute(rows: &[ContentRow], filters: &Filters) -> Self {
        let filtered = filters.apply(rows);

        let total_traffic: f64 = filtered.iter().map(|r| r.total_traffic).sum();
        let avg_traffic = if filtered.is_empty() {
            None
        } else {
            Some(total_traffic / filtered.len() as f64)
        };
        let unique_categories = filtered
            .iter()
            .map(|r| r.category.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut category_totals = group_totals(&filtered, |r| &r.category, total_traffic);
        category_totals.truncate(TOP_CATEGORIES);
        let type_totals = group_totals(&filtered, |r| &r.content_type, total_traffic);

        let mut monthly_totals = [0.0f64; 12];
        for r in &filtered {
            for (slot, v) in monthly_totals.iter_mut().zip(r.monthly_traffic.iter()) {
                *slot += v;
            }
        }

        let top_performer = filtered.first().map(|r| TopPerformer {
            title: r.title.clone(),
            category: r.category.clone(),
            total_traffic: r.total_traffic,
        });
        let peak_month = if filtered.is_empty() {
            None
        } else {
            let idx = argmax_first(&monthly_totals);
            Some(PeakMonth {
                month: MONTH_NAMES[idx],
                total_traffic: monthly_totals[idx],
            })
        };

        let top_rows = filtered
            .iter()
            .take(TOP_PERFORMERS)
            .map(|r| TopPerformerRow {
                title: r.title.clone(),
                category: r.category.clone(),
                content_type: r.content_type.clone(),
                total_traffic: format_number(r.total_traffic, 0),
                avg_monthly: format_number(r.avg_monthly_traffic, 0),
            })
            .collect();

        let values: Vec<f64> = filtered.iter().map(|r| r.total_traffic).collect();

        Self {
            total_content: filtered.len(),
            available_content: rows.len(),
            total_traffic,
            avg_traffic,
            unique_categories,
            category_totals,
            type_totals,
            monthly_totals,
            histogram: histogram(&values, HISTOGRAM_BINS),
            top_performer,
            peak_month,
            top_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_content == 0
    }
}

/// Sum traffic per label, largest first; ties keep label order.
fn group_totals<'a, F>(rows: &[&'a ContentRow], key: F, grand_total: f64) -> Vec<GroupTotal>
where
    F: Fn(&'a ContentRow) -> &'a String,
{
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for r in rows {
        *sums.entry(key(*r).as_str()).or_insert(0.0) += r.total_traffic;
    }
    let mut out: Vec<GroupTotal> = sums
        .into_iter()
        .map(|(label, total)| GroupTotal {
            label: label.to_string(),
            total_traffic: total,
            share_pct: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_traffic
            .partial_cmp(&a.total_traffic)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

/// Equal-width histogram over `[min, max]`; the top edge is inclusive.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0 / bins as f64
    };
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
