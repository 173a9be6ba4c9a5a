use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Source CSV month headers, in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Storage column for each month, matching `MONTH_NAMES` by index.
pub const MONTH_COLUMNS: [&str; 12] = [
    "jan_traffic", "feb_traffic", "mar_traffic", "apr_traffic", "may_traffic", "jun_traffic",
    "jul_traffic", "aug_traffic", "sep_traffic", "oct_traffic", "nov_traffic", "dec_traffic",
];

/// Headers that must be present in the input file besides the months.
pub const REQUIRED_HEADERS: [&str; 5] = ["Title", "category", "Type", "URL", "Publish date"];

pub const TITLE_MAX_CHARS: usize = 500;
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_CONTENT_TYPE: &str = "unknown";

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "category")]
    pub category: Option<String>,
    #[serde(rename = "Type")]
    pub content_type: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
    #[serde(rename = "Publish date")]
    pub publish_date: Option<String>,
    #[serde(rename = "January")]
    pub january: Option<String>,
    #[serde(rename = "February")]
    pub february: Option<String>,
    #[serde(rename = "March")]
    pub march: Option<String>,
    #[serde(rename = "April")]
    pub april: Option<String>,
    #[serde(rename = "May")]
    pub may: Option<String>,
    #[serde(rename = "June")]
    pub june: Option<String>,
    #[serde(rename = "July")]
    pub july: Option<String>,
    #[serde(rename = "August")]
    pub august: Option<String>,
    #[serde(rename = "September")]
    pub september: Option<String>,
    #[serde(rename = "October")]
    pub october: Option<String>,
    #[serde(rename = "November")]
    pub november: Option<String>,
    #[serde(rename = "December")]
    pub december: Option<String>,
}

impl RawRow {
    /// Monthly cells in calendar order.
    pub fn months(&self) -> [Option<&str>; 12] {
        [
            self.january.as_deref(),
            self.february.as_deref(),
            self.march.as_deref(),
            self.april.as_deref(),
            self.may.as_deref(),
            self.june.as_deref(),
            self.july.as_deref(),
            self.august.as_deref(),
            self.september.as_deref(),
            self.october.as_deref(),
            self.november.as_deref(),
            self.december.as_deref(),
        ]
    }
}

/// A normalized row ready to be written to the `content` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub title: String,
    pub category: String,
    pub content_type: String,
    pub url: String,
    pub publish_date: Option<NaiveDate>,
    pub monthly_traffic: [f64; 12],
    pub total_traffic: f64,
}

/// A row read back from storage, with the read-time derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRow {
    pub title: String,
    pub category: String,
    pub content_type: String,
    pub url: String,
    pub publish_date: Option<NaiveDate>,
    pub total_traffic: f64,
    pub monthly_traffic: [f64; 12],
    pub avg_monthly_traffic: f64,
    pub peak_month: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct VerificationStats {
    pub total_records: i64,
    pub unique_categories: i64,
    pub total_traffic: f64,
    pub avg_traffic: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub total_traffic: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopPerformerRow {
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Type")]
    #[tabled(rename = "Type")]
    pub content_type: String,
    #[serde(rename = "Total Traffic")]
    #[tabled(rename = "Total Traffic")]
    pub total_traffic: String,
    #[serde(rename = "Avg Monthly")]
    #[tabled(rename = "Avg Monthly")]
    pub avg_monthly: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
