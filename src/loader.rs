use crate::error::{Error, Result};
use crate::types::{
    ContentRecord, RawRow, DEFAULT_CATEGORY, DEFAULT_CONTENT_TYPE, MONTH_NAMES, REQUIRED_HEADERS,
    TITLE_MAX_CHARS,
};
use crate::util::{non_blank, parse_date_safe, parse_traffic, truncate_chars};
use csv::ReaderBuilder;
use log::{debug, info};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub columns: usize,
    pub kept_rows: usize,
    pub missing_title: usize,
    pub unparsed_dates: usize,
}

/// Read the traffic CSV at `path` and normalize it into storage records.
///
/// Rows without a title are dropped. Any cell that cannot be coerced fails
/// the whole batch so nothing is loaded from a half-understood file.
pub fn load_and_clean(path: &Path) -> Result<(Vec<ContentRecord>, LoadReport)> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| Error::Processing(e.to_string()))?;

    let headers = rdr
        .headers()
        .map_err(|e| Error::Processing(e.to_string()))?
        .clone();
    for required in REQUIRED_HEADERS.iter().chain(MONTH_NAMES.iter()) {
        if !headers.iter().any(|h| h == *required) {
            return Err(Error::Processing(format!("missing column '{}'", required)));
        }
    }

    let mut report = LoadReport {
        columns: headers.len(),
        ..LoadReport::default()
    };
    let mut records: Vec<ContentRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        // Header is line 1, so data row N sits on line N + 1.
        let line = report.total_rows + 1;
        let row = result.map_err(|e| Error::Processing(format!("line {}: {}", line, e)))?;

        let Some(title) = non_blank(row.title.as_deref()) else {
            report.missing_title += 1;
            continue;
        };

        let mut monthly_traffic = [0.0f64; 12];
        for (idx, cell) in row.months().into_iter().enumerate() {
            monthly_traffic[idx] = parse_traffic(cell).map_err(|e| {
                Error::Processing(format!("line {}, column {}: {}", line, MONTH_NAMES[idx], e))
            })?;
        }
        let total_traffic: f64 = monthly_traffic.iter().sum();

        let publish_date = parse_date_safe(row.publish_date.as_deref());
        if publish_date.is_none() && non_blank(row.publish_date.as_deref()).is_some() {
            report.unparsed_dates += 1;
            debug!("line {}: unparsable publish date {:?}", line, row.publish_date);
        }

        records.push(ContentRecord {
            title: truncate_chars(title, TITLE_MAX_CHARS),
            category: text_or(row.category, DEFAULT_CATEGORY),
            content_type: text_or(row.content_type, DEFAULT_CONTENT_TYPE),
            url: text_or(row.url, ""),
            publish_date,
            monthly_traffic,
            total_traffic,
        });
    }

    report.kept_rows = records.len();
    info!(
        "normalized {} of {} rows from {}",
        report.kept_rows,
        report.total_rows,
        path.display()
    );
    Ok((records, report))
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if non_blank(Some(v.as_str())).is_some() => v,
        _ => fallback.to_string(),
    }
}
