use crate::error::Result;
use crate::types::{ContentRow, MONTH_COLUMNS, MONTH_NAMES};
use crate::util::{argmax_first, average};
use log::debug;
use once_cell::sync::Lazy;
use rusqlite::Connection;

static SELECT_CONTENT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT title, category, content_type, url, publish_date, total_traffic, {} \
         FROM content ORDER BY total_traffic DESC, id ASC",
        MONTH_COLUMNS.join(", ")
    )
});

/// Name of the busiest month; January wins when everything is equal.
pub fn peak_month(monthly: &[f64; 12]) -> &'static str {
    MONTH_NAMES[argmax_first(monthly)]
}

/// Read every stored row, busiest first, with per-row derived fields.
pub fn fetch_content(conn: &Connection) -> Result<Vec<ContentRow>> {
    let mut stmt = conn.prepare(SELECT_CONTENT.as_str())?;
    let rows = stmt.query_map([], |row| {
        let mut monthly_traffic = [0.0f64; 12];
        for (idx, slot) in monthly_traffic.iter_mut().enumerate() {
            *slot = row.get::<_, Option<f64>>(6 + idx)?.unwrap_or(0.0);
        }
        Ok(ContentRow {
            title: row.get(0)?,
            category: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            content_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            publish_date: row.get(4)?,
            total_traffic: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
            avg_monthly_traffic: average(&monthly_traffic),
            peak_month: peak_month(&monthly_traffic),
            monthly_traffic,
        })
    })?;
    let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("fetched {} content rows", out.len());
    Ok(out)
}
