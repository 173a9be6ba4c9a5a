use crate::dashboard::DashboardSnapshot;
use crate::error::Result;
use crate::types::{GroupTotal, MetricRow, VerificationStats, MONTH_SHORT};
use crate::util::{format_int, format_number, truncate_chars};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 40;
const INSIGHT_TITLE_CHARS: usize = 50;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn table_rows<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    format!("{}\n", table_str)
}

pub fn verification_summary(stats: &VerificationStats) -> String {
    let mut out = String::from("DATA VERIFICATION:\n");
    let _ = writeln!(out, "   Total records: {}", format_int(stats.total_records));
    let _ = writeln!(out, "   Unique categories: {}", stats.unique_categories);
    let _ = writeln!(out, "   Total traffic: {}", format_number(stats.total_traffic, 0));
    let _ = writeln!(out, "   Average traffic: {}", format_number(stats.avg_traffic, 0));
    out
}

/// Horizontal bar scaled against `max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.clamp(1, BAR_WIDTH))
}

fn bar_chart(out: &mut String, labelled: &[(String, f64, String)]) {
    let label_width = labelled.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);
    let max = labelled.iter().map(|(_, v, _)| *v).fold(0.0, f64::max);
    for (label, value, note) in labelled {
        let _ = writeln!(
            out,
            "  {:<width$} | {} {}",
            label,
            bar(*value, max),
            note,
            width = label_width
        );
    }
}

fn group_chart(out: &mut String, groups: &[GroupTotal], with_share: bool) {
    let labelled: Vec<(String, f64, String)> = groups
        .iter()
        .map(|g| {
            let note = if with_share {
                format!("{} ({}%)", format_number(g.total_traffic, 0), format_number(g.share_pct, 1))
            } else {
                format_number(g.total_traffic, 0)
            };
            (g.label.clone(), g.total_traffic, note)
        })
        .collect();
    bar_chart(out, &labelled);
}

/// Render the full dashboard for one snapshot as terminal text.
pub fn render_dashboard(
    snap: &DashboardSnapshot,
    refreshed_at: DateTime<Local>,
    auto_refresh: Duration,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Traffic Analytics Dashboard");
    let _ = writeln!(
        out,
        "Showing {} of {} content pieces\n",
        format_int(snap.total_content),
        format_int(snap.available_content)
    );

    if snap.is_empty() {
        let _ = writeln!(out, "No data available.\n");
    } else {
        let _ = writeln!(out, "Key Performance Metrics\n");
        let metrics = vec![
            MetricRow {
                metric: "Total Content".into(),
                value: format_int(snap.total_content),
            },
            MetricRow {
                metric: "Total Traffic".into(),
                value: format_number(snap.total_traffic, 0),
            },
            MetricRow {
                metric: "Average Traffic".into(),
                value: format_number(snap.avg_traffic.unwrap_or(0.0), 0),
            },
            MetricRow {
                metric: "Categories".into(),
                value: snap.unique_categories.to_string(),
            },
        ];
        out.push_str(&table_rows(&metrics));
        out.push('\n');

        let _ = writeln!(out, "Top Categories by Total Traffic");
        group_chart(&mut out, &snap.category_totals, false);
        out.push('\n');

        let _ = writeln!(out, "Content Traffic Distribution");
        let bins: Vec<(String, f64, String)> = snap
            .histogram
            .iter()
            .map(|b| {
                (
                    format!("{} - {}", format_number(b.lower, 0), format_number(b.upper, 0)),
                    b.count as f64,
                    b.count.to_string(),
                )
            })
            .collect();
        bar_chart(&mut out, &bins);
        out.push('\n');

        let _ = writeln!(out, "Monthly Traffic Trends");
        let months: Vec<(String, f64, String)> = MONTH_SHORT
            .iter()
            .zip(snap.monthly_totals.iter())
            .map(|(m, v)| (m.to_string(), *v, format_number(*v, 0)))
            .collect();
        bar_chart(&mut out, &months);
        out.push('\n');

        let _ = writeln!(out, "Traffic Share by Content Type");
        group_chart(&mut out, &snap.type_totals, true);
        out.push('\n');

        let _ = writeln!(out, "Automated Insights\n");
        if let Some(top) = &snap.top_performer {
            let _ = writeln!(
                out,
                "  Top Performer: {}...",
                truncate_chars(&top.title, INSIGHT_TITLE_CHARS)
            );
            let _ = writeln!(out, "    {} total traffic", format_number(top.total_traffic, 0));
            let _ = writeln!(out, "    Category: {}", top.category);
        }
        if let Some(peak) = &snap.peak_month {
            let _ = writeln!(out, "  Peak Month: {}", peak.month);
            let _ = writeln!(out, "    {} total traffic", format_number(peak.total_traffic, 0));
            let _ = writeln!(out, "    Plan major releases for {}", peak.month);
        }
        out.push('\n');

        let _ = writeln!(out, "Top Performing Content\n");
        out.push_str(&table_rows(&snap.top_rows));
        out.push('\n');
    }

    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(
        out,
        "Dashboard updated: {} | Auto-refresh: Every {} | Data points: {}",
        refreshed_at.format("%Y-%m-%d %H:%M:%S"),
        describe_window(auto_refresh),
        format_int(snap.available_content)
    );
    out
}

fn describe_window(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        60 => "minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "second".to_string(),
        s => format!("{} seconds", s),
    }
}
