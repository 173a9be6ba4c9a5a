// Cell parsing and number formatting shared by the loader and the
// dashboard. Traffic cells, titles and labels all go through `non_blank`
// so "missing" means the same thing everywhere.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Spreadsheet exports use these for "no value".
const NA_TOKENS: [&str; 10] = [
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

/// Trim a string-like cell; empty cells and NA markers are missing.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() || is_na_token(s) {
        None
    } else {
        Some(s)
    }
}

/// Parse a monthly traffic cell.
///
/// - Missing, blank or NA cells count as `0`.
/// - Thousands separators like `","` are stripped before parsing.
/// - Anything else that does not parse as a finite number is an error,
///   since a single bad cell makes the row total meaningless.
pub fn parse_traffic(s: Option<&str>) -> Result<f64, String> {
    let Some(raw) = non_blank(s) else {
        return Ok(0.0);
    };
    let cleaned = raw.replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid traffic value '{}'", raw)),
    }
}

/// Parse a publish date, returning `None` instead of failing on formats we
/// do not recognize.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = non_blank(s)?;
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Keep at most `max` characters (not bytes) of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Mean of `v`, or 0 when there is nothing to average.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Index of the largest value; the earliest index wins ties.
pub fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = idx;
        }
    }
    best
}

/// Traffic figure with `decimals` places and comma grouping, e.g.
/// `1,234,567.89`. Values that round to zero never show a minus sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Past i64 range the digits are printed ungrouped.
    let mut res = match int_part.parse::<i64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Comma-grouped count, e.g. `9,855` rows.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
