use crate::error::{Error, Result};
use crate::schema::validate_connection;
use crate::types::{ContentRecord, VerificationStats, MONTH_COLUMNS};
use log::{debug, info};
use once_cell::sync::Lazy;
use rusqlite::{params_from_iter, types::Value, Connection, OpenFlags};

static INSERT_CONTENT: Lazy<String> = Lazy::new(|| {
    let cols = MONTH_COLUMNS.join(", ");
    let placeholders: Vec<String> = (1..=18).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO content (title, category, content_type, url, publish_date, total_traffic, {}) VALUES ({})",
        cols,
        placeholders.join(", ")
    )
});

const VERIFY_SQL: &str = r#"
SELECT
    COUNT(*)                 AS total_records,
    COUNT(DISTINCT category) AS unique_categories,
    SUM(total_traffic)       AS total_traffic,
    AVG(total_traffic)       AS avg_traffic
FROM content
"#;

/// Resolve a connection string to the path SQLite should open.
///
/// Accepts `sqlite://<path>`, `sqlite:<path>`, a bare path or `:memory:`.
pub fn database_path(url: &str) -> Result<&str> {
    let url = url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if path.is_empty() {
        return Err(Error::Config("database connection string is empty".into()));
    }
    if let Some((scheme, _)) = path.split_once("://") {
        return Err(Error::Config(format!(
            "unsupported database scheme '{}'; expected sqlite",
            scheme
        )));
    }
    Ok(path)
}

/// Open the database named by `url` and check it answers queries.
pub fn connect(url: &str) -> Result<Connection> {
    let path = database_path(url)?;
    let conn = Connection::open(path).map_err(|e| Error::Connection(e.to_string()))?;
    validate_connection(&conn)?;
    debug!("connected to {}", path);
    Ok(conn)
}

/// Open an existing database for the dashboard; a missing file is a
/// connection error rather than a fresh empty database.
pub fn connect_existing(url: &str) -> Result<Connection> {
    let path = database_path(url)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .map_err(|e| Error::Connection(format!("{}: {}", path, e)))?;
    validate_connection(&conn)?;
    debug!("opened existing database {}", path);
    Ok(conn)
}

/// Replace every row of `content` with `records`, in order.
///
/// Runs in a single transaction; a failure leaves the previous contents.
pub fn replace_all(conn: &mut Connection, records: &[ContentRecord]) -> Result<usize> {
    let tx = conn.transaction()?;
    let removed = tx.execute("DELETE FROM content", [])?;
    {
        let mut stmt = tx.prepare(INSERT_CONTENT.as_str())?;
        for r in records {
            let mut values: Vec<Value> = Vec::with_capacity(18);
            values.push(Value::Text(r.title.clone()));
            values.push(Value::Text(r.category.clone()));
            values.push(Value::Text(r.content_type.clone()));
            values.push(Value::Text(r.url.clone()));
            values.push(match r.publish_date {
                Some(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            });
            values.push(Value::Real(r.total_traffic));
            values.extend(r.monthly_traffic.iter().map(|v| Value::Real(*v)));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    info!(
        "replaced {} existing rows with {} records",
        removed,
        records.len()
    );
    Ok(records.len())
}

/// Summary aggregate used to confirm a load landed.
pub fn verify(conn: &Connection) -> Result<VerificationStats> {
    let stats = conn.query_row(VERIFY_SQL, [], |row| {
        Ok(VerificationStats {
            total_records: row.get(0)?,
            unique_categories: row.get(1)?,
            total_traffic: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            avg_traffic: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
        })
    })?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::recreate;
    use chrono::NaiveDate;

    fn record(title: &str, category: &str, jan: f64, feb: f64) -> ContentRecord {
        let mut monthly_traffic = [0.0; 12];
        monthly_traffic[0] = jan;
        monthly_traffic[1] = feb;
        ContentRecord {
            title: title.to_string(),
            category: category.to_string(),
            content_type: "post".to_string(),
            url: String::new(),
            publish_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            monthly_traffic,
            total_traffic: jan + feb,
        }
    }

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        recreate(&conn).unwrap();
        conn
    }

    #[test]
    fn verify_reports_counts_and_sums() {
        let mut conn = fresh();
        let records = vec![
            record("a", "Blog", 10.0, 20.0),
            record("b", "Blog", 5.0, 5.0),
            record("c", "News", 0.0, 60.0),
        ];
        assert_eq!(replace_all(&mut conn, &records).unwrap(), 3);
        let stats = verify(&conn).unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.unique_categories, 2);
        assert_eq!(stats.total_traffic, 100.0);
        assert!((stats.avg_traffic - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn reload_replaces_instead_of_appending() {
        let mut conn = fresh();
        let records = vec![record("a", "Blog", 1.0, 2.0), record("b", "News", 3.0, 4.0)];
        replace_all(&mut conn, &records).unwrap();
        let once = verify(&conn).unwrap();
        replace_all(&mut conn, &records).unwrap();
        let twice = verify(&conn).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_table_verifies_to_zero() {
        let conn = fresh();
        let stats = verify(&conn).unwrap();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_traffic, 0.0);
        assert_eq!(stats.avg_traffic, 0.0);
    }

    #[test]
    fn stored_total_matches_months() {
        let mut conn = fresh();
        replace_all(&mut conn, &[record("a", "Blog", 1.25, 2.5)]).unwrap();
        let (total, sum): (f64, f64) = conn
            .query_row(
                "SELECT total_traffic, jan_traffic + feb_traffic + mar_traffic + apr_traffic + may_traffic + jun_traffic + jul_traffic + aug_traffic + sep_traffic + oct_traffic + nov_traffic + dec_traffic FROM content",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(total, sum);
    }

    #[test]
    fn connection_strings_resolve_to_paths() {
        assert_eq!(database_path("sqlite://data/t.db").unwrap(), "data/t.db");
        assert_eq!(database_path("sqlite:t.db").unwrap(), "t.db");
        assert_eq!(database_path(":memory:").unwrap(), ":memory:");
        assert!(matches!(
            database_path("postgresql://u:p@host/db"),
            Err(Error::Config(_))
        ));
        assert!(matches!(database_path("  "), Err(Error::Config(_))));
    }

    #[test]
    fn dashboard_open_does_not_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let err = connect_existing(&format!("sqlite://{}", path.display())).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!path.exists());
    }

    #[test]
    fn dashboard_open_reads_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("traffic.db").display());
        let mut conn = connect(&url).unwrap();
        recreate(&conn).unwrap();
        replace_all(&mut conn, &[record("a", "Blog", 1.0, 2.0)]).unwrap();
        drop(conn);

        let conn = connect_existing(&url).unwrap();
        assert_eq!(verify(&conn).unwrap().total_records, 1);
    }

    #[test]
    fn unreachable_database_is_a_connection_error() {
        let err = connect("/no/such/dir/traffic.db").unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
