// Storage layout for the `content` table.
//
// Setup always drops and recreates the table: every ingestion is a full
// refresh, so there is nothing to migrate.
use crate::error::{Error, Result};
use crate::types::MONTH_COLUMNS;
use log::info;
use once_cell::sync::Lazy;
use rusqlite::Connection;

pub const TABLE: &str = "content";

pub const DROP_CONTENT: &str = "DROP TABLE IF EXISTS content;";

pub static CREATE_CONTENT: Lazy<String> = Lazy::new(|| {
    let months: String = MONTH_COLUMNS
        .iter()
        .map(|c| format!("  {} REAL DEFAULT 0,\n", c))
        .collect();
    format!(
        r#"
CREATE TABLE content (
  id            INTEGER PRIMARY KEY AUTOINCREMENT,
  title         TEXT NOT NULL,
  category      TEXT,
  content_type  TEXT,
  url           TEXT,
  publish_date  DATE,
  total_traffic REAL DEFAULT 0,
{}  created_at    TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#,
        months
    )
});

pub const INDEX_CATEGORY: &str = "CREATE INDEX idx_content_category ON content(category);";
pub const INDEX_TYPE: &str = "CREATE INDEX idx_content_type ON content(content_type);";
pub const INDEX_TRAFFIC: &str = "CREATE INDEX idx_content_traffic ON content(total_traffic);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        DROP_CONTENT,
        CREATE_CONTENT.as_str(),
        INDEX_CATEGORY,
        INDEX_TYPE,
        INDEX_TRAFFIC,
    ]
}

/// Round-trip a trivial query so a bad path or permissions problem shows up
/// before anything destructive runs.
pub fn validate_connection(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

/// Drop `content` (and its data) and create it again with its indexes.
pub fn recreate(conn: &Connection) -> Result<()> {
    let batch = schema_statements().join("\n");
    conn.execute_batch(&batch).map_err(Error::Schema)?;
    info!("recreated table '{}' with 3 indexes", TABLE);
    Ok(())
}
