use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use traffic_report::app::{run_setup, DashboardSession};
use traffic_report::config::Config;
use traffic_report::dashboard::Filters;
use traffic_report::query::fetch_content;
use traffic_report::{store, Error};

const HEADER: &str = "Title,category,Type,URL,Publish date,January,February,March,April,May,June,July,August,September,October,November,December";

fn write_csv(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("traffic.csv");
    let mut body = String::from(HEADER);
    body.push('\n');
    for r in rows {
        body.push_str(r);
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    path
}

fn config(dir: &TempDir, csv: PathBuf) -> Config {
    let url = format!("sqlite://{}", dir.path().join("traffic.db").display());
    Config::new(Some(url)).unwrap().with_csv(Some(csv))
}

#[test]
fn one_row_example_end_to_end() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), &["A,Blog,post,,,10,20,,,,,,,,,,"]);
    let cfg = config(&dir, csv);

    let summary = run_setup(&cfg).unwrap();
    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.stats.total_records, 1);
    assert_eq!(summary.stats.total_traffic, 30.0);

    let conn = store::connect(&cfg.database_url).unwrap();
    let rows = fetch_content(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_traffic, 30.0);
    assert_eq!(rows[0].peak_month, "February");
    assert_eq!(rows[0].avg_monthly_traffic, 2.5);
    assert_eq!(rows[0].monthly_traffic[2], 0.0);
}

#[test]
fn rerunning_setup_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "Alpha,Blog,post,https://a,2024-02-01,1,2,3,4,5,6,7,8,9,10,11,12",
            "Beta,News,article,,bad date,100,,,,,,,,,,,",
            ",News,article,,,999,,,,,,,,,,,",
            "Gamma,,,,,,,,,,,,,,,,5",
        ],
    );
    let cfg = config(&dir, csv);

    let first = run_setup(&cfg).unwrap();
    let second = run_setup(&cfg).unwrap();
    assert_eq!(first.stats, second.stats);
    assert_eq!(second.stats.total_records, 3);
    assert_eq!(second.stats.unique_categories, 3);
    assert_eq!(second.stats.total_traffic, 78.0 + 100.0 + 5.0);
    assert_eq!(first.load_report.missing_title, 1);

    let conn = store::connect(&cfg.database_url).unwrap();
    let rows = fetch_content(&conn).unwrap();
    assert!(rows.iter().all(|r| !r.title.trim().is_empty()));
    for r in &rows {
        assert_eq!(r.total_traffic, r.monthly_traffic.iter().sum::<f64>());
    }
    let gamma = rows.iter().find(|r| r.title == "Gamma").unwrap();
    assert_eq!(gamma.category, "Uncategorized");
    assert_eq!(gamma.content_type, "unknown");
    assert_eq!(gamma.peak_month, "December");
}

#[test]
fn missing_csv_leaves_an_empty_table() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, dir.path().join("absent.csv"));

    let err = run_setup(&cfg).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));

    let conn = store::connect(&cfg.database_url).unwrap();
    let stats = store::verify(&conn).unwrap();
    assert_eq!(stats.total_records, 0);
}

#[test]
fn bad_month_value_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let good = write_csv(dir.path(), &["Alpha,Blog,post,,,1,,,,,,,,,,,"]);
    let cfg = config(&dir, good);
    run_setup(&cfg).unwrap();

    let bad = write_csv(dir.path(), &["Alpha,Blog,post,,,1,,,,,,,,,,,", "Beta,Blog,post,,,many,,,,,,,,,,,"]);
    let cfg = cfg.with_csv(Some(bad));
    assert!(matches!(run_setup(&cfg), Err(Error::Processing(_))));

    let conn = store::connect(&cfg.database_url).unwrap();
    assert!(fetch_content(&conn).unwrap().is_empty());
}

#[test]
fn dashboard_over_loaded_table() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "Alpha,Blog,post,,,100,,,,,,,,,,,",
            "Beta,News,article,,,,,,,,,,,,,,40",
            "Delta,Blog,video,,,,10,,,,,,,,,,",
        ],
    );
    let cfg = config(&dir, csv);
    run_setup(&cfg).unwrap();

    let mut session = DashboardSession::open(&cfg).unwrap();
    let snap = session.snapshot().unwrap();
    assert_eq!(snap.total_content, 3);
    assert_eq!(snap.total_traffic, 150.0);
    assert_eq!(snap.peak_month.unwrap().month, "January");

    session.set_filters(Filters::from_selection(Some("Blog"), None));
    let snap = session.snapshot().unwrap();
    assert_eq!(snap.total_content, 2);
    assert_eq!(snap.top_performer.unwrap().title, "Alpha");

    session.set_filters(Filters::from_selection(Some("Podcasts"), None));
    let text = session.render().unwrap();
    assert!(text.contains("No data available."));
    assert!(text.contains("Showing 0 of 3 content pieces"));
}

#[test]
fn dashboard_rejects_a_database_that_was_never_set_up() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, dir.path().join("unused.csv"));
    let err = DashboardSession::open(&cfg).err().unwrap();
    assert!(matches!(err, Error::Connection(_)));
    assert!(!dir.path().join("traffic.db").exists());
}
