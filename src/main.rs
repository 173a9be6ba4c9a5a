// Command-line front end for the traffic pipeline.
//
// - `setup` recreates the table and loads the CSV, printing diagnostics.
// - `dashboard` opens an interactive menu over the loaded table.
// - `report` renders the dashboard once for scripted use.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use traffic_report::app::{run_setup, DashboardSession};
use traffic_report::config::{Config, DATABASE_URL_ENV};
use traffic_report::dashboard::{Filters, ALL};
use traffic_report::output;
use traffic_report::util::format_int;

#[derive(Parser)]
#[command(name = "traffic_report")]
#[command(about = "Load monthly content traffic into SQLite and explore it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite connection string (sqlite://path, a bare path or :memory:)
    #[arg(long, global = true, env = DATABASE_URL_ENV, hide_env_values = true)]
    database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the content table, then load the CSV into it
    Setup {
        /// Traffic CSV to ingest
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Interactive dashboard with filters and manual refresh
    Dashboard {
        /// Seconds before a cached read is considered stale
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
    /// Render the dashboard once and exit
    Report {
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        content_type: Option<String>,
        /// Also write the snapshot summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Also write the top performers table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Prompt for one menu entry. `None` means stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user to pick one of `options` by number. Empty input keeps the
/// current selection.
fn prompt_selection(label: &str, options: &[String]) -> Option<String> {
    println!("{}:", label);
    for (idx, opt) in options.iter().enumerate() {
        println!("[{}] {}", idx + 1, opt);
    }
    loop {
        let choice = read_choice().unwrap_or_default();
        if choice.is_empty() {
            return None;
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Some(options[n - 1].clone()),
            _ => println!("Invalid choice. Please enter 1-{}.", options.len()),
        }
    }
}

fn handle_setup(cfg: &Config) -> Result<()> {
    println!("RAPID DATABASE + CSV SETUP");
    println!("{}", "=".repeat(50));
    let summary = run_setup(cfg).context("Setup failed - check the errors above and try again")?;
    let report = &summary.load_report;
    println!(
        "Loaded CSV with {} rows and {} columns",
        format_int(report.total_rows),
        report.columns
    );
    println!("After cleaning: {} valid records", format_int(report.kept_rows));
    if report.unparsed_dates > 0 {
        println!(
            "Note: {} publish dates could not be parsed and were left empty.",
            format_int(report.unparsed_dates)
        );
    }
    println!(
        "Successfully uploaded {} records to database\n",
        format_int(summary.loaded)
    );
    print!("{}", output::verification_summary(&summary.stats));
    println!(
        "\nSUCCESS! Your database is ready with {} content pieces",
        format_int(summary.loaded)
    );
    Ok(())
}

fn describe(filter: Option<&str>) -> &str {
    filter.unwrap_or(ALL)
}

fn handle_dashboard(cfg: &Config) -> Result<()> {
    let mut session = DashboardSession::open(cfg).context("Could not open dashboard")?;
    print!("{}", session.render()?);
    loop {
        let filters = session.filters().clone();
        println!(
            "\nDashboard Controls (Category: {}, Type: {})",
            describe(filters.category.as_deref()),
            describe(filters.content_type.as_deref())
        );
        println!("[1] Refresh Data");
        println!("[2] Category Filter");
        println!("[3] Content Type Filter");
        println!("[4] Show Dashboard");
        println!("[5] Export Top Performers");
        println!("[6] Exit\n");
        let Some(choice) = read_choice() else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                session.refresh();
                print!("{}", session.render()?);
            }
            "2" => {
                let options = session.options()?;
                if let Some(pick) = prompt_selection("Category Filter", &options.categories) {
                    session.set_filters(Filters::from_selection(
                        Some(pick.as_str()),
                        filters.content_type.as_deref(),
                    ));
                }
                print!("{}", session.render()?);
            }
            "3" => {
                let options = session.options()?;
                if let Some(pick) = prompt_selection("Content Type", &options.content_types) {
                    session.set_filters(Filters::from_selection(
                        filters.category.as_deref(),
                        Some(pick.as_str()),
                    ));
                }
                print!("{}", session.render()?);
            }
            "4" => print!("{}", session.render()?),
            "5" => {
                let snap = session.snapshot()?;
                export(&snap, Some(Path::new("top_performers.csv")), Some(Path::new("summary.json")));
            }
            "6" => {
                println!("Exiting the program.");
                return Ok(());
            }
            _ => println!("Invalid choice. Please enter 1-6.\n"),
        }
    }
}

fn export(
    snap: &traffic_report::dashboard::DashboardSnapshot,
    csv: Option<&Path>,
    json: Option<&Path>,
) {
    if let Some(path) = csv {
        match output::write_csv(path, &snap.top_rows) {
            Ok(()) => println!("(Top performers exported to {})", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    if let Some(path) = json {
        match output::write_json(path, snap) {
            Ok(()) => println!("(Summary exported to {})", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
}

fn handle_report(
    cfg: &Config,
    filters: Filters,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let mut session = DashboardSession::open(cfg).context("Could not open dashboard")?;
    session.set_filters(filters);
    print!("{}", session.render()?);
    let snap = session.snapshot()?;
    export(&snap, csv.as_deref(), json.as_deref());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let cfg = Config::new(cli.database)?;
    match cli.command {
        Commands::Setup { csv } => handle_setup(&cfg.with_csv(csv)),
        Commands::Dashboard { ttl_secs } => handle_dashboard(&cfg.with_ttl_secs(ttl_secs)),
        Commands::Report {
            category,
            content_type,
            json,
            csv,
        } => handle_report(
            &cfg,
            Filters::from_selection(category.as_deref(), content_type.as_deref()),
            json,
            csv,
        ),
    }
}
