use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod classify;
mod history;
mod models;
mod normalize;
mod policy;
mod prefs;
mod report;
mod roster;
mod store;
mod strikes;

use history::{SortDirection, SortField};
use policy::{AttendancePolicy, BandThresholds, TardyCredit};
use prefs::Theme;

#[derive(Parser)]
#[command(name = "oneface-attendance")]
#[command(about = "Attendance aggregation and reporting for OneFace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PolicyArgs {
    /// JSON policy file; takes precedence over the individual flags
    #[arg(long)]
    policy: Option<PathBuf>,
    #[arg(long, default_value_t = 90)]
    good_threshold: u8,
    #[arg(long, default_value_t = 70)]
    warning_threshold: u8,
    #[arg(long, default_value_t = 3)]
    max_strikes: usize,
    #[arg(long, value_enum, default_value_t = TardyCredit::Full)]
    tardy_credit: TardyCredit,
}

impl PolicyArgs {
    fn resolve(&self) -> anyhow::Result<AttendancePolicy> {
        if let Some(path) = &self.policy {
            return AttendancePolicy::from_file(path);
        }
        Ok(AttendancePolicy {
            thresholds: BandThresholds {
                good: self.good_threshold,
                warning: self.warning_threshold,
            },
            tardy_credit: self.tardy_credit,
            max_strikes: self.max_strikes,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import attendance rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Combined per-class attendance view for a user's dashboard
    Roster {
        #[arg(long)]
        user: String,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Single-class drill-down with the per-session history
    Summary {
        #[arg(long)]
        user: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Export one class's attendance history as CSV
    Export {
        #[arg(long)]
        user: String,
        #[arg(long)]
        class: String,
        #[arg(long, value_enum, default_value_t = SortField::Date)]
        sort: SortField,
        #[arg(long)]
        desc: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown attendance report
    Report {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Show or update a user's presentation preferences
    Prefs {
        #[arg(long)]
        user: String,
        #[arg(long, value_enum)]
        theme: Option<Theme>,
        #[arg(long)]
        colorblind: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            store::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            store::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let imported = store::import_csv(&pool, &csv).await?;
            println!("Imported {imported} attendance rows from {}.", csv.display());
        }
        Commands::Roster { user, json, policy } => {
            let policy = policy.resolve()?;
            let classes = store::list_enrolled_classes(&pool, &user).await?;
            let summaries = store::fetch_summaries(&pool, &user, &classes, &policy).await?;
            let roster = roster::build_roster(&classes, &summaries, &policy);

            if json {
                println!("{}", serde_json::to_string_pretty(&roster)?);
            } else if roster.is_empty() {
                println!("No enrolled classes for {user}.");
            } else {
                println!("Attendance roster for {user}:");
                for entry in &roster {
                    let summary = &entry.summary;
                    let assessment = strikes::compute_strikes(summary, policy.max_strikes);
                    let flag = if assessment.exceeded {
                        " [strike limit exceeded]"
                    } else if assessment.one_away {
                        " [one absence from the limit]"
                    } else {
                        ""
                    };
                    println!(
                        "- {}: {}% {} ({} present, {} tardy, {} absent, {} unrecorded of {} sessions), strikes {}/{}{}",
                        entry.class.display_name,
                        summary.rate_percent,
                        summary.band.label(),
                        summary.present_count,
                        summary.tardy_count,
                        summary.absent_count,
                        summary.unrecorded_count,
                        summary.total_events,
                        assessment.strikes,
                        policy.max_strikes,
                        flag
                    );
                }
            }
        }
        Commands::Summary {
            user,
            class,
            json,
            policy,
        } => {
            let policy = policy.resolve()?;
            let class_ref = store::get_class(&pool, &class)
                .await?
                .with_context(|| format!("class {class} not found"))?;
            let events = store::list_events(&pool, &class).await?;
            let records = store::list_attendance(&pool, &user, &class).await?;
            let summary = aggregate::aggregate(&class_ref, &events, &records, &policy);
            let rows = history::build_history(&events, &records);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!(
                "{} ({}, {})",
                class_ref.display_name, class_ref.schedule_label, class_ref.location
            );
            println!(
                "Rate {}% ({}): {} present, {} tardy, {} absent, {} unrecorded of {} sessions",
                summary.rate_percent,
                summary.band.label(),
                summary.present_count,
                summary.tardy_count,
                summary.absent_count,
                summary.unrecorded_count,
                summary.total_events
            );
            println!("Strikes: {}/{}", summary.strikes, policy.max_strikes);
            for row in &rows {
                let date = row.date.map(|d| d.to_string()).unwrap_or_else(|| "TBD".into());
                println!("  {date}  {}  {}", row.session_name, history::status_cell(row));
            }
        }
        Commands::Export {
            user,
            class,
            sort,
            desc,
            out,
        } => {
            let events = store::list_events(&pool, &class).await?;
            let records = store::list_attendance(&pool, &user, &class).await?;
            let mut rows = history::build_history(&events, &records);

            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            history::sort_history(&mut rows, sort, direction);

            let csv = history::export_csv(&rows)?;
            let out = out.unwrap_or_else(|| PathBuf::from(format!("attendance-log-{class}.csv")));
            std::fs::write(&out, csv)?;
            println!("Exported {} rows to {}.", rows.len(), out.display());
        }
        Commands::Report { user, out, policy } => {
            let policy = policy.resolve()?;
            let classes = store::list_enrolled_classes(&pool, &user).await?;
            let summaries = store::fetch_summaries(&pool, &user, &classes, &policy).await?;
            let roster = roster::build_roster(&classes, &summaries, &policy);
            let report = report::build_report(&user, &roster, &policy);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Prefs {
            user,
            theme,
            colorblind,
        } => {
            let mut prefs = store::fetch_prefs(&pool, &user).await?;
            if theme.is_some() || colorblind.is_some() {
                if let Some(theme) = theme {
                    prefs.theme = theme;
                }
                if let Some(colorblind) = colorblind {
                    prefs.color_blind_mode = colorblind;
                }
                store::save_prefs(&pool, &user, &prefs).await?;
            }
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
    }

    Ok(())
}
