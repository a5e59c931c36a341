//! Internship Job Alerts
//!
//! Polls the configured job boards, stores every new internship posting and
//! emails a digest of the ones not yet delivered.

mod app;
mod config;
mod email;
mod scheduler;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_alerts::{JobRecord, JobStore, SqliteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::JobAlertSystem;
use crate::config::Config;
use crate::email::EmailNotifier;

#[derive(Parser)]
#[command(name = "job-alerts")]
#[command(about = "Watch job boards for new internship postings and email a digest")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check now, then every CHECK_INTERVAL_MINUTES until Ctrl-C (default)
    Run,

    /// Run a single check and exit
    Once,

    /// Send a test email to verify SMTP settings
    TestEmail,

    /// Show database statistics
    Stats,

    /// List the most recently discovered postings
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// List postings not yet delivered
    Pending,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_alerts=debug,job_alerts_cli=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let system = Arc::new(JobAlertSystem::from_config(&config).await?);
            scheduler::run_scheduled(system, config.check_interval()).await?;
        }
        Commands::Once => {
            let system = JobAlertSystem::from_config(&config).await?;
            if let Some(summary) = system.check_for_jobs().await? {
                println!(
                    "Fetched {} postings: {} new, {} delivered, {} pending",
                    summary.ingest.fetched,
                    summary.ingest.new_jobs(),
                    summary.delivery.delivered,
                    summary.stats.pending
                );
                if !summary.ingest.failed_sources.is_empty() {
                    println!("Failed sources: {}", summary.ingest.failed_sources.join(", "));
                }
            }
        }
        Commands::TestEmail => {
            let email = config.email.as_ref().context(
                "Email is not configured: set RECIPIENT_EMAIL, SENDER_EMAIL and SMTP_PASSWORD",
            )?;
            let notifier = EmailNotifier::new(email)?;
            tracing::info!(recipient = %notifier.recipient(), "Sending test email");
            notifier
                .send_test()
                .await
                .context("Failed to send test email, check your SMTP settings")?;
            println!("Test email sent to {}", notifier.recipient());
        }
        Commands::Stats => {
            let store = open_store(&config).await?;
            let stats = store.stats().await?;
            println!("Job Alert System Statistics");
            println!("{}", "=".repeat(40));
            println!("Total jobs tracked: {}", stats.total);
            println!("Jobs notified: {}", stats.notified);
            println!("Pending notifications: {}", stats.pending);
            println!("Number of sources: {}", stats.sources);
        }
        Commands::Recent { limit } => {
            let store = open_store(&config).await?;
            print_jobs(&store.list_recent(limit).await?);
        }
        Commands::Pending => {
            let store = open_store(&config).await?;
            print_jobs(&store.list_unnotified().await?);
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open job store at {}", config.database_url))
}

fn print_jobs(jobs: &[JobRecord]) {
    if jobs.is_empty() {
        println!("No jobs.");
        return;
    }

    for (i, job) in jobs.iter().enumerate() {
        println!("{}. {} ({})", i + 1, job.title, job.company);
        println!(
            "   {} | {} | {}{}",
            job.display_location(),
            job.source,
            job.created_at.format("%Y-%m-%d %H:%M"),
            if job.notified { "" } else { " | pending" }
        );
        println!("   {}", job.url);
    }
}
