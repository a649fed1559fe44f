//! `agol-driver run` — execute an invocation event.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use agol_aws::{S3Store, SecretsManagerStore, DEFAULT_SECRETS_REGION};
use agol_gis::{ArcGisClient, ClientOptions};
use agol_sync::{ItemOutcome, Outcome, Settings};

use super::event::read_event;

/// Arguments for `agol-driver run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the event JSON, `-` for stdin.
    #[arg(long, default_value = "-")]
    pub event: PathBuf,

    /// ArcGIS portal base URL.
    #[arg(long, env = "AGOL_URL")]
    pub agol_url: String,

    /// Secrets Manager id holding `AGOL_USER` / `AGOL_PASS`.
    #[arg(long, env = "AGOL_SECRET")]
    pub agol_secret: String,

    /// Region of the credential secret.
    #[arg(long, env = "AGOL_SECRET_REGION", default_value = DEFAULT_SECRETS_REGION)]
    pub secrets_region: String,

    /// S3 region; defaults to the AWS SDK region chain.
    #[arg(long, env = "AWS_REGION")]
    pub storage_region: Option<String>,

    /// Scope the catalog to a group instead of the signed-in owner.
    #[arg(long, env = "AGOL_GROUP_ID")]
    pub group: Option<String>,

    /// Delay between publish/export job status polls.
    #[arg(long, env = "AGOL_JOB_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub job_poll_interval_ms: u64,

    /// Polls before an unfinished job counts as failed.
    #[arg(long, env = "AGOL_JOB_POLL_ATTEMPTS", default_value_t = 150)]
    pub job_poll_attempts: u32,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "item")]
    item: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let request = read_event(&self.event)?;

        let mut options = ClientOptions::new(self.agol_url.clone());
        options.group = self.group.clone();
        options.job_poll_interval = Duration::from_millis(self.job_poll_interval_ms);
        options.job_poll_attempts = self.job_poll_attempts;

        let secrets = SecretsManagerStore::new(self.secrets_region.clone())
            .context("failed to start Secrets Manager client")?;
        let storage =
            S3Store::new(self.storage_region.clone()).context("failed to start S3 client")?;
        let settings = Settings::new(self.agol_secret.clone());

        let outcome = agol_sync::run(&settings, &request, &secrets, &storage, |creds| {
            ArcGisClient::connect(options, creds)
        })
        .with_context(|| format!("{} invocation failed", request.method()))?;

        let failed = outcome
            .outcomes()
            .iter()
            .filter(|o| o.is_failed())
            .count();
        tracing::info!(
            "{} finished: {} item(s), {} failed",
            request.method(),
            outcome.outcomes().len(),
            failed
        );

        if self.json {
            print_json(&outcome)?;
        } else {
            print_table(&outcome);
        }
        Ok(())
    }
}

fn print_json(outcome: &Outcome) -> Result<()> {
    let payload = match outcome {
        Outcome::Import(report) => serde_json::json!({ "method": "import", "report": report }),
        Outcome::Export(report) => serde_json::json!({ "method": "export", "report": report }),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize report")?
    );
    Ok(())
}

fn print_table(outcome: &Outcome) {
    let outcomes = outcome.outcomes();
    if outcomes.is_empty() {
        println!("No items in request.");
    } else {
        let rows: Vec<OutcomeRow> = outcomes
            .iter()
            .map(|o| OutcomeRow {
                item: o.name().to_string(),
                outcome: colored_label(o),
                detail: o.detail(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if let Outcome::Import(report) = outcome {
        println!("Manifest written with {} entries.", report.manifest.len());
    }
}

fn colored_label(outcome: &ItemOutcome) -> String {
    let label = outcome.label().to_uppercase();
    match outcome {
        ItemOutcome::Imported { .. } | ItemOutcome::Exported { .. } => label.green().to_string(),
        ItemOutcome::Skipped { .. } => label.yellow().to_string(),
        ItemOutcome::Failed { .. } => label.red().bold().to_string(),
    }
}
