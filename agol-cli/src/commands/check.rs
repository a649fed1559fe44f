//! `agol-driver check` — decode an event without touching any remote service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use agol_core::Request;

use super::event::read_event;

/// Arguments for `agol-driver check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the event JSON, `-` for stdin.
    #[arg(long, default_value = "-")]
    pub event: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    method: &'static str,
    s3_bucket: &'a str,
    manifest_path: &'a str,
    items: Vec<&'a str>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let request = read_event(&self.event)?;
        let summary = Summary {
            method: request.method(),
            s3_bucket: request.s3_bucket(),
            manifest_path: request.manifest_path(),
            items: match &request {
                Request::Import(r) => r.data.iter().map(|i| i.name.as_str()).collect(),
                Request::Export(r) => r.data.iter().map(|i| i.name.as_str()).collect(),
            },
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
            return Ok(());
        }

        println!(
            "{} {} item(s); manifest s3://{}/{}",
            summary.method.bold(),
            summary.items.len(),
            summary.s3_bucket,
            summary.manifest_path
        );
        for name in summary.items {
            println!("  ·  {name}");
        }
        Ok(())
    }
}
