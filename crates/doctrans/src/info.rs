use std::path::PathBuf;

use colored::Colorize;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "info")]
#[command(about = "Show page count and document metadata")]
pub struct App {
    /// Path to the PDF
    path: PathBuf,

    /// Output as JSON
    #[clap(long)]
    json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Reading {}", app.path.display());
    }

    let bytes = tokio::fs::read(&app.path)
        .await
        .map_err(|e| Error::DocumentRead(f!("{}: {}", app.path.display(), e)))?;

    let info = tokio::task::spawn_blocking(move || pdf::info(&bytes).map_err(Error::from)).await??;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Pages".bold().cyan(), info.page_count]);
    for (key, value) in &info.metadata {
        table.add_row(prettytable::row![key.bold().cyan(), value]);
    }
    table.printstd();

    Ok(())
}
