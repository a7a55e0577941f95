use crate::prelude::*;
use clap::Parser;

mod error;
mod extract;
mod info;
mod pipeline;
mod prelude;
mod translate;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Translate PDF documents while keeping their layout"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DOCTRANS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Translate a PDF into another language
    Translate(crate::translate::cli::App),

    /// Dump the positioned spans and images of a PDF
    Extract(crate::extract::App),

    /// Show page count and document metadata
    Info(crate::info::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Translate(sub_app) => crate::translate::cli::run(sub_app, app.global).await,
        SubCommands::Extract(sub_app) => crate::extract::run(sub_app, app.global).await,
        SubCommands::Info(sub_app) => crate::info::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
