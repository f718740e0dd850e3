//! Bitácora CLI - personal clinical journal from the terminal
//!
//! Create, search, and edit notes, attach images, and render PDF reports.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::areas::run_areas;
use crate::commands::attach::run_attach;
use crate::commands::common::Session;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::{run_list, run_search};
use crate::commands::new::run_new;
use crate::commands::report::run_report;
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let default_directive = "bitacora=info"
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(CliError::Io)?;
        println!();
        return Ok(());
    };

    // Only commands that touch the journal resolve a session.
    let session = || Session::resolve(cli.db_path.clone(), cli.user.clone());

    match command {
        Commands::Areas => run_areas(),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
        Commands::New { fields } => run_new(&fields, &session()?).await?,
        Commands::List { query, json } => run_list(query.as_deref(), json, &session()?).await?,
        Commands::Search { query, json } => run_search(&query, json, &session()?).await?,
        Commands::Show { id } => run_show(&id, &session()?).await?,
        Commands::Edit { id, fields } => run_edit(&id, &fields, &session()?).await?,
        Commands::Delete { id } => run_delete(&id, &session()?).await?,
        Commands::Attach { id, files } => run_attach(&id, &files, &session()?).await?,
        Commands::Report { id, format, output } => {
            run_report(&id, format, output.as_deref(), &session()?).await?;
        }
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &session()?).await?;
        }
        Commands::Sync => run_sync(&session()?).await?,
    }

    Ok(())
}
