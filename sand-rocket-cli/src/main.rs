//! Sand Rocket CLI
//!
//! Commands:
//! - `sand-rocket init`: create the database
//! - `sand-rocket exec <json|->`: run an operation or batch
//! - `sand-rocket board <epic-id>`: show an epic column by column
//! - `sand-rocket activity [-n N]`: recent activity
//! - `sand-rocket ops`: list available operations
//!
//! Exit codes:
//! - 0: Success
//! - 1: The operation failed
//! - 2: Invalid input

use clap::Parser;
use sand_rocket_cli::{commands, logging, Cli, EXIT_SUCCESS};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let exit_code = match commands::run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {:#}", e);
            commands::exit_code(&e)
        }
    };
    std::process::exit(exit_code);
}
