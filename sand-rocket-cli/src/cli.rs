//! CLI definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sand Rocket - project, epic and task tracker
///
/// Every change goes through one SQLite database. Operations are JSON
/// objects such as `{"op": "move task", "id": "...", "status": "done",
/// "position": 0}`; `sand-rocket ops` lists them all.
#[derive(Parser, Debug)]
#[command(name = "sand-rocket")]
#[command(version)]
#[command(about = "Project, epic and task tracker backed by SQLite")]
#[command(
    long_about = "Sand Rocket tracks projects, epics and tasks in a single SQLite file.\n\n\
    Configuration is read from sand-rocket.toml/.yaml/.json in the working directory \
    (or --config), then SAND_ROCKET_* environment variables, e.g.\n  \
    SAND_ROCKET_DATABASE__PATH=/var/lib/sand-rocket.db\n  \
    SAND_ROCKET_TASKS__ALLOW_EPIC_REASSIGNMENT=false\n\n\
    Exit codes: 0 success, 1 operation failed, 2 invalid input."
)]
pub struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overrides the configured path
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// User id to act as, overrides the configured actor
    #[arg(long, global = true, value_name = "USER_ID")]
    pub actor: Option<String>,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and its tables
    Init,

    /// Run one operation or a batch given as JSON
    Exec {
        /// JSON input; `-` or omitted reads stdin
        input: Option<String>,
    },

    /// Show an epic's tasks column by column
    Board {
        /// Epic id
        epic_id: String,
        /// Print the raw JSON instead of columns
        #[arg(long)]
        json: bool,
    },

    /// Show recent activity, newest first
    Activity {
        /// Maximum number of entries
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Print the raw JSON instead of lines
        #[arg(long)]
        json: bool,
    },

    /// List every available operation with its parameters
    Ops,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sand-rocket",
            "board",
            "E1",
            "--db",
            "x.db",
            "--actor",
            "u1",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert_eq!(cli.actor.as_deref(), Some("u1"));
        assert!(matches!(
            cli.command,
            Commands::Board { ref epic_id, json: false } if epic_id == "E1"
        ));
    }

    #[test]
    fn test_activity_default_limit() {
        let cli = Cli::try_parse_from(["sand-rocket", "activity"]).unwrap();
        assert!(matches!(cli.command, Commands::Activity { limit: 20, .. }));
    }
}
