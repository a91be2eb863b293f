//! Command handlers
//!
//! Each handler returns the text to print on stdout. Errors bubble up as
//! `anyhow::Error` and [`exit_code`] decides how the process ends.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sand_rocket_tracker::activity::ListActivity;
use sand_rocket_tracker::dispatch::{catalog, execute_input};
use sand_rocket_tracker::epic::GetEpic;
use sand_rocket_tracker::task::ListTasks;
use sand_rocket_tracker::{
    Execute, TaskStatus, TrackerConfig, TrackerContext, TrackerError, TrackerOperationProcessor,
};
use serde_json::Value;
use tracing::debug;

use crate::{Cli, Commands, EXIT_ERROR, EXIT_USAGE};

/// Everything a handler needs after configuration is resolved
pub struct Session {
    pub ctx: TrackerContext,
    pub processor: TrackerOperationProcessor,
}

impl Session {
    /// Load configuration, apply command-line overrides and open the database
    pub fn open(
        config_path: Option<&Path>,
        db: Option<PathBuf>,
        actor: Option<String>,
    ) -> Result<Self> {
        let mut config = TrackerConfig::load(config_path)?;
        if let Some(db) = db {
            config.database.path = db;
        }
        if let Some(actor) = actor {
            config.actor = Some(actor);
        }
        config.validate()?;

        let ctx = TrackerContext::open_with_config(&config)
            .with_context(|| format!("opening {}", config.database.path.display()))?;
        let processor = match config.actor {
            Some(actor) => TrackerOperationProcessor::new().with_actor(actor),
            None => TrackerOperationProcessor::new(),
        };
        debug!(?ctx, actor = ?processor.actor(), "session ready");
        Ok(Self { ctx, processor })
    }
}

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<String> {
    if let Commands::Ops = cli.command {
        return ops();
    }

    let session = Session::open(cli.config.as_deref(), cli.db, cli.actor)?;
    match cli.command {
        Commands::Init => init(&session),
        Commands::Exec { input } => exec(&session, input.as_deref()).await,
        Commands::Board { epic_id, json } => board(&session, &epic_id, json).await,
        Commands::Activity { limit, json } => activity(&session, limit, json).await,
        Commands::Ops => ops(),
    }
}

fn init(session: &Session) -> Result<String> {
    let path = session
        .ctx
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    Ok(pretty(&serde_json::json!({ "database": path, "initialized": true }))?)
}

/// Parse JSON from the argument or stdin and execute it
pub async fn exec(session: &Session, input: Option<&str>) -> Result<String> {
    let raw = match input {
        Some(text) if text != "-" => text.to_string(),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading operation from stdin")?;
            buf
        }
    };

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| TrackerError::parse(format!("input is not valid JSON: {}", e)))?;
    let result = execute_input(&session.ctx, &session.processor, value).await?;
    pretty(&result)
}

/// Render an epic as status columns
pub async fn board(session: &Session, epic_id: &str, json: bool) -> Result<String> {
    let epic = GetEpic::new(epic_id).execute(&session.ctx).await.into_result()?;
    let tasks = ListTasks::for_epic(epic_id)
        .execute(&session.ctx)
        .await
        .into_result()?;

    if json {
        return pretty(&serde_json::json!({ "epic": epic, "tasks": tasks["tasks"] }));
    }

    let empty = Vec::new();
    let tasks = tasks["tasks"].as_array().unwrap_or(&empty);
    let mut out = format!("{}\n", epic["name"].as_str().unwrap_or(epic_id));
    for status in TaskStatus::ALL {
        let column: Vec<&Value> = tasks
            .iter()
            .filter(|t| t["status"].as_str() == Some(status.as_str()))
            .collect();
        out.push_str(&format!("\n{} ({})\n", status.as_str().to_uppercase(), column.len()));
        for task in column {
            out.push_str(&format!(
                "  {:>3}  {}  [{}]\n",
                task["position"].as_u64().unwrap_or_default(),
                task["title"].as_str().unwrap_or_default(),
                task["id"].as_str().unwrap_or_default(),
            ));
        }
    }
    Ok(out)
}

/// Recent activity, one line per operation
pub async fn activity(session: &Session, limit: usize, json: bool) -> Result<String> {
    let listed = ListActivity::new()
        .with_limit(limit)
        .execute(&session.ctx)
        .await
        .into_result()?;
    if json {
        return pretty(&listed);
    }

    let empty = Vec::new();
    let lines: Vec<String> = listed["entries"]
        .as_array()
        .unwrap_or(&empty)
        .iter()
        .map(|entry| {
            let failed = entry["output"].get("error").is_some();
            format!(
                "{}  {:<20} {:<28} {}{}",
                entry["timestamp"].as_str().unwrap_or_default(),
                entry["op"].as_str().unwrap_or_default(),
                entry["actor"].as_str().unwrap_or("-"),
                entry["affected"]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(","))
                    .unwrap_or_default(),
                if failed { "  FAILED" } else { "" },
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn ops() -> Result<String> {
    let ops: Vec<Value> = catalog().iter().map(|info| info.to_json()).collect();
    pretty(&Value::Array(ops))
}

fn pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Map an error to the process exit code
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<TrackerError>() {
        Some(
            TrackerError::Parse { .. }
            | TrackerError::MissingField { .. }
            | TrackerError::InvalidValue { .. }
            | TrackerError::InvalidOperation { .. },
        ) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}
