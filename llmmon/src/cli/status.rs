//! status subcommand
//!
//! Prints the latest probe state of every active target as a table.

use crate::db::status::list_target_status;
use crate::types::TargetStatus;
use clap::Args;
use sqlx::SqlitePool;

/// Arguments for the status subcommand
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Print JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, pool: &SqlitePool) -> Result<(), anyhow::Error> {
    let rows = list_target_status(pool).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No models monitored yet");
    } else {
        print!("{}", render_table(&rows));
    }
    Ok(())
}

fn render_table(rows: &[TargetStatus]) -> String {
    let mut out = String::from("STATE\tLATENCY\tHTTP\tVISION\tCONTEXT\tMODEL\tCHECKED\n");
    for row in rows {
        let latency = row
            .latency_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        let http = row
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        let checked = row
            .checked_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            row.state,
            latency,
            http,
            if row.accepts_images { "yes" } else { "no" },
            row.context_length,
            row.id,
            checked
        ));
    }
    out
}
