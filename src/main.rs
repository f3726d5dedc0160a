//! Polaris tools CLI - list tool definitions or run a single tool call.
//!
//! ```text
//! polaris-tools list
//! polaris-tools call polaris-iceberg-table --arguments '{"operation":"list","catalog":"prod","namespace":"analytics"}'
//! ```

use clap::{Parser, Subcommand};
use polaris_tools::auth::EnvCredentialSource;
use polaris_tools::tools::ToolRegistry;
use polaris_tools::types::env_snapshot;
use polaris_tools::Config;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "polaris-tools", version, about = "Apache Polaris administration tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every tool definition as JSON.
    List {
        /// One summary line per tool instead of JSON.
        #[arg(long)]
        summary: bool,
    },
    /// Run one tool call and print its result.
    Call {
        /// Tool name, e.g. polaris-iceberg-table.
        tool: String,
        /// Tool arguments as a JSON object.
        #[arg(long, short = 'a', default_value = "{}")]
        arguments: String,
        /// Print the compiled request instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let vars = env_snapshot()?;
    let config = Config::from_vars(&vars)?;
    polaris_tools::observability::init_tracing(&config.observability);

    let registry = ToolRegistry::from_config(&config, Arc::new(EnvCredentialSource::new(vars)))?;

    match cli.command {
        Command::List { summary } => {
            if summary {
                for entry in registry.catalog().list_entries() {
                    println!("{}", entry.summary_line());
                }
            } else {
                let tools = registry.list_tools();
                println!("{}", serde_json::to_string_pretty(&tools)?);
            }
        }
        Command::Call {
            tool,
            arguments,
            dry_run,
        } => {
            let arguments: Value = serde_json::from_str(&arguments)?;
            if dry_run {
                let (api, request) = registry.compile(&tool, &arguments)?;
                let compiled = serde_json::json!({
                    "api": api,
                    "prefix": api.prefix(),
                    "request": request,
                });
                println!("{}", serde_json::to_string_pretty(&compiled)?);
                return Ok(());
            }

            let result = registry.call_tool_result(&tool, &arguments).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_error {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
