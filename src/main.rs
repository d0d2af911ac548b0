use anyhow::Result;
use clap::{Parser, Subcommand};
use demisto_mcp::commands::{call, check, index, serve, tools};
use demisto_mcp::config::{ConfigOverrides, PathPolicy, ServerConfig};
use demisto_mcp::LOG_ENV;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "demisto-mcp")]
#[command(
    about = "MCP server exposing demisto-sdk operations behind input validation",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: <config dir>/demisto-mcp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SDK binary to run (must resolve to demisto-sdk)
    #[arg(long, global = true)]
    sdk_bin: Option<String>,

    /// Content repository root (must contain or will receive a Packs/ directory)
    #[arg(long, global = true)]
    content_path: Option<PathBuf>,

    /// Pattern index directory
    #[arg(long, global = true)]
    pattern_db: Option<PathBuf>,

    /// Per-command timeout in seconds (default: 300)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path argument policy: content-root or characters-only
    #[arg(long, global = true)]
    path_policy: Option<PathPolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Print the tool catalogue as JSON
    Tools,

    /// Invoke one tool and print its result
    Call {
        /// Tool name, e.g. validate_content
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },

    /// Check the SDK binary, content root and pattern index
    Check,

    /// Add content items from a JSON or YAML file to the pattern index
    Index {
        /// File holding a list of items
        #[arg(long)]
        items: PathBuf,

        /// Content type of the items (playbook, script, integration, ...)
        #[arg(long = "type")]
        item_type: String,

        /// Remove every indexed item first
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ServerConfig::load(&ConfigOverrides {
        config_file: cli.config,
        sdk_bin: cli.sdk_bin,
        content_path: cli.content_path,
        pattern_db: cli.pattern_db,
        timeout_secs: cli.timeout,
        path_policy: cli.path_policy,
    })?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::execute(&config),
        Commands::Tools => tools::execute(&config),
        Commands::Call { tool, args } => call::execute(&config, &tool, args.as_deref()),
        Commands::Check => check::execute(&config),
        Commands::Index {
            items,
            item_type,
            clear,
        } => index::execute(&config, &items, &item_type, clear),
    }
}

/// Logs go to stderr; stdout is reserved for protocol messages.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
