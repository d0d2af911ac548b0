//! `demisto-mcp check` - report whether the environment is usable.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::ServerConfig;
use crate::runner::SdkRunner;
use crate::search::{JsonPatternStore, PatternStore};
use crate::security::validate_sdk_binary;

pub fn execute(config: &ServerConfig) -> Result<()> {
    let runner = SdkRunner::new(config.runner_config());
    let mut healthy = true;

    println!("{}", "demisto-mcp environment".bold());

    let requested = runner.requested_binary();
    match validate_sdk_binary(&requested) {
        Ok(path) => println!("{} SDK binary: {}", "✓".green().bold(), path.display()),
        Err(rejection) => {
            healthy = false;
            println!("{} SDK binary '{}': {}", "✗".red().bold(), requested, rejection);
        }
    }

    match runner.content_root(None) {
        Ok(root) => println!("{} Content root: {}", "✓".green().bold(), root.display()),
        Err(e) => {
            healthy = false;
            println!("{} Content root: {}", "✗".red().bold(), e);
        }
    }

    println!("{} Path policy: {}", "─".dimmed(), config.path_policy);
    println!(
        "{} Command timeout: {}s",
        "─".dimmed(),
        config.command_timeout.as_secs()
    );

    match JsonPatternStore::open(&config.pattern_db).and_then(|store| store.stats()) {
        Ok(stats) => println!(
            "{} Pattern index: {} ({} items)",
            "✓".green().bold(),
            stats.db_path.display(),
            stats.total_items
        ),
        Err(e) => println!(
            "{} Pattern index unavailable: {}",
            "─".dimmed(),
            format!("{e:#}").dimmed()
        ),
    }

    if !healthy {
        bail!("Environment check failed");
    }
    Ok(())
}
