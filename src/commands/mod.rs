//! CLI subcommand implementations.

pub mod call;
pub mod check;
pub mod index;
pub mod serve;
pub mod tools;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::runner::{expand_tilde, SdkRunner, CONTENT_PATH_ENV};
use crate::search::{JsonPatternStore, PatternSearch};
use crate::tools::Dispatcher;

/// Build the dispatcher for one process.
///
/// Pattern search is registered only when the pattern store opens; that
/// decision is made once and never revisited.
pub fn build_dispatcher(config: &ServerConfig) -> Dispatcher {
    let runner = Arc::new(SdkRunner::new(config.runner_config()));
    let dispatcher = Dispatcher::new(runner, config.path_policy);

    match JsonPatternStore::open(&config.pattern_db) {
        Ok(store) => {
            info!(db = %config.pattern_db.display(), "pattern search enabled");
            let search = PatternSearch::new(Arc::new(store), search_content_root(config));
            dispatcher.with_search(Arc::new(search))
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "pattern search unavailable");
            dispatcher
        }
    }
}

/// Content root used for inlining pattern file content: the configured
/// content path, else the environment variable, else none.
pub fn search_content_root(config: &ServerConfig) -> Option<PathBuf> {
    config
        .content_path
        .clone()
        .or_else(|| {
            env::var_os(CONTENT_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(|v| expand_tilde(&PathBuf::from(v)))
        })
        .and_then(|root| root.canonicalize().ok())
}
