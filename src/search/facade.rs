//! Typed search API over a [`PatternStore`].

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{IndexStats, PatternMatch, PatternStore, QueryFilter};
use crate::security::safe_resolve_path;

/// Default types for [`PatternSearch::search_patterns`].
pub const DEFAULT_SEARCH_TYPES: &[&str] = &["playbook", "script", "integration"];

/// Files larger than this are never inlined into results (1MB).
const MAX_CONTENT_SIZE: u64 = 1024 * 1024;

/// Search facade used by the pattern tools.
///
/// When a content root is known, results can carry the source file's text.
/// Files are only read after the stored path has been confined to that root.
#[derive(Clone)]
pub struct PatternSearch {
    store: Arc<dyn PatternStore>,
    content_root: Option<PathBuf>,
}

impl PatternSearch {
    pub fn new(store: Arc<dyn PatternStore>, content_root: Option<PathBuf>) -> Self {
        Self {
            store,
            content_root,
        }
    }

    pub fn content_root(&self) -> Option<&Path> {
        self.content_root.as_deref()
    }

    /// Search several content types and merge by similarity.
    pub fn search_patterns(
        &self,
        query: &str,
        n: usize,
        content_types: Option<&[&str]>,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        let types = content_types.unwrap_or(DEFAULT_SEARCH_TYPES);
        let mut results = Vec::new();
        for item_type in types {
            results.extend(self.store.query(query, &QueryFilter::of_type(item_type), n)?);
        }
        Ok(self.finish(results, n, include_content))
    }

    pub fn find_similar_playbooks(
        &self,
        description: &str,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        self.find_of_type("playbook", description, n, include_content)
    }

    pub fn find_similar_scripts(
        &self,
        description: &str,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        self.find_of_type("script", description, n, include_content)
    }

    pub fn find_integration_patterns(
        &self,
        description: &str,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        self.find_of_type("integration", description, n, include_content)
    }

    pub fn find_classifier_examples(
        &self,
        description: &str,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        self.find_of_type("classifier", description, n, include_content)
    }

    /// Parsing and/or modeling rules. `rule_type` is `parsing`, `modeling` or
    /// `None` for both.
    pub fn find_xql_examples(
        &self,
        description: &str,
        rule_type: Option<&str>,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        let mut results = Vec::new();
        if matches!(rule_type, None | Some("parsing")) {
            let filter = QueryFilter::of_type("parsing_rule");
            results.extend(self.store.query(description, &filter, n)?);
        }
        if matches!(rule_type, None | Some("modeling")) {
            let filter = QueryFilter::of_type("modeling_rule");
            results.extend(self.store.query(description, &filter, n)?);
        }
        Ok(self.finish(results, n, include_content))
    }

    /// Mappers, optionally restricted to `incoming` or `outgoing`.
    pub fn find_mapper_examples(
        &self,
        description: &str,
        direction: Option<&str>,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        let mut matches = self
            .store
            .query(description, &QueryFilter::of_type("mapper"), usize::MAX)?;
        if let Some(direction) = direction {
            matches.retain(|m| m.direction.as_deref() == Some(direction));
        }
        Ok(self.finish(matches, n, include_content))
    }

    pub fn index_stats(&self) -> Result<IndexStats> {
        self.store.stats()
    }

    fn find_of_type(
        &self,
        item_type: &str,
        description: &str,
        n: usize,
        include_content: bool,
    ) -> Result<Vec<PatternMatch>> {
        let matches = self.store.query(description, &QueryFilter::of_type(item_type), n)?;
        Ok(self.finish(matches, n, include_content))
    }

    fn finish(
        &self,
        mut results: Vec<PatternMatch>,
        n: usize,
        include_content: bool,
    ) -> Vec<PatternMatch> {
        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(n);
        if include_content {
            for result in &mut results {
                result.content = self.fetch_content(&result.path);
            }
        }
        results
    }

    fn fetch_content(&self, path: &str) -> Option<String> {
        let root = self.content_root.as_deref()?;
        if path.is_empty() {
            return None;
        }
        let resolved = safe_resolve_path(path, root, false).ok()?;
        let metadata = fs::metadata(&resolved).ok()?;
        if !metadata.is_file() || metadata.len() > MAX_CONTENT_SIZE {
            debug!(path = %resolved.display(), "skipping content fetch");
            return None;
        }
        fs::read_to_string(&resolved).ok()
    }
}

impl std::fmt::Debug for PatternSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternSearch")
            .field("content_root", &self.content_root)
            .finish_non_exhaustive()
    }
}
