//! Pattern search over indexed XSIAM content.
//!
//! Playbooks, scripts, integrations, XQL rules, classifiers and mappers are
//! indexed into a [`PatternStore`] and queried with natural-language text.
//! [`PatternSearch`] is the typed facade the pattern tools call; it is built
//! once at startup and handed to the dispatcher.

mod facade;
mod store;
mod tools;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use facade::PatternSearch;
pub use store::{JsonPatternStore, INDEX_FILE};
pub use tools::RagTool;

/// Default number of results per query.
pub const DEFAULT_RESULTS: usize = 5;

/// Content types the index knows about.
pub const CONTENT_TYPES: &[&str] = &[
    "playbook",
    "script",
    "integration",
    "classifier",
    "mapper",
    "parsing_rule",
    "modeling_rule",
];

/// One content item as produced by a content indexer.
///
/// Only `name` or `id` is needed; everything else enriches ranking and
/// metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternItem {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub path: String,
    pub pack: String,
    pub score: i64,
    pub deprecated: bool,
    pub fromversion: String,
    pub intents: Vec<String>,
    pub tags: Vec<String>,
    pub direction: Option<String>,
    /// Playbook commands as `{"command": ...}` objects
    pub commands: Vec<Value>,
    /// Playbook sub-playbooks as `{"name": ...}` objects
    pub subplaybooks: Vec<Value>,
    pub task_counts: BTreeMap<String, Value>,
    /// Script arguments as `{"name": ...}` objects
    pub args: Vec<Value>,
}

/// Stored form of an indexed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// `<type>:<item id>[:<path hash>]`
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub item_id: String,
    pub name: String,
    pub path: String,
    pub pack: String,
    pub score: i64,
    pub deprecated: bool,
    pub fromversion: String,
    #[serde(default)]
    pub intents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Text the ranker matches against
    pub document: String,
    pub indexed_at: DateTime<Utc>,
}

/// A ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub id: String,
    pub similarity: f64,
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub path: String,
    pub pack: String,
    pub score: i64,
    pub intents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Restricts which records a query may return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub item_type: Option<String>,
    pub min_score: Option<i64>,
    pub include_deprecated: bool,
}

impl QueryFilter {
    pub fn of_type(item_type: &str) -> Self {
        Self {
            item_type: Some(item_type.to_string()),
            ..Self::default()
        }
    }

    pub fn accepts(&self, record: &PatternRecord) -> bool {
        if let Some(item_type) = &self.item_type {
            if &record.item_type != item_type {
                return false;
            }
        }
        if !self.include_deprecated && record.deprecated {
            return false;
        }
        match self.min_score {
            Some(min) => record.score >= min,
            None => true,
        }
    }
}

/// Summary of what the index holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_items: usize,
    pub playbooks: usize,
    pub scripts: usize,
    pub by_type: BTreeMap<String, usize>,
    pub db_path: PathBuf,
    pub ranker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Storage and ranking backend for patterns.
pub trait PatternStore: Send + Sync {
    /// Index one item and return its document id, or `None` if the item had
    /// nothing to index. Paths under `content_root` are stored relative to it.
    fn add(
        &self,
        item_type: &str,
        item: &PatternItem,
        content_root: Option<&Path>,
    ) -> Result<Option<String>>;

    /// Index a batch; returns how many items were stored.
    fn add_items(
        &self,
        item_type: &str,
        items: &[PatternItem],
        content_root: Option<&Path>,
    ) -> Result<usize> {
        let mut added = 0;
        for item in items {
            if self.add(item_type, item, content_root)?.is_some() {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Best `n` matches for `text`, highest similarity first.
    fn query(&self, text: &str, filter: &QueryFilter, n: usize) -> Result<Vec<PatternMatch>>;

    fn stats(&self) -> Result<IndexStats>;
}
