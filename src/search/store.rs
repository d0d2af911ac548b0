//! File-backed pattern store with a lexical ranker.
//!
//! The index is a single JSON document under the pattern directory. Readers
//! take a shared `fs2` lock; writers hold an exclusive lock across the whole
//! read-modify-write so concurrent indexers never lose each other's records.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{IndexStats, PatternItem, PatternMatch, PatternRecord, PatternStore, QueryFilter};

/// Index file name inside the pattern directory.
pub const INDEX_FILE: &str = "index.json";

const RANKER: &str = "token-overlap";

/// Words too common to say anything about a pattern.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "for", "from", "in", "is", "it", "of", "on", "or", "the", "to", "with",
];

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    records: BTreeMap<String, PatternRecord>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Pattern store persisted as `<dir>/index.json`.
#[derive(Debug, Clone)]
pub struct JsonPatternStore {
    dir: PathBuf,
}

impl JsonPatternStore {
    /// Open (creating if needed) the store in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create pattern directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn load(&self) -> Result<IndexFile> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(IndexFile::default());
        }
        let content = locked_read(&path)?;
        parse_index(&content, &path)
    }

    /// Apply `update` to the index under an exclusive lock.
    fn update<T>(&self, update: impl FnOnce(&mut IndexFile) -> T) -> Result<T> {
        let path = self.index_path();
        #[allow(clippy::suspicious_open_options)]
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("Failed to open index: {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read index: {}", path.display()))?;
        let mut index = parse_index(&content, &path)?;

        let result = update(&mut index);
        index.updated_at = Some(Utc::now());

        let serialized = serde_json::to_string_pretty(&index).context("Failed to serialize index")?;
        file.set_len(0)
            .with_context(|| format!("Failed to truncate index: {}", path.display()))?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())
            .with_context(|| format!("Failed to write index: {}", path.display()))?;
        file.flush()?;
        Ok(result)
    }

    /// Remove every record.
    pub fn clear(&self) -> Result<()> {
        self.update(|index| index.records.clear())
    }
}

impl PatternStore for JsonPatternStore {
    fn add(
        &self,
        item_type: &str,
        item: &PatternItem,
        content_root: Option<&Path>,
    ) -> Result<Option<String>> {
        let Some(record) = build_record(item_type, item, content_root) else {
            return Ok(None);
        };
        let id = record.id.clone();
        self.update(|index| index.records.insert(record.id.clone(), record))?;
        debug!(id = %id, "indexed pattern");
        Ok(Some(id))
    }

    fn add_items(
        &self,
        item_type: &str,
        items: &[PatternItem],
        content_root: Option<&Path>,
    ) -> Result<usize> {
        let records: Vec<PatternRecord> = items
            .iter()
            .filter_map(|item| build_record(item_type, item, content_root))
            .collect();
        let added = records.len();
        self.update(|index| {
            for record in records {
                index.records.insert(record.id.clone(), record);
            }
        })?;
        debug!(item_type, added, "indexed pattern batch");
        Ok(added)
    }

    fn query(&self, text: &str, filter: &QueryFilter, n: usize) -> Result<Vec<PatternMatch>> {
        let query = tokenize(text);
        if query.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        let index = self.load()?;
        let mut matches: Vec<PatternMatch> = index
            .records
            .values()
            .filter(|record| filter.accepts(record))
            .filter_map(|record| {
                let similarity = similarity(&query, &tokenize(&record.document));
                (similarity > 0.0).then(|| to_match(record, similarity))
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(n);
        Ok(matches)
    }

    fn stats(&self) -> Result<IndexStats> {
        let index = self.load()?;
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for record in index.records.values() {
            *by_type.entry(record.item_type.clone()).or_default() += 1;
        }
        Ok(IndexStats {
            total_items: index.records.len(),
            playbooks: by_type.get("playbook").copied().unwrap_or(0),
            scripts: by_type.get("script").copied().unwrap_or(0),
            by_type,
            db_path: self.dir.clone(),
            ranker: RANKER.to_string(),
            updated_at: index.updated_at,
        })
    }
}

fn locked_read(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open index: {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read index: {}", path.display()))?;
    Ok(content)
}

fn parse_index(content: &str, path: &Path) -> Result<IndexFile> {
    if content.trim().is_empty() {
        return Ok(IndexFile::default());
    }
    serde_json::from_str(content)
        .with_context(|| format!("Failed to parse index: {}", path.display()))
}

/// Document id: `<type>:<id>:<first 8 hex of sha256(path)>`, or
/// `<type>:<id>` for items without a path.
pub(crate) fn document_id(item_type: &str, item_id: &str, path: &str) -> String {
    if path.is_empty() {
        return format!("{item_type}:{item_id}");
    }
    let digest = hex::encode(Sha256::digest(path.as_bytes()));
    format!("{item_type}:{item_id}:{}", &digest[..8])
}

fn build_record(
    item_type: &str,
    item: &PatternItem,
    content_root: Option<&Path>,
) -> Option<PatternRecord> {
    let document = document_text(item_type, item);
    if document.is_empty() {
        return None;
    }

    let item_id = item
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| item.name.clone());

    Some(PatternRecord {
        id: document_id(item_type, &item_id, &item.path),
        item_type: item_type.to_string(),
        item_id,
        name: item.name.clone(),
        path: stored_path(&item.path, content_root),
        pack: item.pack.clone(),
        score: item.score,
        deprecated: item.deprecated,
        fromversion: item.fromversion.clone(),
        intents: item.intents.clone(),
        direction: item.direction.clone(),
        document,
        indexed_at: Utc::now(),
    })
}

/// Store paths relative to the content root so the index does not leak
/// absolute locations.
fn stored_path(path: &str, content_root: Option<&Path>) -> String {
    let Some(root) = content_root else {
        return path.to_string();
    };
    let candidate = Path::new(path);
    if !candidate.is_absolute() {
        return path.to_string();
    }
    match candidate.strip_prefix(root) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => {
            debug!(path, root = %root.display(), "path not under content root");
            path.to_string()
        }
    }
}

/// Text the ranker matches against for one item.
fn document_text(item_type: &str, item: &PatternItem) -> String {
    let mut parts = Vec::new();

    if !item.name.is_empty() {
        parts.push(format!("name: {}", item.name));
    }
    if !item.description.is_empty() {
        parts.push(format!("description: {}", item.description));
    }

    match item_type {
        "playbook" => {
            if !item.intents.is_empty() {
                parts.push(format!("intents: {}", item.intents.join(", ")));
            }
            let commands = names_of(&item.commands, "command", 10);
            if !commands.is_empty() {
                parts.push(format!("commands: {}", commands.join(", ")));
            }
            let subplaybooks = names_of(&item.subplaybooks, "name", 5);
            if !subplaybooks.is_empty() {
                parts.push(format!("subplaybooks: {}", subplaybooks.join(", ")));
            }
            if !item.task_counts.is_empty() {
                let kinds: Vec<&str> = item.task_counts.keys().map(String::as_str).collect();
                parts.push(format!("task_types: {}", kinds.join(", ")));
            }
        }
        "script" => {
            if !item.tags.is_empty() {
                parts.push(format!("tags: {}", item.tags.join(", ")));
            }
            let arguments = names_of(&item.args, "name", 10);
            if !arguments.is_empty() {
                parts.push(format!("arguments: {}", arguments.join(", ")));
            }
        }
        _ => {}
    }

    parts.join(" | ")
}

fn names_of<'a>(values: &'a [serde_json::Value], key: &str, limit: usize) -> Vec<&'a str> {
    values
        .iter()
        .take(limit)
        .filter_map(|v| v.get(key).and_then(serde_json::Value::as_str))
        .filter(|s| !s.is_empty())
        .collect()
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() > 1 && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Cosine similarity of two token sets, rounded to four places.
fn similarity(query: &HashSet<String>, document: &HashSet<String>) -> f64 {
    if query.is_empty() || document.is_empty() {
        return 0.0;
    }
    let shared = query.intersection(document).count() as f64;
    let raw = shared / ((query.len() * document.len()) as f64).sqrt();
    (raw * 10_000.0).round() / 10_000.0
}

fn to_match(record: &PatternRecord, similarity: f64) -> PatternMatch {
    PatternMatch {
        id: record.id.clone(),
        similarity,
        item_type: record.item_type.clone(),
        name: record.name.clone(),
        path: record.path.clone(),
        pack: record.pack.clone(),
        score: record.score,
        intents: record.intents.clone(),
        direction: record.direction.clone(),
        content: None,
    }
}
