//! `demisto-mcp index` - add content items to the pattern store.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use super::search_content_root;
use crate::config::ServerConfig;
use crate::search::{JsonPatternStore, PatternItem, PatternStore, CONTENT_TYPES};
use crate::security::validate_choice;

/// Index the items in `items_file` as `item_type`.
pub fn execute(
    config: &ServerConfig,
    items_file: &Path,
    item_type: &str,
    clear: bool,
) -> Result<()> {
    if validate_choice(item_type, CONTENT_TYPES).is_err() {
        bail!(
            "Invalid content type '{item_type}'. Must be one of: {}",
            CONTENT_TYPES.join(", ")
        );
    }

    let items = load_items(items_file)?;
    let store = JsonPatternStore::open(&config.pattern_db)?;
    if clear {
        store.clear()?;
        println!("{} Cleared pattern index", "─".dimmed());
    }

    let root = search_content_root(config);
    let added = store.add_items(item_type, &items, root.as_deref())?;
    println!(
        "{} Indexed {added} of {} {item_type} items into {}",
        "✓".green().bold(),
        items.len(),
        store.dir().display()
    );
    Ok(())
}

/// Read a JSON or YAML list of items. YAML is chosen by file extension.
pub fn load_items(path: &Path) -> Result<Vec<PatternItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML items: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON items: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::QueryFilter;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config_for(temp: &TempDir) -> ServerConfig {
        ServerConfig {
            sdk_bin: None,
            content_path: None,
            pattern_db: temp.path().join("patterns"),
            command_timeout: Duration::from_secs(5),
            path_policy: Default::default(),
        }
    }

    #[test]
    fn test_load_yaml_and_json_items() {
        let temp = TempDir::new().unwrap();
        let yaml = temp.path().join("items.yml");
        fs::write(
            &yaml,
            "- name: Block IP\n  description: block an ip\n  intents: [containment]\n\
             - id: enrich\n",
        )
        .unwrap();
        let items = load_items(&yaml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].intents, vec!["containment".to_string()]);
        assert_eq!(items[1].id.as_deref(), Some("enrich"));

        let json = temp.path().join("items.json");
        fs::write(&json, r#"[{"name": "Enrich URL", "score": 3}]"#).unwrap();
        let items = load_items(&json).unwrap();
        assert_eq!(items[0].score, 3);
    }

    #[test]
    fn test_index_then_query() {
        let temp = TempDir::new().unwrap();
        let items = temp.path().join("items.json");
        fs::write(
            &items,
            r#"[
                {"name": "Block IP", "description": "block ip on firewall"},
                {"description": "no name"}
            ]"#,
        )
        .unwrap();
        let config = config_for(&temp);

        execute(&config, &items, "playbook", false).unwrap();

        let store = JsonPatternStore::open(&config.pattern_db).unwrap();
        let matches = store
            .query("firewall", &QueryFilter::of_type("playbook"), 5)
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Block IP");
    }

    #[test]
    fn test_rejects_unknown_type() {
        let temp = TempDir::new().unwrap();
        let items = temp.path().join("items.json");
        fs::write(&items, "[]").unwrap();
        let err = execute(&config_for(&temp), &items, "dashboard", false).unwrap_err();
        assert!(err.to_string().contains("Invalid content type"));
    }
}
