//! Pattern search tools.

use serde_json::{json, Value};
use tracing::warn;

use super::{PatternMatch, PatternSearch, CONTENT_TYPES, DEFAULT_RESULTS};
use crate::security::validate_choice;
use crate::tools::catalogue::{boolean, object, string};
use crate::tools::ToolArgs;

/// Upper bound on `n_results`.
pub const MAX_RESULTS: u64 = 50;

const RULE_TYPES: &[&str] = &["parsing", "modeling"];
const DIRECTIONS: &[&str] = &["incoming", "outgoing"];

/// Tools backed by [`PatternSearch`]; registered only when search is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RagTool {
    SearchPatterns,
    FindSimilarPlaybooks,
    FindSimilarScripts,
    FindIntegrationPatterns,
    FindXqlExamples,
    FindClassifierExamples,
    FindMapperExamples,
    GetPatternIndexStats,
}

impl RagTool {
    pub const ALL: [RagTool; 8] = [
        RagTool::SearchPatterns,
        RagTool::FindSimilarPlaybooks,
        RagTool::FindSimilarScripts,
        RagTool::FindIntegrationPatterns,
        RagTool::FindXqlExamples,
        RagTool::FindClassifierExamples,
        RagTool::FindMapperExamples,
        RagTool::GetPatternIndexStats,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            RagTool::SearchPatterns => "search_patterns",
            RagTool::FindSimilarPlaybooks => "find_similar_playbooks",
            RagTool::FindSimilarScripts => "find_similar_scripts",
            RagTool::FindIntegrationPatterns => "find_integration_patterns",
            RagTool::FindXqlExamples => "find_xql_examples",
            RagTool::FindClassifierExamples => "find_classifier_examples",
            RagTool::FindMapperExamples => "find_mapper_examples",
            RagTool::GetPatternIndexStats => "get_pattern_index_stats",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RagTool::SearchPatterns => {
                "Search for XSIAM content patterns using natural language. Returns playbooks, \
                 scripts, integrations, XQL rules, classifiers, and mappers that match your \
                 description. Use this to find examples and patterns for content development."
            }
            RagTool::FindSimilarPlaybooks => {
                "Find playbooks similar to a description. Use this when you need to create a new \
                 playbook and want to see how similar ones are structured."
            }
            RagTool::FindSimilarScripts => {
                "Find automation scripts similar to a description. Use this when you need to \
                 create a new script and want to see how similar functionality is implemented."
            }
            RagTool::FindIntegrationPatterns => {
                "Find integration patterns matching a description. Use this when building a new \
                 integration to see how similar APIs are handled."
            }
            RagTool::FindXqlExamples => {
                "Find XQL parsing and modeling rule examples. Use this when writing XQL queries \
                 to see correct syntax and patterns. Returns matching rules with their full \
                 XQL content."
            }
            RagTool::FindClassifierExamples => {
                "Find classifier examples for event classification. Use this when you need to \
                 classify incidents or events and want to see how similar classifiers work."
            }
            RagTool::FindMapperExamples => {
                "Find field mapper examples. Use this when you need to map fields between \
                 external systems and XSIAM incidents."
            }
            RagTool::GetPatternIndexStats => {
                "Get statistics about the pattern index. Shows how many playbooks, scripts, \
                 integrations, and other content types are indexed for search."
            }
        }
    }

    pub fn input_schema(self) -> Value {
        let n_results = json!({
            "type": "integer",
            "description": "Maximum number of results (default: 5)",
            "default": DEFAULT_RESULTS,
        });
        let include_content = |description: &str| {
            let mut schema = boolean(description);
            schema["default"] = json!(false);
            schema
        };

        match self {
            RagTool::SearchPatterns => object(
                json!({
                    "query": string("Natural language description of what you're looking for"),
                    "content_types": {
                        "type": "array",
                        "items": {"type": "string", "enum": CONTENT_TYPES},
                        "description": "Filter by content types: playbook, script, integration, \
                                        classifier, mapper, parsing_rule, modeling_rule",
                    },
                    "n_results": n_results,
                    "include_content": include_content("Include full file content in results"),
                }),
                &["query"],
            ),
            RagTool::FindSimilarPlaybooks => object(
                json!({
                    "description": string("Description of the playbook you want to create"),
                    "n_results": n_results,
                    "include_content": include_content("Include full YAML content"),
                }),
                &["description"],
            ),
            RagTool::FindSimilarScripts => object(
                json!({
                    "description": string("Description of the script functionality you need"),
                    "n_results": n_results,
                    "include_content": include_content("Include full Python/YAML content"),
                }),
                &["description"],
            ),
            RagTool::FindIntegrationPatterns => object(
                json!({
                    "description": string(
                        "Description of the integration type (e.g., 'REST API with OAuth2')"
                    ),
                    "n_results": n_results,
                    "include_content": include_content("Include full integration content"),
                }),
                &["description"],
            ),
            RagTool::FindXqlExamples => object(
                json!({
                    "description": string("Description of what the XQL should do"),
                    "rule_type": {
                        "type": "string",
                        "enum": RULE_TYPES,
                        "description": "Filter by rule type (omit for both)",
                    },
                    "n_results": n_results,
                }),
                &["description"],
            ),
            RagTool::FindClassifierExamples => object(
                json!({
                    "description": string("Description of classification needs"),
                    "n_results": n_results,
                    "include_content": include_content("Include full JSON content"),
                }),
                &["description"],
            ),
            RagTool::FindMapperExamples => object(
                json!({
                    "description": string("Description of mapping needs"),
                    "direction": {
                        "type": "string",
                        "enum": DIRECTIONS,
                        "description": "Filter by mapper direction",
                    },
                    "n_results": n_results,
                    "include_content": include_content("Include full JSON content"),
                }),
                &["description"],
            ),
            RagTool::GetPatternIndexStats => object(json!({}), &[]),
        }
    }

    /// Run the tool. Failures are reported as `{"error": "..."}`.
    pub fn call(self, search: &PatternSearch, args: &ToolArgs) -> Value {
        match self.execute(search, args) {
            Ok(value) => value,
            Err(message) => {
                warn!(tool = self.name(), error = %message, "pattern search failed");
                json!({"error": message})
            }
        }
    }

    fn execute(self, search: &PatternSearch, args: &ToolArgs) -> Result<Value, String> {
        let n = result_count(args);
        let include_content = args.bool_field("include_content");

        match self {
            RagTool::SearchPatterns => {
                let query = required_text(args, "query", "Query")?;
                let types = match args.string_list("content_types") {
                    Some(types) => {
                        for item_type in &types {
                            validate_choice(item_type, CONTENT_TYPES)
                                .map_err(|e| format!("Invalid content type. {e}"))?;
                        }
                        Some(types)
                    }
                    None => None,
                };
                let results = search
                    .search_patterns(query, n, types.as_deref(), include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(json!({
                    "query": query,
                    "result_count": results.len(),
                    "results": results,
                }))
            }
            RagTool::FindSimilarPlaybooks => {
                let description = required_text(args, "description", "Description")?;
                let matches = search
                    .find_similar_playbooks(description, n, include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(listing(description, "playbooks", matches))
            }
            RagTool::FindSimilarScripts => {
                let description = required_text(args, "description", "Description")?;
                let matches = search
                    .find_similar_scripts(description, n, include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(listing(description, "scripts", matches))
            }
            RagTool::FindIntegrationPatterns => {
                let description = required_text(args, "description", "Description")?;
                let matches = search
                    .find_integration_patterns(description, n, include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(listing(description, "integrations", matches))
            }
            RagTool::FindXqlExamples => {
                let description = required_text(args, "description", "Description")?;
                let rule_type = optional_choice(args, "rule_type", RULE_TYPES, "rule type")?;
                // XQL is only useful with its body, so content is always included.
                let rules = search
                    .find_xql_examples(description, rule_type, n, true)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(json!({
                    "query": description,
                    "rule_type": rule_type,
                    "result_count": rules.len(),
                    "rules": rules,
                }))
            }
            RagTool::FindClassifierExamples => {
                let description = required_text(args, "description", "Description")?;
                let matches = search
                    .find_classifier_examples(description, n, include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(listing(description, "classifiers", matches))
            }
            RagTool::FindMapperExamples => {
                let description = required_text(args, "description", "Description")?;
                let direction = optional_choice(args, "direction", DIRECTIONS, "direction")?;
                let mappers = search
                    .find_mapper_examples(description, direction, n, include_content)
                    .map_err(|e| format!("{e:#}"))?;
                Ok(json!({
                    "query": description,
                    "direction": direction,
                    "result_count": mappers.len(),
                    "mappers": mappers,
                }))
            }
            RagTool::GetPatternIndexStats => {
                let stats = search.index_stats().map_err(|e| format!("{e:#}"))?;
                serde_json::to_value(stats).map_err(|e| e.to_string())
            }
        }
    }
}

fn listing(query: &str, key: &str, matches: Vec<PatternMatch>) -> Value {
    let mut value = json!({
        "query": query,
        "result_count": matches.len(),
    });
    value[key] = json!(matches);
    value
}

fn required_text<'a>(args: &'a ToolArgs, key: &str, field: &str) -> Result<&'a str, String> {
    args.str_field(key).ok_or_else(|| format!("{field} is required."))
}

fn optional_choice<'a>(
    args: &'a ToolArgs,
    key: &str,
    allowed: &[&str],
    label: &str,
) -> Result<Option<&'a str>, String> {
    args.str_field(key)
        .map(|value| validate_choice(value, allowed).map_err(|e| format!("Invalid {label}. {e}")))
        .transpose()
}

/// `n_results`, clamped to `1..=MAX_RESULTS`.
fn result_count(args: &ToolArgs) -> usize {
    args.u64_field_or("n_results", DEFAULT_RESULTS as u64)
        .clamp(1, MAX_RESULTS) as usize
}
