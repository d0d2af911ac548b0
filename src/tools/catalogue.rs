//! Declarative catalogue of the SDK tools.

use serde_json::{json, Value};

use crate::security::ACKNOWLEDGE_FIELD;

/// The SDK operations exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkTool {
    InitPack,
    InitIntegration,
    InitScript,
    FormatContent,
    ValidateContent,
    LintContent,
    GenerateDocs,
    UploadContent,
    DownloadContent,
    ListFiles,
    FindDependencies,
    UpdateReleaseNotes,
    ZipPacks,
    GenerateUnitTests,
    GenerateTestPlaybook,
    GenerateOutputs,
    RunCommand,
    RunPlaybook,
    OpenapiCodegen,
    PostmanCodegen,
}

impl SdkTool {
    pub const ALL: [SdkTool; 20] = [
        SdkTool::InitPack,
        SdkTool::InitIntegration,
        SdkTool::InitScript,
        SdkTool::FormatContent,
        SdkTool::ValidateContent,
        SdkTool::LintContent,
        SdkTool::GenerateDocs,
        SdkTool::UploadContent,
        SdkTool::DownloadContent,
        SdkTool::ListFiles,
        SdkTool::FindDependencies,
        SdkTool::UpdateReleaseNotes,
        SdkTool::ZipPacks,
        SdkTool::GenerateUnitTests,
        SdkTool::GenerateTestPlaybook,
        SdkTool::GenerateOutputs,
        SdkTool::RunCommand,
        SdkTool::RunPlaybook,
        SdkTool::OpenapiCodegen,
        SdkTool::PostmanCodegen,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            SdkTool::InitPack => "init_pack",
            SdkTool::InitIntegration => "init_integration",
            SdkTool::InitScript => "init_script",
            SdkTool::FormatContent => "format_content",
            SdkTool::ValidateContent => "validate_content",
            SdkTool::LintContent => "lint_content",
            SdkTool::GenerateDocs => "generate_docs",
            SdkTool::UploadContent => "upload_content",
            SdkTool::DownloadContent => "download_content",
            SdkTool::ListFiles => "list_files",
            SdkTool::FindDependencies => "find_dependencies",
            SdkTool::UpdateReleaseNotes => "update_release_notes",
            SdkTool::ZipPacks => "zip_packs",
            SdkTool::GenerateUnitTests => "generate_unit_tests",
            SdkTool::GenerateTestPlaybook => "generate_test_playbook",
            SdkTool::GenerateOutputs => "generate_outputs",
            SdkTool::RunCommand => "run_command",
            SdkTool::RunPlaybook => "run_playbook",
            SdkTool::OpenapiCodegen => "openapi_codegen",
            SdkTool::PostmanCodegen => "postman_codegen",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SdkTool::InitPack => "Create a new XSIAM content pack with proper structure",
            SdkTool::InitIntegration => "Scaffold a new integration within a pack",
            SdkTool::InitScript => "Scaffold a new script within a pack",
            SdkTool::FormatContent => "Standardise YAML and Python formatting for content",
            SdkTool::ValidateContent => "Check content validity against XSIAM standards",
            SdkTool::LintContent => "Run XSOAR linter code quality checks on content",
            SdkTool::GenerateDocs => "Generate README documentation for content",
            SdkTool::UploadContent => "Deploy content to XSIAM/XSOAR instance",
            SdkTool::DownloadContent => "Download content from XSIAM/XSOAR instance",
            SdkTool::ListFiles => {
                "List all custom content items available to download \
                 (demisto-sdk download --list-files)"
            }
            SdkTool::FindDependencies => "Analyse and list pack dependencies",
            SdkTool::UpdateReleaseNotes => "Update or create release notes for version changes",
            SdkTool::ZipPacks => "Create distributable pack archives",
            SdkTool::GenerateUnitTests => "Generate unit test scaffolds for integrations/scripts",
            SdkTool::GenerateTestPlaybook => "Generate a test playbook for an integration",
            SdkTool::GenerateOutputs => "Generate context outputs from JSON response",
            SdkTool::RunCommand => "Execute a command on XSIAM/XSOAR instance",
            SdkTool::RunPlaybook => "Run a playbook on XSIAM/XSOAR instance",
            SdkTool::OpenapiCodegen => "Generate integration from OpenAPI specification",
            SdkTool::PostmanCodegen => "Generate integration from Postman collection",
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn input_schema(self) -> Value {
        match self {
            SdkTool::InitPack => object(
                json!({
                    "name": string("Name of the pack to create"),
                    "output_dir": string("Output directory (defaults to Packs/)"),
                }),
                &["name"],
            ),
            SdkTool::InitIntegration => object(
                json!({
                    "name": string("Name of the integration"),
                    "pack": string("Target pack name"),
                    "template": string("Template type: HelloWorld, FeedHelloWorld, HelloIAMWorld"),
                }),
                &["name", "pack"],
            ),
            SdkTool::InitScript => object(
                json!({
                    "name": string("Name of the script"),
                    "pack": string("Target pack name"),
                }),
                &["name", "pack"],
            ),
            SdkTool::FormatContent => object(
                json!({
                    "input_path": string("Path to content file or directory"),
                    "assume_yes": {
                        "type": "boolean",
                        "description": "Auto-accept changes",
                        "default": true,
                    },
                }),
                &["input_path"],
            ),
            SdkTool::ValidateContent => object(
                json!({
                    "input_path": string("Path to content file or directory"),
                    "use_git": boolean("Validate only changed files"),
                }),
                &["input_path"],
            ),
            SdkTool::LintContent => object(
                json!({"input_path": string("Path to content file or directory")}),
                &["input_path"],
            ),
            SdkTool::GenerateDocs => object(
                json!({
                    "input_path": string("Path to content YML file"),
                    "output_path": string("Output path for README"),
                    "force": boolean("Overwrite existing documentation"),
                }),
                &["input_path"],
            ),
            SdkTool::UploadContent => {
                let mut properties = json!({"input_path": string("Path to content to upload")});
                add_insecure_properties(&mut properties);
                object(properties, &["input_path"])
            }
            SdkTool::DownloadContent => object(
                json!({
                    "output_path": string("Output directory for downloaded content"),
                    "input_path": string("Specific content to download"),
                    "all_content": boolean("Download all custom content"),
                }),
                &["output_path"],
            ),
            SdkTool::ListFiles => {
                let mut properties = json!({
                    "output_path": string(
                        "Optional output path (demisto-sdk -o). Listing does not write content."
                    ),
                });
                add_insecure_properties(&mut properties);
                object(properties, &[])
            }
            SdkTool::FindDependencies => object(
                json!({
                    "input_path": string("Path to pack"),
                    "update_pack_metadata": boolean("Update pack_metadata.json"),
                }),
                &["input_path"],
            ),
            SdkTool::UpdateReleaseNotes => object(
                json!({
                    "input_path": string("Path to pack"),
                    "version": {
                        "type": "string",
                        "enum": ["major", "minor", "revision"],
                        "description": "Version type: major, minor, revision",
                    },
                    "text": string("Release notes text"),
                }),
                &["input_path"],
            ),
            SdkTool::ZipPacks => object(
                json!({
                    "input_path": string("Path to pack(s) to zip"),
                    "output_path": string("Output directory for zip files"),
                }),
                &["input_path", "output_path"],
            ),
            SdkTool::GenerateUnitTests => object(
                json!({
                    "input_path": string("Path to integration/script"),
                    "output_path": string("Output path for test file"),
                }),
                &["input_path"],
            ),
            SdkTool::GenerateTestPlaybook => object(
                json!({
                    "input_path": string("Path to integration YML"),
                    "output_path": string("Output path for test playbook"),
                }),
                &["input_path"],
            ),
            SdkTool::GenerateOutputs => object(
                json!({
                    "input_path": string("Path to integration YML"),
                    "command": string("Command name to generate outputs for"),
                    "json_path": string("Path to JSON response file"),
                }),
                &["input_path", "command"],
            ),
            SdkTool::RunCommand => object(
                json!({
                    "command": string("Command to execute"),
                    "args": string("Command arguments as JSON string"),
                }),
                &["command"],
            ),
            SdkTool::RunPlaybook => object(
                json!({
                    "playbook_id": string("ID of playbook to run"),
                    "wait": boolean("Wait for playbook completion"),
                }),
                &["playbook_id"],
            ),
            SdkTool::OpenapiCodegen => object(
                json!({
                    "input_path": string("Path to OpenAPI spec file"),
                    "output_path": string("Output directory"),
                    "name": string("Integration name"),
                }),
                &["input_path"],
            ),
            SdkTool::PostmanCodegen => object(
                json!({
                    "input_path": string("Path to Postman collection JSON"),
                    "output_path": string("Output directory"),
                    "name": string("Integration name"),
                }),
                &["input_path"],
            ),
        }
    }

    /// Whether the tool talks to a remote instance and can disable TLS verification.
    pub fn accepts_insecure(self) -> bool {
        matches!(self, SdkTool::UploadContent | SdkTool::ListFiles)
    }
}

/// `{"name", "description", "inputSchema"}` entry for `tools/list`.
pub fn tool_definition(name: &str, description: &str, input_schema: Value) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": input_schema,
    })
}

pub(crate) fn object(properties: Value, required: &[&str]) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

pub(crate) fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

pub(crate) fn boolean(description: &str) -> Value {
    json!({"type": "boolean", "description": description})
}

fn add_insecure_properties(properties: &mut Value) {
    properties["insecure"] =
        boolean("Skip SSL verification (DANGEROUS: exposes credentials to MITM attacks)");
    properties[ACKNOWLEDGE_FIELD] =
        boolean("Required if insecure=true. Confirms you accept the security risk.");
}
