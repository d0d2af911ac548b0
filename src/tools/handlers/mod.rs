//! Argument-vector builders for the SDK tools.
//!
//! Each handler reads its fields from [`ToolArgs`], sends every caller value
//! through exactly one validator and assembles a [`CommandSpec`] from the
//! validated values and static flags. Handlers never run anything; a
//! rejection comes back as the human-readable reason.

mod codegen;
mod content;
mod remote;
mod scaffold;

use super::args::ToolArgs;
use super::catalogue::SdkTool;
use super::guard::PathGuard;
use crate::runner::CommandSpec;
use crate::security::{
    check_insecure_flag, opaque_payload, validate_name, ACKNOWLEDGE_FIELD, MAX_NAME_LENGTH,
};

/// Outcome of a handler: the spec to run, or why the call was refused.
pub type HandlerResult = Result<CommandSpec, String>;

/// Build the command for `tool`.
pub fn build(tool: SdkTool, args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    match tool {
        SdkTool::InitPack => scaffold::init_pack(args, guard),
        SdkTool::InitIntegration => scaffold::init_integration(args),
        SdkTool::InitScript => scaffold::init_script(args),
        SdkTool::FormatContent => content::format_content(args, guard),
        SdkTool::ValidateContent => content::validate_content(args, guard),
        SdkTool::LintContent => content::lint_content(args, guard),
        SdkTool::GenerateDocs => content::generate_docs(args, guard),
        SdkTool::UploadContent => remote::upload_content(args, guard),
        SdkTool::DownloadContent => remote::download_content(args, guard),
        SdkTool::ListFiles => remote::list_files(args, guard),
        SdkTool::FindDependencies => content::find_dependencies(args, guard),
        SdkTool::UpdateReleaseNotes => content::update_release_notes(args, guard),
        SdkTool::ZipPacks => content::zip_packs(args, guard),
        SdkTool::GenerateUnitTests => content::generate_unit_tests(args, guard),
        SdkTool::GenerateTestPlaybook => content::generate_test_playbook(args, guard),
        SdkTool::GenerateOutputs => content::generate_outputs(args, guard),
        SdkTool::RunCommand => remote::run_command(args),
        SdkTool::RunPlaybook => remote::run_playbook(args),
        SdkTool::OpenapiCodegen => codegen::openapi_codegen(args, guard),
        SdkTool::PostmanCodegen => codegen::postman_codegen(args, guard),
    }
}

fn invalid_name(kind: &str) -> String {
    let subject = if kind.is_empty() {
        "name".to_string()
    } else {
        format!("{kind} name")
    };
    format!("Invalid {subject}. Use only alphanumeric characters, underscores, and hyphens.")
}

/// Required identifier field.
fn required_name<'a>(args: &'a ToolArgs, key: &str, kind: &str) -> Result<&'a str, String> {
    let value = args.str_field(key).unwrap_or_default();
    validate_name(value, MAX_NAME_LENGTH).map_err(|_| invalid_name(kind))
}

fn optional_name<'a>(args: &'a ToolArgs, key: &str, kind: &str) -> Result<Option<&'a str>, String> {
    args.str_field(key)
        .map(|value| validate_name(value, MAX_NAME_LENGTH).map_err(|_| invalid_name(kind)))
        .transpose()
}

/// Required path field; `label` is `input`, `output` and so on.
fn required_path(
    args: &ToolArgs,
    guard: &PathGuard,
    key: &str,
    label: &str,
) -> Result<String, String> {
    let value = args.str_field(key).unwrap_or_default();
    guard
        .check(value)
        .map_err(|reason| format!("Invalid {label} path. {}", capitalize(&reason.to_string())))
}

fn optional_path(
    args: &ToolArgs,
    guard: &PathGuard,
    key: &str,
    label: &str,
) -> Result<Option<String>, String> {
    match args.str_field(key) {
        Some(_) => required_path(args, guard, key, label).map(Some),
        None => Ok(None),
    }
}

/// Required pass-through field. `field` is the display name, e.g. `Command`.
fn required_payload<'a>(args: &'a ToolArgs, key: &str, field: &str) -> Result<&'a str, String> {
    let Some(value) = args.str_field(key) else {
        return Err(format!("{field} is required."));
    };
    opaque_payload(value).map_err(|reason| {
        format!(
            "Invalid {}. {}",
            field.to_lowercase(),
            capitalize(&reason.to_string())
        )
    })
}

fn optional_payload<'a>(
    args: &'a ToolArgs,
    key: &str,
    field: &str,
) -> Result<Option<&'a str>, String> {
    match args.str_field(key) {
        Some(_) => required_payload(args, key, field).map(Some),
        None => Ok(None),
    }
}

/// Consult the acknowledgment gate; returns whether `--insecure` may be added.
fn insecure_requested(args: &ToolArgs) -> Result<bool, String> {
    let insecure = args.bool_field("insecure");
    let (can_proceed, message) = check_insecure_flag(insecure, args.bool_field(ACKNOWLEDGE_FIELD));
    if !can_proceed {
        return Err(message.unwrap_or_else(|| "Insecure flag requires acknowledgment.".to_string()));
    }
    Ok(insecure)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde_json::Value;

    /// Characters-only guard, so tests see paths exactly as written.
    pub fn build_plain(tool: SdkTool, args: Value) -> HandlerResult {
        build(tool, &ToolArgs::new(args), &PathGuard::characters_only())
    }

    pub fn argv(tool: SdkTool, args: Value) -> Vec<String> {
        match build_plain(tool, args) {
            Ok(spec) => spec.args().to_vec(),
            Err(message) => panic!("{} rejected: {message}", tool.name()),
        }
    }

    pub fn rejection(tool: SdkTool, args: Value) -> String {
        match build_plain(tool, args) {
            Ok(spec) => panic!("{} accepted: {:?}", tool.name(), spec.args()),
            Err(message) => message,
        }
    }
}
