//! Local content operations: format, validate, lint, docs and generators.

use super::{optional_path, optional_payload, required_name, required_path, HandlerResult};
use crate::runner::CommandSpec;
use crate::security::validate_choice;
use crate::tools::args::ToolArgs;
use crate::tools::guard::PathGuard;

/// Accepted values for `update_release_notes.version`.
pub const VERSION_BUMPS: &[&str] = &["major", "minor", "revision"];

/// `format -i <input> [-y]`; `assume_yes` defaults to true.
pub fn format_content(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;

    Ok(CommandSpec::new("format")
        .option("-i", input)
        .flag_if(args.bool_field_or("assume_yes", true), "-y"))
}

/// `validate -i <input> [-g]`
pub fn validate_content(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;

    Ok(CommandSpec::new("validate")
        .option("-i", input)
        .flag_if(args.bool_field("use_git"), "-g"))
}

/// `xsoar-lint <input>`
pub fn lint_content(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    Ok(CommandSpec::new("xsoar-lint").arg(input))
}

/// `generate-docs -i <input> [-o <output>] [-f]`
pub fn generate_docs(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let output = optional_path(args, guard, "output_path", "output")?;

    Ok(CommandSpec::new("generate-docs")
        .option("-i", input)
        .option_if("-o", output)
        .flag_if(args.bool_field("force"), "-f"))
}

/// `find-dependencies -i <input> [--update-pack-metadata]`
pub fn find_dependencies(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;

    Ok(CommandSpec::new("find-dependencies")
        .option("-i", input)
        .flag_if(args.bool_field("update_pack_metadata"), "--update-pack-metadata"))
}

/// `update-release-notes -i <input> [-v <bump>] [--text <text>]`
///
/// The release-note text is forwarded as-is.
pub fn update_release_notes(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let version = args
        .str_field("version")
        .map(|v| {
            validate_choice(v, VERSION_BUMPS)
                .map_err(|_| "Invalid version. Must be: major, minor, or revision.".to_string())
        })
        .transpose()?;
    let text = optional_payload(args, "text", "Text")?;

    Ok(CommandSpec::new("update-release-notes")
        .option("-i", input)
        .option_if("-v", version)
        .option_if("--text", text))
}

/// `zip-packs -i <input> -o <output>`
pub fn zip_packs(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let output = required_path(args, guard, "output_path", "output")?;

    Ok(CommandSpec::new("zip-packs")
        .option("-i", input)
        .option("-o", output))
}

/// `generate-unit-tests -i <input> [-o <output>]`
pub fn generate_unit_tests(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let output = optional_path(args, guard, "output_path", "output")?;

    Ok(CommandSpec::new("generate-unit-tests")
        .option("-i", input)
        .option_if("-o", output))
}

/// `generate-test-playbook -i <input> [-o <output>]`
pub fn generate_test_playbook(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let output = optional_path(args, guard, "output_path", "output")?;

    Ok(CommandSpec::new("generate-test-playbook")
        .option("-i", input)
        .option_if("-o", output))
}

/// `generate-outputs -i <input> -c <command> [-j <json>]`
pub fn generate_outputs(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let command = required_name(args, "command", "command")?;
    let json = optional_path(args, guard, "json_path", "JSON")?;

    Ok(CommandSpec::new("generate-outputs")
        .option("-i", input)
        .option("-c", command)
        .option_if("-j", json))
}
