//! Operations against a remote XSIAM/XSOAR instance.
//!
//! Upload and listing can disable TLS verification, so they go through the
//! acknowledgment gate before anything else is assembled.

use super::{
    insecure_requested, optional_path, optional_payload, required_path, required_payload,
    HandlerResult,
};
use crate::runner::CommandSpec;
use crate::tools::args::ToolArgs;
use crate::tools::guard::PathGuard;

/// `upload -i <input> [--insecure]`
pub fn upload_content(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let insecure = insecure_requested(args)?;

    Ok(CommandSpec::new("upload")
        .option("-i", input)
        .flag_if(insecure, "--insecure"))
}

/// `download -o <output> [-i <input>] [-a]`
///
/// `-i` names an item on the remote instance rather than a local file, so it
/// is character-filtered but never confined to the content root.
pub fn download_content(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let output = required_path(args, guard, "output_path", "output")?;
    let input = optional_path(args, &PathGuard::characters_only(), "input_path", "input")?;

    Ok(CommandSpec::new("download")
        .option("-o", output)
        .option_if("-i", input)
        .flag_if(args.bool_field("all_content"), "-a"))
}

/// `download -lf [-o <output>] [--insecure]`
pub fn list_files(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let insecure = insecure_requested(args)?;
    let output = optional_path(args, guard, "output_path", "output")?;

    Ok(CommandSpec::new("download")
        .flag("-lf")
        .option_if("-o", output)
        .flag_if(insecure, "--insecure"))
}

/// `run -q <command> [--args <json>]`
///
/// The command text is handed to the remote instance as data. Its arguments
/// must be a well-formed JSON document.
pub fn run_command(args: &ToolArgs) -> HandlerResult {
    let command = required_payload(args, "command", "Command")?;
    let command_args = optional_payload(args, "args", "Args")?;
    if let Some(raw) = command_args {
        if serde_json::from_str::<serde_json::Value>(raw).is_err() {
            return Err("Invalid args. Must be a JSON string.".to_string());
        }
    }

    Ok(CommandSpec::new("run")
        .option("-q", command)
        .option_if("--args", command_args))
}

/// `run-playbook -p <playbook_id> [--wait]`
pub fn run_playbook(args: &ToolArgs) -> HandlerResult {
    let playbook_id = required_payload(args, "playbook_id", "Playbook ID")?;

    Ok(CommandSpec::new("run-playbook")
        .option("-p", playbook_id)
        .flag_if(args.bool_field("wait"), "--wait"))
}
