//! Integration generation from API descriptions.

use super::{optional_name, optional_path, required_path, HandlerResult};
use crate::runner::CommandSpec;
use crate::tools::args::ToolArgs;
use crate::tools::guard::PathGuard;

/// `openapi-codegen -i <input> [-o <output>] [-n <name>]`
pub fn openapi_codegen(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    codegen("openapi-codegen", args, guard)
}

/// `postman-codegen -i <input> [-o <output>] [-n <name>]`
pub fn postman_codegen(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    codegen("postman-codegen", args, guard)
}

fn codegen(subcommand: &'static str, args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let input = required_path(args, guard, "input_path", "input")?;
    let output = optional_path(args, guard, "output_path", "output")?;
    let name = optional_name(args, "name", "")?;

    Ok(CommandSpec::new(subcommand)
        .option("-i", input)
        .option_if("-o", output)
        .option_if("-n", name))
}
