//! Pack, integration and script scaffolding.

use super::{optional_name, optional_path, required_name, HandlerResult};
use crate::runner::CommandSpec;
use crate::tools::args::ToolArgs;
use crate::tools::guard::PathGuard;

/// `init --pack -n <name> [-o <output_dir>]`
pub fn init_pack(args: &ToolArgs, guard: &PathGuard) -> HandlerResult {
    let name = required_name(args, "name", "pack")?;
    let output_dir = optional_path(args, guard, "output_dir", "output directory")?;

    Ok(CommandSpec::new("init")
        .flag("--pack")
        .option("-n", name)
        .option_if("-o", output_dir))
}

/// `init --integration -n <name> -p <pack> [--template <template>]`
pub fn init_integration(args: &ToolArgs) -> HandlerResult {
    let name = required_name(args, "name", "integration")?;
    let pack = required_name(args, "pack", "pack")?;
    let template = optional_name(args, "template", "template")?;

    Ok(CommandSpec::new("init")
        .flag("--integration")
        .option("-n", name)
        .option("-p", pack)
        .option_if("--template", template))
}

/// `init --script -n <name> -p <pack>`
pub fn init_script(args: &ToolArgs) -> HandlerResult {
    let name = required_name(args, "name", "script")?;
    let pack = required_name(args, "pack", "pack")?;

    Ok(CommandSpec::new("init")
        .flag("--script")
        .option("-n", name)
        .option("-p", pack))
}
