use std::path::PathBuf;
use std::process;

use clap::Args;

use vmlower::diagnostic::render_diagnostics;

use super::{resolve_input, resolve_options, TranslateArgs};

#[derive(Args)]
pub struct CheckArgs {
    /// Input .vm file or directory of .vm files
    pub input: PathBuf,
    #[command(flatten)]
    pub translate: TranslateArgs,
}

pub fn cmd_check(args: CheckArgs) {
    let ri = resolve_input(&args.input);
    let options = resolve_options(&args.translate, ri.project.as_ref());

    match vmlower::check_input(&ri.input, &options) {
        Ok(commands) => {
            for unit in &ri.input.units {
                if let Ok(warnings) = vmlower::lint_unit(unit) {
                    render_diagnostics(&warnings, &unit.display_name(), &unit.source);
                }
            }
            eprintln!("OK: {} ({} commands)", args.input.display(), commands)
        }
        Err(e) => {
            vmlower::report_error(&e, Some(&ri.input));
            process::exit(1);
        }
    }
}
