use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{resolve_input, resolve_options, TranslateArgs};

#[derive(Args)]
pub struct BuildArgs {
    /// Input .vm file or directory of .vm files
    pub input: PathBuf,
    /// Output .asm file (default: <file>.asm or <dir>/<dir>.asm)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub translate: TranslateArgs,
}

pub fn cmd_build(args: BuildArgs) {
    let ri = resolve_input(&args.input);
    let options = resolve_options(&args.translate, ri.project.as_ref());

    let mut translation = match vmlower::translate_input(&ri.input, &options) {
        Ok(t) => t,
        Err(e) => {
            vmlower::report_error(&e, Some(&ri.input));
            process::exit(1);
        }
    };

    let project_output = ri.project.as_ref().and_then(|p| p.output_path());
    if let Some(out) = args.output.or(project_output) {
        translation.output = out;
    }
    if let Err(e) = translation.write() {
        vmlower::report_error(&e, None);
        process::exit(1);
    }

    eprintln!(
        "Translated {} unit{} ({} commands{}) -> {}",
        translation.units.len(),
        if translation.units.len() == 1 { "" } else { "s" },
        translation.commands,
        if translation.bootstrap { ", bootstrap" } else { "" },
        translation.output.display()
    );
}
