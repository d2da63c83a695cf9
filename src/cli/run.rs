use std::path::PathBuf;
use std::process;

use clap::Args;

use vmlower::runtime::{HackRunner, Runner};

use super::{resolve_input, resolve_options, TranslateArgs};

#[derive(Args)]
pub struct RunArgs {
    /// Input .vm file or directory of .vm files
    pub input: PathBuf,
    /// Stop after this many instructions
    #[arg(long, default_value_t = 1_000_000)]
    pub cycles: u64,
    /// Number of stack cells to print, topmost first
    #[arg(long, default_value_t = 1)]
    pub show: usize,
    #[command(flatten)]
    pub translate: TranslateArgs,
}

pub fn cmd_run(args: RunArgs) {
    let ri = resolve_input(&args.input);
    let options = resolve_options(&args.translate, ri.project.as_ref());

    let translation = match vmlower::translate_input(&ri.input, &options) {
        Ok(t) => t,
        Err(e) => {
            vmlower::report_error(&e, Some(&ri.input));
            process::exit(1);
        }
    };

    // Without a bootstrap nothing sets SP, so start the stack at its base.
    let mut runner = HackRunner::new(options.machine.clone());
    if !translation.bootstrap {
        runner = runner.with_ram(0, options.machine.stack_base);
    }

    let execution = match runner.run(&translation.asm, args.cycles) {
        Ok(e) => e,
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(1);
        }
    };

    if execution.result.halted {
        eprintln!("Halted after {} cycles", execution.result.cycles);
    } else {
        eprintln!(
            "warning: stopped at the {} cycle limit without halting",
            execution.result.cycles
        );
    }

    let [lcl, arg, this, that] = execution.pointers();
    println!("SP   = {}", execution.sp());
    println!("LCL  = {}  ARG = {}  THIS = {}  THAT = {}", lcl, arg, this, that);
    for (depth, value) in execution.stack_top(args.show).iter().enumerate() {
        println!("[SP-{}] = {} ({})", depth + 1, value, *value as i16);
    }
}
