use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "vmlower",
    version,
    about = "Stack VM to Hack assembly translator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a .vm file (or directory) to assembly
    Build(cli::build::BuildArgs),
    /// Parse and lower without writing output
    Check(cli::check::CheckArgs),
    /// Translate, assemble and simulate, then print the stack
    Run(cli::run::RunArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => cli::build::cmd_build(args),
        Command::Check(args) => cli::check::cmd_check(args),
        Command::Run(args) => cli::run::cmd_run(args),
    }
}
