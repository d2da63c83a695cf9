pub mod build;
pub mod check;
pub mod run;

use std::path::Path;
use std::process;

use clap::Args;

use vmlower::config::Bootstrap;
use vmlower::project::Project;
use vmlower::{Input, TranslateOptions};

/// Flags shared by every subcommand that translates.
#[derive(Args)]
pub struct TranslateArgs {
    /// When to emit the bootstrap (default: auto, only for directories)
    #[arg(long, value_parser = ["auto", "always", "never"])]
    pub bootstrap: Option<String>,
    /// Function the bootstrap jumps to (default: Sys.init)
    #[arg(long)]
    pub entry: Option<String>,
    /// Write each VM command as a comment above its assembly
    #[arg(long)]
    pub annotate: bool,
    /// Target machine (default: hack)
    #[arg(long)]
    pub target: Option<String>,
}

/// Resolved input: discovered units and optional project.
pub struct ResolvedInput {
    pub input: Input,
    pub project: Option<Project>,
}

fn load_project(toml_path: &Path) -> Project {
    match Project::load(toml_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Discover the units behind an input path and the nearest vmlower.toml
/// at or above it.
pub fn resolve_input(path: &Path) -> ResolvedInput {
    let input = match Input::discover(path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let search_from = if input.is_directory {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    let project = Project::find(search_from).map(|p| load_project(&p));

    ResolvedInput { input, project }
}

/// Project file first, then command-line flags on top.
pub fn resolve_options(args: &TranslateArgs, project: Option<&Project>) -> TranslateOptions {
    let mut options = match project {
        Some(project) => TranslateOptions::default().with_project(project),
        None => TranslateOptions::default(),
    };
    if let Some(target) = &args.target {
        options.target = target.clone();
    }
    if let Some(bootstrap) = args.bootstrap.as_deref().and_then(Bootstrap::parse) {
        options.bootstrap = bootstrap;
    }
    if let Some(entry) = &args.entry {
        options.entry = entry.clone();
    }
    if args.annotate {
        options.annotate = true;
    }
    options
}
