use std::path::{Path, PathBuf};

use crate::config::{Bootstrap, MachineConfig};
use crate::error::TranslateError;

pub const PROJECT_FILE: &str = "vmlower.toml";

/// Optional per-program settings from vmlower.toml.
///
/// Every field is optional; unset fields fall back to the command line
/// or to `TranslateOptions::default()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Project {
    pub name: Option<String>,
    pub root_dir: PathBuf,
    /// Function the bootstrap jumps to.
    pub entry: Option<String>,
    /// Output path, relative to the project root.
    pub output: Option<PathBuf>,
    pub bootstrap: Option<Bootstrap>,
    pub annotate: Option<bool>,
    pub target: Option<String>,
    /// `[machine] stack_base` override.
    pub stack_base: Option<u16>,
}

impl Project {
    /// Load a project from a vmlower.toml file.
    pub fn load(toml_path: &Path) -> Result<Project, TranslateError> {
        let content = std::fs::read_to_string(toml_path)
            .map_err(|e| TranslateError::io(toml_path.display().to_string(), &e))?;
        let root_dir = toml_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::parse(&content, toml_path, root_dir)
    }

    fn parse(
        content: &str,
        toml_path: &Path,
        root_dir: PathBuf,
    ) -> Result<Project, TranslateError> {
        let err = |msg: String| TranslateError::Config {
            path: toml_path.display().to_string(),
            message: msg,
        };

        let mut project = Project {
            root_dir,
            ..Project::default()
        };
        let mut current_section = String::new();

        // Section-aware minimal TOML parsing
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(err(format!("line {}: expected 'key = value'", idx + 1)));
            };
            let key = key.trim().trim_matches('"');
            let raw = strip_comment(value.trim());
            let value = raw.trim_matches('"');

            match (current_section.as_str(), key) {
                ("project", "name") => project.name = Some(value.to_string()),
                ("project", "entry") => project.entry = Some(value.to_string()),
                ("project", "output") => project.output = Some(PathBuf::from(value)),
                ("project", "target") => project.target = Some(value.to_string()),
                ("project", "bootstrap") => {
                    project.bootstrap = Some(Bootstrap::parse(value).ok_or_else(|| {
                        err(format!(
                            "bootstrap must be \"auto\", \"always\" or \"never\", found {}",
                            raw
                        ))
                    })?)
                }
                ("project", "annotate") => {
                    project.annotate = Some(match value {
                        "true" => true,
                        "false" => false,
                        _ => return Err(err(format!("annotate must be a boolean, found {}", raw))),
                    })
                }
                ("machine", "stack_base") => {
                    project.stack_base = Some(value.parse().map_err(|_| {
                        err(format!("stack_base must be an integer, found {}", raw))
                    })?)
                }
                _ => {}
            }
        }

        if let Some(stack_base) = project.stack_base {
            let mut machine = project
                .target
                .as_deref()
                .and_then(MachineConfig::resolve)
                .unwrap_or_default();
            machine.stack_base = stack_base;
            if machine.initial_sp().is_none() {
                return Err(err(format!(
                    "stack_base {} leaves no room for {} reserved cells below {}",
                    stack_base, machine.bootstrap_reserve, machine.max_constant
                )));
            }
        }

        Ok(project)
    }

    /// The configured output path, resolved against the project root.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.as_ref().map(|o| self.root_dir.join(o))
    }

    /// Try to find a vmlower.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(PROJECT_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// Drop a trailing `# comment` outside of a quoted string.
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim_end(),
            _ => {}
        }
    }
    value
}
