use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{Bootstrap, MachineConfig, Project};
use crate::diagnostic::Diagnostic;
use crate::error::{TranslateError, TranslateResult};
use crate::ir::Command;
use crate::lower::create_stack_lowering;
use crate::session::Session;
use crate::syntax::CommandSource;


/// Source file extension the translator reads.
pub const SOURCE_EXTENSION: &str = "vm";

/// Options controlling translation: target, machine layout, entry sequence.
#[derive(Clone, Debug)]
pub struct TranslateOptions {
    /// Lowering target name (e.g. "hack").
    pub target: String,
    /// Target machine layout.
    pub machine: MachineConfig,
    /// When to emit the bootstrap.
    pub bootstrap: Bootstrap,
    /// Function the bootstrap jumps to.
    pub entry: String,
    /// Write `// <command>` before each command's lines.
    pub annotate: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            target: "hack".to_string(),
            machine: MachineConfig::hack(),
            bootstrap: Bootstrap::Auto,
            entry: "Sys.init".to_string(),
            annotate: false,
        }
    }
}

impl TranslateOptions {
    /// Fill in whatever the project file sets.
    pub fn with_project(mut self, project: &Project) -> Self {
        if let Some(target) = &project.target {
            self.target = target.clone();
            if let Some(machine) = MachineConfig::resolve(target) {
                self.machine = machine;
            }
        }
        if let Some(entry) = &project.entry {
            self.entry = entry.clone();
        }
        if let Some(bootstrap) = project.bootstrap {
            self.bootstrap = bootstrap;
        }
        if let Some(annotate) = project.annotate {
            self.annotate = annotate;
        }
        if let Some(stack_base) = project.stack_base {
            self.machine.stack_base = stack_base;
        }
        self
    }
}

/// One named unit of VM source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    /// Unit name; qualifies the unit's `static` symbols.
    pub name: String,
    pub source: String,
    /// File the unit was read from, if any.
    pub path: Option<PathBuf>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            path: None,
        }
    }

    /// Read a `.vm` file; the unit name is the file stem.
    pub fn load(path: &Path) -> TranslateResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| TranslateError::io(path.display().to_string(), &e))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            source,
            path: Some(path.to_path_buf()),
        })
    }

    /// File name to show in diagnostics.
    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }
}

/// The units behind one input path.
#[derive(Clone, Debug)]
pub struct Input {
    /// The file or directory as given.
    pub path: PathBuf,
    /// Units in translation order.
    pub units: Vec<SourceUnit>,
    pub is_directory: bool,
}

impl Input {
    /// Discover the units for `path`: a single `.vm` file, or every `.vm`
    /// file directly inside a directory, sorted by file name.
    pub fn discover(path: &Path) -> TranslateResult<Input> {
        let display = path.display().to_string();
        let meta = std::fs::metadata(path).map_err(|e| TranslateError::io(display.clone(), &e))?;

        if !meta.is_dir() {
            if !has_source_extension(path) {
                return Err(TranslateError::Io {
                    path: display,
                    message: format!("expected a .{} file or a directory", SOURCE_EXTENSION),
                });
            }
            return Ok(Input {
                path: path.to_path_buf(),
                units: vec![SourceUnit::load(path)?],
                is_directory: false,
            });
        }

        let entries =
            std::fs::read_dir(path).map_err(|e| TranslateError::io(display.clone(), &e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TranslateError::io(display.clone(), &e))?;
            let file = entry.path();
            if file.is_file() && has_source_extension(&file) {
                files.push(file);
            }
        }
        if files.is_empty() {
            return Err(TranslateError::Io {
                path: display,
                message: format!("no .{} files found", SOURCE_EXTENSION),
            });
        }
        files.sort();

        let units = files
            .iter()
            .map(|f| SourceUnit::load(f))
            .collect::<TranslateResult<Vec<_>>>()?;
        Ok(Input {
            path: path.to_path_buf(),
            units,
            is_directory: true,
        })
    }

    /// `<file>.<ext>` for a file, `<dir>/<dirname>.<ext>` for a directory.
    pub fn default_output(&self, extension: &str) -> PathBuf {
        if !self.is_directory {
            return self.path.with_extension(extension);
        }
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| {
                let full = self.path.canonicalize().ok()?;
                full.file_name().map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "out".to_string());
        self.path.join(format!("{}.{}", name, extension))
    }

    /// Look up a unit by name, e.g. to render an error against its source.
    pub fn unit(&self, name: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.name == name)
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

/// Result of translating one input.
#[derive(Clone, Debug)]
pub struct Translation {
    pub output: PathBuf,
    pub asm: String,
    /// Unit names in the order they were translated.
    pub units: Vec<String>,
    pub bootstrap: bool,
    pub commands: usize,
}

impl Translation {
    /// Write the assembly to `self.output`, creating parent directories.
    pub fn write(&self) -> TranslateResult<()> {
        let display = self.output.display().to_string();
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TranslateError::io(display.clone(), &e))?;
            }
        }
        std::fs::write(&self.output, &self.asm).map_err(|e| TranslateError::io(display, &e))
    }
}

/// Translate a single unit of VM source, without a bootstrap.
pub fn translate(source: &str, unit: &str) -> TranslateResult<String> {
    let options = TranslateOptions {
        bootstrap: Bootstrap::Never,
        ..TranslateOptions::default()
    };
    translate_units(&[SourceUnit::new(unit, source)], &options)
}

/// Translate units as one program. A list of units counts as a whole
/// program, so `Bootstrap::Auto` emits the bootstrap.
pub fn translate_units(
    units: &[SourceUnit],
    options: &TranslateOptions,
) -> TranslateResult<String> {
    run_session(units, options, options.bootstrap.enabled(true)).map(|(asm, _)| asm)
}

/// Translate a file or directory.
pub fn translate_path(path: &Path, options: &TranslateOptions) -> TranslateResult<Translation> {
    let input = Input::discover(path)?;
    translate_input(&input, options)
}

/// Translate already discovered input.
pub fn translate_input(input: &Input, options: &TranslateOptions) -> TranslateResult<Translation> {
    let bootstrap = options.bootstrap.enabled(input.is_directory);
    let (asm, commands) = run_session(&input.units, options, bootstrap)?;
    Ok(Translation {
        output: input.default_output(&options.machine.output_extension),
        asm,
        units: input.units.iter().map(|u| u.name.clone()).collect(),
        bootstrap,
        commands,
    })
}

/// Parse and lower every unit through one session into `sink`. Stops at
/// the first error.
fn drive<W: Write>(
    sink: W,
    units: &[SourceUnit],
    options: &TranslateOptions,
    bootstrap: bool,
) -> TranslateResult<(W, usize)> {
    let lowering = create_stack_lowering(&options.target, options.machine.clone())?;
    let mut session = Session::begin(sink, lowering, options);

    if bootstrap {
        session.emit_bootstrap(&options.entry)?;
    }
    for unit in units {
        session.set_unit(&unit.name)?;
        for cmd in CommandSource::new(&unit.source, &unit.name) {
            session.dispatch(&cmd?)?;
        }
    }

    let commands = session.command_count();
    Ok((session.end()?, commands))
}

fn run_session(
    units: &[SourceUnit],
    options: &TranslateOptions,
    bootstrap: bool,
) -> TranslateResult<(String, usize)> {
    let (bytes, commands) = drive(Vec::new(), units, options, bootstrap)?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), commands))
}

/// Parse and lower without producing output. Returns the command count.
pub fn check_input(input: &Input, options: &TranslateOptions) -> TranslateResult<usize> {
    let bootstrap = options.bootstrap.enabled(input.is_directory);
    drive(std::io::sink(), &input.units, options, bootstrap).map(|(_, commands)| commands)
}

/// Warnings for one unit. Flow commands ahead of the first `function` are
/// scoped to the unit, so a jump there cannot reach a label inside a
/// function.
pub fn lint_unit(unit: &SourceUnit) -> TranslateResult<Vec<Diagnostic>> {
    let mut warnings = Vec::new();
    for cmd in CommandSource::new(&unit.source, &unit.name) {
        let cmd = cmd?;
        let label = match &cmd.node {
            Command::Function { .. } => break,
            Command::Label(label) | Command::Goto(label) | Command::IfGoto(label) => label,
            _ => continue,
        };
        warnings.push(
            Diagnostic::warning(format!("'{}' comes before any function", cmd.node), cmd.span)
                .with_note(format!("scoped to the unit as {}$${}", unit.name, label)),
        );
    }
    Ok(warnings)
}
