//! Session: the driver surface around a `StackLowering`.
//!
//! A session owns the output sink and the one lowering instance that
//! must serve every unit of the program. Lines are buffered and handed
//! back on `end()`.

use std::io::{BufWriter, Write};

use crate::api::TranslateOptions;
use crate::error::{TranslateError, TranslateResult};
use crate::ir::Command;
use crate::lower::StackLowering;
use crate::span::Spanned;

pub struct Session<W: Write> {
    out: BufWriter<W>,
    lowering: Box<dyn StackLowering>,
    annotate: bool,
    /// Name reported in I/O errors.
    sink_name: String,
    /// First error seen; once set every later call fails with it.
    poisoned: Option<TranslateError>,
    lines: Vec<String>,
    commands: usize,
}

impl<W: Write> Session<W> {
    /// Begin a session writing to `sink`.
    pub fn begin(sink: W, lowering: Box<dyn StackLowering>, options: &TranslateOptions) -> Self {
        Self {
            out: BufWriter::new(sink),
            lowering,
            annotate: options.annotate,
            sink_name: "<output>".to_string(),
            poisoned: None,
            lines: Vec::new(),
            commands: 0,
        }
    }

    /// Name the sink for error messages (usually the output path).
    pub fn with_sink_name(mut self, name: impl Into<String>) -> Self {
        self.sink_name = name.into();
        self
    }

    pub fn target(&self) -> &str {
        self.lowering.target()
    }

    /// Number of commands dispatched so far.
    pub fn command_count(&self) -> usize {
        self.commands
    }

    fn check(&self) -> TranslateResult<()> {
        match &self.poisoned {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: TranslateError) -> TranslateError {
        if self.poisoned.is_none() {
            self.poisoned = Some(err.clone());
        }
        err
    }

    /// Write and clear the pending lines.
    fn flush_lines(&mut self) -> TranslateResult<()> {
        let mut result = Ok(());
        for line in self.lines.drain(..) {
            if let Err(e) = writeln!(self.out, "{}", line) {
                result = Err(TranslateError::io(self.sink_name.clone(), &e));
                break;
            }
        }
        result.map_err(|e| self.fail(e))
    }

    pub fn set_unit(&mut self, unit: &str) -> TranslateResult<()> {
        self.check()?;
        self.lowering.set_unit(unit);
        Ok(())
    }

    /// Emit the entry sequence jumping to `entry`. Call before any unit.
    pub fn emit_bootstrap(&mut self, entry: &str) -> TranslateResult<()> {
        self.check()?;
        if self.annotate {
            self.lines.push(format!("// bootstrap: {}", entry));
        }
        if let Err(e) = self.lowering.bootstrap(entry, &mut self.lines) {
            self.lines.clear();
            return Err(self.fail(e));
        }
        self.flush_lines()
    }

    /// Route one command to the lowering and write its lines.
    pub fn dispatch(&mut self, cmd: &Spanned<Command>) -> TranslateResult<()> {
        self.check()?;
        if self.annotate {
            self.lines.push(format!("// {}", cmd.node));
        }
        if let Err(e) = self.lowering.lower_command(cmd, &mut self.lines) {
            self.lines.clear();
            return Err(self.fail(e));
        }
        self.commands += 1;
        self.flush_lines()
    }

    /// Dispatch every command of `commands` as unit `unit`.
    pub fn dispatch_unit(
        &mut self,
        unit: &str,
        commands: &[Spanned<Command>],
    ) -> TranslateResult<()> {
        self.set_unit(unit)?;
        for cmd in commands {
            self.dispatch(cmd)?;
        }
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn end(self) -> TranslateResult<W> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        let name = self.sink_name;
        self.out
            .into_inner()
            .map_err(|e| TranslateError::io(name, e.error()))
    }
}
