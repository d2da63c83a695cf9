//! StackLowering: turns VM commands into target assembly lines.
//!
//! A lowering owns the translation state for a whole session. The session
//! feeds it one command at a time and writes out whatever lines it appends.

mod hack;

pub use hack::HackLowering;

use crate::config::MachineConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::ir::Command;
use crate::span::Spanned;

/// Lowers VM commands into target assembly lines.
pub trait StackLowering {
    /// Target name (e.g. "hack").
    fn target(&self) -> &str;

    /// Start a new source unit: rescopes `static` symbols and clears the
    /// current function.
    fn set_unit(&mut self, unit: &str);

    /// Emit the program entry sequence that jumps to `entry`.
    fn bootstrap(&mut self, entry: &str, out: &mut Vec<String>) -> TranslateResult<()>;

    /// Append the lines for one command.
    fn lower_command(&mut self, cmd: &Spanned<Command>, out: &mut Vec<String>)
        -> TranslateResult<()>;

    /// Lower a whole unit.
    fn lower_unit(
        &mut self,
        unit: &str,
        cmds: &[Spanned<Command>],
    ) -> TranslateResult<Vec<String>> {
        self.set_unit(unit);
        let mut out = Vec::new();
        for cmd in cmds {
            self.lower_command(cmd, &mut out)?;
        }
        Ok(out)
    }
}

/// Create a stack lowering backend for the given target name.
pub fn create_stack_lowering(
    target: &str,
    machine: MachineConfig,
) -> TranslateResult<Box<dyn StackLowering>> {
    match target {
        "hack" => Ok(Box::new(HackLowering::new(machine))),
        other => Err(TranslateError::UnknownTarget(other.to_string())),
    }
}
