//! Reference execution for translated programs.
//!
//! `Runner` is the seam between the translator and whatever executes its
//! output. `HackRunner` assembles and simulates Hack assembly in-process,
//! which is how translated programs are checked end to end.

pub mod assembler;
pub mod cpu;
#[cfg(test)]
mod tests;

pub use assembler::{assemble, AsmError, Program};
pub use cpu::Cpu;

use crate::config::MachineConfig;

// ─── Types ─────────────────────────────────────────────────────────

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Instructions executed.
    pub cycles: u64,
    /// False when the cycle limit was hit first.
    pub halted: bool,
}

/// A finished run: its result and final data memory.
#[derive(Clone, Debug)]
pub struct Execution {
    pub result: ExecutionResult,
    pub ram: Vec<u16>,
}

impl Execution {
    pub fn peek(&self, addr: u16) -> u16 {
        self.ram.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn sp(&self) -> u16 {
        self.peek(0)
    }

    /// Up to `n` cells below SP, topmost first.
    pub fn stack_top(&self, n: usize) -> Vec<u16> {
        let sp = self.sp();
        (1..=n as u16)
            .take_while(|i| *i <= sp)
            .map(|i| self.peek(sp - i))
            .collect()
    }

    /// `LCL ARG THIS THAT`.
    pub fn pointers(&self) -> [u16; 4] {
        [self.peek(1), self.peek(2), self.peek(3), self.peek(4)]
    }
}

// ─── Runner Trait ──────────────────────────────────────────────────

/// Execute translated target assembly.
pub trait Runner {
    fn run(&self, asm: &str, max_cycles: u64) -> Result<Execution, String>;
}

/// Assembles and simulates Hack assembly.
#[derive(Clone, Debug, Default)]
pub struct HackRunner {
    machine: MachineConfig,
    /// RAM cells set before the first instruction.
    presets: Vec<(u16, u16)>,
}

impl HackRunner {
    pub fn new(machine: MachineConfig) -> Self {
        Self {
            machine,
            presets: Vec::new(),
        }
    }

    /// Set `RAM[addr] = value` before running.
    pub fn with_ram(mut self, addr: u16, value: u16) -> Self {
        self.presets.push((addr, value));
        self
    }

    /// Preset SP and the four segment pointers, for running code that
    /// has no bootstrap.
    pub fn with_frame(self, sp: u16, lcl: u16, arg: u16, this: u16, that: u16) -> Self {
        self.with_ram(0, sp)
            .with_ram(1, lcl)
            .with_ram(2, arg)
            .with_ram(3, this)
            .with_ram(4, that)
    }

    /// Run an already assembled program.
    pub fn run_program(&self, program: &Program, max_cycles: u64) -> Result<Execution, String> {
        let mut cpu = Cpu::new(program, self.machine.ram_size);
        for &(addr, value) in &self.presets {
            cpu.poke(addr, value);
        }
        let result = cpu.run(max_cycles)?;
        Ok(Execution {
            result,
            ram: cpu.into_ram(),
        })
    }
}

impl Runner for HackRunner {
    fn run(&self, asm: &str, max_cycles: u64) -> Result<Execution, String> {
        let program = assemble(asm, &self.machine).map_err(|e| e.to_string())?;
        self.run_program(&program, max_cycles)
    }
}
