/// Target machine layout: every address and register name the lowering
/// and the simulator rely on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Short identifier used on the CLI (e.g. "hack").
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// First address of the value stack.
    pub stack_base: u16,
    /// Cells skipped above `stack_base` by the bootstrap, matching the size
    /// of a saved call frame the entry function never gets.
    pub bootstrap_reserve: u16,
    /// Base address of the `temp` segment.
    pub temp_base: u16,
    /// Base address of the `pointer` segment (the `THIS` cell).
    pub pointer_base: u16,
    /// Scratch register holding a `pop` destination address.
    pub pop_scratch: String,
    /// Scratch register holding the callee frame pointer during `return`.
    pub frame_scratch: String,
    /// Scratch register holding the return address during `return`.
    pub return_scratch: String,
    /// First address handed out to assembler variables (static cells).
    pub variable_base: u16,
    /// Largest value an address-load instruction can carry.
    pub max_constant: u16,
    /// Words of data memory available to the simulator.
    pub ram_size: usize,
    /// File extension for generated output, without the dot.
    pub output_extension: String,
}

impl MachineConfig {
    /// The standard 16-bit accumulator machine.
    pub fn hack() -> Self {
        Self {
            name: "hack".to_string(),
            display_name: "Hack".to_string(),
            stack_base: 256,
            bootstrap_reserve: 5,
            temp_base: 5,
            pointer_base: 3,
            pop_scratch: "R13".to_string(),
            frame_scratch: "R14".to_string(),
            return_scratch: "R15".to_string(),
            variable_base: 16,
            max_constant: 32767,
            ram_size: 32768,
            output_extension: "asm".to_string(),
        }
    }

    /// Resolve a built-in machine by name.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "hack" => Some(Self::hack()),
            _ => None,
        }
    }

    /// Stack pointer value the bootstrap installs, or `None` when it
    /// does not fit in an address-load instruction.
    pub fn initial_sp(&self) -> Option<u16> {
        self.stack_base
            .checked_add(self.bootstrap_reserve)
            .filter(|sp| *sp <= self.max_constant)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::hack()
    }
}
