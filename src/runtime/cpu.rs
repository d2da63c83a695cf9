//! Cycle-level Hack CPU: A, D, PC registers over 16-bit wrapping words.

use super::assembler::Program;
use super::ExecutionResult;

const C_INSTRUCTION: u16 = 0x8000;
const JUMP_ALWAYS: u16 = 0b111;

pub struct Cpu {
    rom: Vec<u16>,
    ram: Vec<u16>,
    a: u16,
    d: u16,
    pc: u16,
}

/// Hack ALU: `bits` holds zx nx zy ny f no, high to low.
fn alu(x: u16, y: u16, bits: u16) -> u16 {
    let mut x = if bits & 0b100000 != 0 { 0 } else { x };
    if bits & 0b010000 != 0 {
        x = !x;
    }
    let mut y = if bits & 0b001000 != 0 { 0 } else { y };
    if bits & 0b000100 != 0 {
        y = !y;
    }
    let out = if bits & 0b000010 != 0 {
        x.wrapping_add(y)
    } else {
        x & y
    };
    if bits & 0b000001 != 0 {
        !out
    } else {
        out
    }
}

fn jumps(value: u16, jump: u16) -> bool {
    let value = value as i16;
    (jump & 0b100 != 0 && value < 0)
        || (jump & 0b010 != 0 && value == 0)
        || (jump & 0b001 != 0 && value > 0)
}

impl Cpu {
    pub fn new(program: &Program, ram_size: usize) -> Self {
        Self {
            rom: program.words.clone(),
            ram: vec![0; ram_size],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn peek(&self, addr: u16) -> u16 {
        self.ram.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn poke(&mut self, addr: u16, value: u16) {
        if let Some(cell) = self.ram.get_mut(addr as usize) {
            *cell = value;
        }
    }

    pub fn ram(&self) -> &[u16] {
        &self.ram
    }

    pub fn into_ram(self) -> Vec<u16> {
        self.ram
    }

    /// True when the next two instructions are `@k` / `0;JMP` with `k`
    /// pointing back at the `@k`: the program is spinning in place.
    fn spinning(&self) -> bool {
        let pc = self.pc as usize;
        match (self.rom.get(pc), self.rom.get(pc + 1)) {
            (Some(&target), Some(&jump)) => {
                target & C_INSTRUCTION == 0
                    && target as usize == pc
                    && jump & C_INSTRUCTION != 0
                    && jump & 0b111 == JUMP_ALWAYS
                    && jump & 0b111000 == 0
            }
            _ => false,
        }
    }

    fn memory(&self, addr: u16) -> Result<usize, String> {
        let index = addr as usize;
        if index < self.ram.len() {
            Ok(index)
        } else {
            Err(format!(
                "pc {}: memory access at {} outside RAM of {} words",
                self.pc,
                addr,
                self.ram.len()
            ))
        }
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<(), String> {
        let Some(&word) = self.rom.get(self.pc as usize) else {
            return Err(format!("pc {} outside program", self.pc));
        };

        if word & C_INSTRUCTION == 0 {
            self.a = word;
            self.pc = self.pc.wrapping_add(1);
            return Ok(());
        }

        let reads_m = word & 0x1000 != 0;
        let y = if reads_m {
            self.ram[self.memory(self.a)?]
        } else {
            self.a
        };
        let out = alu(self.d, y, (word >> 6) & 0b111111);
        let dest = (word >> 3) & 0b111;
        let jump = word & 0b111;
        let address = self.a;

        if dest & 0b001 != 0 {
            let index = self.memory(address)?;
            self.ram[index] = out;
        }
        if dest & 0b100 != 0 {
            self.a = out;
        }
        if dest & 0b010 != 0 {
            self.d = out;
        }

        self.pc = if jumps(out, jump) {
            address
        } else {
            self.pc.wrapping_add(1)
        };
        Ok(())
    }

    /// Run until the program halts or `max_cycles` instructions have run.
    ///
    /// Halting means spinning on `@k` / `0;JMP` or running off the end
    /// of the program.
    pub fn run(&mut self, max_cycles: u64) -> Result<ExecutionResult, String> {
        let mut cycles = 0;
        while cycles < max_cycles {
            if self.pc as usize >= self.rom.len() || self.spinning() {
                return Ok(ExecutionResult {
                    cycles,
                    halted: true,
                });
            }
            self.step()?;
            cycles += 1;
        }
        let halted = self.pc as usize >= self.rom.len() || self.spinning();
        Ok(ExecutionResult { cycles, halted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::runtime::assembler::assemble;

    fn cpu(asm: &str) -> Cpu {
        let program = assemble(asm, &MachineConfig::hack()).unwrap();
        Cpu::new(&program, 32768)
    }

    #[test]
    fn test_alu_wraps() {
        assert_eq!(alu(0x7fff, 1, 0b000010), 0x8000);
        assert_eq!(alu(0xffff, 1, 0b000010), 0);
        // x - y as !(!x + y)
        assert_eq!(alu(3, 5, 0b010011), (-2i16) as u16);
    }

    #[test]
    fn test_runs_off_the_end() {
        let mut c = cpu("@5\nD=A\n@7\nM=D\n");
        let result = c.run(100).unwrap();
        assert!(result.halted);
        assert_eq!(result.cycles, 4);
        assert_eq!(c.peek(7), 5);
    }

    #[test]
    fn test_halts_on_spin() {
        let mut c = cpu("@1\nD=A\n(END)\n@END\n0;JMP\n");
        let result = c.run(1000).unwrap();
        assert!(result.halted);
        assert_eq!(result.cycles, 2);
        assert_eq!(c.pc(), 2);
    }

    #[test]
    fn test_cycle_limit() {
        // Loop that keeps incrementing R0, never spinning in place.
        let mut c = cpu("(LOOP)\n@R0\nM=M+1\n@LOOP\n0;JMP\n");
        let result = c.run(40).unwrap();
        assert!(!result.halted);
        assert_eq!(result.cycles, 40);
        assert_eq!(c.peek(0), 10);
    }

    #[test]
    fn test_conditional_jump() {
        let mut c = cpu("@3\nD=-A\n@NEG\nD;JLT\n@R1\nM=1\n(NEG)\n@R2\nM=1\n");
        c.run(100).unwrap();
        assert_eq!(c.peek(1), 0);
        assert_eq!(c.peek(2), 1);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut c = cpu("@32767\nD=A\nA=D+A\nM=1\n");
        assert!(c.run(10).unwrap_err().contains("outside RAM"));
    }
}
