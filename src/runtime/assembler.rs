//! Two-pass symbolic assembler for the Hack machine.
//!
//! Pass one records `(LABEL)` addresses; pass two encodes instructions,
//! allocating unknown `@symbol`s as variables from `variable_base`.

use std::collections::HashMap;
use std::fmt;

use crate::config::MachineConfig;

/// An assembly error on a given 1-based source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsmError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asm line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AsmError {}

/// Assembled machine code plus the symbol table it was resolved against.
#[derive(Clone, Debug)]
pub struct Program {
    pub words: Vec<u16>,
    pub symbols: HashMap<String, u16>,
}

impl Program {
    pub fn address_of(&self, symbol: &str) -> Option<u16> {
        self.symbols.get(symbol).copied()
    }
}

/// `a` bit plus the six ALU control bits, keyed by mnemonic.
fn comp_bits(comp: &str) -> Option<u16> {
    let bits = match comp {
        "0" => 0b0_101010,
        "1" => 0b0_111111,
        "-1" => 0b0_111010,
        "D" => 0b0_001100,
        "A" => 0b0_110000,
        "!D" => 0b0_001101,
        "!A" => 0b0_110001,
        "-D" => 0b0_001111,
        "-A" => 0b0_110011,
        "D+1" | "1+D" => 0b0_011111,
        "A+1" | "1+A" => 0b0_110111,
        "D-1" => 0b0_001110,
        "A-1" => 0b0_110010,
        "D+A" | "A+D" => 0b0_000010,
        "D-A" => 0b0_010011,
        "A-D" => 0b0_000111,
        "D&A" | "A&D" => 0b0_000000,
        "D|A" | "A|D" => 0b0_010101,
        "M" => 0b1_110000,
        "!M" => 0b1_110001,
        "-M" => 0b1_110011,
        "M+1" | "1+M" => 0b1_110111,
        "M-1" => 0b1_110010,
        "D+M" | "M+D" => 0b1_000010,
        "D-M" => 0b1_010011,
        "M-D" => 0b1_000111,
        "D&M" | "M&D" => 0b1_000000,
        "D|M" | "M|D" => 0b1_010101,
        _ => return None,
    };
    Some(bits)
}

fn jump_bits(jump: &str) -> Option<u16> {
    Some(match jump {
        "" => 0b000,
        "JGT" => 0b001,
        "JEQ" => 0b010,
        "JGE" => 0b011,
        "JLT" => 0b100,
        "JNE" => 0b101,
        "JLE" => 0b110,
        "JMP" => 0b111,
        _ => return None,
    })
}

/// Destination bits `A D M`, in any order, each at most once.
fn dest_bits(dest: &str) -> Option<u16> {
    let mut bits = 0u16;
    for ch in dest.chars() {
        let bit = match ch {
            'A' => 0b100,
            'D' => 0b010,
            'M' => 0b001,
            _ => return None,
        };
        if bits & bit != 0 {
            return None;
        }
        bits |= bit;
    }
    Some(bits)
}

fn predefined_symbols() -> HashMap<String, u16> {
    let mut symbols = HashMap::new();
    for (name, addr) in [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ] {
        symbols.insert(name.to_string(), addr);
    }
    for r in 0..16u16 {
        symbols.insert(format!("R{}", r), r);
    }
    symbols
}

/// Strip comments and all whitespace; `None` for lines with no content.
fn clean(line: &str) -> Option<String> {
    let code = match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    };
    let code: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Assemble Hack assembly text into machine words.
pub fn assemble(asm: &str, machine: &MachineConfig) -> Result<Program, AsmError> {
    let err = |line: usize, message: String| AsmError { line, message };
    let mut symbols = predefined_symbols();

    // Pass 1: label addresses
    let mut pc: u32 = 0;
    for (idx, line) in asm.lines().enumerate() {
        let Some(code) = clean(line) else { continue };
        if let Some(label) = code.strip_prefix('(') {
            let Some(label) = label.strip_suffix(')') else {
                return Err(err(idx + 1, format!("unterminated label '{}'", code)));
            };
            if symbols.contains_key(label) {
                return Err(err(idx + 1, format!("duplicate symbol '{}'", label)));
            }
            symbols.insert(label.to_string(), pc as u16);
        } else {
            pc += 1;
            if pc > u32::from(u16::MAX) {
                return Err(err(idx + 1, "program exceeds instruction memory".to_string()));
            }
        }
    }

    // Pass 2: encode
    let mut words = Vec::with_capacity(pc as usize);
    let mut next_variable = machine.variable_base;
    for (idx, line) in asm.lines().enumerate() {
        let Some(code) = clean(line) else { continue };
        if code.starts_with('(') {
            continue;
        }
        if let Some(operand) = code.strip_prefix('@') {
            let value = if operand.starts_with(|c: char| c.is_ascii_digit()) {
                operand
                    .parse::<u16>()
                    .ok()
                    .filter(|v| *v <= machine.max_constant)
                    .ok_or_else(|| err(idx + 1, format!("invalid constant '{}'", operand)))?
            } else if let Some(addr) = symbols.get(operand) {
                *addr
            } else {
                let addr = next_variable;
                symbols.insert(operand.to_string(), addr);
                next_variable += 1;
                addr
            };
            words.push(value);
            continue;
        }

        let (dest, rest) = match code.split_once('=') {
            Some((dest, rest)) => (dest, rest),
            None => ("", code.as_str()),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => (comp, jump),
            None => (rest, ""),
        };
        let dest = dest_bits(dest).ok_or_else(|| err(idx + 1, format!("bad dest '{}'", dest)))?;
        let comp = comp_bits(comp).ok_or_else(|| err(idx + 1, format!("bad comp '{}'", comp)))?;
        let jump = jump_bits(jump).ok_or_else(|| err(idx + 1, format!("bad jump '{}'", jump)))?;
        words.push(0b111 << 13 | comp << 6 | dest << 3 | jump);
    }

    Ok(Program { words, symbols })
}
