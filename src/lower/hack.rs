//! Hack lowering: VM commands to assembly for the 16-bit accumulator machine.
//!
//! Register conventions: `SP` points one past the top of the stack;
//! `LCL`, `ARG`, `THIS`, `THAT` hold segment base addresses. The three
//! scratch registers come from `MachineConfig` (R13..R15 by default).
//!
//! Call frame, as laid out by `call` directly below the callee's locals:
//!
//! ```text
//!   ARG -> argument 0 .. argument n-1
//!          return address
//!          saved LCL, saved ARG, saved THIS, saved THAT
//!   LCL -> local 0 .. local k-1
//!   SP  -> (working stack)
//! ```

use super::StackLowering;
use crate::config::MachineConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::ir::{ArithOp, Command, Segment};
use crate::span::{Span, Spanned};

/// Saved pointer registers in the order `call` pushes them.
const SAVED_POINTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Cells `call` pushes on top of the arguments: return address + saved pointers.
const FRAME_SIZE: u16 = 1 + SAVED_POINTERS.len() as u16;

/// Where a segment cell lives.
enum Addressing {
    /// `constant`: the index is the value.
    Immediate,
    /// `static`: an assembler variable named after the unit.
    Symbol(String),
    /// `temp` / `pointer`: a fixed RAM address.
    Direct(u16),
    /// `local` / `argument` / `this` / `that`: base register + index.
    Indirect(&'static str),
}

/// The Hack code generator and its translation state.
///
/// One instance must serve the whole session: the unique-label counter is
/// what keeps comparison and return-address labels distinct across units.
#[derive(Debug)]
pub struct HackLowering {
    machine: MachineConfig,
    /// Current source unit; qualifies `static` symbols.
    unit: String,
    /// Current function; scopes `label` / `goto` / `if-goto`.
    function: Option<String>,
    /// Session-wide counter for translator-generated labels.
    label_counter: u32,
}

impl Default for HackLowering {
    fn default() -> Self {
        Self::new(MachineConfig::hack())
    }
}

impl HackLowering {
    pub fn new(machine: MachineConfig) -> Self {
        Self {
            machine,
            unit: String::new(),
            function: None,
            label_counter: 0,
        }
    }

    pub fn current_function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Allocate a session-unique label. VM symbols cannot contain `$`, so
    /// these never meet a user label or function name.
    fn fresh_label(&mut self, prefix: &str) -> String {
        self.label_counter += 1;
        format!("${}.{}", prefix, self.label_counter)
    }

    /// `function$label`; before any function, `unit$$label`.
    pub fn scoped_label(&self, label: &str) -> String {
        match &self.function {
            Some(function) => format!("{}${}", function, label),
            None => format!("{}$${}", self.unit, label),
        }
    }

    pub fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.unit, index)
    }

    fn invalid(&self, span: Span, segment: Segment, reason: String) -> TranslateError {
        TranslateError::invalid_segment(&self.unit, span, segment.keyword(), reason)
    }

    /// Resolve where `segment index` lives, rejecting out-of-range cells.
    fn addressing(&self, segment: Segment, index: u16, span: Span) -> TranslateResult<Addressing> {
        if let Some(size) = segment.fixed_size() {
            if index >= size {
                return Err(self.invalid(
                    span,
                    segment,
                    format!("index {} out of range, segment has {} cells", index, size),
                ));
            }
        }
        Ok(match segment {
            Segment::Constant => Addressing::Immediate,
            Segment::Static => Addressing::Symbol(self.static_symbol(index)),
            Segment::Temp => Addressing::Direct(self.machine.temp_base + index),
            Segment::Pointer => Addressing::Direct(self.machine.pointer_base + index),
            Segment::Local | Segment::Argument | Segment::This | Segment::That
                if index > self.machine.max_constant =>
            {
                return Err(self.invalid(
                    span,
                    segment,
                    format!(
                        "index {} exceeds the largest loadable offset {}",
                        index, self.machine.max_constant
                    ),
                ));
            }
            Segment::Local => Addressing::Indirect("LCL"),
            Segment::Argument => Addressing::Indirect("ARG"),
            Segment::This => Addressing::Indirect("THIS"),
            Segment::That => Addressing::Indirect("THAT"),
        })
    }

    // ── Stack primitives ──

    /// *SP = D; SP++
    fn push_d(out: &mut Vec<String>) {
        out.push("@SP".to_string());
        out.push("M=M+1".to_string());
        out.push("A=M-1".to_string());
        out.push("M=D".to_string());
    }

    /// SP--; D = *SP, leaving A at the popped cell.
    fn pop_d(out: &mut Vec<String>) {
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push("D=M".to_string());
    }

    // ── Arithmetic ──

    fn lower_arithmetic(&mut self, op: ArithOp, out: &mut Vec<String>) {
        match op {
            ArithOp::Add => self.binary("M=D+M", out),
            ArithOp::Sub => self.binary("M=M-D", out),
            ArithOp::And => self.binary("M=D&M", out),
            ArithOp::Or => self.binary("M=D|M", out),
            ArithOp::Neg => self.unary("M=-M", out),
            ArithOp::Not => self.unary("M=!M", out),
            ArithOp::Eq => self.comparison("JEQ", out),
            ArithOp::Gt => self.comparison("JGT", out),
            ArithOp::Lt => self.comparison("JLT", out),
        }
    }

    /// D = b (popped); A = &a; apply `store` to a in place.
    fn binary(&self, store: &str, out: &mut Vec<String>) {
        Self::pop_d(out);
        out.push("A=A-1".to_string());
        out.push(store.to_string());
    }

    fn unary(&self, store: &str, out: &mut Vec<String>) {
        out.push("@SP".to_string());
        out.push("A=M-1".to_string());
        out.push(store.to_string());
    }

    /// Decides on the sign of `a - b`, so operands of opposite sign whose
    /// difference overflows 16 bits compare wrongly. This is the machine's
    /// native behaviour and is kept as is.
    fn comparison(&mut self, jump: &str, out: &mut Vec<String>) {
        let true_label = self.fresh_label("true");
        let end_label = self.fresh_label("end");

        Self::pop_d(out);
        out.push("A=A-1".to_string());
        out.push("D=M-D".to_string());
        out.push(format!("@{}", true_label));
        out.push(format!("D;{}", jump));
        out.push("@SP".to_string());
        out.push("A=M-1".to_string());
        out.push("M=0".to_string());
        out.push(format!("@{}", end_label));
        out.push("0;JMP".to_string());
        out.push(format!("({})", true_label));
        out.push("@SP".to_string());
        out.push("A=M-1".to_string());
        out.push("M=-1".to_string());
        out.push(format!("({})", end_label));
    }

    // ── Push / pop ──

    fn lower_push(
        &mut self,
        segment: Segment,
        index: u16,
        span: Span,
        out: &mut Vec<String>,
    ) -> TranslateResult<()> {
        match self.addressing(segment, index, span)? {
            Addressing::Immediate => {
                if index > self.machine.max_constant {
                    return Err(self.invalid(
                        span,
                        segment,
                        format!(
                            "constant {} exceeds the largest loadable value {}",
                            index, self.machine.max_constant
                        ),
                    ));
                }
                out.push(format!("@{}", index));
                out.push("D=A".to_string());
            }
            Addressing::Symbol(symbol) => {
                out.push(format!("@{}", symbol));
                out.push("D=M".to_string());
            }
            Addressing::Direct(address) => {
                out.push(format!("@{}", address));
                out.push("D=M".to_string());
            }
            Addressing::Indirect(base) => {
                out.push(format!("@{}", base));
                out.push("D=M".to_string());
                out.push(format!("@{}", index));
                out.push("A=D+A".to_string());
                out.push("D=M".to_string());
            }
        }
        Self::push_d(out);
        Ok(())
    }

    /// The destination address is parked in the pop scratch register
    /// because reading the popped value needs both A and D.
    fn lower_pop(
        &mut self,
        segment: Segment,
        index: u16,
        span: Span,
        out: &mut Vec<String>,
    ) -> TranslateResult<()> {
        match self.addressing(segment, index, span)? {
            Addressing::Immediate => {
                return Err(self.invalid(
                    span,
                    segment,
                    "cannot pop into the constant segment".to_string(),
                ));
            }
            Addressing::Symbol(symbol) => {
                out.push(format!("@{}", symbol));
                out.push("D=A".to_string());
            }
            Addressing::Direct(address) => {
                out.push(format!("@{}", address));
                out.push("D=A".to_string());
            }
            Addressing::Indirect(base) => {
                out.push(format!("@{}", base));
                out.push("D=M".to_string());
                out.push(format!("@{}", index));
                out.push("D=D+A".to_string());
            }
        }
        let scratch = self.machine.pop_scratch.clone();
        out.push(format!("@{}", scratch));
        out.push("M=D".to_string());
        Self::pop_d(out);
        out.push(format!("@{}", scratch));
        out.push("A=M".to_string());
        out.push("M=D".to_string());
        Ok(())
    }

    // ── Control flow ──

    fn lower_label(&self, label: &str, out: &mut Vec<String>) {
        out.push(format!("({})", self.scoped_label(label)));
    }

    fn lower_goto(&self, label: &str, out: &mut Vec<String>) {
        out.push(format!("@{}", self.scoped_label(label)));
        out.push("0;JMP".to_string());
    }

    fn lower_if_goto(&self, label: &str, out: &mut Vec<String>) {
        Self::pop_d(out);
        out.push(format!("@{}", self.scoped_label(label)));
        out.push("D;JNE".to_string());
    }

    // ── Calling convention ──

    fn lower_function(
        &mut self,
        name: &str,
        locals: u16,
        span: Span,
        out: &mut Vec<String>,
    ) -> TranslateResult<()> {
        self.function = Some(name.to_string());
        out.push(format!("({})", name));
        for _ in 0..locals {
            self.lower_push(Segment::Constant, 0, span, out)?;
        }
        Ok(())
    }

    fn lower_call(
        &mut self,
        name: &str,
        args: u16,
        span: Span,
        out: &mut Vec<String>,
    ) -> TranslateResult<()> {
        let frame_offset = u32::from(args) + u32::from(FRAME_SIZE);
        if frame_offset > u32::from(self.machine.max_constant) {
            return Err(TranslateError::malformed(
                &self.unit,
                span,
                format!(
                    "call {} passes {} arguments, at most {} fit below the frame",
                    name,
                    args,
                    self.machine.max_constant.saturating_sub(FRAME_SIZE)
                ),
            ));
        }
        let return_label = self.fresh_label("ret");

        out.push(format!("@{}", return_label));
        out.push("D=A".to_string());
        Self::push_d(out);

        for register in SAVED_POINTERS {
            out.push(format!("@{}", register));
            out.push("D=M".to_string());
            Self::push_d(out);
        }

        // ARG = SP - args - 5
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{}", frame_offset));
        out.push("D=D-A".to_string());
        out.push("@ARG".to_string());
        out.push("M=D".to_string());

        // LCL = SP
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push("@LCL".to_string());
        out.push("M=D".to_string());

        out.push(format!("@{}", name));
        out.push("0;JMP".to_string());
        out.push(format!("({})", return_label));
        Ok(())
    }

    /// The return address is read before `pop argument 0`: with zero
    /// arguments, argument 0 and the return-address cell are the same cell.
    /// Saved pointers are read through the frame pointer captured up front,
    /// THAT and THIS first, then ARG, then LCL.
    fn lower_return(&mut self, span: Span, out: &mut Vec<String>) -> TranslateResult<()> {
        let frame = self.machine.frame_scratch.clone();
        let ret = self.machine.return_scratch.clone();

        // FRAME = LCL
        out.push("@LCL".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{}", frame));
        out.push("M=D".to_string());

        // RET = *(FRAME - 5)
        out.push(format!("@{}", FRAME_SIZE));
        out.push("A=D-A".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{}", ret));
        out.push("M=D".to_string());

        // *ARG = pop()
        self.lower_pop(Segment::Argument, 0, span, out)?;

        // SP = ARG + 1
        out.push("@ARG".to_string());
        out.push("D=M+1".to_string());
        out.push("@SP".to_string());
        out.push("M=D".to_string());

        // THAT, THIS, ARG, LCL = *(FRAME - 1 .. 4)
        for (offset, register) in SAVED_POINTERS.iter().rev().enumerate() {
            out.push(format!("@{}", frame));
            out.push("D=M".to_string());
            out.push(format!("@{}", offset + 1));
            out.push("A=D-A".to_string());
            out.push("D=M".to_string());
            out.push(format!("@{}", register));
            out.push("M=D".to_string());
        }

        out.push(format!("@{}", ret));
        out.push("A=M".to_string());
        out.push("0;JMP".to_string());
        Ok(())
    }
}

impl StackLowering for HackLowering {
    fn target(&self) -> &str {
        &self.machine.name
    }

    fn set_unit(&mut self, unit: &str) {
        self.unit = unit.to_string();
        self.function = None;
    }

    /// SP = stack base + reserve, then jump straight to `entry`. No frame
    /// is built, so the entry function must never execute `return`.
    fn bootstrap(&mut self, entry: &str, out: &mut Vec<String>) -> TranslateResult<()> {
        let sp = self.machine.initial_sp().ok_or_else(|| TranslateError::Config {
            path: self.machine.name.clone(),
            message: format!(
                "stack_base {} plus {} reserved cells exceeds the largest loadable value {}",
                self.machine.stack_base,
                self.machine.bootstrap_reserve,
                self.machine.max_constant
            ),
        })?;
        out.push(format!("@{}", sp));
        out.push("D=A".to_string());
        out.push("@SP".to_string());
        out.push("M=D".to_string());
        out.push(format!("@{}", entry));
        out.push("0;JMP".to_string());
        Ok(())
    }

    fn lower_command(
        &mut self,
        cmd: &Spanned<Command>,
        out: &mut Vec<String>,
    ) -> TranslateResult<()> {
        let span = cmd.span;
        match &cmd.node {
            Command::Arithmetic(op) => self.lower_arithmetic(*op, out),
            Command::Push(segment, index) => self.lower_push(*segment, *index, span, out)?,
            Command::Pop(segment, index) => self.lower_pop(*segment, *index, span, out)?,
            Command::Label(label) => self.lower_label(label, out),
            Command::Goto(label) => self.lower_goto(label, out),
            Command::IfGoto(label) => self.lower_if_goto(label, out),
            Command::Function { name, locals } => self.lower_function(name, *locals, span, out)?,
            Command::Call { name, args } => self.lower_call(name, *args, span, out)?,
            Command::Return => self.lower_return(span, out)?,
        }
        Ok(())
    }
}
