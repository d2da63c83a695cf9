//! VM command model: the input vocabulary of the translator.
//!
//! A VM program is a flat list of `Command`s. Keywords and segment names
//! map onto closed enums through exhaustive matches, so an unknown name is
//! rejected once at parse time and every later stage works on typed values.

use std::fmt;

#[cfg(test)]
mod tests;

// ─── Segments ─────────────────────────────────────────────────────

/// A memory segment addressable by `push` / `pop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Indirect through `LCL`.
    Local,
    /// Indirect through `ARG`.
    Argument,
    /// Indirect through `THIS`.
    This,
    /// Indirect through `THAT`.
    That,
    /// Not memory: the index is the value itself. Push only.
    Constant,
    /// One named cell per index, scoped to the source unit.
    Static,
    /// Fixed 8-cell region, addressed directly.
    Temp,
    /// Fixed 2-cell region aliasing the `THIS` / `THAT` pointer cells.
    Pointer,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Local,
        Segment::Argument,
        Segment::This,
        Segment::That,
        Segment::Constant,
        Segment::Static,
        Segment::Temp,
        Segment::Pointer,
    ];

    pub fn from_keyword(word: &str) -> Option<Segment> {
        Some(match word {
            "local" => Segment::Local,
            "argument" => Segment::Argument,
            "this" => Segment::This,
            "that" => Segment::That,
            "constant" => Segment::Constant,
            "static" => Segment::Static,
            "temp" => Segment::Temp,
            "pointer" => Segment::Pointer,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Constant => "constant",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
        }
    }

    /// Number of addressable cells, for segments with a fixed size.
    pub fn fixed_size(self) -> Option<u16> {
        match self {
            Segment::Temp => Some(8),
            Segment::Pointer => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────

/// Arithmetic, logical and comparison commands. None take operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    pub const ALL: [ArithOp; 9] = [
        ArithOp::Add,
        ArithOp::Sub,
        ArithOp::Neg,
        ArithOp::Eq,
        ArithOp::Gt,
        ArithOp::Lt,
        ArithOp::And,
        ArithOp::Or,
        ArithOp::Not,
    ];

    pub fn from_keyword(word: &str) -> Option<ArithOp> {
        Some(match word {
            "add" => ArithOp::Add,
            "sub" => ArithOp::Sub,
            "neg" => ArithOp::Neg,
            "eq" => ArithOp::Eq,
            "gt" => ArithOp::Gt,
            "lt" => ArithOp::Lt,
            "and" => ArithOp::And,
            "or" => ArithOp::Or,
            "not" => ArithOp::Not,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
        }
    }

    /// Number of stack values consumed.
    pub fn arity(self) -> u8 {
        match self {
            ArithOp::Neg | ArithOp::Not => 1,
            _ => 2,
        }
    }
}

// ─── Commands ─────────────────────────────────────────────────────

/// The kind of a command, without its operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

impl CommandKind {
    /// Classify a line's leading keyword.
    pub fn from_keyword(word: &str) -> Option<CommandKind> {
        if ArithOp::from_keyword(word).is_some() {
            return Some(CommandKind::Arithmetic);
        }
        Some(match word {
            "push" => CommandKind::Push,
            "pop" => CommandKind::Pop,
            "label" => CommandKind::Label,
            "goto" => CommandKind::Goto,
            "if-goto" => CommandKind::IfGoto,
            "function" => CommandKind::Function,
            "call" => CommandKind::Call,
            "return" => CommandKind::Return,
            _ => return None,
        })
    }

    /// Number of operands following the keyword.
    pub fn operand_count(self) -> usize {
        match self {
            CommandKind::Arithmetic | CommandKind::Return => 0,
            CommandKind::Label | CommandKind::Goto | CommandKind::IfGoto => 1,
            CommandKind::Push | CommandKind::Pop | CommandKind::Function | CommandKind::Call => 2,
        }
    }
}

/// One parsed VM command. Immutable once produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push(..) => CommandKind::Push,
            Command::Pop(..) => CommandKind::Pop,
            Command::Label(_) => CommandKind::Label,
            Command::Goto(_) => CommandKind::Goto,
            Command::IfGoto(_) => CommandKind::IfGoto,
            Command::Function { .. } => CommandKind::Function,
            Command::Call { .. } => CommandKind::Call,
            Command::Return => CommandKind::Return,
        }
    }

    /// Net change of the stack pointer as seen by the code following this
    /// command. `call` is measured after the callee has returned; `return`
    /// tears the frame down and has no local effect.
    pub fn stack_effect(&self) -> Option<i32> {
        match self {
            Command::Arithmetic(op) => Some(1 - op.arity() as i32),
            Command::Push(..) => Some(1),
            Command::Pop(..) | Command::IfGoto(_) => Some(-1),
            Command::Label(_) | Command::Goto(_) => Some(0),
            Command::Function { locals, .. } => Some(*locals as i32),
            Command::Call { args, .. } => Some(1 - *args as i32),
            Command::Return => None,
        }
    }
}

// ─── Display ──────────────────────────────────────────────────────

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => f.write_str(op.keyword()),
            Command::Push(seg, i) => write!(f, "push {} {}", seg, i),
            Command::Pop(seg, i) => write!(f, "pop {} {}", seg, i),
            Command::Label(l) => write!(f, "label {}", l),
            Command::Goto(l) => write!(f, "goto {}", l),
            Command::IfGoto(l) => write!(f, "if-goto {}", l),
            Command::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Command::Call { name, args } => write!(f, "call {} {}", name, args),
            Command::Return => f.write_str("return"),
        }
    }
}
