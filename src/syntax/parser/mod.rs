use crate::error::{TranslateError, TranslateResult};
use crate::ir::{ArithOp, Command, CommandKind, Segment};
use crate::span::Spanned;
use crate::syntax::lexer::{Lexer, Line, Word};

#[cfg(test)]
mod tests;

/// Lazy, forward-only stream of parsed commands for one source unit.
///
/// Each item is either a command tagged with its span or the error for
/// that line. Lines are independent, so iteration may continue past an
/// error, but a translation session stops at the first one.
pub struct CommandSource<'src> {
    lexer: Lexer<'src>,
    unit: String,
}

impl<'src> CommandSource<'src> {
    pub fn new(source: &'src str, unit: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            unit: unit.to_string(),
        }
    }

    fn parse_line(&self, line: &Line<'_>) -> TranslateResult<Command> {
        let keyword = line.words[0];
        let operands = &line.words[1..];

        let kind = CommandKind::from_keyword(keyword.text).ok_or_else(|| {
            TranslateError::malformed(
                &self.unit,
                keyword.span,
                format!("unknown command '{}'", keyword.text),
            )
        })?;

        let expected = kind.operand_count();
        if operands.len() != expected {
            return Err(TranslateError::malformed(
                &self.unit,
                line.span,
                format!(
                    "'{}' expects {} operand{}, found {}",
                    keyword.text,
                    expected,
                    if expected == 1 { "" } else { "s" },
                    operands.len()
                ),
            ));
        }

        Ok(match kind {
            CommandKind::Arithmetic => match ArithOp::from_keyword(keyword.text) {
                Some(op) => Command::Arithmetic(op),
                None => {
                    return Err(TranslateError::malformed(
                        &self.unit,
                        keyword.span,
                        format!("unknown command '{}'", keyword.text),
                    ))
                }
            },
            CommandKind::Push => {
                Command::Push(self.segment(operands[0])?, self.number(operands[1])?)
            }
            CommandKind::Pop => Command::Pop(self.segment(operands[0])?, self.number(operands[1])?),
            CommandKind::Label => Command::Label(self.symbol(operands[0])?),
            CommandKind::Goto => Command::Goto(self.symbol(operands[0])?),
            CommandKind::IfGoto => Command::IfGoto(self.symbol(operands[0])?),
            CommandKind::Function => Command::Function {
                name: self.symbol(operands[0])?,
                locals: self.number(operands[1])?,
            },
            CommandKind::Call => Command::Call {
                name: self.symbol(operands[0])?,
                args: self.number(operands[1])?,
            },
            CommandKind::Return => Command::Return,
        })
    }

    fn segment(&self, word: Word<'_>) -> TranslateResult<Segment> {
        Segment::from_keyword(word.text).ok_or_else(|| {
            TranslateError::invalid_segment(&self.unit, word.span, word.text, "unknown segment name")
        })
    }

    fn number(&self, word: Word<'_>) -> TranslateResult<u16> {
        if !word.text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TranslateError::malformed(
                &self.unit,
                word.span,
                format!("expected a non-negative integer, found '{}'", word.text),
            ));
        }
        word.text.parse::<u16>().map_err(|_| {
            TranslateError::malformed(
                &self.unit,
                word.span,
                format!("integer '{}' does not fit in 16 bits", word.text),
            )
        })
    }

    fn symbol(&self, word: Word<'_>) -> TranslateResult<String> {
        if is_symbol(word.text) {
            Ok(word.text.to_string())
        } else {
            Err(TranslateError::malformed(
                &self.unit,
                word.span,
                format!("invalid symbol '{}'", word.text),
            ))
        }
    }
}

impl Iterator for CommandSource<'_> {
    type Item = TranslateResult<Spanned<Command>>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lexer.next()?;
        Some(self.parse_line(&line).map(|cmd| Spanned::new(cmd, line.span)))
    }
}

/// VM symbols: letters, digits, `_`, `.`, `:`, not starting with a digit.
///
/// `$` is excluded so that translator-generated labels, which start with
/// `$`, and scoped labels, which join two symbols with `$`, cannot be
/// spelled by a VM program.
pub fn is_symbol(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'.' || b == b':' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b':')
}

/// Parse a whole source unit, stopping at the first error.
pub fn parse_unit(source: &str, unit: &str) -> TranslateResult<Vec<Spanned<Command>>> {
    CommandSource::new(source, unit).collect()
}
