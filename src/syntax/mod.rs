//! Command source: VM text in, typed `Command`s out.

pub mod lexer;
pub mod parser;

pub use parser::{is_symbol, parse_unit, CommandSource};
