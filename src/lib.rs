pub mod api;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod ir;
pub mod lower;
pub mod runtime;
pub mod session;
pub mod span;
pub mod syntax;

// Re-exports: short paths used by the CLI, tests and benches
pub use config::project;
pub use error::{TranslateError, TranslateResult};
pub use syntax::lexer;
pub use syntax::parser;

// Re-export public API: `vmlower::translate()` etc.
pub use api::*;

use diagnostic::render_diagnostics;

/// Report a translation error on stderr.
///
/// Errors located in a unit are rendered against that unit's source when
/// `input` has it; anything else is printed as a plain `error:` line.
pub fn report_error(err: &TranslateError, input: Option<&Input>) {
    let unit = err
        .unit()
        .and_then(|name| input.and_then(|input| input.unit(name)));
    match unit {
        Some(unit) if err.span().is_some_and(|s| !s.is_dummy()) => {
            render_diagnostics(&[err.to_diagnostic()], &unit.display_name(), &unit.source);
        }
        _ => eprintln!("error: {}", err),
    }
}
