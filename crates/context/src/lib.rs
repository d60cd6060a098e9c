//! Context key predicates.
//!
//! A [`ContextKeyExpr`] is a boolean expression over named context keys
//! (`editorTextFocus && !editorReadonly`). Evaluation is a pure function of the
//! expression and an explicitly captured [`ContextSnapshot`]; nothing here reads
//! ambient focus state.

mod expr;
mod parse;
mod snapshot;

#[cfg(test)]
mod tests;

pub use expr::{ContextKeyExpr, KeyRegex};
pub use parse::ContextParseError;
pub use snapshot::{ContextSnapshot, ContextValue};
