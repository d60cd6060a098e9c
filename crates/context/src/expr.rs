use std::fmt;

use regex::Regex;

use crate::snapshot::{ContextSnapshot, ContextValue};

/// Compiled regex operand of a `=~` predicate.
///
/// Equality and display use the source pattern, which also carries the flags
/// folded in at parse time.
#[derive(Debug, Clone)]
pub struct KeyRegex(Regex);

impl KeyRegex {
	pub fn new(pattern: &str) -> Result<Self, regex::Error> {
		Regex::new(pattern).map(Self)
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}

	pub fn is_match(&self, haystack: &str) -> bool {
		self.0.is_match(haystack)
	}
}

impl PartialEq for KeyRegex {
	fn eq(&self, other: &Self) -> bool {
		self.as_str() == other.as_str()
	}
}

/// A boolean predicate over context keys.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextKeyExpr {
	True,
	False,
	/// Key is bound to a truthy value.
	Defined(Box<str>),
	/// Key is unbound or falsy.
	Not(Box<str>),
	Equals(Box<str>, ContextValue),
	NotEquals(Box<str>, ContextValue),
	Regex(Box<str>, KeyRegex),
	And(Vec<ContextKeyExpr>),
	Or(Vec<ContextKeyExpr>),
	Negate(Box<ContextKeyExpr>),
}

impl ContextKeyExpr {
	pub fn has(key: &str) -> Self {
		Self::Defined(Box::from(key))
	}

	pub fn not(key: &str) -> Self {
		Self::Not(Box::from(key))
	}

	pub fn equals(key: &str, value: impl Into<ContextValue>) -> Self {
		Self::Equals(Box::from(key), value.into())
	}

	pub fn not_equals(key: &str, value: impl Into<ContextValue>) -> Self {
		Self::NotEquals(Box::from(key), value.into())
	}

	pub fn regex(key: &str, pattern: &str) -> Result<Self, regex::Error> {
		Ok(Self::Regex(Box::from(key), KeyRegex::new(pattern)?))
	}

	/// Conjunction of the present operands.
	///
	/// Nested conjunctions are flattened, `true` operands and duplicates are
	/// dropped, and any `false` operand collapses the result to `false`.
	/// Returns `None` when no operand remains.
	pub fn and<I>(exprs: I) -> Option<Self>
	where
		I: IntoIterator<Item = Option<Self>>,
	{
		let mut terms = Vec::new();
		for expr in exprs.into_iter().flatten() {
			match expr {
				Self::True => {}
				Self::False => return Some(Self::False),
				Self::And(inner) => {
					for term in inner {
						push_unique(&mut terms, term);
					}
				}
				other => push_unique(&mut terms, other),
			}
		}
		collapse(terms, Self::And)
	}

	/// Disjunction of the present operands, normalized like [`Self::and`].
	pub fn or<I>(exprs: I) -> Option<Self>
	where
		I: IntoIterator<Item = Option<Self>>,
	{
		let mut terms = Vec::new();
		for expr in exprs.into_iter().flatten() {
			match expr {
				Self::False => {}
				Self::True => return Some(Self::True),
				Self::Or(inner) => {
					for term in inner {
						push_unique(&mut terms, term);
					}
				}
				other => push_unique(&mut terms, other),
			}
		}
		collapse(terms, Self::Or)
	}

	/// Logical negation, folded into the leaf where one exists.
	pub fn negate(self) -> Self {
		match self {
			Self::True => Self::False,
			Self::False => Self::True,
			Self::Defined(key) => Self::Not(key),
			Self::Not(key) => Self::Defined(key),
			Self::Equals(key, value) => Self::NotEquals(key, value),
			Self::NotEquals(key, value) => Self::Equals(key, value),
			Self::Negate(inner) => *inner,
			other => Self::Negate(Box::new(other)),
		}
	}

	pub fn evaluate(&self, ctx: &ContextSnapshot) -> bool {
		match self {
			Self::True => true,
			Self::False => false,
			Self::Defined(key) => ctx.get(key).is_some_and(ContextValue::is_truthy),
			Self::Not(key) => !ctx.get(key).is_some_and(ContextValue::is_truthy),
			Self::Equals(key, value) => ctx.get(key).is_some_and(|v| v.loose_eq(value)),
			Self::NotEquals(key, value) => !ctx.get(key).is_some_and(|v| v.loose_eq(value)),
			Self::Regex(key, re) => {
				let haystack = ctx.get(key).map(ToString::to_string).unwrap_or_default();
				re.is_match(&haystack)
			}
			Self::And(terms) => terms.iter().all(|t| t.evaluate(ctx)),
			Self::Or(terms) => terms.iter().any(|t| t.evaluate(ctx)),
			Self::Negate(inner) => !inner.evaluate(ctx),
		}
	}

	/// Canonical text form, parseable by [`str::parse`].
	pub fn serialize(&self) -> String {
		self.to_string()
	}

	fn is_compound(&self) -> bool {
		matches!(self, Self::And(_) | Self::Or(_))
	}
}

fn push_unique(terms: &mut Vec<ContextKeyExpr>, term: ContextKeyExpr) {
	if !terms.contains(&term) {
		terms.push(term);
	}
}

fn collapse(
	mut terms: Vec<ContextKeyExpr>,
	wrap: fn(Vec<ContextKeyExpr>) -> ContextKeyExpr,
) -> Option<ContextKeyExpr> {
	match terms.len() {
		0 => None,
		1 => terms.pop(),
		_ => Some(wrap(terms)),
	}
}

/// Prefixes backslashes and `delimiter` with a backslash.
fn escape(text: &str, delimiter: char) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		if c == '\\' || c == delimiter {
			out.push('\\');
		}
		out.push(c);
	}
	out
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &ContextValue) -> fmt::Result {
	match value {
		ContextValue::String(s) => write!(f, "'{}'", escape(s, '\'')),
		other => write!(f, "{other}"),
	}
}

impl fmt::Display for ContextKeyExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::True => f.write_str("true"),
			Self::False => f.write_str("false"),
			Self::Defined(key) => f.write_str(key),
			Self::Not(key) => write!(f, "!{key}"),
			Self::Equals(key, value) => {
				write!(f, "{key} == ")?;
				write_literal(f, value)
			}
			Self::NotEquals(key, value) => {
				write!(f, "{key} != ")?;
				write_literal(f, value)
			}
			Self::Regex(key, re) => write!(f, "{key} =~ /{}/", escape(re.as_str(), '/')),
			Self::And(terms) | Self::Or(terms) => {
				let sep = if matches!(self, Self::And(_)) { " && " } else { " || " };
				for (i, term) in terms.iter().enumerate() {
					if i > 0 {
						f.write_str(sep)?;
					}
					if term.is_compound() {
						write!(f, "({term})")?;
					} else {
						write!(f, "{term}")?;
					}
				}
				Ok(())
			}
			Self::Negate(inner) => write!(f, "!({inner})"),
		}
	}
}
