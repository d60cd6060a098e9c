use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

/// A value bound to a context key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextValue {
	Bool(bool),
	Number(i64),
	String(Arc<str>),
}

impl ContextValue {
	/// Truthiness used by bare-key predicates: `false`, `0` and `""` are false.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Bool(b) => *b,
			Self::Number(n) => *n != 0,
			Self::String(s) => !s.is_empty(),
		}
	}

	/// Equality that lets `5` and `'5'` compare equal, since predicate
	/// literals are always parsed as strings.
	pub fn loose_eq(&self, other: &ContextValue) -> bool {
		match (self, other) {
			(Self::Number(n), Self::String(s)) | (Self::String(s), Self::Number(n)) => {
				s.trim().parse::<i64>().is_ok_and(|parsed| parsed == *n)
			}
			(Self::Bool(b), Self::String(s)) | (Self::String(s), Self::Bool(b)) => {
				&**s == if *b { "true" } else { "false" }
			}
			_ => self == other,
		}
	}
}

impl fmt::Display for ContextValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::Number(n) => write!(f, "{n}"),
			Self::String(s) => f.write_str(s),
		}
	}
}

impl From<bool> for ContextValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for ContextValue {
	fn from(value: i64) -> Self {
		Self::Number(value)
	}
}

impl From<i32> for ContextValue {
	fn from(value: i32) -> Self {
		Self::Number(i64::from(value))
	}
}

impl From<&str> for ContextValue {
	fn from(value: &str) -> Self {
		Self::String(Arc::from(value))
	}
}

impl From<String> for ContextValue {
	fn from(value: String) -> Self {
		Self::String(Arc::from(value))
	}
}

/// Context key values captured at one point in time.
///
/// Snapshots are plain values: the dispatcher captures one per invocation and
/// predicates never observe later changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
	values: HashMap<Box<str>, ContextValue>,
}

impl ContextSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, key: &str, value: impl Into<ContextValue>) -> Self {
		self.set(key, value);
		self
	}

	pub fn set(&mut self, key: &str, value: impl Into<ContextValue>) {
		self.values.insert(Box::from(key), value.into());
	}

	pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
		self.values.remove(key)
	}

	pub fn get(&self, key: &str) -> Option<&ContextValue> {
		self.values.get(key)
	}

	/// Returns a snapshot where `overlay` values shadow this one's.
	pub fn layered(&self, overlay: &ContextSnapshot) -> ContextSnapshot {
		let mut values = self.values.clone();
		values.extend(overlay.values.iter().map(|(k, v)| (k.clone(), v.clone())));
		ContextSnapshot { values }
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}
