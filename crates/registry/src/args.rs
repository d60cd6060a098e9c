use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;

/// Positional arguments passed through the invocation table.
///
/// Arguments are untyped JSON values; handlers extract typed values by index
/// with [`CommandArgs::require`], which fails before any side effect when the
/// caller passed something of the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandArgs(Vec<Value>);

impl CommandArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style push of an argument.
	pub fn with(mut self, value: impl Into<Value>) -> Self {
		self.0.push(value.into());
		self
	}

	/// Builder-style push of any serializable argument.
	pub fn try_with<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
		self.0.push(serde_json::to_value(value)?);
		Ok(self)
	}

	pub fn get(&self, index: usize) -> Option<&Value> {
		self.0.get(index)
	}

	/// The first argument, which editor commands treat as their options object.
	pub fn first(&self) -> Option<&Value> {
		self.0.first()
	}

	/// Deserializes argument `index` as `T`.
	pub fn require<T: DeserializeOwned>(&self, index: usize, expected: &'static str) -> Result<T, CommandError> {
		let value = self
			.0
			.get(index)
			.ok_or(CommandError::MissingArgument { index, expected })?;
		T::deserialize(value).map_err(|e| CommandError::InvalidArgument {
			index,
			expected,
			reason: e.to_string(),
		})
	}

	/// Arguments from `start` onwards.
	pub fn tail(&self, start: usize) -> CommandArgs {
		Self(self.0.iter().skip(start).cloned().collect())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Value> {
		self.0.iter()
	}
}

impl From<Vec<Value>> for CommandArgs {
	fn from(values: Vec<Value>) -> Self {
		Self(values)
	}
}

impl FromIterator<Value> for CommandArgs {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn require_reports_missing_and_malformed() {
		let args = CommandArgs::from(vec![json!("file:///a.rs"), json!({"lineNumber": "x"})]);
		assert_eq!(args.require::<String>(0, "resource").unwrap(), "file:///a.rs");
		assert!(matches!(
			args.require::<u32>(1, "position"),
			Err(CommandError::InvalidArgument { index: 1, .. })
		));
		assert_eq!(
			args.require::<u32>(2, "count"),
			Err(CommandError::MissingArgument { index: 2, expected: "count" })
		);
	}

	#[test]
	fn tail_skips_leading_arguments() {
		let args = CommandArgs::new().with(1).with("two").with(3.5);
		assert_eq!(args.tail(1), CommandArgs::from(vec![json!("two"), json!(3.5)]));
		assert!(args.tail(5).is_empty());
	}

	#[test]
	fn try_with_reports_serialization_failure() {
		let args = CommandArgs::new()
			.try_with(&weft_primitives::Position::new(2, 5))
			.unwrap();
		assert_eq!(args.first(), Some(&json!({ "lineNumber": 2, "column": 5 })));

		let tuple_keys: std::collections::BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into();
		assert!(CommandArgs::new().try_with(&tuple_keys).is_err());
	}
}
