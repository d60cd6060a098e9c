use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A position in a document. Both coordinates are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
	pub line_number: u32,
	pub column: u32,
}

impl Position {
	pub const fn new(line_number: u32, column: u32) -> Self {
		Self { line_number, column }
	}
}

impl Ord for Position {
	fn cmp(&self, other: &Self) -> Ordering {
		self.line_number
			.cmp(&other.line_number)
			.then_with(|| self.column.cmp(&other.column))
	}
}

impl PartialOrd for Position {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// A half-open span between two positions, normalized so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
	pub start: Position,
	pub end: Position,
}

impl Range {
	pub fn new(a: Position, b: Position) -> Self {
		if a <= b { Self { start: a, end: b } } else { Self { start: b, end: a } }
	}

	/// Creates an empty range at `pos`.
	pub fn collapsed(pos: Position) -> Self {
		Self { start: pos, end: pos }
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	pub fn contains(&self, pos: Position) -> bool {
		self.start <= pos && pos < self.end
	}
}
