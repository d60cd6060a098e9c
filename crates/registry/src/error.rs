use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by command handlers and the invocation table.
///
/// "Nothing matched" outcomes (no surface, false precondition, no accepting
/// implementation) are not errors and never produce one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
	/// General handler failure with message.
	#[error("{0}")]
	Failed(String),
	/// A required positional argument was not provided.
	#[error("missing argument #{index}: expected {expected}")]
	MissingArgument { index: usize, expected: &'static str },
	/// An argument was provided but has the wrong shape.
	#[error("invalid argument #{index} ({expected}): {reason}")]
	InvalidArgument {
		index: usize,
		expected: &'static str,
		reason: String,
	},
	/// No command is registered under the id.
	#[error("command not found: {0}")]
	NotFound(String),
	/// The referenced document could not be resolved or loaded.
	#[error("document unavailable: {0}")]
	DocumentUnavailable(String),
	/// Catch-all for other errors.
	#[error("{0}")]
	Other(String),
}

/// Failure to construct a surface contribution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to construct contribution {id}: {reason}")]
pub struct ContributionError {
	pub id: String,
	pub reason: String,
}

impl ContributionError {
	pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			reason: reason.into(),
		}
	}
}

/// Errors that can occur when loading registry configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}
