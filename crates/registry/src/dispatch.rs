//! Tagged dispatch outcomes.

use std::fmt;
use std::future::Future;

use weft_primitives::BoxFutureLocal;

use crate::error::CommandError;

/// A handler's asynchronous completion.
pub type CommandFuture = BoxFutureLocal<'static, Result<(), CommandError>>;

/// Result of running a command through the invocation table.
pub type CommandResult = Result<Dispatch, CommandError>;

/// How a dispatch finished from the caller's point of view.
#[must_use = "a pending dispatch carries the handler's completion and failure"]
pub enum Dispatch {
	/// Finished synchronously, including the "nothing matched" no-op cases.
	Completed,
	/// A handler accepted the call and is still running.
	Pending(CommandFuture),
}

impl Dispatch {
	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = Result<(), CommandError>> + 'static,
	{
		Self::Pending(Box::pin(future))
	}

	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending(_))
	}

	/// Waits for a pending handler, if any.
	pub async fn finish(self) -> Result<(), CommandError> {
		match self {
			Self::Completed => Ok(()),
			Self::Pending(future) => future.await,
		}
	}
}

impl fmt::Debug for Dispatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Completed => f.write_str("Completed"),
			Self::Pending(_) => f.write_str("Pending(..)"),
		}
	}
}

/// What one competing implementation did with a call.
///
/// Both accepting variants stop the priority walk; a pending result still
/// counts as accepted even if it later fails.
#[must_use]
pub enum HandlerOutcome {
	NotHandled,
	Handled,
	HandledPending(CommandFuture),
}

impl HandlerOutcome {
	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = Result<(), CommandError>> + 'static,
	{
		Self::HandledPending(Box::pin(future))
	}

	pub fn is_handled(&self) -> bool {
		!matches!(self, Self::NotHandled)
	}
}

impl From<bool> for HandlerOutcome {
	fn from(handled: bool) -> Self {
		if handled { Self::Handled } else { Self::NotHandled }
	}
}

impl From<Dispatch> for HandlerOutcome {
	fn from(dispatch: Dispatch) -> Self {
		match dispatch {
			Dispatch::Completed => Self::Handled,
			Dispatch::Pending(future) => Self::HandledPending(future),
		}
	}
}

impl fmt::Debug for HandlerOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotHandled => f.write_str("NotHandled"),
			Self::Handled => f.write_str("Handled"),
			Self::HandledPending(_) => f.write_str("HandledPending(..)"),
		}
	}
}
