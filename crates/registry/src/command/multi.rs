use std::sync::Arc;

use weft_context::ContextKeyExpr;

use super::{Command, CommandOptions, Implementation, ImplementationHandle, ImplementationList, dispatch_implementations};
use crate::args::CommandArgs;
use crate::dispatch::{CommandResult, HandlerOutcome};
use crate::error::CommandError;
use crate::services::ServicesAccessor;

/// Handler signature for [`MultiCommand`] implementations.
pub type CommandImplementation =
	dyn Fn(&ServicesAccessor, &CommandArgs) -> Result<HandlerOutcome, CommandError> + Send + Sync;

/// A command whose behavior is supplied by competing implementations.
///
/// Implementations are tried from highest to lowest priority; the first one
/// whose predicate holds and that accepts the call wins. A command nobody
/// accepts completes silently.
pub struct MultiCommand {
	options: CommandOptions,
	implementations: ImplementationList<CommandImplementation>,
}

impl MultiCommand {
	pub fn new(options: CommandOptions) -> Self {
		Self {
			options,
			implementations: ImplementationList::default(),
		}
	}

	pub fn add_implementation<F>(
		&self,
		priority: i32,
		name: impl Into<Arc<str>>,
		handler: F,
		when: Option<ContextKeyExpr>,
	) -> ImplementationHandle
	where
		F: Fn(&ServicesAccessor, &CommandArgs) -> Result<HandlerOutcome, CommandError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.implementations
			.insert(priority, name.into(), Arc::new(handler), when)
	}

	pub fn remove_implementation(&self, handle: ImplementationHandle) -> bool {
		self.implementations.remove(handle)
	}

	/// Current implementations in dispatch order.
	pub fn implementations(&self) -> Vec<Implementation<CommandImplementation>> {
		self.implementations.snapshot().to_vec()
	}
}

impl Command for MultiCommand {
	fn options(&self) -> &CommandOptions {
		&self.options
	}

	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		dispatch_implementations(
			self.id(),
			&self.implementations,
			accessor.context_keys(),
			|handler| handler(accessor, args),
		)
	}
}
