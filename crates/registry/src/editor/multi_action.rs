use std::rc::Rc;
use std::sync::Arc;

use weft_context::ContextKeyExpr;

use super::action::{ActionLabel, ActionOptions, ActionParts, EditorActionDef};
use super::command::run_editor_command;
use crate::args::CommandArgs;
use crate::command::{
	Command, CommandOptions, Implementation, ImplementationHandle, ImplementationList,
	dispatch_implementations,
};
use crate::dispatch::{CommandResult, HandlerOutcome};
use crate::error::CommandError;
use crate::services::{EditorSurface, ServicesAccessor};

/// Handler signature for [`MultiEditorAction`] implementations.
pub type EditorActionImplementation = dyn Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> Result<HandlerOutcome, CommandError>
	+ Send
	+ Sync;

/// An editor action whose behavior is supplied by competing implementations.
///
/// The surface is resolved and the action precondition checked first. The
/// implementations' own predicates are then evaluated in the surface scope.
pub struct MultiEditorAction {
	options: CommandOptions,
	label: ActionLabel,
	alias: String,
	implementations: ImplementationList<EditorActionImplementation>,
}

impl MultiEditorAction {
	pub fn new(options: ActionOptions) -> Self {
		let ActionParts { command, label, alias } = options.into_parts();
		Self {
			options: command,
			label,
			alias,
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
		F: Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> Result<HandlerOutcome, CommandError>
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

	pub fn implementations(&self) -> Vec<Implementation<EditorActionImplementation>> {
		self.implementations.snapshot().to_vec()
	}
}

impl Command for MultiEditorAction {
	fn options(&self) -> &CommandOptions {
		&self.options
	}

	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		run_editor_command(self.id(), accessor, args, self.precondition(), |scoped, surface, args| {
			dispatch_implementations(
				self.id(),
				&self.implementations,
				scoped.context_keys(),
				|handler| handler(scoped, surface, args),
			)
		})
	}
}

impl EditorActionDef for MultiEditorAction {
	fn label(&self) -> &ActionLabel {
		&self.label
	}

	fn alias(&self) -> &str {
		&self.alias
	}
}
