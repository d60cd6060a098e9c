use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::args::CommandArgs;
use crate::dispatch::CommandResult;
use crate::error::CommandError;
use crate::services::ServicesAccessor;

/// Handler stored in the invocation table.
pub type CommandHandlerFn = Arc<dyn Fn(&ServicesAccessor, &CommandArgs) -> CommandResult + Send + Sync>;

/// Human-facing description of a command and its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandMetadata {
	pub description: String,
	pub args: Vec<CommandArgDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandArgDoc {
	pub name: String,
	pub description: String,
}

impl CommandMetadata {
	pub fn new(description: impl Into<String>) -> Self {
		Self {
			description: description.into(),
			args: Vec::new(),
		}
	}

	pub fn arg(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
		self.args.push(CommandArgDoc {
			name: name.into(),
			description: description.into(),
		});
		self
	}
}

#[derive(Clone)]
struct CommandEntry {
	handler: CommandHandlerFn,
	metadata: Option<CommandMetadata>,
}

/// Global `id -> handler` invocation table.
///
/// One handler per id. A later registration replaces the earlier one.
#[derive(Default)]
pub struct CommandsRegistry {
	entries: RwLock<HashMap<Arc<str>, CommandEntry>>,
}

impl CommandsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register<F>(&self, id: Arc<str>, handler: F, metadata: Option<CommandMetadata>)
	where
		F: Fn(&ServicesAccessor, &CommandArgs) -> CommandResult + Send + Sync + 'static,
	{
		let entry = CommandEntry {
			handler: Arc::new(handler),
			metadata,
		};
		let previous = self.entries.write().insert(id.clone(), entry);
		if previous.is_some() {
			debug!(id = %id, "command re-registered, replacing previous handler");
		}
	}

	pub fn get(&self, id: &str) -> Option<CommandHandlerFn> {
		self.entries.read().get(id).map(|e| e.handler.clone())
	}

	pub fn metadata(&self, id: &str) -> Option<CommandMetadata> {
		self.entries.read().get(id).and_then(|e| e.metadata.clone())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.read().contains_key(id)
	}

	/// Runs the handler bound to `id`.
	///
	/// The table lock is released before the handler runs, so handlers may
	/// register or execute further commands.
	pub fn execute(&self, id: &str, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		let Some(handler) = self.get(id) else {
			return Err(CommandError::NotFound(id.to_string()));
		};
		trace!(id, args = args.len(), "executing command");
		handler(accessor, args)
	}

	/// Registered ids in lexical order.
	pub fn ids(&self) -> Vec<Arc<str>> {
		let mut ids: Vec<_> = self.entries.read().keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
