//! The command family: base trait, registration, multiplexed and proxy commands.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use weft_context::ContextKeyExpr;
use weft_primitives::{KeyParseError, KeySequence};

use crate::args::CommandArgs;
use crate::dispatch::CommandResult;
use crate::platform::{
	CommandMetadata, KeybindingRule, MenuCommand, MenuId, MenuItem, Platform, PlatformKeybinding,
};
use crate::services::ServicesAccessor;

mod implementations;
mod multi;
mod proxy;

pub use implementations::{Implementation, ImplementationHandle};
pub(crate) use implementations::{ImplementationList, dispatch_implementations};
pub use multi::{CommandImplementation, MultiCommand};
pub use proxy::ProxyCommand;

/// Keybinding declared by a command.
///
/// The published rule's predicate is this spec's `when` combined with the
/// command's precondition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeybindingSpec {
	pub primary: Option<KeySequence>,
	pub secondary: Vec<KeySequence>,
	pub mac: Option<PlatformKeybinding>,
	pub linux: Option<PlatformKeybinding>,
	pub windows: Option<PlatformKeybinding>,
	pub weight: i32,
	pub when: Option<ContextKeyExpr>,
	pub args: Option<Value>,
}

impl KeybindingSpec {
	pub fn new(primary: KeySequence, weight: i32) -> Self {
		Self {
			primary: Some(primary),
			weight,
			..Self::default()
		}
	}

	/// Parses `primary` from `"ctrl-k ctrl-c"` notation.
	pub fn parse(primary: &str, weight: i32) -> Result<Self, KeyParseError> {
		Ok(Self::new(primary.parse()?, weight))
	}

	pub fn when(mut self, expr: ContextKeyExpr) -> Self {
		self.when = Some(expr);
		self
	}

	pub fn secondary(mut self, keys: KeySequence) -> Self {
		self.secondary.push(keys);
		self
	}

	pub fn mac(mut self, keys: PlatformKeybinding) -> Self {
		self.mac = Some(keys);
		self
	}

	pub fn linux(mut self, keys: PlatformKeybinding) -> Self {
		self.linux = Some(keys);
		self
	}

	pub fn windows(mut self, keys: PlatformKeybinding) -> Self {
		self.windows = Some(keys);
		self
	}

	pub fn args(mut self, args: Value) -> Self {
		self.args = Some(args);
		self
	}

	pub(crate) fn to_rule(&self, id: &Arc<str>, precondition: Option<&ContextKeyExpr>) -> KeybindingRule {
		KeybindingRule {
			id: id.clone(),
			weight: self.weight,
			args: self.args.clone(),
			when: ContextKeyExpr::and([precondition.cloned(), self.when.clone()]),
			primary: self.primary.clone(),
			secondary: self.secondary.clone(),
			mac: self.mac.clone(),
			linux: self.linux.clone(),
			windows: self.windows.clone(),
		}
	}
}

/// Menu entry declared by a command.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSpec {
	pub menu_id: MenuId,
	pub title: String,
	pub group: Option<String>,
	pub order: i32,
	pub when: Option<ContextKeyExpr>,
	pub icon: Option<String>,
}

impl MenuSpec {
	pub fn new(menu_id: MenuId, title: impl Into<String>) -> Self {
		Self {
			menu_id,
			title: title.into(),
			group: None,
			order: 0,
			when: None,
			icon: None,
		}
	}

	pub fn group(mut self, group: impl Into<String>, order: i32) -> Self {
		self.group = Some(group.into());
		self.order = order;
		self
	}

	pub fn when(mut self, expr: ContextKeyExpr) -> Self {
		self.when = Some(expr);
		self
	}

	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub(crate) fn to_item(&self, id: &Arc<str>, precondition: Option<&ContextKeyExpr>) -> MenuItem {
		MenuItem {
			menu_id: self.menu_id.clone(),
			command: MenuCommand {
				id: id.clone(),
				title: self.title.clone(),
				icon: self.icon.clone(),
				precondition: precondition.cloned(),
			},
			when: ContextKeyExpr::and([precondition.cloned(), self.when.clone()]),
			group: self.group.clone(),
			order: self.order,
		}
	}
}

/// Identity and declarative surface of a command. Immutable once built.
#[derive(Debug, Clone)]
pub struct CommandOptions {
	pub id: Arc<str>,
	pub precondition: Option<ContextKeyExpr>,
	pub keybindings: Vec<KeybindingSpec>,
	pub menus: Vec<MenuSpec>,
	pub metadata: Option<CommandMetadata>,
}

impl CommandOptions {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self {
			id: id.into(),
			precondition: None,
			keybindings: Vec::new(),
			menus: Vec::new(),
			metadata: None,
		}
	}

	pub fn precondition(mut self, expr: ContextKeyExpr) -> Self {
		self.precondition = Some(expr);
		self
	}

	pub fn keybinding(mut self, spec: KeybindingSpec) -> Self {
		self.keybindings.push(spec);
		self
	}

	pub fn menu(mut self, spec: MenuSpec) -> Self {
		self.menus.push(spec);
		self
	}

	pub fn metadata(mut self, metadata: CommandMetadata) -> Self {
		self.metadata = Some(metadata);
		self
	}
}

/// A unit of user-invokable behavior.
pub trait Command: Send + Sync {
	fn options(&self) -> &CommandOptions;

	fn id(&self) -> &str {
		&self.options().id
	}

	fn precondition(&self) -> Option<&ContextKeyExpr> {
		self.options().precondition.as_ref()
	}

	/// Runs the command. Returns `Dispatch::Completed` for every "nothing to
	/// do" outcome; errors are reserved for handler failures.
	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult;
}

/// Publishes `command` into the platform sinks.
///
/// Menus go first, then keybindings, then the invocation table entry.
pub fn register_command(platform: &Platform, command: Arc<dyn Command>) {
	let options = command.options();
	let id = &options.id;
	let precondition = options.precondition.as_ref();

	for menu in &options.menus {
		platform.menus.append_menu_item(menu.to_item(id, precondition));
	}
	for keybinding in &options.keybindings {
		platform.keybindings.register_rule(keybinding.to_rule(id, precondition));
	}

	trace!(id = %id, menus = options.menus.len(), keybindings = options.keybindings.len(), "registering command");
	let target = command.clone();
	platform.commands.register(
		id.clone(),
		move |accessor, args| target.run_command(accessor, args),
		options.metadata.clone(),
	);
}

#[cfg(test)]
mod tests;
