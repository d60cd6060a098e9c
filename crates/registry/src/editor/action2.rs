use std::rc::Rc;
use std::sync::Arc;

use tracing::trace;
use weft_context::ContextKeyExpr;

use super::action::ActionLabel;
use super::command::{EditorCommandRunner, run_editor_command};
use crate::args::CommandArgs;
use crate::command::{KeybindingSpec, MenuSpec};
use crate::dispatch::CommandResult;
use crate::platform::{CommandMetadata, MenuId, Platform};
use crate::services::{EditorSurface, ServicesAccessor};

/// Static description of an [`Action2`], shared with every sink it is
/// published to.
#[derive(Debug, Clone)]
pub struct Action2Descriptor {
	pub id: Arc<str>,
	pub title: ActionLabel,
	pub precondition: Option<ContextKeyExpr>,
	pub keybindings: Vec<KeybindingSpec>,
	pub menus: Vec<MenuSpec>,
	/// Lists the action in the command palette.
	pub f1: bool,
	pub metadata: Option<CommandMetadata>,
}

impl Action2Descriptor {
	pub fn new(id: impl Into<Arc<str>>, title: impl Into<ActionLabel>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			precondition: None,
			keybindings: Vec::new(),
			menus: Vec::new(),
			f1: false,
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

	pub fn f1(mut self, f1: bool) -> Self {
		self.f1 = f1;
		self
	}

	pub fn metadata(mut self, metadata: CommandMetadata) -> Self {
		self.metadata = Some(metadata);
		self
	}
}

/// A descriptor-driven action.
pub trait Action2: Send + Sync {
	fn desc(&self) -> &Arc<Action2Descriptor>;

	fn run(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult;
}

/// An [`Action2`] that runs against the focused or active surface.
pub struct EditorAction2<R> {
	desc: Arc<Action2Descriptor>,
	runner: R,
}

impl<R: EditorCommandRunner> EditorAction2<R> {
	pub fn new(desc: Action2Descriptor, runner: R) -> Self {
		Self {
			desc: Arc::new(desc),
			runner,
		}
	}
}

impl<F> EditorAction2<F>
where
	F: Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> CommandResult + Send + Sync,
{
	pub fn from_fn(desc: Action2Descriptor, run: F) -> Self {
		Self::new(desc, run)
	}
}

impl<R: EditorCommandRunner> Action2 for EditorAction2<R> {
	fn desc(&self) -> &Arc<Action2Descriptor> {
		&self.desc
	}

	fn run(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		run_editor_command(
			&self.desc.id,
			accessor,
			args,
			self.desc.precondition.as_ref(),
			|accessor, surface, args| self.runner.run_editor_command(accessor, surface, args),
		)
	}
}

/// Publishes an [`Action2`]: menus (plus a command palette entry when `f1`
/// is set), keybindings, then the handler.
pub fn register_action2(platform: &Platform, action: Arc<dyn Action2>) {
	let desc = action.desc().clone();
	let precondition = desc.precondition.as_ref();

	for menu in &desc.menus {
		platform.menus.append_menu_item(menu.to_item(&desc.id, precondition));
	}
	if desc.f1 {
		let palette = MenuSpec::new(MenuId::COMMAND_PALETTE, desc.title.value());
		platform.menus.append_menu_item(palette.to_item(&desc.id, precondition));
	}
	for keybinding in &desc.keybindings {
		platform.keybindings.register_rule(keybinding.to_rule(&desc.id, precondition));
	}

	trace!(id = %desc.id, f1 = desc.f1, "registering action");
	platform.commands.register(
		desc.id.clone(),
		move |accessor, args| action.run(accessor, args),
		desc.metadata.clone(),
	);
}
