use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use weft_context::ContextKeyExpr;

use super::command::{EditorCommandRunner, run_editor_command};
use crate::args::CommandArgs;
use crate::command::{Command, CommandOptions, KeybindingSpec, MenuSpec};
use crate::dispatch::CommandResult;
use crate::platform::{CommandMetadata, MenuId};
use crate::services::{EditorSurface, ServicesAccessor, TelemetryEvent};

/// User-visible name of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionLabel {
	Plain(String),
	/// A translated label together with its untranslated source.
	Localized { value: String, original: String },
}

impl ActionLabel {
	pub fn localized(value: impl Into<String>, original: impl Into<String>) -> Self {
		Self::Localized {
			value: value.into(),
			original: original.into(),
		}
	}

	/// The label as displayed.
	pub fn value(&self) -> &str {
		match self {
			Self::Plain(label) => label,
			Self::Localized { value, .. } => value,
		}
	}

	pub fn original(&self) -> &str {
		match self {
			Self::Plain(label) => label,
			Self::Localized { original, .. } => original,
		}
	}
}

impl fmt::Display for ActionLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.value())
	}
}

impl From<&str> for ActionLabel {
	fn from(label: &str) -> Self {
		Self::Plain(label.to_string())
	}
}

impl From<String> for ActionLabel {
	fn from(label: String) -> Self {
		Self::Plain(label)
	}
}

/// Context menu placement of an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenuSpec {
	/// Defaults to [`MenuId::EDITOR_CONTEXT`].
	pub menu_id: Option<MenuId>,
	pub group: Option<String>,
	pub order: i32,
	pub when: Option<ContextKeyExpr>,
	/// Defaults to the action label.
	pub title: Option<String>,
}

impl ContextMenuSpec {
	pub fn new(group: impl Into<String>, order: i32) -> Self {
		Self {
			group: Some(group.into()),
			order,
			..Self::default()
		}
	}

	pub fn menu(mut self, menu_id: MenuId) -> Self {
		self.menu_id = Some(menu_id);
		self
	}

	pub fn when(mut self, expr: ContextKeyExpr) -> Self {
		self.when = Some(expr);
		self
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	fn into_menu_spec(self, label: &ActionLabel) -> MenuSpec {
		MenuSpec {
			menu_id: self.menu_id.unwrap_or(MenuId::EDITOR_CONTEXT),
			title: self.title.unwrap_or_else(|| label.value().to_string()),
			group: self.group,
			order: self.order,
			when: self.when,
			icon: None,
		}
	}
}

/// Options for [`EditorAction`] and [`MultiEditorAction`](super::MultiEditorAction).
#[derive(Debug, Clone)]
pub struct ActionOptions {
	pub command: CommandOptions,
	pub label: ActionLabel,
	pub alias: String,
	pub context_menus: Vec<ContextMenuSpec>,
}

impl ActionOptions {
	pub fn new(id: impl Into<Arc<str>>, label: impl Into<ActionLabel>) -> Self {
		Self {
			command: CommandOptions::new(id),
			label: label.into(),
			alias: String::new(),
			context_menus: Vec::new(),
		}
	}

	pub fn alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn precondition(mut self, expr: ContextKeyExpr) -> Self {
		self.command = self.command.precondition(expr);
		self
	}

	pub fn keybinding(mut self, spec: KeybindingSpec) -> Self {
		self.command = self.command.keybinding(spec);
		self
	}

	pub fn metadata(mut self, metadata: CommandMetadata) -> Self {
		self.command = self.command.metadata(metadata);
		self
	}

	pub fn context_menu(mut self, spec: ContextMenuSpec) -> Self {
		self.context_menus.push(spec);
		self
	}

	/// Folds context menu placements into plain menu specs.
	pub(crate) fn into_parts(self) -> ActionParts {
		let Self {
			mut command,
			label,
			alias,
			context_menus,
		} = self;
		command
			.menus
			.extend(context_menus.into_iter().map(|spec| spec.into_menu_spec(&label)));
		ActionParts { command, label, alias }
	}
}

pub(crate) struct ActionParts {
	pub(crate) command: CommandOptions,
	pub(crate) label: ActionLabel,
	pub(crate) alias: String,
}

/// An editor command with a label, enumerable through the registry.
pub trait EditorActionDef: Command {
	fn label(&self) -> &ActionLabel;
	fn alias(&self) -> &str;
}

/// Labelled surface-scoped command that reports each invocation to telemetry.
pub struct EditorAction<R> {
	options: CommandOptions,
	label: ActionLabel,
	alias: String,
	runner: R,
}

impl<R: EditorCommandRunner> EditorAction<R> {
	pub fn new(options: ActionOptions, runner: R) -> Self {
		let ActionParts { command, label, alias } = options.into_parts();
		Self {
			options: command,
			label,
			alias,
			runner,
		}
	}
}

impl<F> EditorAction<F>
where
	F: Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> CommandResult + Send + Sync,
{
	pub fn from_fn(options: ActionOptions, run: F) -> Self {
		Self::new(options, run)
	}
}

impl<R: EditorCommandRunner> Command for EditorAction<R> {
	fn options(&self) -> &CommandOptions {
		&self.options
	}

	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		run_editor_command(self.id(), accessor, args, self.precondition(), |accessor, surface, args| {
			accessor.telemetry().public_log(TelemetryEvent::EditorActionInvoked {
				name: self.label.value().to_string(),
				id: self.id().to_string(),
			});
			self.runner.run_editor_command(accessor, surface, args)
		})
	}
}

impl<R: EditorCommandRunner> EditorActionDef for EditorAction<R> {
	fn label(&self) -> &ActionLabel {
		&self.label
	}

	fn alias(&self) -> &str {
		&self.alias
	}
}
