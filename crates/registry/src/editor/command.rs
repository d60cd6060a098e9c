use std::rc::Rc;

use tracing::{debug, trace};
use weft_context::ContextKeyExpr;

use crate::args::CommandArgs;
use crate::command::{Command, CommandOptions};
use crate::dispatch::{CommandResult, Dispatch};
use crate::services::{EditorSurface, ServicesAccessor};

/// Resolves the target surface and runs `run` against it.
///
/// The focused surface wins over the active one. With no surface, or when
/// `precondition` does not hold in the surface's scope, the call completes
/// without doing anything.
pub fn run_editor_command<F>(
	id: &str,
	accessor: &ServicesAccessor,
	args: &CommandArgs,
	precondition: Option<&ContextKeyExpr>,
	run: F,
) -> CommandResult
where
	F: FnOnce(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> CommandResult,
{
	let Some(surface) = accessor.resolve_surface() else {
		trace!(id, "no focused or active surface");
		return Ok(Dispatch::Completed);
	};

	let scoped = accessor.within_scope(surface.context_keys());
	if let Some(precondition) = precondition
		&& !scoped.context_keys().context_matches(Some(precondition))
	{
		debug!(
			id,
			surface = %surface.id(),
			precondition = %precondition.serialize(),
			"precondition does not hold, skipping"
		);
		return Ok(Dispatch::Completed);
	}

	run(&scoped, &surface, args)
}

/// Body of a surface-scoped command.
pub trait EditorCommandRunner: Send + Sync {
	fn run_editor_command(
		&self,
		accessor: &ServicesAccessor,
		surface: &Rc<dyn EditorSurface>,
		args: &CommandArgs,
	) -> CommandResult;
}

impl<F> EditorCommandRunner for F
where
	F: Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> CommandResult + Send + Sync,
{
	fn run_editor_command(
		&self,
		accessor: &ServicesAccessor,
		surface: &Rc<dyn EditorSurface>,
		args: &CommandArgs,
	) -> CommandResult {
		self(accessor, surface, args)
	}
}

/// A command that only runs against an editing surface.
pub struct EditorCommand<R> {
	options: CommandOptions,
	runner: R,
}

impl<R: EditorCommandRunner> EditorCommand<R> {
	pub fn new(options: CommandOptions, runner: R) -> Self {
		Self { options, runner }
	}

	pub fn runner(&self) -> &R {
		&self.runner
	}
}

impl<F> EditorCommand<F>
where
	F: Fn(&ServicesAccessor, &Rc<dyn EditorSurface>, &CommandArgs) -> CommandResult + Send + Sync,
{
	pub fn from_fn(options: CommandOptions, run: F) -> Self {
		Self { options, runner: run }
	}
}

impl<R: EditorCommandRunner> Command for EditorCommand<R> {
	fn options(&self) -> &CommandOptions {
		&self.options
	}

	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		run_editor_command(self.id(), accessor, args, self.precondition(), |accessor, surface, args| {
			self.runner.run_editor_command(accessor, surface, args)
		})
	}
}

/// Looks up a surface's controller of type `T`.
pub type ControllerLookup<T> = fn(&dyn EditorSurface) -> Option<Rc<T>>;

/// Builds editor commands that forward to a per-surface controller.
///
/// ```ignore
/// let binder = bind_to_contribution(FoldingController::get);
/// registry.register_editor_command(binder.command(
/// 	CommandOptions::new("editor.fold"),
/// 	|controller, _args| controller.fold(),
/// ));
/// ```
pub fn bind_to_contribution<T: ?Sized>(lookup: ControllerLookup<T>) -> ContributionBinder<T> {
	ContributionBinder { lookup }
}

pub struct ContributionBinder<T: ?Sized> {
	lookup: ControllerLookup<T>,
}

impl<T: ?Sized> ContributionBinder<T> {
	pub fn command<H>(&self, options: CommandOptions, handler: H) -> EditorCommand<ContributionRunner<T, H>>
	where
		H: Fn(&T, &CommandArgs) -> CommandResult + Send + Sync,
	{
		EditorCommand::new(
			options,
			ContributionRunner {
				lookup: self.lookup,
				handler,
			},
		)
	}
}

/// Runner produced by [`ContributionBinder::command`].
pub struct ContributionRunner<T: ?Sized, H> {
	lookup: ControllerLookup<T>,
	handler: H,
}

impl<T: ?Sized, H> EditorCommandRunner for ContributionRunner<T, H>
where
	H: Fn(&T, &CommandArgs) -> CommandResult + Send + Sync,
{
	fn run_editor_command(
		&self,
		_accessor: &ServicesAccessor,
		surface: &Rc<dyn EditorSurface>,
		args: &CommandArgs,
	) -> CommandResult {
		let Some(controller) = (self.lookup)(surface.as_ref()) else {
			trace!(surface = %surface.id(), "controller not present on surface");
			return Ok(Dispatch::Completed);
		};
		(self.handler)(&controller, args)
	}
}
