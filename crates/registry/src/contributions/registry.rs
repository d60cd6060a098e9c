use std::rc::Rc;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, warn};
use weft_primitives::Position;

use super::{
	ContributionCtor, DiffEditorContributionDescriptor, EditorContribution,
	EditorContributionDescriptor, EditorContributionInstantiation, SurfaceRef,
};
use crate::args::CommandArgs;
use crate::command::{Command, register_command};
use crate::dispatch::CommandResult;
use crate::editor::{Action2, EditorActionDef, MultiEditorAction, register_action2};
use crate::error::ContributionError;
use crate::platform::Platform;
use crate::resource;
use crate::services::{ServicesAccessor, TextDocument};

/// Records every extension point a feature registers.
///
/// Constructed explicitly and shared by `Arc`. Registration publishes into
/// the [`Platform`] sinks immediately; contribution descriptors are only
/// recorded here and read by each surface's
/// [`ContributionHost`](super::ContributionHost). Nothing is ever
/// unregistered.
pub struct ContributionRegistry {
	platform: Arc<Platform>,
	editor_contributions: ArcSwap<Vec<EditorContributionDescriptor>>,
	diff_contributions: ArcSwap<Vec<DiffEditorContributionDescriptor>>,
	editor_actions: ArcSwap<Vec<Arc<dyn EditorActionDef>>>,
	editor_commands: RwLock<HashMap<Arc<str>, Arc<dyn Command>>>,
}

impl ContributionRegistry {
	pub fn new(platform: Arc<Platform>) -> Self {
		Self {
			platform,
			editor_contributions: ArcSwap::from_pointee(Vec::new()),
			diff_contributions: ArcSwap::from_pointee(Vec::new()),
			editor_actions: ArcSwap::from_pointee(Vec::new()),
			editor_commands: RwLock::new(HashMap::default()),
		}
	}

	pub fn platform(&self) -> &Arc<Platform> {
		&self.platform
	}

	pub fn register_editor_contribution<F>(
		&self,
		id: impl Into<Arc<str>>,
		ctor: F,
		instantiation: EditorContributionInstantiation,
	) where
		F: Fn(&SurfaceRef) -> Result<Rc<dyn EditorContribution>, ContributionError> + Send + Sync + 'static,
	{
		let id = id.into();
		let ctor: ContributionCtor = Arc::new(ctor);
		let desc = EditorContributionDescriptor {
			id: id.clone(),
			ctor,
			instantiation,
		};
		self.editor_contributions.rcu(|current| {
			if current.iter().any(|d| d.id == id) {
				warn!(id = %id, "duplicate editor contribution id, surfaces keep the first");
			}
			let mut next = Vec::clone(current);
			next.push(desc.clone());
			next
		});
	}

	pub fn register_diff_editor_contribution<F>(&self, id: impl Into<Arc<str>>, ctor: F)
	where
		F: Fn(&SurfaceRef) -> Result<Rc<dyn EditorContribution>, ContributionError> + Send + Sync + 'static,
	{
		let desc = DiffEditorContributionDescriptor {
			id: id.into(),
			ctor: Arc::new(ctor),
		};
		self.diff_contributions.rcu(|current| {
			let mut next = Vec::clone(current);
			next.push(desc.clone());
			next
		});
	}

	/// Publishes a plain command into the platform sinks.
	pub fn register_command<C: Command + 'static>(&self, command: C) -> Arc<C> {
		let command = Arc::new(command);
		register_command(&self.platform, command.clone());
		command
	}

	pub fn register_editor_action<A: EditorActionDef + 'static>(&self, action: A) -> Arc<A> {
		let action = Arc::new(action);
		self.register_instantiated_editor_action(action.clone());
		action
	}

	/// Registers a multiplexed action and hands it back so implementations
	/// can be attached.
	pub fn register_multi_editor_action(&self, action: MultiEditorAction) -> Arc<MultiEditorAction> {
		self.register_editor_action(action)
	}

	pub fn register_instantiated_editor_action(&self, action: Arc<dyn EditorActionDef>) {
		register_command(&self.platform, action.clone());
		self.editor_actions.rcu(|current| {
			let mut next = Vec::clone(current);
			next.push(action.clone());
			next
		});
	}

	/// Publishes `command` and indexes it by id. A later command with the
	/// same id replaces the earlier one.
	pub fn register_editor_command<C: Command + 'static>(&self, command: C) -> Arc<C> {
		let command = Arc::new(command);
		register_command(&self.platform, command.clone());
		let id: Arc<str> = Arc::from(command.id());
		if self.editor_commands.write().insert(id.clone(), command.clone()).is_some() {
			debug!(id = %id, "editor command re-registered");
		}
		command
	}

	pub fn register_action2<A: Action2 + 'static>(&self, action: A) -> Arc<A> {
		let action = Arc::new(action);
		register_action2(&self.platform, action.clone());
		action
	}

	/// See [`resource::register_model_and_position_command`].
	pub fn register_model_and_position_command<F>(&self, id: impl Into<Arc<str>>, handler: F)
	where
		F: Fn(&ServicesAccessor, &Rc<dyn TextDocument>, Position, &CommandArgs) -> CommandResult
			+ Send
			+ Sync
			+ 'static,
	{
		resource::register_model_and_position_command(&self.platform, id, handler);
	}

	/// See [`resource::register_model_command`].
	pub fn register_model_command<F>(&self, id: impl Into<Arc<str>>, handler: F)
	where
		F: Fn(&ServicesAccessor, &Rc<dyn TextDocument>, &CommandArgs) -> CommandResult + Send + Sync + 'static,
	{
		resource::register_model_command(&self.platform, id, handler);
	}

	/// Contribution descriptors in registration order.
	pub fn editor_contributions(&self) -> Vec<EditorContributionDescriptor> {
		self.editor_contributions.load().to_vec()
	}

	/// The descriptors whose ids appear in `ids`, in registration order.
	pub fn some_editor_contributions(&self, ids: &[&str]) -> Vec<EditorContributionDescriptor> {
		self.editor_contributions
			.load()
			.iter()
			.filter(|d| ids.contains(&&*d.id))
			.cloned()
			.collect()
	}

	pub fn diff_editor_contributions(&self) -> Vec<DiffEditorContributionDescriptor> {
		self.diff_contributions.load().to_vec()
	}

	pub fn editor_actions(&self) -> Vec<Arc<dyn EditorActionDef>> {
		self.editor_actions.load().to_vec()
	}

	pub fn editor_command(&self, id: &str) -> Option<Arc<dyn Command>> {
		self.editor_commands.read().get(id).cloned()
	}
}
