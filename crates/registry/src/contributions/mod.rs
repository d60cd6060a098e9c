//! Per-surface contributions and the registry that records every extension
//! point.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::Value;
use weft_primitives::SurfaceId;

use crate::error::ContributionError;
use crate::services::EditorSurface;

mod host;
mod registry;

pub use host::ContributionHost;
pub use registry::ContributionRegistry;

/// When a surface should construct a contribution, from most to least
/// urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditorContributionInstantiation {
	/// While the surface is being created.
	Eager,
	/// Soon after the first model is attached, or earlier if idle.
	AfterFirstRender,
	/// Before the first user interaction, or earlier if idle.
	BeforeFirstInteraction,
	/// Some time after creation, whenever idle time allows.
	Eventually,
	/// Only when explicitly requested.
	Lazy,
}

/// Per-surface state object owned by a [`ContributionHost`].
pub trait EditorContribution: Any {
	fn dispose(&self) {}

	fn save_view_state(&self) -> Option<Value> {
		None
	}

	fn restore_view_state(&self, _state: &Value) {}
}

/// Looks up contribution `id` on `surface` as a concrete type.
pub fn contribution_of<T: EditorContribution>(surface: &dyn EditorSurface, id: &str) -> Option<Rc<T>> {
	let contribution: Rc<dyn Any> = surface.contribution(id)?;
	contribution.downcast::<T>().ok()
}

/// Non-owning handle to the surface a contribution belongs to.
#[derive(Clone)]
pub struct SurfaceRef {
	id: SurfaceId,
	surface: Weak<dyn EditorSurface>,
}

impl SurfaceRef {
	pub fn new(id: SurfaceId, surface: Weak<dyn EditorSurface>) -> Self {
		Self { id, surface }
	}

	pub fn id(&self) -> SurfaceId {
		self.id
	}

	pub fn upgrade(&self) -> Option<Rc<dyn EditorSurface>> {
		self.surface.upgrade()
	}
}

impl fmt::Debug for SurfaceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SurfaceRef").field(&self.id).finish()
	}
}

/// Contribution constructor.
pub type ContributionCtor =
	Arc<dyn Fn(&SurfaceRef) -> Result<Rc<dyn EditorContribution>, ContributionError> + Send + Sync>;

#[derive(Clone)]
pub struct EditorContributionDescriptor {
	pub id: Arc<str>,
	pub ctor: ContributionCtor,
	pub instantiation: EditorContributionInstantiation,
}

impl fmt::Debug for EditorContributionDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EditorContributionDescriptor")
			.field("id", &self.id)
			.field("instantiation", &self.instantiation)
			.finish_non_exhaustive()
	}
}

/// Contribution for diff surfaces, always constructed eagerly.
#[derive(Clone)]
pub struct DiffEditorContributionDescriptor {
	pub id: Arc<str>,
	pub ctor: ContributionCtor,
}

impl fmt::Debug for DiffEditorContributionDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiffEditorContributionDescriptor")
			.field("id", &self.id)
			.finish_non_exhaustive()
	}
}

impl From<DiffEditorContributionDescriptor> for EditorContributionDescriptor {
	fn from(desc: DiffEditorContributionDescriptor) -> Self {
		Self {
			id: desc.id,
			ctor: desc.ctor,
			instantiation: EditorContributionInstantiation::Eager,
		}
	}
}
