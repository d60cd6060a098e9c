use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error, trace};

use super::{
	DiffEditorContributionDescriptor, EditorContribution, EditorContributionDescriptor,
	EditorContributionInstantiation as Instantiation, SurfaceRef,
};
use crate::config::ContributionTimings;

struct Instance {
	instantiation: Instantiation,
	contribution: Rc<dyn EditorContribution>,
}

struct HostState {
	pending: IndexMap<Arc<str>, EditorContributionDescriptor>,
	instances: IndexMap<Arc<str>, Instance>,
	after_first_render_at: Option<Instant>,
	eventually_at: Option<Instant>,
	disposed: bool,
}

/// Owns the contributions of one surface and decides when each is built.
///
/// The host is driven by its surface: lifecycle notifications
/// ([`on_model_attached`](Self::on_model_attached),
/// [`on_before_interaction`](Self::on_before_interaction),
/// [`on_idle`](Self::on_idle)) and a clock via [`tick`](Self::tick).
/// Implicit triggers never go past `Eventually`; `Lazy` contributions are
/// only built by [`get`](Self::get).
///
/// Constructors run with no internal borrow held, so a constructor may
/// request other contributions from the same host. The surface must be able
/// to reach the host before [`initialize`](Self::initialize) runs for that
/// to work for `Eager` contributions.
pub struct ContributionHost {
	surface: SurfaceRef,
	timings: ContributionTimings,
	state: RefCell<HostState>,
}

impl ContributionHost {
	/// Records the descriptors and arms the `Eventually` deadline. Nothing
	/// is built until [`initialize`](Self::initialize).
	///
	/// Later descriptors reusing an id are dropped.
	pub fn new(
		surface: SurfaceRef,
		descriptors: impl IntoIterator<Item = EditorContributionDescriptor>,
		timings: ContributionTimings,
		now: Instant,
	) -> Self {
		let mut pending = IndexMap::new();
		for desc in descriptors {
			if pending.contains_key(&desc.id) {
				error!(id = %desc.id, surface = %surface.id(), "cannot have two contributions with the same id");
				continue;
			}
			pending.insert(desc.id.clone(), desc);
		}

		Self {
			surface,
			timings,
			state: RefCell::new(HostState {
				pending,
				instances: IndexMap::new(),
				after_first_render_at: None,
				eventually_at: Some(now + timings.eventually()),
				disposed: false,
			}),
		}
	}

	/// Builds every `Eager` contribution. Call once the surface hands out
	/// this host.
	pub fn initialize(&self) {
		self.instantiate_up_to(Instantiation::Eager);
	}

	/// Host for a diff surface; every diff contribution is eager and built by
	/// [`initialize`](Self::initialize).
	pub fn for_diff(
		surface: SurfaceRef,
		descriptors: impl IntoIterator<Item = DiffEditorContributionDescriptor>,
		timings: ContributionTimings,
		now: Instant,
	) -> Self {
		Self::new(surface, descriptors.into_iter().map(Into::into), timings, now)
	}

	pub fn surface(&self) -> &SurfaceRef {
		&self.surface
	}

	/// Arms the `AfterFirstRender` deadline. Only the first call counts.
	pub fn on_model_attached(&self, now: Instant) {
		let mut state = self.state.borrow_mut();
		if state.after_first_render_at.is_none() && has_pending(&state, Instantiation::AfterFirstRender) {
			state.after_first_render_at = Some(now + self.timings.after_first_render());
		}
	}

	pub fn on_before_interaction(&self) {
		self.instantiate_up_to(Instantiation::BeforeFirstInteraction);
	}

	/// Idle time is available: build everything short of `Lazy`.
	pub fn on_idle(&self) {
		self.instantiate_up_to(Instantiation::Eventually);
	}

	/// Fires the deadlines that have expired by `now`.
	pub fn tick(&self, now: Instant) {
		let level = {
			let mut state = self.state.borrow_mut();
			let mut level = None;
			if state.after_first_render_at.is_some_and(|at| at <= now) {
				state.after_first_render_at = None;
				level = Some(Instantiation::AfterFirstRender);
			}
			if state.eventually_at.is_some_and(|at| at <= now) {
				state.eventually_at = None;
				level = Some(Instantiation::Eventually);
			}
			level
		};
		if let Some(level) = level {
			self.instantiate_up_to(level);
		}
	}

	/// Earliest armed deadline, for scheduling the next [`tick`](Self::tick).
	pub fn next_deadline(&self) -> Option<Instant> {
		let state = self.state.borrow();
		match (state.after_first_render_at, state.eventually_at) {
			(Some(a), Some(b)) => Some(a.min(b)),
			(a, b) => a.or(b),
		}
	}

	/// Returns contribution `id`, building it now if it is still pending.
	pub fn get(&self, id: &str) -> Option<Rc<dyn EditorContribution>> {
		self.instantiate(id)
	}

	pub fn is_instantiated(&self, id: &str) -> bool {
		self.state.borrow().instances.contains_key(id)
	}

	/// Ids of built contributions, in construction order.
	pub fn instantiated_ids(&self) -> Vec<Arc<str>> {
		self.state.borrow().instances.keys().cloned().collect()
	}

	/// Collects view state from the eager contributions.
	pub fn save_view_state(&self) -> IndexMap<Arc<str>, Value> {
		self.eager_instances()
			.into_iter()
			.filter_map(|(id, contribution)| Some((id, contribution.save_view_state()?)))
			.collect()
	}

	pub fn restore_view_state(&self, state: &IndexMap<Arc<str>, Value>) {
		for (id, contribution) in self.eager_instances() {
			if let Some(value) = state.get(&id) {
				contribution.restore_view_state(value);
			}
		}
	}

	/// Disposes every built contribution in construction order. Pending
	/// contributions are discarded and later calls do nothing.
	pub fn dispose(&self) {
		let instances = {
			let mut state = self.state.borrow_mut();
			if state.disposed {
				return;
			}
			state.disposed = true;
			state.pending.clear();
			state.after_first_render_at = None;
			state.eventually_at = None;
			std::mem::take(&mut state.instances)
		};
		debug!(surface = %self.surface.id(), count = instances.len(), "disposing contributions");
		for instance in instances.into_values() {
			instance.contribution.dispose();
		}
	}

	pub fn is_disposed(&self) -> bool {
		self.state.borrow().disposed
	}

	fn eager_instances(&self) -> Vec<(Arc<str>, Rc<dyn EditorContribution>)> {
		self.state
			.borrow()
			.instances
			.iter()
			.filter(|(_, instance)| instance.instantiation == Instantiation::Eager)
			.map(|(id, instance)| (id.clone(), instance.contribution.clone()))
			.collect()
	}

	fn instantiate_up_to(&self, level: Instantiation) {
		let ids: Vec<Arc<str>> = {
			let state = self.state.borrow();
			if state.disposed {
				return;
			}
			state
				.pending
				.values()
				.filter(|desc| desc.instantiation <= level)
				.map(|desc| desc.id.clone())
				.collect()
		};
		for id in ids {
			// A constructor earlier in this batch may already have built it.
			let _ = self.instantiate(&id);
		}
	}

	fn instantiate(&self, id: &str) -> Option<Rc<dyn EditorContribution>> {
		let desc = {
			let mut state = self.state.borrow_mut();
			if state.disposed {
				return None;
			}
			if let Some(instance) = state.instances.get(id) {
				return Some(instance.contribution.clone());
			}
			state.pending.shift_remove(id)?
		};

		trace!(id = %desc.id, surface = %self.surface.id(), instantiation = ?desc.instantiation, "instantiating contribution");
		let contribution = match (desc.ctor)(&self.surface) {
			Ok(contribution) => contribution,
			Err(error) => {
				error!(id = %desc.id, surface = %self.surface.id(), %error, "contribution constructor failed");
				return None;
			}
		};

		let mut state = self.state.borrow_mut();
		if state.disposed {
			drop(state);
			contribution.dispose();
			return None;
		}
		state.instances.insert(
			desc.id.clone(),
			Instance {
				instantiation: desc.instantiation,
				contribution: contribution.clone(),
			},
		);
		Some(contribution)
	}
}

fn has_pending(state: &HostState, instantiation: Instantiation) -> bool {
	state
		.pending
		.values()
		.any(|desc| desc.instantiation == instantiation)
}
