use std::cell::RefCell;

use rustc_hash::FxHashMap as HashMap;
use tracing::trace;
use weft_primitives::SurfaceId;

/// Per-surface state kept outside the surface itself.
///
/// Entries exist from [`on_surface_created`](Self::on_surface_created) until
/// [`on_surface_disposed`](Self::on_surface_disposed); the owner wires both
/// to the surface lifecycle.
pub struct SurfaceSideTable<T> {
	entries: RefCell<HashMap<SurfaceId, T>>,
}

impl<T> Default for SurfaceSideTable<T> {
	fn default() -> Self {
		Self {
			entries: RefCell::new(HashMap::default()),
		}
	}
}

impl<T> SurfaceSideTable<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts state for `surface`, replacing any stale entry.
	pub fn on_surface_created(&self, surface: SurfaceId, value: T) {
		trace!(surface = %surface, "side table entry created");
		self.entries.borrow_mut().insert(surface, value);
	}

	/// Removes and returns the state for `surface`.
	pub fn on_surface_disposed(&self, surface: SurfaceId) -> Option<T> {
		self.entries.borrow_mut().remove(&surface)
	}

	pub fn contains(&self, surface: SurfaceId) -> bool {
		self.entries.borrow().contains_key(&surface)
	}

	/// Runs `f` on the state for `surface`. The table must not be touched
	/// from inside `f`.
	pub fn with<R>(&self, surface: SurfaceId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
		self.entries.borrow_mut().get_mut(&surface).map(f)
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl<T: Clone> SurfaceSideTable<T> {
	pub fn get(&self, surface: SurfaceId) -> Option<T> {
		self.entries.borrow().get(&surface).cloned()
	}
}
