use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use tracing::trace;
use weft_context::ContextKeyExpr;

use crate::dispatch::{CommandResult, Dispatch, HandlerOutcome};
use crate::error::CommandError;
use crate::services::ContextKeyService;

/// Token returned by `add_implementation`, used to remove that entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImplementationHandle(u64);

/// One competing handler of a multiplexed command.
pub struct Implementation<H: ?Sized> {
	priority: i32,
	name: Arc<str>,
	when: Option<ContextKeyExpr>,
	handler: Arc<H>,
	handle: ImplementationHandle,
}

impl<H: ?Sized> Implementation<H> {
	pub fn priority(&self) -> i32 {
		self.priority
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn when(&self) -> Option<&ContextKeyExpr> {
		self.when.as_ref()
	}

	pub fn handle(&self) -> ImplementationHandle {
		self.handle
	}
}

impl<H: ?Sized> Clone for Implementation<H> {
	fn clone(&self) -> Self {
		Self {
			priority: self.priority,
			name: self.name.clone(),
			when: self.when.clone(),
			handler: self.handler.clone(),
			handle: self.handle,
		}
	}
}

impl<H: ?Sized> fmt::Debug for Implementation<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Implementation")
			.field("priority", &self.priority)
			.field("name", &self.name)
			.field("when", &self.when)
			.field("handle", &self.handle)
			.finish_non_exhaustive()
	}
}

/// Copy-on-write list kept sorted by descending priority.
///
/// Readers take a snapshot, so an in-flight dispatch never observes
/// registrations made while it runs.
pub(crate) struct ImplementationList<H: ?Sized> {
	entries: ArcSwap<Vec<Implementation<H>>>,
	next_handle: AtomicU64,
}

impl<H: ?Sized> Default for ImplementationList<H> {
	fn default() -> Self {
		Self {
			entries: ArcSwap::from_pointee(Vec::new()),
			next_handle: AtomicU64::new(0),
		}
	}
}

impl<H: ?Sized> ImplementationList<H> {
	/// Inserts after every entry of equal or higher priority.
	pub(crate) fn insert(
		&self,
		priority: i32,
		name: Arc<str>,
		handler: Arc<H>,
		when: Option<ContextKeyExpr>,
	) -> ImplementationHandle {
		let handle = ImplementationHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
		let entry = Implementation {
			priority,
			name,
			when,
			handler,
			handle,
		};
		self.entries.rcu(|current| {
			let mut next: Vec<_> = current.iter().cloned().collect();
			let at = next.partition_point(|e| e.priority >= priority);
			next.insert(at, entry.clone());
			next
		});
		handle
	}

	/// Returns whether an entry was removed; stale handles are a no-op.
	pub(crate) fn remove(&self, handle: ImplementationHandle) -> bool {
		let mut removed = false;
		self.entries.rcu(|current| {
			let next: Vec<_> = current
				.iter()
				.filter(|e| e.handle != handle)
				.cloned()
				.collect();
			removed = next.len() != current.len();
			next
		});
		removed
	}

	pub(crate) fn snapshot(&self) -> Arc<Vec<Implementation<H>>> {
		self.entries.load_full()
	}
}

/// Walks `list` in priority order until one implementation accepts the call.
///
/// Entries whose `when` does not hold in `context` are skipped without being
/// tried. A handler error stops the walk and is returned as is.
pub(crate) fn dispatch_implementations<H, F>(
	id: &str,
	list: &ImplementationList<H>,
	context: &dyn ContextKeyService,
	mut invoke: F,
) -> CommandResult
where
	H: ?Sized,
	F: FnMut(&H) -> Result<HandlerOutcome, CommandError>,
{
	let snapshot = list.snapshot();
	trace!(id, implementations = snapshot.len(), "dispatching command");

	for implementation in snapshot.iter() {
		if !context.context_matches(implementation.when.as_ref()) {
			continue;
		}
		match invoke(implementation.handler.as_ref())? {
			HandlerOutcome::NotHandled => {}
			HandlerOutcome::Handled => {
				trace!(id, implementation = %implementation.name, "command handled");
				return Ok(Dispatch::Completed);
			}
			HandlerOutcome::HandledPending(future) => {
				trace!(id, implementation = %implementation.name, "command handled, pending");
				return Ok(Dispatch::Pending(future));
			}
		}
	}

	trace!(id, "command not handled by any implementation");
	Ok(Dispatch::Completed)
}
