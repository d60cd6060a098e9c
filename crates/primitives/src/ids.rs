use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one editing surface instance.
///
/// Surface ids are never reused within a process, which makes them safe keys
/// for side tables that outlive a surface by mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u64);

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

impl SurfaceId {
	/// Wraps a raw id handed out by the host.
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	/// Allocates a fresh, process-unique id.
	pub fn next() -> Self {
		Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub const fn raw(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface#{}", self.0)
	}
}
