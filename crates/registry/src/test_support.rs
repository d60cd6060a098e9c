//! In-memory collaborators for tests and for embedding without a real host.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use rustc_hash::FxHashMap as HashMap;
use url::Url;
use weft_context::{ContextSnapshot, ContextValue};
use weft_primitives::{BoxFutureLocal, SurfaceId};

use crate::config::ContributionTimings;
use crate::contributions::{ContributionHost, ContributionRegistry, EditorContribution, SurfaceRef};
use crate::error::CommandError;
use crate::services::{
	ContextKeyService, DocumentReference, DocumentService, EditorSurface, ServicesAccessor,
	SurfaceService, TelemetryEvent, TelemetryService, TextDocument,
};

/// Context keys backed by a mutable snapshot.
#[derive(Default)]
pub struct TestContextKeys {
	values: RefCell<ContextSnapshot>,
}

impl TestContextKeys {
	pub fn new(values: ContextSnapshot) -> Rc<Self> {
		Rc::new(Self {
			values: RefCell::new(values),
		})
	}

	pub fn set(&self, key: &str, value: impl Into<ContextValue>) {
		self.values.borrow_mut().set(key, value);
	}

	pub fn remove(&self, key: &str) {
		self.values.borrow_mut().remove(key);
	}
}

impl ContextKeyService for TestContextKeys {
	fn context(&self) -> ContextSnapshot {
		self.values.borrow().clone()
	}
}

/// An editing surface with its own context scope and, optionally, a
/// contribution host.
pub struct TestSurface {
	id: SurfaceId,
	context: Rc<TestContextKeys>,
	host: OnceCell<ContributionHost>,
}

impl TestSurface {
	pub fn new(context: ContextSnapshot) -> Rc<Self> {
		Rc::new(Self {
			id: SurfaceId::next(),
			context: TestContextKeys::new(context),
			host: OnceCell::new(),
		})
	}

	/// Creates a surface whose host is built from `registry`'s descriptors.
	///
	/// The host is installed before its eager contributions are built, so
	/// their constructors can already reach peers through the surface.
	pub fn with_contributions(
		context: ContextSnapshot,
		registry: &ContributionRegistry,
		timings: ContributionTimings,
		now: Instant,
	) -> Rc<Self> {
		let surface = Self::new(context);
		let weak: Weak<dyn EditorSurface> = Rc::downgrade(&surface) as Weak<dyn EditorSurface>;
		let host = surface.host.get_or_init(|| {
			ContributionHost::new(
				SurfaceRef::new(surface.id, weak),
				registry.editor_contributions(),
				timings,
				now,
			)
		});
		host.initialize();
		surface
	}

	pub fn context_keys_handle(&self) -> &Rc<TestContextKeys> {
		&self.context
	}

	pub fn host(&self) -> Option<&ContributionHost> {
		self.host.get()
	}
}

impl EditorSurface for TestSurface {
	fn id(&self) -> SurfaceId {
		self.id
	}

	fn context_keys(&self) -> Rc<dyn ContextKeyService> {
		self.context.clone()
	}

	fn contribution(&self, id: &str) -> Option<Rc<dyn EditorContribution>> {
		self.host.get()?.get(id)
	}
}

/// Focus tracking with explicitly set focused and active surfaces.
#[derive(Default)]
pub struct TestSurfaces {
	focused: RefCell<Option<Rc<dyn EditorSurface>>>,
	active: RefCell<Option<Rc<dyn EditorSurface>>>,
}

impl TestSurfaces {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn set_focused(&self, surface: Option<Rc<dyn EditorSurface>>) {
		*self.focused.borrow_mut() = surface;
	}

	pub fn set_active(&self, surface: Option<Rc<dyn EditorSurface>>) {
		*self.active.borrow_mut() = surface;
	}
}

impl SurfaceService for TestSurfaces {
	fn focused_surface(&self) -> Option<Rc<dyn EditorSurface>> {
		self.focused.borrow().clone()
	}

	fn active_surface(&self) -> Option<Rc<dyn EditorSurface>> {
		self.active.borrow().clone()
	}
}

/// Telemetry sink that keeps every event.
#[derive(Default)]
pub struct RecordingTelemetry {
	events: RefCell<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn events(&self) -> Vec<TelemetryEvent> {
		self.events.borrow().clone()
	}
}

impl TelemetryService for RecordingTelemetry {
	fn public_log(&self, event: TelemetryEvent) {
		self.events.borrow_mut().push(event);
	}
}

pub struct TestDocument {
	resource: Url,
	version: u64,
	line_count: u32,
}

impl TestDocument {
	pub fn new(resource: Url, line_count: u32) -> Rc<Self> {
		Rc::new(Self {
			resource,
			version: 1,
			line_count,
		})
	}
}

impl TextDocument for TestDocument {
	fn resource(&self) -> &Url {
		&self.resource
	}

	fn version(&self) -> u64 {
		self.version
	}

	fn line_count(&self) -> u32 {
		self.line_count
	}
}

/// Document service with loaded and on-disk documents, counting
/// acquisitions and releases.
#[derive(Default)]
pub struct InMemoryDocuments {
	loaded: RefCell<HashMap<Url, Rc<TestDocument>>>,
	on_disk: RefCell<HashMap<Url, Rc<TestDocument>>>,
	acquired: Rc<Cell<usize>>,
	released: Rc<Cell<usize>>,
}

impl InMemoryDocuments {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	/// A document already open in memory.
	pub fn insert_loaded(&self, document: Rc<TestDocument>) {
		self.loaded
			.borrow_mut()
			.insert(document.resource.clone(), document);
	}

	/// A document that must be acquired before use.
	pub fn insert_on_disk(&self, document: Rc<TestDocument>) {
		self.on_disk
			.borrow_mut()
			.insert(document.resource.clone(), document);
	}

	pub fn acquired(&self) -> usize {
		self.acquired.get()
	}

	pub fn released(&self) -> usize {
		self.released.get()
	}
}

impl DocumentService for InMemoryDocuments {
	fn get_document(&self, resource: &Url) -> Option<Rc<dyn TextDocument>> {
		let document = self.loaded.borrow().get(resource).cloned()?;
		Some(document)
	}

	fn acquire_document(&self, resource: &Url) -> BoxFutureLocal<'static, Result<DocumentReference, CommandError>> {
		let document = self.on_disk.borrow().get(resource).cloned();
		let resource = resource.clone();
		let acquired = self.acquired.clone();
		let released = self.released.clone();
		Box::pin(async move {
			let document: Rc<dyn TextDocument> =
				document.ok_or_else(|| CommandError::DocumentUnavailable(resource.to_string()))?;
			acquired.set(acquired.get() + 1);
			Ok::<_, CommandError>(DocumentReference::new(document, move || {
				released.set(released.get() + 1)
			}))
		})
	}
}

/// Wires `surfaces` and a root context into an accessor.
pub fn accessor(surfaces: Rc<TestSurfaces>, root: Rc<TestContextKeys>) -> ServicesAccessor {
	ServicesAccessor::new(surfaces, root)
}
