//! Collaborator interfaces consumed by dispatch.
//!
//! The editing surface, the context key engine, telemetry and document loading
//! all live outside this crate. Handlers reach them through a
//! [`ServicesAccessor`], which is cheap to clone so pending handlers can carry
//! it into their futures.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use url::Url;
use weft_context::{ContextKeyExpr, ContextSnapshot};
use weft_primitives::{BoxFutureLocal, SurfaceId};

use crate::contributions::EditorContribution;
use crate::error::CommandError;

/// Source of the current context key values for a scope.
pub trait ContextKeyService {
	/// Captures the values visible in this scope right now.
	///
	/// The root service answers for the currently focused element.
	fn context(&self) -> ContextSnapshot;

	/// Evaluates `expr` against a fresh capture; an absent predicate matches.
	fn context_matches(&self, expr: Option<&ContextKeyExpr>) -> bool {
		expr.is_none_or(|expr| expr.evaluate(&self.context()))
	}
}

/// One editing surface instance, opaque apart from what dispatch needs.
pub trait EditorSurface {
	fn id(&self) -> SurfaceId;

	/// The surface's own context scope.
	fn context_keys(&self) -> Rc<dyn ContextKeyService>;

	/// Looks up a contribution, constructing it on demand if the host allows.
	fn contribution(&self, id: &str) -> Option<Rc<dyn EditorContribution>>;
}

/// Focus tracking for editing surfaces.
pub trait SurfaceService {
	fn focused_surface(&self) -> Option<Rc<dyn EditorSurface>>;
	fn active_surface(&self) -> Option<Rc<dyn EditorSurface>>;
}

/// Telemetry events emitted by the framework itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TelemetryEvent {
	/// Fired before every editor action invocation.
	EditorActionInvoked { name: String, id: String },
}

/// Fire-and-forget telemetry sink.
pub trait TelemetryService {
	fn public_log(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops every event.
pub struct NullTelemetry;

impl TelemetryService for NullTelemetry {
	fn public_log(&self, _event: TelemetryEvent) {}
}

/// A loaded text document.
pub trait TextDocument {
	fn resource(&self) -> &Url;
	fn version(&self) -> u64;
	fn line_count(&self) -> u32;
}

/// A temporarily acquired document. The reference is released on drop.
pub struct DocumentReference {
	document: Rc<dyn TextDocument>,
	release: Option<Box<dyn FnOnce()>>,
}

impl DocumentReference {
	pub fn new(document: Rc<dyn TextDocument>, release: impl FnOnce() + 'static) -> Self {
		Self {
			document,
			release: Some(Box::new(release)),
		}
	}

	pub fn document(&self) -> &Rc<dyn TextDocument> {
		&self.document
	}
}

impl Drop for DocumentReference {
	fn drop(&mut self) {
		if let Some(release) = self.release.take() {
			release();
		}
	}
}

impl fmt::Debug for DocumentReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DocumentReference")
			.field("resource", &self.document.resource().as_str())
			.finish()
	}
}

/// Document lookup and on-demand loading.
pub trait DocumentService {
	/// Returns the document if it is already loaded.
	fn get_document(&self, resource: &Url) -> Option<Rc<dyn TextDocument>>;

	/// Loads the document and holds it until the reference is dropped.
	fn acquire_document(&self, resource: &Url) -> BoxFutureLocal<'static, Result<DocumentReference, CommandError>>;
}

/// Handle to the services visible to a handler.
#[derive(Clone)]
pub struct ServicesAccessor {
	surfaces: Rc<dyn SurfaceService>,
	context_keys: Rc<dyn ContextKeyService>,
	telemetry: Rc<dyn TelemetryService>,
	documents: Option<Rc<dyn DocumentService>>,
}

impl ServicesAccessor {
	pub fn new(surfaces: Rc<dyn SurfaceService>, context_keys: Rc<dyn ContextKeyService>) -> Self {
		Self {
			surfaces,
			context_keys,
			telemetry: Rc::new(NullTelemetry),
			documents: None,
		}
	}

	pub fn with_telemetry(mut self, telemetry: Rc<dyn TelemetryService>) -> Self {
		self.telemetry = telemetry;
		self
	}

	pub fn with_documents(mut self, documents: Rc<dyn DocumentService>) -> Self {
		self.documents = Some(documents);
		self
	}

	/// Derives an accessor whose context keys answer for `scope`.
	pub fn within_scope(&self, scope: Rc<dyn ContextKeyService>) -> Self {
		Self {
			context_keys: scope,
			..self.clone()
		}
	}

	/// The implicit target surface: focused, else active.
	pub fn resolve_surface(&self) -> Option<Rc<dyn EditorSurface>> {
		self.surfaces
			.focused_surface()
			.or_else(|| self.surfaces.active_surface())
	}

	pub fn surfaces(&self) -> &dyn SurfaceService {
		&*self.surfaces
	}

	pub fn context_keys(&self) -> &dyn ContextKeyService {
		&*self.context_keys
	}

	pub fn telemetry(&self) -> &dyn TelemetryService {
		&*self.telemetry
	}

	pub fn documents(&self) -> Option<&dyn DocumentService> {
		self.documents.as_deref()
	}
}
