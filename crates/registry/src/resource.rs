//! Commands addressed to a document by resource URL.
//!
//! Argument 0 is the resource and, for the position variant, argument 1 is a
//! `{ lineNumber, column }` position. Both are validated before anything else
//! happens. A document that is not loaded is acquired first and held until
//! the handler, including any pending part of it, has finished.

use std::rc::Rc;
use std::sync::Arc;

use tracing::trace;
use url::Url;
use weft_primitives::Position;

use crate::args::CommandArgs;
use crate::dispatch::{CommandResult, Dispatch};
use crate::error::CommandError;
use crate::platform::Platform;
use crate::services::{ServicesAccessor, TextDocument};

pub fn register_model_and_position_command<F>(platform: &Platform, id: impl Into<Arc<str>>, handler: F)
where
	F: Fn(&ServicesAccessor, &Rc<dyn TextDocument>, Position, &CommandArgs) -> CommandResult
		+ Send
		+ Sync
		+ 'static,
{
	let handler = Arc::new(handler);
	platform.commands.register(
		id.into(),
		move |accessor, args| {
			let resource: Url = args.require(0, "resource")?;
			let position: Position = args.require(1, "position")?;
			let rest = args.tail(2);
			let handler = handler.clone();
			with_document(accessor, &resource, move |accessor, document| {
				(*handler)(accessor, document, position, &rest)
			})
		},
		None,
	);
}

pub fn register_model_command<F>(platform: &Platform, id: impl Into<Arc<str>>, handler: F)
where
	F: Fn(&ServicesAccessor, &Rc<dyn TextDocument>, &CommandArgs) -> CommandResult + Send + Sync + 'static,
{
	let handler = Arc::new(handler);
	platform.commands.register(
		id.into(),
		move |accessor, args| {
			let resource: Url = args.require(0, "resource")?;
			let rest = args.tail(1);
			let handler = handler.clone();
			with_document(accessor, &resource, move |accessor, document| {
				(*handler)(accessor, document, &rest)
			})
		},
		None,
	);
}

fn with_document<F>(accessor: &ServicesAccessor, resource: &Url, run: F) -> CommandResult
where
	F: FnOnce(&ServicesAccessor, &Rc<dyn TextDocument>) -> CommandResult + 'static,
{
	let Some(documents) = accessor.documents() else {
		return Err(CommandError::DocumentUnavailable(resource.to_string()));
	};
	if let Some(document) = documents.get_document(resource) {
		return run(accessor, &document);
	}

	trace!(resource = %resource, "acquiring document");
	let acquire = documents.acquire_document(resource);
	let accessor = accessor.clone();
	Ok(Dispatch::pending(async move {
		let reference = acquire.await?;
		let outcome = match run(&accessor, reference.document()) {
			Ok(dispatch) => dispatch.finish().await,
			Err(error) => Err(error),
		};
		drop(reference);
		outcome
	}))
}

#[cfg(test)]
mod tests;
