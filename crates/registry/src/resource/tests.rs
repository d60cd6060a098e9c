use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serde_json::json;
use url::Url;
use weft_context::ContextSnapshot;
use weft_primitives::Position;

use super::*;
use crate::test_support::{InMemoryDocuments, TestContextKeys, TestDocument, TestSurfaces, accessor};

fn uri(path: &str) -> Url {
	Url::parse(&format!("file:///{path}")).unwrap()
}

fn setup() -> (Platform, Rc<InMemoryDocuments>, ServicesAccessor) {
	let documents = InMemoryDocuments::new();
	let accessor = accessor(TestSurfaces::new(), TestContextKeys::new(ContextSnapshot::new()))
		.with_documents(documents.clone());
	(Platform::new(), documents, accessor)
}

type Calls = Arc<Mutex<Vec<(String, Position)>>>;

fn register_recorder(platform: &Platform, calls: &Calls) {
	let calls = calls.clone();
	register_model_and_position_command(platform, "test.atPosition", move |_, document, position, _| {
		calls
			.lock()
			.unwrap()
			.push((document.resource().to_string(), position));
		Ok(Dispatch::Completed)
	});
}

#[test]
fn malformed_arguments_fail_before_side_effects() {
	let (platform, documents, accessor) = setup();
	documents.insert_on_disk(TestDocument::new(uri("a.rs"), 10));
	let calls = Calls::default();
	register_recorder(&platform, &calls);

	let bad_position = CommandArgs::new()
		.with(uri("a.rs").as_str())
		.with(json!({ "lineNumber": "one" }));
	let err = platform
		.commands
		.execute("test.atPosition", &accessor, &bad_position)
		.unwrap_err();
	assert!(matches!(err, CommandError::InvalidArgument { index: 1, .. }));

	let bad_resource = CommandArgs::new().with("not a url").with(json!(Position::new(1, 1)));
	let err = platform
		.commands
		.execute("test.atPosition", &accessor, &bad_resource)
		.unwrap_err();
	assert!(matches!(err, CommandError::InvalidArgument { index: 0, .. }));

	let err = platform
		.commands
		.execute("test.atPosition", &accessor, &CommandArgs::new().with(uri("a.rs").as_str()))
		.unwrap_err();
	assert!(matches!(err, CommandError::MissingArgument { index: 1, .. }));

	assert!(calls.lock().unwrap().is_empty());
	assert_eq!(documents.acquired(), 0);
}

#[test]
fn loaded_document_runs_synchronously() {
	let (platform, documents, accessor) = setup();
	documents.insert_loaded(TestDocument::new(uri("open.rs"), 3));
	let calls = Calls::default();
	register_recorder(&platform, &calls);

	let args = CommandArgs::new().with(uri("open.rs").as_str()).with(json!(Position::new(2, 5)));
	let dispatch = platform
		.commands
		.execute("test.atPosition", &accessor, &args)
		.unwrap();
	assert!(!dispatch.is_pending());
	assert_eq!(
		*calls.lock().unwrap(),
		[("file:///open.rs".to_string(), Position::new(2, 5))]
	);
	assert_eq!(documents.acquired(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn unloaded_document_is_acquired_and_released() {
	let (platform, documents, accessor) = setup();
	documents.insert_on_disk(TestDocument::new(uri("closed.rs"), 40));
	let calls = Calls::default();
	register_recorder(&platform, &calls);

	let args = CommandArgs::new().with(uri("closed.rs").as_str()).with(json!(Position::new(7, 1)));
	let dispatch = platform
		.commands
		.execute("test.atPosition", &accessor, &args)
		.unwrap();
	assert!(dispatch.is_pending());

	dispatch.finish().await.unwrap();
	assert_eq!(calls.lock().unwrap().len(), 1);
	assert_eq!(documents.acquired(), 1);
	assert_eq!(documents.released(), 1);
}

#[test]
fn dropped_pending_dispatch_never_acquires() {
	let (platform, documents, accessor) = setup();
	documents.insert_on_disk(TestDocument::new(uri("closed.rs"), 40));
	let calls = Calls::default();
	register_recorder(&platform, &calls);

	let args = CommandArgs::new().with(uri("closed.rs").as_str()).with(json!(Position::new(3, 2)));
	let dispatch = platform
		.commands
		.execute("test.atPosition", &accessor, &args)
		.unwrap();
	assert!(dispatch.is_pending());
	drop(dispatch);

	assert!(calls.lock().unwrap().is_empty());
	assert_eq!(documents.acquired(), documents.released());
	assert_eq!(documents.acquired(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn reference_is_released_after_pending_failure() {
	let (platform, documents, accessor) = setup();
	documents.insert_on_disk(TestDocument::new(uri("fail.rs"), 1));
	register_model_command(&platform, "test.model", |_, document, args| {
		assert_eq!(document.line_count(), 1);
		let reason = args.require::<String>(0, "reason")?;
		Ok(Dispatch::pending(async move { Err::<(), _>(CommandError::Failed(reason)) }))
	});

	let args = CommandArgs::new().with(uri("fail.rs").as_str()).with("rejected");
	let dispatch = platform.commands.execute("test.model", &accessor, &args).unwrap();
	let err = dispatch.finish().await.unwrap_err();

	assert_eq!(err, CommandError::Failed("rejected".into()));
	assert_eq!(documents.released(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_document_is_unavailable() {
	let (platform, documents, accessor) = setup();
	register_model_command(&platform, "test.model", |_, _, _| Ok(Dispatch::Completed));

	let args = CommandArgs::new().with(uri("ghost.rs").as_str());
	let dispatch = platform.commands.execute("test.model", &accessor, &args).unwrap();
	assert!(matches!(
		dispatch.finish().await,
		Err(CommandError::DocumentUnavailable(_))
	));
	assert_eq!(documents.released(), 0);
}

#[test]
fn missing_document_service_is_reported() {
	let platform = Platform::new();
	let accessor = accessor(TestSurfaces::new(), TestContextKeys::new(ContextSnapshot::new()));
	register_model_command(&platform, "test.model", |_, _, _| Ok(Dispatch::Completed));

	let err = platform
		.commands
		.execute("test.model", &accessor, &CommandArgs::new().with(uri("a.rs").as_str()))
		.unwrap_err();
	assert_eq!(err, CommandError::DocumentUnavailable("file:///a.rs".into()));
}
