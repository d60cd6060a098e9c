use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use weft_context::{ContextKeyExpr, ContextSnapshot};

use super::*;
use crate::dispatch::{Dispatch, HandlerOutcome};
use crate::error::CommandError;
use crate::platform::{MenuId, weight};
use crate::test_support::{TestContextKeys, TestSurfaces, accessor};

fn root_accessor(context: ContextSnapshot) -> ServicesAccessor {
	accessor(TestSurfaces::new(), TestContextKeys::new(context))
}

fn names(command: &MultiCommand) -> Vec<String> {
	command
		.implementations()
		.iter()
		.map(|i| i.name().to_string())
		.collect()
}

#[test]
fn implementations_sorted_by_priority_with_stable_ties() {
	let command = MultiCommand::new(CommandOptions::new("sort"));
	for (priority, name) in [(1, "a"), (10, "b"), (1, "c"), (5, "d"), (10, "e")] {
		let _ = command.add_implementation(priority, name, |_, _| Ok(HandlerOutcome::NotHandled), None);
	}
	assert_eq!(names(&command), ["b", "e", "d", "a", "c"]);
}

#[test]
fn removing_a_handle_twice_is_a_noop() {
	let command = MultiCommand::new(CommandOptions::new("remove"));
	let a = command.add_implementation(1, "a", |_, _| Ok(HandlerOutcome::Handled), None);
	let _b = command.add_implementation(1, "b", |_, _| Ok(HandlerOutcome::Handled), None);

	assert!(command.remove_implementation(a));
	assert!(!command.remove_implementation(a));
	assert_eq!(names(&command), ["b"]);
}

#[test]
fn false_predicate_skips_without_trying() {
	let calls = Arc::new(Mutex::new(Vec::new()));
	let command = MultiCommand::new(CommandOptions::new("gated"));
	for (priority, name, when) in [
		(10, "a", Some(ContextKeyExpr::has("never"))),
		(5, "b", Some(ContextKeyExpr::has("editorFocus"))),
		(1, "c", None),
	] {
		let calls = calls.clone();
		let _ = command.add_implementation(
			priority,
			name,
			move |_, _| {
				calls.lock().unwrap().push(name);
				Ok(HandlerOutcome::Handled)
			},
			when,
		);
	}

	let accessor = root_accessor(ContextSnapshot::new().with("editorFocus", true));
	let dispatch = command.run_command(&accessor, &CommandArgs::new()).unwrap();
	assert!(!dispatch.is_pending());
	assert_eq!(*calls.lock().unwrap(), ["b"]);
}

#[test]
fn unhandled_command_completes_without_error() {
	let tried = Arc::new(AtomicUsize::new(0));
	let command = MultiCommand::new(CommandOptions::new("nobody"));
	for priority in [3, 2, 1] {
		let tried = tried.clone();
		let _ = command.add_implementation(
			priority,
			"decline",
			move |_, _| {
				tried.fetch_add(1, Ordering::SeqCst);
				Ok(HandlerOutcome::NotHandled)
			},
			None,
		);
	}

	let accessor = root_accessor(ContextSnapshot::new());
	assert!(matches!(
		command.run_command(&accessor, &CommandArgs::new()),
		Ok(Dispatch::Completed)
	));
	assert_eq!(tried.load(Ordering::SeqCst), 3);
}

#[test]
fn handler_error_is_returned_and_stops_the_walk() {
	let lower_ran = Arc::new(AtomicUsize::new(0));
	let command = MultiCommand::new(CommandOptions::new("fails"));
	let _ = command.add_implementation(
		10,
		"broken",
		|_, _| Err(CommandError::Failed("boom".into())),
		None,
	);
	let counter = lower_ran.clone();
	let _ = command.add_implementation(
		1,
		"fallback",
		move |_, _| {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(HandlerOutcome::Handled)
		},
		None,
	);

	let err = command
		.run_command(&root_accessor(ContextSnapshot::new()), &CommandArgs::new())
		.unwrap_err();
	assert_eq!(err, CommandError::Failed("boom".into()));
	assert_eq!(lower_ran.load(Ordering::SeqCst), 0);
}

#[test]
fn registration_during_dispatch_applies_to_later_dispatches() {
	let command = Arc::new(MultiCommand::new(CommandOptions::new("grow")));
	let calls = Arc::new(AtomicUsize::new(0));
	let target = Arc::downgrade(&command);
	let late_calls = calls.clone();
	let _ = command.add_implementation(
		1,
		"registers",
		move |_, _| {
			if let Some(command) = target.upgrade() {
				let late_calls = late_calls.clone();
				let _ = command.add_implementation(
					10,
					"late",
					move |_, _| {
						late_calls.fetch_add(1, Ordering::SeqCst);
						Ok(HandlerOutcome::Handled)
					},
					None,
				);
			}
			Ok(HandlerOutcome::NotHandled)
		},
		None,
	);

	let accessor = root_accessor(ContextSnapshot::new());
	let _ = command.run_command(&accessor, &CommandArgs::new()).unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 0);

	let _ = command.run_command(&accessor, &CommandArgs::new()).unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn register_command_publishes_combined_predicates() {
	let platform = Platform::new();
	let options = CommandOptions::new("editor.fold")
		.precondition(ContextKeyExpr::has("editorTextFocus"))
		.keybinding(
			KeybindingSpec::parse("ctrl-shift-[", weight::EDITOR_CONTRIB)
				.unwrap()
				.when(ContextKeyExpr::not("readonly")),
		)
		.menu(MenuSpec::new(MenuId::EDITOR_CONTEXT, "Fold").group("1_fold", 2));
	let command: Arc<dyn Command> = Arc::new(MultiCommand::new(options));
	register_command(&platform, command);

	let rule = &platform.keybindings.rules_for("editor.fold")[0];
	assert_eq!(rule.when.as_ref().unwrap().serialize(), "editorTextFocus && !readonly");
	assert_eq!(rule.weight, 100);

	let item = &platform.menus.items(&MenuId::EDITOR_CONTEXT)[0];
	assert_eq!(item.command.precondition, Some(ContextKeyExpr::has("editorTextFocus")));
	assert_eq!(item.when, Some(ContextKeyExpr::has("editorTextFocus")));
	assert_eq!(item.group.as_deref(), Some("1_fold"));
	assert!(platform.commands.contains("editor.fold"));
}

fn recording_target(id: &'static str, seen: &Arc<Mutex<Vec<CommandArgs>>>) -> Arc<MultiCommand> {
	let target = Arc::new(MultiCommand::new(CommandOptions::new(id)));
	let seen = seen.clone();
	let _ = target.add_implementation(
		1,
		"record",
		move |_: &ServicesAccessor, args: &CommandArgs| -> Result<HandlerOutcome, CommandError> {
			seen.lock().unwrap().push(args.clone());
			Ok(HandlerOutcome::Handled)
		},
		None,
	);
	target
}

#[test]
fn proxy_forwards_to_target() {
	let platform = Platform::new();
	let seen: Arc<Mutex<Vec<CommandArgs>>> = Arc::default();
	let target = recording_target("x", &seen);
	register_command(&platform, target.clone());
	register_command(
		&platform,
		Arc::new(ProxyCommand::new(target, CommandOptions::new("p"))),
	);

	let args = CommandArgs::new()
		.with("file:///lib.rs")
		.with(serde_json::json!({ "lineNumber": 4, "column": 1 }))
		.with(-7);
	let accessor = root_accessor(ContextSnapshot::new());
	assert!(platform.commands.execute("p", &accessor, &args).is_ok());
	assert!(platform.commands.execute("x", &accessor, &args).is_ok());
	assert_eq!(*seen.lock().unwrap(), [args.clone(), args]);
}

proptest! {
	#[test]
	fn proxy_passes_arguments_through_unchanged(
		numbers in prop::collection::vec(any::<i64>(), 0..6),
		text in ".{0,12}",
	) {
		let platform = Platform::new();
		let seen: Arc<Mutex<Vec<CommandArgs>>> = Arc::default();
		let target = recording_target("x", &seen);
		register_command(&platform, Arc::new(ProxyCommand::new(target, CommandOptions::new("p"))));

		let args: CommandArgs = numbers
			.iter()
			.map(|&n| serde_json::Value::from(n))
			.chain([serde_json::Value::from(text)])
			.collect();
		let accessor = root_accessor(ContextSnapshot::new());
		prop_assert!(platform.commands.execute("p", &accessor, &args).is_ok());
		let seen = seen.lock().unwrap();
		prop_assert_eq!(seen.as_slice(), std::slice::from_ref(&args));
	}

	#[test]
	fn dispatch_order_is_priority_then_insertion(priorities in prop::collection::vec(-5i32..5, 0..24)) {
		let command = MultiCommand::new(CommandOptions::new("prop"));
		for (index, priority) in priorities.iter().enumerate() {
			let _ = command.add_implementation(*priority, index.to_string(), |_, _| Ok(HandlerOutcome::NotHandled), None);
		}

		let listed: Vec<(i32, usize)> = command
			.implementations()
			.iter()
			.map(|i| (i.priority(), i.name().parse().unwrap()))
			.collect();
		let mut expected: Vec<(i32, usize)> = priorities.iter().copied().zip(0..).collect();
		expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
		prop_assert_eq!(listed, expected);
	}
}
