use pretty_assertions::assert_eq;
use weft_context::ContextSnapshot;

use super::*;
use crate::args::CommandArgs;
use crate::dispatch::Dispatch;
use crate::error::CommandError;
use crate::test_support::{TestContextKeys, TestSurfaces, accessor};

fn empty_accessor() -> crate::ServicesAccessor {
	accessor(TestSurfaces::new(), TestContextKeys::new(ContextSnapshot::new()))
}

#[test]
fn execute_unknown_id_is_not_found() {
	let commands = CommandsRegistry::new();
	let err = commands
		.execute("missing", &empty_accessor(), &CommandArgs::new())
		.unwrap_err();
	assert_eq!(err, CommandError::NotFound("missing".into()));
}

#[test]
fn reregistration_replaces_handler() {
	let commands = CommandsRegistry::new();
	commands.register("dup".into(), |_, _| Err(CommandError::Failed("first".into())), None);
	commands.register(
		"dup".into(),
		|_, _| Ok(Dispatch::Completed),
		Some(CommandMetadata::new("second").arg("count", "how many")),
	);

	assert_eq!(commands.len(), 1);
	assert!(
		commands
			.execute("dup", &empty_accessor(), &CommandArgs::new())
			.is_ok()
	);
	assert_eq!(commands.metadata("dup").unwrap().description, "second");
}

#[test]
fn ids_are_sorted() {
	let commands = CommandsRegistry::new();
	for id in ["b.two", "a.one", "c.three"] {
		commands.register(id.into(), |_, _| Ok(Dispatch::Completed), None);
	}
	let ids: Vec<String> = commands.ids().iter().map(|id| id.to_string()).collect();
	assert_eq!(ids, ["a.one", "b.two", "c.three"]);
}

#[test]
fn handler_can_reenter_table() {
	let platform = std::sync::Arc::new(Platform::new());
	let inner = platform.clone();
	platform.commands.register(
		"outer".into(),
		move |accessor, args| {
			inner
				.commands
				.register("late".into(), |_, _| Ok(Dispatch::Completed), None);
			inner.commands.execute("late", accessor, args)
		},
		None,
	);

	assert!(
		platform
			.commands
			.execute("outer", &empty_accessor(), &CommandArgs::new())
			.is_ok()
	);
	assert!(platform.commands.contains("late"));
}

fn item(command: &str, group: Option<&str>, order: i32) -> MenuItem {
	MenuItem {
		menu_id: MenuId::EDITOR_CONTEXT,
		command: MenuCommand {
			id: command.into(),
			title: command.to_string(),
			icon: None,
			precondition: None,
		},
		when: None,
		group: group.map(str::to_string),
		order,
	}
}

#[test]
fn menu_items_sort_by_group_then_order() {
	let menus = MenuRegistry::new();
	menus.append_menu_item(item("cut", Some("9_cutcopypaste"), 1));
	menus.append_menu_item(item("rename", Some("1_modification"), 1));
	menus.append_menu_item(item("copy", Some("9_cutcopypaste"), 1));
	menus.append_menu_item(item("format", Some("1_modification"), 0));

	let titles: Vec<String> = menus
		.items(&MenuId::EDITOR_CONTEXT)
		.into_iter()
		.map(|item| item.command.title)
		.collect();
	assert_eq!(titles, ["format", "rename", "cut", "copy"]);
	assert!(menus.items(&MenuId::COMMAND_PALETTE).is_empty());
	assert_eq!(menus.menus(), vec![MenuId::EDITOR_CONTEXT]);
}

#[test]
fn keybinding_rules_filter_by_command() {
	let keybindings = KeybindingsRegistry::new();
	let rule = |id: &str, weight| KeybindingRule {
		id: id.into(),
		weight,
		args: None,
		when: None,
		primary: Some("ctrl-k".parse().unwrap()),
		secondary: Vec::new(),
		mac: None,
		linux: None,
		windows: None,
	};
	keybindings.register_rule(rule("a", weight::EDITOR_CORE));
	keybindings.register_rule(rule("b", weight::EDITOR_CONTRIB));
	keybindings.register_rule(rule("a", weight::EXTERNAL_EXTENSION));

	let weights: Vec<i32> = keybindings.rules_for("a").iter().map(|r| r.weight).collect();
	assert_eq!(weights, [0, 400]);
	assert_eq!(keybindings.rules().len(), 3);
}
