//! Host-side sinks: the invocation table, keybinding rules and menu items.

mod commands;
mod keybindings;
mod menus;

pub use commands::{CommandArgDoc, CommandHandlerFn, CommandMetadata, CommandsRegistry};
pub use keybindings::{KeybindingRule, KeybindingsRegistry, PlatformKeybinding, weight};
pub use menus::{MenuCommand, MenuId, MenuItem, MenuRegistry};

/// The three sinks a registration publishes into.
#[derive(Default)]
pub struct Platform {
	pub commands: CommandsRegistry,
	pub keybindings: KeybindingsRegistry,
	pub menus: MenuRegistry,
}

impl Platform {
	pub fn new() -> Self {
		Self::default()
	}
}

#[cfg(test)]
mod tests;
