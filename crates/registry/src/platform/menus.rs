use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use weft_context::ContextKeyExpr;

/// Identifier of a menu location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(Cow<'static, str>);

impl MenuId {
	/// Right-click menu of an editing surface.
	pub const EDITOR_CONTEXT: MenuId = MenuId(Cow::Borrowed("editor/context"));
	/// The command palette.
	pub const COMMAND_PALETTE: MenuId = MenuId(Cow::Borrowed("commandPalette"));

	pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for MenuId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The command half of a menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuCommand {
	pub id: Arc<str>,
	pub title: String,
	pub icon: Option<String>,
	/// Greys the item out rather than hiding it.
	pub precondition: Option<ContextKeyExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
	pub menu_id: MenuId,
	pub command: MenuCommand,
	/// Hides the item when false.
	pub when: Option<ContextKeyExpr>,
	pub group: Option<String>,
	pub order: i32,
}

/// Declarative sink for menu items.
#[derive(Default)]
pub struct MenuRegistry {
	items: RwLock<HashMap<MenuId, Vec<MenuItem>>>,
}

impl MenuRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append_menu_item(&self, item: MenuItem) {
		self.items
			.write()
			.entry(item.menu_id.clone())
			.or_default()
			.push(item);
	}

	/// Items for `menu`, ordered by group then order. Equal keys keep
	/// registration order.
	pub fn items(&self, menu: &MenuId) -> Vec<MenuItem> {
		let mut items = self.items.read().get(menu).cloned().unwrap_or_default();
		items.sort_by(|a, b| a.group.cmp(&b.group).then(a.order.cmp(&b.order)));
		items
	}

	/// Menus that have at least one item.
	pub fn menus(&self) -> Vec<MenuId> {
		let mut menus: Vec<_> = self.items.read().keys().cloned().collect();
		menus.sort();
		menus
	}
}
