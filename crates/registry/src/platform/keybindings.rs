use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use weft_context::ContextKeyExpr;
use weft_primitives::KeySequence;

/// Conventional weights for keybinding rules. Lower weights lose ties to
/// higher ones when the keybinding resolver picks between rules.
pub mod weight {
	pub const EDITOR_CORE: i32 = 0;
	pub const EDITOR_CONTRIB: i32 = 100;
	pub const WORKBENCH_CONTRIB: i32 = 200;
	pub const BUILTIN_EXTENSION: i32 = 300;
	pub const EXTERNAL_EXTENSION: i32 = 400;
}

/// Per-platform override of a rule's chords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformKeybinding {
	pub primary: Option<KeySequence>,
	pub secondary: Vec<KeySequence>,
}

/// A keybinding as published to the keybinding sink.
#[derive(Debug, Clone, PartialEq)]
pub struct KeybindingRule {
	pub id: Arc<str>,
	pub weight: i32,
	pub args: Option<Value>,
	/// Effective predicate, already combined with the command precondition.
	pub when: Option<ContextKeyExpr>,
	pub primary: Option<KeySequence>,
	pub secondary: Vec<KeySequence>,
	pub mac: Option<PlatformKeybinding>,
	pub linux: Option<PlatformKeybinding>,
	pub windows: Option<PlatformKeybinding>,
}

/// Declarative sink for keybinding rules. Resolution happens elsewhere.
#[derive(Default)]
pub struct KeybindingsRegistry {
	rules: RwLock<Vec<KeybindingRule>>,
}

impl KeybindingsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_rule(&self, rule: KeybindingRule) {
		self.rules.write().push(rule);
	}

	/// All rules in registration order.
	pub fn rules(&self) -> Vec<KeybindingRule> {
		self.rules.read().clone()
	}

	pub fn rules_for(&self, id: &str) -> Vec<KeybindingRule> {
		self.rules
			.read()
			.iter()
			.filter(|rule| &*rule.id == id)
			.cloned()
			.collect()
	}
}
