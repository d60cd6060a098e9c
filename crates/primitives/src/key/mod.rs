//! Key chords for keybinding declarations.
//!
//! Chords are written as `modifiers* key`, joined by `-`, and sequences
//! separate chords with whitespace:
//!
//! ```text
//! sequence = chord (" " chord)*
//! chord    = (modifier "-")* key
//! modifier = "ctrl" | "alt" | "shift" | "cmd"
//! key      = fn-key | named-key | char
//! fn-key   = "f" digit digit?
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;


bitflags! {
	/// Modifier keys held during a chord.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u8 {
		const CTRL = 1 << 0;
		const ALT = 1 << 1;
		const SHIFT = 1 << 2;
		/// Command on macOS, Super elsewhere.
		const CMD = 1 << 3;
	}
}

const MODIFIER_NAMES: [(&str, Modifiers); 4] = [
	("ctrl", Modifiers::CTRL),
	("alt", Modifiers::ALT),
	("shift", Modifiers::SHIFT),
	("cmd", Modifiers::CMD),
];

/// Non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
	Enter,
	Escape,
	Tab,
	Backspace,
	Delete,
	Insert,
	Home,
	End,
	PageUp,
	PageDown,
	Up,
	Down,
	Left,
	Right,
	Space,
}

const NAMED_KEYS: [(&str, NamedKey); 15] = [
	("enter", NamedKey::Enter),
	("esc", NamedKey::Escape),
	("tab", NamedKey::Tab),
	("backspace", NamedKey::Backspace),
	("del", NamedKey::Delete),
	("insert", NamedKey::Insert),
	("home", NamedKey::Home),
	("end", NamedKey::End),
	("pageup", NamedKey::PageUp),
	("pagedown", NamedKey::PageDown),
	("up", NamedKey::Up),
	("down", NamedKey::Down),
	("left", NamedKey::Left),
	("right", NamedKey::Right),
	("space", NamedKey::Space),
];

/// The non-modifier part of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
	Char(char),
	/// Function key, `F1` through `F24`.
	F(u8),
	Named(NamedKey),
}

/// Error produced when a chord or sequence string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
	#[error("empty key sequence")]
	Empty,
	#[error("missing key after modifiers in {0:?}")]
	MissingKey(String),
	#[error("unknown key {0:?}")]
	UnknownKey(String),
	#[error("function key out of range: {0:?}")]
	FunctionKeyRange(String),
}

/// One key press with its modifiers, e.g. `ctrl-shift-k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
	pub modifiers: Modifiers,
	pub code: KeyCode,
}

impl KeyChord {
	pub const fn new(modifiers: Modifiers, code: KeyCode) -> Self {
		Self { modifiers, code }
	}
}

fn parse_code(text: &str, chord: &str) -> Result<KeyCode, KeyParseError> {
	let mut chars = text.chars();
	match (chars.next(), chars.next()) {
		(None, _) => return Err(KeyParseError::MissingKey(chord.to_string())),
		(Some(c), None) => return Ok(KeyCode::Char(c)),
		_ => {}
	}

	if let Some((_, named)) = NAMED_KEYS.iter().find(|(name, _)| *name == text) {
		return Ok(KeyCode::Named(*named));
	}

	if let Some(digits) = text.strip_prefix('f')
		&& !digits.is_empty()
		&& digits.len() <= 2
		&& digits.bytes().all(|b| b.is_ascii_digit())
	{
		return match digits.parse::<u8>() {
			Ok(n @ 1..=24) => Ok(KeyCode::F(n)),
			_ => Err(KeyParseError::FunctionKeyRange(text.to_string())),
		};
	}

	Err(KeyParseError::UnknownKey(text.to_string()))
}

impl FromStr for KeyChord {
	type Err = KeyParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut modifiers = Modifiers::empty();
		let mut rest = s;

		// `ctrl--` is ctrl plus the minus key, so a modifier only counts when
		// something follows its separator.
		'outer: loop {
			for (name, flag) in MODIFIER_NAMES {
				if let Some(after) = rest.strip_prefix(name).and_then(|r| r.strip_prefix('-'))
					&& !after.is_empty()
				{
					modifiers |= flag;
					rest = after;
					continue 'outer;
				}
			}
			break;
		}

		Ok(Self {
			modifiers,
			code: parse_code(rest, s)?,
		})
	}
}

impl fmt::Display for KeyChord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (name, flag) in MODIFIER_NAMES {
			if self.modifiers.contains(flag) {
				write!(f, "{name}-")?;
			}
		}
		match self.code {
			KeyCode::Char(c) => write!(f, "{c}"),
			KeyCode::F(n) => write!(f, "f{n}"),
			KeyCode::Named(named) => {
				let name = NAMED_KEYS
					.iter()
					.find(|(_, k)| *k == named)
					.map_or("?", |(name, _)| *name);
				f.write_str(name)
			}
		}
	}
}

/// A multi-chord binding such as `ctrl-k ctrl-c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySequence(SmallVec<[KeyChord; 2]>);

impl KeySequence {
	pub fn chords(&self) -> &[KeyChord] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<KeyChord> for KeySequence {
	fn from(chord: KeyChord) -> Self {
		Self(smallvec![chord])
	}
}

impl FromStr for KeySequence {
	type Err = KeyParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let chords = s
			.split_whitespace()
			.map(KeyChord::from_str)
			.collect::<Result<SmallVec<[KeyChord; 2]>, _>>()?;
		if chords.is_empty() {
			return Err(KeyParseError::Empty);
		}
		Ok(Self(chords))
	}
}

impl fmt::Display for KeySequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, chord) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			write!(f, "{chord}")?;
		}
		Ok(())
	}
}
