//! Core value types shared by the weft crates: document positions, surface
//! identities, key chords and boxed future aliases.

/// Async future aliases.
pub mod future;
/// Identifier types for editing surfaces.
pub mod ids;
/// Key chords and sequences used by keybinding declarations.
pub mod key;
/// Document positions and ranges.
pub mod position;

pub use future::BoxFutureLocal;
pub use ids::SurfaceId;
pub use key::{KeyChord, KeyParseError, KeySequence, Modifiers};
pub use position::{Position, Range};
