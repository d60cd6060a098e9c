//! Surface-scoped commands and actions.

mod action;
mod action2;
mod command;
mod multi_action;

pub use action::{ActionLabel, ActionOptions, ContextMenuSpec, EditorAction, EditorActionDef};
pub use action2::{Action2, Action2Descriptor, EditorAction2, register_action2};
pub use command::{
	ContributionBinder, ContributionRunner, ControllerLookup, EditorCommand, EditorCommandRunner,
	bind_to_contribution, run_editor_command,
};
pub use multi_action::{EditorActionImplementation, MultiEditorAction};
