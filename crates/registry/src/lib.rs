//! Extension-point registration and command dispatch.
//!
//! Features register commands, editor actions and per-surface contributions
//! against an explicitly constructed [`ContributionRegistry`]. Invocations
//! resolve to at most one effective handler:
//!
//! - [`command`] - base [`Command`] trait, [`MultiCommand`] priority dispatch, [`ProxyCommand`]
//! - [`editor`] - surface-scoped commands and actions ([`EditorCommand`], [`EditorAction`],
//!   [`MultiEditorAction`], [`EditorAction2`])
//! - [`contributions`] - the registry itself and the per-surface [`ContributionHost`]
//! - [`platform`] - the invocation table plus keybinding and menu sinks
//! - [`services`] - collaborator traits handed to handlers through [`ServicesAccessor`]

pub mod args;
pub mod command;
pub mod config;
pub mod contributions;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod platform;
pub mod resource;
pub mod services;
pub mod side_table;
#[doc(hidden)]
pub mod test_support;

pub use args::CommandArgs;
pub use command::{
	Command, CommandOptions, ImplementationHandle, KeybindingSpec, MenuSpec, MultiCommand,
	ProxyCommand, register_command,
};
pub use config::{ContributionTimings, RegistryConfig};
pub use contributions::{
	ContributionHost, ContributionRegistry, DiffEditorContributionDescriptor, EditorContribution,
	EditorContributionDescriptor, EditorContributionInstantiation, SurfaceRef, contribution_of,
};
pub use dispatch::{CommandFuture, CommandResult, Dispatch, HandlerOutcome};
pub use editor::{
	Action2, Action2Descriptor, ActionLabel, ActionOptions, ContextMenuSpec, EditorAction,
	EditorAction2, EditorActionDef, EditorCommand, EditorCommandRunner, MultiEditorAction,
	bind_to_contribution, register_action2, run_editor_command,
};
pub use error::{CommandError, ConfigError, ContributionError};
pub use platform::{
	CommandMetadata, CommandsRegistry, KeybindingRule, KeybindingsRegistry, MenuId, MenuItem,
	MenuRegistry, Platform,
};
pub use resource::{register_model_and_position_command, register_model_command};
pub use services::{
	ContextKeyService, DocumentReference, DocumentService, EditorSurface, ServicesAccessor,
	SurfaceService, TelemetryEvent, TelemetryService, TextDocument,
};
pub use side_table::SurfaceSideTable;
pub use weft_context::{ContextKeyExpr, ContextSnapshot, ContextValue};
