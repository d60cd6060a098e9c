use std::sync::Arc;

use super::{Command, CommandOptions};
use crate::args::CommandArgs;
use crate::dispatch::CommandResult;
use crate::services::ServicesAccessor;

/// A command with its own identity that forwards every call to another.
pub struct ProxyCommand {
	options: CommandOptions,
	target: Arc<dyn Command>,
}

impl ProxyCommand {
	pub fn new(target: Arc<dyn Command>, options: CommandOptions) -> Self {
		Self { options, target }
	}

	pub fn target(&self) -> &Arc<dyn Command> {
		&self.target
	}
}

impl Command for ProxyCommand {
	fn options(&self) -> &CommandOptions {
		&self.options
	}

	fn run_command(&self, accessor: &ServicesAccessor, args: &CommandArgs) -> CommandResult {
		self.target.run_command(accessor, args)
	}
}
