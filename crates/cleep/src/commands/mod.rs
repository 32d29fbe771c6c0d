//! Command handlers, one module per command group.

pub mod config_cmd;
pub mod devices;
pub mod events;
pub mod parameters;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Target;
use crate::error::CliError;

/// Dispatch a device command. Config and completions are handled before a
/// target is resolved.
pub async fn dispatch(cmd: Command, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Show => parameters::show(target, global).await,
        Command::Hostname(args) => parameters::hostname(&args, target, global).await,
        Command::Position(args) => parameters::position(&args, target, global).await,
        Command::Sun => parameters::sun(target, global).await,
        Command::Auth(args) => parameters::auth(args, target, global).await,
        Command::Devices => devices::handle(target, global).await,
        Command::Events(args) => events::handle(args, target, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
