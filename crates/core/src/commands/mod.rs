//! The chat command router.
//!
//! `OnChatMessage(slot, text)` is the single entry point: everything that
//! isn't a recognized `!command` is left alone and the original chat
//! message passes through to the game untouched.

pub mod console;
mod router;
mod tokenizer;

use std::sync::LazyLock;

pub use console::{ConsoleCommandContext, ConsoleCommandError, ConsoleCommandHandler, ConsoleCommandRouter};
pub use router::{ChatCommandContext, ChatCommandHandler, ChatCommandInfo, ChatCommandRouter, CommandError};
pub use tokenizer::tokenize;

/// The process-wide chat command router.
pub static COMMANDS: LazyLock<ChatCommandRouter> = LazyLock::new(ChatCommandRouter::new);

/// The process-wide console command router.
pub static CONSOLE_COMMANDS: LazyLock<ConsoleCommandRouter> = LazyLock::new(ConsoleCommandRouter::new);

/// Register a chat command with the process-wide router. See
/// [`ChatCommandRouter::register`].
pub fn register(
    name: &str,
    permission: Option<&str>,
    min_args: usize,
    usage: &str,
    handler: impl Fn(&ChatCommandContext) -> Result<(), String> + Send + Sync + 'static,
) -> Result<crate::handler_id::HandlerId, CommandError> {
    let id = COMMANDS.register(name, permission, min_args, usage, handler)?;
    crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::ChatCommand(name.to_lowercase()));
    Ok(id)
}

pub fn unregister(id: crate::handler_id::HandlerId) -> bool {
    COMMANDS.unregister(id)
}

/// Unregister a chat command by name, case-insensitively.
pub fn unregister_by_name(name: &str) -> bool {
    COMMANDS.unregister_by_name(name)
}

/// Dispatch an inbound chat message. Returns `true` if the message was a
/// recognized command and should be suppressed from the game's own chat.
pub fn dispatch(slot: i32, text: &str) -> bool {
    COMMANDS.dispatch(slot, text)
}

/// Register a console command with the process-wide router. See
/// [`ConsoleCommandRouter::register`].
pub fn register_console(
    name: &str,
    permission: Option<&str>,
    min_args: usize,
    usage: &str,
    handler: impl Fn(&ConsoleCommandContext) -> Result<(), String> + Send + Sync + 'static,
) -> Result<crate::handler_id::HandlerId, ConsoleCommandError> {
    let id = CONSOLE_COMMANDS.register(name, permission, min_args, usage, handler)?;
    crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::ConsoleCommand(name.to_lowercase()));
    Ok(id)
}

/// Dispatch a console command line. See [`ConsoleCommandRouter::dispatch`].
pub fn dispatch_console(invoker_slot: i32, invoker_steam_id: Option<u64>, line: &str) -> bool {
    CONSOLE_COMMANDS.dispatch(invoker_slot, invoker_steam_id, line)
}

/// Unregister a console command by name, case-insensitively.
pub fn unregister_console(name: &str) -> bool {
    CONSOLE_COMMANDS.unregister_by_name(name)
}
