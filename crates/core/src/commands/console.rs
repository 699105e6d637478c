//! Console command registration.
//!
//! The data model and ABI presuppose a console command surface alongside
//! the chat path (the core bank's "command exec" function runs commands
//! *as* the host; this is the inbound direction, registering names the
//! runtime itself answers). Generalized the same way chat commands are:
//! permission gate, then a usage reply on too few args.

use std::collections::HashMap;
use std::sync::Arc;

use gostrike_sdk::ChatDestination;
use gostrike_engine::try_callbacks;
use parking_lot::RwLock;

use crate::handler_id::HandlerId;
use crate::panic::catch;
use crate::permissions;

use super::tokenizer::tokenize;

/// Context handed to a console command's handler. `invoker_slot` is
/// `-1` for commands run from the host's own console (not on behalf of
/// any connected player).
pub struct ConsoleCommandContext<'a> {
    pub invoker_slot: i32,
    pub command: &'a str,
    pub args: &'a [String],
    pub arg_string: &'a str,
}

impl ConsoleCommandContext<'_> {
    pub fn reply(&self, message: &str) {
        let Some(table) = try_callbacks() else { return };
        let Ok(message_c) = std::ffi::CString::new(message) else { return };
        if self.invoker_slot >= 0 {
            if let Some(client_print) = table.comm.client_print {
                client_print(self.invoker_slot, ChatDestination::Console, message_c.as_ptr());
            }
        } else if let Some(broadcast_print) = table.comm.broadcast_print {
            broadcast_print(ChatDestination::Console, message_c.as_ptr());
        }
    }
}

pub type ConsoleCommandHandler =
    Box<dyn Fn(&ConsoleCommandContext) -> Result<(), String> + Send + Sync>;

struct ConsoleCommandInfo {
    id: HandlerId,
    permission: Option<String>,
    min_args: usize,
    usage: String,
    handler: ConsoleCommandHandler,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleCommandError {
    #[error("a console command named {0:?} is already registered")]
    Conflict(String),
}

#[derive(Default)]
pub struct ConsoleCommandRouter {
    commands: RwLock<HashMap<String, Arc<ConsoleCommandInfo>>>,
}

impl ConsoleCommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: &str,
        permission: Option<&str>,
        min_args: usize,
        usage: &str,
        handler: impl Fn(&ConsoleCommandContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Result<HandlerId, ConsoleCommandError> {
        let key = name.to_lowercase();
        let mut commands = self.commands.write();
        if commands.contains_key(&key) {
            return Err(ConsoleCommandError::Conflict(key));
        }
        let id = HandlerId::next();
        commands.insert(
            key,
            Arc::new(ConsoleCommandInfo {
                id,
                permission: permission.map(str::to_string),
                min_args,
                usage: usage.to_string(),
                handler: Box::new(handler),
            }),
        );
        Ok(id)
    }

    pub fn unregister_by_name(&self, name: &str) -> bool {
        self.commands.write().remove(&name.to_lowercase()).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.commands.read().contains_key(&name.to_lowercase())
    }

    /// Dispatch a console command line. Returns `true` if `line` named a
    /// registered command. `invoker_steam_id` gates the permission check
    /// when present (host console invocations pass `None`).
    pub fn dispatch(&self, invoker_slot: i32, invoker_steam_id: Option<u64>, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        let (cmd_part, arg_part) = match trimmed.find(char::is_whitespace) {
            Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
            None => (trimmed, ""),
        };
        let cmd_name = cmd_part.to_lowercase();
        let info = match self.commands.read().get(&cmd_name).cloned() {
            Some(info) => info,
            None => return false,
        };

        if let Some(permission) = &info.permission {
            let allowed = match invoker_steam_id {
                Some(steam_id) => permissions::store()
                    .map(|store| store.has_permission(steam_id, permission, permissions::now_unix()))
                    .unwrap_or(false),
                // host console invocations bypass the permission gate; there's
                // no player identity to check.
                None => invoker_slot < 0,
            };
            if !allowed {
                let context = ConsoleCommandContext {
                    invoker_slot,
                    command: &cmd_name,
                    args: &[],
                    arg_string: arg_part,
                };
                context.reply("You do not have permission to use this command");
                return true;
            }
        }

        let args = tokenize(arg_part);
        let context = ConsoleCommandContext {
            invoker_slot,
            command: &cmd_name,
            args: &args,
            arg_string: arg_part,
        };
        if args.len() < info.min_args {
            context.reply(&info.usage);
            return true;
        }

        match catch(|| (info.handler)(&context)) {
            Some(Ok(())) => {}
            Some(Err(message)) => context.reply(&format!("[ERROR] {message}")),
            None => context.reply("[ERROR] command handler panicked"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_command_is_not_consumed() {
        let router = ConsoleCommandRouter::new();
        assert!(!router.dispatch(-1, None, "status"));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let router = ConsoleCommandRouter::new();
        router.register("status", None, 0, "usage", |_| Ok(())).unwrap();
        assert!(router.register("status", None, 0, "usage", |_| Ok(())).is_err());
    }

    #[test]
    fn host_console_invocation_bypasses_permission_gate() {
        let router = ConsoleCommandRouter::new();
        router
            .register("ban", Some("gostrike.ban"), 0, "usage", |_| Ok(()))
            .unwrap();
        assert!(router.dispatch(-1, None, "ban"));
    }
}
