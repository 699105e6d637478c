//! The chat command router.

use std::collections::HashMap;
use std::sync::Arc;

use gostrike_sdk::ChatDestination;
use gostrike_engine::try_callbacks;
use parking_lot::RwLock;

use crate::events::PlayerInfo;
use crate::handler_id::HandlerId;
use crate::panic::catch;
use crate::permissions;

use super::tokenizer::tokenize;

const PERMISSION_DENIED: &str = "You do not have permission to use this command";

/// Context handed to a chat command's handler.
pub struct ChatCommandContext<'a> {
    pub player: PlayerInfo,
    pub command: &'a str,
    pub args: &'a [String],
    pub arg_string: &'a str,
}

impl ChatCommandContext<'_> {
    /// Reply to the invoking player through the host's per-player chat
    /// print.
    pub fn reply(&self, message: &str) {
        send_chat(self.player.slot, message);
    }

    /// Reply tagged as an error: handler-returned errors are replied to
    /// the player with an `ERROR` tag.
    pub fn reply_error(&self, message: &str) {
        send_chat(self.player.slot, &format!("[ERROR] {message}"));
    }
}

fn send_chat(slot: i32, message: &str) {
    let Some(table) = try_callbacks() else { return };
    let Some(client_print) = table.comm.client_print else { return };
    let Ok(message_c) = std::ffi::CString::new(message) else { return };
    client_print(slot, ChatDestination::Chat, message_c.as_ptr());
}

pub type ChatCommandHandler = Box<dyn Fn(&ChatCommandContext) -> Result<(), String> + Send + Sync>;

pub struct ChatCommandInfo {
    pub id: HandlerId,
    pub name: String,
    pub permission: Option<String>,
    pub min_args: usize,
    pub usage: String,
    handler: ChatCommandHandler,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("a command named {0:?} is already registered")]
    Conflict(String),
}

#[derive(Default)]
pub struct ChatCommandRouter {
    commands: RwLock<HashMap<String, Arc<ChatCommandInfo>>>,
}

impl ChatCommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat command. `name` is lower-cased for matching.
    /// Fails deterministically if a command by that name is already
    /// registered.
    pub fn register(
        &self,
        name: &str,
        permission: Option<&str>,
        min_args: usize,
        usage: &str,
        handler: impl Fn(&ChatCommandContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Result<HandlerId, CommandError> {
        let key = name.to_lowercase();
        let mut commands = self.commands.write();
        if commands.contains_key(&key) {
            return Err(CommandError::Conflict(key));
        }
        let id = HandlerId::next();
        commands.insert(
            key.clone(),
            Arc::new(ChatCommandInfo {
                id,
                name: key,
                permission: permission.map(str::to_string),
                min_args,
                usage: usage.to_string(),
                handler: Box::new(handler),
            }),
        );
        Ok(id)
    }

    /// Unregister a command by its handler id. Returns `false` if it was
    /// never registered or already removed.
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut commands = self.commands.write();
        let key = commands.iter().find(|(_, info)| info.id == id).map(|(k, _)| k.clone());
        match key {
            Some(key) => commands.remove(&key).is_some(),
            None => false,
        }
    }

    /// Unregister by lower-cased name, used by the scope tracker's drain
    /// (scopes record chat commands by name, not [`HandlerId`]).
    pub fn unregister_by_name(&self, name: &str) -> bool {
        self.commands.write().remove(&name.to_lowercase()).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.commands.read().contains_key(&name.to_lowercase())
    }

    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// `OnChatMessage(slot, text) -> bool`.
    pub fn dispatch(&self, slot: i32, text: &str) -> bool {
        let Some(after_bang) = text.strip_prefix('!') else {
            return false;
        };
        let trimmed = after_bang.trim();
        if trimmed.is_empty() {
            return false;
        }

        let (cmd_part, arg_part) = match trimmed.find(char::is_whitespace) {
            Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
            None => (trimmed, ""),
        };
        let cmd_name = cmd_part.to_lowercase();
        if cmd_name.is_empty() {
            return false;
        }

        let info = match self.commands.read().get(&cmd_name).cloned() {
            Some(info) => info,
            None => return false,
        };

        let Some(player) = PlayerInfo::fetch(slot) else {
            return false;
        };

        if let Some(permission) = &info.permission {
            let now = permissions::now_unix();
            let allowed = permissions::store()
                .map(|store| store.has_permission(player.steam_id, permission, now))
                .unwrap_or(false);
            if !allowed {
                send_chat(slot, PERMISSION_DENIED);
                return true;
            }
        }

        let args = tokenize(arg_part);
        if args.len() < info.min_args {
            send_chat(slot, &info.usage);
            return true;
        }

        let context = ChatCommandContext {
            player,
            command: &info.name,
            args: &args,
            arg_string: arg_part,
        };

        let handler = &info.handler;
        let outcome = catch(|| handler(&context));
        match outcome {
            Some(Ok(())) => {}
            Some(Err(message)) => context.reply_error(&message),
            None => context.reply_error("command handler panicked"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_is_not_consumed() {
        let router = ChatCommandRouter::new();
        assert!(!router.dispatch(0, "!slay bob"));
    }

    #[test]
    fn non_bang_message_is_not_consumed() {
        let router = ChatCommandRouter::new();
        router.register("slay", None, 0, "usage", |_| Ok(())).unwrap();
        assert!(!router.dispatch(0, "hello there"));
    }

    #[test]
    fn bare_bang_with_no_name_is_not_consumed() {
        let router = ChatCommandRouter::new();
        assert!(!router.dispatch(0, "!   "));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let router = ChatCommandRouter::new();
        router.register("slay", None, 0, "usage", |_| Ok(())).unwrap();
        let err = router.register("SLAY", None, 0, "usage", |_| Ok(())).unwrap_err();
        assert!(matches!(err, CommandError::Conflict(_)));
    }

    #[test]
    fn unregister_allows_re_registration() {
        let router = ChatCommandRouter::new();
        let id = router.register("slay", None, 0, "usage", |_| Ok(())).unwrap();
        assert!(router.unregister(id));
        assert!(router.register("slay", None, 0, "usage", |_| Ok(())).is_ok());
    }

    #[test]
    fn command_name_matching_is_case_insensitive() {
        let router = ChatCommandRouter::new();
        router.register("Slay", None, 0, "usage", |_| Ok(())).unwrap();
        assert!(router.is_registered("slay"));
        assert!(router.is_registered("SLAY"));
    }
}
