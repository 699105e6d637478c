//! GoStrike proc macros.
//!
//! - `#[plugin]` — self-registers an `impl Plugin for T` with the plugin
//!   manager via a `ctor` constructor.
//! - `#[chat_command(...)]` / `#[console_command(...)]` — declarative
//!   command registration, generating a `{fn}_register()` /
//!   `{fn}_unregister()` pair meant to be called from a plugin's
//!   `Load`/`Unload`.
//!
//! # Plugin Example
//!
//! ```ignore
//! use gostrike_core::plugins::Plugin;
//! use gostrike_core::plugin;
//!
//! #[derive(Default)]
//! struct KickVote;
//!
//! #[plugin]
//! impl Plugin for KickVote {
//!     fn slug(&self) -> &str { "kickvote" }
//!     fn load(&self, _hot_reload: bool) -> Result<(), String> {
//!         cmd_kick_register().map(|_| ()).map_err(|e| e.to_string())
//!     }
//!     fn unload(&self, _hot_reload: bool) -> Result<(), String> {
//!         cmd_kick_unregister();
//!         Ok(())
//!     }
//! }
//!
//! #[chat_command("kick", permission = "gostrike.kick", min_args = 1, usage = "!kick <name>")]
//! fn cmd_kick(ctx: &gostrike_core::commands::ChatCommandContext) -> Result<(), String> {
//!     ctx.reply(&format!("voted to kick {}", ctx.args[0]));
//!     Ok(())
//! }
//! ```

mod command_args;
mod plugin;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn, ItemImpl};

use command_args::CommandArgs;

/// Self-register an `impl Plugin for T` with the plugin manager. `T` must
/// implement `Default`.
#[proc_macro_attribute]
pub fn plugin(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_impl = parse_macro_input!(item as ItemImpl);
    plugin::generate(item_impl).into()
}

/// Register a function as a chat command handler
/// (`OnChatMessage`/`!command`), via a generated `{fn}_register()` /
/// `{fn}_unregister()` pair.
#[proc_macro_attribute]
pub fn chat_command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as CommandArgs);
    let func = parse_macro_input!(item as ItemFn);
    command_args::generate(
        args,
        func,
        quote::quote! { ::gostrike_core::commands::register },
        quote::quote! { ::gostrike_core::commands::unregister_by_name },
        quote::quote! { ::gostrike_core::commands::CommandError },
        quote::quote! { ::gostrike_core::commands::ChatCommandContext },
    )
    .into()
}

/// Register a function as a console command handler, via a generated
/// `{fn}_register()` / `{fn}_unregister()` pair.
#[proc_macro_attribute]
pub fn console_command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as CommandArgs);
    let func = parse_macro_input!(item as ItemFn);
    command_args::generate(
        args,
        func,
        quote::quote! { ::gostrike_core::commands::register_console },
        quote::quote! { ::gostrike_core::commands::unregister_console },
        quote::quote! { ::gostrike_core::commands::ConsoleCommandError },
        quote::quote! { ::gostrike_core::commands::ConsoleCommandContext },
    )
    .into()
}
