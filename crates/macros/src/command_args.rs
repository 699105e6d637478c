//! Shared argument parsing for `#[chat_command]` and `#[console_command]`.
//!
//! Usage:
//! - `#[chat_command("kick")]`
//! - `#[chat_command("kick", permission = "gostrike.kick", min_args = 1, usage = "!kick <name>")]`

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, Ident, ItemFn, LitInt, LitStr, Token};

pub struct CommandArgs {
    pub name: LitStr,
    pub permission: Option<LitStr>,
    pub min_args: Option<LitInt>,
    pub usage: Option<LitStr>,
}

impl Parse for CommandArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;

        let mut permission = None;
        let mut min_args = None;
        let mut usage = None;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "permission" => permission = Some(input.parse::<LitStr>()?),
                "min_args" => min_args = Some(input.parse::<LitInt>()?),
                "usage" => usage = Some(input.parse::<LitStr>()?),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown argument `{other}`, expected one of: permission, min_args, usage"),
                    ))
                }
            }
        }

        Ok(Self { name, permission, min_args, usage })
    }
}

/// Generate a command handler function plus a `{name}_register()` /
/// `{name}_unregister()` pair, for either the chat or console router.
/// `register_path` / `unregister_path` name the target free functions in
/// `gostrike_core::commands` so the same generator serves both
/// `#[chat_command]` and `#[console_command]`.
pub fn generate(
    args: CommandArgs,
    func: ItemFn,
    register_path: TokenStream,
    unregister_path: TokenStream,
    error_ty: TokenStream,
    context_ty: TokenStream,
) -> TokenStream {
    let fn_name = &func.sig.ident;
    let fn_vis = &func.vis;
    let fn_block = &func.block;
    let fn_attrs = &func.attrs;
    let fn_unsafety = &func.sig.unsafety;

    let command_name = &args.name;
    let permission_arg = match &args.permission {
        Some(perm) => quote! { Some(#perm) },
        None => quote! { None },
    };
    let min_args = match &args.min_args {
        Some(n) => quote! { #n },
        None => quote! { 0 },
    };
    let usage = match &args.usage {
        Some(u) => quote! { #u },
        None => quote! { "" },
    };

    let register_fn_name = Ident::new(&format!("{fn_name}_register"), fn_name.span());
    let unregister_fn_name = Ident::new(&format!("{fn_name}_unregister"), fn_name.span());

    quote! {
        #(#fn_attrs)*
        #fn_vis #fn_unsafety fn #fn_name(ctx: &#context_ty<'_>) -> ::std::result::Result<(), ::std::string::String>
            #fn_block

        /// Register this command with the process-wide router. Intended to
        /// be called once from inside a plugin's `Load`, so its handle is
        /// recorded against that plugin's scope.
        #fn_vis fn #register_fn_name() -> ::std::result::Result<::gostrike_core::HandlerId, #error_ty> {
            #register_path(#command_name, #permission_arg, #min_args, #usage, #fn_name)
        }

        /// Unregister this command by name. Idempotent.
        #fn_vis fn #unregister_fn_name() -> bool {
            #unregister_path(#command_name)
        }
    }
}
