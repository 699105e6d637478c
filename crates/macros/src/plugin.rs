//! `#[plugin]` attribute macro implementation.
//!
//! Applied to a `impl Plugin for SomeStruct { ... }` block. Emits the impl
//! unchanged and, alongside it, a `ctor` constructor that registers a
//! `SomeStruct::default()` instance with the process-wide plugin manager
//! before `main` runs, so plugins self-register during program
//! initialization rather than needing an explicit registration call.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemImpl;

pub fn generate(item: ItemImpl) -> TokenStream {
    let self_ty = &item.self_ty;

    quote! {
        #item

        const _: () = {
            #[::ctor::ctor]
            fn __gostrike_plugin_register() {
                ::gostrike_core::plugins::register(::std::boxed::Box::new(
                    <#self_ty as ::std::default::Default>::default(),
                ));
            }
        };
    }
}
