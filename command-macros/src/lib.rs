use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitStr};

/// Generates a `register_<fn name>` helper that binds the annotated async handler into a
/// `CommandRegistry`.
///
/// The command name defaults to the function name. Pass a string literal to register the
/// handler under a different name, e.g. `#[command_handler("create-server")]`.
#[proc_macro_attribute]
pub fn command_handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    let fn_name = &input_fn.sig.ident;

    let command_name = if attr.is_empty() {
        fn_name.to_string()
    } else {
        parse_macro_input!(attr as LitStr).value()
    };

    let expanded = quote! {
        #input_fn

        ::paste::paste! {
            pub fn [<register_ #fn_name>](
                registry: &mut ::discord_interaction_bot::controller::discord::registry::CommandRegistry,
            ) {
                registry.register(#command_name, #fn_name);
            }
        }
    };

    TokenStream::from(expanded)
}
