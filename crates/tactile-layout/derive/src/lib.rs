mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_layout;

#[proc_macro_derive(ButtonLayout, attributes(button))]
pub fn derive_button_layout(input: TokenStream) -> TokenStream {
    handle_derive_layout(input)
}
