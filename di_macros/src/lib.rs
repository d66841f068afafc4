extern crate proc_macro;

mod factory_macro;
mod register_macros;

use proc_macro::TokenStream;

#[proc_macro_attribute]
pub fn registry(attr: TokenStream, item: TokenStream) -> TokenStream {
    register_macros::generate_di_macro(attr, item)
}

/// Describes a trait as a factory interface and implements it for the
/// generic factory proxy.
///
/// Methods are described under the PascalCase form of their name
/// (`create_one` becomes `CreateOne`); `#[factory(rename = "Create")]` on a
/// method overrides it, which is how overloads sharing a name are declared.
#[proc_macro_attribute]
pub fn factory(attr: TokenStream, item: TokenStream) -> TokenStream {
    factory_macro::expand_factory(attr, item)
}
