use proc_macro::TokenStream;

mod join;
mod or_variant;

#[proc_macro_derive(JoinMethods, attributes(join))]
pub fn join_methods(input: TokenStream) -> TokenStream {
    join::join_methods_impl(input)
}

/// Emits the annotated `where_*` method together with an `or_where_*` twin
/// that joins with `Conjunction::Or` instead of `Conjunction::And`.
#[proc_macro_attribute]
pub fn or_variant(attr: TokenStream, item: TokenStream) -> TokenStream {
    or_variant::or_variant_impl(attr, item)
}
