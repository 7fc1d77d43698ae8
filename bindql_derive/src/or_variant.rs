use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    ImplItemFn, Path, parse_macro_input,
    visit_mut::{self, VisitMut},
};

struct SwapConjunction;

impl VisitMut for SwapConjunction {
    fn visit_path_mut(&mut self, path: &mut Path) {
        let len = path.segments.len();
        if len >= 2
            && path.segments[len - 2].ident == "Conjunction"
            && path.segments[len - 1].ident == "And"
        {
            let span = path.segments[len - 1].ident.span();
            path.segments[len - 1].ident = syn::Ident::new("Or", span);
        }
        visit_mut::visit_path_mut(self, path);
    }
}

pub fn or_variant_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "or_variant does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let method = parse_macro_input!(item as ImplItemFn);
    let name = &method.sig.ident;

    let mut or_method = method.clone();
    or_method.sig.ident = format_ident!("or_{}", name);
    or_method.attrs.retain(|attr| !attr.path().is_ident("doc"));
    SwapConjunction.visit_block_mut(&mut or_method.block);

    let doc = format!("Same as [`Self::{}`], joined with `OR`.", name);

    quote! {
        #method

        #[doc = #doc]
        #or_method
    }
    .into()
}
