use darling::{FromDeriveInput, FromVariant, ast};
use heck::ToSnakeCase;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse_macro_input};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(enum_unit))]
struct JoinDeriveInput {
    ident: syn::Ident,
    data: ast::Data<JoinVariant, ()>,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(join))]
struct JoinVariant {
    ident: syn::Ident,
    #[darling(default)]
    ignore: bool,
}

pub fn join_methods_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_info = match JoinDeriveInput::from_derive_input(&input) {
        Ok(v) => v,
        Err(e) => return e.write_errors().into(),
    };

    let enum_name = &enum_info.ident;

    let variants = match enum_info.data.take_enum() {
        Some(variants) => variants,
        None => {
            return syn::Error::new_spanned(&input.ident, "JoinMethods only supports enums")
                .to_compile_error()
                .into();
        }
    };

    let methods = variants.iter().filter_map(|var| {
        if var.ignore {
            return None;
        }

        let var_name = &var.ident;
        let snake = var_name.to_string().to_snake_case();
        let join_fn = format_ident!("{}_join", snake);
        let doc = format!(
            "Appends a `{} JOIN`; `binds` fill the placeholders of `on` at the join's position.",
            snake.to_uppercase()
        );

        Some(quote! {
            #[doc = #doc]
            pub fn #join_fn<T, O, B>(&mut self, table: T, on: O, binds: B) -> &mut Self
            where
                T: crate::IntoIdent,
                O: crate::IntoRaw,
                B: crate::IntoBinds,
            {
                self.join_expr(#enum_name::#var_name, table, on, binds)
            }
        })
    });

    quote! {
        impl crate::Builder {
            #(#methods)*
        }
    }
    .into()
}
