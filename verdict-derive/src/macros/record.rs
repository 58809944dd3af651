use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse2};

/// Derive macro for the Record trait.
///
/// Exposes every named field through `serde::Serialize`. Fields can be
/// hidden with `#[record(skip)]` or exposed under another key with
/// `#[record(rename = "key")]`.
pub fn expand(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(i) => i,
        Err(e) => return e.to_compile_error(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "#[derive(Record)] requires a struct with named fields",
                )
                .to_compile_error();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "#[derive(Record)] only supports structs")
                .to_compile_error();
        }
    };

    let mut arms = Vec::new();
    for field in fields {
        let options = match FieldOptions::parse(field) {
            Ok(options) => options,
            Err(e) => return e.to_compile_error(),
        };
        if options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let key = options.rename.unwrap_or_else(|| ident.to_string());
        arms.push(quote! {
            #key => ::verdict::field_value(&self.#ident),
        });
    }

    quote! {
        impl #impl_generics ::verdict::Record for #name #ty_generics #where_clause {
            fn get(&self, field: &str) -> ::std::option::Option<::verdict::__private::Value> {
                match field {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    }
}

/// Parsed `#[record(...)]` options of one field.
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

impl FieldOptions {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let key: LitStr = meta.value()?.parse()?;
                    options.rename = Some(key.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(options)
    }
}
