mod macros;

use proc_macro::TokenStream;

#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    macros::record::expand(input.into()).into()
}
