mod schema;
mod utils;

#[doc = include_str!("./schema/docs.md")]
#[proc_macro_attribute]
pub fn schema(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    schema::schema(attr.into(), input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
