mod stage1;
mod stage2;
mod stage3;

pub fn schema(
    attr: proc_macro2::TokenStream,
    input: proc_macro2::TokenStream,
) -> syn::Result<proc_macro2::TokenStream> {
    // stage 1: syntax
    let stage1_attr = stage1::SchemaAttr::try_from(attr)?;
    let stage1_table = syn::parse2::<stage1::Table>(input)?;
    // stage 2: validation
    let stage2_schema = stage2::Schema::try_new(&stage1_table, stage1_attr)?;
    // stage 3: expansion
    Ok(stage3::expand(stage1_table, &stage2_schema))
}
