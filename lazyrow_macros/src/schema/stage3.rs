use proc_macro2::TokenStream;
use quote::quote;

use super::{stage1, stage2};

fn option_call(method: &str, value: Option<&String>) -> Option<TokenStream> {
    let method = quote::format_ident!("{method}");
    value.map(|value| quote! { .#method(#value) })
}

impl quote::ToTokens for stage2::Column {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            name,
            isa,
            nullable,
            primary,
            unique,
            findable,
            inflator,
            sql_type,
        } = self;
        let primary = primary.then(|| quote! { .primary() });
        let not_null = (!nullable && !self.primary).then(|| quote! { .not_null() });
        let unique = unique.then(|| quote! { .unique() });
        let findable = findable.then(|| quote! { .findable() });
        let inflator = option_call("inflator", inflator.as_ref());
        let sql_type = option_call("sql_type", sql_type.as_ref());
        tokens.extend(quote! {
            ::lazyrow::Column::new(#name, #isa)
                #primary #not_null #unique #findable #inflator #sql_type
        });
    }
}

fn codegen(codegen: &stage2::Codegen) -> TokenStream {
    let directives = match &codegen.insertion_point {
        Some(insertion_point) => quote! {
            ::lazyrow::CodegenDirectives::at(#insertion_point, ::std::vec::Vec::new())
        },
        None => quote! { ::lazyrow::CodegenDirectives::default() },
    };
    let defaults = codegen
        .defaults
        .iter()
        .map(|(key, value)| quote! { .default_arg(#key, #value) });
    quote! { .codegen(#directives #(#defaults)*) }
}

pub fn expand(table: stage1::Table, schema: &stage2::Schema) -> TokenStream {
    let stage1::Table {
        rs_name,
        rs_vis,
        rs_attrs,
        columns: rs_columns,
    } = table;
    let rs_fields = rs_columns.iter().map(
        |stage1::Column {
             rs_name,
             rs_ty,
             rs_vis,
             rs_attrs,
             attr: _,
         }| {
            quote! {
                #(#rs_attrs)*
                #rs_vis #rs_name: #rs_ty
            }
        },
    );

    let stage2::Schema {
        table,
        model,
        namespace,
        read,
        write,
        mixins,
        interfaces,
        model_traits,
        accessors,
        codegen: schema_codegen,
        columns,
    } = schema;
    let namespace = option_call("namespace", namespace.as_ref());
    let read = option_call("read_source", read.as_ref());
    let write = option_call("write_source", write.as_ref());
    let accessors = (!accessors).then(|| quote! { .column_accessors(false) });
    let schema_codegen = schema_codegen.as_ref().map(codegen);

    quote! {
        #(#rs_attrs)*
        #rs_vis struct #rs_name {
            #(#rs_fields,)*
        }

        impl ::lazyrow::DeclareSchema for #rs_name {
            fn schema() -> ::lazyrow::Schema {
                ::lazyrow::Schema::new(#table, #model)
                    #namespace
                    #(.column(#columns))*
                    #read
                    #write
                    #(.mixin(#mixins))*
                    #(.model_interface(#interfaces))*
                    #(.model_trait(#model_traits))*
                    #accessors
                    #schema_codegen
            }
        }
    }
}
