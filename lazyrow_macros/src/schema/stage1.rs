use syn::{Attribute, Field, Fields, Ident, Item, ItemStruct, Type, Visibility, spanned::Spanned};

use crate::utils::collections::TryCollectAll;

const SCHEMA_MUST_BE_STRUCT: &str = "schema item must be struct";
const SCHEMA_MUST_HAVE_NAMED_FIELDS: &str = "schema struct must have named fields";
const GENERICS_ARE_NOT_ALLOWED: &str = "generics are not allowed";

/// `default(key = "...", value = ...)`
#[derive(darling::FromMeta)]
pub struct DefaultArgAttr {
    pub key: String,
    pub value: syn::Lit,
}

#[derive(darling::FromMeta, Default)]
#[darling(default)]
pub struct CodegenAttr {
    pub insertion_point: Option<String>,
    #[darling(multiple, rename = "default")]
    pub defaults: Vec<DefaultArgAttr>,
}

#[derive(darling::FromMeta, Default)]
#[darling(default)]
pub struct SchemaAttr {
    pub table: Option<String>,
    pub model: Option<String>,
    pub namespace: Option<String>,
    pub read: Option<String>,
    pub write: Option<String>,
    #[darling(multiple)]
    pub mixin: Vec<String>,
    #[darling(multiple)]
    pub interface: Vec<String>,
    #[darling(multiple)]
    pub model_trait: Vec<String>,
    pub accessors: Option<bool>,
    pub codegen: Option<CodegenAttr>,
}
impl TryFrom<proc_macro2::TokenStream> for SchemaAttr {
    type Error = syn::Error;
    fn try_from(input: proc_macro2::TokenStream) -> Result<Self, Self::Error> {
        let metas = darling::ast::NestedMeta::parse_meta_list(input)?;
        let attr = <Self as darling::FromMeta>::from_list(&metas)?;
        Ok(attr)
    }
}

#[derive(darling::FromAttributes, Default)]
#[darling(attributes(column), default)]
pub struct ColumnAttr {
    pub name: Option<String>,
    pub isa: Option<String>,
    pub primary: bool,
    pub unique: bool,
    pub findable: bool,
    pub inflator: Option<String>,
    pub sql_type: Option<String>,
}

fn is_column_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("column")
}

pub struct Column {
    pub rs_name: Ident,
    pub rs_ty: Type,
    pub rs_vis: Visibility,
    /// Attributes other than `#[column]`, re-emitted as is.
    pub rs_attrs: Vec<Attribute>,
    pub attr: ColumnAttr,
}
impl TryFrom<Field> for Column {
    type Error = syn::Error;
    fn try_from(field: Field) -> Result<Self, Self::Error> {
        let field_span = field.span();
        let Field {
            attrs,
            vis: rs_vis,
            mutability: _,
            ident: rs_name,
            colon_token: _,
            ty: rs_ty,
        } = field;

        let Some(rs_name) = rs_name else {
            return Err(syn::Error::new(field_span, SCHEMA_MUST_HAVE_NAMED_FIELDS));
        };
        let (column_attrs, rs_attrs): (Vec<_>, Vec<_>) =
            attrs.into_iter().partition(is_column_attr);
        let attr = <ColumnAttr as darling::FromAttributes>::from_attributes(&column_attrs)?;

        Ok(Self {
            rs_name,
            rs_ty,
            rs_vis,
            rs_attrs,
            attr,
        })
    }
}

pub struct Table {
    pub rs_name: Ident,
    pub rs_vis: Visibility,
    pub rs_attrs: Vec<Attribute>,
    pub columns: Vec<Column>,
}
impl syn::parse::Parse for Table {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        input.parse::<Item>().and_then(Table::try_from)
    }
}
impl TryFrom<Item> for Table {
    type Error = syn::Error;
    fn try_from(item: Item) -> Result<Self, Self::Error> {
        let Item::Struct(item_struct) = item else {
            return Err(syn::Error::new(item.span(), SCHEMA_MUST_BE_STRUCT));
        };
        let ItemStruct {
            attrs: rs_attrs,
            vis: rs_vis,
            struct_token: _,
            ident: rs_name,
            generics: rs_generics,
            fields: rs_columns,
            semi_token: _,
        } = item_struct;

        if !rs_generics.params.is_empty() || rs_generics.where_clause.is_some() {
            return Err(syn::Error::new(rs_generics.span(), GENERICS_ARE_NOT_ALLOWED));
        }
        let Fields::Named(rs_columns) = rs_columns else {
            return Err(syn::Error::new(rs_name.span(), SCHEMA_MUST_HAVE_NAMED_FIELDS));
        };

        let columns = rs_columns
            .named
            .into_iter()
            .map(Column::try_from)
            .try_collect_all()?;

        Ok(Self {
            rs_name,
            rs_vis,
            rs_attrs,
            columns,
        })
    }
}
