use std::collections::HashSet;

use heck::ToSnakeCase;
use syn::{Ident, Type, spanned::Spanned};

use super::stage1;
use crate::utils::{collections::TryCollectAll, multiplicity, syn::parse_last_ident_from_type};

const SCHEMA_MUST_HAVE_PRIMARY: &str =
    "schema must have a primary column: mark one with `#[column(primary)]` or name it `id`";
const MULTIPLE_PRIMARY_COLUMNS: &str = "only one column can be primary";
const DUPLICATE_COLUMN: &str = "column is declared more than once";
const PRIMARY_MUST_NOT_BE_OPTIONAL: &str = "primary column must not be `Option`";
const CANNOT_INFER_ISA: &str = "cannot infer isa from type, set `#[column(isa = \"...\")]`";

fn infer_isa(rs_ty: &Type) -> Result<&'static str, syn::Error> {
    let ident = parse_last_ident_from_type(rs_ty)?;
    let ident = &*ident.to_string();
    match ident {
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize" => {
            Ok("int")
        }
        "String" => Ok("str"),
        "bool" => Ok("bool"),
        "f32" | "f64" => Ok("float"),
        "Value" => Ok("json"),
        "DateTime" | "NaiveDateTime" => Ok("DateTime"),
        _ => Err(syn::Error::new(rs_ty.span(), CANNOT_INFER_ISA)),
    }
}

fn rs_name_str(rs_name: &Ident) -> String {
    let name = rs_name.to_string();
    match name.strip_prefix("r#") {
        Some(name) => name.to_owned(),
        None => name,
    }
}

pub struct Column {
    pub name: String,
    pub isa: String,
    pub nullable: bool,
    pub primary: bool,
    pub unique: bool,
    pub findable: bool,
    pub inflator: Option<String>,
    pub sql_type: Option<String>,
}
impl TryFrom<&stage1::Column> for Column {
    type Error = syn::Error;
    fn try_from(column: &stage1::Column) -> Result<Self, Self::Error> {
        let (rs_ty, optional) = multiplicity::optional(&column.rs_ty);
        let isa = match &column.attr.isa {
            Some(isa) => isa.clone(),
            None => infer_isa(rs_ty)?.to_owned(),
        };
        if column.attr.primary && optional {
            return Err(syn::Error::new(
                column.rs_ty.span(),
                PRIMARY_MUST_NOT_BE_OPTIONAL,
            ));
        }
        Ok(Self {
            name: column
                .attr
                .name
                .clone()
                .unwrap_or_else(|| rs_name_str(&column.rs_name)),
            isa,
            nullable: optional,
            primary: column.attr.primary,
            unique: column.attr.unique,
            findable: column.attr.findable,
            inflator: column.attr.inflator.clone(),
            sql_type: column.attr.sql_type.clone(),
        })
    }
}

pub struct Codegen {
    pub insertion_point: Option<String>,
    pub defaults: Vec<(String, syn::Lit)>,
}

pub struct Schema {
    pub table: String,
    pub model: String,
    pub namespace: Option<String>,
    pub read: Option<String>,
    pub write: Option<String>,
    pub mixins: Vec<String>,
    pub interfaces: Vec<String>,
    pub model_traits: Vec<String>,
    pub accessors: bool,
    pub codegen: Option<Codegen>,
    pub columns: Vec<Column>,
}
impl Schema {
    pub fn try_new(table: &stage1::Table, attr: stage1::SchemaAttr) -> Result<Self, syn::Error> {
        let mut columns: Vec<Column> = table
            .columns
            .iter()
            .map(Column::try_from)
            .try_collect_all()?;

        let mut names = HashSet::with_capacity(columns.len());
        let mut primary: Option<usize> = None;
        for (i, column) in columns.iter().enumerate() {
            let span = table.columns[i].rs_name.span();
            if !names.insert(column.name.as_str()) {
                return Err(syn::Error::new(span, DUPLICATE_COLUMN));
            }
            if column.primary {
                if primary.is_some() {
                    return Err(syn::Error::new(span, MULTIPLE_PRIMARY_COLUMNS));
                }
                primary = Some(i);
            }
        }
        if primary.is_none() {
            let id = columns
                .iter()
                .position(|column| column.name == "id")
                .ok_or_else(|| syn::Error::new(table.rs_name.span(), SCHEMA_MUST_HAVE_PRIMARY))?;
            if columns[id].nullable {
                return Err(syn::Error::new(
                    table.columns[id].rs_ty.span(),
                    PRIMARY_MUST_NOT_BE_OPTIONAL,
                ));
            }
            columns[id].primary = true;
        }

        let rs_name = rs_name_str(&table.rs_name);
        Ok(Self {
            table: attr.table.unwrap_or_else(|| rs_name.to_snake_case()),
            model: attr.model.unwrap_or(rs_name),
            namespace: attr.namespace,
            read: attr.read,
            write: attr.write,
            mixins: attr.mixin,
            interfaces: attr.interface,
            model_traits: attr.model_trait,
            accessors: attr.accessors.unwrap_or(true),
            codegen: attr.codegen.map(|codegen| Codegen {
                insertion_point: codegen.insertion_point,
                defaults: codegen
                    .defaults
                    .into_iter()
                    .map(|default| (default.key, default.value))
                    .collect(),
            }),
            columns,
        })
    }
}
