//! Derive macros for statically declared table catalogs.
//!
//! This crate provides the `#[derive(Table)]` macro, which turns a struct into
//! a table whose columns are zero-sized, typed accessors usable in
//! `oxide-query-core` statements.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit,
    Meta, PathArguments, Type,
};

/// Derives the `Table` trait for a struct, generating typed column accessors
/// and row decoding.
///
/// # Attributes
///
/// - `#[table(name = "TABLE_NAME")]` - Specifies the SQL table name (optional,
///   defaults to the upper snake case of the struct name)
/// - `#[table(schema = "SCHEMA")]` - Declares the schema the table lives in
///   (optional, defaults to the database's default schema)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(name = "COLUMN_NAME")]` - Specifies the SQL column name
///   (optional, defaults to the upper-cased field name)
/// - `#[column(nullable)]` - Marks the column as nullable (implied for
///   `Option<T>` fields)
///
/// # Generated Items
///
/// For a struct `Employee`, this macro generates:
///
/// - `EmployeeTable` - A type implementing `Table` with the table metadata,
///   plus `table_name()`, `alias(name)` and one accessor per column
/// - `EmployeeColumns` - A module containing the column types (`Id`,
///   `Name`, etc.)
/// - Column accessor methods on `Employee` itself
/// - `FromRow` for `Employee`, decoding the columns in declaration order
///
/// ```rust
/// use oxide_query_core::schema::{Column, Table};
/// use oxide_query_derive::Table;
///
/// #[derive(Table)]
/// #[table(schema = "HR")]
/// pub struct OrderLine {
///     #[column(primary_key)]
///     id: i64,
///     #[column(name = "QTY")]
///     quantity: i32,
///     note: Option<String>,
/// }
///
/// # fn main() {
/// assert_eq!(<OrderLineTable as Table>::NAME, "ORDER_LINE");
/// assert_eq!(<OrderLineTable as Table>::SCHEMA, Some("HR"));
/// assert_eq!(<OrderLineColumns::Quantity as Column>::NAME, "QTY");
/// assert!(<OrderLineColumns::Note as Column>::NULLABLE);
/// assert_eq!(<OrderLineTable as Table>::PRIMARY_KEY, Some("ID"));
/// # }
/// ```
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_attrs = parse_table_attrs(&input.attrs)?;
    let table_name = table_attrs
        .name
        .unwrap_or_else(|| to_upper_snake_case(&struct_name.to_string()));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Table derive does not support generic structs",
        ));
    }

    // Collect field information
    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let column_attrs = parse_column_attrs(&field.attrs)?;

        column_infos.push(ColumnInfo {
            field_name: field_name.clone(),
            field_type: field.ty.clone(),
            column_name: column_attrs
                .name
                .unwrap_or_else(|| field_name.to_string().to_ascii_uppercase()),
            is_primary_key: column_attrs.primary_key,
            is_nullable: column_attrs.nullable || is_option(&field.ty),
        });
    }

    if column_infos.iter().filter(|c| c.is_primary_key).count() > 1 {
        return Err(syn::Error::new_spanned(
            input,
            "Table derive supports at most one primary key column",
        ));
    }

    // Column type names (PascalCase)
    let column_type_names: Vec<Ident> = column_infos
        .iter()
        .map(|c| format_ident!("{}", to_pascal_case(&c.field_name.to_string())))
        .collect();

    let table_struct_name = format_ident!("{}Table", struct_name);
    let columns_mod_name = format_ident!("{}Columns", struct_name);

    let column_structs: Vec<TokenStream2> = column_infos
        .iter()
        .zip(column_type_names.iter())
        .map(|(info, type_name)| {
            let column_name = &info.column_name;
            let field_type = &info.field_type;
            let is_nullable = info.is_nullable;
            let is_primary_key = info.is_primary_key;
            let doc = format!("The `{table_name}.{column_name}` column.");

            quote! {
                #[doc = #doc]
                #[derive(Debug, Clone, Copy)]
                pub struct #type_name;

                impl ::oxide_query_core::schema::Column for #type_name {
                    type Table = super::#table_struct_name;
                    type Type = #field_type;

                    const NAME: &'static str = #column_name;
                    const DATA_TYPE: ::oxide_query_core::schema::DataType =
                        <#field_type as ::oxide_query_core::schema::SqlType>::DATA_TYPE;
                    const NULLABLE: bool = #is_nullable;
                    const PRIMARY_KEY: bool = #is_primary_key;
                }
            }
        })
        .collect();

    let column_accessors: Vec<TokenStream2> = column_infos
        .iter()
        .zip(column_type_names.iter())
        .map(|(info, type_name)| {
            let method_name = &info.field_name;
            quote! {
                /// Returns the column accessor.
                #[inline]
                #[must_use]
                pub const fn #method_name() -> #columns_mod_name::#type_name {
                    #columns_mod_name::#type_name
                }
            }
        })
        .collect();

    let primary_key = match column_infos.iter().find(|c| c.is_primary_key) {
        Some(pk) => {
            let name = &pk.column_name;
            quote! { Some(#name) }
        }
        None => quote! { None },
    };

    let schema = match &table_attrs.schema {
        Some(schema) => quote! { Some(#schema) },
        None => quote! { None },
    };

    let schema_entries: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let col_name = &info.column_name;
            let field_type = &info.field_type;
            let is_nullable = info.is_nullable;
            let is_primary_key = info.is_primary_key;

            quote! {
                ::oxide_query_core::schema::ColumnSchema {
                    name: #col_name,
                    data_type: <#field_type as ::oxide_query_core::schema::SqlType>::DATA_TYPE,
                    nullable: #is_nullable,
                    primary_key: #is_primary_key,
                }
            }
        })
        .collect();

    let field_names: Vec<&Ident> = column_infos.iter().map(|c| &c.field_name).collect();
    let field_types: Vec<&Type> = column_infos.iter().map(|c| &c.field_type).collect();

    let columns_doc = format!("Column types for the `{table_name}` table.");
    let table_doc = format!("Table metadata for `{struct_name}`.");

    let expanded = quote! {
        #[doc = #columns_doc]
        #[allow(non_snake_case)]
        pub mod #columns_mod_name {
            #(#column_structs)*
        }

        #[doc = #table_doc]
        #[derive(Debug, Clone, Copy)]
        pub struct #table_struct_name;

        impl ::oxide_query_core::schema::Table for #table_struct_name {
            type Row = #struct_name;

            const NAME: &'static str = #table_name;
            const SCHEMA: Option<&'static str> = #schema;
            const COLUMNS: &'static [::oxide_query_core::schema::ColumnSchema] = &[
                #(#schema_entries),*
            ];
            const PRIMARY_KEY: Option<&'static str> = #primary_key;
        }

        impl #table_struct_name {
            /// Returns the table name.
            #[inline]
            #[must_use]
            pub const fn table_name() -> &'static str {
                #table_name
            }

            /// Creates an alias of this table with an explicit name.
            #[must_use]
            pub fn alias(name: impl Into<String>) -> ::oxide_query_core::scope::Alias<Self> {
                ::oxide_query_core::scope::Alias::new(name)
            }

            #(#column_accessors)*
        }

        impl #struct_name {
            /// Returns the table metadata type.
            #[must_use]
            pub const fn table() -> #table_struct_name {
                #table_struct_name
            }

            #(#column_accessors)*
        }

        impl ::oxide_query_core::row::FromRow for #struct_name {
            const WIDTH: usize = 0 #(+ <#field_types as ::oxide_query_core::row::FromRow>::WIDTH)*;

            fn from_row(
                row: &::oxide_query_core::row::Row,
                offset: usize,
            ) -> ::oxide_query_core::error::Result<Self> {
                let mut _at = offset;
                Ok(Self {
                    #(
                        #field_names: {
                            let value = <#field_types as ::oxide_query_core::row::FromRow>::from_row(row, _at)?;
                            _at += <#field_types as ::oxide_query_core::row::FromRow>::WIDTH;
                            value
                        },
                    )*
                })
            }
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
    is_nullable: bool,
}

#[derive(Default)]
struct TableAttrs {
    name: Option<String>,
    schema: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    nullable: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn parse_table_attrs(attrs: &[Attribute]) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else if meta.path.is_ident("schema") {
                    result.schema = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unknown table attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("nullable") {
                    result.nullable = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unknown column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

/// Returns true for `Option<T>` (also spelled `std::option::Option<T>`).
fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| {
        segment.ident == "Option"
            && matches!(
                &segment.arguments,
                PathArguments::AngleBracketed(args)
                    if matches!(args.args.first(), Some(GenericArgument::Type(_)))
            )
    })
}

fn to_upper_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.push(c.to_ascii_uppercase());
    }
    result
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
