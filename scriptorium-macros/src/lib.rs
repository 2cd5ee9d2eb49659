//! Procedural macros for scriptorium
//!
//! This crate provides macros to reduce boilerplate in entity schemas:
//!
//! - `#[derive(Column)]` - Generate the `Column` implementation for a schema's column enum

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input};

/// Generate a `scriptorium::orm::Column` implementation for a unit enum.
///
/// Each variant is one column. The column name defaults to the snake_case form of the
/// variant name.
///
/// # Usage
///
/// ```ignore
/// #[derive(Column, Clone, Copy, Debug, PartialEq, Eq)]
/// pub enum PostColumn {
///     #[column(primary_key)]
///     Id,
///     Title,
///     #[column(kind = "integer", default = "0")]
///     MenuOrder,
///     #[column(nullable)]
///     PublishedAt,
///     #[column(created_at)]
///     CreatedAt,
///     #[column(updated_at)]
///     UpdatedAt,
/// }
/// ```
///
/// Supported attributes: `primary_key`, `created_at`, `updated_at`, `nullable`,
/// `kind = "text" | "integer" | "real" | "boolean" | "timestamp" | "json"`,
/// `name = "..."` and `default = "..."` (a raw SQL default expression).
///
/// Exactly one variant must be the primary key; at most one may be `created_at` and
/// at most one `updated_at`.
#[proc_macro_derive(Column, attributes(column))]
pub fn derive_column(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as DeriveInput);
    match expand_column(&parsed) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Data,
    PrimaryKey,
    CreatedAt,
    UpdatedAt,
}

/// One enum variant resolved into a column description
struct VariantColumn {
    ident: Ident,
    name: String,
    kind: &'static str,
    nullable: bool,
    default: Option<String>,
    role: Role,
}

fn parse_kind(lit: &LitStr) -> syn::Result<&'static str> {
    match lit.value().as_str() {
        "text" => Ok("Text"),
        "integer" => Ok("Integer"),
        "real" => Ok("Real"),
        "boolean" => Ok("Boolean"),
        "timestamp" => Ok("Timestamp"),
        "json" => Ok("Json"),
        other => Err(syn::Error::new_spanned(
            lit,
            format!("unknown column kind `{other}`"),
        )),
    }
}

fn set_role(column: &mut VariantColumn, role: Role, span: &syn::Path) -> syn::Result<()> {
    if column.role != Role::Data {
        return Err(syn::Error::new_spanned(
            span,
            "a column can only have one of primary_key, created_at, updated_at",
        ));
    }
    column.role = role;
    Ok(())
}

fn parse_variant(variant: &syn::Variant) -> syn::Result<VariantColumn> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            variant,
            "Column variants must not carry fields",
        ));
    }

    let mut column = VariantColumn {
        ident: variant.ident.clone(),
        name: variant.ident.to_string().to_case(Case::Snake),
        kind: "Text",
        nullable: false,
        default: None,
        role: Role::Data,
    };
    let mut explicit_kind = false;

    for attr in &variant.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                return set_role(&mut column, Role::PrimaryKey, &meta.path);
            }
            if meta.path.is_ident("created_at") {
                return set_role(&mut column, Role::CreatedAt, &meta.path);
            }
            if meta.path.is_ident("updated_at") {
                return set_role(&mut column, Role::UpdatedAt, &meta.path);
            }
            if meta.path.is_ident("nullable") {
                column.nullable = true;
                return Ok(());
            }
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                column.name = lit.value();
                return Ok(());
            }
            if meta.path.is_ident("default") {
                let lit: LitStr = meta.value()?.parse()?;
                column.default = Some(lit.value());
                return Ok(());
            }
            if meta.path.is_ident("kind") {
                let lit: LitStr = meta.value()?.parse()?;
                column.kind = parse_kind(&lit)?;
                explicit_kind = true;
                return Ok(());
            }
            Err(meta.error("unsupported column attribute"))
        })?;
    }

    match column.role {
        Role::PrimaryKey => {
            if explicit_kind && column.kind != "Text" {
                return Err(syn::Error::new_spanned(
                    variant,
                    "primary key columns are always text identifiers",
                ));
            }
            if column.nullable {
                return Err(syn::Error::new_spanned(
                    variant,
                    "primary key columns cannot be nullable",
                ));
            }
        }
        Role::CreatedAt | Role::UpdatedAt => {
            if !explicit_kind {
                column.kind = "Timestamp";
            }
        }
        Role::Data => {}
    }

    Ok(column)
}

fn find_role<'a>(
    columns: &'a [VariantColumn],
    role: Role,
    label: &str,
) -> syn::Result<Option<&'a VariantColumn>> {
    let mut matches = columns.iter().filter(|c| c.role == role);
    let first = matches.next();
    if let Some(extra) = matches.next() {
        return Err(syn::Error::new_spanned(
            &extra.ident,
            format!("only one column may be marked `{label}`"),
        ));
    }
    Ok(first)
}

fn expand_column(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Column can only be derived for enums",
        ));
    };

    let columns = data
        .variants
        .iter()
        .map(parse_variant)
        .collect::<syn::Result<Vec<_>>>()?;

    let Some(primary_key) = find_role(&columns, Role::PrimaryKey, "primary_key")? else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "a Column enum needs exactly one `#[column(primary_key)]` variant",
        ));
    };
    let created_at = find_role(&columns, Role::CreatedAt, "created_at")?;
    let updated_at = find_role(&columns, Role::UpdatedAt, "updated_at")?;

    for (i, column) in columns.iter().enumerate() {
        if columns[..i].iter().any(|c| c.name == column.name) {
            return Err(syn::Error::new_spanned(
                &column.ident,
                format!("duplicate column name `{}`", column.name),
            ));
        }
    }

    let enum_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let variants: Vec<&Ident> = columns.iter().map(|c| &c.ident).collect();
    let defs = columns.iter().map(|c| {
        let ident = &c.ident;
        let name = &c.name;
        let kind = Ident::new(c.kind, proc_macro2::Span::call_site());
        let nullable = c.nullable;
        let default = match &c.default {
            Some(value) => quote! { ::core::option::Option::Some(#value) },
            None => quote! { ::core::option::Option::None },
        };
        let role = Ident::new(
            match c.role {
                Role::Data => "Data",
                Role::PrimaryKey => "PrimaryKey",
                Role::CreatedAt => "CreatedAt",
                Role::UpdatedAt => "UpdatedAt",
            },
            proc_macro2::Span::call_site(),
        );
        quote! {
            Self::#ident => ::scriptorium::orm::ColumnDef {
                name: #name,
                column_type: ::scriptorium::orm::ColumnType::#kind,
                nullable: #nullable,
                default: #default,
                role: ::scriptorium::orm::ColumnRole::#role,
            },
        }
    });

    let primary_key_ident = &primary_key.ident;
    let optional_variant = |column: Option<&VariantColumn>| match column {
        Some(c) => {
            let ident = &c.ident;
            quote! { ::core::option::Option::Some(Self::#ident) }
        }
        None => quote! { ::core::option::Option::None },
    };
    let created_at = optional_variant(created_at);
    let updated_at = optional_variant(updated_at);

    Ok(quote! {
        impl #impl_generics ::scriptorium::orm::Column for #enum_name #ty_generics #where_clause {
            const ALL: &'static [Self] = &[#(Self::#variants),*];

            fn def(&self) -> ::scriptorium::orm::ColumnDef {
                match self {
                    #(#defs)*
                }
            }

            fn primary_key() -> Self {
                Self::#primary_key_ident
            }

            fn created_at() -> ::core::option::Option<Self> {
                #created_at
            }

            fn updated_at() -> ::core::option::Option<Self> {
                #updated_at
            }
        }
    })
}
