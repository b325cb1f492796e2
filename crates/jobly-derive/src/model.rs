//! Model derive macro implementation

use crate::attrs::{column_name, field_attr, field_ident, named_fields, table_name};
use heck::ToShoutySnakeCase;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{DeriveInput, Ident, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table_name = table_name(&input)?;
    let fields = named_fields(&input, "Model")?;

    let mut column_names = Vec::with_capacity(fields.len());
    let mut column_consts = Vec::with_capacity(fields.len());
    let mut id_column: Option<String> = None;

    for field in fields {
        let column = column_name(field)?;

        if field_attr(field)?.is_id {
            if id_column.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[orm(id)]",
                ));
            }
            id_column = Some(column.clone());
        }

        let const_name = Ident::new(
            &format!("COL_{}", field_ident(field)?.to_string().to_shouty_snake_case()),
            Span::call_site(),
        );
        column_consts.push(quote! { pub const #const_name: &'static str = #column; });
        column_names.push(column);
    }

    let select_list = column_names.join(", ");

    let id_const = match &id_column {
        Some(id) => quote! { pub const ID: &'static str = #id; },
        None => quote! {},
    };

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub const TABLE: &'static str = #table_name;
            #id_const
            #(#column_consts)*
            pub const SELECT_LIST: &'static str = #select_list;

            pub fn select_list_as(alias: &str) -> ::std::string::String {
                [#(#column_names),*]
                    .iter()
                    .map(|col| ::std::format!("{}.{}", alias, col))
                    .collect::<::std::vec::Vec<_>>()
                    .join(", ")
            }
        }
    })
}
