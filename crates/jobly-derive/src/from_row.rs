//! FromRow derive macro implementation

use crate::attrs::{column_name, field_ident, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = named_fields(&input, "FromRow")?;

    let field_extracts = fields
        .iter()
        .map(|field| {
            let field_name = field_ident(field)?;
            let column_name = column_name(field)?;

            Ok(quote! {
                #field_name: row.try_get_column(#column_name)?
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics jobly::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &jobly::tokio_postgres::Row) -> jobly::JoblyResult<Self> {
                use jobly::RowExt;
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
