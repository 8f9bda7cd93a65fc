//! Procedural macros for Bookdesk
//!
//! - `mutation_result!` - Generate GraphQL mutation result envelopes

use proc_macro::TokenStream;
use quote::quote;
use syn::{Ident, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input};

/// Generate a GraphQL mutation result type carrying `success`, field-keyed
/// `errors`, a human readable `message` and a payload field.
///
/// # Usage
///
/// ```ignore
/// mutation_result!(AddNewBookResult, book: Book);
/// ```
///
/// # Generated Code
///
/// ```ignore
/// #[derive(Debug, Clone, async_graphql::SimpleObject)]
/// pub struct AddNewBookResult {
///     pub success: bool,
///     pub errors: Option<crate::graphql::FieldErrors>,
///     pub message: Option<String>,
///     pub book: Option<Book>,
/// }
///
/// impl AddNewBookResult {
///     pub fn success(message: impl Into<String>, book: Book) -> Self { .. }
///     pub fn failure(errors: crate::graphql::FieldErrors) -> Self { .. }
/// }
/// ```
///
/// The expansion refers to `crate::graphql::FieldErrors`, so the macro is only
/// usable inside the `bookdesk` crate.
#[proc_macro]
pub fn mutation_result(input: TokenStream) -> TokenStream {
    let MutationResultInput {
        name,
        field_name,
        field_type,
    } = parse_macro_input!(input as MutationResultInput);

    let output = quote! {
        #[derive(Debug, Clone, async_graphql::SimpleObject)]
        pub struct #name {
            pub success: bool,
            pub errors: Option<crate::graphql::FieldErrors>,
            pub message: Option<String>,
            pub #field_name: Option<#field_type>,
        }

        impl #name {
            pub fn success(message: impl Into<String>, #field_name: #field_type) -> Self {
                Self {
                    success: true,
                    errors: None,
                    message: Some(message.into()),
                    #field_name: Some(#field_name),
                }
            }

            pub fn failure(errors: crate::graphql::FieldErrors) -> Self {
                Self {
                    success: false,
                    errors: Some(errors),
                    message: None,
                    #field_name: None,
                }
            }
        }
    };
    output.into()
}

/// Input for mutation_result! macro: `Name, field: Type`
struct MutationResultInput {
    name: Ident,
    field_name: Ident,
    field_type: Type,
}

impl Parse for MutationResultInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![,]>()?;
        let field_name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let field_type: Type = input.parse()?;

        Ok(MutationResultInput {
            name,
            field_name,
            field_type,
        })
    }
}
