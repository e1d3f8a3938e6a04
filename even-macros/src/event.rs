//! Implementation of the #[derive(DomainEvent)] procedural macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error, Result, Type};

use crate::attributes::{parse_event_attributes, EventAttributes};

/// Expands the #[derive(DomainEvent)] macro.
///
/// Generic types are rejected: the persisted type name is a constant, so
/// every instantiation would share one type reference and one predicate
/// identity.
pub fn expand_derive_domain_event(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics.params,
            "`DomainEvent` cannot be derived for generic types; \
             declare one event type per instantiation",
        ));
    }
    let attributes = parse_event_attributes(&input.attrs)?;

    let full_name = match &attributes.name {
        Some(lit) => quote! { #lit },
        None => quote! {
            ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name))
        },
    };
    let module_name = match &attributes.module {
        Some(lit) => quote! { #lit },
        None => quote! { ::core::env!("CARGO_CRATE_NAME") },
    };
    let declaration = generate_declaration(&attributes);
    let supertypes = attributes.implements.iter().map(supertype_key);

    Ok(quote! {
        impl ::even::DeclaredEvent for #name {
            const FULL_NAME: &'static str = #full_name;
            const MODULE_NAME: &'static str = #module_name;

            fn declaration() -> ::even::TypeMetadata {
                #declaration
            }

            fn supertypes() -> ::std::vec::Vec<::even::TypeKey> {
                ::std::vec![#(#supertypes),*]
            }
        }

        impl ::even::domain::DomainEvent for #name {
            fn type_key(&self) -> ::even::TypeKey {
                ::even::TypeKey::declared::<Self>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}

/// Key of a declared supertype.
///
/// Trait objects are described by their type name. Any other supertype must
/// itself be a declared event, so its key carries its own supertypes and
/// matching stays transitive.
fn supertype_key(supertype: &Type) -> TokenStream {
    match supertype {
        Type::TraitObject(_) => quote! { ::even::TypeKey::of::<#supertype>() },
        _ => quote! { ::even::TypeKey::declared::<#supertype>() },
    }
}

/// Generate the `TypeMetadata` builder chain for the declared attributes.
fn generate_declaration(attributes: &EventAttributes) -> TokenStream {
    let category = attributes
        .category
        .iter()
        .map(|category| quote! { .with_category(#category) });
    let event_type = attributes
        .event_type
        .iter()
        .map(|event_type| quote! { .with_event_type(#event_type) });
    let storage_format = attributes
        .storage_format
        .iter()
        .map(|format| quote! { .with_storage_format(#format) });
    let anonymous = attributes.anonymous.then(|| quote! { .anonymous() });

    quote! {
        ::even::TypeMetadata::new() #(#category)* #(#event_type)* #(#storage_format)* #anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> String {
        expand_derive_domain_event(input).unwrap().to_string()
    }

    #[test]
    fn test_expand_uses_declared_names() {
        let expanded = expand(parse_quote! {
            #[even(name = "Bank.AccountOpened", module = "Bank")]
            struct AccountOpened;
        });

        assert!(expanded.contains("\"Bank.AccountOpened\""));
        assert!(expanded.contains("\"Bank\""));
        assert!(!expanded.contains("module_path"));
    }

    #[test]
    fn test_expand_defaults_to_module_path() {
        let expanded = expand(parse_quote! {
            struct AccountOpened;
        });

        assert!(expanded.contains("module_path"));
        assert!(expanded.contains("CARGO_CRATE_NAME"));
    }

    #[test]
    fn test_expand_declaration_chain() {
        let expanded = expand(parse_quote! {
            #[even(category = "accounts", storage_format = 2, anonymous)]
            struct Inline;
        });

        assert!(expanded.contains("with_category"));
        assert!(expanded.contains("with_storage_format (2u32)"));
        assert!(expanded.contains("anonymous ()"));
        assert!(!expanded.contains("with_event_type"));
    }

    #[test]
    fn test_expand_trait_object_supertypes() {
        let expanded = expand(parse_quote! {
            #[even(implements(dyn AccountEvent))]
            struct AccountOpened;
        });

        assert!(expanded.contains("TypeKey :: of :: < dyn AccountEvent >"));
    }

    #[test]
    fn test_expand_declared_supertypes() {
        let expanded = expand(parse_quote! {
            #[even(implements(Deposit, dyn AccountEvent))]
            struct CashDeposit;
        });

        assert!(expanded.contains("TypeKey :: declared :: < Deposit >"));
        assert!(expanded.contains("TypeKey :: of :: < dyn AccountEvent >"));
        assert!(!expanded.contains("TypeKey :: of :: < Deposit >"));
    }

    #[test]
    fn test_expand_rejects_generics() {
        let input: DeriveInput = parse_quote! {
            struct Wrapped<T: Send> {
                inner: T,
            }
        };

        let err = expand_derive_domain_event(input).unwrap_err();
        assert!(err.to_string().contains("cannot be derived for generic types"));
    }

    #[test]
    fn test_expand_rejects_lifetime_parameters() {
        let input: DeriveInput = parse_quote! {
            struct Borrowed<'a> {
                owner: &'a str,
            }
        };

        assert!(expand_derive_domain_event(input).is_err());
    }

    #[test]
    fn test_expand_reports_attribute_errors() {
        let input: DeriveInput = parse_quote! {
            #[even(unknown)]
            struct AccountOpened;
        };

        assert!(expand_derive_domain_event(input).is_err());
    }
}
