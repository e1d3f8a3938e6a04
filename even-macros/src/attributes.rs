//! Parsing of `#[even(...)]` attributes.

use syn::parse::Parse;
use syn::{Attribute, Error, LitInt, LitStr, Result, Token, Type};

/// Declarations collected from the `#[even(...)]` attributes of a type.
#[derive(Debug, Default)]
pub struct EventAttributes {
    pub name: Option<LitStr>,
    pub module: Option<LitStr>,
    pub category: Option<LitStr>,
    pub event_type: Option<LitStr>,
    pub storage_format: Option<u32>,
    pub anonymous: bool,
    pub implements: Vec<Type>,
}

/// Parse every `#[even(...)]` attribute on a type.
pub fn parse_event_attributes(attrs: &[Attribute]) -> Result<EventAttributes> {
    let mut parsed = EventAttributes::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("even")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                set_once(&mut parsed.name, non_empty(meta.value()?.parse()?)?, &meta.path)
            } else if meta.path.is_ident("module") {
                set_once(&mut parsed.module, non_empty(meta.value()?.parse()?)?, &meta.path)
            } else if meta.path.is_ident("category") {
                set_once(&mut parsed.category, non_empty(meta.value()?.parse()?)?, &meta.path)
            } else if meta.path.is_ident("event_type") {
                set_once(
                    &mut parsed.event_type,
                    non_empty(meta.value()?.parse()?)?,
                    &meta.path,
                )
            } else if meta.path.is_ident("storage_format") {
                let format: LitInt = meta.value()?.parse()?;
                set_once(&mut parsed.storage_format, format.base10_parse()?, &meta.path)
            } else if meta.path.is_ident("anonymous") {
                parsed.anonymous = true;
                Ok(())
            } else if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let types = content.parse_terminated(Type::parse, Token![,])?;
                parsed.implements.extend(types);
                Ok(())
            } else {
                Err(meta.error(
                    "unsupported `even` attribute; expected one of `name`, `module`, \
                     `category`, `event_type`, `storage_format`, `anonymous`, `implements`",
                ))
            }
        })?;
    }

    Ok(parsed)
}

fn non_empty(lit: LitStr) -> Result<LitStr> {
    if lit.value().is_empty() {
        return Err(Error::new(lit.span(), "value cannot be empty"));
    }
    Ok(lit)
}

fn set_once<T>(slot: &mut Option<T>, value: T, path: &syn::Path) -> Result<()> {
    if slot.is_some() {
        return Err(Error::new_spanned(path, "duplicate `even` attribute"));
    }
    *slot = Some(value);
    Ok(())
}
