//! Procedural macros for the Even event sourcing core.
//!
//! Rust has no attribute reflection, so event types declare their metadata at
//! compile time through `#[derive(DomainEvent)]` and `#[even(...)]`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attributes;
mod event;

use event::expand_derive_domain_event;

/// Derive macro implementing `DomainEvent` and `DeclaredEvent`.
///
/// Every declaration is optional:
///
/// | Attribute                    | Effect                                                  |
/// |------------------------------|---------------------------------------------------------|
/// | `name = "Bank.AccountOpened"`| Full type name; defaults to `module_path!()::Type`       |
/// | `module = "Bank"`            | Defining module; defaults to the crate name              |
/// | `category = "accounts"`      | Stream category; defaults to the lower-cased type name  |
/// | `event_type = "opened"`      | Event-type name; defaults to the type name              |
/// | `storage_format = 2`         | Storage-format version; defaults to 0                   |
/// | `anonymous`                  | No stable type name; envelopes use the anonymous label  |
/// | `implements(A, dyn B)`       | Supertypes matched by projection predicates             |
///
/// A supertype that is not a trait object must itself derive `DomainEvent`;
/// its own supertypes are then matched too. Generic types are rejected.
///
/// # Example
///
/// ```ignore
/// use even::DomainEvent;
///
/// trait AccountEvent {}
///
/// #[derive(Debug, DomainEvent)]
/// #[even(name = "Bank.AccountOpened", module = "Bank", category = "accounts")]
/// #[even(implements(dyn AccountEvent))]
/// struct AccountOpened {
///     owner: String,
/// }
/// ```
#[proc_macro_derive(DomainEvent, attributes(even))]
pub fn derive_domain_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_derive_domain_event(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
