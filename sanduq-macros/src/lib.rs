//! Procedural macros for Sanduq.
//!
//! * `#[derive(Injectable)]` - generates the constructor descriptor of a
//!   struct and submits it for discovery

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Injectable derive implementation.
mod injectable;

/// Derives `sanduq::Injectable` for a struct.
///
/// Every field becomes a constructor parameter named after the field:
/// * `Arc<T>` - a dependency resolved under `T`'s identifier
/// * `Arc<dyn Trait>` - a dependency resolved under the identifier of
///   `Arc<dyn Trait>` itself, so bind a factory returning it
/// * anything else - a plain value taken from the caller's arguments
///
/// Attributes:
/// * `#[inject(default)]` - fall back to `Default::default()`
/// * `#[inject(default = expr)]` - fall back to `expr`
/// * `#[injectable(factory = "path")]` - build through `path()`, a
///   `fn() -> sanduq::Callable`, instead of the field constructor
/// * `#[injectable(manual)]` - do not submit the type for discovery
///
/// ```ignore
/// #[derive(Injectable)]
/// struct Mailer {
///     transport: Arc<Transport>,
///     #[inject(default = String::from("noreply@example.org"))]
///     sender: String,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::expand(&input)
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}
