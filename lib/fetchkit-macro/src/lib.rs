//! Procedural macros for fetchkit.
//!
//! - `#[derive(Params)]` - build a query parameter mapping from a struct
//!
//! Use the re-export from the `fetchkit` crate; the generated code refers to
//! `::fetchkit` paths.

mod params_derive;

use proc_macro::TokenStream;

/// Derive `ToParams` for a struct with named fields.
///
/// Each field becomes one entry of the `ParamObject`, converted with
/// `ToParamValue`: `Option::None` becomes undefined (and is never encoded),
/// `Vec<T>` becomes a repeated key.
///
/// # Struct Attributes
///
/// - `#[params(rename_all = "...")]` - rename every field. Supported case
///   conventions: `lowercase`, `UPPERCASE`, `camelCase`, `PascalCase`,
///   `snake_case`, `SCREAMING_SNAKE_CASE`, `kebab-case`, `SCREAMING-KEBAB-CASE`
///
/// # Field Attributes
///
/// - `#[params(rename = "name")]` - use a different key (overrides `rename_all`)
/// - `#[params(skip)]` - leave the field out
///
/// # Example
///
/// ```ignore
/// use fetchkit::Params;
///
/// #[derive(Params)]
/// #[params(rename_all = "camelCase")]
/// struct Search {
///     search_text: String,       // "searchText"
///     page: Option<u32>,         // dropped when None
///     #[params(rename = "tag")]
///     tags: Vec<String>,         // tag=a&tag=b
///     #[params(skip)]
///     cache_key: String,
/// }
/// ```
#[proc_macro_derive(Params, attributes(params))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    params_derive::expand_params_derive(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
