//! `#[derive(Params)]` implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Fields, parse2};

/// Struct-level options parsed from `#[params(...)]` attributes.
#[derive(Debug, Clone, Default)]
struct ParamsStructOptions {
    /// Rename all fields using the given case convention.
    rename_all: Option<RenameRule>,
}

/// Case conversion rules for `rename_all`.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum RenameRule {
    /// `lowercase`
    LowerCase,
    /// `UPPERCASE`
    UpperCase,
    /// `camelCase`
    CamelCase,
    /// `PascalCase`
    PascalCase,
    /// `snake_case`
    SnakeCase,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnakeCase,
    /// `kebab-case`
    KebabCase,
    /// `SCREAMING-KEBAB-CASE`
    ScreamingKebabCase,
}

impl RenameRule {
    /// Parse a rename rule from a string.
    fn parse(s: &str) -> Option<Self> {
        match s {
            "lowercase" => Some(Self::LowerCase),
            "UPPERCASE" => Some(Self::UpperCase),
            "camelCase" => Some(Self::CamelCase),
            "PascalCase" => Some(Self::PascalCase),
            "snake_case" => Some(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            "SCREAMING-KEBAB-CASE" => Some(Self::ScreamingKebabCase),
            _ => None,
        }
    }

    /// Apply the rename rule to a field name.
    fn apply(self, name: &str) -> String {
        match self {
            Self::LowerCase => name.to_lowercase(),
            Self::UpperCase => name.to_uppercase(),
            Self::CamelCase => to_camel_case(name),
            Self::PascalCase => to_pascal_case(name),
            Self::SnakeCase => to_snake_case(name),
            Self::ScreamingSnakeCase => to_snake_case(name).to_uppercase(),
            Self::KebabCase => to_snake_case(name).replace('_', "-"),
            Self::ScreamingKebabCase => to_snake_case(name).to_uppercase().replace('_', "-"),
        }
    }
}

/// Convert a string to `snake_case`.
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_lowercase().next().unwrap_or(c));
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a string to `camelCase`.
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_uppercase().next().unwrap_or(c));
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a string to `PascalCase`.
fn to_pascal_case(s: &str) -> String {
    let camel = to_camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Field options parsed from `#[params(...)]` attributes.
#[derive(Debug, Clone, Default)]
struct ParamsFieldOptions {
    /// Leave the field out of the mapping.
    skip: bool,
    /// Key to use instead of the field name.
    rename: Option<String>,
}

/// Expand the `#[derive(Params)]` macro.
pub fn expand_params_derive(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let struct_options = parse_struct_options(&input.attrs)?;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Params derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Params derive only supports structs",
            ));
        }
    };

    let mut inserts = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        // explicit rename > rename_all > field name
        let raw_name = unraw(field_name);
        let key = match (&options.rename, struct_options.rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(&raw_name),
            (None, None) => raw_name,
        };

        inserts.push(quote! {
            params.insert(#key, ::fetchkit::ToParamValue::to_param_value(&self.#field_name));
        });
    }

    Ok(quote! {
        impl #impl_generics ::fetchkit::ToParams for #name #ty_generics #where_clause {
            fn to_params(&self) -> ::fetchkit::ParamObject {
                let mut params = ::fetchkit::ParamObject::new();
                #(#inserts)*
                params
            }
        }
    })
}

/// Field name without a `r#` prefix.
fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Parse struct-level options from `#[params(...)]` attributes.
fn parse_struct_options(attrs: &[syn::Attribute]) -> syn::Result<ParamsStructOptions> {
    let mut options = ParamsStructOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("params") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: syn::LitStr = meta.value()?.parse()?;
                let rule = RenameRule::parse(&value.value()).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &value,
                        format!(
                            "unknown rename_all value: \"{}\". Expected one of: \
                             lowercase, UPPERCASE, camelCase, PascalCase, \
                             snake_case, SCREAMING_SNAKE_CASE, kebab-case, SCREAMING-KEBAB-CASE",
                            value.value()
                        ),
                    )
                })?;
                options.rename_all = Some(rule);
                Ok(())
            } else {
                Err(meta.error("unsupported params attribute, expected `rename_all`"))
            }
        })?;
    }

    Ok(options)
}

/// Parse field options from `#[params(...)]` attributes.
fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<ParamsFieldOptions> {
    let mut options = ParamsFieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("params") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported params attribute, expected `skip` or `rename`"))
            }
        })?;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use quote::quote;

    use super::*;

    #[test]
    fn rename_rules() {
        check!(RenameRule::CamelCase.apply("search_text") == "searchText");
        check!(RenameRule::PascalCase.apply("search_text") == "SearchText");
        check!(RenameRule::KebabCase.apply("search_text") == "search-text");
        check!(RenameRule::ScreamingSnakeCase.apply("page") == "PAGE");
        check!(RenameRule::parse("Title Case").is_none());
    }

    #[test]
    fn expands_named_struct() {
        let input = quote! {
            #[params(rename_all = "camelCase")]
            struct Search {
                search_text: String,
                #[params(rename = "p")]
                page: Option<u32>,
                #[params(skip)]
                cache: bool,
                r#type: String,
            }
        };

        let tokens = expand_params_derive(input).expect("expand");
        let _: syn::ItemImpl = syn::parse2(tokens.clone()).expect("valid impl");
        let code: String = tokens.to_string().split_whitespace().collect();

        check!(code.starts_with("impl::fetchkit::ToParamsforSearch"));
        check!(code.contains(r#"params.insert("searchText",::fetchkit::ToParamValue::to_param_value(&self.search_text));"#));
        check!(code.contains(r#"params.insert("p",::fetchkit::ToParamValue::to_param_value(&self.page));"#));
        check!(code.contains(r#"params.insert("type",::fetchkit::ToParamValue::to_param_value(&self.r#type));"#));
        check!(!code.contains("cache"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let_assert!(Err(err) = expand_params_derive(quote! { struct Pair(u32, u32); }));
        check!(err.to_string().contains("named fields"));
    }

    #[test]
    fn rejects_unknown_attribute() {
        let input = quote! {
            struct Search {
                #[params(flatten)]
                inner: Inner,
            }
        };
        let_assert!(Err(err) = expand_params_derive(input));
        check!(err.to_string().contains("unsupported params attribute"));
    }
}
