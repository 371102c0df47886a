//! Attribute parsing for `#[derive(Class)]`.

use syn::{Attribute, LitStr, Meta, Path};

/// Parsed `#[class(...)]` attributes on the struct.
#[derive(Debug, Default)]
pub struct ClassAttrs {
    /// Engine-visible class name (default: the struct name)
    pub name: Option<String>,
    /// Base class type (default: `Object`)
    pub base: Option<Path>,
}

/// Parsed `#[export]` / `#[export(...)]` attribute on a field.
#[derive(Debug, Default)]
pub struct ExportAttrs {
    /// The field is exported
    pub export: bool,
    /// Override property name
    pub name: Option<String>,
}

impl ClassAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("class") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("base") {
                    result.base = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(format!(
                        "unknown class attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl ExportAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("export") {
                continue;
            }
            result.export = true;

            // Bare `#[export]` carries no arguments.
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown export attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}
