//! Implementation of the `#[derive(Class)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Type, parse_macro_input};

use crate::attrs::{ClassAttrs, ExportAttrs};

pub fn derive_class_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_class_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_class_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Class)] does not support generic types",
        ));
    }

    let name = &input.ident;
    let attrs = ClassAttrs::from_attrs(&input.attrs)?;
    let class_name = attrs.name.clone().unwrap_or_else(|| name.to_string());
    let base = match &attrs.base {
        Some(base) => quote! { #base },
        None => quote! { ::varbridge::Object },
    };

    let exports = collect_exports(input)?;

    Ok(quote! {
        impl ::varbridge::Any for #name {
            fn type_hash() -> ::varbridge::TypeHash {
                <Self as ::varbridge::Class>::class_info().id()
            }

            fn type_name() -> &'static str {
                #class_name
            }
        }

        impl ::varbridge::Class for #name {
            fn class_info() -> &'static ::varbridge::ClassInfo {
                static INFO: ::std::sync::LazyLock<::varbridge::ClassInfo> =
                    ::std::sync::LazyLock::new(|| {
                        ::varbridge::ClassInfo::derived::<#name, #base>(#class_name)
                    });
                &INFO
            }
        }

        impl ::varbridge::ExportedClass for #name {
            fn register_exports(
                registrar: &mut dyn ::varbridge::ClassRegistrar,
            ) -> ::std::result::Result<(), ::varbridge::RegistrationError> {
                registrar.register_class(<Self as ::varbridge::Class>::class_info())?;
                #(#exports)*
                Ok(())
            }
        }
    })
}

/// Emit one `register_array_property` call per `#[export]` field.
fn collect_exports(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Class)] requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Class)] can only be used on structs",
            ));
        }
    };

    let mut exports = Vec::new();
    for field in fields {
        let export = ExportAttrs::from_attrs(&field.attrs)?;
        if !export.export {
            continue;
        }

        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_ty = &field.ty;
        if !is_typed_array(field_ty) {
            return Err(syn::Error::new_spanned(
                field_ty,
                "#[export] fields must be TypedArray<T>",
            ));
        }
        let prop_name = export.name.unwrap_or_else(|| field_name.to_string());

        exports.push(quote! {
            {
                fn get(this: &#name) -> &#field_ty {
                    &this.#field_name
                }
                fn get_mut(this: &mut #name) -> &mut #field_ty {
                    &mut this.#field_name
                }
                ::varbridge::register_array_property::<#name, _>(registrar, #prop_name, get, get_mut)?;
            }
        });
    }

    Ok(exports)
}

fn is_typed_array(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "TypedArray"),
        _ => false,
    }
}
