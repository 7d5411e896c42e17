// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for Carefree.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments,
    Type,
};

/// A derive macro that implements the `carefree_core::archetype::Archetype` trait.
///
/// Every named field must be an `Option<T>` where `T: PropertyType`; `None`
/// means "unset". Supported field attributes:
///
/// * `#[archetype(rename = "name")]` binds the property under an explicit name
///   instead of the camelCase form of the field identifier.
/// * `#[archetype(skip)]` leaves the field out of the property list.
/// * `#[archetype(write_only)]` exposes a mutator but no accessor.
/// * `#[archetype(flatten)]` embeds the properties of another archetype
///   stored by value in that field.
#[proc_macro_derive(Archetype, attributes(archetype))]
pub fn derive_archetype(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_archetype(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_archetype(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Archetype can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Archetype can only be derived for structs",
            ))
        }
    };

    let mut pushes = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        pushes.push(expand_field(field, &attrs)?);
    }

    // The `where` clause carries over so the generated impl sees the same
    // bounds as the struct itself.
    Ok(quote! {
        impl #impl_generics ::carefree_core::archetype::Archetype for #name #ty_generics #where_clause {
            fn properties() -> ::std::vec::Vec<::carefree_core::archetype::PropertyDescriptor<Self>> {
                let mut properties = ::std::vec::Vec::new();
                #(#pushes)*
                properties
            }
        }
    })
}

fn expand_field(field: &Field, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let ty = &field.ty;

    if attrs.flatten {
        return Ok(quote! {
            properties.extend(
                <#ty as ::carefree_core::archetype::Archetype>::properties()
                    .into_iter()
                    .map(|property| {
                        property.lift(
                            |target: &Self| &target.#ident,
                            |target: &mut Self| &mut target.#ident,
                        )
                    }),
            );
        });
    }

    let inner = option_inner(ty).ok_or_else(|| {
        syn::Error::new_spanned(
            ty,
            "archetype properties must be `Option<_>`; use #[archetype(skip)] or #[archetype(flatten)] otherwise",
        )
    })?;

    let field_name = ident.to_string();
    let field_name = field_name.strip_prefix("r#").unwrap_or(&field_name);
    let rename = match &attrs.rename {
        Some(lit) => quote! { ::std::option::Option::Some(#lit) },
        None => quote! { ::std::option::Option::None },
    };
    let write_only = if attrs.write_only {
        quote! { .write_only() }
    } else {
        quote! {}
    };

    Ok(quote! {
        properties.push(
            ::carefree_core::archetype::PropertyDescriptor::new::<#inner>(
                #field_name,
                #rename,
                |target: &Self| {
                    target
                        .#ident
                        .clone()
                        .map(::carefree_core::archetype::PropertyType::into_property)
                },
                |target: &mut Self, value| {
                    target.#ident = ::std::option::Option::Some(
                        <#inner as ::carefree_core::archetype::PropertyType>::from_property(value)?,
                    );
                    ::std::result::Result::Ok(())
                },
            )
            #write_only
        );
    })
}

/// Attributes accepted inside `#[archetype(...)]` on a field.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<LitStr>,
    skip: bool,
    write_only: bool,
    flatten: bool,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("archetype") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    attrs.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("write_only") {
                    attrs.write_only = true;
                    Ok(())
                } else if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported archetype attribute"))
                }
            })?;
        }
        if attrs.flatten && (attrs.rename.is_some() || attrs.write_only) {
            return Err(syn::Error::new_spanned(
                field,
                "#[archetype(flatten)] cannot be combined with rename or write_only",
            ));
        }
        Ok(attrs)
    }
}

/// Returns `T` for a field typed `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
