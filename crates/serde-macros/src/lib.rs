// Copyright (C) 2022-present The NetGauze Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use quote::{format_ident, quote, TokenStreamExt};
use syn::{parse::Parse, spanned::Spanned, Expr, Lit};

/// A variant of the error enum whose (single) field carries a marker
/// attribute such as `#[from_nom]` or `#[from_located]`.
struct MarkedVariant<'a> {
    variant: syn::Ident,
    path: &'a syn::Path,
    attr: &'a syn::Attribute,
}

fn marked_variants<'a>(
    enum_data: &'a syn::DataEnum,
    marker: &str,
) -> syn::Result<Vec<MarkedVariant<'a>>> {
    let mut ret = vec![];
    for variant in &enum_data.variants {
        for field in &variant.fields {
            for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(marker)) {
                let syn::Type::Path(type_path) = &field.ty else {
                    return Err(syn::Error::new(
                        field.ty.span(),
                        format!("#[{marker}] works only on named types"),
                    ));
                };
                ret.push(MarkedVariant {
                    variant: variant.ident.clone(),
                    path: &type_path.path,
                    attr,
                });
            }
        }
    }
    Ok(ret)
}

/// Reads the optional `module = "a::b"` argument of `#[from_located]`.
fn module_argument(attr: &syn::Attribute) -> syn::Result<Option<Vec<syn::Ident>>> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(None);
    }
    let expr = attr.parse_args_with(Expr::parse)?;
    let Expr::Assign(assign) = expr else {
        return Err(syn::Error::new(
            attr.span(),
            "expected `module = \"path::to::module\"`",
        ));
    };
    let (Expr::Path(left), Expr::Lit(right)) = (assign.left.as_ref(), assign.right.as_ref()) else {
        return Err(syn::Error::new(
            attr.span(),
            "expected `module = \"path::to::module\"`",
        ));
    };
    match (left.path.get_ident(), &right.lit) {
        (Some(ident), Lit::Str(value)) if ident == "module" => {
            let value = value.value();
            if value.is_empty() {
                return Ok(Some(vec![]));
            }
            Ok(Some(
                value
                    .split("::")
                    .map(|part| format_ident!("{}", part))
                    .collect(),
            ))
        }
        (Some(ident), _) => Err(syn::Error::new(
            attr.span(),
            format!("Only accepts one attribute 'module', found {ident}"),
        )),
        (None, _) => Err(syn::Error::new(attr.span(), "'module' must be an identifier")),
    }
}

/// The path of the `Located*` companion of a nested error type: the module
/// prefix (if any) followed by the type's own path with `Located` prepended to
/// its last segment.
fn located_path(marked: &MarkedVariant<'_>) -> syn::Result<proc_macro2::TokenStream> {
    let mut segments = module_argument(marked.attr)?.unwrap_or_default();
    let type_segments = marked
        .path
        .segments
        .iter()
        .map(|seg| seg.ident.clone())
        .collect::<Vec<_>>();
    let Some((last, prefix)) = type_segments.split_last() else {
        return Err(syn::Error::new(marked.path.span(), "empty type path"));
    };
    segments.extend(prefix.iter().cloned());
    segments.push(format_ident!("Located{}", last));
    Ok(quote! { #(#segments)::* })
}

struct LocatedError;

impl LocatedError {
    fn from(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
        let syn::Data::Enum(en) = &input.data else {
            return Err(syn::Error::new(
                input.span(),
                "Works only with enum error types",
            ));
        };
        let ident = &input.ident;
        let located_struct_name = format_ident!("Located{}", ident);

        let from_nom = marked_variants(en, "from_nom")?;
        if let Some(extra) = from_nom.get(1) {
            return Err(syn::Error::new(
                extra.attr.span(),
                "#[from_nom] can be used only once per error enum",
            ));
        }
        let from_nom_variants = from_nom.iter().map(|x| &x.variant);

        let mut output = quote! {
            #[derive(PartialEq, Eq, Clone, Debug)]
            #[automatically_derived]
            pub struct #located_struct_name<'a> {
                span: telemetryd_parse_utils::Span<'a>,
                error: #ident,
            }

            #[automatically_derived]
            impl<'a> #located_struct_name<'a> {
                pub const fn new(span: telemetryd_parse_utils::Span<'a>, error: #ident) -> Self {
                    Self { span, error }
                }

                /// Offset of the error from the first byte of the datagram
                pub const fn location_offset(&self) -> usize {
                    self.span.location_offset()
                }
            }

            #[automatically_derived]
            impl<'a> From<#located_struct_name<'a>> for (telemetryd_parse_utils::Span<'a>, #ident) {
                fn from(input: #located_struct_name<'a>) -> Self {
                    (input.span, input.error)
                }
            }

            #[automatically_derived]
            impl<'a> telemetryd_parse_utils::LocatedParsingError for #located_struct_name<'a> {
                type Span = telemetryd_parse_utils::Span<'a>;
                type Error = #ident;

                fn span(&self) -> &Self::Span {
                    &self.span
                }

                fn error(&self) -> &Self::Error {
                    &self.error
                }
            }

            #[automatically_derived]
            impl<'a> nom::error::FromExternalError<telemetryd_parse_utils::Span<'a>, #ident> for #located_struct_name<'a> {
                fn from_external_error(input: telemetryd_parse_utils::Span<'a>, _kind: nom::error::ErrorKind, error: #ident) -> Self {
                    #located_struct_name::new(input, error)
                }
            }

            #(
                #[automatically_derived]
                impl<'a> nom::error::ParseError<telemetryd_parse_utils::Span<'a>> for #located_struct_name<'a> {
                    fn from_error_kind(input: telemetryd_parse_utils::Span<'a>, kind: nom::error::ErrorKind) -> Self {
                        #located_struct_name::new(input, #ident::#from_nom_variants(kind))
                    }

                    fn append(_input: telemetryd_parse_utils::Span<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
                        other
                    }
                }
            )*
        };

        for marked in marked_variants(en, "from_external")? {
            let external = marked.path;
            let variant = &marked.variant;
            output.append_all(quote! {
                #[automatically_derived]
                impl<'a> nom::error::FromExternalError<telemetryd_parse_utils::Span<'a>, #external> for #located_struct_name<'a> {
                    fn from_external_error(input: telemetryd_parse_utils::Span<'a>, _kind: nom::error::ErrorKind, error: #external) -> Self {
                        #located_struct_name::new(input, #ident::#variant(error))
                    }
                }
            });
        }

        for marked in marked_variants(en, "from_located")? {
            let located = located_path(&marked)?;
            let variant = &marked.variant;
            output.append_all(quote! {
                #[automatically_derived]
                impl<'a> From<#located<'a>> for #located_struct_name<'a> {
                    fn from(input: #located<'a>) -> Self {
                        let (span, error) = input.into();
                        #located_struct_name::new(span, #ident::#variant(error))
                    }
                }
            });
        }
        Ok(output)
    }
}

/// For a given error enum `{Name}` generate a struct called `Located{Name}`
/// that carries the `Span` (the error location in the received datagram) along
/// with the error. Additionally, generates the `nom` error traits and [`From`]
/// conversions from nested located errors.
///
/// * `#[from_nom]`: the variant wrapping [`nom::error::ErrorKind`], at most one.
/// * `#[from_external]`: the variant used by `nom::combinator::map_res`.
/// * `#[from_located]`: the variant wrapping another error that derives
///   `LocatedError`. The `Located*` type is looked up next to the wrapped type,
///   or under `#[from_located(module = "path")]` when given.
///
/// Example:
/// ```no_compile
/// use telemetryd_serde_macros::LocatedError;
///
/// #[derive(LocatedError, PartialEq, Eq, Clone, Debug)]
/// pub enum SetParsingError {
///     NomError(#[from_nom] nom::error::ErrorKind),
///     TemplateRecordError(#[from_located] TemplateRecordParsingError),
///     FieldError(#[from_located(module = "crate::wire::deserializer")] FieldSpecifierParsingError),
///     InvalidSetId(#[from_external] InvalidSetId),
/// }
/// ```
#[proc_macro_derive(LocatedError, attributes(from_nom, from_external, from_located))]
pub fn located_error(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);
    LocatedError::from(&ast)
        .map(proc_macro::TokenStream::from)
        .unwrap_or_else(|err| proc_macro::TokenStream::from(err.to_compile_error()))
}

struct WritingError;

impl WritingError {
    fn from(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
        let syn::Data::Enum(en) = &input.data else {
            return Err(syn::Error::new(
                input.span(),
                "Works only with enum error types",
            ));
        };
        let ident = &input.ident;
        let from_std_io_error = marked_variants(en, "from_std_io_error")?;
        let io_variants = from_std_io_error.iter().map(|x| &x.variant);

        let mut output = quote! {
            #(
                #[automatically_derived]
                impl From<std::io::Error> for #ident {
                    fn from(err: std::io::Error) -> Self {
                        #ident::#io_variants(err.to_string())
                    }
                }
            )*
        };
        for marked in marked_variants(en, "from")? {
            let from = marked.path;
            let variant = &marked.variant;
            output.append_all(quote! {
                #[automatically_derived]
                impl From<#from> for #ident {
                    fn from(err: #from) -> Self {
                        #ident::#variant(err)
                    }
                }
            });
        }
        Ok(output)
    }
}

/// Decorate an `enum` as an error for serializing binary protocol
/// provides the following decorations for any members of the enum.
///
/// 1. `#[from_std_io_error]` automatically generate [`From`] implementation
///    from [`std::io::Error`] to a [`String`].
///
/// 2. `#[from]`, automatically generates a [`From`] implementation for a given
///    type.
///
/// Example:
/// ```no_compile
/// use telemetryd_serde_macros::WritingError;
///
/// #[derive(WritingError, PartialEq, Eq, Clone, Debug)]
/// pub enum FieldSpecifierWritingError {
///     StdIOError(#[from_std_io_error] String),
/// }
///
/// #[derive(WritingError, PartialEq, Eq, Clone, Debug)]
/// pub enum TemplateRecordWritingError {
///     StdIOError(#[from_std_io_error] String),
///     FieldSpecifierError(#[from] FieldSpecifierWritingError),
/// }
/// ```
#[proc_macro_derive(WritingError, attributes(from_std_io_error, from))]
pub fn writing_error(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);
    WritingError::from(&ast)
        .map(proc_macro::TokenStream::from)
        .unwrap_or_else(|err| proc_macro::TokenStream::from(err.to_compile_error()))
}
