use darling::ast::{Data, Style};
use darling::{FromDeriveInput, FromField, FromMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, Generics, Ident, Path, PathArguments, Type};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: Generics,
    data: Data<(), InjectField>,
    #[darling(default)]
    manual: bool,
    #[darling(default)]
    factory: Option<Path>,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    default: Option<FieldDefault>,
}

/// `#[inject(default)]` or `#[inject(default = expr)]`.
///
/// The expression is taken as written; a string literal is parsed as an
/// expression, the way darling reads `syn::Expr`.
enum FieldDefault {
    Inherit,
    Explicit(syn::Expr),
}

impl FromMeta for FieldDefault {
    fn from_word() -> darling::Result<Self> {
        Ok(FieldDefault::Inherit)
    }

    fn from_expr(expr: &syn::Expr) -> darling::Result<Self> {
        match expr {
            syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) => lit
                .parse()
                .map(FieldDefault::Explicit)
                .map_err(|err| darling::Error::custom(err).with_span(lit)),
            other => Ok(FieldDefault::Explicit(other.clone())),
        }
    }
}

/// How a field is filled in.
enum FieldKind<'a> {
    /// `Arc<T>`: resolved under `T`.
    Service(&'a Type),
    /// `Arc<dyn Trait>`: resolved under the whole `Arc` type.
    SharedTrait,
    Value,
}

fn classify(ty: &Type) -> FieldKind<'_> {
    match arc_inner(ty) {
        Some(Type::TraitObject(_)) => FieldKind::SharedTrait,
        Some(inner) => FieldKind::Service(inner),
        None => FieldKind::Value,
    }
}

/// `T` for a type spelled `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }

    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }

    let PathArguments::AngleBracketed(generic) = &segment.arguments else {
        return None;
    };
    match (generic.args.len(), generic.args.first()?) {
        (1, GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

pub(crate) fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let input = InjectableInput::from_derive_input(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(fields) = &input.data else {
        return Err(darling::Error::unsupported_shape("enum"));
    };

    let mut parameters = Vec::new();
    let mut extractions = Vec::new();

    for field in fields.iter() {
        let Some(name) = &field.ident else {
            return Err(darling::Error::unsupported_shape("tuple struct"));
        };
        let ty = &field.ty;
        let param_name = name.to_string();

        match classify(ty) {
            FieldKind::Service(inner) => {
                if field.default.is_some() {
                    return Err(darling::Error::custom(
                        "`default` is not supported on dependency fields",
                    )
                    .with_span(name));
                }
                parameters.push(quote! { ::sanduq::Parameter::service::<#inner>(#param_name) });
                extractions.push(quote! { #name: args.service::<#inner>()? });
            }
            FieldKind::SharedTrait => {
                if field.default.is_some() {
                    return Err(darling::Error::custom(
                        "`default` is not supported on dependency fields",
                    )
                    .with_span(name));
                }
                parameters.push(quote! { ::sanduq::Parameter::service::<#ty>(#param_name) });
                extractions.push(quote! {
                    #name: ::std::sync::Arc::clone(&*args.service::<#ty>()?)
                });
            }
            FieldKind::Value => {
                let default = match &field.default {
                    None => quote! {},
                    Some(FieldDefault::Inherit) => quote! {
                        .with_default::<#ty>(::std::default::Default::default())
                    },
                    Some(FieldDefault::Explicit(expr)) => quote! { .with_default::<#ty>(#expr) },
                };
                parameters.push(quote! { ::sanduq::Parameter::value(#param_name) #default });
                extractions.push(quote! { #name: args.value::<#ty>()? });
            }
        }
    }

    let body = match fields.style {
        Style::Unit => quote! { Self },
        _ => quote! { Self { #(#extractions,)* } },
    };

    let factory_method = input.factory.as_ref().map(|path| {
        quote! {
            fn factory_method() -> ::std::option::Option<::sanduq::Callable> {
                ::std::option::Option::Some(#path())
            }
        }
    });

    // generic types cannot be named in a static registration
    let submission = (!input.manual && input.generics.params.is_empty()).then(|| {
        quote! {
            ::sanduq::__private::inventory::submit! {
                ::sanduq::ClassRegistration::new(<#ident as ::sanduq::Injectable>::describe)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::sanduq::Injectable for #ident #ty_generics #where_clause {
            fn parameters() -> ::std::vec::Vec<::sanduq::Parameter> {
                ::std::vec![#(#parameters),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn construct(mut args: ::sanduq::BoundArgs) -> ::sanduq::Result<Self> {
                ::std::result::Result::Ok(#body)
            }

            #factory_method
        }

        #submission
    })
}
