use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, ItemImpl, Lit, Meta, Path, Token, Type, parse_macro_input};

pub(crate) enum DiKind {
    Singleton,
    Transient,
}

pub(crate) struct DiRegistration {
    pub kind: DiKind,
    pub use_factory: bool,
    pub factory_path: Option<Path>,
    pub name: Option<String>,
}

pub(crate) fn generate_di_macro(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);

    let registrations = match parse_registry_args(attr.into()) {
        Ok(registrations) => registrations,
        Err(error) => {
            let compile_err = error.to_compile_error();
            return quote! {
                #compile_err
                #input
            }
            .into();
        }
    };

    let self_ty = &input.self_ty;
    let submissions = registrations
        .iter()
        .map(|reg| registration_tokens(self_ty, reg));

    let expanded = quote! {
        #input
        #(#submissions)*
    };

    TokenStream::from(expanded)
}

fn registration_tokens(self_ty: &Type, reg: &DiRegistration) -> TokenStream2 {
    let name_literal = syn::LitStr::new(
        reg.name.as_deref().unwrap_or(""),
        proc_macro2::Span::call_site(),
    );

    let factory = if reg.use_factory {
        if let Some(factory_path) = &reg.factory_path {
            quote! {
                |activation| #factory_path::create(activation).map(::std::sync::Arc::new)
            }
        } else {
            quote! {
                |activation| <#self_ty as ::rust_di_factory::core::factory::DiFactory>::create(activation)
                    .map(::std::sync::Arc::new)
            }
        }
    } else {
        quote! {
            |_activation| ::core::result::Result::Ok(
                ::std::sync::Arc::new(<#self_ty as ::std::default::Default>::default())
            )
        }
    };

    let registration = match reg.kind {
        DiKind::Singleton => quote! {
            kernel.bind_singleton_name::<#self_ty, _>(#name_literal, #factory)
        },
        DiKind::Transient => quote! {
            kernel.bind_transient_name::<#self_ty, _>(#name_literal, #factory)
        },
    };

    quote! {
        ::rust_di_factory::inventory::submit! {
            ::rust_di_factory::core::di_inventory::DiConstructor {
                register: |kernel| #registration
            }
        }
    }
}

fn parse_kind(path: &Path) -> syn::Result<DiKind> {
    match path.get_ident() {
        Some(ident) if ident == "Singleton" => Ok(DiKind::Singleton),
        Some(ident) if ident == "Transient" => Ok(DiKind::Transient),
        _ => Err(syn::Error::new_spanned(
            path,
            "expected `Singleton` or `Transient`",
        )),
    }
}

fn parse_registry_args(attr: TokenStream2) -> syn::Result<Vec<DiRegistration>> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(attr)?;

    let mut registrations = Vec::new();

    for meta in metas {
        match meta {
            Meta::Path(path) => {
                registrations.push(DiRegistration {
                    kind: parse_kind(&path)?,
                    use_factory: false,
                    factory_path: None,
                    name: None,
                });
            }
            Meta::List(list) => {
                let kind = parse_kind(&list.path)?;

                let mut use_factory = false;
                let mut factory_path = None;
                let mut name = None;

                let nested =
                    Punctuated::<Meta, Token![,]>::parse_terminated.parse2(list.tokens.clone())?;

                for meta in nested {
                    match meta {
                        Meta::Path(p) if p.is_ident("factory") => {
                            use_factory = true;
                            factory_path = None;
                        }
                        Meta::NameValue(nv) if nv.path.is_ident("factory") => {
                            use_factory = true;

                            let Expr::Path(expr_path) = nv.value else {
                                return Err(syn::Error::new_spanned(
                                    nv.value,
                                    "expected a path for `factory = ...`, like `factory = MyFactory`",
                                ));
                            };
                            factory_path = Some(expr_path.path);
                        }
                        Meta::NameValue(nv) if nv.path.is_ident("name") => match nv.value {
                            Expr::Lit(syn::ExprLit {
                                lit: Lit::Str(lit_str),
                                ..
                            }) => name = Some(lit_str.value()),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "expected a string literal for `name = ...`",
                                ));
                            }
                        },
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "expected `factory`, `factory = Path` or `name = \"...\"`",
                            ));
                        }
                    }
                }

                registrations.push(DiRegistration {
                    kind,
                    use_factory,
                    factory_path,
                    name,
                });
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "expected `Singleton(...)` or `Transient(...)`",
                ));
            }
        }
    }

    Ok(registrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry_args() {
        let registrations = parse_registry_args(quote! {
            Singleton,
            Transient(factory, name = "custom"),
            Singleton(factory = MyFactory)
        })
        .unwrap();

        assert_eq!(registrations.len(), 3);
        assert!(matches!(registrations[0].kind, DiKind::Singleton));
        assert!(!registrations[0].use_factory);

        assert!(matches!(registrations[1].kind, DiKind::Transient));
        assert!(registrations[1].use_factory);
        assert!(registrations[1].factory_path.is_none());
        assert_eq!(registrations[1].name.as_deref(), Some("custom"));

        assert!(registrations[2].factory_path.is_some());
    }

    #[test]
    fn test_unknown_lifetime_is_an_error() {
        assert!(parse_registry_args(quote!(Scoped)).is_err());
        assert!(parse_registry_args(quote!(Singleton(name = 5))).is_err());
    }
}
