use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, FnArg, GenericArgument, ItemTrait, LitStr, Pat, PathArguments, ReturnType,
    Signature, Token, TraitItem, TraitItemFn, Type, TypeParamBound, parse_macro_input, parse_quote,
};

struct FactoryMethod {
    sig: Signature,
    name: String,
    params: Vec<(Ident, Type)>,
    service: Option<Type>,
}

pub(crate) fn expand_factory(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as ItemTrait);

    let result = if attr.is_empty() {
        expand(&mut input)
    } else {
        Err(syn::Error::new(
            Span::call_site(),
            "`#[factory]` on a trait takes no arguments",
        ))
    };

    match result {
        Ok(expanded) => expanded.into(),
        Err(error) => {
            let compile_err = error.to_compile_error();
            quote! {
                #compile_err
                #input
            }
            .into()
        }
    }
}

fn expand(input: &mut ItemTrait) -> syn::Result<TokenStream2> {
    // Strip method attributes first so the trait re-emits cleanly on error.
    let mut renames = Vec::new();
    for item in input.items.iter_mut() {
        if let TraitItem::Fn(method) = item {
            renames.push(take_rename(&mut method.attrs));
        }
    }

    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "factory interfaces cannot be generic",
        ));
    }

    let mut methods = Vec::new();
    let mut renames = renames.into_iter();
    for item in &input.items {
        match item {
            TraitItem::Fn(method) => {
                let rename = renames.next().transpose()?.flatten();
                methods.push(FactoryMethod::parse(method, rename)?);
            }
            // `dyn Trait` does not exist for these, so nothing could request it.
            TraitItem::Const(_) | TraitItem::Type(_) => {
                return Err(syn::Error::new_spanned(
                    item,
                    "factory interfaces are used as `dyn Trait`, which rules out \
                     associated consts and types",
                ));
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "factory interfaces may only declare methods",
                ));
            }
        }
    }

    add_thread_safety_bounds(input);

    let krate = quote!(::rust_di_factory);
    let trait_ident = &input.ident;

    let method_descriptors = methods.iter().map(|method| {
        let name = &method.name;
        let returns = method
            .service
            .as_ref()
            .map(|service| quote!(.returns::<#service>()));
        let params = method.params.iter().map(|(ident, ty)| {
            let param_name = ident.unraw().to_string();
            quote!(.param::<#ty>(#param_name))
        });
        quote! {
            .method(#krate::any_factory::MethodDescriptor::new(#name) #returns #(#params)*)
        }
    });

    let implementable = methods.iter().all(|method| method.service.is_some());
    let activator = implementable.then(|| {
        quote! {
            .activator(|proxy| {
                let service: ::std::sync::Arc<dyn #trait_ident> = ::std::sync::Arc::new(proxy);
                #krate::core::contracts::into_instance(service)
            })
        }
    });
    let proxy_impl = implementable.then(|| {
        let bodies = methods.iter().enumerate().map(|(index, method)| {
            let sig = &method.sig;
            let service = &method.service;
            let values = method
                .params
                .iter()
                .map(|(ident, _)| quote!(#krate::any_factory::ArgumentValue::new(#ident)));
            quote! {
                #sig {
                    self.invoke::<#service>(#index, ::std::vec![#(#values),*])
                        .map_err(::core::convert::Into::into)
                }
            }
        });
        quote! {
            impl #trait_ident for #krate::any_factory::FactoryProxy {
                #(#bodies)*
            }
        }
    });

    Ok(quote! {
        #input

        impl #krate::any_factory::FactoryInterface for dyn #trait_ident {
            fn describe() -> #krate::any_factory::InterfaceDescriptor {
                #krate::any_factory::InterfaceDescriptor::interface::<dyn #trait_ident>()
                    #(#method_descriptors)*
                    #activator
            }
        }

        #proxy_impl

        #krate::inventory::submit! {
            #krate::core::di_inventory::InterfaceRegistration::new(
                <dyn #trait_ident as #krate::any_factory::FactoryInterface>::describe
            )
        }
    })
}

impl FactoryMethod {
    fn parse(method: &TraitItemFn, rename: Option<String>) -> syn::Result<Self> {
        let sig = &method.sig;
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "factory methods cannot be generic",
            ));
        }
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "factory methods are synchronous",
            ));
        }
        match sig.receiver() {
            Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    sig,
                    "factory methods must take `&self`",
                ));
            }
        }

        let mut params = Vec::new();
        for input in sig.inputs.iter() {
            let FnArg::Typed(pat_type) = input else {
                continue;
            };
            let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
                return Err(syn::Error::new_spanned(
                    &pat_type.pat,
                    "factory arguments must be plain identifiers",
                ));
            };
            if matches!(
                pat_type.ty.as_ref(),
                Type::Reference(_) | Type::ImplTrait(_) | Type::Infer(_)
            ) {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "factory arguments must be owned `'static` values",
                ));
            }
            params.push((pat_ident.ident.clone(), pat_type.ty.as_ref().clone()));
        }

        Ok(FactoryMethod {
            sig: sig.clone(),
            name: rename.unwrap_or_else(|| convention_name(&sig.ident.unraw().to_string())),
            params,
            service: service_type(&sig.output)?,
        })
    }
}

fn take_rename(attrs: &mut Vec<Attribute>) -> syn::Result<Option<String>> {
    let mut result = Ok(None);
    attrs.retain(|attr| {
        if !attr.path().is_ident("factory") {
            return true;
        }
        result = parse_rename(attr).map(Some);
        false
    });
    result
}

fn parse_rename(attr: &Attribute) -> syn::Result<String> {
    let mut rename = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") {
            let value: LitStr = meta.value()?.parse()?;
            rename = Some(value.value());
            Ok(())
        } else {
            Err(meta.error("expected `rename = \"...\"`"))
        }
    })?;
    rename.ok_or_else(|| syn::Error::new_spanned(attr, "expected `rename = \"...\"`"))
}

fn add_thread_safety_bounds(input: &mut ItemTrait) {
    for bound in ["Send", "Sync"] {
        let present = input.supertraits.iter().any(|supertrait| {
            matches!(
                supertrait,
                TypeParamBound::Trait(t) if t.path.segments.last().is_some_and(|s| s.ident == bound)
            )
        });
        if !present {
            let ident = Ident::new(bound, Span::call_site());
            input.supertraits.push(parse_quote!(::core::marker::#ident));
        }
    }
    if input.colon_token.is_none() {
        input.colon_token = Some(<Token![:]>::default());
    }
}

/// `create_one` -> `CreateOne`; already PascalCase names pass through.
pub(crate) fn convention_name(ident: &str) -> String {
    ident
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// The `T` in `Result<Arc<T>, E>`; `None` for methods returning nothing.
fn service_type(output: &ReturnType) -> syn::Result<Option<Type>> {
    let ReturnType::Type(_, ty) = output else {
        return Ok(None);
    };
    if is_unit(ty) {
        return Ok(None);
    }
    let unsupported = || {
        syn::Error::new_spanned(
            ty,
            "factory methods must return `Result<Arc<T>, E>` where `E: From<DiError>`",
        )
    };
    let ok = single_generic(ty, "Result").ok_or_else(unsupported)?;
    if is_unit(ok) {
        return Ok(None);
    }
    single_generic(ok, "Arc")
        .cloned()
        .map(Some)
        .ok_or_else(unsupported)
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}
