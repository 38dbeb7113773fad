use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

struct VariantInfo<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_entry: bool,
    cfg_attrs: Vec<Attribute>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext_trait = format_ident!("{}Ext", name);

    let Data::Enum(data) = &input.data else {
        return quote! { compile_error!("trellis_error can only be applied to enums"); };
    };

    let variants = match data.variants.iter().map(inspect_variant).collect::<Result<Vec<_>, _>>()
    {
        Ok(v) => v,
        Err(err) => return err.to_compile_error(),
    };

    let derives = missing_derives(&input);
    let accessors = generate_accessors(name, &variants);
    let ext_impl = generate_ext_trait(name, &ext_trait, &variants);
    let from_impls = variants.iter().filter_map(|v| generate_source_impls(name, &ext_trait, v));

    quote! {
        #derives
        #input

        #accessors
        #ext_impl
        #(#from_impls)*

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            context.as_ref().map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

fn inspect_variant(v: &Variant) -> syn::Result<VariantInfo<'_>> {
    let Fields::Named(fields) = &v.fields else {
        return Err(syn::Error::new_spanned(&v.ident, "trellis_error requires named fields"));
    };

    match field_named(fields, "context") {
        Some(field) if is_cow_str(&field.ty, true) => {},
        Some(field) => {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "context field must be Option<Cow<'static, str>>",
            ));
        },
        None => {
            return Err(syn::Error::new_spanned(
                &v.ident,
                "trellis_error requires `context: Option<Cow<'static, str>>` on every variant",
            ));
        },
    }

    let has_entry = match field_named(fields, "entry") {
        Some(field) if is_cow_str(&field.ty, false) => true,
        Some(field) => {
            return Err(syn::Error::new_spanned(&field.ty, "entry field must be Cow<'static, str>"));
        },
        None => false,
    };

    let source = fields
        .named
        .iter()
        .find(|f| {
            f.ident.as_ref().is_some_and(|i| i == "source")
                || has_attr(f, "source")
                || has_attr(f, "from")
        })
        .and_then(|f| f.ident.as_ref().map(|i| (i, &f.ty)));

    Ok(VariantInfo {
        ident: &v.ident,
        source,
        has_entry,
        cfg_attrs: v.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
    })
}

fn generate_accessors(name: &Ident, variants: &[VariantInfo<'_>]) -> TokenStream {
    let kind_arms = variants.iter().map(|v| {
        let cfg = &v.cfg_attrs;
        let ident = v.ident;
        let label = ident.to_string();
        quote! { #(#cfg)* Self::#ident { .. } => #label, }
    });

    let entry_arms = variants.iter().map(|v| {
        let cfg = &v.cfg_attrs;
        let ident = v.ident;
        if v.has_entry {
            quote! { #(#cfg)* Self::#ident { entry, .. } => Some(&**entry), }
        } else {
            quote! { #(#cfg)* Self::#ident { .. } => None, }
        }
    });

    quote! {
        #[automatically_derived]
        impl #name {
            /// Name of the variant, used when reporting the failure.
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #(#kind_arms)*
                }
            }

            /// The declaration that triggered the failure, when the variant records one.
            #[must_use]
            pub fn entry(&self) -> Option<&str> {
                match self {
                    #(#entry_arms)*
                }
            }
        }
    }
}

fn generate_ext_trait(name: &Ident, ext_trait: &Ident, variants: &[VariantInfo<'_>]) -> TokenStream {
    let context_arms = variants.iter().map(|v| {
        let cfg = &v.cfg_attrs;
        let ident = v.ident;
        quote! { #(#cfg)* Self::#ident { context, .. } => *context = Some(value), }
    });

    quote! {
        pub trait #ext_trait<T> {
            /// Attaches a human-readable context to the error.
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext_trait<T> for std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    err.set_context(context.into());
                    err
                })
            }
        }

        impl #name {
            fn set_context(&mut self, value: std::borrow::Cow<'static, str>) {
                match self {
                    #(#context_arms)*
                }
            }
        }
    }
}

fn generate_source_impls(
    name: &Ident,
    ext_trait: &Ident,
    v: &VariantInfo<'_>,
) -> Option<TokenStream> {
    let (field, ty) = v.source?;
    let ident = v.ident;
    let cfg = &v.cfg_attrs;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfg)*
        impl<T> #ext_trait<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(seg) = meta.path.segments.last() {
                present.insert(seg.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }

    if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } }
}

fn field_named<'a>(fields: &'a FieldsNamed, name: &str) -> Option<&'a Field> {
    fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == name))
}

fn has_attr(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|a| a.path().is_ident(name))
}

/// Matches `Cow<'static, str>`, or `Option<Cow<'static, str>>` when `optional` is set.
fn is_cow_str(ty: &Type, optional: bool) -> bool {
    let ty = if optional {
        match single_generic(ty, "Option") {
            Some(syn::GenericArgument::Type(inner)) => inner,
            _ => return false,
        }
    } else {
        ty
    };

    let Type::Path(path) = ty else {
        return false;
    };
    let Some(seg) = path.path.segments.last() else {
        return false;
    };
    if seg.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let lifetime_ok =
        matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|s| s.ident == "str")
    );

    lifetime_ok && str_ok
}

fn single_generic<'a>(ty: &'a Type, outer: &str) -> Option<&'a syn::GenericArgument> {
    let Type::Path(path) = ty else {
        return None;
    };
    let seg = path.path.segments.last()?;
    if seg.ident != outer {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    args.args.first()
}
