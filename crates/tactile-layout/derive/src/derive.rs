use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

struct LayoutVariant {
    ident: syn::Ident,
    name: String,
    float: bool,
}

pub(crate) fn handle_derive_layout(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ButtonLayout cannot be derived for generic enums",
        ));
    }
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "ButtonLayout can be derived only for enums",
        ));
    };

    let mut variants: Vec<LayoutVariant> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "ButtonLayout supports only fieldless enum variants",
            ));
        }
        let parsed = parse_variant(variant)?;
        if variants.iter().any(|v| v.name == parsed.name) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate button name `{}`", parsed.name),
            ));
        }
        variants.push(parsed);
    }

    // Ids are assigned by declaration order.
    let count = variants.len();
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let ids = (0..count)
        .map(u32::try_from)
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|_| syn::Error::new_spanned(name, "too many buttons in layout"))?;
    let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
    let types: Vec<TokenStream2> = variants
        .iter()
        .map(|v| {
            if v.float {
                quote! { ::tactile_device::ButtonType::Float }
            } else {
                quote! { ::tactile_device::ButtonType::Bool }
            }
        })
        .collect();

    Ok(quote! {
        impl ::tactile_device::ButtonLayout for #name {
            const COUNT: usize = #count;

            #[inline]
            fn id(self) -> ::tactile_device::DeviceButtonId {
                match self { #( #name::#idents => #ids, )* }
            }

            #[inline]
            fn from_id(id: ::tactile_device::DeviceButtonId) -> ::core::option::Option<Self> {
                match id {
                    #( #ids => ::core::option::Option::Some(#name::#idents), )*
                    _ => ::core::option::Option::None,
                }
            }

            fn name(self) -> &'static str {
                match self { #( #name::#idents => #names, )* }
            }

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #( #names => ::core::option::Option::Some(#name::#idents), )*
                    _ => ::core::option::Option::None,
                }
            }

            #[inline]
            fn button_type(self) -> ::tactile_device::ButtonType {
                match self { #( #name::#idents => #types, )* }
            }
        }
    })
}

fn parse_variant(variant: &syn::Variant) -> syn::Result<LayoutVariant> {
    let mut name = to_snake_case(&variant.ident.to_string());
    let mut float = false;
    for attr in &variant.attrs {
        if !attr.path().is_ident("button") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("float") {
                float = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = lit.value();
                Ok(())
            } else {
                Err(meta.error("expected `float` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(LayoutVariant {
        ident: variant.ident.clone(),
        name,
        float,
    })
}

/// `DPadUp` -> `d_pad_up`, `AxisX` -> `axis_x`.
fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p));
            let next = chars.get(i + 1);
            let boundary = match prev {
                None => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(_) => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
