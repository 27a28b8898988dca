use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Meta, Path};

/// Derive macro declaring a struct's document field map.
///
/// Generates impls of `Instance`, `Mapped`, `IntoValue` and `FromValue`.
/// Fields are registered in declaration order; fields without `#[bind]` are
/// not part of the document.
///
/// The struct must implement `Default` (nested values are deserialized into a
/// default instance).
///
/// # Example
///
/// ```ignore
/// #[derive(Mapped, Default)]
/// pub struct Base {
///     #[bind("serialize_me_1")]
///     pub serialize_me: String,
/// }
///
/// #[derive(Mapped, Default)]
/// #[mapped(rebind(serialize_me = "serialize_me_2"))]
/// pub struct Child {
///     #[bind(inherit)]
///     pub base: Base,
///
///     #[bind(key = "when", to = encode_ts, from = decode_ts)]
///     pub created: i64,
///
///     pub scratch: String,
/// }
/// ```
///
/// Field attributes:
/// - `#[bind]`: output key is the field name.
/// - `#[bind("key")]` / `#[bind(key = "key")]`: explicit output key.
/// - `to = path`, `from = path`: `fn(Value) -> Value` strategies.
/// - `#[bind(inherit)]`: marks the parent part; its map seeds this type's map and
///   inherited keys are read and written through it.
///
/// Struct attribute `#[mapped(rebind(field = "key"))]` moves an inherited
/// field to a new output key.
#[proc_macro_derive(Mapped, attributes(bind, mapped))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parsed `#[bind(...)]` of one field.
#[derive(Default)]
struct BindAttr {
    key: Option<LitStr>,
    to: Option<Path>,
    from: Option<Path>,
    inherit: bool,
}

fn parse_bind(attr: &syn::Attribute) -> Result<BindAttr, syn::Error> {
    let mut bind = BindAttr::default();
    let list = match &attr.meta {
        Meta::Path(_) => return Ok(bind),
        Meta::List(list) => list,
        Meta::NameValue(_) => {
            return Err(syn::Error::new_spanned(attr, "expected #[bind] or #[bind(...)]"));
        }
    };
    if let Ok(key) = list.parse_args::<LitStr>() {
        bind.key = Some(key);
        return Ok(bind);
    }
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
            bind.key = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("to") {
            bind.to = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("from") {
            bind.from = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("inherit") {
            bind.inherit = true;
        } else {
            return Err(meta.error("unknown bind option (expected key, to, from or inherit)"));
        }
        Ok(())
    })?;
    if bind.inherit && (bind.key.is_some() || bind.to.is_some() || bind.from.is_some()) {
        return Err(syn::Error::new_spanned(attr, "`inherit` takes no other options"));
    }
    Ok(bind)
}

fn parse_rebinds(input: &DeriveInput) -> Result<Vec<(Ident, LitStr)>, syn::Error> {
    let mut rebinds = Vec::new();
    for attr in &input.attrs {
        if !attr.path().is_ident("mapped") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rebind") {
                return Err(meta.error("unknown mapped option (expected rebind)"));
            }
            meta.parse_nested_meta(|inner| {
                let field = inner
                    .path
                    .get_ident()
                    .cloned()
                    .ok_or_else(|| inner.error("expected a field name"))?;
                let key: LitStr = inner.value()?.parse()?;
                rebinds.push((field, key));
                Ok(())
            })
        })?;
    }
    Ok(rebinds)
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Mapped does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Mapped only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Mapped only supports structs")),
    };

    let mut parent: Option<(&Ident, &syn::Type)> = None;
    let mut register_tokens = Vec::new();
    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();
    // Output keys claimed by this type's own declarations.
    let mut own_keys: HashMap<String, String> = HashMap::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.unraw().to_string();
        let field_ty = &field.ty;

        let mut bind: Option<BindAttr> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }
            if bind.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[bind] attribute"));
            }
            bind = Some(parse_bind(attr)?);
        }
        let Some(bind) = bind else { continue };

        if bind.inherit {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(field_name, "only one field may be `inherit`"));
            }
            parent = Some((field_name, &field.ty));
            continue;
        }

        let output_key = bind
            .key
            .as_ref()
            .map_or_else(|| field_name_str.clone(), LitStr::value);
        claim(&mut own_keys, &output_key, &field_name_str, field_name)?;

        let spec = spec_tokens(&output_key, bind.to.as_ref(), bind.from.as_ref());
        register_tokens.push(quote! {
            ::fieldbind::__private::declared(
                #name_str,
                __builder.register(::fieldbind::FieldKey::named(#field_name_str), #spec),
            );
        });
        get_arms.push(quote! {
            Some(#field_name_str) => Some(
                <#field_ty as ::fieldbind::IntoValue>::into_value(&self.#field_name),
            ),
        });
        set_arms.push(quote! {
            Some(#field_name_str) => {
                match <#field_ty as ::fieldbind::FromValue>::from_value(__value) {
                    Some(v) => {
                        self.#field_name = v;
                        true
                    }
                    None => false,
                }
            }
        });
    }

    let rebinds = parse_rebinds(input)?;
    if !rebinds.is_empty() && parent.is_none() {
        return Err(syn::Error::new_spanned(
            name,
            "`rebind` requires a field marked #[bind(inherit)]",
        ));
    }
    for (field, key) in &rebinds {
        let field_str = field.unraw().to_string();
        if own_keys.values().any(|f| f == &field_str) {
            return Err(syn::Error::new_spanned(
                field,
                "`rebind` applies to inherited fields, not fields of this struct",
            ));
        }
        claim(&mut own_keys, &key.value(), &field_str, field)?;
        let spec = spec_tokens(&key.value(), None, None);
        register_tokens.push(quote! {
            ::fieldbind::__private::declared(
                #name_str,
                __builder.rebind(::fieldbind::FieldKey::named(#field_str), #spec),
            );
        });
    }

    let (seed, get_fallback, set_fallback) = match parent {
        Some((field, ty)) => (
            quote! { <#ty as ::fieldbind::Mapped>::field_map().inherit() },
            quote! { ::fieldbind::Instance::get_field(&self.#field, __key) },
            quote! { ::fieldbind::Instance::set_field(&mut self.#field, __key, __value) },
        ),
        None => (
            quote! { ::fieldbind::FieldMapBuilder::new() },
            quote! { None },
            quote! { false },
        ),
    };

    Ok(quote! {
        impl ::fieldbind::Instance for #name {
            fn get_field(
                &self,
                __key: &::fieldbind::FieldKey,
            ) -> Option<::fieldbind::__private::Value> {
                match __key.name() {
                    #(#get_arms)*
                    _ => #get_fallback,
                }
            }

            fn set_field(
                &mut self,
                __key: &::fieldbind::FieldKey,
                __value: ::fieldbind::__private::Value,
            ) -> bool {
                match __key.name() {
                    #(#set_arms)*
                    _ => #set_fallback,
                }
            }
        }

        impl ::fieldbind::Mapped for #name {
            fn field_map() -> &'static ::fieldbind::FieldMap {
                static MAP: ::std::sync::OnceLock<::fieldbind::FieldMap> =
                    ::std::sync::OnceLock::new();
                MAP.get_or_init(|| {
                    #[allow(unused_mut)]
                    let mut __builder = #seed;
                    #(#register_tokens)*
                    __builder.finish()
                })
            }
        }

        impl ::fieldbind::IntoValue for #name {
            fn into_value(&self) -> ::fieldbind::__private::Value {
                ::fieldbind::Mapped::to_document(self)
            }
        }

        impl ::fieldbind::FromValue for #name {
            fn from_value(value: ::fieldbind::__private::Value) -> Option<Self> {
                if !value.is_object() {
                    return None;
                }
                let mut this = <Self as ::core::default::Default>::default();
                ::fieldbind::Mapped::from_document(&mut this, value);
                Some(this)
            }
        }
    })
}

/// Record `output_key` as claimed by `field`, rejecting a second field.
fn claim(
    own_keys: &mut HashMap<String, String>,
    output_key: &str,
    field: &str,
    span: &Ident,
) -> Result<(), syn::Error> {
    match own_keys.get(output_key) {
        Some(owner) if owner != field => Err(syn::Error::new_spanned(
            span,
            format!("duplicate output key: {output_key}"),
        )),
        _ => {
            own_keys.insert(output_key.to_string(), field.to_string());
            Ok(())
        }
    }
}

fn spec_tokens(output_key: &str, to: Option<&Path>, from: Option<&Path>) -> TokenStream2 {
    let to = to.map(|path| quote! { .to_document(#path) });
    let from = from.map(|path| quote! { .from_document(#path) });
    quote! {
        ::fieldbind::BindSpec::new().key(#output_key) #to #from
    }
}
