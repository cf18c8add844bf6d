use crate::utils::{apply_derives, field_names, wire_names};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[command] 宏实现
/// - 仅支持具名字段结构体，每个字段即一个命令属性
/// - 合并/追加派生：Debug（可关闭）、Default（可关闭）、Serialize、Deserialize
/// - 追加 `#[serde(default)]`：缺失的属性取默认值
/// - 实现 `::commands_core::CommandAttributes`（名称 + 属性名列表）；
///   属性名取反序列化时的键，遵循 `rename`/`alias`/`skip`/`rename_all`，不支持 `flatten`
/// - 为每个属性生成 `<attr>_present(&self) -> bool`
/// - 参数：`#[command(name = "...", debug = true|false, default = true|false)]`
///   `default = false` 时结构体需自行实现 `Default`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as CommandAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[command] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let (names, wire) = match &st.fields {
        syn::Fields::Named(f) => match wire_names(&st.attrs, f) {
            Ok(wire) => (field_names(f), wire),
            Err(err) => return err.to_compile_error().into(),
        },
        _ => {
            return syn::Error::new(st.span(), "#[command] only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if cfg.derive_default.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Default));
    }
    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required);
    st.attrs.push(syn::parse_quote!(#[serde(default)]));

    let ident = &st.ident;
    let command_name = cfg
        .name
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.to_string());
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let name_lits = wire.iter().map(|n| LitStr::new(n, ident.span()));
    let predicates = st
        .fields
        .iter()
        .zip(names.iter())
        .filter_map(|(field, name)| {
            let member = field.ident.as_ref()?;
            let predicate = format_ident!("{}_present", name);
            Some(quote! {
                /// 属性是否存在（非 null、非空白、非空容器）
                pub fn #predicate(&self) -> bool {
                    ::commands_core::present(&self.#member)
                }
            })
        });

    let expanded = quote! {
        #st

        impl #impl_generics ::commands_core::CommandAttributes for #ident #ty_generics #where_clause {
            const COMMAND: &'static str = #command_name;
            const NAMES: &'static [&'static str] = &[#(#name_lits),*];
        }

        impl #impl_generics #ident #ty_generics #where_clause {
            #(#predicates)*
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct CommandAttrConfig {
    name: Option<LitStr>,
    derive_debug: Option<bool>,
    derive_default: Option<bool>,
}

impl Parse for CommandAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            name: None,
            derive_debug: None,
            derive_default: None,
        };

        if input.is_empty() {
            return Ok(cfg);
        }

        let elems: Punctuated<CommandAttrElem, Token![,]> =
            Punctuated::<CommandAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                CommandAttrElem::Name(lit) => {
                    if cfg.name.is_some() {
                        return Err(syn::Error::new(lit.span(), "duplicate key 'name' in attribute"));
                    }
                    cfg.name = Some(lit);
                }
                CommandAttrElem::Debug(b) => {
                    if cfg.derive_debug.is_some() {
                        return Err(syn::Error::new(
                            proc_macro2::Span::call_site(),
                            "duplicate key 'debug' in attribute",
                        ));
                    }
                    cfg.derive_debug = Some(b);
                }
                CommandAttrElem::Default(b) => {
                    if cfg.derive_default.is_some() {
                        return Err(syn::Error::new(
                            proc_macro2::Span::call_site(),
                            "duplicate key 'default' in attribute",
                        ));
                    }
                    cfg.derive_default = Some(b);
                }
            }
        }

        Ok(cfg)
    }
}

enum CommandAttrElem {
    Name(LitStr),
    Debug(bool),
    Default(bool),
}

impl Parse for CommandAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.call(syn::Ident::parse_any)?;
        let _eq: Token![=] = input.parse()?;
        if key == "name" {
            Ok(CommandAttrElem::Name(input.parse()?))
        } else if key == "debug" {
            Ok(CommandAttrElem::Debug(parse_bool(input, "debug")?))
        } else if key == "default" {
            Ok(CommandAttrElem::Default(parse_bool(input, "default")?))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name', 'debug' or 'default'",
            ))
        }
    }
}

fn parse_bool(input: ParseStream, key: &str) -> Result<bool> {
    let expr: syn::Expr = input.parse()?;
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Bool(b),
            ..
        }) => Ok(b.value()),
        other => Err(syn::Error::new(
            other.span(),
            format!("expected boolean literal for '{key}'"),
        )),
    }
}
