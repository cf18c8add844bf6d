use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Expr, Generics, Ident, Result, Token, Type, Visibility, braced, parenthesized,
    parse::Parse, parse::ParseStream, parse_macro_input,
};

/// commander! 宏实现
///
/// 语法：
/// ```ignore
/// commander! {
///     impl Host {
///         /// 文档注释会被带到生成的方法上
///         command run(args = |instance: &Self| json!({ "attr1": instance.id })) => DummyCommand;
///         class_command search(args = || json!({ "scope": "all" })) => SearchCommand;
///         command publish => PublishCommand;
///     }
/// }
/// ```
///
/// 每条声明生成一对入口：`name`（软调用）与 `name_strict`（严格调用）。
/// - `command`：实例级，方法接收 `&self`，参数构造器以 `self` 调用；
/// - `class_command`：类型级，生成关联函数，参数构造器无参调用；
/// - 参数构造器每次调用都会重新求值，结果与调用方 `options` 合并（调用方优先）；
/// - 未写可见性时生成 `pub`。
pub(crate) fn expand(input: TokenStream) -> TokenStream {
    let block = parse_macro_input!(input as CommanderBlock);

    let CommanderBlock {
        attrs,
        generics,
        self_ty,
        entries,
    } = block;
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    let methods = entries.iter().map(Entry::expand);

    let out = quote! {
        #(#attrs)*
        impl #impl_generics #self_ty #where_clause {
            #(#methods)*
        }
    };

    TokenStream::from(out)
}

// -------- parsing --------

struct CommanderBlock {
    attrs: Vec<Attribute>,
    generics: Generics,
    self_ty: Type,
    entries: Vec<Entry>,
}

impl Parse for CommanderBlock {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let _impl: Token![impl] = input.parse()?;

        // `impl<T> Host<T>`：只有紧跟 `<` 时才解析泛型参数
        let mut generics: Generics = if input.peek(Token![<]) {
            input.parse()?
        } else {
            Generics::default()
        };
        let self_ty: Type = input.parse()?;
        generics.where_clause = input.parse()?;

        let content;
        braced!(content in input);
        let mut entries = Vec::new();
        while !content.is_empty() {
            entries.push(content.parse()?);
        }

        Ok(Self {
            attrs,
            generics,
            self_ty,
            entries,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    Instance,
    Type,
}

struct Entry {
    attrs: Vec<Attribute>,
    vis: Visibility,
    level: Level,
    name: Ident,
    builder: Option<Expr>,
    target: Type,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;

        let keyword: Ident = input.call(Ident::parse_any)?;
        let level = if keyword == "command" {
            Level::Instance
        } else if keyword == "class_command" {
            Level::Type
        } else {
            return Err(syn::Error::new(
                keyword.span(),
                "expected 'command' or 'class_command'",
            ));
        };

        let name: Ident = input.parse()?;

        let builder = if input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in input);
            let key: Ident = content.call(Ident::parse_any)?;
            if key != "args" {
                return Err(syn::Error::new(
                    key.span(),
                    "unknown key in declaration; expected 'args'",
                ));
            }
            let _eq: Token![=] = content.parse()?;
            let expr: Expr = content.parse()?;
            if !content.is_empty() {
                return Err(content.error("unexpected tokens after 'args' expression"));
            }
            Some(expr)
        } else {
            None
        };

        let _arrow: Token![=>] = input.parse()?;
        let target: Type = input.parse()?;
        let _semi: Token![;] = input.parse()?;

        Ok(Self {
            attrs,
            vis,
            level,
            name,
            builder,
            target,
        })
    }
}

// -------- expansion --------

impl Entry {
    fn expand(&self) -> proc_macro2::TokenStream {
        let Self {
            attrs,
            vis,
            level,
            name,
            builder,
            target,
        } = self;

        let vis = match vis {
            Visibility::Inherited => quote!(pub),
            other => quote!(#other),
        };
        let strict_name = format_ident!("{}_strict", name.unraw());

        let receiver = match level {
            Level::Instance => quote!(&self,),
            Level::Type => quote!(),
        };

        let base = match (builder, level) {
            (Some(expr), Level::Instance) => quote! {
                ::commands_core::IntoAttributes::into_attributes((#expr)(self))?
            },
            (Some(expr), Level::Type) => quote! {
                ::commands_core::IntoAttributes::into_attributes((#expr)())?
            },
            (None, _) => quote!(::commands_core::Attributes::new()),
        };

        quote! {
            #(#attrs)*
            #vis fn #name(
                #receiver
                options: ::commands_core::Attributes,
            ) -> ::commands_core::CommandResult<::commands_core::Envelope<#target>> {
                let base = #base;
                ::commands_core::invoke::<#target>(base, options, ::commands_core::Mode::Soft)
            }

            #(#attrs)*
            #vis fn #strict_name(
                #receiver
                options: ::commands_core::Attributes,
            ) -> ::commands_core::CommandResult<::commands_core::Envelope<#target>> {
                let base = #base;
                ::commands_core::invoke::<#target>(base, options, ::commands_core::Mode::Strict)
            }
        }
    }
}
