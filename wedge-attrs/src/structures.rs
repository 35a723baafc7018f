use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute,
    Expr,
    Fields,
    Ident,
    ItemStruct,
    Result,
    Token,
};

/// One `tag = expr` pair of the `error` attribute.
struct Tag {
    name: Ident,
    value: Expr,
}

impl Parse for Tag {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse()?;
        input.parse::<Token![=]>()?;
        Ok(Self { name, value: input.parse()? })
    }
}

/// The contents of the `error` attribute.
#[derive(Default)]
pub struct ReportTags {
    message: Option<Expr>,
    labels: Option<Expr>,
    help: Option<Expr>,
}

impl Parse for ReportTags {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut tags = Self::default();
        for Tag { name, value } in Punctuated::<Tag, Token![,]>::parse_terminated(input)? {
            let slot = match name.to_string().as_str() {
                "message" => &mut tags.message,
                "labels" => &mut tags.labels,
                "help" => &mut tags.help,
                other => {
                    return Err(syn::Error::new_spanned(&name, format!("unknown tag `{}`", other)));
                },
            };
            if slot.replace(value).is_some() {
                return Err(syn::Error::new_spanned(&name, format!("duplicate tag `{}`", name)));
            }
        }
        Ok(tags)
    }
}

/// The struct `ErrorKind` is derived for.
pub struct ErrorKindTarget {
    pub name: Ident,
    fields: Fields,
    tags: ReportTags,
}

impl Parse for ErrorKindTarget {
    fn parse(input: ParseStream) -> Result<Self> {
        let attributes = input.call(Attribute::parse_outer)?;
        let item = input.parse::<ItemStruct>()?;

        let tags = match attributes.iter().find(|attr| attr.path().is_ident("error")) {
            Some(attr) => attr.parse_args::<ReportTags>()?,
            None => ReportTags::default(),
        };
        if tags.message.is_none() {
            return Err(syn::Error::new_spanned(
                &item.ident,
                "expected an `error` attribute with a `message` tag",
            ));
        }

        Ok(Self { name: item.ident, fields: item.fields, tags })
    }
}

impl ErrorKindTarget {
    /// A statement binding the named fields of `self` to local variables, so the tag expressions
    /// can refer to them.
    fn bind_fields(&self) -> TokenStream2 {
        let name = &self.name;
        match &self.fields {
            Fields::Named(fields) => {
                let members = fields.named.iter().map(|field| &field.ident);
                quote! { let #name { #(#members),* } = self; }
            },
            Fields::Unnamed(_) => quote_spanned! { name.span() =>
                compile_error!("`ErrorKind` cannot be derived for tuple structs");
            },
            Fields::Unit => TokenStream2::new(),
        }
    }

    /// The `ErrorKind` method `method` returning `output`, computed by `body`.
    fn method(&self, method: &str, output: TokenStream2, body: TokenStream2) -> TokenStream2 {
        let method = format_ident!("{}", method);
        let bind = self.bind_fields();
        quote! {
            #[allow(unused_variables)]
            fn #method(&self) -> #output {
                #bind
                #body
            }
        }
    }
}

impl ToTokens for ErrorKindTarget {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let ReportTags { message, labels, help } = &self.tags;
        if let Some(message) = message {
            tokens.extend(self.method("message", quote!(String), quote! { (#message).to_string() }));
        }
        if let Some(labels) = labels {
            tokens.extend(self.method(
                "labels",
                quote!(Vec<String>),
                quote! { (#labels).into_iter().map(|label| label.to_string()).collect() },
            ));
        }
        if let Some(help) = help {
            tokens.extend(self.method(
                "help",
                quote!(Option<String>),
                quote! { Some((#help).to_string()) },
            ));
        }
    }
}
