use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::*;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::*;

const KEYWORDS: [&str; 47] = [
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

// keywords that cannot be raw identifiers
const RESERVED: [&str; 5] = ["self", "Self", "super", "crate", "_"];

enum Template {
    None,
    Inline(LitStr),
    File(LitStr),
}

struct ElementArgs {
    template: Template,
    bound_methods: Vec<LitStr>,
    mirrored_props: Vec<LitStr>,
}

fn name_list(list: &MetaList) -> Result<Vec<LitStr>> {
    let mut ret = vec![];
    for item in &list.nested {
        match item {
            NestedMeta::Meta(Meta::Path(p)) => {
                let ident = p
                    .get_ident()
                    .ok_or_else(|| Error::new(p.span(), "expected a name"))?;
                ret.push(LitStr::new(&ident.to_string(), ident.span()));
            }
            NestedMeta::Lit(Lit::Str(s)) => {
                if s.value().is_empty() {
                    return Err(Error::new(s.span(), "the name should not be empty"));
                }
                ret.push(s.clone());
            }
            x => return Err(Error::new(x.span(), "expected a name or a string literal")),
        }
    }
    Ok(ret)
}

fn parse_args(args: AttributeArgs) -> Result<ElementArgs> {
    let mut ret = ElementArgs {
        template: Template::None,
        bound_methods: vec![],
        mirrored_props: vec![],
    };
    for arg in args {
        match arg {
            NestedMeta::Meta(Meta::NameValue(nv)) => {
                let s = match &nv.lit {
                    Lit::Str(s) => s.clone(),
                    x => return Err(Error::new(x.span(), "expected a string literal")),
                };
                if !matches!(ret.template, Template::None) {
                    return Err(Error::new(nv.path.span(), "duplicated template"));
                }
                if nv.path.is_ident("template") {
                    ret.template = Template::Inline(s);
                } else if nv.path.is_ident("template_file") {
                    ret.template = Template::File(s);
                } else {
                    return Err(Error::new(nv.path.span(), "unknown argument"));
                }
            }
            NestedMeta::Meta(Meta::List(list)) => {
                if list.path.is_ident("bound_methods") {
                    ret.bound_methods.append(&mut name_list(&list)?);
                } else if list.path.is_ident("mirrored_props") {
                    ret.mirrored_props.append(&mut name_list(&list)?);
                } else {
                    return Err(Error::new(list.path.span(), "unknown argument"));
                }
            }
            x => return Err(Error::new(x.span(), "unknown argument")),
        }
    }
    Ok(ret)
}

fn accessor_ident(prefix: &str, name: &str, span: Span) -> Result<Ident> {
    let name = name.replace(|c: char| c == '-' || c == '.' || c == ':', "_");
    if name.is_empty() || !name.chars().all(|c| c == '_' || c.is_alphanumeric()) {
        return Err(Error::new(span, "the property name cannot be an identifier"));
    }
    let name = format!("{}{}", prefix, name);
    if name.starts_with(|c: char| c.is_numeric()) {
        return Err(Error::new(span, "the property name cannot be an identifier"));
    }
    if RESERVED.contains(&name.as_str()) {
        return Err(Error::new(
            span,
            format!("`{}` is reserved and cannot be a property accessor", name),
        ));
    }
    if KEYWORDS.contains(&name.as_str()) {
        Ok(Ident::new_raw(&name, span))
    } else {
        Ok(Ident::new(&name, span))
    }
}

// find the field marked with `#[base]` or the field named `base`
fn take_base_field(input: &mut ItemStruct) -> Option<Ident> {
    let fields = match &mut input.fields {
        Fields::Named(fields) => fields,
        _ => return None,
    };
    for field in fields.named.iter_mut() {
        if let Some(index) = field.attrs.iter().position(|attr| {
            matches!(attr.style, AttrStyle::Outer) && attr.path.is_ident("base")
        }) {
            field.attrs.remove(index);
            return field.ident.clone();
        }
    }
    fields
        .named
        .iter()
        .find_map(|field| field.ident.clone().filter(|x| x == "base"))
}

fn generate(args: ElementArgs, mut input: ItemStruct) -> Result<TokenStream2> {
    let base_field = take_base_field(&mut input);
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let template = match &args.template {
        Template::None => quote! { None },
        Template::Inline(s) => quote! { Some(#s) },
        Template::File(s) => quote! {
            Some(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", #s)))
        },
    };
    let bound_methods = &args.bound_methods;
    let mirrored_props = &args.mirrored_props;

    let mut accessors = vec![];
    if !mirrored_props.is_empty() {
        let base_field = base_field.ok_or_else(|| {
            Error::new(
                input.ident.span(),
                "a field named `base` or marked with `#[base]` is required for mirrored properties",
            )
        })?;
        let mut seen: Vec<(String, &LitStr)> = vec![];
        for name in mirrored_props {
            let getter = accessor_ident("", &name.value(), name.span())?;
            let setter = accessor_ident("set_", &name.value(), name.span())?;
            let key = getter.unraw().to_string();
            if let Some((_, prev)) = seen.iter().find(|(x, _)| *x == key) {
                return Err(Error::new(
                    name.span(),
                    format!(
                        "`{}` and `{}` both generate the accessor `{}`",
                        prev.value(),
                        name.value(),
                        key,
                    ),
                ));
            }
            seen.push((key, name));
            let get_doc = format!("Read the `{}` attribute.", name.value());
            let set_doc = format!("Write the `{}` attribute.", name.value());
            accessors.push(quote! {
                #[doc = #get_doc]
                #[allow(dead_code)]
                pub fn #getter(&self) -> ::std::option::Option<::std::string::String> {
                    ::elembase::ElementBase::get_attribute(&self.#base_field, #name)
                }

                #[doc = #set_doc]
                #[allow(dead_code)]
                pub fn #setter(
                    &self,
                    value: impl ::std::fmt::Display,
                ) -> ::std::result::Result<(), ::elembase::Error> {
                    ::elembase::ElementBase::set_attribute(&self.#base_field, #name, value)
                }
            });
        }
    }

    Ok(quote! {
        #input

        impl #impl_generics ::elembase::HasDefinition for #ident #ty_generics #where_clause {
            fn definition() -> &'static ::elembase::Definition {
                static DEFINITION: ::elembase::Definition = ::elembase::Definition {
                    template: #template,
                    bound_methods: &[#(#bound_methods),*],
                    mirrored_props: &[#(#mirrored_props),*],
                };
                &DEFINITION
            }
        }

        impl #impl_generics #ident #ty_generics #where_clause {
            #(#accessors)*
        }
    })
}

pub fn custom_element(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let ret = parse_args(args).and_then(|args| generate(args, input));
    match ret {
        Ok(x) => x.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
