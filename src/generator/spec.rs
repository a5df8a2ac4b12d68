use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{GenericArgument, Ident, ImplItemFn, Item, PathArguments};

use crate::xsd::QName;

/// Draft declaration of one schema type, produced by translation and refined by the declaration
/// post-processing chain before it is rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// Name of the schema type this was translated from.
    pub xml_name: QName,
    pub expr: TypeExpr,
    pub constants: Vec<Constant>,
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Struct(Vec<Field>),
    /// A sequence of items of the given type, rendered as a newtype around `Vec`.
    Sequence(syn::Type),
    Alias(syn::Type),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub ident: Ident,
    pub ty: syn::Type,
    /// XML serialization tag: `"namespace local"` for elements, `",any"` for wildcards and
    /// `"local,attr"` for attributes.
    pub tag: Option<String>,
}

/// An associated string constant, used for attributes with a fixed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub ident: Ident,
    pub value: String,
}

/// A generated method. Methods with a trait path are rendered into an `impl Trait for` block of
/// their own, the others into the inherent impl.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub trait_: Option<syn::Path>,
    pub item: ImplItemFn,
}

impl TypeSpec {
    pub fn new(name: Ident, xml_name: QName, expr: TypeExpr) -> Self {
        Self {
            name,
            xml_name,
            expr,
            constants: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn to_items(&self) -> syn::Result<Vec<Item>> {
        let name = &self.name;
        let doc = format!(" `{}`", self.xml_name);
        let declaration = match &self.expr {
            TypeExpr::Struct(fields) => {
                let fields = fields.iter().map(|field| {
                    let Field { ident, ty, tag } = field;
                    let doc = tag.as_ref().map(|tag| {
                        let tag = format!(" xml: `{tag}`");
                        quote!(#[doc = #tag])
                    });
                    quote! {
                        #doc
                        pub #ident: #ty,
                    }
                });
                quote! {
                    #[doc = #doc]
                    #[derive(Debug, Clone, PartialEq)]
                    pub struct #name {
                        #(#fields)*
                    }
                }
            }
            TypeExpr::Sequence(item) => quote! {
                #[doc = #doc]
                #[derive(Debug, Clone, PartialEq)]
                pub struct #name(pub Vec<#item>);
            },
            TypeExpr::Alias(target) => quote! {
                #[doc = #doc]
                pub type #name = #target;
            },
        };

        let mut items = vec![syn::parse2::<Item>(declaration)?];

        let constants = self.constants.iter().map(|Constant { ident, value }| {
            quote!(pub const #ident: &'static str = #value;)
        });
        let inherent: Vec<TokenStream> = constants
            .chain(
                self.methods
                    .iter()
                    .filter(|method| method.trait_.is_none())
                    .map(|method| method.item.to_token_stream()),
            )
            .collect();
        if !inherent.is_empty() {
            items.push(syn::parse2(quote! {
                impl #name {
                    #(#inherent)*
                }
            })?);
        }

        // one impl block per trait, in the order the first method of each appeared
        let mut traits: Vec<&syn::Path> = Vec::new();
        for method in &self.methods {
            if let Some(path) = &method.trait_ {
                if !traits.contains(&path) {
                    traits.push(path);
                }
            }
        }
        for path in traits {
            let methods = self
                .methods
                .iter()
                .filter(|method| method.trait_.as_ref() == Some(path))
                .map(|method| &method.item);
            items.push(syn::parse2(quote! {
                impl #path for #name {
                    #(#methods)*
                }
            })?);
        }

        Ok(items)
    }
}

/// The item type `T` of a `Vec<T>`.
pub fn sequence_item(ty: &syn::Type) -> Option<&syn::Type> {
    type_argument(ty, "Vec")
}

/// The value type `T` of an `Option<T>`.
pub fn option_item(ty: &syn::Type) -> Option<&syn::Type> {
    type_argument(ty, "Option")
}

fn type_argument<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(item)) if arguments.args.len() == 1 => Some(item),
        _ => None,
    }
}
