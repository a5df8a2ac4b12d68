//! `meta::Decode` and `meta::Encode` impls for the structs translated from complex types.
//!
//! Attributes are read from the start tag before any child is consumed. Child elements are
//! matched against the field tags in declaration order, wildcard fields last; children that match
//! no field are skipped.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, parse_quote, Ident, ImplItemFn};
use thiserror::Error;

use super::{
    flatten::{ItemTag, TagError},
    spec::{option_item, sequence_item, Field, Method},
};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error("generated code does not parse: {0}")]
    Syntax(#[from] syn::Error),
}

/// Where the value of a struct field is stored in its element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldTag {
    /// The attribute with this local name.
    Attribute(String),
    Element(ItemTag),
}

impl FieldTag {
    /// Tags with the `attr` option name an attribute, everything else is parsed as an
    /// [`ItemTag`].
    pub fn parse(tag: Option<&str>) -> Result<Self, TagError> {
        if let Some(tag) = tag {
            let mut parts = tag.split(',');
            let names = parts.next().unwrap_or_default();
            if parts.any(|option| option.trim() == "attr") {
                let local = names.split_whitespace().last().unwrap_or_default();
                return Ok(Self::Attribute(local.to_string()));
            }
        }
        ItemTag::parse(tag).map(Self::Element)
    }

    /// Name used in `MissingValue` errors.
    fn label(&self) -> &str {
        match self {
            Self::Attribute(local) => local.as_str(),
            Self::Element(ItemTag::Any) => "any",
            Self::Element(ItemTag::Local(local) | ItemTag::Exact { local, .. }) => local.as_str(),
        }
    }
}

/// The name child elements of a field are written with.
fn element_name(tag: &ItemTag) -> TokenStream {
    match tag {
        ItemTag::Any => quote!(meta::XmlName::new("item")),
        ItemTag::Local(local) => quote!(meta::XmlName::new(#local)),
        ItemTag::Exact { namespace, local } => {
            quote!(meta::XmlName::qualified(#namespace, #local))
        }
    }
}

fn decode_method(fields: &[(&Field, FieldTag)]) -> syn::Result<Method> {
    let mut tags = Vec::new();
    let mut locals = Vec::new();
    let mut branches = Vec::new();
    let mut wildcards = Vec::new();
    let mut values = Vec::new();

    for (field, tag) in fields {
        let ident = &field.ident;
        let local = format_ident!("field_{}", ident);
        let label = tag.label();
        let value = match tag {
            FieldTag::Attribute(name) => match option_item(&field.ty) {
                Some(ty) => {
                    locals.push(quote!(let #local: Option<#ty> = decoder.attribute(#name)?;));
                    quote!(#local)
                }
                None => {
                    let ty = &field.ty;
                    locals.push(quote!(let #local: Option<#ty> = decoder.attribute(#name)?;));
                    quote!(#local.ok_or(meta::Error::MissingValue(#label))?)
                }
            },
            FieldTag::Element(item_tag) => {
                let tag_const = Ident::new(
                    &format!("{}_TAG", ident.unraw().to_string().to_uppercase()),
                    proc_macro2::Span::call_site(),
                );
                tags.push(quote!(const #tag_const: meta::TagMatch = #item_tag;));

                let (store, value) = if let Some(item) = sequence_item(&field.ty) {
                    locals.push(quote!(let mut #local: Vec<#item> = Vec::new();));
                    (
                        quote!(#local.push(<#item as meta::Decode>::decode(decoder, &name)?);),
                        quote!(#local),
                    )
                } else if let Some(item) = option_item(&field.ty) {
                    locals.push(quote!(let mut #local: Option<#item> = None;));
                    (
                        quote!(#local = Some(<#item as meta::Decode>::decode(decoder, &name)?);),
                        quote!(#local),
                    )
                } else {
                    let ty = &field.ty;
                    locals.push(quote!(let mut #local: Option<#ty> = None;));
                    (
                        quote!(#local = Some(<#ty as meta::Decode>::decode(decoder, &name)?);),
                        quote!(#local.ok_or(meta::Error::MissingValue(#label))?),
                    )
                };
                if *item_tag == ItemTag::Any {
                    wildcards.push((tag_const, store));
                } else {
                    branches.push((tag_const, store));
                }
                value
            }
        };
        values.push(quote!(#ident: #value));
    }
    branches.append(&mut wildcards);

    let on_start = if branches.is_empty() {
        quote!(meta::Token::Start(_) => decoder.skip()?,)
    } else {
        let mut chain = quote!({ decoder.skip()?; });
        for (tag_const, store) in branches.iter().rev() {
            chain = quote!(if #tag_const.matches(&name) { #store } else #chain);
        }
        quote!(meta::Token::Start(name) => { #chain })
    };

    let item = syn::parse2::<ImplItemFn>(quote! {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            #(#tags)*
            #(#locals)*
            loop {
                match decoder.token()? {
                    #on_start
                    meta::Token::End => break,
                    meta::Token::Eof => return Err(meta::Error::UnexpectedEof),
                    meta::Token::Text(_) => {}
                }
            }
            Ok(Self { #(#values),* })
        }
    })?;
    Ok(Method {
        trait_: Some(parse_quote!(meta::Decode)),
        item,
    })
}

fn encode_method(fields: &[(&Field, FieldTag)]) -> syn::Result<Method> {
    let mut attributes = Vec::new();
    let mut children = Vec::new();
    for (field, tag) in fields {
        let ident = &field.ident;
        match tag {
            FieldTag::Attribute(name) if option_item(&field.ty).is_some() => {
                attributes.push(quote! {
                    if let Some(value) = &self.#ident {
                        attributes.push((#name, meta::SimpleValue::format_value(value)));
                    }
                });
            }
            FieldTag::Attribute(name) => attributes.push(quote! {
                attributes.push((#name, meta::SimpleValue::format_value(&self.#ident)));
            }),
            FieldTag::Element(item_tag) => {
                let name = element_name(item_tag);
                children.push(quote!(meta::Encode::encode(&self.#ident, encoder, &#name)?;));
            }
        }
    }

    let start = if attributes.is_empty() {
        quote!(encoder.write_start(name)?;)
    } else {
        quote! {
            let mut attributes: Vec<(&str, String)> = Vec::new();
            #(#attributes)*
            encoder.write_start_with(name, &attributes)?;
        }
    };

    let item = syn::parse2::<ImplItemFn>(quote! {
        fn encode<W: std::io::Write>(
            &self,
            encoder: &mut meta::Encoder<W>,
            name: &meta::XmlName,
        ) -> Result<(), meta::Error> {
            #start
            #(#children)*
            encoder.write_end(name)
        }
    })?;
    Ok(Method {
        trait_: Some(parse_quote!(meta::Encode)),
        item,
    })
}

/// The `meta::Decode` and `meta::Encode` methods of a struct with `fields`.
pub fn record_methods(fields: &[Field]) -> Result<Vec<Method>, CodecError> {
    let fields = fields
        .iter()
        .map(|field| Ok((field, FieldTag::parse(field.tag.as_deref())?)))
        .collect::<Result<Vec<_>, TagError>>()?;
    Ok(vec![decode_method(&fields)?, encode_method(&fields)?])
}

/// Whether `method` is one of the methods [`record_methods`] generates.
pub(crate) fn is_codec_method(method: &Method) -> bool {
    let decode: syn::Path = parse_quote!(meta::Decode);
    let encode: syn::Path = parse_quote!(meta::Encode);
    method
        .trait_
        .as_ref()
        .is_some_and(|path| *path == decode || *path == encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::spec::{TypeExpr, TypeSpec};
    use crate::xsd::QName;
    use pretty_assertions::assert_eq;

    fn field(ident: syn::Ident, ty: syn::Type, tag: &str) -> Field {
        Field {
            ident,
            ty,
            tag: Some(tag.to_string()),
        }
    }

    fn render(fields: Vec<Field>) -> String {
        let mut spec = TypeSpec::new(
            parse_quote!(Order),
            QName::local("Order"),
            TypeExpr::Struct(fields.clone()),
        );
        spec.methods = record_methods(&fields).unwrap();
        prettyplease::unparse(&syn::File {
            shebang: None,
            attrs: vec![],
            items: spec.to_items().unwrap(),
        })
    }

    #[test]
    fn parses_field_tags() {
        assert_eq!(
            FieldTag::parse(Some("arrayType,attr")),
            Ok(FieldTag::Attribute("arrayType".into()))
        );
        assert_eq!(
            FieldTag::parse(Some("note")),
            Ok(FieldTag::Element(ItemTag::Local("note".into())))
        );
        assert_eq!(FieldTag::parse(Some(",any")), Ok(FieldTag::Element(ItemTag::Any)));
        assert_eq!(FieldTag::parse(None), Ok(FieldTag::Element(ItemTag::Any)));
        assert!(FieldTag::parse(Some("a,bogus")).is_err());
    }

    #[test]
    fn attributes_are_read_before_children() {
        let rendered = render(vec![
            field(parse_quote!(number), parse_quote!(i32), "number,attr"),
            field(parse_quote!(r#type), parse_quote!(Option<String>), "type,attr"),
            field(parse_quote!(customer), parse_quote!(String), "urn:shop customer"),
        ]);
        let read_number = r#"let field_number: Option<i32> = decoder.attribute("number")?;"#;
        assert!(rendered.contains(read_number), "{rendered}");
        assert!(
            rendered.contains(r#"let field_type: Option<String> = decoder.attribute("type")?;"#),
            "{rendered}"
        );
        assert!(
            rendered.find(read_number) < rendered.find("loop {"),
            "{rendered}"
        );
        assert!(
            rendered.contains(r#"number: field_number.ok_or(meta::Error::MissingValue("number"))?"#),
            "{rendered}"
        );
        assert!(rendered.contains("r#type: field_type"), "{rendered}");
        assert!(
            rendered.contains(r#"customer: field_customer.ok_or(meta::Error::MissingValue("customer"))?"#),
            "{rendered}"
        );
        assert!(
            rendered.contains("encoder.write_start_with(name, &attributes)?;"),
            "{rendered}"
        );
        assert!(rendered.contains("if let Some(value) = &self.r#type {"), "{rendered}");
    }

    #[test]
    fn wildcards_are_matched_last() {
        let rendered = render(vec![
            field(parse_quote!(any), parse_quote!(Vec<i32>), ",any"),
            field(parse_quote!(note), parse_quote!(Option<String>), "note"),
        ]);
        let note = rendered.find("if NOTE_TAG.matches(&name)").unwrap();
        let any = rendered.find("ANY_TAG.matches(&name)").unwrap();
        assert!(note < any, "{rendered}");
        assert!(
            rendered.contains("field_any.push(<i32 as meta::Decode>::decode(decoder, &name)?);"),
            "{rendered}"
        );
        assert!(
            rendered.contains(
                "field_note = Some(<String as meta::Decode>::decode(decoder, &name)?);"
            ),
            "{rendered}"
        );
        assert!(
            rendered.contains(
                r#"meta::Encode::encode(&self.any, encoder, &meta::XmlName::new("item"))?;"#
            ),
            "{rendered}"
        );
        assert!(rendered.contains("encoder.write_start(name)?;"), "{rendered}");
    }

    #[test]
    fn empty_structs_skip_all_children() {
        let rendered = render(Vec::new());
        assert!(rendered.contains("meta::Token::Start(_) => decoder.skip()?,"), "{rendered}");
        assert!(rendered.contains("Ok(Self {})"), "{rendered}");
    }

    #[test]
    fn bad_tags_are_reported() {
        let fields = [field(parse_quote!(a), parse_quote!(i32), "a b c")];
        assert!(matches!(
            record_methods(&fields),
            Err(CodecError::Tag(TagError::TooManyNames { .. }))
        ));
    }

    #[test]
    fn recognizes_its_own_methods() {
        let methods = record_methods(&[]).unwrap();
        assert!(methods.iter().all(is_codec_method));
        let other = Method {
            trait_: Some(parse_quote!(std::fmt::Display)),
            item: parse_quote!(fn fmt(&self) {}),
        };
        assert!(!is_codec_method(&other));
    }
}
