use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_quote, ImplItemFn};
use thiserror::Error;

use super::{
    codec::is_codec_method,
    config::Config,
    spec::{sequence_item, Method, TypeExpr, TypeSpec},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("tag {tag:?} has more than a namespace and a local name")]
    TooManyNames { tag: String },
    #[error("tag {tag:?} has option {option:?}, which doesn't apply to sequence items")]
    UnsupportedOption { tag: String, option: String },
}

/// Which child elements a sequence accepts as items. Mirrors `meta::TagMatch` of the runtime
/// crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemTag {
    Any,
    /// Matches the local name in any namespace.
    Local(String),
    Exact { namespace: String, local: String },
}

impl ItemTag {
    /// Parses a field tag of the form `[namespace] local[,option...]`. A missing tag, a tag
    /// without a name, and the `any` option all accept any element.
    pub fn parse(tag: Option<&str>) -> Result<Self, TagError> {
        let Some(tag) = tag else {
            return Ok(Self::Any);
        };
        let mut parts = tag.split(',');
        let names: Vec<&str> = parts.next().unwrap_or_default().split_whitespace().collect();
        if names.len() > 2 {
            return Err(TagError::TooManyNames { tag: tag.into() });
        }

        let mut any = false;
        for option in parts.map(str::trim) {
            match option {
                "any" => any = true,
                "" | "omitempty" => {}
                _ => {
                    return Err(TagError::UnsupportedOption {
                        tag: tag.into(),
                        option: option.into(),
                    })
                }
            }
        }

        Ok(match names.as_slice() {
            _ if any => Self::Any,
            [] => Self::Any,
            [local] => Self::Local(local.to_string()),
            [namespace, local] => Self::Exact {
                namespace: namespace.to_string(),
                local: local.to_string(),
            },
            _ => unreachable!("checked above"),
        })
    }
}

impl ToTokens for ItemTag {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::Any => quote!(meta::TagMatch::Any),
            Self::Local(local) => quote!(meta::TagMatch::Local(#local)),
            Self::Exact { namespace, local } => quote! {
                meta::TagMatch::Exact {
                    namespace: #namespace,
                    local: #local,
                }
            },
        });
    }
}

fn decode_method(item: &syn::Type, item_tag: &ItemTag) -> syn::Result<Method> {
    let item = syn::parse2::<ImplItemFn>(quote! {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            const ITEM_TAG: meta::TagMatch = #item_tag;
            let mut items = Vec::new();
            loop {
                match decoder.token()? {
                    meta::Token::Start(name) => {
                        if !ITEM_TAG.matches(&name) {
                            decoder.skip()?;
                            continue;
                        }
                        let item = <#item as meta::Decode>::decode(decoder, &name)?;
                        items.push(item);
                    }
                    meta::Token::End => break,
                    meta::Token::Eof => return Err(meta::Error::UnexpectedEof),
                    meta::Token::Text(_) => {}
                }
            }
            Ok(Self(items))
        }
    })?;
    Ok(Method {
        trait_: Some(parse_quote!(meta::Decode)),
        item,
    })
}

fn encode_method() -> syn::Result<Method> {
    let item = syn::parse2::<ImplItemFn>(quote! {
        fn encode<W: std::io::Write>(
            &self,
            encoder: &mut meta::Encoder<W>,
            name: &meta::XmlName,
        ) -> Result<(), meta::Error> {
            let tag = meta::XmlName::new("item");
            encoder.write_start(name)?;
            for item in &self.0 {
                meta::Encode::encode(item, encoder, &tag)?;
            }
            encoder.write_end(name)
        }
    })?;
    Ok(Method {
        trait_: Some(parse_quote!(meta::Encode)),
        item,
    })
}

impl Config {
    /// Turns a struct whose only field is a `Vec<T>` into a sequence of `T` that decodes the
    /// children of its element as items and encodes each item as an `<item>` element.
    pub fn soap_array_to_sequence(&self, spec: TypeSpec) -> TypeSpec {
        let TypeExpr::Struct(fields) = &spec.expr else {
            return spec;
        };
        let [field] = fields.as_slice() else {
            return spec;
        };
        let Some(item) = sequence_item(&field.ty).cloned() else {
            return spec;
        };
        let tag = field.tag.clone();
        self.debugf(format_args!(
            "flattening single-element sequence struct type {} to Vec<{}>",
            spec.name,
            item.to_token_stream()
        ));

        let item_tag = match ItemTag::parse(tag.as_deref()) {
            Ok(item_tag) => item_tag,
            Err(err) => {
                self.logf(format_args!("error parsing item tag of {}: {}", spec.name, err));
                return spec;
            }
        };
        let decode = match decode_method(&item, &item_tag) {
            Ok(method) => method,
            Err(err) => {
                self.logf(format_args!("error generating decode method of {}: {}", spec.name, err));
                return spec;
            }
        };
        let encode = match encode_method() {
            Ok(method) => method,
            Err(err) => {
                self.logf(format_args!("error generating encode method of {}: {}", spec.name, err));
                return spec;
            }
        };

        let mut spec = spec;
        spec.expr = TypeExpr::Sequence(item);
        spec.methods.retain(|method| !is_codec_method(method));
        spec.methods.push(decode);
        spec.methods.push(encode);
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::config::tests::recording_config;
    use crate::generator::spec::Field;
    use crate::xsd::QName;
    use pretty_assertions::assert_eq;

    fn spec_with(fields: Vec<Field>) -> TypeSpec {
        TypeSpec::new(
            parse_quote!(IntArray),
            QName::local("IntArray"),
            TypeExpr::Struct(fields),
        )
    }

    fn field(ident: &str, ty: syn::Type, tag: Option<&str>) -> Field {
        Field {
            ident: syn::Ident::new(ident, proc_macro2::Span::call_site()),
            ty,
            tag: tag.map(str::to_string),
        }
    }

    fn render(spec: &TypeSpec) -> String {
        prettyplease::unparse(&syn::File {
            shebang: None,
            attrs: vec![],
            items: spec.to_items().unwrap(),
        })
    }

    #[test]
    fn parses_item_tags() {
        assert_eq!(ItemTag::parse(None), Ok(ItemTag::Any));
        assert_eq!(ItemTag::parse(Some(",any")), Ok(ItemTag::Any));
        assert_eq!(ItemTag::parse(Some("")), Ok(ItemTag::Any));
        assert_eq!(ItemTag::parse(Some("item")), Ok(ItemTag::Local("item".into())));
        assert_eq!(
            ItemTag::parse(Some("value,omitempty")),
            Ok(ItemTag::Local("value".into()))
        );
        assert_eq!(
            ItemTag::parse(Some("urn:v value")),
            Ok(ItemTag::Exact {
                namespace: "urn:v".into(),
                local: "value".into()
            })
        );
        assert!(matches!(
            ItemTag::parse(Some("a b c")),
            Err(TagError::TooManyNames { .. })
        ));
        assert!(matches!(
            ItemTag::parse(Some("size,attr")),
            Err(TagError::UnsupportedOption { option, .. }) if option == "attr"
        ));
    }

    #[test]
    fn flattens_single_vec_field() {
        let config = Config::default();
        let spec = spec_with(vec![field("any", parse_quote!(Vec<i32>), Some(",any"))]);
        let spec = config.soap_array_to_sequence(spec);
        assert_eq!(spec.expr, TypeExpr::Sequence(parse_quote!(i32)));
        assert_eq!(spec.methods.len(), 2);

        let rendered = render(&spec);
        assert!(rendered.contains("pub struct IntArray(pub Vec<i32>);"), "{rendered}");
        assert!(rendered.contains("impl meta::Decode for IntArray {"), "{rendered}");
        assert!(rendered.contains("impl meta::Encode for IntArray {"), "{rendered}");
        assert!(
            rendered.contains("const ITEM_TAG: meta::TagMatch = meta::TagMatch::Any;"),
            "{rendered}"
        );
        assert!(
            rendered.contains("let item = <i32 as meta::Decode>::decode(decoder, &name)?;"),
            "{rendered}"
        );
        assert!(rendered.contains(r#"let tag = meta::XmlName::new("item");"#), "{rendered}");
    }

    #[test]
    fn replaces_the_struct_codec() {
        let config = Config::default();
        let fields = vec![field("any", parse_quote!(Vec<i32>), Some(",any"))];
        let mut spec = spec_with(fields.clone());
        spec.methods = crate::generator::record_methods(&fields).unwrap();
        let spec = config.soap_array_to_sequence(spec);
        assert_eq!(spec.methods.len(), 2);

        let rendered = render(&spec);
        assert_eq!(rendered.matches("fn decode(").count(), 1, "{rendered}");
        assert_eq!(rendered.matches("fn encode<").count(), 1, "{rendered}");
        assert!(rendered.contains("Ok(Self(items))"), "{rendered}");
        assert!(!rendered.contains("field_any"), "{rendered}");
    }

    #[test]
    fn exact_tags_are_checked_while_decoding() {
        let config = Config::default();
        let spec = spec_with(vec![field("value", parse_quote!(Vec<i32>), Some("urn:v value"))]);
        let rendered = render(&config.soap_array_to_sequence(spec));
        assert!(rendered.contains("meta::TagMatch::Exact"), "{rendered}");
        assert!(rendered.contains(r#"namespace: "urn:v""#), "{rendered}");
        assert!(rendered.contains("decoder.skip()?;"), "{rendered}");
    }

    #[test]
    fn leaves_other_structs_alone() {
        let config = Config::default();
        let two = spec_with(vec![
            field("a", parse_quote!(Vec<i32>), None),
            field("b", parse_quote!(Vec<i32>), None),
        ]);
        assert_eq!(config.soap_array_to_sequence(two.clone()), two);

        let single = spec_with(vec![field("a", parse_quote!(Option<i32>), None)]);
        assert_eq!(config.soap_array_to_sequence(single.clone()), single);

        let alias = TypeSpec::new(
            parse_quote!(Code),
            QName::local("Code"),
            TypeExpr::Alias(parse_quote!(Vec<i32>)),
        );
        assert_eq!(config.soap_array_to_sequence(alias.clone()), alias);
    }

    #[test]
    fn bad_tag_leaves_spec_unchanged() {
        let (config, logger) = recording_config(1);
        let spec = spec_with(vec![field("size", parse_quote!(Vec<i32>), Some("size,attr"))]);
        assert_eq!(config.soap_array_to_sequence(spec.clone()), spec);
        assert_eq!(logger.messages().len(), 1);
    }
}
