//! Generated by xsd-codegen
#![allow(dead_code, unused_imports)]
pub mod ws {
    use xsd_codegen_builtins::meta;
    /// `{urn:test}:Array`
    #[derive(Debug, Clone, PartialEq)]
    pub struct Array {
        /// xml: `arrayType,attr`
        pub array_type: Option<String>,
        /// xml: `,any`
        pub any: Vec<xsd_codegen_builtins::AnyType>,
    }
    impl meta::Decode for Array {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            const ANY_TAG: meta::TagMatch = meta::TagMatch::Any;
            let field_array_type: Option<String> = decoder.attribute("arrayType")?;
            let mut field_any: Vec<xsd_codegen_builtins::AnyType> = Vec::new();
            loop {
                match decoder.token()? {
                    meta::Token::Start(name) => {
                        if ANY_TAG.matches(&name) {
                            field_any.push(
                                <xsd_codegen_builtins::AnyType as meta::Decode>::decode(
                                    decoder, &name,
                                )?,
                            );
                        } else {
                            decoder.skip()?;
                        }
                    }
                    meta::Token::End => break,
                    meta::Token::Eof => return Err(meta::Error::UnexpectedEof),
                    meta::Token::Text(_) => {}
                }
            }
            Ok(Self {
                array_type: field_array_type,
                any: field_any,
            })
        }
    }
    impl meta::Encode for Array {
        fn encode<W: std::io::Write>(
            &self,
            encoder: &mut meta::Encoder<W>,
            name: &meta::XmlName,
        ) -> Result<(), meta::Error> {
            let mut attributes: Vec<(&str, String)> = Vec::new();
            if let Some(value) = &self.array_type {
                attributes.push(("arrayType", meta::SimpleValue::format_value(value)));
            }
            encoder.write_start_with(name, &attributes)?;
            meta::Encode::encode(&self.any, encoder, &meta::XmlName::new("item"))?;
            encoder.write_end(name)
        }
    }
    /// `{urn:test}:IntArray`
    #[derive(Debug, Clone, PartialEq)]
    pub struct IntArray(pub Vec<i32>);
    impl IntArray {
        pub const ARRAY_TYPE: &'static str = "xs:int[]";
    }
    impl meta::Decode for IntArray {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            const ITEM_TAG: meta::TagMatch = meta::TagMatch::Any;
            let mut items = Vec::new();
            loop {
                match decoder.token()? {
                    meta::Token::Start(name) => {
                        if !ITEM_TAG.matches(&name) {
                            decoder.skip()?;
                            continue;
                        }
                        let item = <i32 as meta::Decode>::decode(decoder, &name)?;
                        items.push(item);
                    }
                    meta::Token::End => break,
                    meta::Token::Eof => return Err(meta::Error::UnexpectedEof),
                    meta::Token::Text(_) => {}
                }
            }
            Ok(Self(items))
        }
    }
    impl meta::Encode for IntArray {
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
    }
}
