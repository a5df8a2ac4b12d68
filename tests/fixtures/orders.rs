//! Generated by xsd-codegen
#![allow(dead_code, unused_imports)]
pub mod ws {
    use xsd_codegen_builtins::meta;
    /// `{urn:shop}:Order`
    #[derive(Debug, Clone, PartialEq)]
    pub struct Order {
        /// xml: `number,attr`
        pub number: i32,
        /// xml: `urn:shop customer`
        pub customer: String,
        /// xml: `urn:shop item`
        pub item: Vec<String>,
        /// xml: `urn:shop note`
        pub note: Option<String>,
    }
    impl meta::Decode for Order {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            const CUSTOMER_TAG: meta::TagMatch = meta::TagMatch::Exact {
                namespace: "urn:shop",
                local: "customer",
            };
            const ITEM_TAG: meta::TagMatch = meta::TagMatch::Exact {
                namespace: "urn:shop",
                local: "item",
            };
            const NOTE_TAG: meta::TagMatch = meta::TagMatch::Exact {
                namespace: "urn:shop",
                local: "note",
            };
            let field_number: Option<i32> = decoder.attribute("number")?;
            let mut field_customer: Option<String> = None;
            let mut field_item: Vec<String> = Vec::new();
            let mut field_note: Option<String> = None;
            loop {
                match decoder.token()? {
                    meta::Token::Start(name) => {
                        if CUSTOMER_TAG.matches(&name) {
                            field_customer = Some(<String as meta::Decode>::decode(decoder, &name)?);
                        } else if ITEM_TAG.matches(&name) {
                            field_item.push(<String as meta::Decode>::decode(decoder, &name)?);
                        } else if NOTE_TAG.matches(&name) {
                            field_note = Some(<String as meta::Decode>::decode(decoder, &name)?);
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
                number: field_number.ok_or(meta::Error::MissingValue("number"))?,
                customer: field_customer.ok_or(meta::Error::MissingValue("customer"))?,
                item: field_item,
                note: field_note,
            })
        }
    }
    impl meta::Encode for Order {
        fn encode<W: std::io::Write>(
            &self,
            encoder: &mut meta::Encoder<W>,
            name: &meta::XmlName,
        ) -> Result<(), meta::Error> {
            let mut attributes: Vec<(&str, String)> = Vec::new();
            attributes.push(("number", meta::SimpleValue::format_value(&self.number)));
            encoder.write_start_with(name, &attributes)?;
            meta::Encode::encode(
                &self.customer,
                encoder,
                &meta::XmlName::qualified("urn:shop", "customer"),
            )?;
            meta::Encode::encode(
                &self.item,
                encoder,
                &meta::XmlName::qualified("urn:shop", "item"),
            )?;
            meta::Encode::encode(
                &self.note,
                encoder,
                &meta::XmlName::qualified("urn:shop", "note"),
            )?;
            encoder.write_end(name)
        }
    }
    /// `{urn:shop}:Orders`
    #[derive(Debug, Clone, PartialEq)]
    pub struct Orders(pub Vec<Order>);
    impl meta::Decode for Orders {
        fn decode(
            decoder: &mut meta::Decoder<'_>,
            _start: &meta::XmlName,
        ) -> Result<Self, meta::Error> {
            const ITEM_TAG: meta::TagMatch = meta::TagMatch::Exact {
                namespace: "urn:shop",
                local: "order",
            };
            let mut items = Vec::new();
            loop {
                match decoder.token()? {
                    meta::Token::Start(name) => {
                        if !ITEM_TAG.matches(&name) {
                            decoder.skip()?;
                            continue;
                        }
                        let item = <Order as meta::Decode>::decode(decoder, &name)?;
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
    impl meta::Encode for Orders {
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
