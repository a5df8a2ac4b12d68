//! Helper types for XSD built-in datatypes without a native Rust counterpart, and the [`meta`]
//! module that generated code uses to read and write XML.

pub mod meta;

use std::io::Write;
use std::string::String as StdString;

use meta::{Decode, Decoder, Encode, Encoder, Error, SimpleValue, XmlName};

/// Content of a wildcard (`xs:any`) or `xs:anyType` element. The content itself is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyType;

impl Decode for AnyType {
    fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
        decoder.skip()?;
        Ok(Self)
    }
}

impl Encode for AnyType {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        encoder.write_start(name)?;
        encoder.write_end(name)
    }
}

macro_rules! literal_types {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
            pub struct $name(pub StdString);

            impl $name {
                pub fn from_literal(literal: &str) -> Result<Self, Error> {
                    Ok(Self(literal.to_string()))
                }
            }

            impl SimpleValue for $name {
                fn parse_value(text: &str) -> Result<Self, Error> {
                    Self::from_literal(&meta::normalized_value(text, meta::Whitespace::Collapse))
                }

                fn format_value(&self) -> StdString {
                    self.0.clone()
                }
            }

            impl Decode for $name {
                fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
                    Self::parse_value(&decoder.read_text()?)
                }
            }

            impl Encode for $name {
                fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
                    encoder.write_simple(name, &self.0)
                }
            }
        )*
    };
}

// Lexical forms are kept verbatim; only whitespace is collapsed.
literal_types!(
    AnySimpleType,
    AnyAtomicType,
    Decimal,
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    DateTime,
    DateTimeStamp,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    Time,
    Date,
    GMonth,
    GMonthDay,
    GDay,
    GYear,
    GYearMonth,
    HexBinary,
    Base64Binary,
    AnyURI,
    QName,
    Notation,
    NormalizedString,
    Token,
    Language,
    NmToken,
    NmTokens,
    Name,
    NcName,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
);
