use std::{borrow::Cow, fmt, io::Write, str::FromStr};

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    name::ResolveResult,
    NsReader, Writer,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("failed to write XML: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid UTF-8 in XML input: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("namespace prefix {0:?} is not bound")]
    UnknownPrefix(String),
    #[error("unexpected end of document")]
    UnexpectedEof,
    #[error("element {0} found in simple content")]
    ElementInSimpleContent(XmlName),
    #[error("value {value:?} is not a valid {expected}")]
    InvalidValue {
        value: String,
        expected: &'static str,
    },
    #[error("required {0} is missing")]
    MissingValue(&'static str),
}

/// An expanded XML name as seen on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct XmlName {
    pub namespace: Option<String>,
    pub local: String,
}

impl XmlName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }
}

impl fmt::Display for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Some(ref namespace) => write!(f, "{{{namespace}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Which child elements a sequence type accepts as its items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagMatch {
    /// Any element, regardless of its name.
    Any,
    /// Elements with this local name, in any namespace.
    Local(&'static str),
    /// Elements with exactly this namespace and local name.
    Exact {
        namespace: &'static str,
        local: &'static str,
    },
}

impl TagMatch {
    pub fn matches(&self, name: &XmlName) -> bool {
        match *self {
            Self::Any => true,
            Self::Local(local) => name.local == local,
            Self::Exact { namespace, local } => {
                name.local == local && name.namespace.as_deref() == Some(namespace)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Start(XmlName),
    End,
    Text(String),
    Eof,
}

pub enum Whitespace {
    Preserve,
    Replace,
    Collapse,
}

pub fn normalized_value(value: &str, whitespace: Whitespace) -> Cow<str> {
    match whitespace {
        Whitespace::Preserve => Cow::Borrowed(value),
        Whitespace::Replace => Cow::Owned(value.replace(['\t', '\n', '\r'], " ")),
        Whitespace::Collapse => Cow::Owned(value.split_whitespace().collect::<Vec<_>>().join(" ")),
    }
}

/// Pull-based XML token stream with namespace resolution.
///
/// Empty elements (`<a/>`) are reported as a [`Token::Start`] immediately followed by a
/// [`Token::End`], so consumers only need to handle one shape.
pub struct Decoder<'i> {
    reader: NsReader<&'i [u8]>,
    pending_end: bool,
    attributes: Vec<(XmlName, String)>,
}

impl<'i> Decoder<'i> {
    pub fn new(input: &'i str) -> Self {
        Self {
            reader: NsReader::from_str(input),
            pending_end: false,
            attributes: Vec::new(),
        }
    }

    pub fn token(&mut self) -> Result<Token, Error> {
        if self.pending_end {
            self.pending_end = false;
            return Ok(Token::End);
        }
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    self.read_attributes(&start)?;
                    return Ok(Token::Start(self.resolve(&start)?));
                }
                Event::Empty(start) => {
                    self.read_attributes(&start)?;
                    let name = self.resolve(&start)?;
                    self.pending_end = true;
                    return Ok(Token::Start(name));
                }
                Event::End(_) => return Ok(Token::End),
                Event::Text(text) => return Ok(Token::Text(text.unescape()?.into_owned())),
                Event::CData(data) => {
                    return Ok(Token::Text(std::str::from_utf8(&data)?.to_owned()))
                }
                Event::Eof => return Ok(Token::Eof),
                // declarations, comments, processing instructions, doctype
                _ => {}
            }
        }
    }

    /// Reads up to the next start tag, ignoring any text in between.
    pub fn root(&mut self) -> Result<XmlName, Error> {
        loop {
            match self.token()? {
                Token::Start(name) => return Ok(name),
                Token::Text(_) => {}
                Token::End | Token::Eof => return Err(Error::UnexpectedEof),
            }
        }
    }

    /// Consumes the rest of the element whose start tag was read last.
    pub fn skip(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        loop {
            match self.token()? {
                Token::Start(_) => depth += 1,
                Token::End if depth == 0 => return Ok(()),
                Token::End => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => return Err(Error::UnexpectedEof),
            }
        }
    }

    /// Collects the character data of the current element, which must not contain child
    /// elements, and consumes its end tag.
    pub fn read_text(&mut self) -> Result<String, Error> {
        let mut value = String::new();
        loop {
            match self.token()? {
                Token::Text(text) => value.push_str(&text),
                Token::End => return Ok(value),
                Token::Start(name) => return Err(Error::ElementInSimpleContent(name)),
                Token::Eof => return Err(Error::UnexpectedEof),
            }
        }
    }

    /// Attributes of the element whose start tag was read last, without namespace
    /// declarations.
    pub fn attributes(&self) -> &[(XmlName, String)] {
        &self.attributes
    }

    /// Parses the attribute with local name `local` of the element whose start tag was read
    /// last.
    pub fn attribute<T: SimpleValue>(&self, local: &str) -> Result<Option<T>, Error> {
        self.attributes
            .iter()
            .find(|(name, _)| name.local == local)
            .map(|(_, value)| T::parse_value(value))
            .transpose()
    }

    fn read_attributes(&mut self, start: &BytesStart) -> Result<(), Error> {
        self.attributes.clear();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = attribute.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (namespace, local) = self.reader.resolve_attribute(attribute.key);
            let name = XmlName {
                namespace: resolved_namespace(namespace)?,
                local: std::str::from_utf8(local.into_inner())?.to_owned(),
            };
            let value = attribute.unescape_value()?.into_owned();
            self.attributes.push((name, value));
        }
        Ok(())
    }

    fn resolve(&self, start: &BytesStart) -> Result<XmlName, Error> {
        let (namespace, local) = self.reader.resolve_element(start.name());
        Ok(XmlName {
            namespace: resolved_namespace(namespace)?,
            local: std::str::from_utf8(local.into_inner())?.to_owned(),
        })
    }
}

fn resolved_namespace(namespace: ResolveResult) -> Result<Option<String>, Error> {
    match namespace {
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Bound(namespace) => {
            Ok(Some(std::str::from_utf8(namespace.into_inner())?.to_owned()))
        }
        ResolveResult::Unknown(prefix) => Err(Error::UnknownPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

pub struct Encoder<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> Encoder<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    pub fn write_start(&mut self, name: &XmlName) -> Result<(), Error> {
        self.write_start_with(name, &[])
    }

    /// Writes a start tag carrying unqualified `attributes` after the namespace declaration.
    pub fn write_start_with(
        &mut self,
        name: &XmlName,
        attributes: &[(&str, String)],
    ) -> Result<(), Error> {
        let mut start = BytesStart::new(name.local.as_str());
        if let Some(ref namespace) = name.namespace {
            start.push_attribute(("xmlns", namespace.as_str()));
        }
        for (key, value) in attributes {
            start.push_attribute((*key, value.as_str()));
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    pub fn write_end(&mut self, name: &XmlName) -> Result<(), Error> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name.local.as_str())))?;
        Ok(())
    }

    pub fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Writes `<name>text</name>`.
    pub fn write_simple(&mut self, name: &XmlName, text: &str) -> Result<(), Error> {
        self.write_start(name)?;
        self.write_text(text)?;
        self.write_end(name)
    }
}

/// Types that can be read from an element. `decode` is called right after the element's start
/// tag was read and must consume everything up to and including the matching end tag.
pub trait Decode: Sized {
    fn decode(decoder: &mut Decoder<'_>, start: &XmlName) -> Result<Self, Error>;
}

/// Types that can be written as a complete element named `name`.
pub trait Encode {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error>;
}

/// Types that can appear as attribute values.
pub trait SimpleValue: Sized {
    fn parse_value(text: &str) -> Result<Self, Error>;
    fn format_value(&self) -> String;
}

/// Decodes the first element of `input`.
pub fn from_str<T: Decode>(input: &str) -> Result<T, Error> {
    let mut decoder = Decoder::new(input);
    let root = decoder.root()?;
    T::decode(&mut decoder, &root)
}

pub fn to_string<T: Encode>(value: &T, name: &XmlName) -> Result<String, Error> {
    let mut encoder = Encoder::new(Vec::new());
    value.encode(&mut encoder, name)?;
    String::from_utf8(encoder.into_inner()).map_err(|err| Error::Utf8(err.utf8_error()))
}

fn parse_literal<T: FromStr>(text: &str, expected: &'static str) -> Result<T, Error> {
    let value = normalized_value(text, Whitespace::Collapse);
    value.parse().map_err(|_| Error::InvalidValue {
        value: value.into_owned(),
        expected,
    })
}

macro_rules! primitive_types {
    ($($type_:ty => $xsd_name:literal),* $(,)?) => {
        $(
            impl SimpleValue for $type_ {
                fn parse_value(text: &str) -> Result<Self, Error> {
                    parse_literal(text, $xsd_name)
                }

                fn format_value(&self) -> String {
                    self.to_string()
                }
            }

            impl Decode for $type_ {
                fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
                    parse_literal(&decoder.read_text()?, $xsd_name)
                }
            }

            impl Encode for $type_ {
                fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
                    encoder.write_simple(name, &self.to_string())
                }
            }
        )*
    };
}

primitive_types!(
    i8 => "byte",
    i16 => "short",
    i32 => "int",
    i64 => "long",
    u8 => "unsignedByte",
    u16 => "unsignedShort",
    u32 => "unsignedInt",
    u64 => "unsignedLong",
    f32 => "float",
    f64 => "double",
);

impl SimpleValue for bool {
    fn parse_value(text: &str) -> Result<Self, Error> {
        match normalized_value(text, Whitespace::Collapse).as_ref() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(Error::InvalidValue {
                value: other.to_string(),
                expected: "boolean",
            }),
        }
    }

    fn format_value(&self) -> String {
        String::from(if *self { "true" } else { "false" })
    }
}

impl Decode for bool {
    fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
        Self::parse_value(&decoder.read_text()?)
    }
}

impl Encode for bool {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        encoder.write_simple(name, &self.format_value())
    }
}

impl SimpleValue for String {
    fn parse_value(text: &str) -> Result<Self, Error> {
        Ok(text.to_string())
    }

    fn format_value(&self) -> String {
        self.clone()
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
        decoder.read_text()
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        encoder.write_simple(name, self)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &mut Decoder<'_>, start: &XmlName) -> Result<Self, Error> {
        T::decode(decoder, start).map(Some)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        match self {
            Some(value) => value.encode(encoder, name),
            None => Ok(()),
        }
    }
}

/// Writes one element named `name` per item.
impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        self.iter().try_for_each(|item| item.encode(encoder, name))
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(decoder: &mut Decoder<'_>, start: &XmlName) -> Result<Self, Error> {
        T::decode(decoder, start).map(Box::new)
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
        T::encode(self, encoder, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Same shape as the code emitted for a flattened SOAP array of `xs:int`.
    #[derive(Debug, PartialEq)]
    struct IntArray(pub Vec<i32>);

    impl Decode for IntArray {
        fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
            const ITEM_TAG: TagMatch = TagMatch::Any;
            let mut items = Vec::new();
            loop {
                match decoder.token()? {
                    Token::Start(name) => {
                        if !ITEM_TAG.matches(&name) {
                            decoder.skip()?;
                            continue;
                        }
                        let item = <i32 as Decode>::decode(decoder, &name)?;
                        items.push(item);
                    }
                    Token::End => break,
                    Token::Eof => return Err(Error::UnexpectedEof),
                    Token::Text(_) => {}
                }
            }
            Ok(Self(items))
        }
    }

    impl Encode for IntArray {
        fn encode<W: Write>(&self, encoder: &mut Encoder<W>, name: &XmlName) -> Result<(), Error> {
            let tag = XmlName::new("item");
            encoder.write_start(name)?;
            for item in &self.0 {
                Encode::encode(item, encoder, &tag)?;
            }
            encoder.write_end(name)
        }
    }

    /// Same as [`IntArray`] but only accepting `<urn:v:value>` children.
    #[derive(Debug, PartialEq)]
    struct Values(pub Vec<i32>);

    impl Decode for Values {
        fn decode(decoder: &mut Decoder<'_>, _start: &XmlName) -> Result<Self, Error> {
            const ITEM_TAG: TagMatch = TagMatch::Exact {
                namespace: "urn:v",
                local: "value",
            };
            let mut items = Vec::new();
            loop {
                match decoder.token()? {
                    Token::Start(name) => {
                        if !ITEM_TAG.matches(&name) {
                            decoder.skip()?;
                            continue;
                        }
                        items.push(<i32 as Decode>::decode(decoder, &name)?);
                    }
                    Token::End => break,
                    Token::Eof => return Err(Error::UnexpectedEof),
                    Token::Text(_) => {}
                }
            }
            Ok(Self(items))
        }
    }

    #[test]
    fn sequence_accepts_any_child_element() {
        let xml = r#"<arr><item>1</item><x>2</x> <v:y xmlns:v="urn:v">3</v:y></arr>"#;
        let array: IntArray = from_str(xml).unwrap();
        assert_eq!(array, IntArray(vec![1, 2, 3]));
    }

    #[test]
    fn sequence_skips_children_with_other_tags() {
        let xml = r#"<vs xmlns:v="urn:v"><v:value>1</v:value><value>2</value><v:other><v:value>9</v:value></v:other><v:value>3</v:value></vs>"#;
        let values: Values = from_str(xml).unwrap();
        assert_eq!(values, Values(vec![1, 3]));
    }

    #[test]
    fn sequence_propagates_item_errors() {
        let err = from_str::<IntArray>("<arr><item>one</item></arr>").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { expected: "int", .. }));
    }

    #[test]
    fn sequence_reports_truncated_input() {
        let err = from_str::<IntArray>("<arr><item>1</item>").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn sequence_encodes_items_as_item_elements() {
        let xml = to_string(&IntArray(vec![4, 5]), &XmlName::new("arr")).unwrap();
        assert_eq!(xml, "<arr><item>4</item><item>5</item></arr>");
    }

    #[test]
    fn empty_elements_produce_start_and_end() {
        let mut decoder = Decoder::new("<a/>");
        assert_eq!(decoder.token().unwrap(), Token::Start(XmlName::new("a")));
        assert_eq!(decoder.token().unwrap(), Token::End);
        assert_eq!(decoder.token().unwrap(), Token::Eof);
    }

    #[test]
    fn default_namespace_is_resolved() {
        let mut decoder = Decoder::new(r#"<a xmlns="urn:a"/>"#);
        assert_eq!(
            decoder.token().unwrap(),
            Token::Start(XmlName::qualified("urn:a", "a"))
        );
    }

    #[test]
    fn tag_match_variants() {
        let plain = XmlName::new("item");
        let namespaced = XmlName::qualified("urn:x", "item");
        assert!(TagMatch::Any.matches(&namespaced));
        assert!(TagMatch::Local("item").matches(&plain));
        assert!(TagMatch::Local("item").matches(&namespaced));
        assert!(!TagMatch::Local("other").matches(&plain));
        let exact = TagMatch::Exact {
            namespace: "urn:x",
            local: "item",
        };
        assert!(exact.matches(&namespaced));
        assert!(!exact.matches(&plain));
    }

    #[test]
    fn booleans_accept_numeric_literals() {
        assert!(from_str::<bool>("<b> 1 </b>").unwrap());
        assert!(!from_str::<bool>("<b>false</b>").unwrap());
        assert!(from_str::<bool>("<b>yes</b>").is_err());
    }

    #[test]
    fn text_rejects_child_elements() {
        let err = from_str::<String>("<s>a<b/></s>").unwrap_err();
        assert!(matches!(err, Error::ElementInSimpleContent(name) if name.local == "b"));
    }

    #[test]
    fn text_is_unescaped() {
        assert_eq!(from_str::<String>("<s>a &lt; b</s>").unwrap(), "a < b");
    }

    #[test]
    fn attributes_are_resolved_and_unescaped() {
        let mut decoder =
            Decoder::new(r#"<a xmlns:e="urn:e" n=" 7 " e:t="x &amp; y" flag="1"><b/></a>"#);
        decoder.root().unwrap();
        assert_eq!(
            decoder.attributes(),
            [
                (XmlName::new("n"), " 7 ".to_string()),
                (XmlName::qualified("urn:e", "t"), "x & y".to_string()),
                (XmlName::new("flag"), "1".to_string()),
            ]
        );
        assert_eq!(decoder.attribute::<i32>("n").unwrap(), Some(7));
        assert_eq!(decoder.attribute::<bool>("flag").unwrap(), Some(true));
        assert_eq!(decoder.attribute::<String>("missing").unwrap(), None);
        assert!(decoder.attribute::<u8>("t").is_err());

        // the next start tag replaces them
        decoder.token().unwrap();
        assert!(decoder.attributes().is_empty());
    }

    #[test]
    fn start_tags_carry_attributes() {
        let mut encoder = Encoder::new(Vec::new());
        let name = XmlName::qualified("urn:a", "a");
        encoder
            .write_start_with(&name, &[("n", 7i32.format_value()), ("t", "<".to_string())])
            .unwrap();
        encoder.write_end(&name).unwrap();
        let xml = String::from_utf8(encoder.into_inner()).unwrap();
        assert_eq!(xml, r#"<a xmlns="urn:a" n="7" t="&lt;"></a>"#);
    }

    #[test]
    fn vectors_write_one_element_per_item() {
        let xml = to_string(&vec![Box::new(1u8), Box::new(2)], &XmlName::new("n")).unwrap();
        assert_eq!(xml, "<n>1</n><n>2</n>");
    }

    #[test]
    fn collapse_joins_with_single_spaces() {
        assert_eq!(normalized_value("  a \n\t b ", Whitespace::Collapse), "a b");
        assert_eq!(normalized_value("a\tb", Whitespace::Replace), "a b");
    }
}
