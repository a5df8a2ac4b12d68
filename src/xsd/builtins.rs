use super::xstypes::QName;

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

pub const XS_ANY_TYPE: &str = "anyType";
pub const XS_ANY_SIMPLE_TYPE: &str = "anySimpleType";

/// Local names of the datatypes built into XML Schema (Pt. 2, §3).
const BUILTIN_NAMES: &[&str] = &[
    XS_ANY_TYPE,
    XS_ANY_SIMPLE_TYPE,
    "anyAtomicType",
    "string",
    "boolean",
    "decimal",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
    "normalizedString",
    "token",
    "language",
    "NMTOKEN",
    "NMTOKENS",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "positiveInteger",
    "yearMonthDuration",
    "dayTimeDuration",
    "dateTimeStamp",
];

/// A datatype built into XML Schema, such as `xs:int`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Builtin(&'static str);

impl Builtin {
    pub fn from_name(name: &QName) -> Option<Self> {
        if name.namespace_name.as_deref() != Some(XS_NAMESPACE) {
            return None;
        }
        BUILTIN_NAMES
            .iter()
            .copied()
            .find(|builtin| *builtin == name.local_name)
            .map(Self)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        BUILTIN_NAMES.iter().copied().map(Self)
    }

    pub fn local_name(&self) -> &'static str {
        self.0
    }

    pub fn name(&self) -> QName {
        QName::with_namespace(XS_NAMESPACE, self.0)
    }
}

pub fn xs_name(local_name: &str) -> QName {
    QName::with_namespace(XS_NAMESPACE, local_name)
}

pub fn is_any_type(name: &QName) -> bool {
    name.namespace_name.as_deref() == Some(XS_NAMESPACE) && name.local_name == XS_ANY_TYPE
}
