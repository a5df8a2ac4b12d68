use super::xstypes::QName;

/// A named simple type, reduced to the type it restricts.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleType {
    pub name: QName,
    pub base: QName,
}

impl SimpleType {
    pub const TAG_NAME: &'static str = "simpleType";
}
