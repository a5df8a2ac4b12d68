use super::xstypes::QName;

/// An element particle of a complex type, flattened out of its model groups.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: QName,
    pub type_name: QName,
    /// Set for `<any>` particles, which accept elements of any name and type.
    pub wildcard: bool,
    /// `maxOccurs` is greater than one.
    pub plural: bool,
    pub optional: bool,
}

impl Element {
    pub const TAG_NAME: &'static str = "element";
    pub const WILDCARD_TAG_NAME: &'static str = "any";

    pub fn new(name: QName, type_name: QName) -> Self {
        Self {
            name,
            type_name,
            wildcard: false,
            plural: false,
            optional: false,
        }
    }
}
