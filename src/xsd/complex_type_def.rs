use super::{attribute_decl::Attribute, element_decl::Element, xstypes::QName};

/// A named complex type with its attributes and elements in document order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexType {
    pub name: QName,
    /// Base of a `complexContent` or `simpleContent` derivation; `None` stands for `xs:anyType`.
    pub base: Option<QName>,
    pub attributes: Vec<Attribute>,
    pub elements: Vec<Element>,
}

impl ComplexType {
    pub const TAG_NAME: &'static str = "complexType";

    pub fn new(name: QName) -> Self {
        Self {
            name,
            base: None,
            attributes: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn wildcard(&self) -> Option<&Element> {
        self.elements.iter().find(|element| element.wildcard)
    }
}
