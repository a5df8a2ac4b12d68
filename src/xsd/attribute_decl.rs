use std::collections::BTreeMap;

use super::xstypes::QName;

/// Namespace bindings in scope at a declaration, keyed by prefix. The default namespace is
/// stored under the empty prefix.
pub type Namespaces = BTreeMap<String, String>;

/// An attribute of a complex type.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub type_name: QName,
    /// Value the attribute always takes; such attributes are emitted as constants.
    pub fixed: Option<String>,
    pub optional: bool,
    /// Attributes from foreign namespaces on the declaration, such as `wsdl:arrayType`.
    pub annotations: Vec<(QName, String)>,
    pub namespaces: Namespaces,
}

impl Attribute {
    pub const TAG_NAME: &'static str = "attribute";

    pub fn new(name: QName, type_name: QName) -> Self {
        Self {
            name,
            type_name,
            fixed: None,
            optional: true,
            annotations: Vec::new(),
            namespaces: Namespaces::new(),
        }
    }

    pub fn annotation(&self, name: &QName) -> Option<&str> {
        self.annotations
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Resolves a `prefix:local` value against the namespaces in scope at this declaration.
    /// Unknown prefixes are kept verbatim as the namespace, so the name will not match anything.
    pub fn resolve(&self, value: &str) -> QName {
        let value = value.trim();
        match value.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self
                    .namespaces
                    .get(prefix)
                    .cloned()
                    .unwrap_or_else(|| prefix.to_string());
                QName::with_namespace(namespace, local)
            }
            None => QName::with_optional_namespace(self.namespaces.get("").cloned(), value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute_with_scope() -> Attribute {
        let mut attribute = Attribute::new(QName::local("arrayType"), QName::local("string"));
        attribute
            .namespaces
            .insert("xs".into(), "http://www.w3.org/2001/XMLSchema".into());
        attribute.namespaces.insert("".into(), "urn:default".into());
        attribute
    }

    #[test]
    fn resolve_uses_bound_prefix() {
        let name = attribute_with_scope().resolve(" xs:int[] ");
        assert_eq!(
            name,
            QName::with_namespace("http://www.w3.org/2001/XMLSchema", "int[]")
        );
    }

    #[test]
    fn resolve_unprefixed_uses_default_namespace() {
        let name = attribute_with_scope().resolve("Item");
        assert_eq!(name, QName::with_namespace("urn:default", "Item"));
    }

    #[test]
    fn resolve_keeps_unknown_prefix() {
        let name = attribute_with_scope().resolve("nope:Item");
        assert_eq!(name, QName::with_namespace("nope", "Item"));
    }
}
