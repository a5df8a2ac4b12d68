//! SOAP-encoded arrays.
//!
//! A SOAP array type is declared by restricting `soapenc:Array`, whose content is a wildcard
//! element, and annotating the `arrayType` attribute with the item type:
//!
//! ```xml
//! <xs:complexType name="IntArray">
//!   <xs:complexContent>
//!     <xs:restriction base="soapenc:Array">
//!       <xs:attribute ref="soapenc:arrayType" wsdl:arrayType="xs:int[]"/>
//!     </xs:restriction>
//!   </xs:complexContent>
//! </xs:complexType>
//! ```
//!
//! The wildcard element of such a type is retyped to the annotated item type.

use super::config::Config;
use crate::xsd::{Ancestor, ComplexType, Element, QName, Schema, Type, WSDL_NAMESPACE};

/// Result of looking for a wildcard element along a type's base chain.
#[derive(Clone, Debug)]
pub enum WildcardSearch<'a> {
    /// The first wildcard element found, and the type declaring it.
    Found {
        owner: &'a ComplexType,
        element: &'a Element,
    },
    NotFound,
    /// The chain reached a base that isn't a complex type.
    ChainBroken(QName),
    /// The chain reached a base the schema doesn't define.
    BaseUndefined(QName),
}

pub fn find_wildcard<'a>(schema: &'a Schema, complex_type: &'a ComplexType) -> WildcardSearch<'a> {
    for ancestor in schema.ancestors(complex_type) {
        match ancestor {
            Ancestor::Complex(owner) => {
                if let Some(element) = owner.wildcard() {
                    return WildcardSearch::Found { owner, element };
                }
            }
            Ancestor::Other(type_) => return WildcardSearch::ChainBroken(type_.name()),
            Ancestor::Unresolved(name) => return WildcardSearch::BaseUndefined(name.clone()),
        }
    }
    WildcardSearch::NotFound
}

/// Strips whitespace and one trailing `[]` from an array type reference.
fn item_type_name(mut name: QName) -> QName {
    let trimmed = name.local_name.trim();
    name.local_name = trimmed.strip_suffix("[]").unwrap_or(trimmed).to_string();
    name
}

impl Config {
    /// Finds the `wsdl:arrayType` annotation of a complex type and retypes its wildcard element
    /// to the annotated item type. The annotation's value becomes the fixed value of the
    /// attribute.
    pub fn parse_soap_array_type(&self, schema: &Schema, type_: Type) -> Type {
        let mut complex = match type_ {
            Type::Complex(complex) => complex,
            other => return other,
        };

        let annotation = QName::with_namespace(WSDL_NAMESPACE, "arrayType");
        let mut item_type = None;
        // only the first arrayType attribute is considered
        if let Some(attribute) = complex
            .attributes
            .iter_mut()
            .find(|attribute| attribute.name.local_name == "arrayType")
        {
            if let Some(value) = attribute.annotation(&annotation).map(str::to_string) {
                item_type = Some(attribute.resolve(&value));
                attribute.fixed = Some(value);
            }
        }
        let Some(item_type) = item_type.map(item_type_name) else {
            return Type::Complex(complex);
        };

        match schema.find_type(&item_type) {
            Some(_) => Type::Complex(self.override_wildcard_type(schema, complex, item_type)),
            None => {
                self.logf(format_args!(
                    "could not lookup item type {:?} in namespace {:?}",
                    item_type.local_name,
                    item_type.namespace_name.as_deref().unwrap_or_default()
                ));
                Type::Complex(complex)
            }
        }
    }

    /// Sets the type of the nearest wildcard element in `complex_type`'s base chain to
    /// `item_type`. Wildcards declared by `complex_type` itself are replaced in place; a
    /// wildcard inherited from a base is appended.
    pub fn override_wildcard_type(
        &self,
        schema: &Schema,
        mut complex_type: ComplexType,
        item_type: QName,
    ) -> ComplexType {
        let found = match find_wildcard(schema, &complex_type) {
            WildcardSearch::Found { element, .. } => Some(element.clone()),
            WildcardSearch::ChainBroken(base) => {
                self.logf(format_args!(
                    "warning: soap-encoded array {} extends non-complex type {}",
                    complex_type.name.local_name, base.local_name
                ));
                None
            }
            WildcardSearch::BaseUndefined(base) => {
                self.logf(format_args!(
                    "base {} of soap-encoded array {} is not defined",
                    base, complex_type.name.local_name
                ));
                None
            }
            WildcardSearch::NotFound => {
                self.logf(format_args!(
                    "could not override wildcard type for {}; not found in type hierarchy",
                    complex_type.name.local_name
                ));
                None
            }
        };
        let Some(mut element) = found else {
            return complex_type;
        };

        self.debugf(format_args!(
            "overriding wildcard element of {} type from {} to {}",
            complex_type.name.local_name, element.type_name.local_name, item_type.local_name
        ));
        element.type_name = item_type;

        let mut replaced = false;
        for own in complex_type.elements.iter_mut().filter(|own| own.wildcard) {
            *own = element.clone();
            replaced = true;
        }
        if !replaced {
            complex_type.elements.push(element);
        }
        complex_type
    }
}
