use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node, NodeId};

use super::{
    attribute_decl::Attribute,
    builtins::{is_any_type, xs_name, XS_ANY_SIMPLE_TYPE, XS_ANY_TYPE, XS_NAMESPACE},
    complex_type_def::ComplexType,
    element_decl::Element,
    error::LoadError,
    schema::{Schema, Type},
    simple_type_def::SimpleType,
    xstypes::QName,
};

const MODEL_GROUPS: [&str; 3] = ["sequence", "choice", "all"];

/// Reads the type definitions of a `<schema>` document.
///
/// Only the parts of a schema that matter for type generation are mapped: named and anonymous
/// complex types with their attributes and (flattened) element particles, and simple types
/// reduced to their restriction base. Imports, groups and identity constraints are ignored.
pub fn read_schema(document: &Document) -> Result<Schema, LoadError> {
    let schema_node = document.root_element();
    if schema_node.tag_name().name() != "schema" {
        return Err(LoadError::NotASchema(
            schema_node.tag_name().name().to_string(),
        ));
    }
    let mut context = MappingContext::new(schema_node)?;
    context.map_schema()?;
    Ok(context.schema)
}

pub fn parse_schema(source: &str) -> Result<Schema, LoadError> {
    let document = Document::parse(source)?;
    read_schema(&document)
}

struct MappingContext<'a, 'input> {
    schema_node: Node<'a, 'input>,
    schema: Schema,
    /// Type of every top-level element, for resolving `<element ref="..."/>`.
    element_types: HashMap<QName, QName>,
    /// Names given to anonymous complex types of top-level elements.
    hoisted: HashMap<NodeId, QName>,
    /// Local names already taken by type definitions.
    reserved: HashSet<String>,
    /// Complex types derived by extension, in mapping order.
    extended: Vec<QName>,
    elements_qualified: bool,
    attributes_qualified: bool,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    fn new(schema_node: Node<'a, 'input>) -> Result<Self, LoadError> {
        let target_namespace = schema_node.attribute("targetNamespace").map(str::to_string);
        let reserved = schema_node
            .children()
            .filter(|child| {
                matches!(
                    child.tag_name().name(),
                    ComplexType::TAG_NAME | SimpleType::TAG_NAME
                )
            })
            .filter_map(|child| child.attribute("name"))
            .map(str::to_string)
            .collect();
        Ok(Self {
            schema_node,
            schema: Schema::new(target_namespace),
            element_types: HashMap::new(),
            hoisted: HashMap::new(),
            reserved,
            extended: Vec::new(),
            elements_qualified: form_default(schema_node, "elementFormDefault")?,
            attributes_qualified: form_default(schema_node, "attributeFormDefault")?,
        })
    }

    fn target_name(&self, local_name: &str) -> QName {
        QName::with_optional_namespace(self.schema.target_namespace.clone(), local_name)
    }

    fn map_schema(&mut self) -> Result<(), LoadError> {
        let schema_node = self.schema_node;

        // Element types first, so references can be resolved while mapping types
        for element in children_named(schema_node, Element::TAG_NAME) {
            let name = self.target_name(required_attribute(element, "name")?);
            let type_name = if let Some(type_) = element.attribute("type") {
                QName::parse(type_, element)?
            } else if let Some(inline) = child_named(element, ComplexType::TAG_NAME) {
                let hoisted = self.hoisted_name(&name.local_name);
                self.hoisted.insert(inline.id(), hoisted.clone());
                hoisted
            } else if let Some(inline) = child_named(element, SimpleType::TAG_NAME) {
                restriction_base(inline)?
            } else {
                xs_name(XS_ANY_TYPE)
            };
            self.element_types.insert(name, type_name);
        }

        for child in schema_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                ComplexType::TAG_NAME => {
                    let name = self.target_name(required_attribute(child, "name")?);
                    self.map_complex_type(child, name)?;
                }
                SimpleType::TAG_NAME => {
                    let name = self.target_name(required_attribute(child, "name")?);
                    let base = restriction_base(child)?;
                    self.schema.add_type(Type::Simple(SimpleType { name, base }));
                }
                Element::TAG_NAME => {
                    if let Some(inline) = child_named(child, ComplexType::TAG_NAME) {
                        if let Some(name) = self.hoisted.get(&inline.id()).cloned() {
                            self.map_complex_type(inline, name)?;
                        }
                    }
                }
                _ => {}
            }
        }

        let mut inherited = HashSet::new();
        for name in &self.extended {
            inherit_base_content(
                &mut self.schema,
                &self.extended,
                name,
                &mut inherited,
                &mut Vec::new(),
            );
        }
        Ok(())
    }

    /// Picks a free type name for an anonymous type, based on the name of its element.
    fn hoisted_name(&mut self, element_name: &str) -> QName {
        let mut candidate = element_name.to_string();
        while !self.reserved.insert(candidate.clone()) {
            candidate.push_str("Inner");
        }
        self.target_name(&candidate)
    }

    fn map_complex_type(&mut self, node: Node, name: QName) -> Result<(), LoadError> {
        let mut complex_type = ComplexType::new(name);

        let mut content = node;
        let derivation = child_named(node, "complexContent")
            .or_else(|| child_named(node, "simpleContent"))
            .and_then(|wrapper| {
                wrapper.children().find(|child| {
                    matches!(child.tag_name().name(), "extension" | "restriction")
                })
            });
        if let Some(derivation) = derivation {
            let base = QName::parse(required_attribute(derivation, "base")?, derivation)?;
            complex_type.base = Some(base).filter(|base| !is_any_type(base));
            if derivation.tag_name().name() == "extension" && complex_type.base.is_some() {
                self.extended.push(complex_type.name.clone());
            }
            content = derivation;
        }

        for child in content.children().filter(Node::is_element) {
            let tag_name = child.tag_name().name();
            if MODEL_GROUPS.contains(&tag_name) {
                self.map_model_group(child, false, false, &mut complex_type)?;
            } else if tag_name == Attribute::TAG_NAME {
                let attribute = self.map_attribute(child)?;
                complex_type.attributes.push(attribute);
            }
        }

        self.schema.add_type(Type::Complex(complex_type));
        Ok(())
    }

    /// Flattens a model group into `owner`'s element list. Repetition and optionality of
    /// enclosing groups carry over to their particles.
    fn map_model_group(
        &mut self,
        group: Node,
        plural: bool,
        optional: bool,
        owner: &mut ComplexType,
    ) -> Result<(), LoadError> {
        let (min_occurs, max_occurs) = occurs(group)?;
        let plural = plural || max_occurs > 1;
        let optional = optional || min_occurs == 0;
        let choice = group.tag_name().name() == "choice";

        for particle in group.children().filter(Node::is_element) {
            let tag_name = particle.tag_name().name();
            if MODEL_GROUPS.contains(&tag_name) {
                self.map_model_group(particle, plural, optional || choice, owner)?;
                continue;
            }

            let mut element = match tag_name {
                Element::TAG_NAME => self.map_element(particle)?,
                Element::WILDCARD_TAG_NAME => {
                    let mut wildcard =
                        Element::new(QName::local(Element::WILDCARD_TAG_NAME), xs_name(XS_ANY_TYPE));
                    wildcard.wildcard = true;
                    wildcard
                }
                _ => continue,
            };
            let (min_occurs, max_occurs) = occurs(particle)?;
            element.plural = plural || max_occurs > 1;
            element.optional = optional || choice || min_occurs == 0;
            owner.elements.push(element);
        }
        Ok(())
    }

    fn map_element(&mut self, node: Node) -> Result<Element, LoadError> {
        if let Some(reference) = node.attribute("ref") {
            let name = QName::parse(reference, node)?;
            let type_name = self
                .element_types
                .get(&name)
                .cloned()
                .unwrap_or_else(|| xs_name(XS_ANY_TYPE));
            return Ok(Element::new(name, type_name));
        }

        let local_name = required_attribute(node, "name")?;
        let name = if form(node, self.elements_qualified)? {
            self.target_name(local_name)
        } else {
            QName::local(local_name)
        };
        let type_name = if let Some(type_) = node.attribute("type") {
            QName::parse(type_, node)?
        } else if let Some(inline) = child_named(node, ComplexType::TAG_NAME) {
            let hoisted = self.hoisted_name(local_name);
            self.map_complex_type(inline, hoisted.clone())?;
            hoisted
        } else if let Some(inline) = child_named(node, SimpleType::TAG_NAME) {
            restriction_base(inline)?
        } else {
            xs_name(XS_ANY_TYPE)
        };
        Ok(Element::new(name, type_name))
    }

    fn map_attribute(&mut self, node: Node) -> Result<Attribute, LoadError> {
        let name = match node.attribute("ref") {
            Some(reference) => QName::parse(reference, node)?,
            None => {
                let local_name = required_attribute(node, "name")?;
                if form(node, self.attributes_qualified)? {
                    self.target_name(local_name)
                } else {
                    QName::local(local_name)
                }
            }
        };
        let type_name = match (node.attribute("type"), child_named(node, SimpleType::TAG_NAME)) {
            (Some(type_), _) => QName::parse(type_, node)?,
            (None, Some(inline)) => restriction_base(inline)?,
            (None, None) => xs_name(XS_ANY_SIMPLE_TYPE),
        };

        let mut attribute = Attribute::new(name, type_name);
        attribute.fixed = node.attribute("fixed").map(str::to_string);
        attribute.optional = node.attribute("use") != Some("required");
        attribute.annotations = node
            .attributes()
            .filter_map(|foreign| {
                let namespace = foreign.namespace().filter(|ns| *ns != XS_NAMESPACE)?;
                Some((
                    QName::with_namespace(namespace, foreign.name()),
                    foreign.value().to_string(),
                ))
            })
            .collect();
        attribute.namespaces = node
            .namespaces()
            .map(|ns| (ns.name().unwrap_or_default().to_string(), ns.uri().to_string()))
            .collect();
        Ok(attribute)
    }
}

/// Puts the attributes and elements of `name`'s base type in front of its own. Bases that are
/// extensions themselves are expanded first. Returns false if `name` is on a derivation cycle, in
/// which case it keeps only its own content.
fn inherit_base_content(
    schema: &mut Schema,
    extended: &[QName],
    name: &QName,
    inherited: &mut HashSet<QName>,
    visiting: &mut Vec<QName>,
) -> bool {
    if inherited.contains(name) {
        return true;
    }
    if visiting.contains(name) {
        return false;
    }
    let Some(base) = schema.find_type(name).and_then(Type::base).cloned() else {
        return true;
    };
    visiting.push(name.clone());
    let acyclic = !extended.contains(&base)
        || inherit_base_content(schema, extended, &base, inherited, visiting);
    visiting.pop();
    if !acyclic {
        return false;
    }

    let base_content = schema.find_type(&base).and_then(Type::complex).cloned();
    let derived = schema.find_type(name).and_then(Type::complex).cloned();
    if let (Some(mut content), Some(mut derived)) = (base_content, derived) {
        content.attributes.append(&mut derived.attributes);
        content.elements.append(&mut derived.elements);
        derived.attributes = content.attributes;
        derived.elements = content.elements;
        schema.add_type(Type::Complex(derived));
    }
    inherited.insert(name.clone());
    true
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn child_named<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children_named(node, name).next()
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str, LoadError> {
    node.attribute(attribute)
        .ok_or_else(|| LoadError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

/// `minOccurs` and `maxOccurs`; `unbounded` maps to `u64::MAX`.
fn occurs(node: Node) -> Result<(u64, u64), LoadError> {
    let parse = |attribute: &'static str| -> Result<u64, LoadError> {
        match node.attribute(attribute) {
            None => Ok(1),
            Some("unbounded") if attribute == "maxOccurs" => Ok(u64::MAX),
            Some(value) => value.trim().parse().map_err(|_| LoadError::InvalidAttribute {
                attribute,
                value: value.to_string(),
            }),
        }
    };
    Ok((parse("minOccurs")?, parse("maxOccurs")?))
}

fn form_default(schema_node: Node, attribute: &'static str) -> Result<bool, LoadError> {
    match schema_node.attribute(attribute) {
        None | Some("unqualified") => Ok(false),
        Some("qualified") => Ok(true),
        Some(value) => Err(LoadError::InvalidAttribute {
            attribute,
            value: value.to_string(),
        }),
    }
}

fn form(node: Node, default: bool) -> Result<bool, LoadError> {
    match node.attribute("form") {
        None => Ok(default),
        Some("qualified") => Ok(true),
        Some("unqualified") => Ok(false),
        Some(value) => Err(LoadError::InvalidAttribute {
            attribute: "form",
            value: value.to_string(),
        }),
    }
}

/// The base of a simple type's `<restriction>`. Lists and unions are read as strings.
fn restriction_base(simple_type: Node) -> Result<QName, LoadError> {
    match child_named(simple_type, "restriction") {
        Some(restriction) => QName::parse(required_attribute(restriction, "base")?, restriction),
        None => Ok(xs_name("string")),
    }
}
