use std::collections::HashMap;

use super::{
    builtins::Builtin, complex_type_def::ComplexType, simple_type_def::SimpleType,
    xstypes::QName,
};

/// A type definition of the schema graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Builtin(Builtin),
    Simple(SimpleType),
    Complex(ComplexType),
}

impl Type {
    pub fn name(&self) -> QName {
        match self {
            Self::Builtin(builtin) => builtin.name(),
            Self::Simple(simple) => simple.name.clone(),
            Self::Complex(complex) => complex.name.clone(),
        }
    }

    pub fn base(&self) -> Option<&QName> {
        match self {
            Self::Builtin(_) => None,
            Self::Simple(simple) => Some(&simple.base),
            Self::Complex(complex) => complex.base.as_ref(),
        }
    }

    pub fn complex(&self) -> Option<&ComplexType> {
        match self {
            Self::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

/// The types of one schema document, in declaration order, plus the XSD built-ins.
#[derive(Clone, Debug)]
pub struct Schema {
    pub target_namespace: Option<String>,
    types: Vec<Type>,
    lookup: HashMap<QName, usize>,
}

impl Schema {
    pub fn new(target_namespace: Option<String>) -> Self {
        let mut schema = Self {
            target_namespace,
            types: Vec::new(),
            lookup: HashMap::new(),
        };
        for builtin in Builtin::all() {
            schema.add_type(Type::Builtin(builtin));
        }
        schema
    }

    /// Adds a type definition. A definition with the same name replaces the previous one, which
    /// is returned.
    pub fn add_type(&mut self, type_: Type) -> Option<Type> {
        let name = type_.name();
        match self.lookup.get(&name) {
            Some(&index) => Some(std::mem::replace(&mut self.types[index], type_)),
            None => {
                self.lookup.insert(name, self.types.len());
                self.types.push(type_);
                None
            }
        }
    }

    pub fn find_type(&self, name: &QName) -> Option<&Type> {
        self.lookup.get(name).map(|&index| &self.types[index])
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// Types declared by the schema document, i.e. everything but the built-ins.
    pub fn declared_types(&self) -> impl Iterator<Item = &Type> {
        self.types.iter().filter(|type_| !type_.is_builtin())
    }

    /// Walks from `complex_type` (inclusive) up its chain of base types.
    pub fn ancestors<'a>(&'a self, complex_type: &'a ComplexType) -> Ancestors<'a> {
        Ancestors {
            schema: self,
            next: Some(Ancestor::Complex(complex_type)),
            // a chain can't be longer than the number of types unless it is cyclic
            remaining: self.types.len() + 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ancestor<'a> {
    Complex(&'a ComplexType),
    /// A base that is a simple or built-in type.
    Other(&'a Type),
    /// A base name the schema has no definition for.
    Unresolved(&'a QName),
}

pub struct Ancestors<'a> {
    schema: &'a Schema,
    next: Option<Ancestor<'a>>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Ancestor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next.take()?;
        if let Ancestor::Complex(complex) = current {
            let schema = self.schema;
            self.next = complex
                .base
                .as_ref()
                .map(|base| match schema.find_type(base) {
                    Some(Type::Complex(base)) => Ancestor::Complex(base),
                    Some(other) => Ancestor::Other(other),
                    None => Ancestor::Unresolved(base),
                });
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::builtins::xs_name;

    fn complex(name: &str, base: Option<QName>) -> ComplexType {
        let mut complex = ComplexType::new(QName::local(name));
        complex.base = base;
        complex
    }

    fn chain_names(schema: &Schema, start: &ComplexType) -> Vec<String> {
        schema
            .ancestors(start)
            .map(|ancestor| match ancestor {
                Ancestor::Complex(c) => c.name.local_name.clone(),
                Ancestor::Other(t) => format!("other:{}", t.name().local_name),
                Ancestor::Unresolved(n) => format!("unresolved:{}", n.local_name),
            })
            .collect()
    }

    #[test]
    fn builtins_are_registered() {
        let schema = Schema::new(None);
        assert!(matches!(
            schema.find_type(&xs_name("int")),
            Some(Type::Builtin(_))
        ));
        assert_eq!(schema.declared_types().count(), 0);
    }

    #[test]
    fn add_type_replaces_same_name() {
        let mut schema = Schema::new(None);
        assert!(schema.add_type(Type::Complex(complex("A", None))).is_none());
        let previous = schema.add_type(Type::Complex(complex("A", Some(QName::local("B")))));
        assert!(previous.is_some());
        assert_eq!(schema.declared_types().count(), 1);
    }

    #[test]
    fn ancestors_walk_up_to_the_root() {
        let mut schema = Schema::new(None);
        schema.add_type(Type::Complex(complex("Root", None)));
        schema.add_type(Type::Complex(complex("Middle", Some(QName::local("Root")))));
        let leaf = complex("Leaf", Some(QName::local("Middle")));
        assert_eq!(chain_names(&schema, &leaf), ["Leaf", "Middle", "Root"]);
    }

    #[test]
    fn ancestors_report_non_complex_bases() {
        let schema = Schema::new(None);
        let leaf = complex("Leaf", Some(xs_name("string")));
        assert_eq!(chain_names(&schema, &leaf), ["Leaf", "other:string"]);
        let leaf = complex("Leaf", Some(QName::local("Missing")));
        assert_eq!(chain_names(&schema, &leaf), ["Leaf", "unresolved:Missing"]);
    }

    #[test]
    fn ancestors_stop_on_cycles() {
        let mut schema = Schema::new(None);
        schema.add_type(Type::Complex(complex("A", Some(QName::local("B")))));
        schema.add_type(Type::Complex(complex("B", Some(QName::local("A")))));
        let start = complex("A", Some(QName::local("B")));
        assert_eq!(
            schema.ancestors(&start).count(),
            schema.types().len() + 1
        );
    }
}
