use std::collections::HashSet;

use syn::{parse_quote, Ident};

use super::{
    codec::record_methods,
    config::Config,
    naming::{constant_ident, field_ident, name_to_ident},
    spec::{Constant, Field, TypeExpr, TypeSpec},
};
use crate::xsd::{Builtin, ComplexType, QName, Schema, SimpleType, Type};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BuiltinSource {
    RustPrimitive,
    HelperType,
}

fn get_builtin_source_name(builtin: Builtin) -> (BuiltinSource, &'static str) {
    use BuiltinSource::*;
    match builtin.local_name() {
        "boolean" => (RustPrimitive, "bool"),
        "double" => (RustPrimitive, "f64"),
        "float" => (RustPrimitive, "f32"),
        "long" => (RustPrimitive, "i64"),
        "int" => (RustPrimitive, "i32"),
        "short" => (RustPrimitive, "i16"),
        "byte" => (RustPrimitive, "i8"),
        "unsignedLong" => (RustPrimitive, "u64"),
        "unsignedInt" => (RustPrimitive, "u32"),
        "unsignedShort" => (RustPrimitive, "u16"),
        "unsignedByte" => (RustPrimitive, "u8"),
        "string" => (RustPrimitive, "String"),
        "anyType" => (HelperType, "AnyType"),
        "anySimpleType" => (HelperType, "AnySimpleType"),
        "anyAtomicType" => (HelperType, "AnyAtomicType"),
        "decimal" => (HelperType, "Decimal"),
        "integer" => (HelperType, "Integer"),
        "nonPositiveInteger" => (HelperType, "NonPositiveInteger"),
        "negativeInteger" => (HelperType, "NegativeInteger"),
        "nonNegativeInteger" => (HelperType, "NonNegativeInteger"),
        "positiveInteger" => (HelperType, "PositiveInteger"),
        "dateTime" => (HelperType, "DateTime"),
        "dateTimeStamp" => (HelperType, "DateTimeStamp"),
        "duration" => (HelperType, "Duration"),
        "yearMonthDuration" => (HelperType, "YearMonthDuration"),
        "dayTimeDuration" => (HelperType, "DayTimeDuration"),
        "time" => (HelperType, "Time"),
        "date" => (HelperType, "Date"),
        "gMonth" => (HelperType, "GMonth"),
        "gMonthDay" => (HelperType, "GMonthDay"),
        "gDay" => (HelperType, "GDay"),
        "gYear" => (HelperType, "GYear"),
        "gYearMonth" => (HelperType, "GYearMonth"),
        "hexBinary" => (HelperType, "HexBinary"),
        "base64Binary" => (HelperType, "Base64Binary"),
        "anyURI" => (HelperType, "AnyURI"),
        "QName" => (HelperType, "QName"),
        "NOTATION" => (HelperType, "Notation"),
        "normalizedString" => (HelperType, "NormalizedString"),
        "token" => (HelperType, "Token"),
        "language" => (HelperType, "Language"),
        "NMTOKEN" => (HelperType, "NmToken"),
        "NMTOKENS" => (HelperType, "NmTokens"),
        "Name" => (HelperType, "Name"),
        "NCName" => (HelperType, "NcName"),
        "ID" => (HelperType, "Id"),
        "IDREF" => (HelperType, "IdRef"),
        "IDREFS" => (HelperType, "IdRefs"),
        "ENTITY" => (HelperType, "Entity"),
        "ENTITIES" => (HelperType, "Entities"),
        // every name in the built-in table is covered above
        _ => (HelperType, "AnySimpleType"),
    }
}

impl Config {
    /// The Rust type that values of the schema type `name` are stored as.
    pub fn type_expr(&self, name: &QName) -> syn::Type {
        match Builtin::from_name(name) {
            Some(builtin) => {
                let (source, name) = get_builtin_source_name(builtin);
                let ident = Ident::new(name, proc_macro2::Span::call_site());
                match source {
                    BuiltinSource::RustPrimitive => parse_quote!(#ident),
                    BuiltinSource::HelperType => parse_quote!(xsd_codegen_builtins::#ident),
                }
            }
            None => {
                let ident = self.type_ident(name);
                parse_quote!(#ident)
            }
        }
    }

    /// Translates a schema type into a draft declaration. Built-in types have no declaration of
    /// their own.
    pub fn translate(&self, schema: &Schema, type_: &Type) -> Option<TypeSpec> {
        match type_ {
            Type::Builtin(_) => None,
            Type::Simple(simple) => Some(self.translate_simple(simple)),
            Type::Complex(complex) => Some(self.translate_complex(schema, complex)),
        }
    }

    fn translate_simple(&self, simple: &SimpleType) -> TypeSpec {
        TypeSpec::new(
            self.type_ident(&simple.name),
            simple.name.clone(),
            TypeExpr::Alias(self.type_expr(&simple.base)),
        )
    }

    fn translate_complex(&self, schema: &Schema, complex: &ComplexType) -> TypeSpec {
        let (attributes, elements) = self.filter_fields(complex);
        let mut taken = HashSet::new();
        let mut unique = |name: String| -> Ident {
            let ident = field_ident(&name);
            let mut candidate = ident.to_string();
            let mut n = 1;
            while !taken.insert(candidate.clone()) {
                n += 1;
                candidate = format!("{}_{n}", ident.to_string().trim_start_matches("r#"));
            }
            if n == 1 {
                ident
            } else {
                name_to_ident(&candidate)
            }
        };

        let mut constant_names = HashSet::new();
        let mut unique_constant = |name: &str| -> Ident {
            let ident = constant_ident(name);
            let mut candidate = ident.to_string();
            let mut n = 1;
            while !constant_names.insert(candidate.clone()) {
                n += 1;
                candidate = format!("{ident}_{n}");
            }
            if n == 1 {
                ident
            } else {
                name_to_ident(&candidate)
            }
        };

        let mut fields = Vec::new();
        let mut constants = Vec::new();
        for attribute in &attributes {
            let name = self.attribute_name(&attribute.name);
            if let Some(fixed) = &attribute.fixed {
                constants.push(Constant {
                    ident: unique_constant(&name),
                    value: fixed.clone(),
                });
                continue;
            }
            let ty = self.type_expr(&attribute.type_name);
            fields.push(Field {
                ident: unique(name),
                ty: if attribute.optional {
                    parse_quote!(Option<#ty>)
                } else {
                    ty
                },
                tag: Some(format!("{},attr", attribute.name.local_name)),
            });
        }

        for element in &elements {
            let mut ty = self.type_expr(&element.type_name);
            if element.plural {
                ty = parse_quote!(Vec<#ty>);
            } else {
                if element.type_name == complex.name {
                    // a struct can't contain itself directly
                    ty = parse_quote!(Box<#ty>);
                }
                if element.optional {
                    ty = parse_quote!(Option<#ty>);
                }
            }
            let tag = if element.wildcard {
                ",any".to_string()
            } else {
                match &element.name.namespace_name {
                    Some(namespace) => format!("{} {}", namespace, element.name.local_name),
                    None => element.name.local_name.clone(),
                }
            };
            fields.push(Field {
                ident: unique(self.element_name(&element.name)),
                ty,
                tag: Some(tag),
            });
        }

        if let Some(base) = complex.base.as_ref() {
            if schema.find_type(base).is_none() {
                self.logf(format_args!(
                    "base type {} of {} is not defined",
                    base, complex.name
                ));
            }
        }

        let methods = match record_methods(&fields) {
            Ok(methods) => methods,
            Err(err) => {
                self.errorf(format_args!(
                    "could not generate the codec of {}: {err}",
                    complex.name
                ));
                Vec::new()
            }
        };

        let mut spec = TypeSpec::new(
            self.type_ident(&complex.name),
            complex.name.clone(),
            TypeExpr::Struct(fields),
        );
        spec.constants = constants;
        spec.methods = methods;
        spec
    }
}
