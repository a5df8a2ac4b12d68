use check_keyword::CheckKeyword;
use heck::{ToShoutySnakeCase, ToSnakeCase};
use proc_macro2::Span;
use syn::Ident;

use super::config::{Config, NameSlot};
use crate::xsd::QName;

impl Config {
    fn transformed(&self, name: &QName, slot: Option<NameSlot>) -> String {
        let mut transformed = match self.name_slot(NameSlot::All) {
            Some(transform) => transform(self, &name.local_name),
            None => name.local_name.clone(),
        };
        if let Some(transform) = slot.and_then(|slot| self.name_slot(slot)) {
            transformed = transform(self, &transformed);
        }
        transformed
    }

    fn cased(&self, name: &QName, slot: Option<NameSlot>) -> String {
        let transformed = self.transformed(name, slot);
        let mut chars = transformed.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => {
                if !name.local_name.is_empty() {
                    self.logf(format_args!(
                        "name {} transformed to the empty string",
                        name.local_name
                    ));
                }
                "_".to_string()
            }
        }
    }

    /// The transformed name with its first character lower-cased.
    pub fn private(&self, name: &QName) -> String {
        self.cased(name, None)
    }

    /// The private name with its first character upper-cased.
    pub fn public(&self, name: &QName) -> String {
        capitalize(&self.private(name))
    }

    pub fn type_name(&self, name: &QName) -> String {
        capitalize(&self.cased(name, Some(NameSlot::Type)))
    }

    pub fn element_name(&self, name: &QName) -> String {
        self.cased(name, Some(NameSlot::Element))
    }

    pub fn attribute_name(&self, name: &QName) -> String {
        self.cased(name, Some(NameSlot::Attribute))
    }

    pub(crate) fn type_ident(&self, name: &QName) -> Ident {
        name_to_ident(&self.type_name(name))
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces characters that can't appear in an identifier.
fn sanitize(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.starts_with(|c: char| c.is_numeric()) {
        sanitized.insert(0, '_');
    }
    if sanitized.trim_matches('_').is_empty() {
        sanitized.push_str("unnamed");
    }
    sanitized
}

pub fn name_to_ident(name: &str) -> Ident {
    let name = sanitize(name);
    if ["crate", "self", "super", "Self"].contains(&name.as_str()) {
        // These are keywords that are not allowed as raw identifiers
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if name.as_str().is_keyword() {
        Ident::new_raw(&name, Span::call_site())
    } else {
        Ident::new(&name, Span::call_site())
    }
}

pub fn field_ident(name: &str) -> Ident {
    name_to_ident(&name.to_snake_case())
}

pub fn constant_ident(name: &str) -> Ident {
    name_to_ident(&name.to_shouty_snake_case())
}
