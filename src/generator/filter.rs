use std::{collections::HashSet, fmt, sync::Arc};

use regex::Regex;

use super::config::Config;
use crate::xsd::{Attribute, Element, Type};

/// A schema entity that can be filtered by name.
pub trait Entity {
    fn local_name(&self) -> &str;
}

impl Entity for Attribute {
    fn local_name(&self) -> &str {
        &self.name.local_name
    }
}

impl Entity for Element {
    fn local_name(&self) -> &str {
        &self.name.local_name
    }
}

impl Entity for Type {
    fn local_name(&self) -> &str {
        match self {
            Type::Builtin(builtin) => builtin.local_name(),
            Type::Simple(simple) => &simple.name.local_name,
            Type::Complex(complex) => &complex.name.local_name,
        }
    }
}

/// Decides which entities of kind `T` are left out of the generated code. A filter for one kind
/// can't be handed an entity of another.
pub struct PropertyFilter<T> {
    excludes: Arc<dyn Fn(&Config, &T) -> bool>,
}

impl<T: Entity + 'static> PropertyFilter<T> {
    /// `excludes` returns true for entities that should be left out.
    pub fn new(excludes: impl Fn(&Config, &T) -> bool + 'static) -> Self {
        Self {
            excludes: Arc::new(excludes),
        }
    }

    /// Excludes entities with one of these local names.
    pub fn ignore<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<String> = names.into_iter().map(Into::into).collect();
        Self::new(move |_: &Config, entity: &T| names.contains(entity.local_name()))
    }

    /// Excludes entities whose local name matches none of `patterns`. If the patterns don't form
    /// a valid regular expression, nothing is excluded and every use is reported.
    pub fn only<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&pattern) {
            Ok(regex) => {
                Self::new(move |_: &Config, entity: &T| !regex.is_match(entity.local_name()))
            }
            Err(err) => Self::new(move |config: &Config, _: &T| {
                config.logf(format_args!(
                    "invalid regex {pattern:?} passed to OnlyTypes: {err}"
                ));
                false
            }),
        }
    }
}

impl<T> PropertyFilter<T> {
    pub fn excludes(&self, config: &Config, entity: &T) -> bool {
        (self.excludes)(config, entity)
    }
}

impl<T> Clone for PropertyFilter<T> {
    fn clone(&self) -> Self {
        Self {
            excludes: self.excludes.clone(),
        }
    }
}

impl<T> PartialEq for PropertyFilter<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.excludes, &other.excludes)
    }
}

impl<T> fmt::Debug for PropertyFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyFilter").finish_non_exhaustive()
    }
}
