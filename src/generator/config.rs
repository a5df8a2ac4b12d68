use std::{fmt, mem, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;

use super::{filter::PropertyFilter, spec::TypeSpec};
use crate::xsd::{Attribute, ComplexType, Element, Schema, Type};

/// Rewrites the local name of a schema entity. Rules are chained: each one receives the output of
/// the rules installed before it.
pub type NameTransform = Arc<dyn Fn(&Config, &str) -> String>;
/// Rewrites a schema type before it is translated.
pub type TypeTransform = Arc<dyn Fn(&Config, &Schema, Type) -> Type>;
/// Rewrites a translated type declaration before it is rendered.
pub type SpecTransform = Arc<dyn Fn(&Config, TypeSpec) -> TypeSpec>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Info,
    Debug,
}

/// Receives diagnostics about the generation process.
pub trait Logger {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>);
}

/// Forwards diagnostics to the `tracing` macros of the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        match severity {
            Severity::Error => tracing::error!("{message}"),
            Severity::Info => tracing::info!("{message}"),
            Severity::Debug => tracing::debug!("{message}"),
        }
    }
}

/// Which of the name transform chains a rule is installed into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameSlot {
    /// Applies to every name.
    All,
    Type,
    Element,
    Attribute,
}

/// Overrides and filters used when generating code from a schema.
///
/// A `Config` starts out empty and is changed only through its setter methods (or
/// [`ConfigOption`]s). Every setter returns a [`Snapshot`] of the fields it overwrote, which
/// [`Config::restore`] puts back.
#[derive(Clone, Default)]
pub struct Config {
    logger: Option<Arc<dyn Logger>>,
    log_level: u8,
    package_name: Option<String>,
    preprocess_type: Option<TypeTransform>,
    postprocess_spec: Option<SpecTransform>,
    // Attributes for which this returns true won't be a part of any generated struct
    filter_attributes: Option<PropertyFilter<Attribute>>,
    // Elements for which this returns true won't be a part of any generated struct
    filter_elements: Option<PropertyFilter<Element>>,
    // Types for which this returns true won't be declared at all
    filter_types: Option<PropertyFilter<Type>>,
    all_name_transform: Option<NameTransform>,
    type_name_transform: Option<NameTransform>,
    element_name_transform: Option<NameTransform>,
    attribute_name_transform: Option<NameTransform>,
}

/// Previous values of the [`Config`] fields overwritten by one or more setters.
#[derive(Default)]
pub struct Snapshot(Vec<Saved>);

enum Saved {
    Logger(Option<Arc<dyn Logger>>, u8),
    PackageName(Option<String>),
    PreprocessType(Option<TypeTransform>),
    PostprocessSpec(Option<SpecTransform>),
    AttributeFilter(Option<PropertyFilter<Attribute>>),
    ElementFilter(Option<PropertyFilter<Element>>),
    TypeFilter(Option<PropertyFilter<Type>>),
    Names(NameSlot, Option<NameTransform>),
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&self.0.len()).finish()
    }
}

impl Config {
    /// A config with [`default_options`] applied.
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.option(default_options());
        config
    }

    pub(crate) fn errorf(&self, message: fmt::Arguments<'_>) {
        if let Some(logger) = &self.logger {
            logger.log(Severity::Error, message);
        }
    }

    pub(crate) fn logf(&self, message: fmt::Arguments<'_>) {
        if let Some(logger) = self.logger.as_ref().filter(|_| self.log_level > 0) {
            logger.log(Severity::Info, message);
        }
    }

    pub(crate) fn debugf(&self, message: fmt::Arguments<'_>) {
        if let Some(logger) = self.logger.as_ref().filter(|_| self.log_level > 3) {
            logger.log(Severity::Debug, message);
        }
    }

    pub fn get_package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    /// Applies `options` in order. The returned snapshot undoes all of them at once.
    pub fn option(&mut self, options: impl IntoIterator<Item = ConfigOption>) -> Snapshot {
        let mut undo = Vec::new();
        for option in options {
            let Snapshot(saved) = option.apply(self);
            undo.push(saved);
        }
        Snapshot(undo.into_iter().rev().flatten().collect())
    }

    /// Puts back the fields captured in `snapshot`. The returned snapshot redoes the change.
    pub fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        let mut redo: Vec<_> = snapshot.0.into_iter().map(|saved| self.swap(saved)).collect();
        redo.reverse();
        Snapshot(redo)
    }

    fn swap(&mut self, saved: Saved) -> Saved {
        match saved {
            Saved::Logger(logger, level) => Saved::Logger(
                mem::replace(&mut self.logger, logger),
                mem::replace(&mut self.log_level, level),
            ),
            Saved::PackageName(name) => {
                Saved::PackageName(mem::replace(&mut self.package_name, name))
            }
            Saved::PreprocessType(transform) => {
                Saved::PreprocessType(mem::replace(&mut self.preprocess_type, transform))
            }
            Saved::PostprocessSpec(transform) => {
                Saved::PostprocessSpec(mem::replace(&mut self.postprocess_spec, transform))
            }
            Saved::AttributeFilter(filter) => {
                Saved::AttributeFilter(mem::replace(&mut self.filter_attributes, filter))
            }
            Saved::ElementFilter(filter) => {
                Saved::ElementFilter(mem::replace(&mut self.filter_elements, filter))
            }
            Saved::TypeFilter(filter) => {
                Saved::TypeFilter(mem::replace(&mut self.filter_types, filter))
            }
            Saved::Names(slot, transform) => {
                Saved::Names(slot, mem::replace(self.name_slot_mut(slot), transform))
            }
        }
    }

    fn set(&mut self, value: Saved) -> Snapshot {
        Snapshot(vec![self.swap(value)])
    }

    fn name_slot_mut(&mut self, slot: NameSlot) -> &mut Option<NameTransform> {
        match slot {
            NameSlot::All => &mut self.all_name_transform,
            NameSlot::Type => &mut self.type_name_transform,
            NameSlot::Element => &mut self.element_name_transform,
            NameSlot::Attribute => &mut self.attribute_name_transform,
        }
    }

    pub(crate) fn name_slot(&self, slot: NameSlot) -> Option<&NameTransform> {
        match slot {
            NameSlot::All => self.all_name_transform.as_ref(),
            NameSlot::Type => self.type_name_transform.as_ref(),
            NameSlot::Element => self.element_name_transform.as_ref(),
            NameSlot::Attribute => self.attribute_name_transform.as_ref(),
        }
    }

    /// Sends diagnostics to `logger`. `level` ranges from 0 (errors only) to 5 (everything).
    pub fn error_log(&mut self, logger: Option<Arc<dyn Logger>>, level: u8) -> Snapshot {
        self.set(Saved::Logger(logger, level))
    }

    pub fn package_name(&mut self, name: impl Into<String>) -> Snapshot {
        self.set(Saved::PackageName(Some(name.into())))
    }

    pub fn filter_attributes(&mut self, filter: PropertyFilter<Attribute>) -> Snapshot {
        self.set(Saved::AttributeFilter(Some(filter)))
    }

    pub fn filter_elements(&mut self, filter: PropertyFilter<Element>) -> Snapshot {
        self.set(Saved::ElementFilter(Some(filter)))
    }

    pub fn filter_types(&mut self, filter: PropertyFilter<Type>) -> Snapshot {
        self.set(Saved::TypeFilter(Some(filter)))
    }

    /// Leaves attributes with one of these local names out of generated structs.
    pub fn ignore_attributes<I, S>(&mut self, names: I) -> Snapshot
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_attributes(PropertyFilter::ignore(names))
    }

    /// Leaves elements with one of these local names out of generated structs.
    pub fn ignore_elements<I, S>(&mut self, names: I) -> Snapshot
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_elements(PropertyFilter::ignore(names))
    }

    /// Only declares types whose local name matches one of `patterns`.
    pub fn only_types<I, S>(&mut self, patterns: I) -> Snapshot
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filter_types(PropertyFilter::only(patterns))
    }

    /// Installs `rule` at the end of a name transform chain.
    pub fn transform_names(&mut self, slot: NameSlot, rule: NameTransform) -> Snapshot {
        let prev = self.name_slot(slot).cloned();
        let chained: NameTransform = Arc::new(move |config: &Config, name: &str| match &prev {
            Some(prev) => rule(config, &prev(config, name)),
            None => rule(config, name),
        });
        self.set(Saved::Names(slot, Some(chained)))
    }

    /// Replaces every match of `pattern` with `replacement`. An invalid pattern leaves names
    /// alone and is reported each time it would have been used.
    pub fn replace_names(&mut self, slot: NameSlot, pattern: &str, replacement: &str) -> Snapshot {
        let replacement = replacement.to_string();
        let rule: NameTransform = match Regex::new(pattern) {
            Ok(regex) => Arc::new(move |_: &Config, name: &str| {
                regex.replace_all(name, replacement.as_str()).into_owned()
            }),
            Err(err) => {
                let pattern = pattern.to_string();
                Arc::new(move |config: &Config, name: &str| {
                    config.logf(format_args!(
                        "invalid regex {pattern:?} passed to ReplaceAllNames: {err}"
                    ));
                    name.to_string()
                })
            }
        };
        self.transform_names(slot, rule)
    }

    pub fn replace_all_names(&mut self, pattern: &str, replacement: &str) -> Snapshot {
        self.replace_names(NameSlot::All, pattern, replacement)
    }

    fn replace_all_names_regex(&mut self, regex: Regex, replacement: &'static str) -> Snapshot {
        self.transform_names(
            NameSlot::All,
            Arc::new(move |_: &Config, name: &str| regex.replace_all(name, replacement).into_owned()),
        )
    }

    /// Runs `transform` on every type before it is translated, after the transforms installed
    /// before it.
    pub fn process_types(&mut self, transform: TypeTransform) -> Snapshot {
        let prev = self.preprocess_type.clone();
        let chained: TypeTransform = Arc::new(move |config: &Config, schema: &Schema, type_: Type| {
            let type_ = match &prev {
                Some(prev) => prev(config, schema, type_),
                None => type_,
            };
            transform(config, schema, type_)
        });
        self.set(Saved::PreprocessType(Some(chained)))
    }

    /// Runs `transform` on every translated declaration, after the transforms installed before
    /// it.
    pub fn process_specs(&mut self, transform: SpecTransform) -> Snapshot {
        let prev = self.postprocess_spec.clone();
        let chained: SpecTransform = Arc::new(move |config: &Config, spec: TypeSpec| {
            let spec = match &prev {
                Some(prev) => prev(config, spec),
                None => spec,
            };
            transform(config, spec)
        });
        self.set(Saved::PostprocessSpec(Some(chained)))
    }

    /// Resolves the `wsdl:arrayType` of SOAP-encoded arrays to the item type of their wildcard
    /// element.
    pub fn handle_soap_array_type(&mut self) -> Snapshot {
        self.process_types(Arc::new(|config: &Config, schema: &Schema, type_: Type| {
            config.parse_soap_array_type(schema, type_)
        }))
    }

    /// Turns structs whose only field is a `Vec` into sequence types with their own `Decode`
    /// and `Encode` implementations.
    pub fn soap_array_as_sequence(&mut self) -> Snapshot {
        self.process_specs(Arc::new(|config: &Config, spec: TypeSpec| {
            config.soap_array_to_sequence(spec)
        }))
    }

    pub(crate) fn preprocess(&self, schema: &Schema, type_: Type) -> Type {
        match &self.preprocess_type {
            Some(transform) => transform(self, schema, type_),
            None => type_,
        }
    }

    pub(crate) fn postprocess(&self, spec: TypeSpec) -> TypeSpec {
        match &self.postprocess_spec {
            Some(transform) => transform(self, spec),
            None => spec,
        }
    }

    pub(crate) fn excludes_type(&self, type_: &Type) -> bool {
        self.filter_types
            .as_ref()
            .is_some_and(|filter| filter.excludes(self, type_))
    }

    /// The attributes and elements of a complex type that pass the filters, in their original
    /// order.
    pub fn filter_fields(
        &self,
        complex_type: &ComplexType,
    ) -> (Vec<Attribute>, Vec<Element>) {
        let attributes = complex_type
            .attributes
            .iter()
            .filter(|attribute| {
                !self
                    .filter_attributes
                    .as_ref()
                    .is_some_and(|filter| filter.excludes(self, attribute))
            })
            .cloned()
            .collect();
        let elements = complex_type
            .elements
            .iter()
            .filter(|element| {
                !self
                    .filter_elements
                    .as_ref()
                    .is_some_and(|filter| filter.excludes(self, element))
            })
            .cloned()
            .collect();
        (attributes, elements)
    }
}

fn same<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Field-by-field equality; installed closures compare by identity.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        same(&self.logger, &other.logger)
            && self.log_level == other.log_level
            && self.package_name == other.package_name
            && same(&self.preprocess_type, &other.preprocess_type)
            && same(&self.postprocess_spec, &other.postprocess_spec)
            && self.filter_attributes == other.filter_attributes
            && self.filter_elements == other.filter_elements
            && self.filter_types == other.filter_types
            && same(&self.all_name_transform, &other.all_name_transform)
            && same(&self.type_name_transform, &other.type_name_transform)
            && same(&self.element_name_transform, &other.element_name_transform)
            && same(&self.attribute_name_transform, &other.attribute_name_transform)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("logger", &self.logger.is_some())
            .field("log_level", &self.log_level)
            .field("package_name", &self.package_name)
            .field("preprocess_type", &self.preprocess_type.is_some())
            .field("postprocess_spec", &self.postprocess_spec.is_some())
            .field("filter_attributes", &self.filter_attributes)
            .field("filter_elements", &self.filter_elements)
            .field("filter_types", &self.filter_types)
            .field("all_name_transform", &self.all_name_transform.is_some())
            .field("type_name_transform", &self.type_name_transform.is_some())
            .field("element_name_transform", &self.element_name_transform.is_some())
            .field("attribute_name_transform", &self.attribute_name_transform.is_some())
            .finish()
    }
}

/// A [`Config`] change as a value, so that sets of changes can be kept and applied later.
#[derive(Clone)]
pub enum ConfigOption {
    ErrorLog(Option<Arc<dyn Logger>>, u8),
    PackageName(String),
    IgnoreAttributes(Vec<String>),
    IgnoreElements(Vec<String>),
    OnlyTypes(Vec<String>),
    ReplaceAllNames { pattern: String, replacement: String },
    ReplaceTypeNames { pattern: String, replacement: String },
    ReplaceElementNames { pattern: String, replacement: String },
    ReplaceAttributeNames { pattern: String, replacement: String },
    ProcessTypes(TypeTransform),
    ProcessSpecs(SpecTransform),
    HandleSoapArrayType,
    SoapArrayAsSequence,
    /// The separator-stripping rule of [`default_options`].
    StripSeparators,
}

impl ConfigOption {
    pub fn apply(self, config: &mut Config) -> Snapshot {
        match self {
            Self::ErrorLog(logger, level) => config.error_log(logger, level),
            Self::PackageName(name) => config.package_name(name),
            Self::IgnoreAttributes(names) => config.ignore_attributes(names),
            Self::IgnoreElements(names) => config.ignore_elements(names),
            Self::OnlyTypes(patterns) => config.only_types(patterns),
            Self::ReplaceAllNames { pattern, replacement } => {
                config.replace_names(NameSlot::All, &pattern, &replacement)
            }
            Self::ReplaceTypeNames { pattern, replacement } => {
                config.replace_names(NameSlot::Type, &pattern, &replacement)
            }
            Self::ReplaceElementNames { pattern, replacement } => {
                config.replace_names(NameSlot::Element, &pattern, &replacement)
            }
            Self::ReplaceAttributeNames { pattern, replacement } => {
                config.replace_names(NameSlot::Attribute, &pattern, &replacement)
            }
            Self::ProcessTypes(transform) => config.process_types(transform),
            Self::ProcessSpecs(transform) => config.process_specs(transform),
            Self::HandleSoapArrayType => config.handle_soap_array_type(),
            Self::SoapArrayAsSequence => config.soap_array_as_sequence(),
            Self::StripSeparators => config.replace_all_names_regex(SEPARATORS.clone(), ""),
        }
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorLog(_, level) => f.debug_tuple("ErrorLog").field(level).finish(),
            Self::PackageName(name) => f.debug_tuple("PackageName").field(name).finish(),
            Self::IgnoreAttributes(names) => f.debug_tuple("IgnoreAttributes").field(names).finish(),
            Self::IgnoreElements(names) => f.debug_tuple("IgnoreElements").field(names).finish(),
            Self::OnlyTypes(patterns) => f.debug_tuple("OnlyTypes").field(patterns).finish(),
            Self::ReplaceAllNames { pattern, replacement }
            | Self::ReplaceTypeNames { pattern, replacement }
            | Self::ReplaceElementNames { pattern, replacement }
            | Self::ReplaceAttributeNames { pattern, replacement } => f
                .debug_struct("ReplaceNames")
                .field("pattern", pattern)
                .field("replacement", replacement)
                .finish(),
            Self::ProcessTypes(_) => f.write_str("ProcessTypes"),
            Self::ProcessSpecs(_) => f.write_str("ProcessSpecs"),
            Self::HandleSoapArrayType => f.write_str("HandleSoapArrayType"),
            Self::SoapArrayAsSequence => f.write_str("SoapArrayAsSequence"),
            Self::StripSeparators => f.write_str("StripSeparators"),
        }
    }
}

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[._ \s-]").unwrap();
}

/// Options that produce usable, idiomatic code for most schemas: boilerplate attributes are
/// ignored, separators are stripped from names, the package is called `ws`, and SOAP arrays
/// become sequence types.
pub fn default_options() -> Vec<ConfigOption> {
    vec![
        ConfigOption::IgnoreAttributes(
            ["id", "href", "ref", "offset"].map(String::from).to_vec(),
        ),
        ConfigOption::StripSeparators,
        ConfigOption::PackageName("ws".into()),
        ConfigOption::HandleSoapArrayType,
        ConfigOption::SoapArrayAsSequence,
    ]
}
