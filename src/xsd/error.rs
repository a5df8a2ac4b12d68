use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <schema>")]
    NotASchema(String),
    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),
    #[error("<{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("invalid value {value:?} for the {attribute} attribute")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },
}
