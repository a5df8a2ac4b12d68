//! A reduced XML Schema model: the type definitions and the declarations on them that drive
//! code generation.

mod attribute_decl;
mod builtins;
mod complex_type_def;
mod element_decl;
mod error;
mod mapping_context;
mod schema;
mod simple_type_def;
mod xstypes;

pub use attribute_decl::{Attribute, Namespaces};
pub use builtins::{is_any_type, xs_name, Builtin, XS_ANY_SIMPLE_TYPE, XS_ANY_TYPE, XS_NAMESPACE};
pub use complex_type_def::ComplexType;
pub use element_decl::Element;
pub use error::LoadError;
pub use mapping_context::{parse_schema, read_schema};
pub use schema::{Ancestor, Ancestors, Schema, Type};
pub use simple_type_def::SimpleType;
pub use xstypes::QName;

pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SOAP_ENCODING_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/encoding/";
