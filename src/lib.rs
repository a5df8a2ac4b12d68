//! Generates Rust data types with XML decoding and encoding from XML Schema documents, with
//! support for SOAP-encoded arrays.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! let source = std::fs::read_to_string("service.xsd")?;
//! let schema = xsd_codegen::xsd::parse_schema(&source)?;
//! let config = xsd_codegen::Config::with_defaults();
//! print!("{}", xsd_codegen::generate(&config, &schema)?);
//! # Ok(())
//! # }
//! ```

pub mod generator;
pub mod xsd;

pub use generator::{generate, Config, ConfigOption, GenerateError};
