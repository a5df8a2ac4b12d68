//! Generates Rust declarations from a [`Schema`].
//!
//! Every declared type goes through the same steps: the type filter, the type pre-processing
//! chain, translation into a [`TypeSpec`], the declaration post-processing chain and finally rendering.
//! A type that fails to render is reported and left out; the others are still generated.

mod codec;
mod config;
mod filter;
mod flatten;
mod naming;
mod soap;
mod spec;
mod translate;

pub use codec::{record_methods, CodecError, FieldTag};
pub use config::{
    default_options, Config, ConfigOption, Logger, NameSlot, NameTransform, Severity, Snapshot,
    SpecTransform, TracingLogger, TypeTransform,
};
pub use filter::{Entity, PropertyFilter};
pub use flatten::{ItemTag, TagError};
pub use naming::name_to_ident;
pub use soap::{find_wildcard, WildcardSearch};
pub use spec::{sequence_item, Constant, Field, Method, TypeExpr, TypeSpec};

use syn::{parse_quote, Ident, Item};
use thiserror::Error;

use crate::xsd::Schema;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("package name {0:?} is not a valid module name")]
    InvalidPackageName(String),
}

/// Renders the declarations of every type in `schema` that passes the filters of `config`.
///
/// With a package name set, the declarations are wrapped in a module of that name.
pub fn generate(config: &Config, schema: &Schema) -> Result<String, GenerateError> {
    let package = config
        .get_package_name()
        .map(|name| {
            syn::parse_str::<Ident>(name)
                .map_err(|_| GenerateError::InvalidPackageName(name.to_string()))
        })
        .transpose()?;

    let mut items: Vec<Item> = vec![parse_quote!(
        use xsd_codegen_builtins::meta;
    )];
    for type_ in schema.declared_types() {
        let name = type_.name();
        if config.excludes_type(type_) {
            config.debugf(format_args!("skipping filtered type {name}"));
            continue;
        }
        let type_ = config.preprocess(schema, type_.clone());
        let Some(spec) = config.translate(schema, &type_) else {
            continue;
        };
        let spec = config.postprocess(spec);
        match spec.to_items() {
            Ok(rendered) => items.extend(rendered),
            Err(err) => config.errorf(format_args!("could not render type {name}: {err}")),
        }
    }

    let doc_comment = concat!(
        " Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let items = match package {
        Some(package) => vec![parse_quote! {
            pub mod #package {
                #(#items)*
            }
        }],
        None => items,
    };
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, unused_imports)]),
        ],
        items,
    };
    Ok(prettyplease::unparse(&root))
}
