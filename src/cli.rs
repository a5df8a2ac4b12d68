use std::path::PathBuf;

use clap::{ArgAction, Parser};
use xsd_codegen::generator::{default_options, ConfigOption};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The XSD schema file")]
    pub input: PathBuf,

    #[arg(short, long, help = "Write the generated code here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[arg(long, help = "Name of the module wrapping the generated code")]
    pub package: Option<String>,

    #[arg(long = "ignore-attribute", value_name = "NAME", help = "Leave attributes with this local name out of generated structs")]
    pub ignore_attributes: Vec<String>,

    #[arg(long = "ignore-element", value_name = "NAME", help = "Leave elements with this local name out of generated structs")]
    pub ignore_elements: Vec<String>,

    #[arg(long, value_name = "PATTERN", help = "Only declare types whose name matches one of these patterns")]
    pub only_types: Vec<String>,

    #[arg(long = "replace", value_name = "PATTERN=REPLACEMENT", value_parser = parse_replacement, help = "Rewrite all names, in the order given")]
    pub replacements: Vec<(String, String)>,

    #[arg(long, help = "Start from an empty configuration instead of the defaults")]
    pub no_defaults: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Report more about the generation process")]
    pub verbose: u8,
}

fn parse_replacement(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(pattern, replacement)| (pattern.to_string(), replacement.to_string()))
        .ok_or_else(|| format!("expected PATTERN=REPLACEMENT, got {value:?}"))
}

impl Cli {
    /// The configuration options selected on the command line, defaults first.
    pub fn options(&self) -> Vec<ConfigOption> {
        let mut options = if self.no_defaults {
            Vec::new()
        } else {
            default_options()
        };
        if let Some(package) = &self.package {
            options.push(ConfigOption::PackageName(package.clone()));
        }
        if !self.ignore_attributes.is_empty() {
            options.push(ConfigOption::IgnoreAttributes(self.ignore_attributes.clone()));
        }
        if !self.ignore_elements.is_empty() {
            options.push(ConfigOption::IgnoreElements(self.ignore_elements.clone()));
        }
        if !self.only_types.is_empty() {
            options.push(ConfigOption::OnlyTypes(self.only_types.clone()));
        }
        for (pattern, replacement) in &self.replacements {
            options.push(ConfigOption::ReplaceAllNames {
                pattern: pattern.clone(),
                replacement: replacement.clone(),
            });
        }
        options
    }
}
