mod helpers;

pub use helpers::{path_join, CommandOutput};

use derive_builder::Builder;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Parameters a template runs with.
///
/// Option handlers fill a [`TemplateContextBuilder`] while the command line
/// is parsed; once built the context is only read.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(derive(Debug))]
pub struct TemplateContext {
    #[builder(default, setter(into, strip_option))]
    name: Option<String>,

    #[builder(default, setter(into, strip_option))]
    author: Option<String>,

    /// Where the template should place what it generates. Relative values
    /// are taken relative to the working directory.
    #[builder(setter(into), default = "self.default_output_directory()?")]
    output_directory: PathBuf,

    #[builder(setter(into))]
    working_directory: PathBuf,
}

impl TemplateContextBuilder {
    fn default_output_directory(&self) -> std::result::Result<PathBuf, String> {
        self.working_directory
            .clone()
            .ok_or_else(|| "working_directory must be set".to_owned())
    }
}

/// Names templates may pass to `require_arguments`.
pub const ARGUMENTS: [&str; 4] = ["name", "author", "output_directory", "working_directory"];

impl TemplateContext {
    #[must_use]
    pub fn builder() -> TemplateContextBuilder {
        TemplateContextBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[must_use]
    pub fn output_directory(&self) -> PathBuf {
        self.resolve(&self.output_directory)
    }

    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Anchors `path` at the working directory unless it is absolute.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_directory.join(path)
    }

    /// Looks up an argument by the name templates use for it. `Ok(None)`
    /// means the argument exists but was not given on the command line.
    pub fn argument(&self, name: &str) -> Result<Option<String>> {
        Ok(match name {
            "name" => self.name.clone(),
            "author" => self.author.clone(),
            "output_directory" => Some(self.output_directory().display().to_string()),
            "working_directory" => Some(self.working_directory.display().to_string()),
            _ => return Err(Error::UnknownTemplateArgument(name.to_owned())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_directory_defaults_to_working_directory() {
        let context = TemplateContext::builder()
            .working_directory("/work")
            .build()
            .unwrap();

        assert_eq!(context.output_directory(), PathBuf::from("/work"));
        assert_eq!(context.name(), None);
        assert_eq!(context.author(), None);
    }

    #[test]
    fn relative_output_directory_is_anchored() {
        let context = TemplateContext::builder()
            .working_directory("/work")
            .output_directory("out")
            .build()
            .unwrap();

        assert_eq!(context.output_directory(), PathBuf::from("/work/out"));
    }

    #[test]
    fn building_without_working_directory_fails() {
        assert!(TemplateContext::builder().name("Widget").build().is_err());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let context = TemplateContext::builder()
            .working_directory("/work")
            .name("")
            .build()
            .unwrap();

        assert_eq!(context.argument("name").unwrap(), Some(String::new()));
        assert!(matches!(
            context.argument("version"),
            Err(Error::UnknownTemplateArgument(name)) if name == "version"
        ));
    }
}
