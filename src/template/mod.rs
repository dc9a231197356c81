//! Message templates keyed by case-insensitive name.
//!
//! The registry is populated while the application starts and is then moved
//! into the [`LogManager`](crate::manager::LogManager), which only ever hands
//! out shared references. Registration after the dispatcher is running is
//! therefore impossible rather than merely discouraged.

mod format;

use std::collections::HashMap;

pub use format::{Args, MISSING_MARKER, TemplateError, format_lenient, format_strict};

/// Templates shipped with every registry created by
/// [`TemplateRegistry::with_defaults`].
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("GenericError", "An error occurred: {}"),
    ("UnexpectedError", "Unexpected error: {}"),
    ("UnhandledException", "Unhandled exception: {}"),
];

#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with [`DEFAULT_TEMPLATES`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, template) in DEFAULT_TEMPLATES {
            registry.add_template(name, *template);
        }
        registry
    }

    /// Register `template` under `name`. Names are compared case-insensitively
    /// and a later registration replaces an earlier one.
    pub fn add_template(&mut self, name: &str, template: impl Into<String>) {
        self.templates.insert(normalise(name), template.into());
    }

    /// Return the stored template for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(&normalise(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(&normalise(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render the message for `name`.
    ///
    /// Unknown names are used as the template themselves, so callers can log
    /// ad-hoc messages without registering them first. Argument mismatches are
    /// rendered inline (see [`format_lenient`]) instead of failing.
    pub fn resolve(&self, name: &str, args: &Args<'_>) -> String {
        format_lenient(self.template_or_name(name), args)
    }

    /// Render the message for `name`, rejecting argument mismatches.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the arguments do not match the
    /// template's placeholders or the template is malformed.
    pub fn try_resolve(&self, name: &str, args: &Args<'_>) -> Result<String, TemplateError> {
        format_strict(self.template_or_name(name), args)
    }

    fn template_or_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }
}

fn normalise(name: &str) -> String {
    name.to_uppercase()
}
