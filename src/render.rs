//! HTML rendering of the catalogue

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::capture::Record;
use crate::{ApiaryError, Result};

/// Name the document template is registered under
const TEMPLATE_NAME: &str = "catalogue";

/// Compiled-in default template
const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.hbs");

/// Renders the catalogue into document bytes
///
/// Injected into the document engine so embeddings can swap the HTML engine
/// without touching capture or persistence.
pub trait Renderer: Send + Sync {
    /// Produce the document bytes for a title and ordered record sequence
    ///
    /// # Errors
    ///
    /// Returns error if rendering fails
    fn render(&self, title: &str, records: &[Record]) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct TemplateData<'a> {
    title: &'a str,
    apis: &'a [Record],
}

/// Handlebars-backed renderer used by default
///
/// HTML escaping is left on, so captured bodies and header values render as
/// text rather than markup.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Create a renderer using the compiled-in template
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to parse
    pub fn new() -> Result<Self> {
        Self::from_template(DEFAULT_TEMPLATE)
    }

    /// Create a renderer from a template file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the template fails to
    /// parse
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)?;
        Self::from_template(&template)
    }

    /// Create a renderer from template text
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to parse
    pub fn from_template(template: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|err| ApiaryError::Template(Box::new(err)))?;
        Ok(Self { registry })
    }
}

impl Renderer for HandlebarsRenderer {
    fn render(&self, title: &str, records: &[Record]) -> Result<Vec<u8>> {
        let data = TemplateData {
            title,
            apis: records,
        };
        let html = self
            .registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|err| ApiaryError::Render(Box::new(err)))?;
        Ok(html.into_bytes())
    }
}
