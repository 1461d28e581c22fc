//! Document engine orchestrating capture, persistence and rendering

use tracing::{debug, info};

use crate::capture::Record;
use crate::catalogue::Catalogue;
use crate::config::Config;
use crate::render::{HandlebarsRenderer, Renderer};
use crate::Result;

/// Process-wide driver tying the catalogue to its backing files
///
/// One engine owns one catalogue. Construction hydrates the catalogue from
/// any existing snapshot and renders the document once, so the HTML reflects
/// loaded state before the first capture. The JSON snapshot is written on
/// capture only.
pub struct DocEngine {
    catalogue: Catalogue,
    renderer: Box<dyn Renderer>,
    disabled: bool,
}

impl DocEngine {
    /// Create an engine with the default handlebars renderer
    ///
    /// Honours `template_path` from the configuration when set.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to load, an existing snapshot
    /// fails to decode, or the initial render fails
    pub fn new(config: &Config) -> Result<Self> {
        let renderer: Box<dyn Renderer> = match &config.template_path {
            Some(path) => Box::new(HandlebarsRenderer::from_file(path)?),
            None => Box::new(HandlebarsRenderer::new()?),
        };
        Self::with_renderer(config, renderer)
    }

    /// Create an engine with an injected renderer
    ///
    /// # Errors
    ///
    /// Returns error if an existing snapshot fails to decode or the initial
    /// render fails
    pub fn with_renderer(config: &Config, renderer: Box<dyn Renderer>) -> Result<Self> {
        let mut catalogue = Catalogue::new(config);
        catalogue.load()?;
        catalogue.render_html(renderer.as_ref())?;

        info!(
            "Document engine ready with {} records, writing {}",
            catalogue.len(),
            catalogue.html_path().display()
        );

        Ok(Self {
            catalogue,
            renderer,
            disabled: false,
        })
    }

    /// Fold one captured record into the catalogue and its backing files
    ///
    /// Runs insert, JSON persist and HTML render in order, stopping at the
    /// first failure; a failed JSON write leaves the HTML one capture behind
    /// until the next success. No-op while disabled.
    ///
    /// # Errors
    ///
    /// Returns error if persisting the snapshot or rendering the document
    /// fails
    pub fn capture(&mut self, record: Record) -> Result<()> {
        if self.disabled {
            debug!("Capture skipped while disabled");
            return Ok(());
        }

        debug!(
            "Capturing {} {} -> {}",
            record.request.method, record.request.path, record.response.status_code
        );

        self.catalogue.insert_or_replace(record);
        self.catalogue.persist_json()?;
        self.catalogue.render_html(self.renderer.as_ref())?;
        Ok(())
    }

    /// Remove the backing files and empty the catalogue
    ///
    /// Legal in any state, disabled included.
    ///
    /// # Errors
    ///
    /// Returns error if either backing file cannot be removed
    pub fn reset(&mut self) -> Result<()> {
        self.catalogue.clear()
    }

    /// Resume capturing
    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Stop capturing; subsequent captures become no-ops
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Whether capture is currently disabled
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// The underlying catalogue
    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }
}
