//! Ordered, deduplicated catalogue of captured endpoints

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::capture::Record;
use crate::config::Config;
use crate::render::Renderer;
use crate::{ApiaryError, Result};

/// Ordered collection of captured records, backed by a JSON snapshot and a
/// rendered HTML document
///
/// Holds at most one record per (method, path, status code) identity. No
/// internal locking; callers that capture concurrently must serialize
/// access.
#[derive(Debug)]
pub struct Catalogue {
    title: String,
    json_path: PathBuf,
    html_path: PathBuf,
    records: Vec<Record>,
}

impl Catalogue {
    /// Create an empty catalogue with paths resolved from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            title: config.title.clone(),
            json_path: config.json_path(),
            html_path: config.html_path.clone(),
            records: Vec::new(),
        }
    }

    /// Insert a record, replacing any existing record for the same endpoint
    ///
    /// Replacement keeps the original position so document ordering stays
    /// stable across repeated captures of the same endpoint.
    pub fn insert_or_replace(&mut self, record: Record) {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|existing| existing.same_endpoint(&record))
        {
            *existing = record;
            return;
        }
        self.records.push(record);
    }

    /// Hydrate the catalogue from its JSON snapshot
    ///
    /// A missing or empty snapshot file leaves the catalogue empty.
    ///
    /// # Errors
    ///
    /// Returns error on any other read failure, or when the snapshot fails
    /// to decode.
    pub fn load(&mut self) -> Result<()> {
        let bytes = match fs::read(&self.json_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No catalogue snapshot at {}", self.json_path.display());
                self.records = Vec::new();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            self.records = Vec::new();
            return Ok(());
        }

        self.records = serde_json::from_slice(&bytes).map_err(|source| ApiaryError::Snapshot {
            path: self.json_path.clone(),
            source,
        })?;

        info!(
            "Loaded {} records from {}",
            self.records.len(),
            self.json_path.display()
        );
        Ok(())
    }

    /// Write the full record sequence to the JSON snapshot
    ///
    /// The snapshot is overwritten whole, pretty-printed with two-space
    /// indentation.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the file write fails
    pub fn persist_json(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.records)?;
        fs::write(&self.json_path, bytes)?;
        debug!(
            "Persisted {} records to {}",
            self.records.len(),
            self.json_path.display()
        );
        Ok(())
    }

    /// Render the HTML document through the given renderer
    ///
    /// # Errors
    ///
    /// Returns error if rendering or the file write fails
    pub fn render_html(&self, renderer: &dyn Renderer) -> Result<()> {
        let html = renderer.render(&self.title, &self.records)?;
        fs::write(&self.html_path, html)?;
        Ok(())
    }

    /// Remove both backing files and empty the in-memory sequence
    ///
    /// # Errors
    ///
    /// Returns the first removal failure, including removal of a file that
    /// does not exist. The in-memory sequence is emptied only when both
    /// removals succeed.
    pub fn clear(&mut self) -> Result<()> {
        fs::remove_file(&self.json_path)?;
        fs::remove_file(&self.html_path)?;
        self.records.clear();
        info!(
            "Cleared {} and {}",
            self.json_path.display(),
            self.html_path.display()
        );
        Ok(())
    }

    /// Captured records in insertion order
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of distinct endpoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalogue holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// JSON snapshot path
    #[must_use]
    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// HTML document path
    #[must_use]
    pub fn html_path(&self) -> &Path {
        &self.html_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{RequestPart, ResponsePart};
    use tempfile::TempDir;

    struct StaticRenderer;

    impl Renderer for StaticRenderer {
        fn render(&self, _title: &str, _records: &[Record]) -> Result<Vec<u8>> {
            Ok(b"<html></html>".to_vec())
        }
    }

    fn test_catalogue(dir: &TempDir) -> Catalogue {
        let config = Config::new("test api", dir.path().join("apidoc.html"));
        Catalogue::new(&config)
    }

    fn record(method: &str, path: &str, status: u16, body: &str) -> Record {
        Record {
            request: RequestPart {
                method: method.to_string(),
                path: path.to_string(),
                ..RequestPart::default()
            },
            response: ResponsePart {
                status_code: status,
                body: body.to_string(),
                ..ResponsePart::default()
            },
        }
    }

    #[test]
    fn test_insert_appends_distinct_endpoints() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.insert_or_replace(record("GET", "/pets", 200, ""));
        catalogue.insert_or_replace(record("POST", "/pets", 201, ""));
        catalogue.insert_or_replace(record("GET", "/pets", 404, ""));

        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.records()[0].request.method, "GET");
        assert_eq!(catalogue.records()[1].request.method, "POST");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.insert_or_replace(record("GET", "/pets", 200, "first"));
        catalogue.insert_or_replace(record("GET", "/owners", 200, ""));
        catalogue.insert_or_replace(record("GET", "/pets", 200, "second"));

        assert_eq!(catalogue.len(), 2, "Same endpoint should replace, not append");
        assert_eq!(
            catalogue.records()[0].response.body, "second",
            "Replacement should keep the original position"
        );
        assert_eq!(catalogue.records()[1].request.path, "/owners");
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.load().unwrap();
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_load_empty_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        std::fs::write(catalogue.json_path(), "").unwrap();
        catalogue.load().unwrap();
        assert!(catalogue.is_empty());

        std::fs::write(catalogue.json_path(), "  \n").unwrap();
        catalogue.load().unwrap();
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_load_corrupt_snapshot_errors() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        std::fs::write(catalogue.json_path(), "{not json").unwrap();
        let result = catalogue.load();
        assert!(matches!(result, Err(ApiaryError::Snapshot { .. })));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.insert_or_replace(record("GET", "/pets", 200, "{}"));
        catalogue.insert_or_replace(record("DELETE", "/pets/1", 204, ""));
        catalogue.persist_json().unwrap();

        let snapshot = std::fs::read_to_string(catalogue.json_path()).unwrap();
        assert!(snapshot.starts_with('['), "Snapshot should be a JSON array");
        assert!(snapshot.contains("\n  "), "Snapshot should be pretty-printed");

        let mut reloaded = test_catalogue(&dir);
        reloaded.load().unwrap();
        assert_eq!(reloaded.records(), catalogue.records());
    }

    #[test]
    fn test_render_html_writes_output() {
        let dir = TempDir::new().unwrap();
        let catalogue = test_catalogue(&dir);

        catalogue.render_html(&StaticRenderer).unwrap();
        let html = std::fs::read_to_string(catalogue.html_path()).unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[test]
    fn test_clear_removes_files_and_records() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.insert_or_replace(record("GET", "/pets", 200, ""));
        catalogue.persist_json().unwrap();
        catalogue.render_html(&StaticRenderer).unwrap();

        catalogue.clear().unwrap();
        assert!(catalogue.is_empty());
        assert!(!catalogue.json_path().exists());
        assert!(!catalogue.html_path().exists());
    }

    #[test]
    fn test_clear_without_files_errors() {
        let dir = TempDir::new().unwrap();
        let mut catalogue = test_catalogue(&dir);

        catalogue.insert_or_replace(record("GET", "/pets", 200, ""));
        let result = catalogue.clear();

        assert!(result.is_err(), "Removing absent files is the clear error");
        assert_eq!(catalogue.len(), 1, "Records survive a failed clear");
    }
}
