//! Where the two schema documents come from.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use sightline_core::OffsetSchema;
use tracing::info;

/// Published dumper output
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/a2x/cs2-dumper/refs/heads/main/output";

const GLOBALS_FILE: &str = "offsets.json";
const CLASSES_FILE: &str = "client_dll.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Local copies of the two documents
    Files { globals: PathBuf, classes: PathBuf },
    /// Fetch both documents from `<base_url>/offsets.json` and `<base_url>/client_dll.json`
    Remote { base_url: String },
}

impl SchemaSource {
    /// Local files when both are given, otherwise the remote dumper output.
    pub fn from_args(
        globals: Option<PathBuf>,
        classes: Option<PathBuf>,
        base_url: Option<String>,
    ) -> Self {
        match (globals, classes) {
            (Some(globals), Some(classes)) => SchemaSource::Files { globals, classes },
            _ => SchemaSource::Remote {
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
        }
    }

    /// Load the raw globals and classes documents.
    pub fn fetch(&self) -> Result<(String, String)> {
        match self {
            SchemaSource::Files { globals, classes } => {
                let g = fs::read_to_string(globals)
                    .with_context(|| format!("Failed to read {}", globals.display()))?;
                let c = fs::read_to_string(classes)
                    .with_context(|| format!("Failed to read {}", classes.display()))?;
                Ok((g, c))
            }
            SchemaSource::Remote { base_url } => {
                let config = ureq::Agent::config_builder()
                    .timeout_global(Some(Duration::from_secs(10)))
                    .build();
                let agent: ureq::Agent = config.into();
                let g = fetch_text(&agent, &document_url(base_url, GLOBALS_FILE))?;
                let c = fetch_text(&agent, &document_url(base_url, CLASSES_FILE))?;
                Ok((g, c))
            }
        }
    }

    /// Fetch and resolve into a schema.
    pub fn resolve(&self) -> Result<OffsetSchema> {
        let (globals, classes) = self.fetch()?;
        let schema = OffsetSchema::from_documents(&globals, &classes)
            .context("Offset schema could not be resolved")?;
        Ok(schema)
    }
}

fn document_url(base_url: &str, file: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), file)
}

fn fetch_text(agent: &ureq::Agent, url: &str) -> Result<String> {
    info!("Fetching {}", url);
    let mut resp = agent
        .get(url)
        .call()
        .with_context(|| format!("Failed to fetch {}", url))?;
    resp.body_mut()
        .read_to_string()
        .with_context(|| format!("Failed to read response from {}", url))
}
