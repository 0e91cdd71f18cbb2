//! Template metadata file model.
//!
//! A template's metadata lives at `<root>/.starlight/template.json` and
//! describes the actions to run when the template is applied: file copies,
//! in-place replacements, and at most one content migration.

use crate::error::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Name of the metadata directory inside a template root.
pub const TEMPLATE_DIR: &str = ".starlight";

/// Name of the template metadata file inside the metadata directory.
pub const TEMPLATE_FILE: &str = "template.json";

/// Ordered map of literal search string to replacement string.
///
/// Replacement values may carry `${group.key}` parameter tokens. Reference
/// tokens are rejected at run time: file templating has no content bag.
pub type ReplaceMap = IndexMap<String, String>;

/// One action from a template metadata file, tagged by `type`.
///
/// Unknown action types deserialize to [`TemplateAction::Unknown`]; the
/// runner skips them so older CLI releases tolerate newer metadata files.
/// Validation still rejects them, so they only survive in files the author
/// chose not to validate.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateAction {
    #[serde(rename = "copy")]
    Copy {
        file: String,
        to: String,
        #[serde(default)]
        replace: Option<ReplaceMap>,
    },
    #[serde(rename = "replace")]
    Replace { target: String, replace: ReplaceMap },
    #[serde(rename = "migrate")]
    Migrate { file: String },
    #[serde(other)]
    Unknown,
}

/// Parsed template metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateFile {
    pub version: u32,
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub preview: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub actions: Vec<TemplateAction>,
}

impl TemplateFile {
    /// Returns the schema file referenced by the template's `migrate`
    /// action, if any. Validation guarantees there is at most one.
    pub fn migration_file(&self) -> Option<&str> {
        self.actions.iter().find_map(|action| match action {
            TemplateAction::Migrate { file } => Some(file.as_str()),
            _ => None,
        })
    }
}

/// Returns the metadata directory for a template root.
pub fn dot_starlight_path<P: AsRef<Path>>(template_root: P) -> PathBuf {
    template_root.as_ref().join(TEMPLATE_DIR)
}

/// Reads and parses a JSON file.
pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
