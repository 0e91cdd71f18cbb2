//! Content file model.
//!
//! A content file lists the content objects an `import` schema action
//! creates: entries, singleton data, media uploads, and collection/category
//! memberships. Descriptor order is the order of creation, which is what
//! makes `@`/`#` back-references to earlier descriptors work.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed content file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub version: u32,
    pub content: Vec<ContentDescriptor>,
}

/// One content object to create, tagged by `type`.
///
/// The importer dispatch is closed: an unknown descriptor type fails both
/// validation and deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentDescriptor {
    #[serde(rename = "entry")]
    Entry { model: String, data: EntryMutation },
    #[serde(rename = "singleton")]
    Singleton { slug: String, data: SingletonContentMutation },
    #[serde(rename = "media")]
    Media { data: MediaMutation },
    #[serde(rename = "collectionItems")]
    CollectionItems { collection: String, items: Vec<String> },
    #[serde(rename = "modelCategoryEntries")]
    ModelCategoryEntries {
        model: String,
        category: String,
        entries: Vec<String>,
    },
}

/// Entry creation payload: the field data plus an optional draft marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMutation {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

/// Singleton content update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingletonContentMutation {
    pub data: Value,
}

/// Media upload payload. `file` is resolved against the content file's
/// directory and uploaded as the multipart file part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaMutation {
    pub file: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
