//! Schema file model.
//!
//! A schema file describes a template's migration: the structural entities
//! to create (models, singletons, collections, ...) and the content files to
//! import, in the exact order they must run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed schema file.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    pub version: u32,
    pub timestamp: String,
    pub actions: Vec<SchemaAction>,
}

/// One schema action, tagged by `type`.
///
/// Unknown action types deserialize to [`SchemaAction::Unknown`] and are
/// skipped by the runner (forward compatibility with future action kinds);
/// validation rejects them up front.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaAction {
    #[serde(rename = "create")]
    Create { entities: Vec<MutableEntity> },
    #[serde(rename = "import")]
    Import { file: String },
    #[serde(other)]
    Unknown,
}

/// One structural entity to create, tagged by `type`.
///
/// This set is closed: an unknown entity type fails both validation and
/// deserialization, since there is no mutator to dispatch it to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MutableEntity {
    #[serde(rename = "model")]
    Model { data: ModelMutation },
    #[serde(rename = "modelCategory")]
    ModelCategory { data: ModelCategoryMutation },
    #[serde(rename = "singleton")]
    Singleton { data: SingletonStructureMutation },
    #[serde(rename = "singletonCategory")]
    SingletonCategory { data: SingletonCategoryMutation },
    #[serde(rename = "collection")]
    Collection { data: CollectionMutation },
    #[serde(rename = "form")]
    Form { data: FormMutation },
}

impl MutableEntity {
    /// Human-readable entity kind, used in progress logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Model { .. } => "model",
            Self::ModelCategory { .. } => "model category",
            Self::Singleton { .. } => "singleton",
            Self::SingletonCategory { .. } => "singleton category",
            Self::Collection { .. } => "collection",
            Self::Form { .. } => "form",
        }
    }
}

/// A field inside a model, singleton, or form group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_listable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Value>,
}

/// A form field: a base field plus the submission-identifier marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    #[serde(flatten)]
    pub field: Field,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_identifier: Option<bool>,
}

/// A titled group of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldGroup<F = Field> {
    pub title: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub fields: Vec<F>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMutation {
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub groups: Vec<FieldGroup>,
}

/// Model category creation payload. `model` routes the request and is
/// stripped before the payload is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCategoryMutation {
    pub model: String,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingletonStructureMutation {
    pub title: String,
    pub slug: String,
    pub category: String,
    pub groups: Vec<FieldGroup>,
}

/// Singleton category creation payload. The Admin API requires an icon; the
/// mutator fills in `cube` when the template omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingletonCategoryMutation {
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMutation {
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
}

/// What a collection may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Any,
    Entry,
    Media,
    Singleton,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormMutation {
    pub title: String,
    pub slug: String,
    pub groups: Vec<FieldGroup<FormField>>,
}
