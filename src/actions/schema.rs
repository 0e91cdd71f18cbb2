//! Schema action runner: `create` and `import`.

use crate::actions::{importers, mutators};
use crate::client::AdminClient;
use crate::content::ContentFile;
use crate::error::{Error, Result};
use crate::parameters::{ContentBag, TemplateParameters};
use crate::schema::{MutableEntity, SchemaAction, SchemaFile};
use crate::template::read_json_file;
use crate::validation::{validate_content_file, validate_media_files};
use log::{debug, info};
use std::path::Path;

/// Runs a schema's actions in file order.
///
/// Unknown action types are skipped (forward compatibility); `create` and
/// `import` are dispatched to their handlers. Any failure aborts the
/// remaining actions: mutations already applied to the backend stay applied.
pub async fn run_schema_actions(
    schema: &SchemaFile,
    schema_dir: &Path,
    parameters: &TemplateParameters,
    client: &AdminClient,
) -> Result<()> {
    for action in &schema.actions {
        match action {
            SchemaAction::Create { entities } => {
                create_entities(entities, parameters, client).await?;
            }
            SchemaAction::Import { file } => {
                import_content_file(file, schema_dir, parameters, client).await?;
            }
            SchemaAction::Unknown => {
                debug!("Skipping schema action of unknown type");
            }
        }
    }

    Ok(())
}

/// Creates entities strictly in array order, one creation call each.
///
/// Entity payloads are sent as written: the create path performs no
/// parameter or reference substitution. Entity structure is defined before
/// any content exists, so there is nothing for a reference to resolve to.
async fn create_entities(
    entities: &[MutableEntity],
    parameters: &TemplateParameters,
    client: &AdminClient,
) -> Result<()> {
    info!(
        "Schema migration: creating {} entit{}",
        entities.len(),
        if entities.len() == 1 { "y" } else { "ies" }
    );

    for entity in entities {
        mutators::create_entity(client, parameters, entity).await?;
    }

    Ok(())
}

/// Loads, re-validates, and imports one content file.
///
/// The file is validated again at run time even if a validation pass already
/// covered it: run time is when the content bag exists, and the bag's
/// create-before-reference contract only holds if the file's structure is
/// known to be sound. Each descriptor that yields new content has its
/// identity recorded into the bag immediately, before the next descriptor
/// runs, which is what lets later descriptors reference earlier ones.
async fn import_content_file(
    file: &str,
    schema_dir: &Path,
    parameters: &TemplateParameters,
    client: &AdminClient,
) -> Result<()> {
    let content_path = schema_dir.join(file);
    if !content_path.exists() {
        return Err(Error::MissingFileError {
            description: "content file".to_string(),
            path: content_path.display().to_string(),
        });
    }

    let raw_content = read_json_file(&content_path)?;
    let errors = validate_content_file(&raw_content);
    if !errors.is_empty() {
        return Err(Error::ValidationError {
            file: format!("template content ({})", content_path.display()),
            errors,
        });
    }

    let content: ContentFile = serde_json::from_value(raw_content)?;
    let content_dir = content_path.parent().unwrap_or(schema_dir);
    validate_media_files(&content, content_dir)?;

    info!(
        "Content migration: creating {} object{}",
        content.content.len(),
        if content.content.len() == 1 { "" } else { "s" }
    );

    let mut content_bag = ContentBag::new();

    for descriptor in &content.content {
        let imported =
            importers::import_descriptor(client, parameters, &content_bag, descriptor, content_dir)
                .await?;

        if let Some(imported) = imported {
            content_bag.insert(imported.kind, imported.key, imported.metadata);
        }
    }

    Ok(())
}
