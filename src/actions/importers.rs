//! Content importers: one remote call shape per content kind.
//!
//! Every importer deep-substitutes parameters and references into its
//! descriptor before sending anything, then reports the created content's
//! identity (if it created any) so the runner can record it into the content
//! bag before the next descriptor runs.

use crate::client::{AdminClient, ApiResource, CreatedMedia, CreatedResource};
use crate::content::{ContentDescriptor, EntryMutation, MediaMutation, SingletonContentMutation};
use crate::error::Result;
use crate::parameters::{
    deeply_replace_parameters, replace_parameters, ContentBag, ContentKind, ContentMetadata,
    TemplateParameters,
};
use log::debug;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::path::Path;

/// Identity of one piece of content created by an importer, ready to be
/// recorded into the content bag.
pub struct ImportedContent {
    pub kind: ContentKind,
    pub key: String,
    pub metadata: ContentMetadata,
}

/// Imports one content descriptor, returning the created content's identity
/// when the descriptor yields something later descriptors can reference.
pub async fn import_descriptor(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    descriptor: &ContentDescriptor,
    content_dir: &Path,
) -> Result<Option<ImportedContent>> {
    match descriptor {
        ContentDescriptor::Entry { model, data } => {
            import_entry(client, parameters, content_bag, model, data).await.map(Some)
        }
        ContentDescriptor::Singleton { slug, data } => {
            import_singleton(client, parameters, content_bag, slug, data).await.map(Some)
        }
        ContentDescriptor::Media { data } => {
            import_media(client, parameters, content_bag, data, content_dir).await.map(Some)
        }
        ContentDescriptor::CollectionItems { collection, items } => {
            import_collection_items(client, parameters, content_bag, collection, items).await
        }
        ContentDescriptor::ModelCategoryEntries { model, category, entries } => {
            import_model_category_entries(client, parameters, content_bag, model, category, entries)
                .await?;
            Ok(None)
        }
    }
}

async fn import_entry(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    model: &str,
    data: &EntryMutation,
) -> Result<ImportedContent> {
    debug!("Importing entry into model '{model}'");

    let body =
        deeply_replace_parameters(&serde_json::to_value(data)?, parameters, Some(content_bag))?;
    let response = client
        .post_json(
            &format!(
                "organizations/{}/workspaces/{}/models/{model}/entries",
                parameters.organization.slug, parameters.workspace.slug
            ),
            &body,
        )
        .await?;

    let entry: ApiResource<CreatedResource> = serde_json::from_value(response)?;

    Ok(ImportedContent {
        kind: ContentKind::Entry,
        key: format!("{model}.{}", entry.data.slug),
        metadata: ContentMetadata { id: entry.data.id, slug: entry.data.slug },
    })
}

async fn import_singleton(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    slug: &str,
    data: &SingletonContentMutation,
) -> Result<ImportedContent> {
    debug!("Importing singleton '{slug}'");

    let body =
        deeply_replace_parameters(&serde_json::to_value(data)?, parameters, Some(content_bag))?;
    let response = client
        .patch_json(
            &format!(
                "organizations/{}/workspaces/{}/singletons/{slug}",
                parameters.organization.slug, parameters.workspace.slug
            ),
            &body,
        )
        .await?;

    // This route is an outlier: it returns the singleton without the "data"
    // envelope used by every other Admin API route.
    let singleton: CreatedResource = serde_json::from_value(response)?;

    Ok(ImportedContent {
        kind: ContentKind::Singleton,
        key: singleton.slug.clone(),
        metadata: ContentMetadata { id: singleton.id, slug: singleton.slug },
    })
}

async fn import_media(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    data: &MediaMutation,
    content_dir: &Path,
) -> Result<ImportedContent> {
    debug!("Uploading media '{}'", data.title);

    let title = replace_parameters(&data.title, parameters, Some(content_bag))?;
    let file_path = content_dir.join(&data.file);
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| data.file.clone());

    let mut form = Form::new()
        .part("file", Part::bytes(std::fs::read(&file_path)?).file_name(file_name))
        .text("title", title.clone());
    let mut body_description = format!("multipart: file={}, title={title}", data.file);

    // Empty optional fields are left out of the form entirely.
    for (field, value) in [("alt", &data.alt), ("description", &data.description)] {
        let Some(value) = value.as_deref().filter(|value| !value.is_empty()) else {
            continue;
        };

        let value = replace_parameters(value, parameters, Some(content_bag))?;
        body_description.push_str(&format!(", {field}={value}"));
        form = form.text(field, value);
    }

    let response = client
        .post_multipart(
            &format!(
                "organizations/{}/workspaces/{}/media",
                parameters.organization.slug, parameters.workspace.slug
            ),
            form,
            body_description,
        )
        .await?;

    let media: ApiResource<CreatedMedia> = serde_json::from_value(response)?;

    Ok(ImportedContent {
        kind: ContentKind::Media,
        key: title,
        metadata: ContentMetadata { id: media.data.id, slug: media.data.title },
    })
}

/// Adds each resolved item to a collection, strictly in list order, and
/// returns the collection's identity parsed from the final add response so
/// later descriptors can reference `@{collection.<slug>}`. An empty item
/// list makes no calls and yields no identity.
async fn import_collection_items(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    collection: &str,
    items: &[String],
) -> Result<Option<ImportedContent>> {
    debug!("Adding {} item(s) to collection '{collection}'", items.len());

    let mut last_response = None;

    for item in items {
        let item = replace_parameters(item, parameters, Some(content_bag))?;
        let response = client
            .post_json(
                &format!(
                    "organizations/{}/workspaces/{}/collections/{collection}/items/add",
                    parameters.organization.slug, parameters.workspace.slug
                ),
                &json!({ "id": item }),
            )
            .await?;

        last_response = Some(response);
    }

    let Some(response) = last_response else {
        return Ok(None);
    };

    let collection: ApiResource<CreatedResource> = serde_json::from_value(response)?;

    Ok(Some(ImportedContent {
        kind: ContentKind::Collection,
        key: collection.data.slug.clone(),
        metadata: ContentMetadata { id: collection.data.id, slug: collection.data.slug },
    }))
}

/// Adds each resolved entry to a model category, strictly in list order.
/// Category membership creates no new referenceable identity.
async fn import_model_category_entries(
    client: &AdminClient,
    parameters: &TemplateParameters,
    content_bag: &ContentBag,
    model: &str,
    category: &str,
    entries: &[String],
) -> Result<()> {
    debug!("Adding {} entries to category '{category}' of model '{model}'", entries.len());

    for entry in entries {
        let entry = replace_parameters(entry, parameters, Some(content_bag))?;
        client
            .post_json(
                &format!(
                    "organizations/{}/workspaces/{}/models/{model}/categories/{category}/add",
                    parameters.organization.slug, parameters.workspace.slug
                ),
                &json!({ "id": entry }),
            )
            .await?;
    }

    Ok(())
}
