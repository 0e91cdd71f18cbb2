//! Entity mutators: one creation call per structural entity kind.

use crate::client::AdminClient;
use crate::error::Result;
use crate::parameters::TemplateParameters;
use crate::schema::MutableEntity;
use log::debug;
use serde_json::json;

/// Creates one entity via the Admin API.
///
/// Dispatch is an exhaustive match over the closed entity set, so adding an
/// entity kind without a mutator fails to compile.
pub async fn create_entity(
    client: &AdminClient,
    parameters: &TemplateParameters,
    entity: &MutableEntity,
) -> Result<()> {
    let organization = &parameters.organization.slug;
    let workspace = &parameters.workspace.slug;
    debug!("Creating {}", entity.kind());

    match entity {
        MutableEntity::Model { data } => {
            client
                .post_json(
                    &format!("organizations/{organization}/workspaces/{workspace}/models"),
                    &serde_json::to_value(data)?,
                )
                .await?;
        }
        MutableEntity::ModelCategory { data } => {
            // `model` routes the request and is not part of the payload.
            let mut body = serde_json::to_value(data)?;
            if let Some(map) = body.as_object_mut() {
                map.remove("model");
            }

            client
                .post_json(
                    &format!(
                        "organizations/{organization}/workspaces/{workspace}/models/{}/categories",
                        data.model
                    ),
                    &body,
                )
                .await?;
        }
        MutableEntity::Singleton { data } => {
            client
                .post_json(
                    &format!("organizations/{organization}/workspaces/{workspace}/singletons"),
                    &serde_json::to_value(data)?,
                )
                .await?;
        }
        MutableEntity::SingletonCategory { data } => {
            // The Admin API requires an icon; default to "cube" when the
            // template doesn't pick one.
            let mut body = serde_json::to_value(data)?;
            if let Some(map) = body.as_object_mut() {
                map.entry("icon").or_insert_with(|| json!("cube"));
            }

            client
                .post_json(
                    &format!(
                        "organizations/{organization}/workspaces/{workspace}/singletons/categories"
                    ),
                    &body,
                )
                .await?;
        }
        MutableEntity::Collection { data } => {
            client
                .post_json(
                    &format!("organizations/{organization}/workspaces/{workspace}/collections"),
                    &serde_json::to_value(data)?,
                )
                .await?;
        }
        MutableEntity::Form { data } => {
            client
                .post_json(
                    &format!("organizations/{organization}/workspaces/{workspace}/forms"),
                    &serde_json::to_value(data)?,
                )
                .await?;
        }
    }

    Ok(())
}
