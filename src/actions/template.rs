//! Template action runner: `copy`, `replace`, and `migrate`.

use crate::actions::schema::run_schema_actions;
use crate::client::AdminClient;
use crate::error::Result;
use crate::parameters::{replace_parameters, TemplateParameters};
use crate::schema::SchemaFile;
use crate::template::{dot_starlight_path, read_json_file, ReplaceMap, TemplateAction, TemplateFile};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Runs a template's actions in file order.
///
/// `skip_migrations` is a caller-level filter: with it set, `migrate`
/// actions are skipped before dispatch (used when the operator opted out of
/// content import). Unknown action types are skipped silently so older CLI
/// releases tolerate newer metadata files.
pub async fn run_template_actions(
    template: &TemplateFile,
    project_root: &Path,
    parameters: &TemplateParameters,
    client: &AdminClient,
    skip_migrations: bool,
) -> Result<()> {
    for action in &template.actions {
        match action {
            TemplateAction::Copy { file, to, replace } => {
                copy(project_root, file, to, replace.as_ref(), parameters)?;
            }
            TemplateAction::Replace { target, replace } => {
                replace_in_file(project_root, target, replace, parameters)?;
            }
            TemplateAction::Migrate { file } => {
                if skip_migrations {
                    info!("Skipping migration of '{file}'");
                    continue;
                }

                migrate(project_root, file, parameters, client).await?;
            }
            TemplateAction::Unknown => {
                debug!("Skipping template action of unknown type");
            }
        }
    }

    Ok(())
}

/// Applies a replace map to file contents: every occurrence of every search
/// key, in map order, with `$` parameters substituted into the replacement
/// values. Reference tokens are rejected here (no content bag exists during
/// file templating).
fn apply_replace_map(
    content: &str,
    replace: &ReplaceMap,
    parameters: &TemplateParameters,
) -> Result<String> {
    let mut content = content.to_string();

    for (search, replacement) in replace {
        let replacement = replace_parameters(replacement, parameters, None)?;
        content = content.replace(search.as_str(), &replacement);
    }

    Ok(content)
}

fn copy(
    project_root: &Path,
    file: &str,
    to: &str,
    replace: Option<&ReplaceMap>,
    parameters: &TemplateParameters,
) -> Result<()> {
    let from = project_root.join(file);
    let to = project_root.join(to);

    debug!("Copying '{}' to '{}'", from.display(), to.display());
    fs::copy(&from, &to)?;

    if let Some(replace) = replace.filter(|replace| !replace.is_empty()) {
        let content = fs::read_to_string(&to)?;
        fs::write(&to, apply_replace_map(&content, replace, parameters)?)?;
    }

    Ok(())
}

fn replace_in_file(
    project_root: &Path,
    target: &str,
    replace: &ReplaceMap,
    parameters: &TemplateParameters,
) -> Result<()> {
    let target = project_root.join(target);

    debug!("Replacing in '{}'", target.display());
    let content = fs::read_to_string(&target)?;
    fs::write(&target, apply_replace_map(&content, replace, parameters)?)?;

    Ok(())
}

async fn migrate(
    project_root: &Path,
    file: &str,
    parameters: &TemplateParameters,
    client: &AdminClient,
) -> Result<()> {
    let dot_starlight = dot_starlight_path(project_root);
    let schema_path = dot_starlight.join(file);

    let schema: SchemaFile = serde_json::from_value(read_json_file(&schema_path)?)?;
    let schema_dir = schema_path.parent().unwrap_or(&dot_starlight);

    run_schema_actions(&schema, schema_dir, parameters, client).await
}
