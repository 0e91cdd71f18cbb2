//! Structural validation for template metadata, schema, and content files.
//!
//! Each file kind has a declarative shape check built from JSON Schemas,
//! evaluated exhaustively: every violation in one physical file is collected
//! and surfaced together, so an author can fix a whole file in one pass.
//! Token vocabulary checks and file-existence checks run in the same pass.
//! Unknown fields are ignored (forward compatibility); unknown values of
//! known fields are hard errors.

use crate::content::{ContentDescriptor, ContentFile};
use crate::error::{Error, Result};
use crate::parameters::{find_invalid_parameters, find_invalid_references};
use crate::schema::{SchemaAction, SchemaFile};
use crate::template::{read_json_file, TemplateFile, TEMPLATE_FILE};
use jsonschema::Validator;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::LazyLock;

struct Validators {
    template_file: Validator,
    copy_action: Validator,
    replace_action: Validator,
    migrate_action: Validator,
    schema_file: Validator,
    create_action: Validator,
    import_action: Validator,
    model_entity: Validator,
    model_category_entity: Validator,
    singleton_entity: Validator,
    singleton_category_entity: Validator,
    collection_entity: Validator,
    form_entity: Validator,
    content_file: Validator,
    entry_descriptor: Validator,
    singleton_descriptor: Validator,
    media_descriptor: Validator,
    collection_items_descriptor: Validator,
    model_category_entries_descriptor: Validator,
}

static VALIDATORS: LazyLock<Validators> = LazyLock::new(|| Validators {
    template_file: compile(json!({
        "type": "object",
        "required": ["version", "name"],
        "properties": {
            "version": {"type": "number"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "author": {"type": "string"},
            "url": {"type": "string"},
            "preview": {"type": "string"},
            "instructions": {"type": "string"},
            "actions": {"type": "array"}
        }
    })),
    copy_action: compile(json!({
        "type": "object",
        "required": ["file", "to"],
        "properties": {
            "file": {"type": "string"},
            "to": {"type": "string"},
            "replace": replace_map_schema()
        }
    })),
    replace_action: compile(json!({
        "type": "object",
        "required": ["target", "replace"],
        "properties": {
            "target": {"type": "string"},
            "replace": replace_map_schema()
        }
    })),
    migrate_action: compile(json!({
        "type": "object",
        "required": ["file"],
        "properties": {
            "file": {"type": "string"}
        }
    })),
    schema_file: compile(json!({
        "type": "object",
        "required": ["version", "timestamp", "actions"],
        "properties": {
            "version": {"type": "number"},
            "timestamp": {"type": "string"},
            "actions": {"type": "array"}
        }
    })),
    create_action: compile(json!({
        "type": "object",
        "required": ["entities"],
        "properties": {
            "entities": {"type": "array"}
        }
    })),
    import_action: compile(json!({
        "type": "object",
        "required": ["file"],
        "properties": {
            "file": {"type": "string"}
        }
    })),
    model_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["title", "slug", "groups"],
        "properties": {
            "title": {"type": "string"},
            "slug": {"type": "string"},
            "preview_url": {"type": "string"},
            "groups": group_array_schema(field_schema(MODEL_FIELD_TYPES, false))
        }
    }))),
    model_category_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["model", "title", "slug"],
        "properties": {
            "model": {"type": "string"},
            "title": {"type": "string"},
            "slug": {"type": "string"}
        }
    }))),
    singleton_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["title", "slug", "category", "groups"],
        "properties": {
            "title": {"type": "string"},
            "slug": {"type": "string"},
            "category": {"type": "string"},
            "groups": group_array_schema(field_schema(BASE_FIELD_TYPES, false))
        }
    }))),
    singleton_category_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["title", "slug"],
        "properties": {
            "title": {"type": "string"},
            "slug": {"type": "string"},
            "icon": {"type": "string"}
        }
    }))),
    collection_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["title", "slug", "type"],
        "properties": {
            "title": {"type": "string"},
            "slug": {"type": "string"},
            "type": {"enum": ["any", "entry", "media", "singleton"]}
        }
    }))),
    form_entity: compile(entity_schema(json!({
        "type": "object",
        "required": ["title", "slug", "groups"],
        "properties": {
            "title": {"type": "string"},
            "slug": {"type": "string"},
            "groups": group_array_schema(field_schema(BASE_FIELD_TYPES, true))
        }
    }))),
    content_file: compile(json!({
        "type": "object",
        "required": ["version", "content"],
        "properties": {
            "version": {"type": "number"},
            "content": {"type": "array"}
        }
    })),
    entry_descriptor: compile(json!({
        "type": "object",
        "required": ["model", "data"],
        "properties": {
            "model": {"type": "string"},
            "data": {
                "type": "object",
                "required": ["data"],
                "properties": {
                    "data": {"type": "object"},
                    "draft": {"type": "boolean"}
                }
            }
        }
    })),
    singleton_descriptor: compile(json!({
        "type": "object",
        "required": ["slug", "data"],
        "properties": {
            "slug": {"type": "string"},
            "data": {
                "type": "object",
                "required": ["data"],
                "properties": {
                    "data": {"type": "object"}
                }
            }
        }
    })),
    media_descriptor: compile(json!({
        "type": "object",
        "required": ["data"],
        "properties": {
            "data": {
                "type": "object",
                "required": ["file", "title"],
                "properties": {
                    "file": {"type": "string"},
                    "title": {"type": "string"},
                    "alt": {"type": "string"},
                    "description": {"type": "string"}
                }
            }
        }
    })),
    collection_items_descriptor: compile(json!({
        "type": "object",
        "required": ["collection", "items"],
        "properties": {
            "collection": {"type": "string"},
            "items": {"type": "array", "items": {"type": "string"}}
        }
    })),
    model_category_entries_descriptor: compile(json!({
        "type": "object",
        "required": ["model", "category", "entries"],
        "properties": {
            "model": {"type": "string"},
            "category": {"type": "string"},
            "entries": {"type": "array", "items": {"type": "string"}}
        }
    })),
});

const BASE_FIELD_TYPES: &[&str] =
    &["string", "text", "visual", "html", "media", "boolean", "relation"];
const MODEL_FIELD_TYPES: &[&str] =
    &["title", "slug", "string", "text", "visual", "html", "media", "boolean", "relation"];

fn compile(schema: Value) -> Validator {
    jsonschema::validator_for(&schema).expect("embedded JSON Schema is valid")
}

fn replace_map_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": {"type": "string"}
    })
}

fn field_schema(field_types: &[&str], form_field: bool) -> Value {
    let mut schema = json!({
        "type": "object",
        "required": ["title", "key", "type"],
        "properties": {
            "title": {"type": "string"},
            "key": {"type": "string"},
            "type": {"enum": field_types},
            "is_required": {"type": "boolean"},
            "is_listable": {"type": "boolean"},
            "is_private": {"type": "boolean"},
            "is_archived": {"type": "boolean"},
            "rules": {"type": "object"}
        }
    });

    if form_field {
        schema["properties"]["is_identifier"] = json!({"type": "boolean"});
    }

    schema
}

fn group_array_schema(field: Value) -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["title", "type", "fields"],
            "properties": {
                "title": {"type": "string"},
                "type": {"const": "group"},
                "fields": {"type": "array", "items": field}
            }
        }
    })
}

/// Formats every schema violation for one instance, prefixed with its
/// location inside the containing file.
fn schema_errors(validator: &Validator, instance: &Value, prefix: &str) -> Vec<String> {
    validator
        .iter_errors(instance)
        .map(|error| {
            let pointer = error.instance_path().to_string();
            match (prefix.is_empty(), pointer.is_empty()) {
                (true, true) => error.to_string(),
                (true, false) => format!("{pointer}: {error}"),
                (false, true) => format!("{prefix}: {error}"),
                (false, false) => format!("{prefix}{pointer}: {error}"),
            }
        })
        .collect()
}

fn string_token_errors(path: &str, value: &str, errors: &mut Vec<String>) {
    let invalid = find_invalid_parameters(value);
    if !invalid.is_empty() {
        errors.push(format!("{path} has invalid parameters: {}.", invalid.join(", ")));
    }

    let invalid = find_invalid_references(value);
    if !invalid.is_empty() {
        errors.push(format!("{path} has invalid references: {}.", invalid.join(", ")));
    }
}

fn deep_token_errors(path: &str, value: &Value, errors: &mut Vec<String>) {
    match value {
        Value::String(string) => string_token_errors(path, string, errors),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                deep_token_errors(&format!("{path}[{index}]"), item, errors);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                deep_token_errors(&format!("{path}.{key}"), item, errors);
            }
        }
        _ => {}
    }
}

fn replace_map_token_errors(prefix: &str, action: &Value, errors: &mut Vec<String>) {
    if let Some(map) = action.get("replace").and_then(Value::as_object) {
        for (search, replacement) in map {
            if let Some(replacement) = replacement.as_str() {
                string_token_errors(&format!("{prefix}.replace.{search}"), replacement, errors);
            }
        }
    }
}

fn element_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn entity_schema(data: Value) -> Value {
    json!({
        "type": "object",
        "required": ["data"],
        "properties": {
            "data": data
        }
    })
}

/// Validates a template metadata file's structure, collecting every error.
pub fn validate_template_file(value: &Value) -> Vec<String> {
    let v = &*VALIDATORS;
    let mut errors = schema_errors(&v.template_file, value, "");

    if let Some(instructions) = value.get("instructions").and_then(Value::as_str) {
        string_token_errors("instructions", instructions, &mut errors);
    }

    if let Some(actions) = value.get("actions").and_then(Value::as_array) {
        let mut migrations = 0;

        for (index, action) in actions.iter().enumerate() {
            let prefix = format!("actions[{index}]");

            match element_type(action) {
                Some("copy") => {
                    errors.extend(schema_errors(&v.copy_action, action, &prefix));
                    replace_map_token_errors(&prefix, action, &mut errors);
                }
                Some("replace") => {
                    errors.extend(schema_errors(&v.replace_action, action, &prefix));
                    replace_map_token_errors(&prefix, action, &mut errors);
                }
                Some("migrate") => {
                    errors.extend(schema_errors(&v.migrate_action, action, &prefix));
                    migrations += 1;
                }
                _ => errors.push(format!("{prefix}.type must be one of: copy, replace, migrate.")),
            }
        }

        if migrations > 1 {
            errors.push(
                "actions array is invalid: can't have more than one action of type \"migrate\"."
                    .to_string(),
            );
        }
    }

    errors
}

/// Validates a schema file's structure, collecting every error.
pub fn validate_schema_file(value: &Value) -> Vec<String> {
    let v = &*VALIDATORS;
    let mut errors = schema_errors(&v.schema_file, value, "");

    if let Some(actions) = value.get("actions").and_then(Value::as_array) {
        for (index, action) in actions.iter().enumerate() {
            let prefix = format!("actions[{index}]");

            match element_type(action) {
                Some("create") => {
                    errors.extend(schema_errors(&v.create_action, action, &prefix));

                    if let Some(entities) = action.get("entities").and_then(Value::as_array) {
                        for (entity_index, entity) in entities.iter().enumerate() {
                            validate_entity(
                                entity,
                                &format!("{prefix}.entities[{entity_index}]"),
                                &mut errors,
                            );
                        }
                    }
                }
                Some("import") => {
                    errors.extend(schema_errors(&v.import_action, action, &prefix));
                }
                _ => errors.push(format!("{prefix}.type must be one of: create, import.")),
            }
        }
    }

    errors
}

fn validate_entity(entity: &Value, prefix: &str, errors: &mut Vec<String>) {
    let v = &*VALIDATORS;

    let validator = match element_type(entity) {
        Some("model") => &v.model_entity,
        Some("modelCategory") => &v.model_category_entity,
        Some("singleton") => &v.singleton_entity,
        Some("singletonCategory") => &v.singleton_category_entity,
        Some("collection") => &v.collection_entity,
        Some("form") => &v.form_entity,
        _ => {
            errors.push(format!(
                "{prefix}.type must be one of: model, modelCategory, singleton, singletonCategory, collection, form."
            ));
            return;
        }
    };

    errors.extend(schema_errors(validator, entity, prefix));
}

/// Validates a content file's structure, collecting every error.
pub fn validate_content_file(value: &Value) -> Vec<String> {
    let v = &*VALIDATORS;
    let mut errors = schema_errors(&v.content_file, value, "");

    if let Some(content) = value.get("content").and_then(Value::as_array) {
        for (index, descriptor) in content.iter().enumerate() {
            let prefix = format!("content[{index}]");

            match element_type(descriptor) {
                Some("entry") => {
                    errors.extend(schema_errors(&v.entry_descriptor, descriptor, &prefix));
                    if let Some(data) = descriptor.pointer("/data/data") {
                        deep_token_errors(&format!("{prefix}.data.data"), data, &mut errors);
                    }
                }
                Some("singleton") => {
                    errors.extend(schema_errors(&v.singleton_descriptor, descriptor, &prefix));
                    if let Some(data) = descriptor.pointer("/data/data") {
                        deep_token_errors(&format!("{prefix}.data.data"), data, &mut errors);
                    }
                }
                Some("media") => {
                    errors.extend(schema_errors(&v.media_descriptor, descriptor, &prefix));

                    for field in ["alt", "description"] {
                        if let Some(text) =
                            descriptor.pointer(&format!("/data/{field}")).and_then(Value::as_str)
                        {
                            string_token_errors(&format!("{prefix}.data.{field}"), text, &mut errors);
                        }
                    }
                }
                Some("collectionItems") => {
                    errors.extend(schema_errors(
                        &v.collection_items_descriptor,
                        descriptor,
                        &prefix,
                    ));
                    if let Some(items) = descriptor.get("items") {
                        deep_token_errors(&format!("{prefix}.items"), items, &mut errors);
                    }
                }
                Some("modelCategoryEntries") => {
                    errors.extend(schema_errors(
                        &v.model_category_entries_descriptor,
                        descriptor,
                        &prefix,
                    ));
                    if let Some(entries) = descriptor.get("entries") {
                        deep_token_errors(&format!("{prefix}.entries"), entries, &mut errors);
                    }
                }
                _ => errors.push(format!(
                    "{prefix}.type must be one of: entry, singleton, media, collectionItems, modelCategoryEntries."
                )),
            }
        }
    }

    errors
}

/// Checks that every media descriptor's file exists, relative to the
/// directory of the content file that references it.
pub fn validate_media_files(content: &ContentFile, content_dir: &Path) -> Result<()> {
    for descriptor in &content.content {
        if let ContentDescriptor::Media { data } = descriptor {
            let media_path = content_dir.join(&data.file);
            if !media_path.exists() {
                return Err(Error::MissingFileError {
                    description: "media file".to_string(),
                    path: media_path.display().to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validates a template's metadata file and, recursively, the migration
/// schema file and content files it references, top to bottom.
///
/// Validation stops at the first file that fails, reporting which physical
/// file it was. Referenced files are checked for existence before being
/// read, and missing files are reported with the exact expected path.
pub fn validate_template_metadata(dot_starlight_path: &Path) -> Result<TemplateFile> {
    let template_path = dot_starlight_path.join(TEMPLATE_FILE);
    if !template_path.exists() {
        return Err(Error::TemplateNotFoundError { path: template_path.display().to_string() });
    }

    let raw_template = read_json_file(&template_path)?;
    let errors = validate_template_file(&raw_template);
    if !errors.is_empty() {
        return Err(Error::ValidationError {
            file: format!("template metadata ({})", template_path.display()),
            errors,
        });
    }

    let template: TemplateFile = serde_json::from_value(raw_template)?;

    if let Some(migration_file) = template.migration_file() {
        let schema_path = dot_starlight_path.join(migration_file);
        if !schema_path.exists() {
            return Err(Error::MissingFileError {
                description: "schema file".to_string(),
                path: schema_path.display().to_string(),
            });
        }

        let raw_schema = read_json_file(&schema_path)?;
        let errors = validate_schema_file(&raw_schema);
        if !errors.is_empty() {
            return Err(Error::ValidationError {
                file: format!("template schema ({})", schema_path.display()),
                errors,
            });
        }

        let schema: SchemaFile = serde_json::from_value(raw_schema)?;
        let schema_dir = schema_path.parent().unwrap_or(dot_starlight_path);

        // Content files are validated in action order so repeated runs over
        // a broken template always report the same file first.
        for action in &schema.actions {
            if let SchemaAction::Import { file } = action {
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
            }
        }
    }

    Ok(template)
}
