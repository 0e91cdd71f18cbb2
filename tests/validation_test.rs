use serde_json::json;
use starlight::error::Error;
use starlight::template::dot_starlight_path;
use starlight::validation::{
    validate_content_file, validate_schema_file, validate_template_file,
    validate_template_metadata,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes a template tree under a temporary root and returns the root.
fn write_template(files: &[(&str, serde_json::Value)]) -> TempDir {
    let root = TempDir::new().unwrap();
    let dot_starlight = dot_starlight_path(root.path());
    fs::create_dir_all(&dot_starlight).unwrap();

    for (name, content) in files {
        let path = dot_starlight.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string_pretty(content).unwrap()).unwrap();
    }

    root
}

fn minimal_template() -> serde_json::Value {
    json!({ "version": 1, "name": "blog-starter" })
}

#[test]
fn test_valid_minimal_template() {
    let root = write_template(&[("template.json", minimal_template())]);
    let template = validate_template_metadata(&dot_starlight_path(root.path())).unwrap();
    assert_eq!(template.name, "blog-starter");
}

#[test]
fn test_missing_template_metadata_is_not_found() {
    let root = TempDir::new().unwrap();
    let error = validate_template_metadata(&dot_starlight_path(root.path())).unwrap_err();

    match error {
        Error::TemplateNotFoundError { path } => {
            assert!(path.ends_with("template.json"));
        }
        other => panic!("Expected TemplateNotFoundError, got {other:?}"),
    }
}

#[test]
fn test_malformed_json_is_not_a_validation_error() {
    let root = TempDir::new().unwrap();
    let dot_starlight = dot_starlight_path(root.path());
    fs::create_dir_all(&dot_starlight).unwrap();
    fs::write(dot_starlight.join("template.json"), "{ not json").unwrap();

    let error = validate_template_metadata(&dot_starlight).unwrap_err();
    assert!(matches!(error, Error::JsonError(_)));
}

#[test]
fn test_shape_errors_are_aggregated() {
    let errors = validate_template_file(&json!({
        "version": "one",
        "actions": [
            { "type": "copy", "file": ".env.example" },
            { "type": "replace", "target": "README.md" }
        ]
    }));

    // version type, missing name, copy missing "to", replace missing map.
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().any(|error| error.contains("version")));
    assert!(errors.iter().any(|error| error.contains("name")));
    assert!(errors.iter().any(|error| error.starts_with("actions[0]")));
    assert!(errors.iter().any(|error| error.starts_with("actions[1]")));
}

#[test]
fn test_unknown_action_type_is_rejected() {
    let errors = validate_template_file(&json!({
        "version": 1,
        "name": "starter",
        "actions": [{ "type": "scaffold" }]
    }));

    assert_eq!(errors, vec!["actions[0].type must be one of: copy, replace, migrate."]);
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let errors = validate_template_file(&json!({
        "version": 1,
        "name": "starter",
        "favoriteColor": "green"
    }));

    assert!(errors.is_empty());
}

#[test]
fn test_invalid_parameter_group_fails_validation() {
    let errors = validate_template_file(&json!({
        "version": 1,
        "name": "starter",
        "actions": [{
            "type": "replace",
            "target": ".env",
            "replace": { "WORKSPACE": "${site.slug}" }
        }]
    }));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("actions[0].replace.WORKSPACE"));
    assert!(errors[0].contains("${site.slug}"));
}

#[test]
fn test_invalid_reference_kind_in_instructions() {
    let errors = validate_template_file(&json!({
        "version": 1,
        "name": "starter",
        "instructions": "Open @{page.home} to get started"
    }));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("instructions"));
    assert!(errors[0].contains("@{page.home}"));
}

#[test]
fn test_more_than_one_migrate_action_is_rejected() {
    let errors = validate_template_file(&json!({
        "version": 1,
        "name": "starter",
        "actions": [
            { "type": "migrate", "file": "schema.json" },
            { "type": "migrate", "file": "other.json" }
        ]
    }));

    assert_eq!(
        errors,
        vec!["actions array is invalid: can't have more than one action of type \"migrate\"."]
    );
}

#[test]
fn test_missing_schema_file_is_reported_with_its_path() {
    let root = write_template(&[(
        "template.json",
        json!({
            "version": 1,
            "name": "starter",
            "actions": [{ "type": "migrate", "file": "schema.json" }]
        }),
    )]);

    let error = validate_template_metadata(&dot_starlight_path(root.path())).unwrap_err();

    match error {
        Error::MissingFileError { description, path } => {
            assert_eq!(description, "schema file");
            assert_eq!(
                Path::new(&path),
                dot_starlight_path(root.path()).join("schema.json")
            );
        }
        other => panic!("Expected MissingFileError, got {other:?}"),
    }
}

#[test]
fn test_schema_file_is_validated_recursively() {
    let root = write_template(&[
        (
            "template.json",
            json!({
                "version": 1,
                "name": "starter",
                "actions": [{ "type": "migrate", "file": "schema.json" }]
            }),
        ),
        ("schema.json", json!({ "version": 1, "actions": [] })),
    ]);

    let error = validate_template_metadata(&dot_starlight_path(root.path())).unwrap_err();

    match error {
        Error::ValidationError { file, errors } => {
            assert!(file.starts_with("template schema ("));
            assert!(errors.iter().any(|error| error.contains("timestamp")));
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

#[test]
fn test_content_files_are_validated_recursively() {
    let root = write_template(&[
        (
            "template.json",
            json!({
                "version": 1,
                "name": "starter",
                "actions": [{ "type": "migrate", "file": "schema.json" }]
            }),
        ),
        (
            "schema.json",
            json!({
                "version": 1,
                "timestamp": "2024-05-01T12:00:00Z",
                "actions": [{ "type": "import", "file": "content/blog.json" }]
            }),
        ),
        (
            "content/blog.json",
            json!({
                "version": 1,
                "content": [{ "type": "entry", "model": "posts" }]
            }),
        ),
    ]);

    let error = validate_template_metadata(&dot_starlight_path(root.path())).unwrap_err();

    match error {
        Error::ValidationError { file, errors } => {
            assert!(file.starts_with("template content ("));
            assert!(file.contains("blog.json"));
            assert!(errors.iter().any(|error| error.starts_with("content[0]")));
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

#[test]
fn test_missing_media_file_is_reported_with_its_path() {
    let root = write_template(&[
        (
            "template.json",
            json!({
                "version": 1,
                "name": "starter",
                "actions": [{ "type": "migrate", "file": "schema.json" }]
            }),
        ),
        (
            "schema.json",
            json!({
                "version": 1,
                "timestamp": "2024-05-01T12:00:00Z",
                "actions": [{ "type": "import", "file": "content.json" }]
            }),
        ),
        (
            "content.json",
            json!({
                "version": 1,
                "content": [{
                    "type": "media",
                    "data": { "file": "images/logo.png", "title": "Logo" }
                }]
            }),
        ),
    ]);

    let error = validate_template_metadata(&dot_starlight_path(root.path())).unwrap_err();

    match error {
        Error::MissingFileError { description, path } => {
            assert_eq!(description, "media file");
            assert!(path.ends_with("logo.png"));
        }
        other => panic!("Expected MissingFileError, got {other:?}"),
    }
}

#[test]
fn test_full_template_tree_passes_validation() {
    let root = write_template(&[
        (
            "template.json",
            json!({
                "version": 1,
                "name": "starter",
                "instructions": "Visit your ${workspace.title} workspace",
                "actions": [
                    {
                        "type": "copy",
                        "file": ".env.example",
                        "to": ".env",
                        "replace": { "replace_me": "${workspace.id}" }
                    },
                    { "type": "migrate", "file": "schema.json" }
                ]
            }),
        ),
        (
            "schema.json",
            json!({
                "version": 1,
                "timestamp": "2024-05-01T12:00:00Z",
                "actions": [
                    {
                        "type": "create",
                        "entities": [
                            {
                                "type": "model",
                                "data": {
                                    "title": "Posts",
                                    "slug": "posts",
                                    "groups": [{
                                        "title": "Main",
                                        "type": "group",
                                        "fields": [
                                            { "title": "Title", "key": "title", "type": "title" },
                                            { "title": "Body", "key": "body", "type": "visual" }
                                        ]
                                    }]
                                }
                            },
                            {
                                "type": "collection",
                                "data": { "title": "Featured", "slug": "featured", "type": "entry" }
                            }
                        ]
                    },
                    { "type": "import", "file": "content.json" }
                ]
            }),
        ),
        (
            "content.json",
            json!({
                "version": 1,
                "content": [
                    {
                        "type": "entry",
                        "model": "posts",
                        "data": { "data": { "title": "Hello ${project.name}" } }
                    },
                    {
                        "type": "collectionItems",
                        "collection": "featured",
                        "items": ["#{entry.posts.hello}"]
                    }
                ]
            }),
        ),
    ]);

    let template = validate_template_metadata(&dot_starlight_path(root.path())).unwrap();
    assert_eq!(template.migration_file(), Some("schema.json"));
}

#[test]
fn test_entity_field_type_vocabulary() {
    let errors = validate_schema_file(&json!({
        "version": 1,
        "timestamp": "2024-05-01T12:00:00Z",
        "actions": [{
            "type": "create",
            "entities": [{
                "type": "singleton",
                "data": {
                    "title": "About",
                    "slug": "about",
                    "category": "pages",
                    "groups": [{
                        "title": "Main",
                        "type": "group",
                        // "title" is a model-only field type.
                        "fields": [{ "title": "Title", "key": "title", "type": "title" }]
                    }]
                }
            }]
        }]
    }));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("actions[0].entities[0]"));
}

#[test]
fn test_unknown_entity_type_is_rejected() {
    let errors = validate_schema_file(&json!({
        "version": 1,
        "timestamp": "2024-05-01T12:00:00Z",
        "actions": [{
            "type": "create",
            "entities": [{ "type": "widget", "data": {} }]
        }]
    }));

    assert_eq!(
        errors,
        vec![
            "actions[0].entities[0].type must be one of: model, modelCategory, singleton, singletonCategory, collection, form."
        ]
    );
}

#[test]
fn test_content_descriptor_token_vocabulary_is_checked_deeply() {
    let errors = validate_content_file(&json!({
        "version": 1,
        "content": [{
            "type": "entry",
            "model": "posts",
            "data": {
                "data": {
                    "related": { "first": "@{article.some-slug}" }
                }
            }
        }]
    }));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("content[0].data.data.related.first"));
    assert!(errors[0].contains("@{article.some-slug}"));
}
