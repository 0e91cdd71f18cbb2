use serde_json::json;
use starlight::actions::template::run_template_actions;
use starlight::client::{AdminClient, Organization, Workspace};
use starlight::error::Error;
use starlight::parameters::TemplateParameters;
use starlight::template::TemplateFile;
use std::fs;
use tempfile::TempDir;

fn parameters() -> TemplateParameters {
    TemplateParameters::new(
        "demo",
        Organization { id: 10, title: "Acme".to_string(), slug: "acme".to_string() },
        Workspace { id: 20, title: "Blog".to_string(), slug: "blog".to_string() },
    )
}

/// Client for tests that never reach the network.
fn offline_client() -> AdminClient {
    AdminClient::new("http://localhost:9/", "unused-token").unwrap()
}

fn template(actions: serde_json::Value) -> TemplateFile {
    serde_json::from_value(json!({
        "version": 1,
        "name": "starter",
        "actions": actions
    }))
    .unwrap()
}

#[tokio::test]
async fn test_copy_action_duplicates_and_substitutes() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(".env.example"),
        "WORKSPACE=replace_me\nOTHER=replace_me\nNAME=project_here\n",
    )
    .unwrap();

    let template = template(json!([{
        "type": "copy",
        "file": ".env.example",
        "to": ".env",
        "replace": {
            "replace_me": "${workspace.id}",
            "project_here": "${project.name}"
        }
    }]));

    run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
        .await
        .unwrap();

    let copied = fs::read_to_string(root.path().join(".env")).unwrap();
    assert_eq!(copied, "WORKSPACE=20\nOTHER=20\nNAME=demo\n");

    // The source file is left untouched.
    let source = fs::read_to_string(root.path().join(".env.example")).unwrap();
    assert!(source.contains("replace_me"));
}

#[tokio::test]
async fn test_copy_action_without_replace_map_is_a_plain_copy() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("robots.txt"), "User-agent: *\n").unwrap();

    let template = template(json!([{
        "type": "copy",
        "file": "robots.txt",
        "to": "public/robots.txt"
    }]));

    fs::create_dir_all(root.path().join("public")).unwrap();
    run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
        .await
        .unwrap();

    let copied = fs::read_to_string(root.path().join("public/robots.txt")).unwrap();
    assert_eq!(copied, "User-agent: *\n");
}

#[tokio::test]
async fn test_replace_action_rewrites_in_place() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("README.md"), "# app_name\n\nWelcome to app_name!\n").unwrap();

    let template = template(json!([{
        "type": "replace",
        "target": "README.md",
        "replace": { "app_name": "${project.name}" }
    }]));

    run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
        .await
        .unwrap();

    let content = fs::read_to_string(root.path().join("README.md")).unwrap();
    assert_eq!(content, "# demo\n\nWelcome to demo!\n");
}

#[tokio::test]
async fn test_reference_tokens_are_rejected_during_file_templating() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(".env"), "ENTRY=replace_me\n").unwrap();

    let template = template(json!([{
        "type": "replace",
        "target": ".env",
        "replace": { "replace_me": "#{entry.posts.hello}" }
    }]));

    let error =
        run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
            .await
            .unwrap_err();

    assert!(matches!(error, Error::MissingReferenceContextError { .. }));
}

#[tokio::test]
async fn test_skip_migrations_skips_migrate_actions() {
    let root = TempDir::new().unwrap();

    // The schema file doesn't exist: running the migrate action would fail.
    let template = template(json!([{ "type": "migrate", "file": "schema.json" }]));

    run_template_actions(&template, root.path(), &parameters(), &offline_client(), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_action_types_are_skipped() {
    let root = TempDir::new().unwrap();

    let template = template(json!([
        { "type": "scaffold", "into": "somewhere" }
    ]));

    run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_actions_run_in_file_order() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("config.json"), "{\"workspace\": \"WS\"}").unwrap();

    // The second action only works if the first one ran before it.
    let template = template(json!([
        { "type": "copy", "file": "config.json", "to": "config.local.json" },
        {
            "type": "replace",
            "target": "config.local.json",
            "replace": { "WS": "${workspace.slug}" }
        }
    ]));

    run_template_actions(&template, root.path(), &parameters(), &offline_client(), false)
        .await
        .unwrap();

    let content = fs::read_to_string(root.path().join("config.local.json")).unwrap();
    assert_eq!(content, "{\"workspace\": \"blog\"}");
}
