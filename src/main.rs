//! Starlight CLI entry point and command orchestration.
//! Handles command-line argument parsing, validation and import flows, and
//! coordinates interactions between different modules.

use std::path::{Path, PathBuf};

use starlight::{
    actions::{schema::run_schema_actions, template::run_template_actions},
    cli::{get_args, Cli, Command, ConnectionArgs},
    client::AdminClient,
    error::{default_error_handler, Error, Result},
    parameters::TemplateParameters,
    schema::SchemaFile,
    template::{dot_starlight_path, read_json_file, TemplateFile},
    validation::validate_template_metadata,
};

/// Main application entry point.
#[tokio::main]
async fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args).await {
        default_error_handler(err);
    }
}

async fn run(args: Cli) -> Result<()> {
    match args.command {
        Command::Validate { folder } => validate(folder),
        Command::Import { folder, connection } => import(folder, connection).await,
        Command::Apply { folder, connection, skip_migrations } => {
            apply(folder, connection, skip_migrations).await
        }
    }
}

fn template_root(folder: Option<PathBuf>) -> PathBuf {
    folder.unwrap_or_else(|| PathBuf::from("."))
}

/// Builds the Admin API client and hydrates the template parameter map from
/// the connection arguments. The credential is resolved once here and lives
/// inside the client value passed down the call chain.
async fn connect(connection: &ConnectionArgs) -> Result<(AdminClient, TemplateParameters)> {
    let token = connection
        .token
        .clone()
        .or_else(|| std::env::var("STARLIGHT_TOKEN").ok())
        .ok_or(Error::MissingTokenError)?;

    let client = AdminClient::new(&connection.api_url, &token)?;
    let organization = client.organization(&connection.organization).await?;
    let workspace = client.workspace(&organization, &connection.workspace).await?;
    let project_name =
        connection.project_name.clone().unwrap_or_else(|| workspace.title.clone());

    Ok((client, TemplateParameters::new(project_name, organization, workspace)))
}

fn validate(folder: Option<PathBuf>) -> Result<()> {
    let root = template_root(folder);
    let template = validate_template_metadata(&dot_starlight_path(&root))?;

    println!("Template metadata for '{}' is valid.", template.name);
    Ok(())
}

fn load_schema_file(dot_starlight: &Path, file: &str) -> Result<(SchemaFile, PathBuf)> {
    let schema_path = dot_starlight.join(file);
    let schema = serde_json::from_value(read_json_file(&schema_path)?)?;
    Ok((schema, schema_path))
}

async fn import(folder: Option<PathBuf>, connection: ConnectionArgs) -> Result<()> {
    let root = template_root(folder);
    let dot_starlight = dot_starlight_path(&root);
    let template: TemplateFile = validate_template_metadata(&dot_starlight)?;

    let Some(migration_file) = template.migration_file() else {
        println!(
            "The {} template has nothing to migrate: no \"migrate\" action found in the template metadata.",
            template.name
        );
        return Ok(());
    };

    let (client, parameters) = connect(&connection).await?;
    let (schema, schema_path) = load_schema_file(&dot_starlight, migration_file)?;
    let schema_dir = schema_path.parent().unwrap_or(&dot_starlight);

    run_schema_actions(&schema, schema_dir, &parameters, &client).await?;

    println!(
        "{} migrations applied successfully to the {} workspace.",
        template.name, parameters.workspace.title
    );
    println!(
        "To use this workspace with a Starlight SDK, use the following workspace ID: {}",
        parameters.workspace.id
    );
    Ok(())
}

async fn apply(
    folder: Option<PathBuf>,
    connection: ConnectionArgs,
    skip_migrations: bool,
) -> Result<()> {
    let root = template_root(folder);
    let template = validate_template_metadata(&dot_starlight_path(&root))?;
    let (client, parameters) = connect(&connection).await?;

    run_template_actions(&template, &root, &parameters, &client, skip_migrations).await?;

    println!("{} template applied successfully in {}.", template.name, root.display());
    Ok(())
}
