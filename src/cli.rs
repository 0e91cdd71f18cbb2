//! Command-line interface implementation for the Starlight CLI.
//! Provides argument parsing and help text formatting using clap.

use crate::client::DEFAULT_ADMIN_API_URL;
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for the Starlight CLI.
#[derive(Parser, Debug)]
#[command(author, version, about = "Starlight: validate and import CMS templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a template's metadata, schema, and content files
    Validate {
        /// Template folder (defaults to the current directory)
        folder: Option<PathBuf>,
    },

    /// Import a template's schema and content into Starlight
    Import {
        /// Template folder (defaults to the current directory)
        folder: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Run a template's actions against its project folder
    Apply {
        /// Template folder (defaults to the current directory)
        folder: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Skip migrate actions (no schema or content is imported)
        #[arg(long)]
        skip_migrations: bool,
    },
}

/// Connection parameters for commands that talk to the Admin API.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Admin API base URL
    #[arg(long, default_value = DEFAULT_ADMIN_API_URL)]
    pub api_url: String,

    /// Admin API token. Defaults to the STARLIGHT_TOKEN environment variable
    #[arg(long)]
    pub token: Option<String>,

    /// Organization slug
    #[arg(long)]
    pub organization: String,

    /// Workspace slug
    #[arg(long)]
    pub workspace: String,

    /// Value of the $project.name parameter. Defaults to the workspace title
    #[arg(long)]
    pub project_name: Option<String>,
}

/// Parses command line arguments and returns the Cli structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Cli {
    match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Cli::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
