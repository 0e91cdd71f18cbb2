//! Error handling for the Starlight CLI.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for Starlight operations.
///
/// Every failure the CLI can surface belongs to one of these variants, so
/// callers (and tests) can tell validation problems, missing files,
/// unresolved references, and remote API failures apart.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents JSON parse or conversion failures
    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// The template metadata file itself is missing
    #[error("template metadata not found at '{path}'. Are you sure this folder contains a Starlight template?")]
    TemplateNotFoundError { path: String },

    /// A file referenced by a validated action does not exist
    #[error("{description} not found at '{path}'.")]
    MissingFileError { description: String, path: String },

    /// Aggregated structural validation failure for one physical file
    #[error("{file} is invalid:\n{}", .errors.iter().map(|error| format!("  - {error}")).collect::<Vec<_>>().join("\n"))]
    ValidationError { file: String, errors: Vec<String> },

    /// A `@`/`#` reference token could not be resolved against the content
    /// created so far
    #[error("no content metadata found for the {token} parameter. {hint}")]
    UnresolvedReferenceError { token: String, hint: String },

    /// A `@`/`#` reference token was used where no content metadata exists
    #[error("parameter {token} was used in a context where content metadata is unavailable. Only template parameters (parameters starting with $) are allowed here.")]
    MissingReferenceContextError { token: String },

    /// A `$` token names a parameter outside the known vocabulary
    #[error("unknown template parameter {token}.")]
    UnknownParameterError { token: String },

    /// No API token was provided
    #[error("no API token given. Pass --token or set the STARLIGHT_TOKEN environment variable.")]
    MissingTokenError,

    /// The API token cannot be sent as an HTTP header
    #[error("invalid API token: {reason}.")]
    InvalidTokenError { reason: String },

    /// The Admin API base URL (or a path joined onto it) is not a valid URL
    #[error("invalid Admin API URL '{url}': {reason}.")]
    InvalidApiUrlError { url: String, reason: String },

    /// The named organization is not visible to the authenticated user
    #[error("organization '{slug}' was not found in your account.")]
    UnknownOrganizationError { slug: String },

    /// The named workspace does not exist in the selected organization
    #[error("workspace '{slug}' was not found in the '{organization}' organization.")]
    UnknownWorkspaceError { slug: String, organization: String },

    /// Transport-level HTTP failure (connection, timeout, malformed response)
    #[error("HTTP error: {0}.")]
    HttpError(#[from] reqwest::Error),

    /// The Admin API answered with a non-success status code
    #[error("the API responded with status {status} to a {method} request.\nRequest URL: {url}\nRequest body: {request_body}\nAPI response: {response_body}")]
    ApiError {
        status: u16,
        method: String,
        url: String,
        request_body: String,
        response_body: String,
    },
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{}", err);
    std::process::exit(1);
}
