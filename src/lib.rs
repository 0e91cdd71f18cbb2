//! Starlight is a command-line tool for working with Starlight CMS
//! templates: validating their metadata, applying their file actions, and
//! importing their schema and content into a workspace through the Admin
//! API.

/// Template, schema, and content action runners
pub mod actions;

/// Command-line interface module for the Starlight CLI
pub mod cli;

/// Admin API client and resource types
pub mod client;

/// Content file model: entries, singletons, media, and memberships
pub mod content;

/// Error types and handling for the Starlight CLI
pub mod error;

/// Parameter and content reference substitution
/// Handles `${group.key}`, `@{kind.key}` and `#{kind.key}` tokens
pub mod parameters;

/// Schema file model: entity creation and content import actions
pub mod schema;

/// Template metadata file model and path helpers
pub mod template;

/// Structural validation for template, schema, and content files
pub mod validation;
