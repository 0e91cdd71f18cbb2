//! Template parameter and content reference substitution.
//!
//! Template files embed two kinds of tokens inside JSON string values:
//! `${group.key}` parameters, resolved against a static [`TemplateParameters`]
//! map, and `@{kind.key}` / `#{kind.key}` references, resolved against the
//! [`ContentBag`] of content created earlier in the same migration run.
//! `@` yields the referenced content's slug, `#` its numeric id.

use crate::client::{Organization, Workspace};
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

static MATCHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([#$@])\{(\w+?)\.(.+?)\}").unwrap());
static PARAMETER_MATCHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$)\{(\w+?)\.(.+?)\}").unwrap());
static REFERENCE_MATCHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([#@])\{(\w+?)\.(.+?)\}").unwrap());

/// The closed vocabulary of `${group.key}` parameters.
const VALID_PARAMETERS: [(&str, &[&str]); 3] = [
    ("project", &["name"]),
    ("organization", &["title", "slug", "id"]),
    ("workspace", &["title", "slug", "id"]),
];

/// Project-level template parameters.
#[derive(Debug, Clone)]
pub struct ProjectParameters {
    pub name: String,
}

/// The static parameter map available to every template string.
///
/// The group/key vocabulary is closed: `project.name`,
/// `organization.{title,slug,id}` and `workspace.{title,slug,id}`.
#[derive(Debug, Clone)]
pub struct TemplateParameters {
    pub project: ProjectParameters,
    pub organization: Organization,
    pub workspace: Workspace,
}

impl TemplateParameters {
    pub fn new(
        project_name: impl Into<String>,
        organization: Organization,
        workspace: Workspace,
    ) -> Self {
        Self {
            project: ProjectParameters { name: project_name.into() },
            organization,
            workspace,
        }
    }

    /// Looks up a parameter by group and key. Returns `None` outside the
    /// closed vocabulary, which substitution reports as an unknown parameter.
    fn get(&self, group: &str, key: &str) -> Option<String> {
        match (group, key) {
            ("project", "name") => Some(self.project.name.clone()),
            ("organization", "title") => Some(self.organization.title.clone()),
            ("organization", "slug") => Some(self.organization.slug.clone()),
            ("organization", "id") => Some(self.organization.id.to_string()),
            ("workspace", "title") => Some(self.workspace.title.clone()),
            ("workspace", "slug") => Some(self.workspace.slug.clone()),
            ("workspace", "id") => Some(self.workspace.id.to_string()),
            _ => None,
        }
    }
}

/// The kinds of content a `@`/`#` reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Entry,
    Singleton,
    Media,
    Collection,
}

impl ContentKind {
    pub fn from_group(group: &str) -> Option<Self> {
        match group {
            "entry" => Some(Self::Entry),
            "singleton" => Some(Self::Singleton),
            "media" => Some(Self::Media),
            "collection" => Some(Self::Collection),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Singleton => "singleton",
            Self::Media => "media",
            Self::Collection => "collection",
        }
    }
}

/// Backend identity of one piece of created content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub id: i64,
    pub slug: String,
}

/// Run-scoped ledger of created content, keyed by kind and natural key.
///
/// Entries use `<model>.<entrySlug>` as their natural key; singletons and
/// collections use their slug; media uses its title. The ledger is populated
/// by content importers only, immediately after each import call returns, so
/// later descriptors in the same content file can reference earlier ones.
#[derive(Debug, Default)]
pub struct ContentBag {
    contents: HashMap<(ContentKind, String), ContentMetadata>,
}

impl ContentBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ContentKind, key: impl Into<String>, metadata: ContentMetadata) {
        self.contents.insert((kind, key.into()), metadata);
    }

    pub fn get(&self, kind: ContentKind, key: &str) -> Option<&ContentMetadata> {
        self.contents.get(&(kind, key.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Returns every `${group.key}` token in `input` whose group or key falls
/// outside the known parameter vocabulary.
pub fn find_invalid_parameters(input: &str) -> Vec<String> {
    PARAMETER_MATCHER
        .captures_iter(input)
        .filter(|captures| {
            let group = &captures[2];
            let key = &captures[3];
            !VALID_PARAMETERS
                .iter()
                .any(|(valid_group, valid_keys)| *valid_group == group && valid_keys.contains(&key))
        })
        .map(|captures| captures[0].to_string())
        .collect()
}

/// Returns every `@{kind.key}`/`#{kind.key}` token in `input` whose kind is
/// not a known content kind. Whether the key resolves is a run-time concern.
pub fn find_invalid_references(input: &str) -> Vec<String> {
    REFERENCE_MATCHER
        .captures_iter(input)
        .filter(|captures| ContentKind::from_group(&captures[2]).is_none())
        .map(|captures| captures[0].to_string())
        .collect()
}

fn unresolved_reference(token: &str, sigil: &str, group: &str, key: &str) -> Error {
    let hint = if group == "entry" && !key.contains('.') {
        format!(
            "Did you forget to include the model name before the entry slug, like in {sigil}{{entry.model-slug.entry-slug}}? Also, make sure that the content you're trying to reference is created **before** you try to refer to it."
        )
    } else {
        "Content creation order matters, so make sure that the content you're trying to reference is created **before** you try to refer to it.".to_string()
    };

    Error::UnresolvedReferenceError { token: token.to_string(), hint }
}

/// Replaces every parameter and reference token in `input`.
///
/// All occurrences of every matched token are substituted; text outside
/// tokens is preserved unchanged. Reference tokens require a `content_bag`:
/// passing `None` from a context that has no created content (file copy
/// templating, for instance) turns any `@`/`#` token into a hard
/// configuration error, distinct from a reference that merely isn't in the
/// bag yet.
pub fn replace_parameters(
    input: &str,
    parameters: &TemplateParameters,
    content_bag: Option<&ContentBag>,
) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut last_end = 0;

    for captures in MATCHER.captures_iter(input) {
        let token = captures.get(0).expect("regex match has a full capture");
        let sigil = &captures[1];
        let group = &captures[2];
        let key = &captures[3];

        let value = if sigil == "@" || sigil == "#" {
            let bag = content_bag.ok_or_else(|| Error::MissingReferenceContextError {
                token: token.as_str().to_string(),
            })?;

            let metadata = ContentKind::from_group(group)
                .and_then(|kind| bag.get(kind, key))
                .ok_or_else(|| unresolved_reference(token.as_str(), sigil, group, key))?;

            if sigil == "@" {
                metadata.slug.clone()
            } else {
                metadata.id.to_string()
            }
        } else {
            parameters.get(group, key).ok_or_else(|| Error::UnknownParameterError {
                token: token.as_str().to_string(),
            })?
        };

        output.push_str(&input[last_end..token.start()]);
        output.push_str(&value);
        last_end = token.end();
    }

    output.push_str(&input[last_end..]);
    Ok(output)
}

/// Deep variant of [`replace_parameters`].
///
/// Produces a structurally identical copy of `value` where every string leaf
/// has been substituted. The input is never mutated; the output shares no
/// structure with it. Cycles cannot occur in JSON-shaped inputs.
pub fn deeply_replace_parameters(
    value: &Value,
    parameters: &TemplateParameters,
    content_bag: Option<&ContentBag>,
) -> Result<Value> {
    Ok(match value {
        Value::String(string) => {
            Value::String(replace_parameters(string, parameters, content_bag)?)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| deeply_replace_parameters(item, parameters, content_bag))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            let mut replaced = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                replaced.insert(key.clone(), deeply_replace_parameters(item, parameters, content_bag)?);
            }
            Value::Object(replaced)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> TemplateParameters {
        TemplateParameters::new(
            "demo",
            Organization { id: 1, title: "Acme".to_string(), slug: "acme".to_string() },
            Workspace { id: 2, title: "Blog".to_string(), slug: "blog".to_string() },
        )
    }

    #[test]
    fn test_find_invalid_parameters() {
        assert!(find_invalid_parameters("Hello ${project.name}").is_empty());
        assert_eq!(
            find_invalid_parameters("${site.name} and ${project.title}"),
            vec!["${site.name}", "${project.title}"]
        );
    }

    #[test]
    fn test_find_invalid_references() {
        assert!(find_invalid_references("@{entry.blog.post} #{collection.news}").is_empty());
        assert_eq!(find_invalid_references("@{page.home}"), vec!["@{page.home}"]);
    }

    #[test]
    fn test_replace_all_occurrences() {
        let result =
            replace_parameters("${project.name} ${project.name}", &parameters(), None).unwrap();
        assert_eq!(result, "demo demo");
    }

    #[test]
    fn test_reference_without_bag_is_a_configuration_error() {
        let result = replace_parameters("@{entry.blog.post}", &parameters(), None);
        assert!(matches!(result, Err(Error::MissingReferenceContextError { .. })));
    }
}
