//! Repository intent parsing for the `/github` endpoint.
//!
//! Free text is classified into create / delete / no match, and a repository
//! name is extracted. The regex strategy is the only one today; it sits behind
//! [`IntentParser`] so handlers never depend on how the text is read.
//!
//! Detection is keyword-based and ordered: create is checked before delete,
//! so text carrying both resolves to create.
//!
//! When no keyword names the repository, the last token is used instead. That
//! token must pass GitHub's repository naming rules; one that fails yields
//! [`RepoIntent::Unresolved`] rather than a guessed name.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static CREATE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(named|name|called)\s+([a-zA-Z0-9_-]+)").expect("Invalid regex: create name pattern")
});

static DELETE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(delete|remove)\s+(github\s+)?(repo|repository)\s+([a-zA-Z0-9_-]+)")
        .expect("Invalid regex: delete name pattern")
});

static VALID_REPO_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("Invalid regex: repo name pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoAction {
    Create,
    Delete,
}

impl fmt::Display for RepoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoAction::Create => f.write_str("create"),
            RepoAction::Delete => f.write_str("delete"),
        }
    }
}

/// Where an extracted name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Captured after a naming keyword (`named foo`, `delete repo foo`).
    Keyword,
    /// Guessed from the last whitespace-delimited token.
    LastToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub name: String,
    pub source: NameSource,
}

/// Outcome of parsing one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoIntent {
    Create(RepoTarget),
    Delete(RepoTarget),
    /// The action was recognised but no usable repository name was found.
    Unresolved(RepoAction),
    NoMatch,
}

/// Classifies free text into a repository intent.
pub trait IntentParser: Send + Sync {
    fn parse(&self, text: &str) -> RepoIntent;
}

/// Keyword detection plus regex name capture.
#[derive(Debug, Clone)]
pub struct RegexIntentParser {
    last_token_fallback: bool,
}

impl RegexIntentParser {
    pub fn new(last_token_fallback: bool) -> Self {
        Self { last_token_fallback }
    }

    fn resolve_name(&self, text: &str, captured: Option<&str>) -> Option<RepoTarget> {
        if let Some(name) = captured {
            return is_valid_repo_name(name).then(|| RepoTarget {
                name: name.to_string(),
                source: NameSource::Keyword,
            });
        }
        if !self.last_token_fallback {
            return None;
        }
        text.split_whitespace()
            .last()
            .filter(|token| is_valid_repo_name(token))
            .map(|token| RepoTarget { name: token.to_string(), source: NameSource::LastToken })
    }
}

impl Default for RegexIntentParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IntentParser for RegexIntentParser {
    fn parse(&self, text: &str) -> RepoIntent {
        let lower = text.to_lowercase();

        if is_create(&lower) {
            let captured = CREATE_NAME
                .captures(text)
                .and_then(|c| c.get(2))
                .map(|m| m.as_str());
            return match self.resolve_name(text, captured) {
                Some(target) => RepoIntent::Create(target),
                None => RepoIntent::Unresolved(RepoAction::Create),
            };
        }

        if is_delete(&lower) {
            let captured = DELETE_NAME
                .captures(text)
                .and_then(|c| c.get(4))
                .map(|m| m.as_str());
            return match self.resolve_name(text, captured) {
                Some(target) => RepoIntent::Delete(target),
                None => RepoIntent::Unresolved(RepoAction::Delete),
            };
        }

        RepoIntent::NoMatch
    }
}

fn is_create(lower: &str) -> bool {
    lower.contains("create") && (lower.contains("github repo") || lower.contains("repository"))
}

fn is_delete(lower: &str) -> bool {
    lower.contains("delete") && lower.contains("github repo")
}

/// GitHub accepts ASCII letters, digits, `.`, `-` and `_`, up to 100 chars.
pub fn is_valid_repo_name(name: &str) -> bool {
    name != "." && name != ".." && VALID_REPO_NAME.is_match(name)
}
