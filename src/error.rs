//! Error types for tree construction, resolution and manifest loading.
//!
//! Construction errors are fatal and surface while the tree is being built.
//! Resolution errors are recoverable: the caller decides the fallback (for
//! example rendering a not-found page). Nothing here is ever retried since
//! resolution is a pure function of its inputs.

use thiserror::Error;

/// Raised while building a [`RouteTree`](crate::tree::RouteTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("duplicate page name '{name}' (first declared at '{first_path}', again at '{second_path}')")]
    DuplicatePageName {
        name: String,
        first_path: String,
        second_path: String,
    },
    #[error("page at path '{path}' has an empty name")]
    EmptyPageName { path: String },
}

/// Raised by the composition resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no page named '{0}' in the route tree")]
    PageNotFound(String),
    #[error("no route matches path '{0}'")]
    NoMatch(String),
    #[error("ancestry of page '{page}' is broken at depth {depth}")]
    BrokenAncestry { page: String, depth: usize },
}

/// Raised when compiling a route path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route path '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("unterminated parameter in route path '{0}'")]
    UnterminatedParam(String),
    #[error("invalid parameter name '{name}' in route path '{path}'")]
    InvalidParamName { path: String, name: String },
    #[error("unknown parameter type '{kind}' in route path '{path}'")]
    UnknownParamType { path: String, kind: String },
    #[error("route path '{path}' failed to compile: {reason}")]
    Compile { path: String, reason: String },
}

/// Raised while loading a JSON route manifest or composer config.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown wrapper '{0}' (not registered)")]
    UnknownWrapper(String),
    #[error("unknown page content '{content}' for page '{page}' (not registered)")]
    UnknownContent { page: String, content: String },
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Raised by the process-wide live region lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnouncerError {
    #[error("a live region is already installed (id '{0}')")]
    AlreadyInstalled(String),
    #[error("no live region is installed")]
    NotInstalled,
}

/// Raised when producing a composition plan straight from manifest JSON.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
