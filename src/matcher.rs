//! Path matching: maps a URL path onto a page name plus its path params.
//!
//! Patterns use `{name}` segments, optionally typed as `{name:Int}`,
//! `{name:Float}` or `{name:Boolean}`. Typed params are injected as JSON
//! numbers/booleans, untyped ones as strings.

use regex::Regex;

use crate::error::PatternError;
use crate::props::Props;
use crate::resolve::RouteMatch;
use crate::tree::RouteTree;

/// The collaborator that decides which page is active for a path.
pub trait PathMatcher {
    fn match_path(&self, path: &str) -> Option<RouteMatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Str,
    Int,
    Float,
    Boolean,
}

impl ParamKind {
    fn parse(path: &str, kind: &str) -> Result<Self, PatternError> {
        match kind {
            "" | "String" => Ok(ParamKind::Str),
            "Int" => Ok(ParamKind::Int),
            "Float" => Ok(ParamKind::Float),
            "Boolean" => Ok(ParamKind::Boolean),
            _ => Err(PatternError::UnknownParamType {
                path: path.to_string(),
                kind: kind.to_string(),
            }),
        }
    }

    fn regex(&self) -> &'static str {
        match self {
            ParamKind::Str => r"([^/]+)",
            ParamKind::Int => r"(\d+)",
            ParamKind::Float => r"(\d+(?:\.\d+)?)",
            ParamKind::Boolean => r"(true|false)",
        }
    }

    fn value(&self, raw: &str) -> serde_json::Value {
        let parsed = match self {
            ParamKind::Str => None,
            ParamKind::Int => raw.parse::<i64>().ok().map(serde_json::Value::from),
            ParamKind::Float => raw.parse::<f64>().ok().map(serde_json::Value::from),
            ParamKind::Boolean => raw.parse::<bool>().ok().map(serde_json::Value::from),
        };
        parsed.unwrap_or_else(|| serde_json::Value::String(raw.to_string()))
    }
}

/// A compiled route path.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    params: Vec<(String, ParamKind)>,
}

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self, PatternError> {
        if !path.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(path.to_string()));
        }

        let mut pattern = String::from("^");
        let mut params = Vec::new();
        let mut rest = path;

        while let Some(open) = rest.find('{') {
            pattern.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| PatternError::UnterminatedParam(path.to_string()))?;
            let spec = &after[..close];
            let (name, kind) = match spec.split_once(':') {
                Some((name, kind)) => (name.trim(), kind.trim()),
                None => (spec.trim(), ""),
            };
            if !is_param_name(name) {
                return Err(PatternError::InvalidParamName {
                    path: path.to_string(),
                    name: name.to_string(),
                });
            }
            let kind = ParamKind::parse(path, kind)?;
            pattern.push_str(kind.regex());
            params.push((name.to_string(), kind));
            rest = &after[close + 1..];
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| PatternError::Compile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: path.to_string(),
            regex,
            params,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path params when `path` matches, `None` otherwise.
    pub fn captures(&self, path: &str) -> Option<Props> {
        let caps = self.regex.captures(path)?;
        let mut props = Props::new();
        for (index, (name, kind)) in self.params.iter().enumerate() {
            let raw = caps.get(index + 1)?.as_str();
            props.insert(name.clone(), kind.value(raw));
        }
        Some(props)
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Matches paths against every page of a tree in document order. The first
/// matching page wins.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    routes: Vec<(RoutePattern, String)>,
}

impl PatternMatcher {
    pub fn from_tree(tree: &RouteTree) -> Result<Self, PatternError> {
        let routes = tree
            .pages()
            .into_iter()
            .map(|page| Ok((RoutePattern::parse(page.path())?, page.name().to_string())))
            .collect::<Result<Vec<_>, PatternError>>()?;
        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl PathMatcher for PatternMatcher {
    fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.routes.iter().find_map(|(pattern, name)| {
            pattern.captures(path).map(|params| RouteMatch {
                page_name: name.clone(),
                params,
            })
        })
    }
}
