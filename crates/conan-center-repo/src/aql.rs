//! Artifactory Query Language
//!
//! Translates a [`SearchParams`] pattern into an `items.find(...)` query
//! and parses the search response.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{RepoError, Result};
use crate::services::{ResultItem, SearchParams};

/// Fields requested for every item
const INCLUDE: &str = r#".include("repo","path","name","type","property")"#;

fn matcher(value: &str) -> Value {
    if value.contains('*') || value.contains('?') {
        json!({ "$match": value })
    } else {
        json!(value)
    }
}

/// Split `{repo}/{path}/{name}` into its three parts
pub(crate) fn split_pattern(pattern: &str) -> Result<(&str, &str, &str)> {
    let trimmed = pattern.trim_matches('/');
    let (repo, rest) = trimmed
        .split_once('/')
        .filter(|(repo, rest)| !repo.is_empty() && !rest.is_empty())
        .ok_or_else(|| RepoError::InvalidUsage {
            message: format!("search pattern '{}' must be '<repo>/<path>'", pattern),
        })?;
    if repo.contains('*') || repo.contains('?') {
        return Err(RepoError::InvalidUsage {
            message: format!("search pattern '{}' must name a single repository", pattern),
        });
    }
    let (path, name) = rest.rsplit_once('/').unwrap_or((".", rest));
    Ok((repo, path, name))
}

/// Build the AQL query for a pattern search
pub fn build_query(params: &SearchParams) -> Result<String> {
    let (repo, path, name) = split_pattern(&params.pattern)?;

    let mut criteria = Map::new();
    criteria.insert("repo".to_string(), json!(repo));
    if params.recursive {
        criteria.insert(
            "$or".to_string(),
            json!([
                { "path": matcher(path) },
                { "path": { "$match": format!("{}/*", path) } },
            ]),
        );
    } else {
        criteria.insert("path".to_string(), matcher(path));
    }
    criteria.insert("name".to_string(), matcher(name));
    let item_type = if params.include_dirs { "any" } else { "file" };
    criteria.insert("type".to_string(), json!(item_type));

    Ok(format!("items.find({}){}", Value::Object(criteria), INCLUDE))
}

#[derive(Debug, Deserialize)]
struct AqlResponse {
    #[serde(default)]
    results: Vec<ResultItem>,
}

/// Parse the body returned by `api/search/aql`
pub fn parse_response(body: &[u8]) -> Result<Vec<ResultItem>> {
    let response: AqlResponse =
        serde_json::from_slice(body).map_err(|e| RepoError::InvalidSearchResponse {
            message: e.to_string(),
        })?;
    Ok(response.results)
}
