use crate::github;
use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value, json};
use settle::config::load_input;
use settle::prelude::*;
use settle_logger::{Logger, LoggerBuilder, LoggerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Table of the settings file that configures logging rather than the client.
const LOGGING_SECTION: &str = "logging";

#[derive(Debug)]
pub(crate) struct Check {
    pub(crate) file: PathBuf,
    pub(crate) node: String,
    pub(crate) prefix: Option<String>,
    pub(crate) catalog: Option<PathBuf>,
}

/// Loads the file, installs the logger from its `[logging]` table and builds the node.
///
/// Returns the logger handle with the report so the caller keeps logging alive.
pub(crate) fn check(args: &Check) -> Result<(Logger, Value)> {
    let mut input = load_input(&args.file, args.prefix.as_deref())?;

    let logging = match input.remove(LOGGING_SECTION) {
        Some(table) => Input::try_from(table)
            .map_err(|other| anyhow!("`{LOGGING_SECTION}` must be a table, got {other}"))?,
        None => Input::new(),
    };
    let logger = LoggerBuilder::from(LoggerConfig::from_input(logging)?).init()?;

    let catalog = match &args.catalog {
        Some(path) => read_catalog(path)?,
        None => github::catalog()?,
    };
    let client = github::client(catalog)?;
    let node = resolve(&client.root(), &args.node)?;

    info!(node = %node, file = %args.file.display(), "checking settings");
    let settings = node.build(input)?;

    Ok((logger, report(&node, &settings)?))
}

/// Options and memos of a built node, memos evaluated.
fn report(node: &Schema, settings: &Settings) -> Result<Value> {
    let mut memos = Map::new();
    for name in node.settings()?.shape().memos {
        let value = settings.get(&name).with_context(|| format!("evaluating `{name}`"))?;
        memos.insert(name, value);
    }

    Ok(json!({
        "node": node.path(),
        "options": serde_json::to_value(settings)?,
        "memos": memos,
    }))
}

pub(crate) fn shape(node: &str) -> Result<Value> {
    let client = github::client(github::catalog()?)?;
    let node = resolve(&client.root(), node)?;
    Ok(serde_json::to_value(node.settings()?.shape())?)
}

pub(crate) fn tree() -> Result<Vec<String>> {
    let client = github::client(github::catalog()?)?;
    Ok(github::walk(&client.root()))
}

fn resolve(root: &Arc<Schema>, path: &str) -> Result<Arc<Schema>> {
    root.find(path).ok_or_else(|| anyhow!("no node `{path}` under {root}"))
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    Ok(Catalog::from_toml_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn shape_lists_inherited_options() {
        let shape = shape("repos.list").unwrap();
        let keys: Vec<_> = shape["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["key"].as_str().unwrap().to_owned())
            .collect();

        assert_eq!(keys, ["token", "api_url", "timeout", "uploads_url", "owner", "per_page", "sort"]);
        assert_eq!(shape["memos"], json!(["auth_header", "repos_url"]));
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let err = shape("repos.delete").unwrap_err();
        assert!(err.to_string().contains("repos.delete"), "{err}");
    }

    #[test]
    fn catalogs_load_from_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[Github]\ntoken_present = \"Set GITHUB token\"\n").unwrap();

        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(catalog.get("Github.token_present"), Some("Set GITHUB token"));
    }
}
