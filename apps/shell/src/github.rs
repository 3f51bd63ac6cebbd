//! The demo client: a small slice of the Github REST API described as a scope tree.

use serde_json::json;
use settle::kernel::CatalogError;
use settle::prelude::*;
use std::sync::Arc;

const MESSAGES: &str = r#"
token_present = "%{model}: an API token is required"

[Github]
api_url_https = "The API url must use https"

[Github.repos]
owner_present = "Repository owner cannot be empty"

[Github.repos.list]
per_page_range = "per_page must be between 1 and 100"
"#;

/// Built-in message catalog.
pub(crate) fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_toml_str(MESSAGES)
}

/// Declares the whole tree.
///
/// ```text
/// Github              token, api_url, timeout, uploads_url; memo auth_header
/// ├── repos           owner; memo repos_url
/// │   ├── list        per_page, sort
/// │   └── create      name, private
/// └── issues          repo
///     └── create      title, labels
/// ```
pub(crate) fn client(catalog: Catalog) -> Result<Client, ScopeError> {
    let client = Client::new("Github").with_catalog(catalog);
    let root = client.root();

    root.option(OptionDef::new("token").coerce(Kinds::STRING | Kinds::NULL).optional())?
        .option(
            OptionDef::new("api_url").coerce(Kinds::STRING).with_default("https://api.github.com"),
        )?
        .option(OptionDef::new("timeout").coerce(Kinds::INTEGER).with_default(30))?
        .option(OptionDef::new("uploads_url").coerce(Kinds::STRING).default_from(|resolved| {
            match resolved.get("api_url").and_then(Value::as_str) {
                Some("https://api.github.com") | None => json!("https://uploads.github.com"),
                Some(api) => json!(format!("{}/uploads", api.trim_end_matches('/'))),
            }
        }))?
        .memo("auth_header", |s| {
            let token = s.get_as::<Option<String>>("token")?;
            Ok(token.map_or(Value::Null, |t| json!(format!("token {t}"))))
        })?
        .validate(|s, errors| {
            if s.option("token").is_none_or(Value::is_null) {
                errors.add("token_present");
            }
            if !s.get_as::<String>("api_url")?.starts_with("https://") {
                errors.add("api_url_https");
            }
            Ok(())
        });

    let repos = root.scope("repos")?;
    repos
        .option(OptionDef::new("owner").coerce(Kinds::STRING))?
        .memo("repos_url", |s| {
            let api = s.get_as::<String>("api_url")?;
            let owner = s.get_as::<String>("owner")?;
            Ok(json!(format!("{}/users/{owner}/repos", api.trim_end_matches('/'))))
        })?
        .validate(|s, errors| {
            if s.get_as::<String>("owner")?.trim().is_empty() {
                errors.add("owner_present");
            }
            Ok(())
        });

    repos
        .operation("list")?
        .option(OptionDef::new("per_page").coerce(Kinds::INTEGER).with_default(30))?
        .option(OptionDef::new("sort").coerce(Kinds::STRING).with_default("updated"))?
        .validate(|s, errors| {
            if !(1..=100).contains(&s.get_as::<i64>("per_page")?) {
                errors.add("per_page_range");
            }
            Ok(())
        });

    repos
        .operation("create")?
        .option(OptionDef::new("name").coerce(Kinds::STRING))?
        .option(OptionDef::new("private").coerce(Kinds::BOOL).with_default(false))?;

    let issues = root.scope("issues")?;
    issues.option(OptionDef::new("repo").coerce(Kinds::STRING))?;
    issues
        .operation("create")?
        .option(OptionDef::new("title").coerce(Kinds::STRING))?
        .option(OptionDef::new("labels").coerce(Kinds::ARRAY).with_default(json!([])))?;

    Ok(client)
}

/// Every node path below `node`, depth first.
pub(crate) fn walk(node: &Arc<Schema>) -> Vec<String> {
    let mut paths = vec![node.path().to_owned()];
    for name in node.children() {
        if let Some(child) = node.get(&name) {
            paths.extend(walk(&child));
        }
    }
    paths
}
