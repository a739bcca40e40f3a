use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use toml_edit::{DocumentMut, Item, Table, Value as TomlValue};

use crate::backend::BackendKind;

use super::record::{EnvironmentInfo, InstalledState, RegistryRecord, RepositoryInfo};

/// Key of the fingerprint sub-table inside `[deps]`. Reserved: a dependency
/// group cannot take this name.
pub const INSTALLED_TABLE: &str = "installed";

const HASH_SUFFIX: &str = "_hash";

pub fn render_record(record: &RegistryRecord) -> String {
    let mut doc = DocumentMut::new();

    let mut environment = Table::new();
    environment.insert(
        "name",
        Item::Value(TomlValue::from(record.environment.name.clone())),
    );
    environment.insert(
        "backend",
        Item::Value(TomlValue::from(record.environment.backend.as_str())),
    );
    environment.insert(
        "path",
        Item::Value(TomlValue::from(record.environment.path.clone())),
    );
    environment.insert(
        "python",
        Item::Value(TomlValue::from(record.environment.python.clone())),
    );
    environment.insert(
        "created_at",
        Item::Value(TomlValue::from(record.environment.created_at.clone())),
    );
    doc.insert("environment", Item::Table(environment));

    let mut repository = Table::new();
    repository.insert(
        "path",
        Item::Value(TomlValue::from(
            record.repository.path.display().to_string(),
        )),
    );
    repository.insert(
        "url",
        Item::Value(TomlValue::from(record.repository.url.clone())),
    );
    doc.insert("repository", Item::Table(repository));

    let mut deps = Table::new();
    for (group, path) in &record.deps {
        deps.insert(group, Item::Value(TomlValue::from(path.clone())));
    }
    if let Some(installed) = &record.installed {
        let mut table = Table::new();
        for (group, hash) in &installed.hashes {
            table.insert(
                &format!("{group}{HASH_SUFFIX}"),
                Item::Value(TomlValue::from(hash.clone())),
            );
        }
        table.insert(
            "installed_at",
            Item::Value(TomlValue::from(installed.installed_at.clone())),
        );
        deps.insert(INSTALLED_TABLE, Item::Table(table));
    }
    doc.insert("deps", Item::Table(deps));

    doc.to_string()
}

pub fn parse_record(contents: &str, key: &str) -> Result<RegistryRecord> {
    let doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("failed to parse registry record `{key}`"))?;

    let environment = doc
        .get("environment")
        .and_then(Item::as_table)
        .ok_or_else(|| anyhow!("registry record `{key}` has no [environment] table"))?;
    let backend = required_str(environment, "backend", key)?
        .parse::<BackendKind>()
        .with_context(|| format!("registry record `{key}` has an invalid backend"))?;
    let environment = EnvironmentInfo {
        name: required_str(environment, "name", key)?.to_string(),
        backend,
        path: required_str(environment, "path", key)?.to_string(),
        python: required_str(environment, "python", key)?.to_string(),
        created_at: optional_str(environment, "created_at").unwrap_or_default(),
    };

    let repository = doc
        .get("repository")
        .and_then(Item::as_table)
        .ok_or_else(|| anyhow!("registry record `{key}` has no [repository] table"))?;
    let repository = RepositoryInfo {
        path: PathBuf::from(required_str(repository, "path", key)?),
        url: optional_str(repository, "url").unwrap_or_default(),
    };

    let mut deps = IndexMap::new();
    let mut installed = None;
    if let Some(table) = doc.get("deps").and_then(Item::as_table) {
        for (name, value) in table {
            if name == INSTALLED_TABLE {
                continue;
            }
            if let Some(path) = value.as_str() {
                deps.insert(name.to_string(), path.to_string());
            }
        }
        if let Some(state) = table.get(INSTALLED_TABLE).and_then(Item::as_table) {
            let mut hashes = IndexMap::new();
            let mut installed_at = String::new();
            for (name, value) in state {
                let Some(value) = value.as_str() else {
                    continue;
                };
                if name == "installed_at" {
                    installed_at = value.to_string();
                } else if let Some(group) = name.strip_suffix(HASH_SUFFIX) {
                    hashes.insert(group.to_string(), value.to_string());
                }
            }
            installed = Some(InstalledState {
                hashes,
                installed_at,
            });
        }
    }

    Ok(RegistryRecord {
        environment,
        repository,
        deps,
        installed,
    })
}

fn required_str<'a>(table: &'a Table, field: &str, key: &str) -> Result<&'a str> {
    table
        .get(field)
        .and_then(Item::as_str)
        .ok_or_else(|| anyhow!("registry record `{key}` is missing `{field}`"))
}

fn optional_str(table: &Table, field: &str) -> Option<String> {
    table
        .get(field)
        .and_then(Item::as_str)
        .map(ToString::to_string)
}
