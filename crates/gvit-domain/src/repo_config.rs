use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use toml_edit::{DocumentMut, Item, Table};

use crate::plan::BASE_GROUP;

/// Name of the dedicated repository config file at the repo root.
pub const REPO_CONFIG_FILE: &str = ".gvit.toml";

/// Project manifest that may carry the same settings under `[tool.gvit]`.
const MANIFEST_FILE: &str = "pyproject.toml";

/// Repository-level configuration: read-only input to resolution.
#[derive(Clone, Debug, Default)]
pub struct RepoConfig {
    pub python: Option<String>,
    pub deps: IndexMap<String, String>,
}

impl RepoConfig {
    /// Loads repo config from `.gvit.toml`, falling back to the
    /// `[tool.gvit]` section of `pyproject.toml`. A repository without
    /// either yields the empty config.
    ///
    /// # Errors
    /// Returns an error when a present file fails to parse; absence is not
    /// an error.
    pub fn load(repo_path: &Path) -> Result<Self> {
        let dedicated = repo_path.join(REPO_CONFIG_FILE);
        if dedicated.exists() {
            let doc = read_document(&dedicated)?;
            return Ok(Self::from_table(doc.get("gvit").and_then(Item::as_table)));
        }
        let manifest = repo_path.join(MANIFEST_FILE);
        if manifest.exists() {
            let doc = read_document(&manifest)?;
            let table = doc
                .get("tool")
                .and_then(Item::as_table)
                .and_then(|tool| tool.get("gvit"))
                .and_then(Item::as_table);
            return Ok(Self::from_table(table));
        }
        Ok(Self::default())
    }

    #[must_use]
    pub fn base_deps(&self) -> Option<String> {
        self.deps.get(BASE_GROUP).cloned()
    }

    /// Declared extra groups, base excluded.
    #[must_use]
    pub fn extra_deps(&self) -> IndexMap<String, String> {
        self.deps
            .iter()
            .filter(|(name, _)| name.as_str() != BASE_GROUP)
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }

    fn from_table(table: Option<&Table>) -> Self {
        let Some(table) = table else {
            return Self::default();
        };
        let python = table
            .get("python")
            .and_then(Item::as_str)
            .map(ToString::to_string);
        let mut deps = IndexMap::new();
        if let Some(declared) = table.get("deps").and_then(Item::as_table) {
            for (name, value) in declared {
                if let Some(path) = value.as_str() {
                    deps.insert(name.to_string(), path.to_string());
                }
            }
        }
        Self { python, deps }
    }
}

fn read_document(path: &Path) -> Result<DocumentMut> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    contents
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))
}
