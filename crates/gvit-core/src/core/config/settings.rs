use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gvit_domain::BackendKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use toml_edit::{DocumentMut, Item, Table, Value as TomlValue};

/// Environment variable that redirects the whole configuration directory
/// (registry included); tests rely on it.
pub const CONFIG_DIR_ENV: &str = "GVIT_CONFIG_DIR";

/// File holding the user-level defaults inside the configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory holding one registry record per tracked environment.
pub const ENVS_DIR: &str = "envs";

pub const DEFAULT_BACKEND: BackendKind = BackendKind::Venv;
pub const DEFAULT_PYTHON: &str = "3.11";
pub const DEFAULT_VENV_NAME: &str = ".venv";

/// Python versions accepted by validation.
pub const SUPPORTED_PYTHONS: [&str; 7] = ["3.8", "3.9", "3.10", "3.11", "3.12", "3.13", "3.14"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    pub assume_yes: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

/// Resolves the per-user configuration directory: the `GVIT_CONFIG_DIR`
/// override first, then the platform config directory.
///
/// # Errors
/// Returns an error when no user configuration directory can be determined.
pub(crate) fn config_dir(snapshot: &EnvSnapshot) -> Result<PathBuf> {
    if let Some(dir) = snapshot.var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs_next::config_dir()
        .context("could not determine the user configuration directory")?;
    Ok(base.join("gvit"))
}

/// User-level defaults from `<config-dir>/config.toml`.
#[derive(Clone, Debug, Default)]
pub struct UserConfig {
    pub defaults: UserDefaults,
    /// Named extra dependency groups declared at the user level.
    pub extra_deps: IndexMap<String, String>,
    /// Optional explicit path to the conda executable.
    pub conda_path: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UserDefaults {
    pub backend: Option<BackendKind>,
    pub python: Option<String>,
    pub install_deps: Option<bool>,
    pub deps_path: Option<String>,
    pub verbose: Option<bool>,
}

impl UserConfig {
    /// Loads the config file; an absent file yields the empty config.
    ///
    /// # Errors
    /// Returns an error when a present file fails to parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut config = Self::default();
        if let Some(defaults) = doc.get("defaults").and_then(Item::as_table) {
            config.defaults.backend = defaults
                .get("backend")
                .and_then(Item::as_str)
                .map(str::parse::<BackendKind>)
                .transpose()
                .with_context(|| format!("invalid default backend in {}", path.display()))?;
            config.defaults.python = table_str(defaults, "python");
            config.defaults.install_deps = defaults.get("install_deps").and_then(Item::as_bool);
            config.defaults.deps_path = table_str(defaults, "deps_path");
            config.defaults.verbose = defaults.get("verbose").and_then(Item::as_bool);
        }
        if let Some(deps) = doc.get("deps").and_then(Item::as_table) {
            for (name, value) in deps {
                if let Some(declared) = value.as_str() {
                    config.extra_deps.insert(name.to_string(), declared.to_string());
                }
            }
        }
        config.conda_path = doc
            .get("backends")
            .and_then(Item::as_table)
            .and_then(|backends| backends.get("conda"))
            .and_then(Item::as_table)
            .and_then(|conda| conda.get("path"))
            .and_then(Item::as_str)
            .map(ToString::to_string);
        Ok(config)
    }

    /// Writes the config file, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, self.render())
            .with_context(|| format!("writing {}", path.display()))
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut doc = DocumentMut::new();
        let mut defaults = Table::new();
        if let Some(backend) = self.defaults.backend {
            defaults.insert("backend", Item::Value(TomlValue::from(backend.as_str())));
        }
        if let Some(python) = &self.defaults.python {
            defaults.insert("python", Item::Value(TomlValue::from(python.clone())));
        }
        if let Some(install_deps) = self.defaults.install_deps {
            defaults.insert("install_deps", Item::Value(TomlValue::from(install_deps)));
        }
        if let Some(deps_path) = &self.defaults.deps_path {
            defaults.insert("deps_path", Item::Value(TomlValue::from(deps_path.clone())));
        }
        if let Some(verbose) = self.defaults.verbose {
            defaults.insert("verbose", Item::Value(TomlValue::from(verbose)));
        }
        doc.insert("defaults", Item::Table(defaults));

        if !self.extra_deps.is_empty() {
            let mut deps = Table::new();
            for (name, declared) in &self.extra_deps {
                deps.insert(name, Item::Value(TomlValue::from(declared.clone())));
            }
            doc.insert("deps", Item::Table(deps));
        }
        if let Some(conda_path) = &self.conda_path {
            let mut conda = Table::new();
            conda.insert("path", Item::Value(TomlValue::from(conda_path.clone())));
            let mut backends = Table::new();
            backends.insert("conda", Item::Table(conda));
            doc.insert("backends", Item::Table(backends));
        }
        doc.to_string()
    }

    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.defaults.backend.unwrap_or(DEFAULT_BACKEND)
    }

    #[must_use]
    pub fn python(&self) -> String {
        self.defaults
            .python
            .clone()
            .unwrap_or_else(|| DEFAULT_PYTHON.to_string())
    }

    #[must_use]
    pub fn install_deps(&self) -> bool {
        self.defaults.install_deps.unwrap_or(true)
    }

    #[must_use]
    pub fn base_deps(&self) -> Option<String> {
        self.defaults.deps_path.clone()
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }
}

fn table_str(table: &Table, field: &str) -> Option<String> {
    table
        .get(field)
        .and_then(Item::as_str)
        .map(ToString::to_string)
}
