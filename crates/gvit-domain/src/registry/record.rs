use std::path::PathBuf;

use indexmap::IndexMap;

use crate::backend::BackendKind;

/// The environment side of a registry record.
///
/// `name` is the registry key; `path` is backend-specific: the environment
/// directory for venv/virtualenv, the environment name for conda.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub name: String,
    pub backend: BackendKind,
    pub path: String,
    pub python: String,
    pub created_at: String,
}

/// The repository side of a registry record. Identity is the absolute,
/// symlink-resolved path; the URL may be empty and can be filled in lazily.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub path: PathBuf,
    pub url: String,
}

/// Fingerprints captured at install time, replaced wholesale on every save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstalledState {
    pub hashes: IndexMap<String, String>,
    pub installed_at: String,
}

/// One persisted registry unit: everything gvit knows about a tracked
/// environment-repository binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryRecord {
    pub environment: EnvironmentInfo,
    pub repository: RepositoryInfo,
    pub deps: IndexMap<String, String>,
    pub installed: Option<InstalledState>,
}

impl RegistryRecord {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.environment.name
    }

    /// Tracked extra groups, base excluded.
    #[must_use]
    pub fn extra_deps(&self) -> IndexMap<String, String> {
        self.deps
            .iter()
            .filter(|(name, _)| name.as_str() != crate::plan::BASE_GROUP)
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }
}

/// Caller-supplied input to [`crate::registry::EnvRegistry::save`].
///
/// Fingerprints are deliberately absent: the registry recomputes them from
/// the on-disk dependency files at save time rather than trusting caller
/// state. `created_at` is `None` for new records and the original timestamp
/// when rewriting an existing one.
#[derive(Clone, Debug)]
pub struct RecordDraft {
    pub key: String,
    pub backend: BackendKind,
    pub env_path: String,
    pub python: String,
    pub created_at: Option<String>,
    pub repo_path: PathBuf,
    pub repo_url: String,
    pub deps: IndexMap<String, String>,
}
